// =============================================================================
// Trend Heuristic — SMA stack and regression-slope vote
// =============================================================================
//
// Each check votes +1 when it holds and -1 when it fails:
//
//   last > SMA20            (needs 20 closes)
//   SMA20 > SMA50           (needs 50 closes)
//   SMA50 > SMA200          (needs 200 closes)
//   slope20 > 0             (always; an undefined slope counts as 0)
//   slope50 >= 0            (needs 50 closes; an undefined slope counts as 0)
//
// Decision rule over `max` evaluated checks:
//   Bullish  score >=  ceil(0.6 * max)
//   Bearish  score <= -ceil(0.6 * max)
//   Neutral  otherwise
//   confidence = round(|score| / max * 100)

use crate::signals::TrendFeatures;
use crate::types::{Origin, TrendLabel, TrendVerdict};

/// Closes required before any vote is cast.
pub const MIN_TREND_POINTS: usize = 20;

pub const INSUFFICIENT_DATA_REASON: &str = "Not enough data";
pub const HEURISTIC_REASON: &str = "Heuristic based on SMAs and recent slopes.";

/// Classify the current trend of `closes`. Always returns a valid verdict.
pub fn classify_trend(closes: &[f64]) -> TrendVerdict {
    if closes.len() < MIN_TREND_POINTS {
        return TrendVerdict {
            label: TrendLabel::Neutral,
            confidence: 0,
            reasoning: INSUFFICIENT_DATA_REASON.to_string(),
            origin: Origin::Heuristic,
        };
    }
    classify_features(&TrendFeatures::extract(closes))
}

/// Score an already extracted feature snapshot (at least 20 closes).
pub fn classify_features(f: &TrendFeatures) -> TrendVerdict {
    let checks = collect_checks(f);

    let max = checks.len() as i32;
    let score: i32 = checks.iter().map(|&ok| if ok { 1 } else { -1 }).sum();
    // ceil(0.6 * max) in integer arithmetic.
    let threshold = (3 * max + 4) / 5;

    let label = if score >= threshold {
        TrendLabel::Bullish
    } else if score <= -threshold {
        TrendLabel::Bearish
    } else {
        TrendLabel::Neutral
    };

    let confidence = if max == 0 {
        0
    } else {
        (score.abs() as f64 / max as f64 * 100.0).round().clamp(0.0, 100.0) as u8
    };

    TrendVerdict {
        label,
        confidence,
        reasoning: HEURISTIC_REASON.to_string(),
        origin: Origin::Heuristic,
    }
}

fn collect_checks(f: &TrendFeatures) -> Vec<bool> {
    let mut checks = Vec::with_capacity(5);

    if let (Some(last), Some(sma20)) = (f.last_close, f.sma20) {
        checks.push(last > sma20);
    }
    if let (Some(sma20), Some(sma50)) = (f.sma20, f.sma50) {
        checks.push(sma20 > sma50);
    }
    if let (Some(sma50), Some(sma200)) = (f.sma50, f.sma200) {
        checks.push(sma50 > sma200);
    }
    checks.push(f.slope20.unwrap_or(0.0) > 0.0);
    if f.len >= 50 {
        checks.push(f.slope50.unwrap_or(0.0) >= 0.0);
    }

    checks
}

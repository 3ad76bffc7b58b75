// =============================================================================
// Trend Features — compact indicator snapshot of a closing-price series
// =============================================================================
//
// The snapshot is what the heuristic classifier scores and what the model
// prompt carries in place of the raw series. Every field is optional: a value
// that needs more history than is available stays `None` (serialised as
// `null`) and is never replaced by zero.

use serde::Serialize;

use crate::indicators::{regression, roc, sma};

/// Indicator snapshot keyed by name, computed fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendFeatures {
    pub last_close: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub slope20: Option<f64>,
    pub slope50: Option<f64>,
    pub roc_5: Option<f64>,
    pub roc_20: Option<f64>,
    pub above_sma20: Option<bool>,
    /// `sma20 > sma50 > sma200`, defined once 200 closes exist.
    ///
    /// Informational only: it is forwarded to the model but the heuristic
    /// score never reads it.
    pub stacked_sma: Option<bool>,
    /// Number of closes the snapshot was computed from.
    #[serde(skip)]
    pub len: usize,
}

impl TrendFeatures {
    pub fn extract(closes: &[f64]) -> Self {
        let len = closes.len();
        let last_close = closes.last().copied();

        let sma20 = sma::current_sma(closes, 20);
        let sma50 = sma::current_sma(closes, 50);
        let sma200 = sma::current_sma(closes, 200);

        let slope20 = regression::trailing_slope(closes, len.min(20));
        let slope50 = if len >= 50 {
            regression::trailing_slope(closes, 50)
        } else {
            None
        };

        let above_sma20 = last_close.map(|last| last > sma20.unwrap_or(last));

        let stacked_sma = if len >= 200 {
            let (a, b, c) = (
                sma20.unwrap_or(0.0),
                sma50.unwrap_or(0.0),
                sma200.unwrap_or(0.0),
            );
            Some(a > b && b > c)
        } else {
            None
        };

        Self {
            last_close,
            sma20,
            sma50,
            sma200,
            slope20,
            slope50,
            roc_5: roc::current_roc(closes, 5),
            roc_20: roc::current_roc(closes, 20),
            above_sma20,
            stacked_sma,
            len,
        }
    }
}

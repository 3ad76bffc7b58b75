// =============================================================================
// Descriptive statistics over a price series
// =============================================================================

use serde::Serialize;

use super::PriceSeries;

/// Trading days in one calendar year.
const YEAR_BARS: usize = 252;

/// 52-week range and average volume, taken from the trailing year of the
/// *full* history (not the displayed period).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStats {
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    pub avg_volume_1y: Option<f64>,
}

impl YearStats {
    pub fn from_series(series: &PriceSeries) -> Self {
        let year = series.tail(YEAR_BARS);
        if year.is_empty() {
            return Self {
                high_52w: None,
                low_52w: None,
                avg_volume_1y: None,
            };
        }
        let bars = year.bars();
        let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let avg_volume = bars.iter().map(|b| b.volume).sum::<f64>() / bars.len() as f64;
        Self {
            high_52w: Some(high),
            low_52w: Some(low),
            avg_volume_1y: Some(avg_volume),
        }
    }
}

/// Last close versus the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub last_close: f64,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
}

impl Quote {
    /// `None` for an empty series.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let bars = series.bars();
        let last = bars.last()?;
        let previous_close = bars.len().checked_sub(2).map(|i| bars[i].close);
        let change = previous_close.map(|prev| last.close - prev);
        let change_pct = match (change, previous_close) {
            (Some(ch), Some(prev)) if prev != 0.0 => Some(ch / prev * 100.0),
            _ => None,
        };
        Some(Self {
            symbol: series.symbol.to_uppercase(),
            last_close: last.close,
            previous_close,
            change,
            change_pct,
            currency: None,
            exchange: None,
            market_cap: None,
        })
    }
}

// =============================================================================
// Price Store — daily OHLCV bars from local CSV files
// =============================================================================
//
// One file per symbol under the data directory: `<SYMBOL>.csv`, with `^`
// written as `_` in the file name (index tickers such as `^NSEI`). Required
// columns are `Date, Open, High, Low, Close, Volume`; extra columns are
// ignored. Rows are sorted ascending by date and duplicate dates collapse to
// the last row seen.
// =============================================================================

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Tickers offered when the data directory holds no CSV files.
const FALLBACK_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "NVDA", "GOOGL", "AMZN", "TSLA", "META", "NFLX", "AMD", "INTC", "IBM",
    "ORCL", "ADBE", "SAP", "AVGO",
];

const REQUIRED_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Error)]
pub enum DataError {
    #[error("No mock dataset for {0}")]
    NotFound(String),

    #[error("{0}")]
    DataFormat(String),
}

/// A single daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Midnight UTC of the bar's date, in epoch milliseconds.
    pub fn timestamp_ms(&self) -> i64 {
        self.date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default()
    }
}

/// Chronologically ascending bars for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, sorting by date and dropping duplicate dates
    /// (the later row wins).
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// The trailing `n` bars as a new series.
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.bars.len().saturating_sub(n);
        PriceSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }

    /// The trailing window selected by a dashboard period.
    pub fn slice_period(&self, period: Period) -> PriceSeries {
        self.tail(period.trading_days())
    }
}

// =============================================================================
// Period
// =============================================================================

/// Dashboard look-back period, expressed in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl Period {
    /// Parse a period code; unknown codes fall back to six months.
    pub fn parse_or_default(code: &str) -> Self {
        match code {
            "1mo" => Self::OneMonth,
            "3mo" => Self::ThreeMonths,
            "6mo" => Self::SixMonths,
            "1y" => Self::OneYear,
            "2y" => Self::TwoYears,
            "5y" => Self::FiveYears,
            "max" => Self::Max,
            _ => Self::SixMonths,
        }
    }

    pub fn trading_days(self) -> usize {
        match self {
            Self::OneMonth => 21,
            Self::ThreeMonths => 63,
            Self::SixMonths => 126,
            Self::OneYear => 252,
            Self::TwoYears => 504,
            Self::FiveYears => 1260,
            Self::Max => 10_000,
        }
    }
}

// =============================================================================
// PriceStore
// =============================================================================

/// Reads per-symbol CSV files from a data directory.
#[derive(Debug, Clone)]
pub struct PriceStore {
    data_dir: PathBuf,
}

impl PriceStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol.replace('^', "_")))
    }

    /// Symbols with a CSV present (case-insensitive extension), sorted and
    /// de-duplicated. Falls back to a fixed ticker list when none exist.
    pub fn available_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
                })
                .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(|s| s.replace('_', "^")))
                .collect(),
            Err(e) => {
                warn!(dir = %self.data_dir.display(), error = %e, "data directory unreadable");
                Vec::new()
            }
        };
        symbols.sort();
        symbols.dedup();

        if symbols.is_empty() {
            FALLBACK_TICKERS.iter().map(|s| s.to_string()).collect()
        } else {
            symbols
        }
    }

    /// Load the full history for `symbol`.
    pub fn load(&self, symbol: &str) -> Result<PriceSeries, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::NotFound(symbol.to_string()));
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| DataError::DataFormat(format!("Failed to read {file_name}: {e}")))?;

        let headers = reader
            .headers()
            .map_err(|e| DataError::DataFormat(format!("Failed to read {file_name}: {e}")))?
            .clone();

        let mut columns = [0usize; 6];
        for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
                let mut need: Vec<&str> = REQUIRED_COLUMNS[1..].to_vec();
                need.sort_unstable();
                DataError::DataFormat(format!("Bad columns in {file_name}. Need {need:?}"))
            })?;
        }
        let [date_col, open_col, high_col, low_col, close_col, volume_col] = columns;

        let mut bars = Vec::new();
        for (row_no, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| DataError::DataFormat(format!("Failed to read {file_name}: {e}")))?;
            let bad_row = |what: &str| {
                DataError::DataFormat(format!(
                    "Failed to read {file_name}: row {} has an unparseable {what}",
                    row_no + 2
                ))
            };
            let number = |col: usize, what: &str| -> Result<f64, DataError> {
                record
                    .get(col)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .ok_or_else(|| bad_row(what))
            };

            let date = record
                .get(date_col)
                .and_then(parse_date)
                .ok_or_else(|| bad_row("Date"))?;

            bars.push(Bar {
                date,
                open: number(open_col, "Open")?,
                high: number(high_col, "High")?,
                low: number(low_col, "Low")?,
                close: number(close_col, "Close")?,
                volume: number(volume_col, "Volume")?,
            });
        }

        debug!(symbol, rows = bars.len(), "price history loaded");
        Ok(PriceSeries::new(symbol, bars))
    }
}

/// Accepts plain dates, naive date-times and RFC 3339 timestamps.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.date_naive());
    }
    None
}

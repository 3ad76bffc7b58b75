// =============================================================================
// Market Summary — plain-text data digest for the chat assistant
// =============================================================================
//
// The summary is the factual context handed to the model and, when no model
// answer is available, the answer itself.

use crate::indicators::sma::current_sma;
use crate::market_data::{PriceSeries, Quote, YearStats};
use crate::types::{ChatAnswer, Origin};

const DASH: &str = "—";

/// Build the multi-line summary for `display` (the selected period) using
/// `full` for the 52-week figures.
pub fn market_summary(full: &PriceSeries, display: &PriceSeries, period: &str) -> String {
    let symbol = display.symbol.to_uppercase();
    let closes = display.closes();
    let quote = Quote::from_series(display);
    let year = YearStats::from_series(full);

    let mut last_line = match &quote {
        Some(q) => format!("Last close: {:.2}", q.last_close),
        None => format!("Last close: {DASH}"),
    };
    if let Some((change, pct)) = quote.as_ref().and_then(|q| q.change.zip(q.change_pct)) {
        last_line.push_str(&format!("  Change: {change:+.2} ({pct:+.2}%)"));
    }

    let fmt_opt = |v: Option<f64>| v.map_or_else(|| DASH.to_string(), |x| format!("{x:.2}"));

    let lines = [
        format!("Symbol: {symbol}  Period: {period}"),
        last_line,
        format!(
            "52W High: {}  52W Low: {}",
            fmt_opt(year.high_52w),
            fmt_opt(year.low_52w)
        ),
        format!(
            "Avg Vol (1y): {}",
            year.avg_volume_1y
                .map_or_else(|| DASH.to_string(), |v| group_thousands(v as u64))
        ),
        format!("SMA20: {}", fmt_opt(current_sma(&closes, 20))),
        format!("SMA50: {}", fmt_opt(current_sma(&closes, 50))),
    ];
    lines.join("\n")
}

/// Answer used when no credential is configured.
pub fn unconfigured_answer(summary: &str) -> ChatAnswer {
    ChatAnswer {
        answer: format!("GROQ_API_KEY is not set. Here's a data-driven summary:\n\n{summary}"),
        origin: Origin::Heuristic,
    }
}

/// Answer used when the model call fails or returns nothing usable.
pub fn unavailable_answer(summary: &str) -> ChatAnswer {
    ChatAnswer {
        answer: format!(
            "The language model is unavailable right now. Here's a data-driven summary:\n\n{summary}"
        ),
        origin: Origin::Heuristic,
    }
}

/// `1234567` -> `"1,234,567"`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

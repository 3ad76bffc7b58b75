// =============================================================================
// Heuristic Classifiers
// =============================================================================
//
// Deterministic fallbacks that need no external service. Every function here
// returns a complete, schema-valid result for any input.

pub mod market_summary;
pub mod sentiment;
pub mod trend;

pub use market_summary::market_summary;
pub use sentiment::{no_recent_headlines, summarize_headlines};
pub use trend::classify_trend;

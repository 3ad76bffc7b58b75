pub mod price_store;
pub mod stats;

pub use price_store::{DataError, Period, PriceSeries, PriceStore};
pub use stats::{Quote, YearStats};

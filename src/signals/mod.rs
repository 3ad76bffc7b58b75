pub mod trend_features;

pub use trend_features::TrendFeatures;

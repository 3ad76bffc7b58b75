// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the trend
// classifier and the history endpoint. Functions that need a minimum amount of
// history return `Option<T>` (or a series of options) so callers are forced to
// handle the insufficient-data case explicitly.

pub mod ema;
pub mod regression;
pub mod roc;
pub mod sma;

//! Technical indicator computation over daily bar series.
//!
//! All functions take ascending-time inputs and return `None` when the
//! series is too short; insufficient history is a fallback branch, not
//! an error.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

mod snapshot;

pub use macd::MacdOutput;
pub use snapshot::{TechnicalSnapshot, MIN_BARS};

pub mod bars;
pub mod snapshot;

pub use bars::{DailyBar, MinuteBar};
pub use snapshot::{NewsItem, RawTickerSnapshot, SymbolMetrics};

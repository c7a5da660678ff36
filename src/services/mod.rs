pub mod float;
pub mod news;
pub mod snapshots;

pub use float::{FloatProvider, HttpFloatClient};
pub use news::{HttpNewsClient, NewsArticle, NewsProvider};
pub use snapshots::{MoverDirection, PolygonSnapshotClient, SnapshotProvider};

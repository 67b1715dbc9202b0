pub mod config;
pub mod error;
pub mod feed;
pub mod screen;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use feed::{FeedDataSource, FeedItem, ItemId, MemorySource, Page, RemoteSource};
pub use screen::{FeedNotice, FeedScreen, ScreenEvent};

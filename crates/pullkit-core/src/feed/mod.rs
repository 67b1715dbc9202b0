pub mod memory;
pub mod models;
pub mod remote;
pub mod source;

pub use memory::MemorySource;
pub use models::{FeedItem, ItemId, Page};
pub use remote::RemoteSource;
pub use source::FeedDataSource;

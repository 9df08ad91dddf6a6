pub mod database;
pub mod fetcher;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoStore;
pub use fetcher::{NotificationFetcher, NOTIFICATIONS_COLLECTION, TIMESTAMP_FIELD};
pub use memory::InMemoryStore;
pub use self::metrics::record_fetch;
pub use store::{DocumentStore, SortDirection, StoreQueryError, StoredDocument};

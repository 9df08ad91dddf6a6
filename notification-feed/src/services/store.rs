use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Sort specifier as MongoDB expects it.
    pub fn as_mongo(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// A document as handed back by a store: its identifier and its own fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Any failure while reading from the document store.
///
/// `Display` is what clients see as the failure message, so backend errors
/// carry the backend's own text unchanged.
#[derive(Debug, Error)]
pub enum StoreQueryError {
    #[error("{0}")]
    Backend(String),

    #[error("documents in '{collection}' cannot be ordered by '{field}': {reason}")]
    UnorderableSortKey {
        collection: String,
        field: String,
        reason: String,
    },

    #[error("document in '{collection}' has no usable identifier")]
    MissingIdentifier { collection: String },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of `collection`, ordered by `order_by`.
    async fn query(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<StoredDocument>, StoreQueryError>;

    async fn health_check(&self) -> Result<(), StoreQueryError>;

    fn backend_name(&self) -> &'static str;
}

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::{FindOptions, IndexOptions},
    Client as MongoClient, Database, IndexModel,
};
use serde_json::{Map, Value};
use service_core::error::AppError;

use super::fetcher::{NOTIFICATIONS_COLLECTION, TIMESTAMP_FIELD};
use super::store::{DocumentStore, SortDirection, StoreQueryError, StoredDocument};

const MONGO_ID_FIELD: &str = "_id";

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for notification-feed");

        // Backs the newest-first listing
        let mut keys = Document::new();
        keys.insert(TIMESTAMP_FIELD, SortDirection::Descending.as_mongo());

        let timestamp_index = IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .name("timestamp_desc_idx".to_string())
                    .build(),
            )
            .build();

        self.db
            .collection::<Document>(NOTIFICATIONS_COLLECTION)
            .create_index(timestamp_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create timestamp index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn query(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<StoredDocument>, StoreQueryError> {
        let mut sort = Document::new();
        sort.insert(order_by, direction.as_mongo());

        let find_options = FindOptions::builder().sort(sort).build();

        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(None, find_options)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "Failed to query documents: {}", e);
                StoreQueryError::Backend(e.to_string())
            })?;

        let documents: Vec<Document> = cursor.try_collect().await.map_err(|e| {
            tracing::error!(collection = %collection, "Failed to collect documents: {}", e);
            StoreQueryError::Backend(e.to_string())
        })?;

        documents
            .into_iter()
            .map(|document| into_stored_document(collection, document))
            .collect()
    }

    async fn health_check(&self) -> Result<(), StoreQueryError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreQueryError::Backend(e.to_string())
            })?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

/// Split a raw BSON document into its identifier and its remaining fields.
///
/// ObjectIds become their hex form and string ids are kept as-is; any other
/// id type is rendered as relaxed extended JSON. Field values are converted
/// to relaxed extended JSON as well.
pub(crate) fn into_stored_document(
    collection: &str,
    mut document: Document,
) -> Result<StoredDocument, StoreQueryError> {
    let id = match document.remove(MONGO_ID_FIELD) {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(id)) => id,
        None | Some(Bson::Null) | Some(Bson::Undefined) => {
            return Err(StoreQueryError::MissingIdentifier {
                collection: collection.to_string(),
            })
        }
        Some(other) => match other.into_relaxed_extjson() {
            Value::String(s) => s,
            value => value.to_string(),
        },
    };

    let fields: Map<String, Value> = document
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();

    Ok(StoredDocument::new(id, fields))
}

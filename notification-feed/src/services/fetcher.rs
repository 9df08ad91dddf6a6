use std::sync::Arc;

use crate::models::Notification;

use super::metrics::record_fetch;
use super::store::{DocumentStore, SortDirection, StoreQueryError};

pub const NOTIFICATIONS_COLLECTION: &str = "notifications";
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Reads the notification feed, newest first.
///
/// Holds nothing but the shared store handle; every call is one fresh query
/// with no retry and no caching.
#[derive(Clone)]
pub struct NotificationFetcher {
    store: Arc<dyn DocumentStore>,
}

impl NotificationFetcher {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self), fields(backend = self.store.backend_name()))]
    pub async fn fetch(&self) -> Result<Vec<Notification>, StoreQueryError> {
        tracing::info!(
            collection = NOTIFICATIONS_COLLECTION,
            "Fetching notifications"
        );

        let result = self
            .store
            .query(
                NOTIFICATIONS_COLLECTION,
                TIMESTAMP_FIELD,
                SortDirection::Descending,
            )
            .await;

        match result {
            Ok(documents) => {
                let notifications: Vec<Notification> = documents
                    .into_iter()
                    .map(|document| Notification::new(document.id, document.fields))
                    .collect();

                tracing::info!(count = notifications.len(), "Notifications retrieved");
                tracing::debug!(
                    payload = %serde_json::to_string(&notifications).unwrap_or_default(),
                    "Notification payload"
                );
                record_fetch("success");
                Ok(notifications)
            }
            Err(e) => {
                tracing::error!(error = %e, "Notification fetch failed");
                record_fetch("failure");
                Err(e)
            }
        }
    }
}

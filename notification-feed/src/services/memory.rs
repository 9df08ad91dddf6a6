use async_trait::async_trait;
use serde_json::{Map, Value};
use service_core::error::AppError;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::models::ID_FIELD;

use super::store::{DocumentStore, SortDirection, StoreQueryError, StoredDocument};

/// In-process document store for local development and tests.
///
/// Documents are fixed at construction time, either in code or from a seed
/// file (see [`InMemoryStore::from_seed_json`]). A store built with
/// [`InMemoryStore::failing`] rejects every query and health check with the
/// given message.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: HashMap<String, Vec<StoredDocument>>,
    failure: Option<String>,
    query_count: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_document(mut self, collection: &str, document: StoredDocument) -> Self {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        self
    }

    pub fn with_documents(
        self,
        collection: &str,
        documents: impl IntoIterator<Item = StoredDocument>,
    ) -> Self {
        documents
            .into_iter()
            .fold(self, |store, document| store.with_document(collection, document))
    }

    /// Build a store from a seed document mapping collection names to arrays
    /// of objects. Each object needs a string `id`, which becomes the
    /// document identifier; the other keys are its fields.
    ///
    /// ```json
    /// { "notifications": [ { "id": "a", "timestamp": 1, "title": "..." } ] }
    /// ```
    pub fn from_seed_json(seed: &str) -> Result<Self, AppError> {
        let seed: HashMap<String, Vec<Map<String, Value>>> = serde_json::from_str(seed)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid memory store seed: {}", e)))?;

        let mut store = Self::new();
        for (collection, documents) in seed {
            for (index, mut fields) in documents.into_iter().enumerate() {
                let id = match fields.remove(ID_FIELD) {
                    Some(Value::String(id)) if !id.is_empty() => id,
                    _ => {
                        return Err(AppError::ConfigError(anyhow::anyhow!(
                            "Seed document {} in '{}' has no string id",
                            index,
                            collection
                        )))
                    }
                };
                store = store.with_document(&collection, StoredDocument::new(id, fields));
            }
        }

        Ok(store)
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read memory store seed {}: {}",
                path.display(),
                e
            ))
        })?;

        let store = Self::from_seed_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            documents = store.collections.values().map(Vec::len).sum::<usize>(),
            "Loaded memory store seed"
        );
        Ok(store)
    }

    pub fn query_count(&self) -> u64 {
        self.query_count.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn query(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<StoredDocument>, StoreQueryError> {
        self.query_count.fetch_add(1, AtomicOrdering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(StoreQueryError::Backend(message.clone()));
        }

        let mut documents = self
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();

        let keys = sort_keys(collection, order_by, &documents)?;
        let mut keyed: Vec<(SortKey, StoredDocument)> = keys.into_iter().zip(documents.drain(..)).collect();

        // Stable, so documents with equal keys keep insertion order
        keyed.sort_by(|(a, _), (b, _)| match direction {
            SortDirection::Ascending => a.compare(b),
            SortDirection::Descending => b.compare(a),
        });

        Ok(keyed.into_iter().map(|(_, document)| document).collect())
    }

    async fn health_check(&self) -> Result<(), StoreQueryError> {
        match &self.failure {
            Some(message) => Err(StoreQueryError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    /// Integers are kept exact; nanosecond epochs exceed f64 precision.
    Int(i128),
    Float(f64),
    Text(String),
}

impl SortKey {
    fn is_numeric(&self) -> bool {
        !matches!(self, SortKey::Text(_))
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Int(a), SortKey::Int(b)) => a.cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => a.total_cmp(b),
            (SortKey::Int(a), SortKey::Float(b)) => compare_int_float(*a, *b),
            (SortKey::Float(a), SortKey::Int(b)) => compare_int_float(*b, *a).reverse(),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // sort_keys never mixes numbers and text
            (SortKey::Text(_), _) => Ordering::Greater,
            (_, SortKey::Text(_)) => Ordering::Less,
        }
    }
}

/// Exact comparison of an integer against a finite float.
fn compare_int_float(int: i128, float: f64) -> Ordering {
    // Beyond the i128 range the float wins outright
    if float >= i128::MAX as f64 {
        return Ordering::Less;
    }
    if float < i128::MIN as f64 {
        return Ordering::Greater;
    }

    let floor = float.floor();
    match int.cmp(&(floor as i128)) {
        Ordering::Equal if float > floor => Ordering::Less,
        ordering => ordering,
    }
}

fn numeric_key(n: &serde_json::Number) -> Option<SortKey> {
    if let Some(i) = n.as_i64() {
        Some(SortKey::Int(i128::from(i)))
    } else if let Some(u) = n.as_u64() {
        Some(SortKey::Int(i128::from(u)))
    } else {
        n.as_f64().filter(|f| f.is_finite()).map(SortKey::Float)
    }
}

/// Extract the sort key of every document. All keys must be present and of
/// one kind (all numbers or all strings).
fn sort_keys(
    collection: &str,
    field: &str,
    documents: &[StoredDocument],
) -> Result<Vec<SortKey>, StoreQueryError> {
    let unorderable = |reason: String| StoreQueryError::UnorderableSortKey {
        collection: collection.to_string(),
        field: field.to_string(),
        reason,
    };

    let keys = documents
        .iter()
        .map(|document| match document.fields.get(field) {
            Some(Value::Number(n)) => numeric_key(n)
                .ok_or_else(|| unorderable(format!("document '{}' has a non-finite value", document.id))),
            Some(Value::String(s)) => Ok(SortKey::Text(s.clone())),
            Some(other) => Err(unorderable(format!(
                "document '{}' has a non-comparable value {}",
                document.id, other
            ))),
            None => Err(unorderable(format!("document '{}' has no value", document.id))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let numbers = keys.iter().filter(|k| k.is_numeric()).count();
    if numbers != 0 && numbers != keys.len() {
        return Err(unorderable("numeric and string values are mixed".to_string()));
    }

    Ok(keys)
}

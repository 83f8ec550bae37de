use crate::{
    database::{
        keys::{from_db_document, store_key, to_db_document, VERSION_FIELD},
        query::{self, Query}
    },
    model::error::ValidationError
};
use bson::Bson;
use serde::{de::DeserializeOwned, Serialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// A top-level document persisted in its own collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    const COLLECTION: &'static str;
    /// Struct field holding the identity. A field named `id` is stored as `_id`.
    const ID_FIELD: &'static str = "id";

    fn key(&self) -> Bson;

    /// Documents that return a version are updated with compare-and-swap.
    fn version(&self) -> Option<u64> {
        None
    }

    fn set_version(&mut self, _version: u64) {}

    /// Re-establishes invariants after construction or after loading.
    fn post_init(&mut self) {}

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} document {key} not found")]
    NotFound { collection: &'static str, key: String },

    #[error("{collection} document {key} was modified concurrently (expected version {expected})")]
    VersionConflict {
        collection: &'static str,
        key: String,
        expected: u64
    },

    #[error("{collection} document {key} already exists")]
    Duplicate { collection: &'static str, key: String },

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] bson::ser::Error),

    #[error("Failed to deserialize document: {0}")]
    Deserialize(#[from] bson::de::Error),

    #[error("Failed to convert web document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Mongo(#[from] mongodb::error::Error)
}

impl StoreError {
    pub fn not_found<D: Document>(key: &Bson) -> StoreError {
        StoreError::NotFound {
            collection: D::COLLECTION,
            key: key.to_string()
        }
    }
}

/// The storage boundary. Single-document operations are atomic; nothing here
/// coordinates writes across documents.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn get<D: Document>(&self, key: &Bson) -> Result<Option<D>, StoreError>;

    async fn find<D: Document>(&self, query: &Query) -> Result<Vec<D>, StoreError>;

    async fn insert<D: Document>(&self, document: &D) -> Result<(), StoreError>;

    /// Replaces the stored document. Versioned documents are only written when
    /// the stored version still equals `document.version()`; on success the
    /// version is bumped both in the store and on `document`.
    async fn update<D: Document>(&self, document: &mut D) -> Result<(), StoreError>;

    /// Returns whether a document was removed.
    async fn delete<D: Document>(&self, key: &Bson) -> Result<bool, StoreError>;

    /// Removes `document` only if the stored copy still has its version.
    async fn delete_versioned<D: Document>(&self, document: &D) -> Result<(), StoreError>;

    async fn fetch<D: Document>(&self, key: &Bson) -> Result<D, StoreError> {
        self.get(key).await?.ok_or_else(|| StoreError::not_found::<D>(key))
    }

    async fn all<D: Document>(&self) -> Result<Vec<D>, StoreError> {
        self.find(&Query::default()).await
    }

    async fn find_first<D: Document>(&self, query: Query) -> Result<Option<D>, StoreError> {
        Ok(self.find(&query.limit(1)).await?.into_iter().next())
    }
}

pub(crate) fn stored_version(document: &bson::Document) -> u64 {
    match document.get(VERSION_FIELD) {
        Some(Bson::Int32(v)) => *v as u64,
        Some(Bson::Int64(v)) => *v as u64,
        _ => 0
    }
}

/// Keeps documents in their store form, so the key adapter and validation run
/// exactly as they do against MongoDB.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<&'static str, Vec<bson::Document>>>>
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn position<D: Document>(documents: &[bson::Document], key: &Bson) -> Option<usize> {
        let field = store_key::<D>();
        documents.iter().position(|d| d.get(field) == Some(key))
    }

    fn version_conflict<D: Document>(key: &Bson, expected: u64) -> StoreError {
        StoreError::VersionConflict {
            collection: D::COLLECTION,
            key: key.to_string(),
            expected
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn get<D: Document>(&self, key: &Bson) -> Result<Option<D>, StoreError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(D::COLLECTION) else {
            return Ok(None);
        };

        Self::position::<D>(documents, key)
            .map(|i| from_db_document(documents[i].clone()))
            .transpose()
    }

    async fn find<D: Document>(&self, query: &Query) -> Result<Vec<D>, StoreError> {
        let collections = self.collections.read().await;

        let mut found: Vec<&bson::Document> = collections
            .get(D::COLLECTION)
            .into_iter()
            .flatten()
            .filter(|d| query::matches(d, &query.filter))
            .collect();

        if let Some(sort) = &query.sort {
            found.sort_by(|a, b| query::compare(a, b, sort));
        }

        let limit = query.limit.filter(|l| *l > 0).map_or(usize::MAX, |l| l as usize);

        found
            .into_iter()
            .take(limit)
            .map(|d| from_db_document(d.clone()))
            .collect()
    }

    async fn insert<D: Document>(&self, document: &D) -> Result<(), StoreError> {
        document.validate()?;
        let stored = to_db_document(document)?;
        let key = document.key();

        let mut collections = self.collections.write().await;
        let documents = collections.entry(D::COLLECTION).or_default();

        if Self::position::<D>(documents, &key).is_some() {
            return Err(StoreError::Duplicate {
                collection: D::COLLECTION,
                key: key.to_string()
            });
        }

        documents.push(stored);
        debug!("Inserted {} document {}", D::COLLECTION, key);

        Ok(())
    }

    async fn update<D: Document>(&self, document: &mut D) -> Result<(), StoreError> {
        document.validate()?;
        let key = document.key();

        let mut collections = self.collections.write().await;
        let documents = collections.entry(D::COLLECTION).or_default();
        let index = Self::position::<D>(documents, &key).ok_or_else(|| StoreError::not_found::<D>(&key))?;

        let mut next = document.clone();
        if let Some(expected) = document.version() {
            if stored_version(&documents[index]) != expected {
                return Err(Self::version_conflict::<D>(&key, expected));
            }
            next.set_version(expected + 1);
        }

        documents[index] = to_db_document(&next)?;
        *document = next;

        Ok(())
    }

    async fn delete<D: Document>(&self, key: &Bson) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(D::COLLECTION) else {
            return Ok(false);
        };

        match Self::position::<D>(documents, key) {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false)
        }
    }

    async fn delete_versioned<D: Document>(&self, document: &D) -> Result<(), StoreError> {
        let key = document.key();

        let mut collections = self.collections.write().await;
        let documents = collections.entry(D::COLLECTION).or_default();
        let index = Self::position::<D>(documents, &key).ok_or_else(|| StoreError::not_found::<D>(&key))?;

        if let Some(expected) = document.version() {
            if stored_version(&documents[index]) != expected {
                return Err(Self::version_conflict::<D>(&key, expected));
            }
        }

        documents.remove(index);
        debug!("Deleted {} document {}", D::COLLECTION, key);

        Ok(())
    }
}

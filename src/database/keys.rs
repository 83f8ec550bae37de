//! Store form <-> web form.
//!
//! Documents are declared with their web field names. A document whose
//! identity field is `id` keeps it as `id` for API consumers and stores it as
//! `_id`. Every load re-runs `post_init` and `validate`, so stored documents
//! that violate an invariant never reach business logic.

use crate::database::store::{Document, StoreError};

pub const DB_ID_KEY: &str = "_id";
pub const WEB_ID_KEY: &str = "id";
pub const VERSION_FIELD: &str = "version";

/// Field the store filters on for `D`.
pub fn store_key<D: Document>() -> &'static str {
    if D::ID_FIELD == WEB_ID_KEY {
        DB_ID_KEY
    } else {
        D::ID_FIELD
    }
}

pub fn to_db_document<D: Document>(document: &D) -> Result<bson::Document, StoreError> {
    let mut stored = bson::to_document(document)?;

    if D::ID_FIELD == WEB_ID_KEY {
        if let Some(id) = stored.remove(WEB_ID_KEY) {
            stored.insert(DB_ID_KEY, id);
        }
    }

    Ok(stored)
}

pub fn from_db_document<D: Document>(mut stored: bson::Document) -> Result<D, StoreError> {
    if D::ID_FIELD == WEB_ID_KEY {
        if let Some(id) = stored.remove(DB_ID_KEY) {
            stored.insert(WEB_ID_KEY, id);
        }
    }

    loaded(bson::from_document(stored)?)
}

pub fn to_web_json<D: Document>(document: &D) -> Result<serde_json::Value, StoreError> {
    Ok(serde_json::to_value(document)?)
}

pub fn from_web_json<D: Document>(value: serde_json::Value) -> Result<D, StoreError> {
    loaded(serde_json::from_value(value)?)
}

fn loaded<D: Document>(mut document: D) -> Result<D, StoreError> {
    document.post_init();
    document.validate()?;

    Ok(document)
}

use super::{
    keys::{from_db_document, store_key, to_db_document},
    query::{versioned_key_filter, Query},
    store::{stored_version, Document, DocumentStore, StoreError}
};
use bson::Bson;
use futures::TryStreamExt;
use mongodb::{
    error::{Error, ErrorKind, WriteFailure},
    options::FindOptions,
    Client, Collection, Database
};
use tracing::{debug, info};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct DbClient {
    database: Database
}

impl DbClient {
    // Connect to the database and return a DbClient instance
    pub async fn connect(connection_str: &str, database: &str) -> Result<Self, Error> {
        let client = Client::with_uri_str(connection_str).await?;
        let database = client.database(database);

        // The driver connects lazily, ping so a bad connection string fails here
        database.run_command(bson::doc! { "ping": 1 }, None).await?;
        info!("Connected to database {}", database.name());

        Ok(DbClient { database })
    }

    fn collection<D: Document>(&self) -> Collection<bson::Document> {
        self.database.collection(D::COLLECTION)
    }

    fn key_filter<D: Document>(key: &Bson) -> bson::Document {
        versioned_key_filter(store_key::<D>(), key, None)
    }

    /// Explains a versioned write that matched nothing.
    async fn missed_write<D: Document>(&self, key: &Bson, expected: Option<u64>) -> Result<StoreError, StoreError> {
        let current = self
            .collection::<D>()
            .find_one(Self::key_filter::<D>(key), None)
            .await?;

        Ok(match (current, expected) {
            (Some(stored), Some(expected)) => {
                debug!(
                    "Version conflict on {} {}: stored {}, expected {}",
                    D::COLLECTION,
                    key,
                    stored_version(&stored),
                    expected
                );
                StoreError::VersionConflict {
                    collection: D::COLLECTION,
                    key: key.to_string(),
                    expected
                }
            }
            _ => StoreError::not_found::<D>(key)
        })
    }
}

fn is_duplicate_key(error: &Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}

impl DocumentStore for DbClient {
    async fn get<D: Document>(&self, key: &Bson) -> Result<Option<D>, StoreError> {
        let stored = self.collection::<D>().find_one(Self::key_filter::<D>(key), None).await?;

        stored.map(from_db_document).transpose()
    }

    async fn find<D: Document>(&self, query: &Query) -> Result<Vec<D>, StoreError> {
        let options = FindOptions::builder()
            .sort(query.sort.clone())
            .limit(query.limit)
            .build();
        let cursor = self.collection::<D>().find(query.filter.clone(), options).await?;
        let stored: Vec<bson::Document> = cursor.try_collect().await?;

        debug!("Fetched {} {} documents", stored.len(), D::COLLECTION);
        stored.into_iter().map(from_db_document).collect()
    }

    async fn insert<D: Document>(&self, document: &D) -> Result<(), StoreError> {
        document.validate()?;
        let stored = to_db_document(document)?;

        match self.collection::<D>().insert_one(stored, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate {
                collection: D::COLLECTION,
                key: document.key().to_string()
            }),
            Err(e) => Err(e.into())
        }
    }

    async fn update<D: Document>(&self, document: &mut D) -> Result<(), StoreError> {
        document.validate()?;
        let key = document.key();
        let expected = document.version();
        let filter = versioned_key_filter(store_key::<D>(), &key, expected);

        let mut next = document.clone();
        if let Some(expected) = expected {
            next.set_version(expected + 1);
        }

        let result = self
            .collection::<D>()
            .replace_one(filter, to_db_document(&next)?, None)
            .await?;

        if result.matched_count == 0 {
            return Err(self.missed_write::<D>(&key, expected).await?);
        }

        *document = next;
        Ok(())
    }

    async fn delete<D: Document>(&self, key: &Bson) -> Result<bool, StoreError> {
        let result = self
            .collection::<D>()
            .delete_one(Self::key_filter::<D>(key), None)
            .await?;

        Ok(result.deleted_count > 0)
    }

    async fn delete_versioned<D: Document>(&self, document: &D) -> Result<(), StoreError> {
        let key = document.key();
        let expected = document.version();

        let result = self
            .collection::<D>()
            .delete_one(versioned_key_filter(store_key::<D>(), &key, expected), None)
            .await?;

        if result.deleted_count == 0 {
            return Err(self.missed_write::<D>(&key, expected).await?);
        }

        Ok(())
    }
}

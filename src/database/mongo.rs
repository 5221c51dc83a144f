//! MongoDB document store.

use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::options::{ClientOptions, FindOptions, ReplaceOptions};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::store::{DocumentStore, StorageError};

/// One stored document: `_id` is the document key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDocument {
    #[serde(rename = "_id")]
    key: String,
    body: Bson,
}

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        let db = client.database(db_name);

        Ok(Self { client, db })
    }

    /// Get a typed collection from the database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Document store over the `documents` collection. Logs get a
    /// collection of their own, named after the log.
    pub fn documents(&self) -> MongoStore {
        MongoStore {
            collection: self.collection("documents"),
            db: self.db.clone(),
        }
    }

    /// Close the connection pool.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

/// Keeps each document as a single MongoDB record, and each log record
/// as a record of its own.
pub struct MongoStore {
    collection: Collection<StoredDocument>,
    db: mongodb::Database,
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let stored = self
            .collection
            .find_one(doc! { "_id": key })
            .await
            .map_err(|e| StorageError::backend(key, e))?;

        Ok(stored.map(|d| d.body.into_relaxed_extjson()))
    }

    async fn save(&self, key: &str, document: &Value) -> Result<(), StorageError> {
        let body = bson::to_bson(document).map_err(|e| StorageError::corrupt(key, e))?;
        let stored = StoredDocument {
            key: key.to_string(),
            body,
        };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(doc! { "_id": key }, &stored)
            .with_options(options)
            .await
            .map_err(|e| StorageError::backend(key, e))?;

        debug!("Saved document '{}' to MongoDB", key);
        Ok(())
    }

    async fn append(&self, log: &str, record: &Value) -> Result<(), StorageError> {
        let record = bson::to_document(record).map_err(|e| StorageError::corrupt(log, e))?;

        self.db
            .collection::<Document>(log)
            .insert_one(record)
            .await
            .map_err(|e| StorageError::backend(log, e))?;

        Ok(())
    }

    async fn read_log(&self, log: &str) -> Result<Vec<Value>, StorageError> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let mut cursor = self
            .db
            .collection::<Document>(log)
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| StorageError::backend(log, e))?;

        let mut records = Vec::new();
        while let Some(result) = cursor.next().await {
            match result {
                Ok(mut record) => {
                    record.remove("_id");
                    records.push(Bson::Document(record).into_relaxed_extjson());
                }
                Err(e) => warn!("Skipping unreadable record in '{}': {}", log, e),
            }
        }

        Ok(records)
    }
}

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::doc;
use mongodb::{Database, IndexModel};
use thiserror::Error;

use crate::models::Watch;

/// Storage-layer failure. The only error class allowed to abort an
/// enclosing command or scan cycle.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("storage i/o: {0}")]
    Io(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Persisted table of watch conditions. Every method is a single storage
/// operation, so concurrent callers never observe a half-applied row.
#[async_trait]
pub trait WatchStore: Send + Sync {
    /// Inserts a new active watch. Duplicates for the same (owner, symbol)
    /// are allowed and create independent rows.
    async fn create(
        &self,
        user_id: i64,
        symbol: &str,
        target_price: f64,
    ) -> Result<Watch, StoreError>;

    /// Flips `active` to false on every active row matching (owner, symbol).
    /// A no-op when nothing matches; rows are kept as history.
    async fn deactivate(&self, user_id: i64, symbol: &str) -> Result<(), StoreError>;

    /// All active watches for one owner.
    async fn list_active(&self, user_id: i64) -> Result<Vec<Watch>, StoreError>;

    /// Distinct owners with at least one active watch. Used by the scan loop.
    async fn list_active_users(&self) -> Result<Vec<i64>, StoreError>;
}

#[derive(Clone)]
pub struct MongoWatchStore {
    db: Database,
}

impl MongoWatchStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn watches(&self) -> mongodb::Collection<Watch> {
        self.db.collection::<Watch>("watches")
    }

    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let col = self.db.collection::<mongodb::bson::Document>("watches");

        // per-owner listing
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "active": 1 })
            .build();
        col.create_index(model, None).await?;

        // monitor scan over active rows
        let model = IndexModel::builder()
            .keys(doc! { "active": 1, "symbol": 1 })
            .build();
        col.create_index(model, None).await?;

        Ok(())
    }
}

#[async_trait]
impl WatchStore for MongoWatchStore {
    async fn create(
        &self,
        user_id: i64,
        symbol: &str,
        target_price: f64,
    ) -> Result<Watch, StoreError> {
        let watch = Watch {
            id: mongodb::bson::oid::ObjectId::new(),
            user_id,
            symbol: symbol.to_uppercase(),
            target_price,
            active: true,
            created_at: Utc::now().timestamp(),
            deactivated_at: None,
        };

        self.watches().insert_one(&watch, None).await?;

        Ok(watch)
    }

    async fn deactivate(&self, user_id: i64, symbol: &str) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();

        self.watches()
            .update_many(
                doc! { "user_id": user_id, "symbol": symbol, "active": true },
                doc! { "$set": { "active": false, "deactivated_at": now } },
                None,
            )
            .await?;

        Ok(())
    }

    async fn list_active(&self, user_id: i64) -> Result<Vec<Watch>, StoreError> {
        let mut cursor = self
            .watches()
            .find(doc! { "user_id": user_id, "active": true }, None)
            .await?;

        let mut items: Vec<Watch> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }

        Ok(items)
    }

    async fn list_active_users(&self) -> Result<Vec<i64>, StoreError> {
        let values = self
            .watches()
            .distinct("user_id", doc! { "active": true }, None)
            .await?;

        Ok(values.iter().filter_map(|v| v.as_i64()).collect())
    }
}

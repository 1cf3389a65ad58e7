use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures_util::TryStreamExt;
use mongodb::{Collection, Database};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::db::USERS_COLLECTION;
use crate::users::entity::UserDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("malformed id: {0}")]
    MalformedId(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

fn parse_oid(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::MalformedId(id.to_string()))
}

/// Storage access for the users collection. Pure persistence; validation and
/// uniqueness policy live in the service layer.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<UserDocument>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserDocument>, StoreError>;

    async fn find_by_field(&self, field: &str, value: &str)
        -> Result<Option<UserDocument>, StoreError>;

    /// Insert a record and return its generated id.
    async fn insert(&self, user: &UserDocument) -> Result<ObjectId, StoreError>;

    /// `$set` merge of the supplied fields; false when the id matched nothing.
    async fn update_by_id(&self, id: &str, fields: Document) -> Result<bool, StoreError>;

    /// Returns the number of records removed.
    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError>;
}

/// MongoDB-backed implementation of [`UserStore`].
pub struct MongoUserStore {
    collection: Collection<UserDocument>,
}

impl MongoUserStore {
    pub fn new(db: Database) -> Self {
        Self {
            collection: db.collection::<UserDocument>(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<UserDocument>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let users = cursor.try_collect().await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<UserDocument>, StoreError> {
        let oid = parse_oid(id)?;
        let user = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(user)
    }

    #[instrument(skip(self, value))]
    async fn find_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<UserDocument>, StoreError> {
        let mut filter = Document::new();
        filter.insert(field, value);
        let user = self.collection.find_one(filter).await?;
        Ok(user)
    }

    #[instrument(skip(self, user))]
    async fn insert(&self, user: &UserDocument) -> Result<ObjectId, StoreError> {
        self.collection.insert_one(user).await?;
        Ok(user.id)
    }

    #[instrument(skip(self, fields))]
    async fn update_by_id(&self, id: &str, fields: Document) -> Result<bool, StoreError> {
        let oid = parse_oid(id)?;
        let result = self
            .collection
            .update_one(doc! { "_id": oid }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError> {
        let oid = parse_oid(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count)
    }
}

/// In-memory implementation used by tests and `AppState::fake()`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<ObjectId, UserDocument>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Result<Vec<UserDocument>, StoreError> {
        let users = self.users.read().await;
        let mut all: Vec<UserDocument> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserDocument>, StoreError> {
        let oid = parse_oid(id)?;
        let users = self.users.read().await;
        Ok(users.get(&oid).cloned())
    }

    async fn find_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<UserDocument>, StoreError> {
        let users = self.users.read().await;
        let found = users
            .values()
            .find(|u| match field {
                "name" => u.name == value,
                "email" => u.email == value,
                _ => false,
            })
            .cloned();
        Ok(found)
    }

    async fn insert(&self, user: &UserDocument) -> Result<ObjectId, StoreError> {
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());
        Ok(user.id)
    }

    async fn update_by_id(&self, id: &str, fields: Document) -> Result<bool, StoreError> {
        let oid = parse_oid(id)?;
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&oid) else {
            return Ok(false);
        };
        for (key, value) in fields {
            match (key.as_str(), value) {
                ("name", Bson::String(v)) => user.name = v,
                ("email", Bson::String(v)) => user.email = v,
                ("password", Bson::String(v)) => user.password = v,
                ("updated_at", Bson::DateTime(v)) => user.updated_at = v.to_time_0_3(),
                _ => {}
            }
        }
        Ok(true)
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError> {
        let oid = parse_oid(id)?;
        let mut users = self.users.write().await;
        Ok(if users.remove(&oid).is_some() { 1 } else { 0 })
    }
}

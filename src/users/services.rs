use std::sync::Arc;

use bson::Document;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::users::dto::{CreateUser, UpdateUser};
use crate::users::entity::{User, UserDocument};
use crate::users::error::{UserError, UserResult};
use crate::users::password;
use crate::users::repo::{StoreError, UserStore};
use crate::users::validate;

/// Orchestrates validation, uniqueness checks, password hashing and
/// timestamping on top of an injected [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Lookup that folds a malformed id into NotFound; clients cannot tell a
    /// syntactically invalid id from an absent one.
    async fn fetch_by_id(&self, id: &str) -> UserResult<UserDocument> {
        match self.store.find_by_id(id).await {
            Ok(Some(doc)) => Ok(doc),
            Ok(None) => Err(UserError::NotFound(id.to_string())),
            Err(StoreError::MalformedId(_)) => Err(UserError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> UserResult<Vec<User>> {
        let docs = self.store.list().await?;
        Ok(docs.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> UserResult<User> {
        let doc = self.fetch_by_id(id).await?;
        Ok(User::from(doc))
    }

    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        let fields = validate::validate_create(input).map_err(UserError::Validation)?;

        if self
            .store
            .find_by_field("email", &fields.email)
            .await?
            .is_some()
        {
            warn!(email = %fields.email, "email already registered");
            return Err(UserError::EmailTaken(fields.email));
        }

        let hash = password::hash_password(&fields.password)?;
        let doc = UserDocument::new(fields.name, fields.email, hash, OffsetDateTime::now_utc());
        let id = self.store.insert(&doc).await?;

        // Re-fetch so the returned record reflects what the store persisted.
        let created = self.get_user(&id.to_hex()).await?;
        info!(user_id = %created.id, "user created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: &str, input: UpdateUser) -> UserResult<User> {
        // Existence first: an unknown id wins over validation errors in the body.
        self.fetch_by_id(id).await?;

        let fields = validate::validate_update(input).map_err(UserError::Validation)?;

        let mut set = Document::new();
        if let Some(name) = fields.name {
            set.insert("name", name);
        }
        if let Some(email) = fields.email {
            set.insert("email", email);
        }
        if let Some(password) = fields.password {
            set.insert("password", password::hash_password(&password)?);
        }
        set.insert(
            "updated_at",
            bson::DateTime::from_time_0_3(OffsetDateTime::now_utc()),
        );

        let matched = self.store.update_by_id(id, set).await?;
        if !matched {
            return Err(UserError::NotFound(id.to_string()));
        }

        let updated = self.get_user(id).await?;
        info!(user_id = %updated.id, "user updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        self.fetch_by_id(id).await?;

        let removed = self.store.delete_by_id(id).await?;
        if removed == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

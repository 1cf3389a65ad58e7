use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// User record as stored in the `users` collection.
///
/// The `password` field holds the Argon2 hash; this type is never serialized
/// to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub password: String, // Argon2 hash
    #[serde(with = "bson::serde_helpers::time_0_3_offsetdatetime_as_bson_datetime")]
    pub created_at: OffsetDateTime,
    #[serde(with = "bson::serde_helpers::time_0_3_offsetdatetime_as_bson_datetime")]
    pub updated_at: OffsetDateTime,
}

impl UserDocument {
    /// Fresh record: id assigned here, both timestamps from the same instant.
    pub fn new(name: String, email: String, password_hash: String, now: OffsetDateTime) -> Self {
        Self {
            id: ObjectId::new(),
            name,
            email,
            password: password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated in-memory form of a user, distinct from the raw stored shape.
#[derive(Debug, Clone)]
pub struct User {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            email: doc.email,
            password_hash: doc.password,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

//! User document as stored in the `users` collection.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use domain::{NewUser, User};

/// Collection holding user documents
pub const COLLECTION: &str = "users";

/// Name of the unique index on `email`
pub const EMAIL_INDEX: &str = "email_unique";

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    /// Left unset on insert so the store assigns it
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub encrypted_password: String,
}

impl From<NewUser> for UserDocument {
    fn from(user: NewUser) -> Self {
        Self {
            id: None,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            encrypted_password: user.encrypted_password,
        }
    }
}

/// Convert stored document to domain entity
impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        User {
            id: document.id.map(|id| id.to_hex()).unwrap_or_default(),
            first_name: document.first_name,
            last_name: document.last_name,
            email: document.email,
            encrypted_password: document.encrypted_password,
        }
    }
}

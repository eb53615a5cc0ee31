//! User domain entity and related types.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH, REDACTED};
use crate::validation::validate_email_shape;

/// User domain entity
///
/// `id` is the store-assigned identifier in its canonical string form and is
/// empty until the record has been inserted. The credential hash takes part
/// in storage but is skipped by `Serialize` and hidden from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub encrypted_password: String,
}

impl User {
    /// Check if the store has assigned an identifier yet
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    /// Apply a validated partial update. Only supplied fields change.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("encrypted_password", &REDACTED)
            .finish()
    }
}

/// User creation input
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserParams {
    /// User email address
    #[validate(custom(function = "validate_email_shape"))]
    pub email: String,
    /// Given name
    #[validate(length(min = MIN_NAME_LENGTH, message = "must not be empty"))]
    pub first_name: String,
    /// Family name
    #[validate(length(min = MIN_NAME_LENGTH, message = "must not be empty"))]
    pub last_name: String,
    /// Plain text password (minimum 7 characters), discarded after hashing
    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "must be at least 7 characters"))]
    pub password: String,
}

// Don't expose the plain text password in debug output
impl fmt::Debug for CreateUserParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserParams")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Partial user update input. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserParams {
    /// New given name
    #[validate(length(min = MIN_NAME_LENGTH, message = "must not be empty"))]
    pub first_name: Option<String>,
    /// New family name
    #[validate(length(min = MIN_NAME_LENGTH, message = "must not be empty"))]
    pub last_name: Option<String>,
}

impl UpdateUserParams {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

impl From<UpdateUserParams> for UserChanges {
    fn from(params: UpdateUserParams) -> Self {
        Self {
            first_name: params.first_name,
            last_name: params.last_name,
        }
    }
}

/// A validated user with its credential already hashed, ready to be stored.
#[derive(Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub encrypted_password: String,
}

impl NewUser {
    /// Build the record to insert from validated params and the credential hash.
    /// The plain text password is dropped here.
    pub fn from_params(params: CreateUserParams, encrypted_password: String) -> Self {
        Self {
            first_name: params.first_name,
            last_name: params.last_name,
            email: params.email,
            encrypted_password,
        }
    }

    /// Attach the identifier assigned by the store
    pub fn into_user(self, id: String) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            encrypted_password: self.encrypted_password,
        }
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("encrypted_password", &REDACTED)
            .finish()
    }
}

/// Validated partial update handed to the repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserChanges {
    /// True when there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

/// User response (safe to return to any external caller)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// User email address
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

//! User repository contract shared by every backing store.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use common::{AppError, AppResult};
use domain::{NewUser, User, UserChanges};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Implementations only persist what they are given: validation and hashing
/// happen before any of these methods is called.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID. Malformed IDs are a validation error.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// List all users in ascending ID order (insertion order)
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Persist a new user and return it with its assigned ID
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Set the supplied fields on an existing user. `None` if no user matches.
    async fn update(&self, id: &str, changes: UserChanges) -> AppResult<Option<User>>;

    /// Remove every user (environment reset only)
    async fn drop_all(&self) -> AppResult<()>;
}

/// Parse the canonical string form of a user ID.
pub fn parse_user_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id)
        .map_err(|_| AppError::validation("id", "must be a 24-character hex identifier"))
}

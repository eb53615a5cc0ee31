//! In-memory user repository implementation

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::{NewUser, User, UserChanges};

use super::user_repository::{parse_user_id, UserRepository};

/// In-memory implementation of UserRepository.
///
/// Keeps users in insertion order and follows the same ID format and email
/// uniqueness rules as the MongoDB repository.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let id = parse_user_id(id)?.to_hex();
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|existing| existing.email == user.email) {
            return Err(AppError::conflict("email"));
        }

        let user = user.into_user(ObjectId::new().to_hex());
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: &str, changes: UserChanges) -> AppResult<Option<User>> {
        let id = parse_user_id(id)?.to_hex();
        let mut users = self.users.write().await;

        Ok(users.iter_mut().find(|user| user.id == id).map(|user| {
            user.apply(changes);
            user.clone()
        }))
    }

    async fn drop_all(&self) -> AppResult<()> {
        self.users.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "James".to_string(),
            last_name: "St. James".to_string(),
            email: email.to_string(),
            encrypted_password: "encrypted".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_object_id() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("valid_email1@email.com")).await.unwrap();

        assert!(ObjectId::parse_str(&user.id).is_ok());
        assert_eq!(repo.find_by_id(&user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("a@email.com")).await.unwrap();
        let second = repo.create(new_user("b@email.com")).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("same@email.com")).await.unwrap();

        let err = repo.create(new_user("same@email.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_none() {
        let repo = InMemoryUserRepository::new();
        let changes = UserChanges {
            first_name: Some("X".to_string()),
            last_name: None,
        };

        let result = repo.update("000000000000000000000000", changes).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_uppercase_id_finds_same_user() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("case@email.com")).await.unwrap();

        let found = repo.find_by_id(&user.id.to_uppercase()).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_drop_all_clears() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("gone@email.com")).await.unwrap();

        repo.drop_all().await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.find_by_id(&user.id).await.unwrap().is_none());
    }
}

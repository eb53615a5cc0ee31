//! User store - validation, hashing and persistence of user accounts.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use common::{AppError, AppResult, OptionExt};
use domain::{
    validate_create, validate_update, CreateUserParams, NewUser, PasswordHasher, UpdateUserParams,
    User, UserChanges,
};

use crate::repository::UserRepository;

/// User store trait for dependency injection.
///
/// Returned `User`s carry the credential hash; convert them with
/// `UserResponse::from` before handing them to an external caller.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get user by ID
    async fn get_by_id(&self, id: &str) -> AppResult<User>;

    /// List every user in insertion order
    async fn get_all(&self) -> AppResult<Vec<User>>;

    /// Validate, hash the password and persist a new user
    async fn insert(&self, params: CreateUserParams) -> AppResult<User>;

    /// Merge the supplied fields into an existing user
    async fn update(&self, id: &str, params: UpdateUserParams) -> AppResult<User>;

    /// Remove every user (administrative reset, not for request traffic)
    async fn drop_all(&self) -> AppResult<()>;
}

/// Concrete implementation of UserStore over a repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserManager {
    /// Create new user store with repository and password hasher
    pub fn new(repo: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Hash on the blocking pool.
    async fn hash_password(&self, password: String) -> AppResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Hash(format!("hashing task failed: {}", e)))??;
        Ok(hash)
    }
}

#[async_trait]
impl UserStore for UserManager {
    async fn get_by_id(&self, id: &str) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_not_found(format!("user {}", id))
    }

    async fn get_all(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    async fn insert(&self, mut params: CreateUserParams) -> AppResult<User> {
        validate_create(&params)?;

        let password = std::mem::take(&mut params.password);
        let encrypted_password = self.hash_password(password).await?;

        let user = self
            .repo
            .create(NewUser::from_params(params, encrypted_password))
            .await?;
        info!("Created user {}", user.id);
        Ok(user)
    }

    async fn update(&self, id: &str, params: UpdateUserParams) -> AppResult<User> {
        validate_update(&params)?;

        let changes = UserChanges::from(params);
        let updated = if changes.is_empty() {
            debug!("Empty update for user {}", id);
            self.repo.find_by_id(id).await?
        } else {
            self.repo.update(id, changes).await?
        };

        updated.ok_or_not_found(format!("user {}", id))
    }

    async fn drop_all(&self) -> AppResult<()> {
        self.repo.drop_all().await?;
        info!("All users dropped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{DomainError, MockPasswordHasher};

    use crate::repository::MockUserRepository;

    const USER_ID: &str = "65a1b2c3d4e5f6a7b8c9d0e1";

    fn create_test_user(id: &str) -> User {
        User {
            id: id.to_string(),
            first_name: "James".to_string(),
            last_name: "Foo".to_string(),
            email: "valid_email@email.com".to_string(),
            encrypted_password: "hashed".to_string(),
        }
    }

    fn valid_params() -> CreateUserParams {
        CreateUserParams {
            email: "valid_email@email.com".to_string(),
            first_name: "James".to_string(),
            last_name: "Foo".to_string(),
            password: "valid_password123".to_string(),
        }
    }

    fn manager(repo: MockUserRepository, hasher: MockPasswordHasher) -> UserManager {
        UserManager::new(Arc::new(repo), Arc::new(hasher))
    }

    #[tokio::test]
    async fn test_get_by_id_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .withf(|id| id == USER_ID)
            .returning(|id| Ok(Some(create_test_user(id))));

        let user = manager(repo, MockPasswordHasher::new())
            .get_by_id(USER_ID)
            .await
            .unwrap();
        assert_eq!(user.id, USER_ID);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = manager(repo, MockPasswordHasher::new())
            .get_by_id(USER_ID)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_insert_hashes_before_create() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|plain| plain == "valid_password123")
            .times(1)
            .returning(|_| Ok("$argon2id$hashed".to_string()));

        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|user| user.encrypted_password == "$argon2id$hashed")
            .times(1)
            .returning(|user| Ok(user.into_user(USER_ID.to_string())));

        let user = manager(repo, hasher).insert(valid_params()).await.unwrap();
        assert_eq!(user.id, USER_ID);
        assert_eq!(user.encrypted_password, "$argon2id$hashed");
        assert_eq!(user.email, "valid_email@email.com");
    }

    #[tokio::test]
    async fn test_invalid_insert_never_touches_store() {
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().never();
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();

        let params = CreateUserParams {
            password: "123".to_string(),
            ..valid_params()
        };
        let result = manager(repo, hasher).insert(params).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_hash_failure_writes_nothing() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Err(DomainError::hash("out of memory")));
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();

        let result = manager(repo, hasher).insert(valid_params()).await;
        assert!(matches!(result, Err(AppError::Hash(_))));
    }

    #[tokio::test]
    async fn test_update_passes_only_supplied_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(|id, changes| {
                id == USER_ID
                    && changes.first_name.as_deref() == Some("X")
                    && changes.last_name.is_none()
            })
            .times(1)
            .returning(|id, changes| {
                let mut user = create_test_user(id);
                user.apply(changes);
                Ok(Some(user))
            });

        let params = UpdateUserParams {
            first_name: Some("X".to_string()),
            last_name: None,
        };
        let user = manager(repo, MockPasswordHasher::new())
            .update(USER_ID, params)
            .await
            .unwrap();

        assert_eq!(user.first_name, "X");
        assert_eq!(user.last_name, "Foo");
        assert_eq!(user.encrypted_password, "hashed");
    }

    #[tokio::test]
    async fn test_empty_update_reads_current_record() {
        let mut repo = MockUserRepository::new();
        repo.expect_update().never();
        repo.expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(create_test_user(id))));

        let user = manager(repo, MockPasswordHasher::new())
            .update(USER_ID, UpdateUserParams::default())
            .await
            .unwrap();
        assert_eq!(user.first_name, "James");
    }

    #[tokio::test]
    async fn test_invalid_update_never_touches_store() {
        let mut repo = MockUserRepository::new();
        repo.expect_update().never();
        repo.expect_find_by_id().never();

        let params = UpdateUserParams {
            first_name: Some(String::new()),
            last_name: None,
        };
        let result = manager(repo, MockPasswordHasher::new())
            .update(USER_ID, params)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_missing_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_update().returning(|_, _| Ok(None));

        let params = UpdateUserParams {
            first_name: Some("X".to_string()),
            last_name: None,
        };
        let result = manager(repo, MockPasswordHasher::new())
            .update(USER_ID, params)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_errors_pass_through() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .returning(|| Err(AppError::store("list users", std::io::Error::other("reset"))));

        let result = manager(repo, MockPasswordHasher::new()).get_all().await;
        assert!(matches!(result, Err(AppError::Store { .. })));
    }
}

//! MongoDB-backed user repository.

use std::future::IntoFuture;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use common::{AppError, AppResult, RetryConfig};
use domain::{NewUser, User, UserChanges};

use super::entities::user::{UserDocument, COLLECTION, EMAIL_INDEX};
use super::user_repository::{parse_user_id, UserRepository};
use crate::infra::Database;

/// Server error code for unique index violations
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Why a single attempt against the store failed.
#[derive(Debug, Error)]
enum StoreFailure {
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    #[error("deadline of {0:?} elapsed")]
    DeadlineElapsed(Duration),
}

impl StoreFailure {
    /// Failures worth another attempt for idempotent reads
    fn is_transient(&self) -> bool {
        match self {
            StoreFailure::DeadlineElapsed(_) => true,
            StoreFailure::Driver(err) => {
                matches!(*err.kind, ErrorKind::Io(_) | ErrorKind::ServerSelection { .. })
            }
        }
    }

    fn is_duplicate_key(&self) -> bool {
        match self {
            StoreFailure::Driver(err) => match *err.kind {
                ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => {
                    write_error.code == DUPLICATE_KEY_CODE
                }
                _ => false,
            },
            StoreFailure::DeadlineElapsed(_) => false,
        }
    }
}

/// User repository over the `users` collection.
///
/// Wraps every driver call in the configured deadline. Reads retry transient
/// failures with exponential backoff; writes are attempted exactly once.
pub struct MongoUserRepository {
    users: Collection<UserDocument>,
    retry: RetryConfig,
    operation_timeout: Duration,
}

impl MongoUserRepository {
    /// Create repository instance and make sure its indexes exist
    pub async fn new(
        db: &Database,
        retry: RetryConfig,
        operation_timeout: Duration,
    ) -> AppResult<Self> {
        let repo = Self {
            users: db.handle().collection(COLLECTION),
            retry,
            operation_timeout,
        };
        repo.ensure_indexes().await?;
        Ok(repo)
    }

    /// Create the unique index on `email`
    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(EMAIL_INDEX.to_string())
                    .build(),
            )
            .build();

        self.with_deadline(self.users.create_index(index))
            .await
            .map_err(|e| AppError::store("create email index", e))?;
        info!("Ensured index {} on {}", EMAIL_INDEX, COLLECTION);
        Ok(())
    }

    /// Run one driver call under the operation deadline.
    async fn with_deadline<T, A>(&self, action: A) -> Result<T, StoreFailure>
    where
        A: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, action.into_future()).await {
            Ok(result) => result.map_err(StoreFailure::from),
            Err(_) => Err(StoreFailure::DeadlineElapsed(self.operation_timeout)),
        }
    }

    /// Run an idempotent read, retrying transient failures.
    async fn read_with_retry<T, F, A>(&self, operation: &str, mut attempt: F) -> AppResult<T>
    where
        F: FnMut() -> A,
        A: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        let mut retries = 0;
        loop {
            match self.with_deadline(attempt()).await {
                Ok(value) => return Ok(value),
                Err(failure) if failure.is_transient() && retries < self.retry.max_retries => {
                    let delay = self.retry.backoff(retries);
                    retries += 1;
                    warn!(
                        "Transient failure during {} ({}), retry {} in {:?}",
                        operation, failure, retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => return Err(AppError::store(operation, failure)),
            }
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let oid = parse_user_id(id)?;
        debug!("Finding user {}", id);

        let users = &self.users;
        let found = self
            .read_with_retry(&format!("find user {}", id), move || {
                users.find_one(doc! { "_id": oid })
            })
            .await?;

        Ok(found.map(User::from))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        debug!("Listing users");

        let users = &self.users;
        let documents = self
            .read_with_retry("list users", move || async move {
                let cursor = users.find(doc! {}).sort(doc! { "_id": 1 }).await?;
                let documents: Vec<UserDocument> = cursor.try_collect().await?;
                Ok::<_, mongodb::error::Error>(documents)
            })
            .await?;

        Ok(documents.into_iter().map(User::from).collect())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut document = UserDocument::from(user);

        let result = self
            .with_deadline(self.users.insert_one(&document))
            .await
            .map_err(|failure| {
                if failure.is_duplicate_key() {
                    AppError::conflict("email")
                } else {
                    AppError::store("insert user", failure)
                }
            })?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::internal("store assigned a non-ObjectId user id"))?;
        document.id = Some(id);
        debug!("Inserted user {}", id);

        Ok(User::from(document))
    }

    async fn update(&self, id: &str, changes: UserChanges) -> AppResult<Option<User>> {
        let oid = parse_user_id(id)?;

        let mut set = Document::new();
        if let Some(first_name) = changes.first_name {
            set.insert("firstName", first_name);
        }
        if let Some(last_name) = changes.last_name {
            set.insert("lastName", last_name);
        }
        if set.is_empty() {
            return self.find_by_id(id).await;
        }
        debug!("Updating user {} fields {:?}", id, set.keys().collect::<Vec<_>>());

        let updated = self
            .with_deadline(
                self.users
                    .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
                    .return_document(ReturnDocument::After),
            )
            .await
            .map_err(|e| AppError::store(format!("update user {}", id), e))?;

        Ok(updated.map(User::from))
    }

    async fn drop_all(&self) -> AppResult<()> {
        self.with_deadline(self.users.drop())
            .await
            .map_err(|e| AppError::store(format!("drop {}", COLLECTION), e))?;
        info!("Dropped collection {}", COLLECTION);

        self.ensure_indexes().await
    }
}

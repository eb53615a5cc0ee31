//! User Service Library
//!
//! This crate provides the user account store: validation, password hashing
//! and persistence behind the [`UserStore`] trait, with a MongoDB adapter and
//! an in-memory repository. The binary wraps it in an administration CLI.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use common::{AppError, AppResult};
use domain::{Argon2Hasher, CreateUserParams, HashCost, UpdateUserParams, UserResponse};

use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::repository::{InMemoryUserRepository, MongoUserRepository};

pub use crate::service::{UserManager, UserStore};

/// Build the MongoDB-backed user store from configuration.
pub async fn connect_store(config: &UserServiceConfig) -> AppResult<UserManager> {
    let db = Database::connect(&config.database).await?;
    let repo = MongoUserRepository::new(
        &db,
        config.retry.clone(),
        config.database.operation_timeout(),
    )
    .await?;
    let hasher = Argon2Hasher::with_cost(HashCost::from(&config.hashing))?;

    Ok(UserManager::new(Arc::new(repo), Arc::new(hasher)))
}

/// Build a user store over a fresh in-memory repository.
///
/// Nothing survives the process, which makes this a dry-run backend for the CLI.
pub fn in_memory_store(config: &UserServiceConfig) -> AppResult<UserManager> {
    let hasher = Argon2Hasher::with_cost(HashCost::from(&config.hashing))?;
    Ok(UserManager::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(hasher),
    ))
}

/// Where commands are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Mongo,
    InMemory,
}

/// Store administration command.
#[derive(Debug, Clone)]
pub enum UserCommand {
    Create(CreateUserParams),
    Get { id: String },
    List,
    Update { id: String, params: UpdateUserParams },
    Drop,
}

/// Check that the configured database answers.
pub async fn ping(config: &UserServiceConfig, backend: Backend) -> AppResult<()> {
    if backend == Backend::InMemory {
        info!("In-memory backend, skipping database check");
        return Ok(());
    }

    let db = Database::connect(&config.database).await?;
    db.ping().await?;
    info!("Database `{}` is reachable", db.name());
    Ok(())
}

/// Run a store command against the chosen backend and return its redacted JSON output.
pub async fn run_command(
    command: UserCommand,
    config: &UserServiceConfig,
    backend: Backend,
) -> AppResult<Value> {
    let store = match backend {
        Backend::Mongo => connect_store(config).await?,
        Backend::InMemory => in_memory_store(config)?,
    };
    execute(&store, command).await
}

/// Apply a command to any store. Every user leaves through `UserResponse`.
pub async fn execute(store: &dyn UserStore, command: UserCommand) -> AppResult<Value> {
    match command {
        UserCommand::Create(params) => render(UserResponse::from(store.insert(params).await?)),
        UserCommand::Get { id } => render(UserResponse::from(store.get_by_id(&id).await?)),
        UserCommand::List => {
            let users = store.get_all().await?;
            render(users.iter().map(UserResponse::from).collect::<Vec<_>>())
        }
        UserCommand::Update { id, params } => {
            render(UserResponse::from(store.update(&id, params).await?))
        }
        UserCommand::Drop => {
            store.drop_all().await?;
            Ok(serde_json::json!({ "status": "dropped" }))
        }
    }
}

fn render<T: serde::Serialize>(value: T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::internal(format!("render output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::HashingConfig;

    fn cheap_config() -> UserServiceConfig {
        UserServiceConfig {
            hashing: HashingConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..UserServiceConfig::default()
        }
    }

    fn create_command() -> UserCommand {
        UserCommand::Create(CreateUserParams {
            email: "valid_email@email.com".to_string(),
            first_name: "James".to_string(),
            last_name: "Foo".to_string(),
            password: "valid_password123".to_string(),
        })
    }

    #[tokio::test]
    async fn test_in_memory_create_runs_without_database() {
        let output = run_command(create_command(), &cheap_config(), Backend::InMemory)
            .await
            .unwrap();

        assert_eq!(output["email"], "valid_email@email.com");
        assert_eq!(output["id"].as_str().unwrap().len(), 24);
        assert!(output.get("encryptedPassword").is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = in_memory_store(&cheap_config()).unwrap();

        let created = execute(&store, create_command()).await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        let listed = execute(&store, UserCommand::List).await.unwrap();
        let fetched = execute(&store, UserCommand::Get { id }).await.unwrap();

        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_in_memory_ping_skips_database() {
        let config = UserServiceConfig {
            database: common::DatabaseConfig {
                uri: "not a connection string".to_string(),
                ..common::DatabaseConfig::default()
            },
            ..cheap_config()
        };

        assert!(ping(&config, Backend::InMemory).await.is_ok());
    }

    #[test]
    fn test_invalid_hashing_cost_rejected() {
        let config = UserServiceConfig {
            hashing: HashingConfig {
                memory_kib: 1,
                iterations: 0,
                parallelism: 1,
            },
            ..UserServiceConfig::default()
        };

        assert!(matches!(in_memory_store(&config), Err(AppError::Hash(_))));
    }
}

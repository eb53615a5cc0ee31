//! Database connection and initialization.

use mongodb::{bson::doc, options::ClientOptions, Client, Database as MongoDatabase};

use common::{AppError, AppResult, DatabaseConfig};

const APP_NAME: &str = "user-service";

/// Database wrapper for connection management.
///
/// Holds the single long-lived client. The client pools connections
/// internally and is safe to share across concurrent operations.
#[derive(Clone)]
pub struct Database {
    client: Client,
    name: String,
}

impl Database {
    /// Build the client from configuration.
    ///
    /// Connections are established lazily on first use; call [`Database::ping`]
    /// to check reachability up front.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(|e| AppError::store("parse connection string", e))?;
        options.app_name = Some(APP_NAME.to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.connect_timeout());

        let client = Client::with_options(options).map_err(|e| AppError::store("create client", e))?;
        tracing::info!("Database client ready for `{}`", config.database);

        Ok(Self {
            client,
            name: config.database.clone(),
        })
    }

    /// Get a handle to the configured logical database.
    pub fn handle(&self) -> MongoDatabase {
        self.client.database(&self.name)
    }

    /// Name of the configured logical database.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check database connectivity with a `ping` command.
    pub async fn ping(&self) -> AppResult<()> {
        self.handle()
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::store(format!("ping {}", self.name), e))?;
        Ok(())
    }
}

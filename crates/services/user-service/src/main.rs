//! User Service - administration CLI for the user account store.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domain::{CreateUserParams, UpdateUserParams};
use user_service_lib::{config::UserServiceConfig, Backend, UserCommand};

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "User account store administration")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use a throwaway in-memory store instead of MongoDB
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Plain text password (prefer the environment variable)
        #[arg(long, env = "USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show a user by ID
    Get { id: String },
    /// List all users
    List,
    /// Change a user's names
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Delete every user (environment reset)
    Drop {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = UserServiceConfig::from_env();
    tracing::debug!("Configuration loaded");

    let backend = if cli.in_memory {
        Backend::InMemory
    } else {
        Backend::Mongo
    };

    let command = match cli.command {
        Commands::Create {
            email,
            first_name,
            last_name,
            password,
        } => UserCommand::Create(CreateUserParams {
            email,
            first_name,
            last_name,
            password,
        }),
        Commands::Get { id } => UserCommand::Get { id },
        Commands::List => UserCommand::List,
        Commands::Update {
            id,
            first_name,
            last_name,
        } => UserCommand::Update {
            id,
            params: UpdateUserParams {
                first_name,
                last_name,
            },
        },
        Commands::Drop { yes } => {
            if !yes {
                return Err("refusing to drop users without --yes".into());
            }
            UserCommand::Drop
        }
        Commands::Ping => {
            user_service_lib::ping(&config, backend).await?;
            return Ok(());
        }
    };

    let output = user_service_lib::run_command(command, &config, backend).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Initialize tracing subscriber. Logs go to stderr so stdout stays JSON.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

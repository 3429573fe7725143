//! Accounts Service
//! Mission: Register users, log them in with signed tokens, manage their roles

use accounts_backend::{
    auth::{
        api, AccountService, AccountStore, AuthState, CredentialHasher, InMemoryAccountStore,
        JwtHandler, SqliteAccountStore,
    },
    config::{load_env, Config},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "accounts", about = "User account service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Keep accounts in memory instead of the SQLite database
        #[arg(long)]
        in_memory: bool,

        /// Listen port, overrides PORT
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Replace an account's roles directly in the database
    SetRoles {
        /// Account id (UUID)
        id: String,
        /// New role labels; none clears all roles
        roles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve {
        in_memory: false,
        port: None,
    }) {
        Command::Serve { in_memory, port } => serve(config, in_memory, port).await,
        Command::SetRoles { id, roles } => set_roles(config, &id, roles),
    }
}

/// Initialize tracing with env-filter control
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accounts_backend=debug,accounts=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_service(config: &Config, store: Arc<dyn AccountStore>) -> AccountService {
    if config.jwt_secret.is_none() {
        warn!("⚠️  JWT_SECRET is not set: every login will fail until it is configured");
    }

    let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret.clone()));
    AccountService::new(store, CredentialHasher::new(), jwt_handler)
        .with_default_roles(config.default_roles.clone())
}

fn open_store(config: &Config) -> Result<Arc<SqliteAccountStore>> {
    let store = SqliteAccountStore::open(&config.database_path)
        .with_context(|| format!("Failed to open account database {}", config.database_path))?;
    Ok(Arc::new(store))
}

async fn serve(config: Config, in_memory: bool, port: Option<u16>) -> Result<()> {
    info!("🚀 Accounts service starting");

    let store: Arc<dyn AccountStore> = if in_memory {
        warn!("Using in-memory account store: accounts are lost on exit");
        Arc::new(InMemoryAccountStore::new())
    } else {
        open_store(&config)?
    };

    let service = Arc::new(build_service(&config, store));
    let app = api::router(AuthState::new(service)).layer(CorsLayer::permissive());

    let port = port.unwrap_or(config.port);
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Accounts service stopped");
    Ok(())
}

fn set_roles(config: Config, id: &str, roles: Vec<String>) -> Result<()> {
    let service = build_service(&config, open_store(&config)?);

    let modified = service
        .update_roles(id, roles.clone())
        .with_context(|| format!("Failed to update roles of {}", id))?;

    info!("✅ Roles of {} set to {:?} ({} record)", id, roles, modified);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use keydesk::config::Settings;
use keydesk::store::PgStore;
use keydesk::{create_app, db, AppState};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "keydesk=info,tower_http=debug";

#[derive(Parser)]
#[command(name = "keydesk", version, about = "Account and API key management server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations and start the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("Failed to load application settings")?;
    init_tracing(&settings)?;

    let pool = db::create_pool(&settings).await?;
    db::run_migrations(&pool).await?;

    if let Some(Command::Migrate) = cli.command {
        info!("Migrations complete");
        return Ok(());
    }

    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        config: settings.clone(),
    };
    let app = create_app(state);

    let addr = settings.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to server address")?;

    info!("Listening on {} (API under {})", addr, settings.server.api_prefix);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown completed");
    Ok(())
}

fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .or_else(|| settings.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

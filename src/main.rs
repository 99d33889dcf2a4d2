use std::sync::Arc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use message_store::{
    api::{create_router, AppState},
    cli::{run_migration, Cli, Command},
    config::Config,
    db,
    error::AppError,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,message_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Arc::new(Config::from_env()?);
    tracing::info!("Configuration loaded");

    let pool = db::connect(&config).await?;
    tracing::info!("Database connected: {}", config.database_url);

    match cli.command() {
        Command::Migrate(args) => run_migration(pool, &args).await,
        Command::Serve => {
            let result = serve(pool.clone(), config).await;
            pool.close().await;
            result
        }
    }
}

async fn serve(pool: sqlx::SqlitePool, config: Arc<Config>) -> Result<(), AppError> {
    tracing::info!("Starting message-store v{}...", env!("CARGO_PKG_VERSION"));

    db::apply_schema(&pool).await?;
    tracing::info!("Database migrations completed");

    let state = AppState {
        db: pool,
        config: config.clone(),
    };
    let app = create_router(state);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("  GET    /messages          - List messages");
    tracing::info!("  POST   /messages          - Create message");
    tracing::info!("  GET    /messages/:id      - Get message");
    tracing::info!("  DELETE /messages/:id      - Delete message");
    tracing::info!("  PATCH  /messages/message  - Update message text");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

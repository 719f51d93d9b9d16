//! Marketplace Wallet - wallet ledger backend
//!
//! Serves wallet reads, credits and debits over HTTP and notifies the
//! wallet owner over Telegram after each mutation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use marketplace_wallet::api::{self, AppState};
use marketplace_wallet::notify::{LogOnlyChannel, NotificationChannel, NotificationDispatcher, TelegramChannel};
use marketplace_wallet::store::{InMemoryWalletStore, PgWalletStore, WalletStore};
use marketplace_wallet::{db, Config, LedgerEngine, StoreBackend};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "marketplace_wallet=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Open the configured wallet store; the pool is returned so it can be closed on shutdown
async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn WalletStore>, Option<PgPool>)> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory wallet store; balances are lost on restart");
            Ok((Arc::new(InMemoryWalletStore::new()), None))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;

            tracing::info!("Connecting to database...");
            let pool = db::connect(config, database_url).await?;
            db::verify_connection(&pool).await?;

            if !db::check_schema(&pool).await? {
                tracing::error!("Database schema is not complete. Please run migrations.");
                return Err(anyhow::anyhow!("Database schema incomplete"));
            }

            tracing::info!("Database connected successfully");
            Ok((Arc::new(PgWalletStore::new(pool.clone())), Some(pool)))
        }
    }
}

/// Build the notification channel handle owned by this process
fn open_channel(config: &Config) -> anyhow::Result<Arc<dyn NotificationChannel>> {
    match config.telegram_bot_token.as_deref() {
        Some(token) => {
            let channel = TelegramChannel::new(
                &config.telegram_api_url,
                token,
                Duration::from_secs(config.notify_timeout_secs),
            )?;
            Ok(Arc::new(channel))
        }
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN not set; notifications will only be logged");
            Ok(Arc::new(LogOnlyChannel))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting marketplace wallet server");

    let (store, pool) = open_store(&config).await?;
    let channel = open_channel(&config)?;
    tracing::info!(store = store.name(), channel = channel.name(), "Ledger ready");

    let engine = LedgerEngine::new(store, NotificationDispatcher::new(channel));
    let app = api::build_router(AppState::new(engine));

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down...");
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database connections closed");
    }
    tracing::info!("Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

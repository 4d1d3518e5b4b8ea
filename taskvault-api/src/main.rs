//! # Taskvault API Server
//!
//! Task-management API with token-based authentication and
//! ownership-scoped access control.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskvault-api
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskvault_api::app::{build_router, AppState};
use taskvault_api::config::Config;
use taskvault_shared::db;
use taskvault_shared::store::postgres::{PgCredentialStore, PgTaskStore};
use taskvault_shared::store::{CredentialStore, TaskStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskvault_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskvault API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Refuses to proceed without a usable signing secret
    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database.url, config.database.max_connections).await?;
    sqlx::migrate!("../migrations").run(&pool).await?;

    let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
    let task_store: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));

    let bind_address = config.bind_address();
    let state = AppState::new(credentials, task_store, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

//! # Tasktrack API Server
//!
//! Multi-user task tracker: accounts with roles, task CRUD with status,
//! priority and assignment, JWT sessions, and a REST API for the browser
//! client.
//!
//! ## Usage
//!
//! ```bash
//! # In-memory storage with demo data
//! cargo run -p tasktrack-api
//!
//! # PostgreSQL
//! TASKTRACK_DATABASE__URL=postgresql://localhost/tasktrack \
//! TASKTRACK_JWT__SECRET=$(openssl rand -hex 32) \
//! cargo run -p tasktrack-api
//! ```

use anyhow::Context;
use tasktrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasktrack_shared::seed::{seed_demo_data, SeedOutcome, SeedPasswords};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "tasktrack_api=debug,tasktrack_shared=debug,tower_http=debug";

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    init_tracing(config.logging.json);

    tracing::info!(
        "Tasktrack API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if config.uses_dev_secret() {
        tracing::warn!(
            "Using the built-in development JWT secret; set TASKTRACK_JWT__SECRET for any shared deployment"
        );
    }

    let bind_address = config.bind_address();
    let state = AppState::connect(config).await?;

    if state.config.seed.enabled {
        let passwords = SeedPasswords {
            admin: state.config.seed.admin_password.clone(),
            user: state.config.seed.user_password.clone(),
        };
        let outcome = seed_demo_data(
            &state.credentials,
            &*state.users,
            &*state.tasks,
            &passwords,
        )
        .await
        .context("Failed to seed demo data")?;

        if let SeedOutcome::Seeded { users, tasks } = outcome {
            tracing::info!(users, tasks, "Demo data created");
        }
    }

    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!(
        storage = state.storage.name(),
        "Server listening on http://{}",
        bind_address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

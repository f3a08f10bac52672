/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasktrack_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let state = AppState::connect(config).await?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tasktrack_shared::{
    auth::{credentials::CredentialStore, jwt::TokenIssuer},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{memory::MemoryStore, postgres::PgStore, TaskRepository, UserRepository},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// Storage engine behind the repositories
#[derive(Debug, Clone)]
pub enum Storage {
    Memory,
    Postgres(PgPool),
}

impl Storage {
    pub fn name(&self) -> &'static str {
        match self {
            Storage::Memory => "memory",
            Storage::Postgres(_) => "postgres",
        }
    }
}

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,

    pub tasks: Arc<dyn TaskRepository>,

    pub credentials: CredentialStore,

    /// Session token issuer, read-only after startup
    pub tokens: Arc<TokenIssuer>,

    /// Application configuration
    pub config: Arc<Config>,

    pub storage: Storage,
}

impl AppState {
    /// Builds state around an in-memory store
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_repositories(store.clone(), store, Storage::Memory, config)
    }

    /// Builds state around existing repositories
    pub fn with_repositories(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        storage: Storage,
        config: Config,
    ) -> Self {
        let tokens = TokenIssuer::with_ttl(
            &config.jwt.secret,
            chrono::Duration::hours(config.jwt.ttl_hours),
        );

        Self {
            credentials: CredentialStore::new(users.clone()),
            users,
            tasks,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            storage,
        }
    }

    /// Selects storage from configuration
    ///
    /// With `database.url` set, connects to PostgreSQL and applies migrations;
    /// otherwise keeps everything in memory.
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        let Some(url) = config.database_url() else {
            info!("No database configured, using in-memory storage");
            return Ok(Self::in_memory(config));
        };

        let pool = create_pool(DatabaseConfig {
            max_connections: config.database.max_connections,
            ..DatabaseConfig::new(url)
        })
        .await?;
        run_migrations(&pool).await?;

        info!("Using PostgreSQL storage");
        let store = Arc::new(PgStore::new(pool.clone()));
        Ok(Self::with_repositories(
            store.clone(),
            store,
            Storage::Postgres(pool),
            config,
        ))
    }

    /// Releases storage resources
    pub async fn shutdown(self) {
        if let Storage::Postgres(pool) = self.storage {
            close_pool(pool).await;
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.server.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health            # Health check (public)
/// ├── /auth/                    # Authentication (public)
/// │   ├── POST /register
/// │   └── POST /login
/// ├── /tasks                    # Tasks (authenticated)
/// │   ├── GET    /              # Query, ?status=&assignee=
/// │   ├── POST   /              # Create
/// │   ├── GET    /:id
/// │   ├── PUT    /:id           # Full update
/// │   └── DELETE /:id           # ADMIN only
/// └── /users                    # User directory (authenticated)
///     ├── GET /                 # ADMIN only
///     └── GET /:id
/// ```
///
/// Authentication is resolved per request by the `Caller` extractor and
/// checked by the authorization policy inside each handler.
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", routes::auth::router())
        .nest("/tasks", routes::tasks::router())
        .nest("/users", routes::users::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

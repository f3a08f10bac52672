/// Configuration management for the API server
///
/// Configuration is layered, later sources overriding earlier ones:
///
/// 1. Built-in defaults
/// 2. `tasktrack.toml` (or `.json`/`.yaml`) in the working directory, if present
/// 3. Environment variables prefixed `TASKTRACK_`, with `__` between nested keys
///
/// A `.env` file is loaded into the environment first.
///
/// # Environment Variables
///
/// - `TASKTRACK_SERVER__HOST`: Host to bind to (default: 0.0.0.0)
/// - `TASKTRACK_SERVER__PORT`: Port to bind to (default: 8080)
/// - `TASKTRACK_SERVER__PRODUCTION`: Refuse development defaults (default: false)
/// - `TASKTRACK_SERVER__CORS_ORIGINS`: Comma-separated origins, `*` for any
/// - `TASKTRACK_DATABASE__URL`: PostgreSQL connection string; unset means in-memory storage
/// - `TASKTRACK_DATABASE__MAX_CONNECTIONS`: Pool size (default: 10)
/// - `TASKTRACK_JWT__SECRET`: Token signing secret, at least 32 bytes
/// - `TASKTRACK_JWT__TTL_HOURS`: Token lifetime (default: 8)
/// - `TASKTRACK_SEED__ENABLED`: Seed demo data into an empty store (default: true)
/// - `TASKTRACK_SEED__ADMIN_PASSWORD`, `TASKTRACK_SEED__USER_PASSWORD`: Demo account passwords
/// - `TASKTRACK_LOGGING__JSON`: Emit JSON logs (default: false)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use tasktrack_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Signing secret used when none is configured
///
/// Rejected when `server.production` is set.
pub const DEV_JWT_SECRET: &str = "tasktrack-local-development-signing-key-change-me";

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

const ENV_PREFIX: &str = "TASKTRACK";

/// Complete application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode rejects the development signing secret
    pub production: bool,

    /// Allowed CORS origins; `*` allows any origin
    #[serde(deserialize_with = "comma_separated")]
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: Option<String>,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in hours
    pub ttl_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Demo data seeding
#[derive(Clone, Deserialize)]
pub struct SeedConfig {
    pub enabled: bool,
    pub admin_password: String,
    pub user_password: String,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Log output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080_i64)?
        .set_default("server.production", false)?
        .set_default(
            "server.cors_origins",
            vec!["http://localhost:9000", "http://localhost:9001"],
        )?
        .set_default("database.max_connections", 10_i64)?
        .set_default("jwt.secret", DEV_JWT_SECRET)?
        .set_default("jwt.ttl_hours", 8_i64)?
        .set_default("seed.enabled", true)?
        .set_default("seed.admin_password", "Admin@123")?
        .set_default("seed.user_password", "Password@123")?
        .set_default("logging.json", false)
}

/// Environment values stay strings; typed fields convert on deserialize
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Accepts either a list or a comma-separated string
fn comma_separated<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<String>),
        One(String),
    }

    Ok(match OneOrMany::deserialize(de)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

impl Config {
    /// Loads configuration from defaults, `tasktrack.*`, and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails
    /// validation (see [`Config::validate`]).
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let builder = defaults()?
            .add_source(File::with_name("tasktrack").required(false))
            .add_source(environment());

        Self::build(builder)
    }

    /// Loads configuration from defaults and the given variables only
    ///
    /// Variables use the same names as the real environment
    /// (`TASKTRACK_JWT__SECRET`, ...). Used by tests.
    pub fn from_env_map(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        let builder = defaults()?.add_source(environment().source(Some(vars)));
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let config: Self = builder
            .build()?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field rules
    ///
    /// - the signing secret is at least 32 bytes
    /// - the development secret is not used in production
    /// - the token lifetime is positive
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!(
                "jwt.secret must be at least {} bytes long",
                MIN_SECRET_LENGTH
            );
        }

        if self.server.production && self.uses_dev_secret() {
            anyhow::bail!("jwt.secret must be set explicitly when server.production is enabled");
        }

        if self.jwt.ttl_hours <= 0 {
            anyhow::bail!("jwt.ttl_hours must be positive");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }

        Ok(())
    }

    /// Whether the built-in development secret is in use
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt.secret == DEV_JWT_SECRET
    }

    /// Configured database URL, treating an empty value as unset
    pub fn database_url(&self) -> Option<&str> {
        self.database
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// PostgreSQL plumbing
///
/// # Modules
///
/// - `pool`: Connection pool creation, health checks, and shutdown
/// - `migrations`: Embedded schema migrations from the workspace `migrations/` directory
///
/// Only used when a database URL is configured; otherwise the API runs on
/// [`crate::store::memory::MemoryStore`].
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;

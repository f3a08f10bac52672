/// Domain models
///
/// # Models
///
/// - `user`: User accounts, roles, and the client-facing profile
/// - `task`: Tasks, their status/priority enums, and query filters
///
/// Persistence lives in [`crate::store`]; these are plain data types that
/// also derive `sqlx::FromRow` so the PostgreSQL store can load them directly.

pub mod task;
pub mod user;

/// Persistence behind repository traits
///
/// Handlers and services talk to [`UserRepository`] and [`TaskRepository`]
/// and never to a concrete engine. Two implementations ship:
///
/// - [`memory::MemoryStore`]: process-local maps, used when no database is configured
/// - [`postgres::PgStore`]: PostgreSQL via `sqlx`
///
/// Both enforce the same rules: unique usernames and emails, task creator and
/// assignee must reference existing users, `updated_at` strictly increases on
/// every update, and queries return tasks ordered by `created_at` then `id`.
///
/// # Example
///
/// ```
/// use futures::TryStreamExt;
/// use tasktrack_shared::models::task::{NewTask, TaskFilter, TaskPriority, TaskStatus};
/// use tasktrack_shared::models::user::{NewUser, Role};
/// use tasktrack_shared::store::{memory::MemoryStore, TaskRepository, UserRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store.create_user(NewUser {
///     username: "ada".into(),
///     email: "ada@example.com".into(),
///     password_hash: "$argon2id$...".into(),
///     role: Role::User,
/// }).await?;
///
/// store.create_task(NewTask {
///     title: "Write docs".into(),
///     description: String::new(),
///     priority: TaskPriority::High,
///     assignee_id: Some(user.id),
///     creator_id: user.id,
/// }).await?;
///
/// let todo: Vec<_> = store
///     .query_tasks(TaskFilter::all().with_status(TaskStatus::Todo))
///     .try_collect()
///     .await?;
/// assert_eq!(todo.len(), 1);
/// # Ok(())
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskFilter, TaskUpdate};
use crate::models::user::{NewUser, User};

/// Lazy, finite, single-pass stream of query results
pub type TaskStream<'a> = BoxStream<'a, Result<Task, RepositoryError>>;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No record with the requested id
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique field is already taken
    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    /// A user reference points at no existing user
    #[error("Unknown user referenced by {0}")]
    InvalidReference(&'static str),

    /// Storage engine failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default();

            if db_err.is_unique_violation() {
                return if constraint.contains("email") {
                    RepositoryError::Duplicate("email")
                } else {
                    RepositoryError::Duplicate("username")
                };
            }

            if db_err.is_foreign_key_violation() {
                return if constraint.contains("assignee") {
                    RepositoryError::InvalidReference("assigneeId")
                } else {
                    RepositoryError::InvalidReference("creatorId")
                };
            }
        }

        RepositoryError::Database(err)
    }
}

/// User account storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user, assigning `id` and `created_at`
    ///
    /// Fails with `Duplicate("username")` or `Duplicate("email")` when either is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_username(&self, username: &str)
        -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// All users, oldest first
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    async fn count_users(&self) -> Result<u64, RepositoryError>;
}

/// Task storage
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task with status `TODO` and both timestamps set to now
    ///
    /// Fails with `InvalidReference` if the creator or assignee does not exist.
    async fn create_task(&self, task: NewTask) -> Result<Task, RepositoryError>;

    /// Fails with `NotFound("Task")` if there is no such task
    async fn get_task(&self, id: Uuid) -> Result<Task, RepositoryError>;

    /// Streams tasks passing `filter`, ordered by `created_at` then `id`
    ///
    /// Nothing is read until the stream is first polled.
    fn query_tasks(&self, filter: TaskFilter) -> TaskStream<'_>;

    /// Replaces every mutable field of a task and bumps `updated_at`
    ///
    /// The creator is never touched.
    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Task, RepositoryError>;

    async fn delete_task(&self, id: Uuid) -> Result<(), RepositoryError>;
}

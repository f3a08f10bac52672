/// PostgreSQL store
///
/// Implements both repositories on a `sqlx` pool. Unique and foreign-key
/// violations are translated into [`RepositoryError::Duplicate`] and
/// [`RepositoryError::InvalidReference`] by the `From<sqlx::Error>` impl, so
/// the database constraints are the final word on uniqueness.
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasktrack_shared::store::{postgres::PgStore, UserRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
/// let store = PgStore::new(pool);
///
/// println!("{} users", store.count_users().await?);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, TaskRepository, TaskStream, UserRepository};
use crate::models::task::{NewTask, Task, TaskFilter, TaskUpdate};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

/// PostgreSQL implementation of both repositories
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role, created_at
            "#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at, id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn create_task(&self, task: NewTask) -> Result<Task, RepositoryError> {
        let created = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, priority, assignee_id, creator_id)
            VALUES ($1, $2, 'TODO', $3, $4, $5)
            RETURNING id, title, description, status, priority, assignee_id, creator_id,
                      created_at, updated_at
            "#,
        )
        .bind(task.title)
        .bind(task.description)
        .bind(task.priority)
        .bind(task.assignee_id)
        .bind(task.creator_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_task(&self, id: Uuid) -> Result<Task, RepositoryError> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, assignee_id, creator_id,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Task"))
    }

    fn query_tasks(&self, filter: TaskFilter) -> TaskStream<'_> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, assignee_id, creator_id,
                   created_at, updated_at
            FROM tasks
            WHERE ($1::task_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR assignee_id = $2)
            ORDER BY created_at, id
            "#,
        )
        .bind(filter.status)
        .bind(filter.assignee_id)
        .fetch(&self.pool)
        .map_err(RepositoryError::from)
        .boxed()
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Task, RepositoryError> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                status = $4,
                priority = $5,
                assignee_id = $6,
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING id, title, description, status, priority, assignee_id, creator_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.status)
        .bind(update.priority)
        .bind(update.assignee_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Task"))
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Task"));
        }

        Ok(())
    }
}

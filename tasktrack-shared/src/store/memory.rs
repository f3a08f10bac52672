/// In-memory store
///
/// Users and tasks live in hash maps behind `tokio::sync::RwLock`s. Data is
/// lost when the process exits. Uniqueness and reference checks happen under
/// the write lock, so concurrent registrations cannot both claim a username.
///
/// Lock order is always users, then tasks.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepositoryError, TaskRepository, TaskStream, UserRepository};
use crate::models::task::{NewTask, Task, TaskFilter, TaskStatus, TaskUpdate};
use crate::models::user::{NewUser, User};

/// Process-local implementation of both repositories
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Current time at the precision PostgreSQL stores
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn ordered(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    tasks
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Duplicate("username"));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Duplicate("email"));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now(),
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        Ok(self.users.read().await.len() as u64)
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create_task(&self, task: NewTask) -> Result<Task, RepositoryError> {
        let users = self.users.read().await;
        if !users.contains_key(&task.creator_id) {
            return Err(RepositoryError::InvalidReference("creatorId"));
        }
        if let Some(assignee_id) = task.assignee_id {
            if !users.contains_key(&assignee_id) {
                return Err(RepositoryError::InvalidReference("assigneeId"));
            }
        }

        let timestamp = now();
        let created = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            status: TaskStatus::Todo,
            priority: task.priority,
            assignee_id: task.assignee_id,
            creator_id: task.creator_id,
            created_at: timestamp,
            updated_at: timestamp,
        };

        self.tasks.write().await.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_task(&self, id: Uuid) -> Result<Task, RepositoryError> {
        self.tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound("Task"))
    }

    fn query_tasks(&self, filter: TaskFilter) -> TaskStream<'_> {
        stream::once(async move {
            let matching: Vec<Task> = self
                .tasks
                .read()
                .await
                .values()
                .filter(|task| filter.matches(task))
                .cloned()
                .collect();

            stream::iter(ordered(matching).into_iter().map(Ok))
        })
        .flatten()
        .boxed()
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Task, RepositoryError> {
        let users = self.users.read().await;
        let mut tasks = self.tasks.write().await;

        let task = tasks.get_mut(&id).ok_or(RepositoryError::NotFound("Task"))?;

        if let Some(assignee_id) = update.assignee_id {
            if !users.contains_key(&assignee_id) {
                return Err(RepositoryError::InvalidReference("assigneeId"));
            }
        }

        task.title = update.title;
        task.description = update.description;
        task.status = update.status;
        task.priority = update.priority;
        task.assignee_id = update.assignee_id;
        task.updated_at = now().max(task.updated_at + Duration::microseconds(1));

        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.tasks
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound("Task"))
    }
}

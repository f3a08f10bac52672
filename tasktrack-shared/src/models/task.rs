/// Task model
///
/// A unit of work with a status, a priority, an immutable creator, and an
/// optional assignee.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'DONE');
/// CREATE TYPE task_priority AS ENUM ('HIGH', 'MEDIUM', 'LOW');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'TODO',
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     assignee_id UUID REFERENCES users(id),
///     creator_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Wire format
///
/// Field names are camelCase and enum values upper-case:
///
/// ```json
/// {
///   "id": "…",
///   "title": "Implement login endpoint",
///   "description": "Create secure login logic",
///   "status": "IN_PROGRESS",
///   "priority": "HIGH",
///   "assigneeId": "…",
///   "creatorId": "…",
///   "createdAt": "2024-01-01T00:00:00Z",
///   "updatedAt": "2024-01-01T00:00:00Z"
/// }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when parsing an unknown enum value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "HIGH",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::Low => "LOW",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(TaskPriority::High),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "LOW" => Ok(TaskPriority::Low),
            _ => Err(ParseEnumError {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    pub title: String,

    pub description: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    /// User the task is assigned to, if any
    pub assignee_id: Option<Uuid>,

    /// User who created the task; never changes
    pub creator_id: Uuid,

    pub created_at: DateTime<Utc>,

    /// Strictly increases on every update
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// There is no status field: new tasks always start as `TODO`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
    pub creator_id: Uuid,
}

/// Full replacement of a task's mutable fields
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
}

/// Equality filters for task queries, combined with AND
///
/// A `None` field matches every task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Uuid>,
}

impl TaskFilter {
    /// Filter that matches every task
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_assignee(mut self, assignee_id: Uuid) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Checks whether `task` passes every filter that is set
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self
                .assignee_id
                .map_or(true, |assignee| task.assignee_id == Some(assignee))
    }
}

/// Demo data for fresh installations
///
/// When the user store is empty, creates an `ADMIN` account, a `USER`
/// account, and two tasks created by the admin and assigned to the user.
/// Seeding is skipped entirely once any user exists, so running it on every
/// startup is safe.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasktrack_shared::auth::credentials::CredentialStore;
/// use tasktrack_shared::seed::{seed_demo_data, SeedOutcome, SeedPasswords};
/// use tasktrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let credentials = CredentialStore::new(store.clone());
/// let passwords = SeedPasswords {
///     admin: "Admin@123".into(),
///     user: "Password@123".into(),
/// };
///
/// let first = seed_demo_data(&credentials, &*store, &*store, &passwords).await?;
/// assert!(matches!(first, SeedOutcome::Seeded { users: 2, tasks: 2 }));
///
/// let second = seed_demo_data(&credentials, &*store, &*store, &passwords).await?;
/// assert_eq!(second, SeedOutcome::Skipped);
/// # Ok(())
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
/// ```

use tracing::info;

use crate::auth::credentials::{CredentialError, CredentialStore};
use crate::models::task::{NewTask, TaskPriority, TaskStatus, TaskUpdate};
use crate::models::user::Role;
use crate::store::{RepositoryError, TaskRepository, UserRepository};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@local.com";
pub const USER_USERNAME: &str = "jomo";
pub const USER_EMAIL: &str = "luminajomo@gmail.com";

/// Passwords for the seeded accounts
#[derive(Clone)]
pub struct SeedPasswords {
    pub admin: String,
    pub user: String,
}

impl std::fmt::Debug for SeedPasswords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SeedPasswords { .. }")
    }
}

/// What seeding did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Users already existed
    Skipped,

    Seeded { users: usize, tasks: usize },
}

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to create seed account: {0}")]
    Account(#[from] CredentialError),

    #[error("Failed to create seed task: {0}")]
    Task(#[from] RepositoryError),
}

struct DemoTask {
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: TaskPriority,
}

const DEMO_TASKS: [DemoTask; 2] = [
    DemoTask {
        title: "Set up project structure",
        description: "Initialize project with API and UI",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
    },
    DemoTask {
        title: "Implement login endpoint",
        description: "Create secure login logic",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
    },
];

/// Seeds demo accounts and tasks into an empty store
pub async fn seed_demo_data(
    credentials: &CredentialStore,
    users: &dyn UserRepository,
    tasks: &dyn TaskRepository,
    passwords: &SeedPasswords,
) -> Result<SeedOutcome, SeedError> {
    let existing = users.count_users().await?;
    if existing > 0 {
        info!(existing, "Users already present, skipping demo data");
        return Ok(SeedOutcome::Skipped);
    }

    let admin = credentials
        .provision(ADMIN_USERNAME, ADMIN_EMAIL, &passwords.admin, Role::Admin)
        .await?;
    let user = credentials
        .provision(USER_USERNAME, USER_EMAIL, &passwords.user, Role::User)
        .await?;

    for demo in &DEMO_TASKS {
        let task = tasks
            .create_task(NewTask {
                title: demo.title.to_string(),
                description: demo.description.to_string(),
                priority: demo.priority,
                assignee_id: Some(user.id),
                creator_id: admin.id,
            })
            .await?;

        // New tasks always start as TODO; move them to their demo status.
        if demo.status != task.status {
            tasks
                .update_task(
                    task.id,
                    TaskUpdate {
                        title: task.title,
                        description: task.description,
                        status: demo.status,
                        priority: task.priority,
                        assignee_id: task.assignee_id,
                    },
                )
                .await?;
        }
    }

    info!(
        admin = ADMIN_USERNAME,
        user = USER_USERNAME,
        tasks = DEMO_TASKS.len(),
        "Seeded demo data"
    );

    Ok(SeedOutcome::Seeded {
        users: 2,
        tasks: DEMO_TASKS.len(),
    })
}

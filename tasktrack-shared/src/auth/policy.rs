/// Role-based authorization policy
///
/// A static table maps every protected operation to the roles allowed to
/// perform it:
///
/// | Operation | Allowed roles |
/// |---|---|
/// | `QueryTasks`, `GetTask`, `CreateTask`, `UpdateTask` | ADMIN, USER |
/// | `DeleteTask` | ADMIN |
/// | `ListUsers` | ADMIN |
/// | `GetUser` | ADMIN, USER |
///
/// There are no per-record checks: any authenticated user may update any
/// task, and `GetUser` is not restricted to the caller's own record.
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::context::AuthContext;
/// use tasktrack_shared::auth::policy::{authorize, AuthzError, Operation};
/// use tasktrack_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let user = AuthContext { user_id: Uuid::new_v4(), username: "jomo".into(), role: Role::User };
///
/// assert!(authorize(Some(&user), Operation::CreateTask).is_ok());
/// assert!(matches!(authorize(Some(&user), Operation::DeleteTask), Err(AuthzError::Forbidden { .. })));
/// assert!(matches!(authorize(None, Operation::GetTask), Err(AuthzError::Unauthenticated)));
/// ```

use std::fmt;

use super::context::AuthContext;
use crate::models::user::Role;

/// Operations guarded by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    QueryTasks,
    GetTask,
    CreateTask,
    UpdateTask,
    DeleteTask,
    ListUsers,
    GetUser,
}

impl Operation {
    /// Roles permitted to perform this operation
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::QueryTasks
            | Operation::GetTask
            | Operation::CreateTask
            | Operation::UpdateTask
            | Operation::GetUser => &[Role::Admin, Role::User],
            Operation::DeleteTask | Operation::ListUsers => &[Role::Admin],
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::QueryTasks => "query tasks",
            Operation::GetTask => "get task",
            Operation::CreateTask => "create task",
            Operation::UpdateTask => "update task",
            Operation::DeleteTask => "delete task",
            Operation::ListUsers => "list users",
            Operation::GetUser => "get user",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No caller identity was presented
    #[error("Authentication required")]
    Unauthenticated,

    /// Caller's role is not allowed to perform the operation
    #[error("Role {role} may not {operation}")]
    Forbidden { operation: Operation, role: Role },
}

/// Checks that `caller` may perform `operation`
///
/// Returns the caller back on success so handlers can chain on it.
pub fn authorize(
    caller: Option<&AuthContext>,
    operation: Operation,
) -> Result<&AuthContext, AuthzError> {
    let caller = caller.ok_or(AuthzError::Unauthenticated)?;

    if !operation.permits(caller.role) {
        tracing::debug!(
            user_id = %caller.user_id,
            role = %caller.role,
            operation = %operation,
            "Operation denied by policy"
        );
        return Err(AuthzError::Forbidden {
            operation,
            role: caller.role,
        });
    }

    Ok(caller)
}

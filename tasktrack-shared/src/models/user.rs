/// User model
///
/// A user account with a role. Usernames and emails are unique across all
/// users. Accounts are created by registration (always `USER`) or by seeding.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('ADMIN', 'USER');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username TEXT NOT NULL,
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     role user_role NOT NULL DEFAULT 'USER',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_username_key UNIQUE (username),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```
///
/// `User` is deliberately not `Serialize`; clients only ever see
/// [`UserProfile`], which has no password field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access, including task deletion and the user directory
    Admin,

    /// Regular account
    User,
}

impl Role {
    /// Gets role as its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl Default for Role {
    /// Registration always creates plain users.
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user record
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique
    pub username: String,

    /// Email address, unique
    pub email: String,

    /// Argon2id PHC hash
    pub password_hash: String,

    /// Account role
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for creating a new user
///
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Already-hashed password, never plaintext
    pub password_hash: String,
    pub role: Role,
}

/// Client-facing view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"ADMIN\"").unwrap(),
            Role::Admin
        );
        assert_eq!(Role::default(), Role::User);
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_profile_never_contains_password() {
        let user = sample_user();
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();

        assert_eq!(json["username"], "ada");
        assert_eq!(json["role"], "USER");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2id"));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let rendered = format!("{:?}", sample_user());

        assert!(rendered.contains("[redacted]"));
        assert!(!rendered.contains("argon2id"));
    }
}

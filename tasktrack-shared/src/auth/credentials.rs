/// Credential store
///
/// Registers accounts and verifies logins against a [`UserRepository`].
/// Argon2id work runs on the blocking thread pool so request handling threads
/// are never stalled by hashing.
///
/// Login failures are deliberately uniform: an unknown username and a wrong
/// password produce the same [`CredentialError::InvalidCredentials`], and an
/// unknown username still pays for one hash computation.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasktrack_shared::auth::credentials::{CredentialError, CredentialStore};
/// use tasktrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
///
/// let user = credentials.register("ada", "ada@example.com", "Lovelace#1").await?;
/// assert_eq!(credentials.verify("ada", "Lovelace#1").await?.id, user.id);
///
/// assert!(matches!(
///     credentials.verify("ada", "wrong").await,
///     Err(CredentialError::InvalidCredentials)
/// ));
/// # Ok(())
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
/// ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::password::{hash_password, validate_password_strength, verify_password, PasswordError};
use crate::models::user::{NewUser, Role, User};
use crate::store::{RepositoryError, UserRepository};

/// Hash verified against when the username is unknown
///
/// Valid Argon2id PHC string with the production parameters; no password
/// matches it in practice.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGFza3RyYWNrLWR1bW15$0vFY4yQb2bPzqQJp1h8Ykq8pJk3nQm3xw4cQ8eS2s0E";

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Username or email already registered
    #[error("Username or email already exists")]
    DuplicateCredential,

    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password does not satisfy the strength rule
    #[error("{0}")]
    WeakPassword(String),

    /// Hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage failure
    #[error(transparent)]
    Storage(RepositoryError),

    /// Blocking hash task panicked or was cancelled
    #[error("Password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<RepositoryError> for CredentialError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(_) => CredentialError::DuplicateCredential,
            other => CredentialError::Storage(other),
        }
    }
}

/// Registration and login over a user repository
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Registers a new `USER` account
    ///
    /// # Errors
    ///
    /// - `WeakPassword` if the password fails the strength rule
    /// - `DuplicateCredential` if the username or email is taken
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CredentialError> {
        self.provision(username, email, password, Role::User).await
    }

    /// Creates an account with an explicit role
    ///
    /// Same checks as [`register`](Self::register). Used for seeding.
    pub async fn provision(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, CredentialError> {
        validate_password_strength(password).map_err(CredentialError::WeakPassword)?;

        if self.users.find_user_by_username(username).await?.is_some()
            || self.users.find_user_by_email(email).await?.is_some()
        {
            debug!(username, "Registration rejected: duplicate credential");
            return Err(CredentialError::DuplicateCredential);
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        // The store's unique constraint catches a concurrent registration
        // that slipped past the check above.
        let user = self
            .users
            .create_user(NewUser {
                username: username.to_owned(),
                email: email.to_owned(),
                password_hash,
                role,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    /// Checks a username/password pair
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown username or a wrong password
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let user = self.users.find_user_by_username(username).await?;

        let hash = user
            .as_ref()
            .map_or_else(|| DUMMY_HASH.to_owned(), |u| u.password_hash.clone());
        let password = password.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?;

        match (user, matches) {
            (Some(user), Ok(true)) => Ok(user),
            (Some(user), Err(e)) => {
                warn!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                Err(CredentialError::InvalidCredentials)
            }
            _ => {
                warn!(username, "Failed login attempt");
                Err(CredentialError::InvalidCredentials)
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`credentials`]: Registration and login against the user repository
/// - [`jwt`]: Session token issuing and validation
/// - [`context`]: The authenticated caller extracted from a request
/// - [`policy`]: Which roles may perform which operations
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktrack_shared::auth::credentials::CredentialStore;
/// use tasktrack_shared::auth::jwt::TokenIssuer;
/// use tasktrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let credentials = CredentialStore::new(store);
/// let issuer = TokenIssuer::new("a-secret-that-is-at-least-32-bytes-long");
///
/// let user = credentials.register("ada", "ada@example.com", "Lovelace#1").await?;
/// let token = issuer.issue(&user)?;
/// let claims = issuer.validate(&token)?;
/// assert_eq!(claims.sub, user.id);
/// # Ok(())
/// # }
/// ```

pub mod context;
pub mod credentials;
pub mod jwt;
pub mod password;
pub mod policy;

/// Session token issuing and validation
///
/// Tokens are HS256-signed JWTs that carry the caller's identity and role.
/// They are stateless: nothing is stored server-side and a token stays valid
/// until it expires, even if the user's role changes in the meantime.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 8 hours by default, no clock-skew leeway
/// - **Validation**: Signature, issuer, and expiration checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use tasktrack_shared::auth::jwt::{JwtError, TokenIssuer};
/// use tasktrack_shared::models::user::{Role, User};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("your-secret-key-at-least-32-bytes!");
/// let user = User {
///     id: Uuid::new_v4(),
///     username: "ada".into(),
///     email: "ada@example.com".into(),
///     password_hash: String::new(),
///     role: Role::User,
///     created_at: Utc::now(),
/// };
///
/// let issued_at = Utc::now();
/// let token = issuer.issue_at(&user, issued_at)?;
///
/// let claims = issuer.validate_at(&token, issued_at + Duration::seconds(1))?;
/// assert_eq!(claims.sub, user.id);
///
/// let late = issued_at + Duration::hours(8) + Duration::seconds(1);
/// assert!(matches!(issuer.validate_at(&token, late), Err(JwtError::Expired)));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User};

/// Issuer claim stamped on every token
pub const ISSUER: &str = "tasktrack";

/// Default token lifetime
pub const DEFAULT_TTL_HOURS: i64 = 8;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, structure, or issuer check failed
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims structure
///
/// - `sub`: Subject (user ID)
/// - `username`: Login name at issue time
/// - `role`: Role at issue time
/// - `iss`: Issuer (always "tasktrack")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    pub username: String,

    pub role: Role,

    /// Issuer - Always "tasktrack"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Builds claims for `user`, issued at `now` and valid for `ttl`
    pub fn for_user(user: &User, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks whether the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }
}

/// Signs and validates session tokens with a single process-wide secret
///
/// Built once at startup and shared behind an `Arc`.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer with the default 8 hour lifetime
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Creates an issuer with a custom token lifetime
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        // Expiry is checked against an explicit clock in `validate_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user`, valid from now
    pub fn issue(&self, user: &User) -> Result<String, JwtError> {
        self.issue_at(user, Utc::now())
    }

    /// Issues a token for `user` as if the current time were `now`
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims::for_user(user, now, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token against the current time
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates a token as if the current time were `now`
    ///
    /// # Errors
    ///
    /// - `JwtError::Invalid` if the signature, structure, or issuer is wrong
    /// - `JwtError::Expired` if `exp` is before `now`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| JwtError::Invalid(e.to_string()))?;

        let claims = token_data.claims;
        if claims.is_expired_at(now) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-32-bytes-long";

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "grace".to_string(),
            email: "grace@example.com".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_claims_carry_identity_and_role() {
        let issuer = TokenIssuer::new(SECRET);
        let admin = user(Role::Admin);

        let token = issuer.issue(&admin).expect("Should issue");
        let claims = issuer.validate(&token).expect("Should validate");

        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.username, "grace");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[test]
    fn test_valid_one_second_after_issue() {
        let issuer = TokenIssuer::new(SECRET);
        let t = Utc::now();

        let token = issuer.issue_at(&user(Role::User), t).unwrap();

        assert!(issuer.validate_at(&token, t + Duration::seconds(1)).is_ok());
    }

    #[test]
    fn test_expired_one_second_after_ttl() {
        let issuer = TokenIssuer::new(SECRET);
        let t = Utc::now();

        let token = issuer.issue_at(&user(Role::User), t).unwrap();

        assert!(issuer
            .validate_at(&token, t + Duration::hours(8))
            .is_ok());
        assert!(matches!(
            issuer.validate_at(&token, t + Duration::hours(8) + Duration::seconds(1)),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new(SECRET).issue(&user(Role::User)).unwrap();
        let other = TokenIssuer::new("a-completely-different-32-byte-secret");

        assert!(matches!(other.validate(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue(&user(Role::User)).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = "eyJzdWIiOiJoYWNrZXIifQ";
        let tampered = parts.join(".");

        assert!(matches!(
            issuer.validate(&tampered),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new(SECRET);

        assert!(issuer.validate("").is_err());
        assert!(issuer.validate("not.a.jwt").is_err());
        assert!(issuer.validate("invalid").is_err());
    }

    #[test]
    fn test_custom_ttl() {
        let issuer = TokenIssuer::with_ttl(SECRET, Duration::minutes(5));
        let t = Utc::now();
        let token = issuer.issue_at(&user(Role::User), t).unwrap();

        assert_eq!(issuer.ttl(), Duration::minutes(5));
        assert!(issuer.validate_at(&token, t + Duration::minutes(4)).is_ok());
        assert!(issuer.validate_at(&token, t + Duration::minutes(6)).is_err());
    }
}

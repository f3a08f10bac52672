/// The authenticated caller
///
/// Request handlers never read identity from ambient state. The bearer token
/// is validated once per request and the resulting [`AuthContext`] is handed
/// explicitly to the authorization policy.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use tasktrack_shared::auth::context::{authenticate, AuthError};
/// use tasktrack_shared::auth::jwt::TokenIssuer;
///
/// let issuer = TokenIssuer::new("your-secret-key-at-least-32-bytes!");
///
/// // No header: anonymous caller
/// assert!(authenticate(&issuer, &HeaderMap::new()).unwrap().is_none());
///
/// // Header present but not a bearer token
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
/// assert!(matches!(authenticate(&issuer, &headers), Err(AuthError::InvalidFormat(_))));
/// ```

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use super::jwt::{Claims, JwtError, TokenIssuer};
use crate::models::user::Role;

/// Identity and role of the caller, taken from a validated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token failed validation or has expired
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Resolves the caller from request headers
///
/// Returns `Ok(None)` when no `Authorization` header is present, so that the
/// policy can decide whether anonymous access is allowed. A header that is
/// present but malformed, or carries an invalid or expired token, is an error.
pub fn authenticate(
    issuer: &TokenIssuer,
    headers: &HeaderMap,
) -> Result<Option<AuthContext>, AuthError> {
    let token = match bearer_token(headers) {
        Ok(token) => token,
        Err(AuthError::MissingCredentials) => return Ok(None),
        Err(e) => return Err(e),
    };

    let claims = issuer.validate(token)?;
    Ok(Some(AuthContext::from_claims(claims)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use axum::http::HeaderValue;
    use chrono::Utc;

    const SECRET: &str = "test-secret-key-that-is-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            bearer_token(&headers_with("Token abc")),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_authenticate_valid_token() {
        let issuer = TokenIssuer::new(SECRET);
        let user = User {
            id: Uuid::new_v4(),
            username: "linus".to_string(),
            email: "linus@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let token = issuer.issue(&user).unwrap();

        let caller = authenticate(&issuer, &headers_with(&format!("Bearer {}", token)))
            .unwrap()
            .expect("Caller should be present");

        assert_eq!(caller.user_id, user.id);
        assert_eq!(caller.username, "linus");
        assert!(caller.is_admin());
    }

    #[test]
    fn test_authenticate_rejects_bad_token() {
        let issuer = TokenIssuer::new(SECRET);

        assert!(matches!(
            authenticate(&issuer, &headers_with("Bearer not-a-token")),
            Err(AuthError::InvalidToken(_))
        ));
    }
}

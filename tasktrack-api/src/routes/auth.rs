/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new `USER` account and get a token
/// - `POST /auth/login` - Exchange username and password for a token
///
/// Both respond with the same shape:
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "username": "ada", "email": "ada@example.com", "role": "USER", "createdAt": "..." }
/// }
/// ```

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tasktrack_shared::models::user::UserProfile;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Checked against the password strength rule by the credential store
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token plus the profile it was issued for
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: Invalid input, weak password, or username/email already taken
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .credentials
        .register(&req.username, &req.email, &req.password)
        .await?;

    let token = state.tokens.issue(&user)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Log in
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .credentials
        .verify(&req.username, &req.password)
        .await?;

    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// User directory endpoints
///
/// - `GET /users` - List all users (ADMIN only; 204 when empty)
/// - `GET /users/:id` - Get one user (any authenticated caller)

use crate::{app::AppState, error::ApiResult, extract::Caller};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tasktrack_shared::{
    auth::policy::{authorize, Operation},
    models::user::UserProfile,
    store::RepositoryError,
};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
}

pub async fn list_users(State(state): State<AppState>, caller: Caller) -> ApiResult<Response> {
    authorize(caller.context(), Operation::ListUsers)?;

    let users: Vec<UserProfile> = state
        .users
        .list_users()
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    if users.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(users).into_response())
}

pub async fn get_user(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<UserProfile>> {
    authorize(caller.context(), Operation::GetUser)?;
    let Path(id) = id?;

    let user = state
        .users
        .find_user(id)
        .await?
        .ok_or(RepositoryError::NotFound("User"))?;

    Ok(Json(user.into()))
}

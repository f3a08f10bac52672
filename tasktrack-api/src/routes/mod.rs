/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `tasks`: Task CRUD and filtered queries
/// - `users`: User directory
///
/// Every protected handler follows the same steps: take the [`Caller`],
/// pass it to [`authorize`] with the operation, then call the store.
///
/// [`Caller`]: crate::extract::Caller
/// [`authorize`]: tasktrack_shared::auth::policy::authorize

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

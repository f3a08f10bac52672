/// Request extractors
///
/// - [`Caller`]: the optional authenticated identity behind a request
/// - [`ValidatedJson`]: a JSON body that has passed `validator` rules
/// - [`empty_string_as_none`]: query-string helper treating `?status=` as absent

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use std::str::FromStr;
use tasktrack_shared::auth::context::{authenticate, AuthContext};
use validator::Validate;

use crate::{app::AppState, error::ApiError};

/// The caller's identity, if a bearer token was presented
///
/// A request without an `Authorization` header yields `Caller(None)`; the
/// authorization policy then decides whether that is acceptable. A header that
/// is malformed or carries an invalid or expired token is rejected with 401
/// before the handler runs.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<AuthContext>);

impl Caller {
    pub fn context(&self) -> Option<&AuthContext> {
        self.0.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = authenticate(&state.tokens, &parts.headers)?;
        Ok(Caller(context))
    }
}

/// JSON body extractor that runs `validator` rules
///
/// Malformed JSON becomes `400 bad_request`; rule violations become
/// `400 validation_error` with per-field details.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::BadRequest(rejection.body_text()))?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Deserializes an optional query value, treating an empty string as absent
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => T::from_str(s).map(Some).map_err(serde::de::Error::custom),
    }
}

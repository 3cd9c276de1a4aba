//! Axum extractors for session tokens and request bodies
//!
//! Every rejection is a [`NurseryError`], so clients always receive the same
//! `{ code, message, details }` error body.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AuthError, NurseryError, RequestError};

/// Session token taken from `Authorization: Bearer <uuid>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(pub Uuid);

impl SessionToken {
    /// Parse an `Authorization` header value
    pub fn from_header_value(value: &str) -> Result<Self, AuthError> {
        let raw = value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?
            .trim();
        Uuid::parse_str(raw)
            .map(SessionToken)
            .map_err(|_| AuthError::InvalidToken)
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = NurseryError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;
        let value = header.to_str().map_err(|_| AuthError::InvalidToken)?;
        Ok(Self::from_header_value(value)?)
    }
}

/// JSON body whose decoding errors become [`RequestError::InvalidBody`]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = NurseryError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            RequestError::InvalidBody {
                message: e.body_text(),
            }
        })?;
        Ok(Payload(value))
    }
}

/// JSON body that is also checked against its `validator` rules
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn login(
///     State(state): State<AppState>,
///     Validated(request): Validated<LoginRequest>,
/// ) -> Result<Json<LoginResponse>, NurseryError> {
///     // request.email is a well-formed address here
/// }
/// ```
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = NurseryError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Payload(value) = Payload::<T>::from_request(req, state).await?;
        value.validate().map_err(|errors| RequestError::InvalidInput {
            message: errors.to_string(),
        })?;
        Ok(Validated(value))
    }
}

//! Request extractors.
//!
//! [`Caller`] and [`Admin`] validate the bearer token; [`JsonBody`] turns
//! body rejections into the regular error shape instead of axum's plain
//! text.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;

use interbox_core::auth::{Claims, bearer_token};

use crate::error::ApiError;
use crate::routes::AppState;

/// Any valid token, anon or admin.
#[derive(Debug, Clone)]
pub struct Caller(pub Claims);

/// A valid token carrying the admin role.
#[derive(Debug, Clone)]
pub struct Admin(pub Claims);

fn claims_from(parts: &Parts, state: &AppState) -> Result<Claims, ApiError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::Unauthorized)?;
    state.tokens.validate(token).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        ApiError::Unauthorized
    })
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        claims_from(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from(parts, state)?;
        if !claims.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(claims))
    }
}

/// `Json<T>` with rejections mapped to [`ApiError::BadRequest`].
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

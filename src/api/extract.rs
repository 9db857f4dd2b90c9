//! Request extractors whose rejections render as [`AppError`].

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde_json::Value;

use crate::error::AppError;

/// Raw JSON request body, handed to a serializer for field validation.
///
/// A body that is not JSON is reported as a `non_field_errors` validation
/// failure.
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Record id from the `{id}` path segment.
///
/// A segment that is not an integer can match no record, so it is a 404.
#[derive(Debug)]
pub struct RecordId<T>(pub T);

impl<S, T> FromRequestParts<S> for RecordId<T>
where
    S: Send + Sync,
    T: From<i64> + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::NotFound(rejection.body_text()))?;
        raw.parse::<i64>()
            .map(|id| Self(T::from(id)))
            .map_err(|_| AppError::NotFound(format!("no record has id \"{raw}\"")))
    }
}

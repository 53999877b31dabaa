//! Request extractors that report failures in the service's own error shape.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::messages;

/// JSON body extractor.
///
/// Unlike `axum::Json` this ignores `Content-Type` and turns every decode
/// failure (empty body included) into a localized 400.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read request body");
            AppError::BadRequest(messages::INVALID_JSON_BODY.into())
        })?;

        serde_json::from_slice(&bytes).map(Json).map_err(|e| {
            tracing::debug!(error = %e, "Rejected malformed JSON body");
            AppError::BadRequest(messages::INVALID_JSON_BODY.into())
        })
    }
}

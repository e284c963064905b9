//! Custom Axum extractors

use axum::extract::{FromRequest, Request};
use axum::Json;
use roster_core::{UserPayload, ValidationError};

use super::error::ApiError;

/// Decode and validate a user payload from the JSON body.
///
/// Any decode failure (bad JSON, missing field, wrong content type) and
/// any field rule violation becomes a 400.
pub struct ValidUserPayload(pub UserPayload);

impl<S> FromRequest<S> for ValidUserPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<UserPayload>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(ValidationError::Body {
                    reason: rejection.body_text(),
                })
            })?;

        payload.validate()?;
        Ok(Self(payload))
    }
}

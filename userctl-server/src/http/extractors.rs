//! Custom Axum extractors

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::Json;
use axum::http::request::Parts;

use super::error::ApiError;
use crate::models::{NewUserRequest, UserFields, ValidationError};

/// Extract and validate a user id from path
pub struct ValidUserId(pub i64);

impl<S> FromRequestParts<S> for ValidUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid_id())?;

        let id = id.parse::<i64>().map_err(|_| invalid_id())?;
        Ok(Self(id))
    }
}

fn invalid_id() -> ApiError {
    ApiError::from(ValidationError::InvalidFormat {
        field: "user_id",
        reason: "must be an integer",
    })
}

/// Extract a JSON user payload and run field validation on it.
///
/// Handlers that take this never see unvalidated input.
pub struct ValidUser(pub UserFields);

impl<S> FromRequest<S> for ValidUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<NewUserRequest> = Json::from_request(req, state).await?;
        let fields = payload.validate()?;
        Ok(Self(fields))
    }
}

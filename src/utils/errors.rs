use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::response::Envelope;

/// Generic envelope code for errors that carry no more specific class.
pub const CODE_GENERIC: i32 = 4000;
/// Envelope code for failed store calls.
pub const CODE_STORE_EXEC: i32 = 5000;
/// Envelope code for "no data for this id/name".
pub const CODE_NOT_FOUND: i32 = 40000;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: i32,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, code: i32, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            code,
            error: err.into(),
        }
    }

    /// Referenced id or name does not resolve to a record.
    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, CODE_NOT_FOUND, err)
    }

    /// Uniqueness violation on create.
    pub fn duplicate_name(name: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            400,
            anyhow::anyhow!("name already exists: {}", name),
        )
    }

    /// Underlying store call failed.
    pub fn store<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, CODE_STORE_EXEC, err)
    }

    /// Malformed or missing required request field.
    pub fn invalid_input<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, 400, err)
    }

    pub fn unauthorized(msg: String) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, 401, anyhow::anyhow!(msg))
    }

    /// Authorization denied. `msg` is surfaced verbatim to the caller.
    pub fn no_permission(msg: String) -> Self {
        Self::new(StatusCode::FORBIDDEN, 403, anyhow::anyhow!(msg))
    }

    /// Required request-scoped state (current-user context) is absent.
    pub fn misconfigured(msg: String) -> Self {
        Self::new(StatusCode::EXPECTATION_FAILED, 417, anyhow::anyhow!(msg))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(Envelope::<()> {
            code: self.code,
            msg: self.error.to_string(),
            data: None,
        });

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::new(StatusCode::BAD_REQUEST, CODE_GENERIC, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let err = AppError::not_found(anyhow::anyhow!("no data for this id"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, CODE_NOT_FOUND);

        let err = AppError::no_permission("denied".to_string());
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err = AppError::misconfigured("no current user".to_string());
        assert_eq!(err.status, StatusCode::EXPECTATION_FAILED);
    }

    #[test]
    fn test_blanket_from_is_generic_400() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, CODE_GENERIC);
    }
}

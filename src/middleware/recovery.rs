use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::utils::response::Envelope;

/// Turns a handler panic into a 500 envelope instead of a dropped
/// connection. Wired through `CatchPanicLayer::custom`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(detail, "handler panicked");

    let body = Json(Envelope::<()> {
        code: 500,
        msg: "internal server error".to_string(),
        data: None,
    });

    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

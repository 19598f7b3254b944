//! Uniform response envelope.
//!
//! Every handler that surfaces results to callers wraps them in
//! `{code, msg, data}`. Success is always HTTP 200 with `code` 200; failures
//! keep their HTTP status and mirror it (or a finer-grained class) in `code`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Success response: HTTP 200, envelope code 200, msg "OK".
pub struct Ok<T>(pub T);

impl<T> Ok<T> {
    pub fn json(data: T) -> Json<Envelope<T>> {
        Json(Envelope {
            code: 200,
            msg: "OK".to_string(),
            data: Some(data),
        })
    }
}

impl<T: Serialize> IntoResponse for Ok<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Self::json(self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let env = Ok::json("payload");
        let value = serde_json::to_value(&env.0).unwrap();
        assert_eq!(value["code"], 200);
        assert_eq!(value["msg"], "OK");
        assert_eq!(value["data"], "payload");
    }

    #[test]
    fn test_envelope_omits_absent_data() {
        let env = Envelope::<()> {
            code: 400,
            msg: "bad".to_string(),
            data: None,
        };
        let value = serde_json::to_value(&env).unwrap();
        assert!(value.get("data").is_none());
    }
}

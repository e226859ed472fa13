//! Error responses.
//!
//! # Design Decisions
//! - Every gateway-generated error is JSON: `{"result": false, "message": ...}`
//! - Unrecognized routes are 404, malformed input 400, upstream trouble 5xx

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::routing::RouteError;

/// Build a gateway error response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({
        "result": false,
        "message": message.into(),
    });
    (status, Json(body)).into_response()
}

impl RouteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteError::BodyRead(_) | RouteError::MalformedRequest { .. } => StatusCode::BAD_REQUEST,
            RouteError::UnrecognizedRoute { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_route_error_responses() {
        let err = RouteError::UnrecognizedRoute { path: "/api/v3/unknown/zzz".into() };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["result"], false);
        assert_eq!(json["message"], "unknown requested with backend process: /api/v3/unknown/zzz");

        let source = serde_json::from_slice::<serde_json::Value>(b"").unwrap_err();
        let err = RouteError::MalformedRequest { route: "/api/v3/cc/create_inst/", source };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(RouteError::BodyRead("reset".into()).status_code(), StatusCode::BAD_REQUEST);
    }
}

/// Centralized helpers for HTTP error responses.
///
/// Every error body has the same shape: `{"error": {"code", "message"}}`.
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::error::ArenaError;

/// Returns an HTTP error response with a JSON body.
pub fn http_error_response(code: &str, message: &str, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": {
            "code": code,
            "message": message,
        }
    }))
}

impl ResponseError for ArenaError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        http_error_response(self.code(), &self.to_string(), self.status_code())
    }
}

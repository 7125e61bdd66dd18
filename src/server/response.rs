use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

use crate::error::GatewayError;

pub const IN_PROGRESS_MESSAGE: &str = "Image generation in progress. Try again later.";

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::ValidationError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.category(),
            "message": self.to_string(),
        });
        if let Some(details) = self.details() {
            body["details"] = details.clone();
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// 202 body telling the caller to retry the whole generation later.
pub fn in_progress() -> HttpResponse {
    HttpResponse::Accepted().json(json!({ "message": IN_PROGRESS_MESSAGE }))
}

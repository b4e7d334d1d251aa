use actix_web::{
    error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse, ResponseError,
};
use serde_json::json;

/// Failures at the HTTP boundary. Every one of them still answers with JSON.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Configuration(String),
    #[error("{message}")]
    Unhandled { message: String, error_type: String },
}

impl ApiError {
    pub fn unhandled(error_type: &str, message: impl ToString) -> Self {
        ApiError::Unhandled {
            message: message.to_string(),
            error_type: error_type.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::unhandled("InternalError", format!("{:#}", e))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        match e.is_panic() {
            true => ApiError::unhandled("Panic", "Search failed unexpectedly"),
            false => ApiError::unhandled("Cancelled", "Search was cancelled"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Configuration(_) => StatusCode::BAD_REQUEST,
            ApiError::Unhandled { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Unhandled { message, error_type } => json!({
                "error": message,
                "companies": [],
                "count": 0,
                "error_type": error_type,
            }),
            other => json!({
                "error": other.to_string(),
                "companies": [],
                "count": 0,
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Turns unreadable JSON bodies into a validation error with a JSON payload.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected request body: {}", err);

    let message = match err {
        JsonPayloadError::ContentType => "Request must be JSON".to_string(),
        other => format!("Invalid request body: {}", other),
    };

    ApiError::Validation(message).into()
}

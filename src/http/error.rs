//! Store errors as HTTP responses. Every error body is `{"message": ...}`.

use crate::error::Error;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// An HTTP error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// Text for the `message` field.
    pub message: String,
}

impl ApiError {
    /// Error with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 404 for unmatched routes.
    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Route not found")
    }

    /// 500 with the catch-all message.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!")
    }

    /// Mapper for a mutation: write failures become
    /// `500 "Error <action>"`, everything else maps as usual.
    pub fn on_write(action: &'static str) -> impl Fn(Error) -> ApiError {
        move |err| match err {
            Error::Persistence(_) | Error::Serialize(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Error {action}"))
            }
            other => other.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { collection, .. } => {
                Self::new(StatusCode::NOT_FOUND, format!("{} not found", singular(collection)))
            }
            Error::Conflict { .. } => Self::new(StatusCode::BAD_REQUEST, "User already exists"),
            Error::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "Invalid credentials"),
            other => {
                error!(error = %other, "request failed");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "message": self.message }))).into_response()
    }
}

fn singular(collection: &str) -> &str {
    match collection {
        "services" => "Service",
        "appointments" => "Appointment",
        "users" => "User",
        _ => "Record",
    }
}

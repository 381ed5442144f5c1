//! Error handling

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

/// Errors returned by the HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// When you didn't do the right thing
    BadRequest(String),
    /// The image provider rejected or failed the request, carries its message
    Provider(String),
    /// A proxied upstream answered with a non-success status
    Upstream {
        /// Status returned by the upstream
        status: StatusCode,
        /// Body returned by the upstream, passed on verbatim
        body: Vec<u8>,
    },
    /// When a requested resource is not found
    NotFound(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for AppError {
    fn from(err: axum::http::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<crate::provider::ProviderError> for AppError {
    fn from(err: crate::provider::ProviderError) -> Self {
        AppError::Provider(err.to_string())
    }
}

fn text_response(status: StatusCode, body: impl Into<Body>) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                info!("Bad request received: {}", message);
                text_response(StatusCode::BAD_REQUEST, message)
            }
            AppError::Provider(message) => {
                error!("Provider error: {}", message);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            AppError::Upstream { status, body } => {
                info!("Upstream answered {}", status);
                text_response(status, body)
            }
            AppError::NotFound(what) => {
                info!("404 {what}");
                text_response(StatusCode::NOT_FOUND, "Not Found")
            }
            AppError::InternalServerError(message) => {
                error!("Internal server error: {}", message);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

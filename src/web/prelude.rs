pub(crate) use crate::error::AppError;
pub(crate) use crate::web::AppState;
pub(crate) use axum::Json;
pub(crate) use axum::extract::{Path, State};
pub(crate) use axum::http::{HeaderValue, StatusCode};
pub(crate) use axum::response::{IntoResponse, Response};
pub(crate) use serde::Serialize;
pub(crate) use serde_json::{Value, json};
pub(crate) use tracing::{info, warn};

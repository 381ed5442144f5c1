use super::prelude::*;
use crate::capture::CaptureStatus;

#[derive(Serialize)]
struct CaptureView<'a> {
    key: &'a str,
    #[serde(flatten)]
    status: CaptureStatus,
}

/// handles GET /captures/{key}
pub(crate) async fn capture_status_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let status = state
        .captures
        .registry()
        .get(&key)
        .await
        .ok_or_else(|| AppError::NotFound(format!("capture {key}")))?;
    Ok(Json(CaptureView { key: &key, status }).into_response())
}

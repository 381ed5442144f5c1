use super::prelude::*;
use crate::constants::INVALID_BALANCE_RESPONSE;

/// handles GET /balance by asking the configured billing endpoint
pub(crate) async fn balance_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let resp = state
        .http
        .get(&state.balance.url)
        .bearer_auth(&state.balance.token)
        .send()
        .await?;

    let status = resp.status();
    let body = resp.bytes().await?;
    if status != StatusCode::OK {
        return Err(AppError::Upstream {
            status,
            body: body.to_vec(),
        });
    }

    let parsed: Value = serde_json::from_slice(&body).map_err(|err| {
        warn!("Billing endpoint returned invalid JSON: {}", err);
        AppError::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: INVALID_BALANCE_RESPONSE.as_bytes().to_vec(),
        }
    })?;
    let balance = parsed.get("balance").cloned().unwrap_or(Value::Null);
    Ok(Json(json!({ "balance": balance })).into_response())
}

use super::prelude::*;
use crate::capture::CaptureJob;
use crate::capture::keys::new_image_key;
use crate::constants::X_CAPTURE_KEY;
use crate::models::{GenerateRequest, ImageGenerationRequest, ModelVariant};

/// handles POST /generate
///
/// Answers with the provider's first result item as soon as the provider does;
/// the capture of the image runs on after the response is sent.
pub(crate) async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    let variant = ModelVariant::lookup(&request.model)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported model: {}", request.model)))?;

    info!("Sending request to provider with prompt: {}", request.prompt);
    let provider_request =
        ImageGenerationRequest::new(&request.prompt, &request.resolution, variant);
    let image = state.provider.generate(&provider_request).await?;

    let key = new_image_key();
    let submitted = match CaptureJob::for_image(key.clone(), &image, &request.prompt) {
        Ok(job) => {
            state.captures.submit(job).await;
            true
        }
        Err(err) => {
            warn!("Not capturing {}: {}", key, err);
            false
        }
    };

    let mut response = Json(image).into_response();
    if submitted && let Ok(value) = HeaderValue::from_str(&key) {
        response.headers_mut().insert(X_CAPTURE_KEY, value);
    }
    Ok(response)
}

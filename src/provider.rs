//! Client for the image generation provider (OpenAI Images API).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::models::{GeneratedImage, ImageGenerationRequest};

/// Errors from the provider. `Display` gives the message returned to clients.
#[derive(Debug)]
pub enum ProviderError {
    /// No API key was configured.
    MissingApiKey,
    /// The request never got an answer.
    Transport(reqwest::Error),
    /// The provider answered with an error status.
    Api {
        /// HTTP status of the answer.
        status: StatusCode,
        /// The provider's error message.
        message: String,
    },
    /// The answer could not be parsed.
    InvalidResponse(String),
    /// The answer contained no images.
    EmptyResult,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(
                f,
                "No API key configured, put one in the key file to call the provider"
            ),
            Self::Transport(err) => write!(f, "Connection error: {err}"),
            Self::Api { message, .. } => write!(f, "{message}"),
            Self::InvalidResponse(err) => write!(f, "Invalid response from provider: {err}"),
            Self::EmptyResult => write!(f, "Provider returned no image data"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// Something that turns a prompt into a generated image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Requests an image and returns the first result item.
    async fn generate(
        &self,
        request: &ImageGenerationRequest<'_>,
    ) -> Result<GeneratedImage, ProviderError>;
}

#[derive(Deserialize, Debug)]
struct ImagesGenerateResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ApiErrorDetail {
    message: String,
}

/// [`ImageProvider`] backed by the OpenAI Images API.
/// Docs: https://platform.openai.com/docs/api-reference/images
#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiProvider {
    /// Creates a provider sharing `client` for its requests.
    pub fn new(client: reqwest::Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/images/generations",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// Pulls the human readable message out of an error body, falling back to the raw text.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.is_empty() => format!("Provider returned {status}"),
        Err(_) => String::from_utf8_lossy(body).to_string(),
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    async fn generate(
        &self,
        request: &ImageGenerationRequest<'_>,
    ) -> Result<GeneratedImage, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey)?;

        debug!(
            "Requesting {} image from {} (quality {:?})",
            request.model,
            self.endpoint(),
            request.quality
        );
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(ProviderError::Api {
                status,
                message: error_message(status, &bytes),
            });
        }

        let parsed: ImagesGenerateResponse = serde_json::from_slice(&bytes)
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        info!("Response received: {} image(s)", parsed.data.len());

        parsed
            .data
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResult)
    }
}

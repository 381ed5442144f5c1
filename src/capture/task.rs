//! A single capture: fetch the image, then write it and its metadata.

use base64::Engine;
use base64::engine::general_purpose;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;
use url::Url;

use super::keys::metadata_key_for;
use super::registry::{CaptureRegistry, CaptureStatus};
use super::{CaptureError, RemoteFetcher};
use crate::constants::{IMAGE_CONTENT_TYPE, METADATA_CONTENT_TYPE};
use crate::models::GeneratedImage;
use crate::storage::BlobStore;

/// Where the image bytes come from.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureSource {
    /// Download from the provider's result URL.
    Remote(Url),
    /// Base64 data returned inline by the provider.
    Inline(String),
}

impl CaptureSource {
    /// Picks the source for a provider result, preferring its URL.
    pub fn for_image(image: &GeneratedImage) -> Result<Self, CaptureError> {
        if let Some(url) = image.url() {
            let url = Url::parse(url)
                .map_err(|err| CaptureError::InvalidSource(format!("{url}: {err}")))?;
            return Ok(Self::Remote(url));
        }
        image
            .b64_json()
            .map(|data| Self::Inline(data.to_string()))
            .ok_or_else(|| {
                CaptureError::InvalidSource("result has neither url nor b64_json".to_string())
            })
    }
}

/// Everything one capture needs; owned by the task running it.
#[derive(Clone, Debug)]
pub struct CaptureJob {
    /// Key the image is written under.
    pub key: String,
    /// Metadata written under the sibling `.json` key.
    pub metadata: Map<String, Value>,
    /// Where the image comes from.
    pub source: CaptureSource,
}

impl CaptureJob {
    /// Builds the job for a provider result: metadata is the result plus the prompt.
    pub fn for_image(
        key: String,
        image: &GeneratedImage,
        prompt: &str,
    ) -> Result<Self, CaptureError> {
        Ok(Self {
            key,
            metadata: image.metadata_with_prompt(prompt),
            source: CaptureSource::for_image(image)?,
        })
    }

    /// Runs the capture. The image is written before the metadata, and a failed
    /// fetch writes nothing. Nothing is cleaned up when a later step fails.
    pub async fn run(
        self,
        fetcher: &RemoteFetcher,
        store: &dyn BlobStore,
        registry: &CaptureRegistry,
    ) -> Result<(), CaptureError> {
        registry.set(&self.key, CaptureStatus::Fetching).await;
        let payload = match &self.source {
            CaptureSource::Remote(url) => fetcher.fetch(url).await?,
            CaptureSource::Inline(data) => general_purpose::STANDARD
                .decode(data)
                .map_err(CaptureError::Decode)?,
        };

        registry.set(&self.key, CaptureStatus::Storing).await;
        info!(
            "Uploading {} ({} bytes) to bucket {}",
            self.key,
            payload.len(),
            store.location()
        );
        store
            .put(&self.key, payload, IMAGE_CONTENT_TYPE)
            .await
            .map_err(CaptureError::Storage)?;

        let metadata_key = metadata_key_for(&self.key);
        let document = metadata_document(&self.metadata).map_err(CaptureError::Serialize)?;
        store
            .put(&metadata_key, document, METADATA_CONTENT_TYPE)
            .await
            .map_err(CaptureError::Storage)?;
        Ok(())
    }
}

/// Metadata as UTF-8 JSON indented by four spaces.
pub(crate) fn metadata_document(metadata: &Map<String, Value>) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    metadata.serialize(&mut serializer)?;
    Ok(buffer)
}

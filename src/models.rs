//! Request and result types shared by the web layer and the provider client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /generate`.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerateRequest {
    /// Text prompt forwarded to the provider.
    pub prompt: String,
    /// Image size descriptor, eg `1024x1024`.
    pub resolution: String,
    /// Model identifier, one of [`MODEL_VARIANTS`].
    pub model: String,
}

/// Quality flag sent to the provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    /// Default rendering.
    Standard,
    /// High definition rendering.
    Hd,
}

/// A model identifier accepted from clients and what it resolves to upstream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ModelVariant {
    /// Identifier clients send.
    pub id: &'static str,
    /// Base model name sent to the provider.
    pub model: &'static str,
    /// Quality flag sent with it.
    pub quality: ImageQuality,
}

/// Every model identifier clients may ask for.
pub const MODEL_VARIANTS: &[ModelVariant] = &[
    ModelVariant {
        id: "dall-e-2",
        model: "dall-e-2",
        quality: ImageQuality::Standard,
    },
    ModelVariant {
        id: "dall-e-3",
        model: "dall-e-3",
        quality: ImageQuality::Standard,
    },
    ModelVariant {
        id: "dall-e-3-hd",
        model: "dall-e-3",
        quality: ImageQuality::Hd,
    },
];

impl ModelVariant {
    /// Looks up a client-facing model identifier.
    pub fn lookup(id: &str) -> Option<&'static ModelVariant> {
        MODEL_VARIANTS.iter().find(|variant| variant.id == id)
    }
}

/// Request body for `POST {base}/images/generations`.
#[derive(Clone, Debug, Serialize)]
pub struct ImageGenerationRequest<'a> {
    /// Base model name.
    pub model: &'a str,
    /// Prompt text.
    pub prompt: &'a str,
    /// Image size descriptor.
    pub size: &'a str,
    /// Quality flag.
    pub quality: ImageQuality,
    /// Number of images, always 1.
    pub n: u8,
}

impl<'a> ImageGenerationRequest<'a> {
    /// Builds the provider request for a client request and its resolved model.
    pub fn new(prompt: &'a str, size: &'a str, variant: &ModelVariant) -> Self {
        Self {
            model: variant.model,
            prompt,
            size,
            quality: variant.quality,
            n: 1,
        }
    }
}

/// First item of a provider result, every field kept in provider order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct GeneratedImage(Map<String, Value>);

impl GeneratedImage {
    /// Download URL of the generated image, when the provider returned one.
    pub fn url(&self) -> Option<&str> {
        self.0
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Inline base64 image data, when the provider returned it.
    pub fn b64_json(&self) -> Option<&str> {
        self.0
            .get("b64_json")
            .and_then(Value::as_str)
            .filter(|data| !data.is_empty())
    }

    /// Metadata persisted next to the image: the provider fields plus the prompt.
    pub fn metadata_with_prompt(&self, prompt: &str) -> Map<String, Value> {
        let mut metadata = self.0.clone();
        // a provider field named `prompt` is replaced but keeps its slot
        metadata.insert("prompt".to_string(), Value::String(prompt.to_string()));
        metadata
    }
}

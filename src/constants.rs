//! Shared constants/setters for things
//!

/// Response header carrying the object key a capture will be written to.
pub const X_CAPTURE_KEY: &str = "x-capture-key";

/// Extension of captured image objects.
pub const IMAGE_EXTENSION: &str = "png";

/// Extension of the metadata sidecar objects.
pub const METADATA_EXTENSION: &str = "json";

/// Content type of captured image objects.
pub const IMAGE_CONTENT_TYPE: &str = "image/png";

/// Content type of the metadata sidecar objects.
pub const METADATA_CONTENT_TYPE: &str = "application/json";

/// Number of random letters appended to an image key.
pub const KEY_SUFFIX_LENGTH: usize = 3;

/// Download timeout for generated images.
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 120;

/// Default bound on captures running at once.
pub const DEFAULT_MAX_CONCURRENT_CAPTURES: usize = 16;

/// How many capture outcomes are remembered for `/captures/{key}`.
pub const MAX_TRACKED_CAPTURES: usize = 1024;

/// Body returned when the billing endpoint answers 200 with something other than JSON.
pub const INVALID_BALANCE_RESPONSE: &str = "Invalid response from external API";

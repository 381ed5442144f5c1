//! Config handling

use std::path::Path;
use std::time::Duration;

use tracing::log::LevelFilter;
use tracing::{debug, warn};

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("opendal", LevelFilter::Warn);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Reads the provider API key from the first line of `path`.
///
/// A missing or unreadable file leaves the key unset, provider calls then fail
/// when they are made.
pub fn read_api_key(path: &Path) -> Option<String> {
    if !path.is_file() {
        debug!("No API key file at {}", path.display());
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => contents
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|key| !key.is_empty()),
        Err(err) => {
            warn!("Failed to read API key file {}: {}", path.display(), err);
            None
        }
    }
}

/// Settings for the image generation provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Base URL of the images API, without a trailing `/images/generations`.
    pub base_url: String,
    /// Bearer credential, `None` when no key file was found.
    pub api_key: Option<String>,
}

/// Settings for the S3-compatible bucket.
#[derive(Clone, Debug, Default)]
pub struct StorageConfig {
    /// Bucket name, persistence is disabled when unset.
    pub bucket: Option<String>,
    /// Region passed to the S3 signer.
    pub region: String,
    /// Custom endpoint URL, for S3-compatible services.
    pub endpoint: Option<String>,
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
}

/// Settings for the background capture pipeline.
#[derive(Clone, Copy, Debug)]
pub struct CaptureConfig {
    /// Timeout applied to each image download.
    pub fetch_timeout: Duration,
    /// Maximum captures running at once, `0` means unbounded.
    pub max_concurrent: usize,
}

/// Settings for the `/balance` pass-through.
#[derive(Clone, Debug)]
pub struct BalanceConfig {
    /// Upstream billing URL.
    pub url: String,
    /// Bearer token for the upstream.
    pub token: String,
}

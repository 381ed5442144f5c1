//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;

use crate::config::{BalanceConfig, CaptureConfig, ProviderConfig, StorageConfig};
use crate::constants::{DEFAULT_FETCH_TIMEOUT_SECONDS, DEFAULT_MAX_CONCURRENT_CAPTURES};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "DALLE_CAPTURE_DEBUG")]
    /// Enable debug logging. Env: DALLE_CAPTURE_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "5000", env = "DALLE_CAPTURE_PORT")]
    /// http listener, defaults to `5000`.
    /// Env: DALLE_CAPTURE_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "DALLE_CAPTURE_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: DALLE_CAPTURE_LISTEN_ADDRESS
    pub listen_address: String,
    #[clap(long, default_value = "./static", env = "DALLE_CAPTURE_STATIC_DIR")]
    /// Directory holding `index.html` and `inprogress.gif`.
    /// Env: DALLE_CAPTURE_STATIC_DIR
    pub static_dir: PathBuf,

    #[clap(long, default_value = "key", env = "DALLE_CAPTURE_API_KEY_FILE")]
    /// File whose first line is the provider API key.
    /// Env: DALLE_CAPTURE_API_KEY_FILE
    pub api_key_file: PathBuf,
    #[clap(
        long,
        default_value = "https://api.openai.com/v1",
        env = "DALLE_CAPTURE_PROVIDER_BASE_URL"
    )]
    /// Base URL of the images API.
    /// Env: DALLE_CAPTURE_PROVIDER_BASE_URL
    pub provider_base_url: String,

    #[clap(long, env = "S3_BUCKET_NAME")]
    /// Bucket the captured images are written to. Env: S3_BUCKET_NAME
    pub s3_bucket_name: Option<String>,
    #[clap(long, env = "S3_ACCESS_KEY_ID", hide_env_values = true)]
    /// Env: S3_ACCESS_KEY_ID
    pub s3_access_key_id: Option<String>,
    #[clap(long, env = "S3_SECRET_ACCESS_KEY", hide_env_values = true)]
    /// Env: S3_SECRET_ACCESS_KEY
    pub s3_secret_access_key: Option<String>,
    #[clap(long, env = "S3_ENDPOINT")]
    /// Custom endpoint for S3-compatible storage. Env: S3_ENDPOINT
    pub s3_endpoint: Option<String>,
    #[clap(long, default_value = "us-east-1", env = "S3_REGION")]
    /// Env: S3_REGION
    pub s3_region: String,

    #[clap(
        long,
        default_value_t = DEFAULT_FETCH_TIMEOUT_SECONDS,
        env = "DALLE_CAPTURE_FETCH_TIMEOUT_SECS"
    )]
    /// Timeout for downloading a generated image, in seconds.
    /// Env: DALLE_CAPTURE_FETCH_TIMEOUT_SECS
    pub fetch_timeout_secs: u64,
    #[clap(
        long,
        default_value_t = DEFAULT_MAX_CONCURRENT_CAPTURES,
        env = "DALLE_CAPTURE_MAX_CONCURRENT_CAPTURES"
    )]
    /// Upper bound on captures running at once, `0` for no limit.
    /// Env: DALLE_CAPTURE_MAX_CONCURRENT_CAPTURES
    pub max_concurrent_captures: usize,

    #[clap(long, default_value = "https://", env = "DALLE_CAPTURE_BALANCE_URL")]
    /// Billing endpoint proxied by `/balance`. Env: DALLE_CAPTURE_BALANCE_URL
    pub balance_url: String,
    #[clap(
        long,
        default_value = "",
        env = "DALLE_CAPTURE_BALANCE_TOKEN",
        hide_env_values = true
    )]
    /// Bearer token sent to the billing endpoint. Env: DALLE_CAPTURE_BALANCE_TOKEN
    pub balance_token: String,
}

impl CliOptions {
    /// Provider settings, reading the API key file if it exists.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            base_url: self.provider_base_url.clone(),
            api_key: crate::config::read_api_key(&self.api_key_file),
        }
    }

    /// Object storage settings.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            bucket: self.s3_bucket_name.clone(),
            region: self.s3_region.clone(),
            endpoint: self.s3_endpoint.clone(),
            access_key_id: self.s3_access_key_id.clone(),
            secret_access_key: self.s3_secret_access_key.clone(),
        }
    }

    /// Capture pipeline settings.
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            fetch_timeout: std::time::Duration::from_secs(self.fetch_timeout_secs),
            max_concurrent: self.max_concurrent_captures,
        }
    }

    /// Balance proxy settings.
    pub fn balance_config(&self) -> BalanceConfig {
        BalanceConfig {
            url: self.balance_url.clone(),
            token: self.balance_token.clone(),
        }
    }
}

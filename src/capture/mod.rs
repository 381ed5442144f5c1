//! Background capture of generated images into object storage.
//!
//! Every successful generation submits one [`CaptureJob`]. The job runs on its own
//! task, detached from the request that produced it: the client has its answer
//! before the download starts, and a failure is only ever logged and recorded in
//! the [`CaptureRegistry`].

use std::sync::Arc;

use axum::http::StatusCode;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

mod fetch;
pub mod keys;
mod registry;
mod task;

pub use fetch::RemoteFetcher;
pub use registry::{CaptureRegistry, CaptureStatus};
pub use task::{CaptureJob, CaptureSource};

use crate::config::CaptureConfig;
use crate::constants::MAX_TRACKED_CAPTURES;
use crate::storage::{BlobStore, StorageError};

/// Reasons a capture stops.
#[derive(Debug)]
pub enum CaptureError {
    /// The download failed or timed out.
    Fetch(reqwest::Error),
    /// The image host answered with a non-success status.
    Status(StatusCode),
    /// Inline image data was not valid base64.
    Decode(base64::DecodeError),
    /// Writing to the store failed.
    Storage(StorageError),
    /// The metadata could not be serialized.
    Serialize(serde_json::Error),
    /// The provider result has nothing to capture.
    InvalidSource(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "Failed to download image: {err}"),
            Self::Status(status) => write!(f, "Image download returned HTTP status {status}"),
            Self::Decode(err) => write!(f, "Failed to decode inline image: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "Failed to serialize metadata: {err}"),
            Self::InvalidSource(reason) => write!(f, "Nothing to capture: {reason}"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Spawns and tracks capture tasks.
///
/// With a concurrency limit, tasks beyond the limit wait for a slot before
/// downloading; submitting never waits either way.
#[derive(Clone)]
pub struct CaptureService {
    fetcher: RemoteFetcher,
    store: Arc<dyn BlobStore>,
    registry: CaptureRegistry,
    limit: Option<Arc<Semaphore>>,
    tasks: TaskTracker,
}

impl std::fmt::Debug for CaptureService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureService")
            .field("store", &self.store.location())
            .field("limit", &self.limit.as_ref().map(|s| s.available_permits()))
            .field("pending", &self.tasks.len())
            .finish()
    }
}

impl CaptureService {
    /// A service downloading with `client` and writing to `store`.
    pub fn new(client: reqwest::Client, store: Arc<dyn BlobStore>, config: CaptureConfig) -> Self {
        let limit = match config.max_concurrent {
            0 => None,
            permits => Some(Arc::new(Semaphore::new(permits))),
        };
        Self {
            fetcher: RemoteFetcher::new(client, config.fetch_timeout),
            store,
            registry: CaptureRegistry::new(MAX_TRACKED_CAPTURES),
            limit,
            tasks: TaskTracker::new(),
        }
    }

    /// Outcomes of recent captures.
    pub fn registry(&self) -> &CaptureRegistry {
        &self.registry
    }

    /// Starts `job` in the background and returns immediately.
    pub async fn submit(&self, job: CaptureJob) {
        self.registry.set(&job.key, CaptureStatus::Queued).await;
        debug!("Queued capture {}", job.key);
        let service = self.clone();
        self.tasks.spawn(async move { service.run(job).await });
    }

    async fn run(self, job: CaptureJob) {
        let _permit = match &self.limit {
            Some(limit) => match limit.acquire().await {
                Ok(permit) => Some(permit),
                Err(err) => {
                    error!("Capture {} dropped: {}", job.key, err);
                    return;
                }
            },
            None => None,
        };

        let key = job.key.clone();
        match job
            .run(&self.fetcher, self.store.as_ref(), &self.registry)
            .await
        {
            Ok(()) => {
                info!(
                    "File and metadata uploaded successfully to {}/{}",
                    self.store.location(),
                    key
                );
                self.registry.set(&key, CaptureStatus::Stored).await;
            }
            Err(err) => {
                error!("Capture {} failed: {}", key, err);
                self.registry
                    .set(
                        &key,
                        CaptureStatus::Failed {
                            error: err.to_string(),
                        },
                    )
                    .await;
            }
        }
    }

    /// Waits for every capture submitted so far to finish.
    pub async fn drain(&self) {
        self.tasks.close();
        if !self.tasks.is_empty() {
            info!("Waiting for {} capture(s) to finish", self.tasks.len());
        }
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneratedImage;
    use crate::test_support::{RecordingStore, serve};
    use axum::Router;
    use axum::routing::get;
    use serde_json::json;
    use std::time::Duration;

    fn service(store: RecordingStore, max_concurrent: usize) -> CaptureService {
        CaptureService::new(
            reqwest::Client::new(),
            Arc::new(store),
            CaptureConfig {
                fetch_timeout: Duration::from_secs(5),
                max_concurrent,
            },
        )
    }

    fn job(key: &str, url: String) -> CaptureJob {
        let image: GeneratedImage =
            serde_json::from_value(json!({ "url": url })).expect("generated image");
        CaptureJob::for_image(key.to_string(), &image, "a red cube").expect("job")
    }

    #[tokio::test]
    async fn completed_captures_are_recorded() {
        let addr = serve(Router::new().route("/a.png", get(|| async { "png" }))).await;
        let store = RecordingStore::default();
        let captures = service(store.clone(), 2);

        captures
            .submit(job("one.png", format!("http://{addr}/a.png")))
            .await;
        captures
            .submit(job("two.png", format!("http://{addr}/a.png")))
            .await;
        captures.drain().await;

        assert_eq!(captures.registry().get("one.png").await, Some(CaptureStatus::Stored));
        assert_eq!(captures.registry().get("two.png").await, Some(CaptureStatus::Stored));
        let mut keys: Vec<String> = store.writes().into_iter().map(|w| w.key).collect();
        keys.sort();
        assert_eq!(keys, ["one.json", "one.png", "two.json", "two.png"]);
    }

    #[tokio::test]
    async fn failures_are_recorded_not_raised() {
        let addr = serve(Router::new().route(
            "/a.png",
            get(|| async { StatusCode::NOT_FOUND }),
        ))
        .await;
        let store = RecordingStore::default();
        let captures = service(store.clone(), 0);

        captures
            .submit(job("missing.png", format!("http://{addr}/a.png")))
            .await;
        captures.drain().await;

        let status = captures.registry().get("missing.png").await;
        assert!(matches!(status, Some(CaptureStatus::Failed { ref error }) if error.contains("404")));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn submit_returns_before_the_capture_runs() {
        let addr = serve(Router::new().route(
            "/slow.png",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "png"
            }),
        ))
        .await;
        let store = RecordingStore::default();
        let captures = service(store.clone(), 1);

        captures
            .submit(job("slow.png", format!("http://{addr}/slow.png")))
            .await;
        assert!(store.writes().is_empty());

        captures.drain().await;
        assert_eq!(store.writes().len(), 2);
    }
}

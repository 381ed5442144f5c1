//! Downloads generated images into memory.

use std::time::Duration;

use tracing::debug;
use url::Url;

use super::CaptureError;

/// Streams a remote body into a buffer, giving up after a fixed timeout.
#[derive(Clone, Debug)]
pub struct RemoteFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteFetcher {
    /// A fetcher sharing `client`, each download is bounded by `timeout`.
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Downloads `url` and returns the whole body.
    ///
    /// A non-success status is an error and no body is read.
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>, CaptureError> {
        let mut resp = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(CaptureError::Fetch)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CaptureError::Status(status));
        }

        let mut buffer = Vec::with_capacity(
            resp.content_length()
                .and_then(|len| usize::try_from(len).ok())
                .unwrap_or_default(),
        );
        while let Some(chunk) = resp.chunk().await.map_err(CaptureError::Fetch)? {
            // keep-alive chunks
            if chunk.is_empty() {
                continue;
            }
            buffer.extend_from_slice(&chunk);
        }
        debug!("Fetched {} bytes from {}", buffer.len(), url.host_str().unwrap_or_default());
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::Router;
    use axum::body::{Body, Bytes};
    use axum::http::StatusCode;
    use axum::routing::get;

    fn fetcher(timeout: Duration) -> RemoteFetcher {
        RemoteFetcher::new(reqwest::Client::new(), timeout)
    }

    #[tokio::test]
    async fn buffers_the_whole_body() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
        let body = payload.clone();
        let addr = serve(Router::new().route("/image.png", get(move || async move { body })))
            .await;

        let url = Url::parse(&format!("http://{addr}/image.png")).expect("url");
        let fetched = fetcher(Duration::from_secs(5))
            .fetch(&url)
            .await
            .expect("fetch");
        assert_eq!(fetched, payload);
    }

    #[tokio::test]
    async fn empty_chunks_are_skipped() {
        let addr = serve(Router::new().route(
            "/chunked.png",
            get(|| async {
                let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                    Ok(Bytes::from_static(b"\x89PNG")),
                    Ok(Bytes::new()),
                    Ok(Bytes::from_static(b" body")),
                    Ok(Bytes::new()),
                ];
                Body::from_stream(futures::stream::iter(chunks))
            }),
        ))
        .await;

        let url = Url::parse(&format!("http://{addr}/chunked.png")).expect("url");
        let fetched = fetcher(Duration::from_secs(5))
            .fetch(&url)
            .await
            .expect("fetch");
        assert_eq!(fetched, b"\x89PNG body");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let addr = serve(Router::new().route(
            "/gone.png",
            get(|| async { (StatusCode::NOT_FOUND, "expired") }),
        ))
        .await;

        let url = Url::parse(&format!("http://{addr}/gone.png")).expect("url");
        let err = fetcher(Duration::from_secs(5))
            .fetch(&url)
            .await
            .expect_err("404");
        assert!(matches!(err, CaptureError::Status(status) if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn slow_hosts_time_out() {
        let addr = serve(Router::new().route(
            "/slow.png",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        ))
        .await;

        let url = Url::parse(&format!("http://{addr}/slow.png")).expect("url");
        let err = fetcher(Duration::from_millis(100))
            .fetch(&url)
            .await
            .expect_err("timeout");
        assert!(matches!(err, CaptureError::Fetch(ref inner) if inner.is_timeout()));
    }
}

//! Helpers shared by the unit tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use crate::storage::{BlobStore, StorageError};

/// Serves `router` on an ephemeral localhost port.
pub(crate) async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

#[derive(Clone, Debug)]
pub(crate) struct Write {
    pub(crate) key: String,
    pub(crate) data: Vec<u8>,
    pub(crate) content_type: String,
}

/// Store that keeps writes in memory, in the order they were issued.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingStore {
    writes: Arc<Mutex<Vec<Write>>>,
    attempted: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingStore {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn writes(&self) -> Vec<Write> {
        self.writes.lock().expect("writes lock").clone()
    }

    pub(crate) fn attempted(&self) -> Vec<String> {
        self.attempted.lock().expect("attempted lock").clone()
    }
}

#[async_trait]
impl BlobStore for RecordingStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        self.attempted
            .lock()
            .expect("attempted lock")
            .push(key.to_string());
        if self.fail {
            return Err(StorageError::Init("recording store set to fail".to_string()));
        }
        self.writes.lock().expect("writes lock").push(Write {
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    fn location(&self) -> &str {
        "recording"
    }
}

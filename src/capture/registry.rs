//! Remembers how recent captures ended, for `/captures/{key}`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

/// Where a capture is in its life.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CaptureStatus {
    /// Submitted, waiting for a free slot.
    Queued,
    /// Downloading the generated image.
    Fetching,
    /// Writing the image and its metadata.
    Storing,
    /// Both objects were written.
    Stored,
    /// The capture stopped; nothing more will happen to it.
    Failed {
        /// Why it stopped.
        error: String,
    },
}

#[derive(Debug)]
struct Entries {
    statuses: HashMap<String, CaptureStatus>,
    order: VecDeque<String>,
    capacity: usize,
}

/// Bounded map of capture key to status, the oldest keys are forgotten first.
#[derive(Clone, Debug)]
pub struct CaptureRegistry {
    entries: Arc<RwLock<Entries>>,
}

impl CaptureRegistry {
    /// A registry remembering at most `capacity` captures.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries {
                statuses: HashMap::new(),
                order: VecDeque::new(),
                capacity: capacity.max(1),
            })),
        }
    }

    /// Records the current status of `key`.
    pub async fn set(&self, key: &str, status: CaptureStatus) {
        let mut entries = self.entries.write().await;
        if entries.statuses.insert(key.to_string(), status).is_none() {
            entries.order.push_back(key.to_string());
        }
        while entries.order.len() > entries.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.statuses.remove(&oldest);
            }
        }
    }

    /// Last recorded status of `key`, if it is still remembered.
    pub async fn get(&self, key: &str) -> Option<CaptureStatus> {
        self.entries.read().await.statuses.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn updates_keep_a_single_entry() {
        let registry = CaptureRegistry::new(4);
        registry.set("a.png", CaptureStatus::Queued).await;
        registry.set("a.png", CaptureStatus::Stored).await;

        assert_eq!(registry.get("a.png").await, Some(CaptureStatus::Stored));
        assert_eq!(registry.entries.read().await.order.len(), 1);
    }

    #[tokio::test]
    async fn oldest_entries_are_evicted() {
        let registry = CaptureRegistry::new(2);
        registry.set("a.png", CaptureStatus::Stored).await;
        registry.set("b.png", CaptureStatus::Stored).await;
        registry.set("c.png", CaptureStatus::Queued).await;

        assert_eq!(registry.get("a.png").await, None);
        assert_eq!(registry.get("b.png").await, Some(CaptureStatus::Stored));
        assert_eq!(registry.get("c.png").await, Some(CaptureStatus::Queued));
    }

    #[test]
    fn failed_status_serializes_with_error() {
        let value = serde_json::to_value(CaptureStatus::Failed {
            error: "HTTP status 404 Not Found".to_string(),
        })
        .expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"status": "failed", "error": "HTTP status 404 Not Found"})
        );
    }
}

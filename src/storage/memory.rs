//! In-memory snapshot store (no persistence)
//!
//! Keeps the snapshot for the lifetime of the process only. Used by tests and
//! by callers that run ticks without a snapshot file.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::SnapshotStore;
use super::error::StorageResult;
use crate::snapshot::Snapshot;

#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RwLock<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously saved snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
        }
    }

    pub async fn current(&self) -> Option<Snapshot> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> StorageResult<Option<Snapshot>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        debug!("storing snapshot from {} in memory", snapshot.timestamp);
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

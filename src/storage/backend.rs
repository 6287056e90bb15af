//! Storage backend trait definition

use async_trait::async_trait;

use super::error::StorageResult;
use crate::snapshot::Snapshot;

/// Trait for snapshot stores
///
/// A store holds at most one snapshot: `save` replaces whatever was there.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` so the tick can hold them behind a
/// trait object across await points.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot
    ///
    /// A store that has never been written returns `Ok(None)`; that is the
    /// first-run case, not an error.
    async fn load(&self) -> StorageResult<Option<Snapshot>>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &Snapshot) -> StorageResult<()>;

    /// Where the snapshot lives, for log messages.
    fn describe(&self) -> String;
}

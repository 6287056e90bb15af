//! JSON file snapshot store
//!
//! Writes go to a sibling temporary file first and are renamed into place,
//! so readers never observe a half-written snapshot.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::backend::SnapshotStore;
use super::error::StorageResult;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> StorageResult<Option<Snapshot>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no previous snapshot");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_str(&content)?;
        debug!("loaded snapshot from {}", snapshot.timestamp);
        Ok(Some(snapshot))
    }

    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    async fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(snapshot)?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, content).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                warn!("could not remove {}: {cleanup}", temp.display());
            }
            return Err(e.into());
        }

        debug!("snapshot saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

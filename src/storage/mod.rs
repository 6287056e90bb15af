//! Snapshot persistence
//!
//! The tick only needs two operations from storage: load the previous
//! snapshot and replace it with the new one. Only the most recent snapshot is
//! ever kept; there is no history.
//!
//! ## Backends
//!
//! - **JSON file** (default): the snapshot file shared with other consumers
//! - **In-memory**: for tests and dry runs
//!
//! ## Usage
//!
//! ```no_run
//! use macro_pulse::storage::{SnapshotStore, json::JsonFileStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = JsonFileStore::new("./dashboard_data.json");
//!     let previous = store.load().await?;
//!     println!("previous snapshot present: {}", previous.is_some());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod json;
pub mod memory;

pub use backend::SnapshotStore;
pub use error::{StorageError, StorageResult};

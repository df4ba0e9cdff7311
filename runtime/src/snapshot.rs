//! Snapshot persistence for the booking state.
//!
//! The whole state is serialized to durable client-local storage after every
//! applied mutation and read back once at session start, so a page reload
//! does not lose the cart. Writes happen inside the store's mutation path,
//! after the in-memory change and before publication; an abrupt crash may
//! lose the very last mutation, which is the accepted failure envelope.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed namespace key for the persisted record.
///
/// Any future schema change that adds fields must keep old snapshots
/// readable by treating missing fields as defaults, not as parse errors.
pub const SNAPSHOT_NAMESPACE: &str = "tourbook.booking-state.v1";

/// Errors from snapshot reads and writes.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Reading or writing the backing storage failed
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The snapshot could not be serialized or parsed
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage seam for a store's state.
///
/// `load` is called once at session start; `save` after every applied
/// mutation, synchronously inside the mutation's critical section (the store
/// has no suspension points, so the seam is synchronous too).
pub trait SnapshotStore<S>: Send + Sync {
    /// Reads the persisted state, `None` when nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the storage is unreadable or the
    /// record does not parse.
    fn load(&self) -> Result<Option<S>, SnapshotError>;

    /// Writes the full state, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when serialization or the write fails.
    fn save(&self, state: &S) -> Result<(), SnapshotError>;
}

/// File-backed snapshot storage, one JSON document per namespace.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a torn record behind.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Uses an explicit file path as the backing storage
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stores the record under [`SNAPSHOT_NAMESPACE`] in the given directory
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SNAPSHOT_NAMESPACE}.json")),
        }
    }

    /// The backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<S> SnapshotStore<S> for FileSnapshotStore
where
    S: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<S>, SnapshotError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => {
                tracing::debug!(path = %self.path.display(), "loaded snapshot");
                Ok(Some(serde_json::from_str(&json)?))
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, state: &S) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::trace!(path = %self.path.display(), "wrote snapshot");
        Ok(())
    }
}

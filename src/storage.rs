use crate::error::StorageError;
use crate::model::Event;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the persisted event list inside the data directory.
pub const EVENTS_FILE: &str = "events.json";

/// Load/save capability the event store persists through.
///
/// `load` returns `Ok(None)` when nothing has been stored yet. `save` always
/// receives the complete event set.
pub trait Storage {
    fn load(&self) -> Result<Option<Vec<Event>>, StorageError>;
    fn save(&mut self, events: &[Event]) -> Result<(), StorageError>;
}

fn decode(text: &str) -> Result<Option<Vec<Event>>, StorageError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(StorageError::Malformed)
}

fn encode(events: &[Event]) -> Result<String, StorageError> {
    serde_json::to_string_pretty(events).map_err(StorageError::Serialize)
}

/// JSON file backend: `events.json` in the data directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(EVENTS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
        path: P,
        contents: C,
    ) -> Result<(), StorageError> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Runs `f` while holding an exclusive advisory lock on `<path>.lock`.
    pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T, StorageError>
    where
        F: FnOnce() -> Result<T, StorageError>,
    {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path.with_extension("lock"))?;
        FileExt::lock_exclusive(&lock_file)?;
        // The lock is released when `lock_file` is dropped.
        f()
    }
}

impl Storage for LocalStorage {
    fn load(&self) -> Result<Option<Vec<Event>>, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no stored events yet");
            return Ok(None);
        }
        Self::with_lock(&self.path, || {
            let json = fs::read_to_string(&self.path)?;
            decode(&json)
        })
    }

    fn save(&mut self, events: &[Event]) -> Result<(), StorageError> {
        let json = encode(events)?;
        Self::with_lock(&self.path, || Self::atomic_write(&self.path, &json))?;
        debug!(path = %self.path.display(), count = events.len(), "saved events");
        Ok(())
    }
}

/// In-memory backend holding the last saved JSON text.
///
/// Can be seeded with arbitrary text and told to fail saves, which is how
/// tests simulate corrupt storage and an exceeded quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Option<String>,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            ..Self::default()
        }
    }

    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<Event>>, StorageError> {
        match &self.contents {
            Some(text) => decode(text),
            None => Ok(None),
        }
    }

    fn save(&mut self, events: &[Event]) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.contents = Some(encode(events)?);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_counts_as_nothing_stored() {
        assert!(MemoryStorage::new().load().unwrap().is_none());
        assert!(MemoryStorage::with_contents("  \n").load().unwrap().is_none());
    }

    #[test]
    fn garbage_is_malformed() {
        let storage = MemoryStorage::with_contents("{not json");
        assert!(matches!(storage.load(), Err(StorageError::Malformed(_))));

        let wrong_shape = MemoryStorage::with_contents(r#"{"events": []}"#);
        assert!(matches!(wrong_shape.load(), Err(StorageError::Malformed(_))));
    }

    #[test]
    fn failing_saves_keep_previous_contents() {
        let mut storage = MemoryStorage::with_contents("[]");
        storage.set_fail_saves(true);
        assert!(matches!(
            storage.save(&[]),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(storage.contents(), Some("[]"));
        assert_eq!(storage.save_count(), 0);
    }
}

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// SlotError
///
/// Failures of the durable key-value slot. Under normal conditions none of these occur.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    /// The key sanitizes to nothing (e.g. `".."` or `"/"`).
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),

    #[error("durable slot I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// Simulated or environmental refusal to persist.
    #[error("durable slot unavailable: {0}")]
    Unavailable(String),
}

// 1. DurableSlot Contract
/// DurableSlot
///
/// A named storage location outside process memory. The session store is its only writer.
/// All operations are synchronous: the session core never suspends.
///
/// The trait lets the store run against a directory on disk (`FileSlot`) in the service
/// and against an in-memory map (`MemorySlot`) in tests without any change to the store.
pub trait DurableSlot: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Replaces the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), SlotError>;

    /// Deletes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), SlotError>;
}

/// sanitize_key
///
/// Flattens a caller-supplied key into a single file name. Directory navigation
/// components (`..`, `.`) and separators are dropped so a key can never escape the
/// slot directory.
fn sanitize_key(key: &str) -> Option<String> {
    let flat = key
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("_");

    (!flat.is_empty()).then_some(flat)
}

// 2. The Real Implementation (directory on disk)
/// FileSlot
///
/// Stores each key as `<dir>/<key>.json`. The directory is created on first write.
/// Writes go to a temporary sibling first and are renamed into place, so a crash
/// mid-write leaves either the old record or the new one.
#[derive(Clone, Debug)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SlotError> {
        let name = sanitize_key(key).ok_or_else(|| SlotError::InvalidKey(key.to_string()))?;
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl DurableSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SlotError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let path = self.path_for(key)?;
        let io_err = |source| SlotError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(io_err)?;
        fs::rename(&staging, &path).map_err(io_err)?;

        tracing::trace!(path = %path.display(), "durable slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SlotError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MemorySlot
///
/// In-memory `DurableSlot` for tests. It can be pre-populated to simulate a restart and
/// can be told to refuse writes and removals to exercise the store's rollback path.
#[derive(Default)]
pub struct MemorySlot {
    entries: Mutex<HashMap<String, String>>,
    /// When true, all writes and removals return a simulated failure. Reads still succeed
    /// so a pre-populated slot can be restored from.
    pub should_fail: bool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            entries: Mutex::default(),
            should_fail: true,
        }
    }

    /// Starts with `value` already stored under `key`.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let slot = Self::new();
        slot.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        slot
    }

    /// Turns on simulated failures, keeping any entries already stored.
    pub fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn simulate_failure(&self) -> Result<(), SlotError> {
        if self.should_fail {
            return Err(SlotError::Unavailable(
                "Mock Slot Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

impl DurableSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        self.simulate_failure()?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        self.simulate_failure()?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// SlotState
///
/// The concrete type used to share the durable slot with the session store.
pub type SlotState = Arc<dyn DurableSlot>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_key_strips_navigation() {
        assert_eq!(sanitize_key("rb_user").as_deref(), Some("rb_user"));
        assert_eq!(sanitize_key("../../etc/passwd").as_deref(), Some("etc_passwd"));
        assert_eq!(sanitize_key("./a//b").as_deref(), Some("a_b"));
        assert_eq!(sanitize_key(".."), None);
        assert_eq!(sanitize_key("/"), None);
    }

    #[test]
    fn file_slot_rejects_empty_keys() {
        let slot = FileSlot::new(std::env::temp_dir());
        assert!(matches!(slot.read(".."), Err(SlotError::InvalidKey(_))));
    }

    #[test]
    fn memory_slot_failing_write_leaves_entries_untouched() {
        let slot = MemorySlot::new_failing();
        assert!(slot.write("k", "v").is_err());
        assert!(!slot.contains("k"));
    }

    #[test]
    fn memory_slot_failing_remove_keeps_entry() {
        let slot = MemorySlot::with_entry("k", "v").failing();
        assert!(matches!(slot.remove("k"), Err(SlotError::Unavailable(_))));
        assert!(slot.contains("k"));
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("v"));
    }
}

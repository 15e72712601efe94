//! Where the encrypted session blob lives.
//!
//! A remembered login goes to a persistent file that expires after days
//! (the "cookie"); a plain login goes to a session-scoped file that expires
//! after hours.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// Storage slot for one encrypted session blob.
pub trait SessionStore: Send + Sync {
    /// Stored blob, if any and not expired.
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, blob: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredBlob {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// Blob kept in a file, optionally expiring.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lifetime: Option<TimeDelta>,
}

impl FileStore {
    /// Persistent store whose entries expire after `days`.
    pub fn persistent(path: impl Into<PathBuf>, days: u32) -> Self {
        Self {
            path: path.into(),
            lifetime: Some(TimeDelta::days(i64::from(days))),
        }
    }

    /// Session-scoped store whose entries expire after `hours`.
    pub fn session(path: impl Into<PathBuf>, hours: u32) -> Self {
        Self {
            path: path.into(),
            lifetime: Some(TimeDelta::hours(i64::from(hours))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_at(&self, now: DateTime<Utc>) -> Result<Option<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredBlob = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Discarding unreadable session file {:?}: {e}", self.path);
                self.clear()?;
                return Ok(None);
            }
        };

        if let Some(expires_at) = stored.expires_at
            && expires_at <= now
        {
            debug!("Session in {:?} expired at {expires_at}", self.path);
            self.clear()?;
            return Ok(None);
        }
        Ok(Some(stored.value))
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        self.read_at(Utc::now())
    }

    fn save(&self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredBlob {
            value: blob.to_string(),
            expires_at: self.lifetime.map(|lifetime| Utc::now() + lifetime),
        };
        std::fs::write(&self.path, serde_json::to_string(&stored)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store; gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        let slot = self.slot.lock().map_err(|_| AppError::session("session store poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, blob: &str) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| AppError::session("session store poisoned"))?;
        *slot = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| AppError::session("session store poisoned"))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::persistent(dir.path().join("session").join("auth.json"), 7);

        assert_eq!(store.load().unwrap(), None);
        store.save("blob-1").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("blob-1"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_persistent_entry_expires() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::persistent(dir.path().join("auth.json"), 7);
        store.save("blob").unwrap();

        let in_six_days = Utc::now() + TimeDelta::days(6);
        assert_eq!(store.read_at(in_six_days).unwrap().as_deref(), Some("blob"));

        let in_eight_days = Utc::now() + TimeDelta::days(8);
        assert_eq!(store.read_at(in_eight_days).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_session_entry_expires_before_remembered_one() {
        let dir = tempfile::tempdir().unwrap();
        let remembered = FileStore::persistent(dir.path().join("data").join("session.json"), 7);
        let plain = FileStore::session(dir.path().join("run").join("session.json"), 12);
        remembered.save("remembered").unwrap();
        plain.save("plain").unwrap();

        let in_one_hour = Utc::now() + TimeDelta::hours(1);
        assert_eq!(plain.read_at(in_one_hour).unwrap().as_deref(), Some("plain"));

        let next_day = Utc::now() + TimeDelta::days(1);
        assert_eq!(plain.read_at(next_day).unwrap(), None);
        assert!(!plain.path().exists());
        assert_eq!(remembered.read_at(next_day).unwrap().as_deref(), Some("remembered"));
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::session(&path, 12);
        assert_eq!(store.load().unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("x").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("x"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}

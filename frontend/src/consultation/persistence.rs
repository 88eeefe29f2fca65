#[cfg(test)]
use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;
use web_sys::{window, Storage};

use crate::consultation::errors::PersistenceError;
use crate::consultation::session::Snapshot;

/// Save/restore of form progress. Implementations swallow their own
/// failures; callers never see a storage error.
pub trait PersistenceAdapter {
    fn save(&self, key: &str, value: &Snapshot);
    fn load(&self, key: &str) -> Option<Snapshot>;
    fn clear(&self, key: &str);
}

/// Browser localStorage, degrading to a no-op when storage is unavailable
/// (private browsing, disabled cookies, quota errors).
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStoragePersistence;

impl LocalStoragePersistence {
    fn storage() -> Result<Storage, PersistenceError> {
        window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PersistenceError::Unavailable)
    }

    fn try_save(key: &str, value: &Snapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(value)?;
        Self::storage()?
            .set_item(key, &json)
            .map_err(|e| PersistenceError::Write(format!("{:?}", e)))
    }

    fn try_load(key: &str) -> Result<Option<Snapshot>, PersistenceError> {
        let raw = Self::storage()?.get_item(key).ok().flatten();
        match raw {
            Some(json) => Ok(Some(decode_snapshot(&json)?)),
            None => Ok(None),
        }
    }

    fn try_clear(key: &str) -> Result<(), PersistenceError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| PersistenceError::Write(format!("{:?}", e)))
    }
}

impl PersistenceAdapter for LocalStoragePersistence {
    fn save(&self, key: &str, value: &Snapshot) {
        if let Err(e) = Self::try_save(key, value) {
            warn!("Could not save form progress: {}", e);
        }
    }

    fn load(&self, key: &str) -> Option<Snapshot> {
        Self::try_load(key).unwrap_or_else(|e| {
            warn!("Could not load form progress: {}", e);
            None
        })
    }

    fn clear(&self, key: &str) {
        if let Err(e) = Self::try_clear(key) {
            warn!("Could not clear form progress: {}", e);
        }
    }
}

/// Older builds stored raw form entries; anything that is not a string is dropped.
pub fn decode_snapshot(json: &str) -> Result<Snapshot, PersistenceError> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some((key, s)),
            serde_json::Value::Bool(true) => Some((key, "on".to_string())),
            _ => None,
        })
        .collect())
}

/// In-memory store for controller tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    entries: RefCell<HashMap<String, Snapshot>>,
}

#[cfg(test)]
impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(key: &str, snapshot: Snapshot) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().insert(key.to_string(), snapshot);
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

#[cfg(test)]
impl PersistenceAdapter for MemoryPersistence {
    fn save(&self, key: &str, value: &Snapshot) {
        self.entries.borrow_mut().insert(key.to_string(), value.clone());
    }

    fn load(&self, key: &str) -> Option<Snapshot> {
        self.entries.borrow().get(key).cloned()
    }

    fn clear(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_snapshot_keeps_strings_only() {
        let snapshot = decode_snapshot(r#"{"name":"Ana","newsletter":true,"count":3,"x":null}"#).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("name").map(String::as_str), Some("Ana"));
        assert_eq!(snapshot.get("newsletter").map(String::as_str), Some("on"));
    }

    #[test]
    fn test_decode_snapshot_rejects_garbage() {
        assert!(matches!(decode_snapshot("not json"), Err(PersistenceError::Serde(_))));
    }

    #[test]
    fn test_memory_round_trip_and_clear() {
        let store = MemoryPersistence::new();
        let mut snapshot = Snapshot::new();
        snapshot.insert("email".into(), "ana@x.com".into());

        store.save("k", &snapshot);
        assert_eq!(store.load("k"), Some(snapshot));
        store.clear("k");
        assert_eq!(store.load("k"), None);
        assert!(!store.contains("k"));
    }
}

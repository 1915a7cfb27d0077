use crate::error::{RegistryError, Result};
use crate::id::{CanonicalId, RefType, Subsystem};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedRegistry {
    /// Legacy reference text → canonical ID
    entries: BTreeMap<String, CanonicalId>,
}

/// Durable legacy→canonical mapping, constructed once per run, mutated in
/// memory, and flushed on a controlled schedule.
///
/// Entries are never deleted; the mapping is consulted before issuing a new
/// ID so the same legacy string can never receive two IDs. Sequence counters
/// are derived from the loaded entries, so numbers issued in earlier runs are
/// never reused.
pub struct RegistryStore {
    path: PathBuf,
    entries: BTreeMap<String, CanonicalId>,
    next_sequence: HashMap<(RefType, Subsystem), u32>,
    dirty: bool,
}

impl RegistryStore {
    /// Load the mapping file; absence is not fatal — starts empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let bytes = fs::read(&path)?;
            let persisted: PersistedRegistry = serde_json::from_slice(&bytes)?;
            log::info!(
                "Loaded reference registry with {} entries",
                persisted.entries.len()
            );
            persisted.entries
        } else {
            log::info!("No registry at {}, starting empty", path.display());
            BTreeMap::new()
        };

        let mut next_sequence: HashMap<(RefType, Subsystem), u32> = HashMap::new();
        for id in entries.values() {
            let slot = next_sequence
                .entry((id.ref_type, id.subsystem))
                .or_insert(1);
            *slot = (*slot).max(id.sequence + 1);
        }

        Ok(Self {
            path,
            entries,
            next_sequence,
            dirty: false,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, legacy: &str) -> Option<CanonicalId> {
        self.entries.get(legacy.trim()).copied()
    }

    /// Resolve a legacy string to its canonical ID, issuing a new one if the
    /// string was never seen. The registered mapping always wins over fresh
    /// inference.
    pub fn assign(&mut self, legacy: &str, ref_type: RefType, subsystem: Subsystem) -> CanonicalId {
        let key = legacy.trim().to_string();
        if let Some(existing) = self.entries.get(&key) {
            return *existing;
        }

        let slot = self.next_sequence.entry((ref_type, subsystem)).or_insert(1);
        let id = CanonicalId::new(ref_type, subsystem, *slot);
        *slot += 1;

        log::debug!("Issued {id} for legacy reference {key:?}");
        self.entries.insert(key, id);
        self.dirty = true;
        id
    }

    /// Persist atomically: serialize to a sibling temp file, then rename.
    /// A failure mid-write cannot erase previously flushed entries.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let persisted = PersistedRegistry {
            entries: self.entries.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)
            .map_err(|e| RegistryError::Persist(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| RegistryError::Persist(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| RegistryError::Persist(e.to_string()))?;

        log::debug!(
            "Flushed registry ({} entries) to {}",
            self.entries.len(),
            self.path.display()
        );
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn absent_file_starts_empty() {
        let temp = tempdir().unwrap();
        let store = RegistryStore::load(temp.path().join("registry.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn assign_reuses_existing_entries() {
        let temp = tempdir().unwrap();
        let mut store = RegistryStore::load(temp.path().join("registry.json")).unwrap();

        let first = store.assign("ETHIK module", RefType::Doc, Subsystem::Ethik);
        let second = store.assign("ETHIK module", RefType::Doc, Subsystem::Ethik);
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn distinct_legacy_strings_get_distinct_sequences() {
        let temp = tempdir().unwrap();
        let mut store = RegistryStore::load(temp.path().join("registry.json")).unwrap();

        let a = store.assign("ETHIK module", RefType::Doc, Subsystem::Ethik);
        let b = store.assign("ETHIK validator", RefType::Doc, Subsystem::Ethik);
        assert_ne!(a.sequence, b.sequence);
        assert_eq!(a.to_string(), "EGOS-DOC-ETHIK-0001");
        assert_eq!(b.to_string(), "EGOS-DOC-ETHIK-0002");
    }

    #[test]
    fn sequences_are_independent_per_pair() {
        let temp = tempdir().unwrap();
        let mut store = RegistryStore::load(temp.path().join("registry.json")).unwrap();

        let doc = store.assign("ETHIK doc", RefType::Doc, Subsystem::Ethik);
        let code = store.assign("ETHIK code", RefType::Code, Subsystem::Ethik);
        assert_eq!(doc.sequence, 1);
        assert_eq!(code.sequence, 1);
    }

    #[test]
    fn flush_and_reload_preserve_issuance() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("registry.json");

        let first = {
            let mut store = RegistryStore::load(&path).unwrap();
            let id = store.assign("ETHIK module", RefType::Doc, Subsystem::Ethik);
            store.flush().unwrap();
            id
        };

        let mut reloaded = RegistryStore::load(&path).unwrap();
        assert_eq!(reloaded.get("ETHIK module"), Some(first));

        // Counters continue past the persisted maximum
        let next = reloaded.assign("ETHIK other", RefType::Doc, Subsystem::Ethik);
        assert_eq!(next.sequence, first.sequence + 1);
    }

    #[test]
    fn flush_without_changes_is_a_no_op() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("registry.json");
        let mut store = RegistryStore::load(&path).unwrap();

        store.flush().unwrap();
        assert!(!path.exists());
    }
}

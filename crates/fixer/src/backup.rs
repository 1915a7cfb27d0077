use crate::error::{FixerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Record of one pre-mutation snapshot. Backups are never auto-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub run_timestamp: String,
}

/// Snapshots files under `<backup_root>/<run_timestamp>/<relative_path>`
/// before their first mutation in a run. A file is backed up at most once per
/// run, and the copy is verified complete before the caller may open the
/// original for writing.
pub struct BackupManager {
    backup_root: PathBuf,
    run_timestamp: String,
    done: HashSet<PathBuf>,
    records: Vec<BackupRecord>,
}

impl BackupManager {
    pub fn new(backup_root: impl AsRef<Path>, run_timestamp: impl Into<String>) -> Self {
        Self {
            backup_root: backup_root.as_ref().to_path_buf(),
            run_timestamp: run_timestamp.into(),
            done: HashSet::new(),
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[BackupRecord] {
        &self.records
    }

    /// Snapshot `original` (located at `relative_path` under the corpus root)
    /// unless already done this run. Returns the record of the copy made, or
    /// `None` when the file was backed up earlier in the run.
    pub fn ensure_backup(
        &mut self,
        original: &Path,
        relative_path: &Path,
    ) -> Result<Option<BackupRecord>> {
        if self.done.contains(original) {
            return Ok(None);
        }

        let backup_path = self
            .backup_root
            .join(&self.run_timestamp)
            .join(relative_path);
        if let Some(parent) = backup_path.parent() {
            fs::create_dir_all(parent).map_err(|e| FixerError::BackupFailed {
                original: original.to_path_buf(),
                reason: format!("creating {}: {e}", parent.display()),
            })?;
        }

        let copied = fs::copy(original, &backup_path).map_err(|e| FixerError::BackupFailed {
            original: original.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Verify the copy is complete before anyone writes to the original
        let original_len = fs::metadata(original)
            .map_err(|e| FixerError::BackupFailed {
                original: original.to_path_buf(),
                reason: e.to_string(),
            })?
            .len();
        if copied != original_len {
            return Err(FixerError::BackupFailed {
                original: original.to_path_buf(),
                reason: format!("incomplete copy: {copied} of {original_len} bytes"),
            });
        }

        log::debug!(
            "Backed up {} to {}",
            original.display(),
            backup_path.display()
        );

        self.done.insert(original.to_path_buf());
        let record = BackupRecord {
            original_path: original.to_path_buf(),
            backup_path,
            run_timestamp: self.run_timestamp.clone(),
        };
        self.records.push(record.clone());
        Ok(Some(record))
    }
}

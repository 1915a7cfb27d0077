use crate::backup::BackupManager;
use crate::edit::{apply_edits, Edit};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use xref_indexer::CorpusFile;
use xref_validator::{ResolutionStatus, ResolvedReference};

/// Terminal operating modes. Validation always runs first and is read-only;
/// only `Live` ever writes, and it requires explicit opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixMode {
    ReportOnly,
    DryRun,
    Live,
}

/// One replacement the fixer intends to (or did) make.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedFix {
    pub old_target: String,
    pub new_target: String,
    pub start: usize,
    pub end: usize,
}

/// Per-file fixing outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFixOutcome {
    pub relative_path: PathBuf,
    pub planned: Vec<PlannedFix>,

    /// True when the rewrite was written back (Live mode only)
    pub applied: bool,

    /// Invalid targets with no suggestion, left untouched for manual review
    pub needs_attention: Vec<String>,

    /// Backup or write failure; the original is left unchanged
    pub error: Option<String>,
}

/// Rewrites invalid references in place, one file at a time.
///
/// For each file all edits are computed first, then applied back-to-front over
/// a stable copy in a single pass, then written back in one write. The backup
/// manager snapshots the file before the write.
pub struct Fixer {
    mode: FixMode,
    backups: BackupManager,
}

impl Fixer {
    pub fn new(mode: FixMode, backups: BackupManager) -> Self {
        Self { mode, backups }
    }

    /// Plan and (in Live mode) apply fixes for one file's references.
    /// `content` must be the exact text the references were extracted from.
    pub fn fix_file(
        &mut self,
        file: &CorpusFile,
        content: &str,
        refs: &[ResolvedReference],
    ) -> FileFixOutcome {
        let mut outcome = FileFixOutcome {
            relative_path: file.relative_path.clone(),
            planned: Vec::new(),
            applied: false,
            needs_attention: Vec::new(),
            error: None,
        };

        let mut edits = Vec::new();
        for resolved in refs {
            if resolved.is_valid() {
                continue;
            }
            match (&resolved.suggestion, resolved.status) {
                (Some(suggestion), ResolutionStatus::TargetNotFound) => {
                    let new_target =
                        relative_target(&file.relative_path, &suggestion.relative_path);
                    outcome.planned.push(PlannedFix {
                        old_target: resolved.raw.target.clone(),
                        new_target: new_target.clone(),
                        start: resolved.raw.target_span.start,
                        end: resolved.raw.target_span.end,
                    });
                    edits.push(Edit::new(
                        resolved.raw.target_span.start,
                        resolved.raw.target_span.end,
                        new_target,
                    ));
                }
                _ => outcome.needs_attention.push(resolved.raw.target.clone()),
            }
        }

        if self.mode != FixMode::Live || edits.is_empty() {
            return outcome;
        }

        match self.apply(file, content, &edits) {
            Ok(()) => outcome.applied = true,
            Err(e) => {
                log::error!("Fix of {} aborted: {e}", file.relative_path.display());
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }

    fn apply(&mut self, file: &CorpusFile, content: &str, edits: &[Edit]) -> Result<()> {
        // Backup must be verified complete before the original is opened for
        // writing; on failure this file's mutation is aborted.
        self.backups
            .ensure_backup(&file.absolute_path, &file.relative_path)?;

        let rewritten = apply_edits(content, edits)?;
        fs::write(&file.absolute_path, rewritten)?;
        log::info!(
            "Rewrote {} ({} replacement(s))",
            file.relative_path.display(),
            edits.len()
        );
        Ok(())
    }
}

/// Render the target string for a suggestion: the path from the source file's
/// directory to the suggested file, `/`-separated.
pub fn relative_target(source_rel: &Path, suggestion_rel: &Path) -> String {
    let source_dir: Vec<&std::ffi::OsStr> = source_rel
        .parent()
        .map(|p| p.components())
        .into_iter()
        .flatten()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect();
    let target: Vec<&std::ffi::OsStr> = suggestion_rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect();

    let common = source_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..source_dir.len() {
        parts.push("..".to_string());
    }
    for name in &target[common..] {
        parts.push(name.to_string_lossy().to_string());
    }
    parts.join("/")
}

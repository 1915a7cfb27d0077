use crate::id::{infer_subsystem, RefType};
use crate::store::RegistryStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use xref_fixer::{apply_edits, BackupManager, Edit, FixMode};
use xref_indexer::CorpusFile;
use xref_patterns::{find_legacy_annotations, front_matter_span, is_canonical, LegacyAnnotation};

/// Per-file migration outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOutcome {
    pub relative_path: PathBuf,

    /// Legacy annotations found in the file
    pub annotations: usize,

    /// Items converted to freshly issued or reused canonical IDs
    pub migrated: usize,

    /// Items already in canonical form, passed through unchanged
    pub passed_through: usize,

    /// True when the rewrite was written back (Live mode only)
    pub applied: bool,

    pub error: Option<String>,
}

/// Rewrites legacy `@references:` annotations into canonical form, issuing
/// IDs through the registry store.
///
/// In dry-run the same IDs are computed in memory but the store is never
/// flushed, so the mapping file stays untouched.
pub struct Migrator {
    mode: FixMode,
    backups: BackupManager,
}

impl Migrator {
    pub fn new(mode: FixMode, backups: BackupManager) -> Self {
        Self { mode, backups }
    }

    pub fn migrate_file(
        &mut self,
        store: &mut RegistryStore,
        file: &CorpusFile,
        content: &str,
    ) -> MigrationOutcome {
        let mut outcome = MigrationOutcome {
            relative_path: file.relative_path.clone(),
            annotations: 0,
            migrated: 0,
            passed_through: 0,
            applied: false,
            error: None,
        };

        let annotations = find_legacy_annotations(content);
        if annotations.is_empty() {
            return outcome;
        }
        outcome.annotations = annotations.len();

        let fm = front_matter_span(content);
        let ref_type = RefType::for_extension(&file.extension);

        let mut edits = Vec::new();
        for annotation in &annotations {
            let mut ids = Vec::with_capacity(annotation.items.len());
            for item in &annotation.items {
                if is_canonical(&item.text) {
                    outcome.passed_through += 1;
                    ids.push(item.text.trim().to_string());
                } else {
                    let id = store.assign(&item.text, ref_type, infer_subsystem(&item.text));
                    outcome.migrated += 1;
                    ids.push(id.to_string());
                }
            }

            let in_front_matter = fm
                .as_ref()
                .is_some_and(|span| span.start <= annotation.span.start && annotation.span.end <= span.end);
            let rendered = render_annotation(content, annotation, &ids, in_front_matter);

            if rendered != content[annotation.span.clone()] {
                edits.push(Edit::new(
                    annotation.span.start,
                    annotation.span.end,
                    rendered,
                ));
            }
        }

        if self.mode != FixMode::Live || edits.is_empty() {
            return outcome;
        }

        let result = self
            .backups
            .ensure_backup(&file.absolute_path, &file.relative_path)
            .map_err(|e| e.to_string())
            .and_then(|_| apply_edits(content, &edits).map_err(|e| e.to_string()))
            .and_then(|rewritten| {
                fs::write(&file.absolute_path, rewritten).map_err(|e| e.to_string())
            });

        match result {
            Ok(()) => {
                outcome.applied = true;
                log::info!(
                    "Migrated {} annotation(s) in {}",
                    outcome.annotations,
                    file.relative_path.display()
                );
            }
            Err(e) => {
                log::error!(
                    "Migration of {} aborted: {e}",
                    file.relative_path.display()
                );
                outcome.error = Some(e);
            }
        }
        outcome
    }
}

/// Canonical textual form matching the annotation's context: a front-matter
/// list inside YAML front-matter, an inline comma list for inline
/// annotations, and prefix-preserving bullets otherwise.
fn render_annotation(
    content: &str,
    annotation: &LegacyAnnotation,
    ids: &[String],
    in_front_matter: bool,
) -> String {
    if in_front_matter {
        let mut rendered = String::from("references:");
        for id in ids {
            rendered.push_str("\n  - ");
            rendered.push_str(id);
        }
        return rendered;
    }

    if annotation.inline {
        return format!("@references: {}", ids.join(", "));
    }

    // Bullet form: keep the exact leading prefix of the first bullet line
    // (comment marker and indentation included).
    let first = &annotation.items[0];
    let line_start = content[..first.span.start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let prefix = &content[line_start..first.span.start];

    let mut rendered = String::from("@references:");
    for id in ids {
        rendered.push('\n');
        rendered.push_str(prefix);
        rendered.push_str(id);
    }
    rendered
}

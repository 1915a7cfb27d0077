use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use xref_fixer::FileFixOutcome;
use xref_indexer::{normalize_key, CorpusIndex};
use xref_validator::{ResolutionStatus, ResolvedReference};

/// Root documents expected to have no incoming references.
const ORPHAN_EXEMPT_NAMES: &[&str] = &["readme.md", "roadmap.md", "mqp.md", "archive_policy.md"];

/// One invalid reference, with everything a reader needs to act on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidReferenceEntry {
    pub source_file: PathBuf,
    pub display_text: String,
    pub target: String,
    pub reason: ResolutionStatus,
    pub suggestion: Option<PathBuf>,
}

/// Per-file reference counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBreakdown {
    pub file: PathBuf,
    pub references: usize,
    pub valid: usize,
    pub invalid: usize,
}

/// File with no incoming references from anywhere in the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanedFile {
    pub file: PathBuf,
    pub outgoing_references: usize,
}

/// Aggregated outcome of one run. Created once at the end, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub generated_at: String,
    pub root: PathBuf,

    pub total_files: usize,
    pub files_skipped: usize,
    pub total_references: usize,
    pub valid_references: usize,
    pub invalid_references: usize,
    pub valid_percent: f64,
    pub invalid_percent: f64,
    pub files_with_invalid: usize,
    pub elapsed_ms: u64,

    pub files: Vec<FileBreakdown>,
    pub invalid: Vec<InvalidReferenceEntry>,

    /// Files sorted by invalid-reference count, descending
    pub leaderboard: Vec<FileBreakdown>,

    pub orphaned_files: Vec<OrphanedFile>,

    /// Per-file fix outcomes (empty in validate-only runs)
    pub fixes: Vec<FileFixOutcome>,

    /// Files that could not be processed, with reasons
    pub skipped: Vec<String>,
}

/// Pure aggregation over per-file resolution results. No file I/O here;
/// serialization to a presentation format is the caller's concern.
pub struct ReportBuilder<'a> {
    index: &'a CorpusIndex,
    per_file: Vec<(PathBuf, Vec<ResolvedReference>)>,
    fixes: Vec<FileFixOutcome>,
    skipped: Vec<String>,
    elapsed_ms: u64,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self {
            index,
            per_file: Vec::new(),
            fixes: Vec::new(),
            skipped: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn add_file(&mut self, relative_path: PathBuf, refs: Vec<ResolvedReference>) {
        self.per_file.push((relative_path, refs));
    }

    pub fn add_fix(&mut self, outcome: FileFixOutcome) {
        self.fixes.push(outcome);
    }

    pub fn add_skipped(&mut self, reason: String) {
        log::warn!("Skipped: {reason}");
        self.skipped.push(reason);
    }

    pub fn elapsed_ms(&mut self, elapsed_ms: u64) {
        self.elapsed_ms = elapsed_ms;
    }

    pub fn build(self) -> ValidationReport {
        let mut files = Vec::with_capacity(self.per_file.len());
        let mut invalid_entries = Vec::new();
        let mut incoming: HashMap<String, usize> = HashMap::new();
        let mut total_references = 0;
        let mut valid_references = 0;

        for (path, refs) in &self.per_file {
            let mut breakdown = FileBreakdown {
                file: path.clone(),
                references: refs.len(),
                valid: 0,
                invalid: 0,
            };
            total_references += refs.len();

            for resolved in refs {
                if resolved.is_valid() {
                    breakdown.valid += 1;
                    valid_references += 1;
                    if let Some(target) = &resolved.resolved_target {
                        *incoming
                            .entry(normalize_key(&target.relative_path))
                            .or_insert(0) += 1;
                    }
                } else {
                    breakdown.invalid += 1;
                    invalid_entries.push(InvalidReferenceEntry {
                        source_file: path.clone(),
                        display_text: resolved.raw.display_text.clone(),
                        target: resolved.raw.target.clone(),
                        reason: resolved.status,
                        suggestion: resolved
                            .suggestion
                            .as_ref()
                            .map(|s| s.relative_path.clone()),
                    });
                }
            }
            files.push(breakdown);
        }

        let invalid_references = total_references - valid_references;
        let files_with_invalid = files.iter().filter(|f| f.invalid > 0).count();

        let mut leaderboard: Vec<FileBreakdown> =
            files.iter().filter(|f| f.invalid > 0).cloned().collect();
        leaderboard.sort_by(|a, b| b.invalid.cmp(&a.invalid).then(a.file.cmp(&b.file)));

        let outgoing: HashMap<String, usize> = self
            .per_file
            .iter()
            .map(|(path, refs)| (normalize_key(path), refs.len()))
            .collect();
        let mut orphaned_files: Vec<OrphanedFile> = self
            .index
            .files()
            .iter()
            .filter(|f| {
                let name = f.name_lower();
                !ORPHAN_EXEMPT_NAMES.contains(&name.as_str())
            })
            .filter(|f| !incoming.contains_key(&normalize_key(&f.relative_path)))
            .map(|f| OrphanedFile {
                file: f.relative_path.clone(),
                outgoing_references: outgoing
                    .get(&normalize_key(&f.relative_path))
                    .copied()
                    .unwrap_or(0),
            })
            .collect();
        orphaned_files.sort_by(|a, b| a.file.cmp(&b.file));

        let percent = |part: usize| {
            if total_references == 0 {
                0.0
            } else {
                part as f64 / total_references as f64 * 100.0
            }
        };

        ValidationReport {
            generated_at: Utc::now().to_rfc3339(),
            root: self.index.root().to_path_buf(),
            total_files: self.per_file.len(),
            files_skipped: self.skipped.len(),
            total_references,
            valid_references,
            invalid_references,
            valid_percent: percent(valid_references),
            invalid_percent: percent(invalid_references),
            files_with_invalid,
            elapsed_ms: self.elapsed_ms,
            files,
            invalid: invalid_entries,
            leaderboard,
            orphaned_files,
            fixes: self.fixes,
            skipped: self.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use xref_indexer::CorpusFile;
    use xref_patterns::{RawReference, ReferenceKind};

    fn corpus(paths: &[&str]) -> CorpusIndex {
        let files = paths
            .iter()
            .map(|p| {
                let rel = PathBuf::from(p);
                CorpusFile {
                    absolute_path: PathBuf::from("/corpus").join(&rel),
                    extension: rel
                        .extension()
                        .map(|e| e.to_string_lossy().to_lowercase())
                        .unwrap_or_default(),
                    relative_path: rel,
                    modified: None,
                    size: 0,
                }
            })
            .collect();
        CorpusIndex::new(PathBuf::from("/corpus"), files)
    }

    fn resolved(
        source: &str,
        target: &str,
        status: ResolutionStatus,
        resolved_target: Option<&CorpusIndex>,
    ) -> ResolvedReference {
        ResolvedReference {
            raw: RawReference {
                source_file: PathBuf::from(source),
                display_text: "text".into(),
                target: target.into(),
                kind: ReferenceKind::MarkdownLink,
                span: 0..1,
                target_span: 0..1,
            },
            status,
            resolved_target: resolved_target
                .and_then(|index| index.get_relative(Path::new(target)).cloned()),
            suggestion: None,
        }
    }

    #[test]
    fn totals_and_percentages() {
        let index = corpus(&["a.md", "b.md"]);
        let mut builder = ReportBuilder::new(&index);
        builder.add_file(
            PathBuf::from("a.md"),
            vec![
                resolved("a.md", "b.md", ResolutionStatus::Valid, Some(&index)),
                resolved("a.md", "gone.md", ResolutionStatus::TargetNotFound, None),
            ],
        );

        let report = builder.build();
        assert_eq!(report.total_references, 2);
        assert_eq!(report.valid_references, 1);
        assert_eq!(report.invalid_references, 1);
        assert_eq!(report.valid_percent, 50.0);
        assert_eq!(report.files_with_invalid, 1);
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].target, "gone.md");
    }

    #[test]
    fn external_counts_as_valid() {
        let index = corpus(&["a.md"]);
        let mut builder = ReportBuilder::new(&index);
        builder.add_file(
            PathBuf::from("a.md"),
            vec![resolved(
                "a.md",
                "https://example.org",
                ResolutionStatus::ExternalSkipped,
                None,
            )],
        );

        let report = builder.build();
        assert_eq!(report.valid_references, 1);
        assert!(report.invalid.is_empty());
    }

    #[test]
    fn leaderboard_sorts_by_invalid_count_descending() {
        let index = corpus(&["a.md", "b.md"]);
        let mut builder = ReportBuilder::new(&index);
        builder.add_file(
            PathBuf::from("a.md"),
            vec![resolved(
                "a.md",
                "x.md",
                ResolutionStatus::TargetNotFound,
                None,
            )],
        );
        builder.add_file(
            PathBuf::from("b.md"),
            vec![
                resolved("b.md", "y.md", ResolutionStatus::TargetNotFound, None),
                resolved("b.md", "z.md", ResolutionStatus::TargetNotFound, None),
            ],
        );

        let report = builder.build();
        assert_eq!(report.leaderboard.len(), 2);
        assert_eq!(report.leaderboard[0].file, PathBuf::from("b.md"));
        assert_eq!(report.leaderboard[0].invalid, 2);
    }

    #[test]
    fn unreferenced_files_are_orphans_except_exempt_names() {
        let index = corpus(&["a.md", "b.md", "lonely.md", "README.md"]);
        let mut builder = ReportBuilder::new(&index);
        builder.add_file(
            PathBuf::from("a.md"),
            vec![resolved("a.md", "b.md", ResolutionStatus::Valid, Some(&index))],
        );
        builder.add_file(PathBuf::from("lonely.md"), vec![]);

        let report = builder.build();
        let orphans: Vec<_> = report.orphaned_files.iter().map(|o| o.file.clone()).collect();
        assert!(orphans.contains(&PathBuf::from("a.md")));
        assert!(orphans.contains(&PathBuf::from("lonely.md")));
        assert!(!orphans.contains(&PathBuf::from("b.md")));
        assert!(!orphans.contains(&PathBuf::from("README.md")));
    }

    #[test]
    fn empty_run_produces_zeroed_report() {
        let index = corpus(&[]);
        let report = ReportBuilder::new(&index).build();
        assert_eq!(report.total_references, 0);
        assert_eq!(report.valid_percent, 0.0);
        assert!(report.leaderboard.is_empty());
    }
}

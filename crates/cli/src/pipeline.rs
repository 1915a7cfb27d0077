use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use xref_fixer::{BackupManager, FixMode, Fixer};
use xref_indexer::{CorpusScanner, ScanOptions};
use xref_patterns::extract_references;
use xref_registry::{Migrator, RegistryStore};
use xref_report::{GraphExport, ReferenceGraph, ReportBuilder, ValidationReport};
use xref_validator::{resolve, ResolvedReference, SuggestionEngine};

/// Everything one batch invocation needs. Single-threaded, sequential per
/// file; cancellation is safe at file boundaries only.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub root: PathBuf,
    pub scan: ScanOptions,
    pub mode: FixMode,
    pub backup_dir: PathBuf,
    pub registry_path: PathBuf,
    pub progress: bool,
}

/// Output of a validate/fix run: the report plus the graph hand-off.
pub struct RunOutput {
    pub report: ValidationReport,
    pub graph: GraphExport,
}

/// Output of a migration run.
#[derive(Debug, Serialize, Deserialize)]
pub struct MigrationRun {
    pub files_processed: usize,
    pub files_modified: usize,
    pub annotations: usize,
    pub references_migrated: usize,
    pub references_passed_through: usize,
    pub errors: usize,
    pub registry_entries: usize,

    /// Non-fatal registry persistence problem, if any; issued IDs stay in
    /// memory and were reported regardless
    pub registry_warning: Option<String>,

    pub outcomes: Vec<xref_registry::MigrationOutcome>,
}

/// Timestamp used for the per-run backup folder.
pub fn run_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Validate every corpus file; in DryRun/Live additionally plan (and in Live
/// apply) fixes for invalid references that have suggestions.
pub fn run_validation(options: &RunOptions) -> Result<RunOutput> {
    let started = Instant::now();

    let scanner = CorpusScanner::new(&options.root, options.scan.clone())?;
    let index = scanner.scan();
    let files = index.files().to_vec();

    let bar = progress_bar(options.progress, files.len());
    let mut engine = SuggestionEngine::new();
    let mut fixer = match options.mode {
        FixMode::ReportOnly => None,
        mode => Some(Fixer::new(
            mode,
            BackupManager::new(&options.backup_dir, run_timestamp()),
        )),
    };

    let mut builder = ReportBuilder::new(&index);
    let mut results: Vec<(PathBuf, Vec<ResolvedReference>)> = Vec::with_capacity(files.len());

    for file in &files {
        bar.inc(1);
        let content = match fs::read_to_string(&file.absolute_path) {
            Ok(content) => content,
            Err(e) => {
                builder.add_skipped(format!(
                    "could not process {}: {e}",
                    file.relative_path.display()
                ));
                continue;
            }
        };

        let raw = extract_references(&file.relative_path, &content);
        let mut resolved: Vec<ResolvedReference> = raw
            .iter()
            .map(|r| resolve(r, &index, &options.scan.extensions))
            .collect();
        for reference in &mut resolved {
            engine.annotate(reference, &index);
        }

        if let Some(fixer) = &mut fixer {
            let outcome = fixer.fix_file(file, &content, &resolved);
            if !outcome.planned.is_empty()
                || !outcome.needs_attention.is_empty()
                || outcome.error.is_some()
            {
                builder.add_fix(outcome);
            }
        }

        results.push((file.relative_path.clone(), resolved));
    }
    bar.finish_and_clear();

    let graph = ReferenceGraph::from_results(&results).export();
    for (path, resolved) in results {
        builder.add_file(path, resolved);
    }
    builder.elapsed_ms(started.elapsed().as_millis() as u64);
    let report = builder.build();

    log::info!(
        "Validated {} file(s): {} reference(s), {} valid, {} invalid",
        report.total_files,
        report.total_references,
        report.valid_references,
        report.invalid_references
    );

    Ok(RunOutput { report, graph })
}

/// Migrate legacy annotations to canonical IDs across the corpus. The
/// registry is flushed after every file that issued IDs, so a partial run
/// never loses issuance.
pub fn run_migration(options: &RunOptions) -> Result<MigrationRun> {
    let scanner = CorpusScanner::new(&options.root, options.scan.clone())?;
    let index = scanner.scan();
    let files = index.files().to_vec();

    let mut registry = RegistryStore::load(&options.registry_path)?;
    let mut migrator = Migrator::new(
        options.mode,
        BackupManager::new(&options.backup_dir, run_timestamp()),
    );

    let bar = progress_bar(options.progress, files.len());
    let mut run = MigrationRun {
        files_processed: 0,
        files_modified: 0,
        annotations: 0,
        references_migrated: 0,
        references_passed_through: 0,
        errors: 0,
        registry_entries: 0,
        registry_warning: None,
        outcomes: Vec::new(),
    };

    for file in &files {
        bar.inc(1);
        let content = match fs::read_to_string(&file.absolute_path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("could not process {}: {e}", file.relative_path.display());
                run.errors += 1;
                continue;
            }
        };

        let outcome = migrator.migrate_file(&mut registry, file, &content);
        run.files_processed += 1;
        run.annotations += outcome.annotations;
        run.references_migrated += outcome.migrated;
        run.references_passed_through += outcome.passed_through;
        if outcome.applied {
            run.files_modified += 1;
        }
        if outcome.error.is_some() {
            run.errors += 1;
        }

        // Incremental flush: a later failure cannot erase this file's IDs
        if options.mode == FixMode::Live && registry.is_dirty() {
            if let Err(e) = registry.flush() {
                log::warn!("registry persistence failed: {e}");
                run.registry_warning = Some(e.to_string());
            }
        }

        if outcome.annotations > 0 {
            run.outcomes.push(outcome);
        }
    }
    bar.finish_and_clear();

    if options.mode == FixMode::Live && registry.is_dirty() {
        if let Err(e) = registry.flush() {
            log::warn!("registry persistence failed: {e}");
            run.registry_warning = Some(e.to_string());
        }
    }
    run.registry_entries = registry.len();

    log::info!(
        "Migration over {} file(s): {} annotation(s), {} migrated, {} passed through",
        run.files_processed,
        run.annotations,
        run.references_migrated,
        run.references_passed_through
    );

    Ok(run)
}

fn progress_bar(enabled: bool, len: usize) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

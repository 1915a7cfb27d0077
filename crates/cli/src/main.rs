use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use xref_cli::config::{scan_options, FileConfig};
use xref_cli::pipeline::{run_migration, run_validation, RunOptions, RunOutput};
use xref_fixer::FixMode;

#[derive(Parser)]
#[command(name = "xref")]
#[command(about = "Reference integrity engine for documentation corpora", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the corpus and report invalid references without touching files
    Validate(ValidateArgs),

    /// Rewrite invalid references to their suggested targets
    Fix(FixArgs),

    /// Convert legacy `@references:` annotations to canonical IDs
    Migrate(MigrateArgs),
}

#[derive(Args)]
struct CorpusArgs {
    /// Corpus root directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Extra file extension to index (repeatable)
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Extra directory name to prune (repeatable)
    #[arg(long = "exclude-dir")]
    exclude_dirs: Vec<String>,

    /// Extra file name to skip (repeatable)
    #[arg(long = "skip-file")]
    skip_files: Vec<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that receives per-run backup trees
    #[arg(long, default_value = "backups")]
    backup_dir: PathBuf,

    /// Path of the legacy-to-canonical ID registry
    #[arg(long, default_value = ".xref/registry.json")]
    registry: PathBuf,

    /// Suppress the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args)]
struct ValidateArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Write the full validation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the reference graph as JSON
    #[arg(long)]
    graph: Option<PathBuf>,
}

#[derive(Args)]
struct FixArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Apply fixes to disk (default is a dry run)
    #[arg(long, conflicts_with = "dry_run")]
    live: bool,

    /// Plan fixes without writing anything (the default)
    #[arg(long)]
    dry_run: bool,

    /// Write the full validation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the reference graph as JSON
    #[arg(long)]
    graph: Option<PathBuf>,
}

#[derive(Args)]
struct MigrateArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Apply migrations to disk (default is a dry run)
    #[arg(long, conflicts_with = "dry_run")]
    live: bool,

    /// Plan migrations without writing anything (the default)
    #[arg(long)]
    dry_run: bool,

    /// Write the migration summary as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Fix(args) => run_fix(args),
        Commands::Migrate(args) => run_migrate(args),
    }
}

fn build_options(corpus: &CorpusArgs, mode: FixMode) -> Result<RunOptions> {
    let file_config = match &corpus.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let scan = scan_options(
        &file_config,
        &corpus.extensions,
        &corpus.exclude_dirs,
        &corpus.skip_files,
    );
    let backup_dir = file_config
        .backup_dir
        .clone()
        .unwrap_or_else(|| corpus.backup_dir.clone());
    let registry_path = file_config
        .registry_path
        .clone()
        .unwrap_or_else(|| corpus.registry.clone());

    Ok(RunOptions {
        root: corpus.root.clone(),
        scan,
        mode,
        backup_dir,
        registry_path,
        progress: !corpus.no_progress,
    })
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let options = build_options(&args.corpus, FixMode::ReportOnly)?;
    let output = run_validation(&options)?;
    write_run_artifacts(&output, args.report.as_deref(), args.graph.as_deref())?;
    print_summary(&output);
    Ok(())
}

fn run_fix(args: FixArgs) -> Result<()> {
    let mode = if args.live {
        FixMode::Live
    } else {
        FixMode::DryRun
    };
    let options = build_options(&args.corpus, mode)?;
    let output = run_validation(&options)?;
    write_run_artifacts(&output, args.report.as_deref(), args.graph.as_deref())?;
    print_summary(&output);

    let planned: usize = output.report.fixes.iter().map(|f| f.planned.len()).sum();
    let applied = output.report.fixes.iter().filter(|f| f.applied).count();
    match mode {
        FixMode::Live => println!("Applied fixes in {applied} file(s) ({planned} target(s) rewritten)"),
        _ => println!("Dry run: {planned} fix(es) planned, nothing written"),
    }
    Ok(())
}

fn run_migrate(args: MigrateArgs) -> Result<()> {
    let mode = if args.live {
        FixMode::Live
    } else {
        FixMode::DryRun
    };
    let options = build_options(&args.corpus, mode)?;
    let run = run_migration(&options)?;

    if let Some(path) = &args.report {
        write_json(path, &run)?;
    }
    println!(
        "Migration: {} annotation(s) in {} file(s), {} migrated, {} passed through, {} error(s)",
        run.annotations, run.files_processed, run.references_migrated,
        run.references_passed_through, run.errors
    );
    if mode == FixMode::Live {
        println!(
            "Registry now holds {} mapping(s); {} file(s) rewritten",
            run.registry_entries, run.files_modified
        );
    } else {
        println!("Dry run: registry untouched");
    }
    if let Some(warning) = &run.registry_warning {
        log::warn!("registry persistence issue: {warning}");
    }
    Ok(())
}

fn write_run_artifacts(
    output: &RunOutput,
    report: Option<&Path>,
    graph: Option<&Path>,
) -> Result<()> {
    if let Some(path) = report {
        write_json(path, &output.report)?;
    }
    if let Some(path) = graph {
        write_json(path, &output.graph)?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn print_summary(output: &RunOutput) {
    let report = &output.report;
    println!(
        "Checked {} file(s), {} reference(s): {} valid ({:.1}%), {} invalid ({:.1}%)",
        report.total_files,
        report.total_references,
        report.valid_references,
        report.valid_percent,
        report.invalid_references,
        report.invalid_percent
    );
    if report.files_skipped > 0 {
        println!("Skipped {} unreadable file(s)", report.files_skipped);
    }
    for entry in &report.invalid {
        match &entry.suggestion {
            Some(suggestion) => println!(
                "  {}: {} -> suggest {}",
                entry.source_file.display(),
                entry.target,
                suggestion.display()
            ),
            None => println!(
                "  {}: {} (no suggestion)",
                entry.source_file.display(),
                entry.target
            ),
        }
    }
    if !report.orphaned_files.is_empty() {
        println!("{} orphaned file(s)", report.orphaned_files.len());
    }
}

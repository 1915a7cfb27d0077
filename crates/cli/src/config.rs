use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use xref_indexer::ScanOptions;

/// Optional TOML config file. Every field falls back to the built-in
/// defaults; CLI flags override what the file sets.
///
/// ```toml
/// extensions = ["md", "txt"]
/// exclude_dirs = ["node_modules", "zz_archive"]
/// skip_files = ["CHANGELOG.md"]
/// backup_dir = ".xref/backups"
/// registry_path = ".xref/registry.json"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub extensions: Option<Vec<String>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub skip_files: Option<Vec<String>>,
    pub backup_dir: Option<PathBuf>,
    pub registry_path: Option<PathBuf>,
}

impl FileConfig {
    /// An unreadable or unparsable config file aborts before any file is
    /// touched.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Merge file config and CLI additions over the scan defaults.
pub fn scan_options(
    file: &FileConfig,
    extra_extensions: &[String],
    extra_exclude_dirs: &[String],
    extra_skip_files: &[String],
) -> ScanOptions {
    let mut options = ScanOptions::default();

    if let Some(extensions) = &file.extensions {
        options.extensions = extensions.iter().map(|e| e.to_lowercase()).collect();
    }
    if let Some(dirs) = &file.exclude_dirs {
        options.exclude_dirs = dirs.iter().map(|d| d.to_lowercase()).collect();
    }
    if let Some(files) = &file.skip_files {
        options.skip_files = files.iter().cloned().collect::<HashSet<_>>();
    }

    for ext in extra_extensions {
        let ext = ext.trim_start_matches('.').to_lowercase();
        if !options.extensions.contains(&ext) {
            options.extensions.push(ext);
        }
    }
    for dir in extra_exclude_dirs {
        options.exclude_dirs.insert(dir.to_lowercase());
    }
    for name in extra_skip_files {
        options.skip_files.insert(name.clone());
    }

    options
}

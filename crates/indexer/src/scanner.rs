use crate::error::{IndexerError, Result};
use crate::index::{CorpusFile, CorpusIndex};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Scan configuration: allow-listed extensions plus exclusion spec.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extensions to index, lowercase, without the leading dot
    pub extensions: Vec<String>,

    /// Directory names pruned entirely (children never visited)
    pub exclude_dirs: HashSet<String>,

    /// Exact file names always skipped
    pub skip_files: HashSet<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude_dirs: EXCLUDED_DIR_NAMES.iter().map(|d| d.to_string()).collect(),
            skip_files: SKIPPED_FILE_NAMES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl ScanOptions {
    pub fn allows_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|candidate| candidate == &ext)
    }
}

/// Scanner that builds the corpus index for a root tree.
#[derive(Debug)]
pub struct CorpusScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl CorpusScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            return Err(IndexerError::InvalidRoot(format!(
                "path does not exist: {}",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(IndexerError::InvalidRoot(format!(
                "not a directory: {}",
                root.display()
            )));
        }
        let root = root.canonicalize()?;
        Ok(Self { root, options })
    }

    /// Walk the tree and build the index. Excluded directories are pruned
    /// before descent; discovery order is immaterial.
    pub fn scan(&self) -> CorpusIndex {
        let mut files = Vec::new();

        let exclude = self.options.exclude_dirs.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false);
        builder.filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && exclude.contains(&name))
        });

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if self.is_skipped_file(path) {
                        log::debug!("Skipping listed file {}", path.display());
                        continue;
                    }

                    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                        continue;
                    };
                    if !self.options.allows_extension(ext) {
                        continue;
                    }

                    let Ok(relative) = path.strip_prefix(&self.root) else {
                        continue;
                    };

                    let (modified, size) = match entry.metadata() {
                        Ok(meta) => (meta.modified().ok(), meta.len()),
                        Err(_) => (None, 0),
                    };

                    files.push(CorpusFile {
                        absolute_path: path.to_path_buf(),
                        relative_path: relative.to_path_buf(),
                        extension: ext.to_lowercase(),
                        modified,
                        size,
                    });
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        log::info!("Indexed {} corpus files", files.len());
        CorpusIndex::new(self.root.clone(), files)
    }

    fn is_skipped_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| {
                self.options
                    .skip_files
                    .iter()
                    .any(|skip| name.eq_ignore_ascii_case(skip))
            })
    }
}

/// Sensible defaults covering documentation, config, and source files.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "md", "mdx", "rst", "txt", "html", "py", "rs", "js", "ts", "css", "json", "yaml", "yml",
    "toml",
];

pub const EXCLUDED_DIR_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".venv",
    "venv",
    "node_modules",
    "__pycache__",
    "target",
    "dist",
    "build",
    "backup",
    "backups",
    ".backup",
    ".temp",
    "temp",
    "zz_archive",
];

pub const SKIPPED_FILE_NAMES: &[&str] = &[
    ".gitignore",
    ".gitmodules",
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "Cargo.lock",
];

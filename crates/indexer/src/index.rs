use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Indexed representation of one file under the scanned root.
///
/// Built fresh by the scanner each run and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusFile {
    /// Absolute path on disk
    pub absolute_path: PathBuf,

    /// Path relative to the corpus root
    pub relative_path: PathBuf,

    /// Lowercased extension without the leading dot ("" when absent)
    pub extension: String,

    /// Last modification time
    #[serde(skip)]
    pub modified: Option<SystemTime>,

    /// File size in bytes
    pub size: u64,
}

impl CorpusFile {
    /// File name without its extension, lowercased.
    pub fn stem_lower(&self) -> String {
        self.relative_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// File name with extension, lowercased.
    pub fn name_lower(&self) -> String {
        self.relative_path
            .file_name()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Normalize a root-relative path into a case- and separator-independent
/// lookup key.
pub fn normalize_key(path: &Path) -> String {
    let mut parts = Vec::new();
    for component in path.components() {
        if let std::path::Component::Normal(name) = component {
            parts.push(name.to_string_lossy().to_lowercase());
        }
    }
    parts.join("/")
}

/// Unordered lookup set of corpus files keyed by normalized relative path.
pub struct CorpusIndex {
    root: PathBuf,
    files: Vec<CorpusFile>,
    by_key: HashMap<String, usize>,
}

impl CorpusIndex {
    pub fn new(root: PathBuf, files: Vec<CorpusFile>) -> Self {
        let mut by_key = HashMap::with_capacity(files.len());
        for (idx, file) in files.iter().enumerate() {
            by_key.insert(normalize_key(&file.relative_path), idx);
        }
        Self {
            root,
            files,
            by_key,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[CorpusFile] {
        &self.files
    }

    /// Look up a file by root-relative path (case/separator independent).
    pub fn get_relative(&self, relative: &Path) -> Option<&CorpusFile> {
        self.by_key
            .get(&normalize_key(relative))
            .map(|&idx| &self.files[idx])
    }

    /// Look up a file by absolute path, provided it lives under the root.
    pub fn get_absolute(&self, absolute: &Path) -> Option<&CorpusFile> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        self.get_relative(relative)
    }

    pub fn contains_relative(&self, relative: &Path) -> bool {
        self.by_key.contains_key(&normalize_key(relative))
    }

    /// Files whose parent directory is exactly `dir` (root-relative; "" means
    /// the root itself).
    pub fn files_in_dir<'a>(&'a self, dir: &'a Path) -> impl Iterator<Item = &'a CorpusFile> {
        let dir_key = normalize_key(dir);
        self.files.iter().filter(move |f| {
            let parent_key = f
                .relative_path
                .parent()
                .map(normalize_key)
                .unwrap_or_default();
            parent_key == dir_key
        })
    }
}

use crate::types::{ResolutionStatus, ResolvedReference};
use std::path::{Component, Path, PathBuf};
use xref_indexer::{CorpusFile, CorpusIndex};
use xref_patterns::{is_canonical, RawReference, ReferenceKind};

/// Resolve one raw reference against the corpus index.
///
/// Pure function of (target string, source file, index state): no clock, no
/// network, no filesystem probing beyond the prebuilt index.
pub fn resolve(raw: &RawReference, index: &CorpusIndex, extensions: &[String]) -> ResolvedReference {
    let (status, resolved_target) = classify(raw, index, extensions);
    ResolvedReference {
        raw: raw.clone(),
        status,
        resolved_target,
        suggestion: None,
    }
}

fn classify(
    raw: &RawReference,
    index: &CorpusIndex,
    extensions: &[String],
) -> (ResolutionStatus, Option<CorpusFile>) {
    if raw.is_external() {
        return (ResolutionStatus::ExternalSkipped, None);
    }

    // Canonical IDs reference the identifier space, not the file tree.
    if raw.kind == ReferenceKind::FrontMatter || is_canonical(&raw.target) {
        if is_canonical(&raw.target) {
            return (ResolutionStatus::Valid, None);
        }
        if raw.kind == ReferenceKind::FrontMatter {
            return (ResolutionStatus::Malformed, None);
        }
    }

    // Drop any fragment before resolving: `guide.md#setup` targets `guide.md`.
    let target = raw.target.split('#').next().unwrap_or("").trim();
    if target.is_empty() {
        return (ResolutionStatus::Malformed, None);
    }

    let Some(candidate) = candidate_relative(target, &raw.source_file, index) else {
        return (ResolutionStatus::TargetNotFound, None);
    };

    if let Some(file) = index.get_relative(&candidate) {
        return (ResolutionStatus::Valid, Some(file.clone()));
    }

    // Extension probing: references may omit or mismatch the extension.
    for ext in extensions {
        let appended = PathBuf::from(format!("{}.{ext}", candidate.display()));
        if let Some(file) = index.get_relative(&appended) {
            return (ResolutionStatus::Valid, Some(file.clone()));
        }
        if candidate.extension().is_some() {
            let swapped = candidate.with_extension(ext);
            if let Some(file) = index.get_relative(&swapped) {
                return (ResolutionStatus::Valid, Some(file.clone()));
            }
        }
    }

    (ResolutionStatus::TargetNotFound, None)
}

/// Root-relative candidate path for a target: absolute targets must live under
/// the corpus root; relative targets resolve from the source file's directory.
/// Returns `None` when the path escapes the root.
fn candidate_relative(target: &str, source_file: &Path, index: &CorpusIndex) -> Option<PathBuf> {
    let target_path = PathBuf::from(target.replace('\\', "/"));

    if target_path.is_absolute() {
        let relative = target_path.strip_prefix(index.root()).ok()?;
        return Some(relative.to_path_buf());
    }

    let source_dir = source_file.parent().unwrap_or_else(|| Path::new(""));
    normalize_lexically(&source_dir.join(&target_path))
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<std::ffi::OsString> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_os_string()),
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root escapes the corpus
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.iter().collect())
}

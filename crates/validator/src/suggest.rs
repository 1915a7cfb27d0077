use crate::types::{ResolutionStatus, ResolvedReference};
use nucleo_matcher::{pattern::Pattern, Matcher};
use std::path::{Path, PathBuf};
use xref_indexer::{CorpusFile, CorpusIndex};

/// Heuristic replacement finder for broken references.
///
/// Candidates come from the source file's directory and its ancestors up to
/// the corpus root (directory contents only), so the search never reaches
/// across unrelated subtrees when a local match exists. Scoring tiers:
/// exact extension-stripped name match, then substring containment; anything
/// else is excluded. Within a tier, ranking prefers fewest levels up from the
/// source directory, then nucleo-matcher similarity, then path order.
pub struct SuggestionEngine {
    matcher: Matcher,
}

/// Exact-stem matches always outrank substring matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    ExactStem,
    Substring,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Annotate an invalid reference with the best replacement, if any.
    /// "No suggestion" is a normal outcome, never an error.
    pub fn annotate(&mut self, resolved: &mut ResolvedReference, index: &CorpusIndex) {
        if resolved.status != ResolutionStatus::TargetNotFound {
            return;
        }
        resolved.suggestion = self.suggest(&resolved.raw.target, &resolved.raw.source_file, index);
    }

    pub fn suggest(
        &mut self,
        target: &str,
        source_file: &Path,
        index: &CorpusIndex,
    ) -> Option<CorpusFile> {
        let wanted = target.split('#').next().unwrap_or("").trim();
        let wanted_name = Path::new(&wanted.replace('\\', "/"))
            .file_name()
            .map(|n| n.to_string_lossy().to_string())?;
        let wanted_stem = Path::new(&wanted_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())?;
        if wanted_stem.is_empty() {
            return None;
        }

        let pattern = Pattern::parse(
            &wanted_stem,
            nucleo_matcher::pattern::CaseMatching::Ignore,
            nucleo_matcher::pattern::Normalization::Smart,
        );

        let source_key = xref_indexer::normalize_key(source_file);
        let mut best_key: Option<(Tier, u32, std::cmp::Reverse<u32>, PathBuf)> = None;
        let mut best_file: Option<CorpusFile> = None;

        for (level, dir) in ancestor_dirs(source_file).into_iter().enumerate() {
            for candidate in index.files_in_dir(&dir) {
                if xref_indexer::normalize_key(&candidate.relative_path) == source_key {
                    continue;
                }

                let stem = candidate.stem_lower();
                let tier = if stem == wanted_stem {
                    Tier::ExactStem
                } else if stem.contains(&wanted_stem) || wanted_stem.contains(&stem) {
                    Tier::Substring
                } else {
                    continue;
                };

                let name = candidate.name_lower();
                let haystack = nucleo_matcher::Utf32String::from(name.as_str());
                let score = pattern
                    .score(haystack.slice(..), &mut self.matcher)
                    .unwrap_or(0);

                let key = (
                    tier,
                    level as u32,
                    std::cmp::Reverse(score),
                    candidate.relative_path.clone(),
                );
                if best_key.as_ref().is_none_or(|current| &key < current) {
                    best_key = Some(key);
                    best_file = Some(candidate.clone());
                }
            }
        }

        match &best_file {
            Some(found) => log::debug!(
                "Suggesting {} for broken target {target:?} in {}",
                found.relative_path.display(),
                source_file.display()
            ),
            None => log::debug!(
                "No replacement candidate for {target:?} in {}",
                source_file.display()
            ),
        }

        best_file
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The source file's directory followed by each ancestor up to the corpus
/// root (root-relative; the final entry is the root itself).
fn ancestor_dirs(source_file: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut dir = source_file.parent().unwrap_or_else(|| Path::new(""));
    loop {
        dirs.push(dir.to_path_buf());
        if dir.as_os_str().is_empty() {
            break;
        }
        dir = dir.parent().unwrap_or_else(|| Path::new(""));
    }
    dirs
}

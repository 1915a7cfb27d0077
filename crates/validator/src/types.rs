use serde::{Deserialize, Serialize};
use xref_indexer::CorpusFile;
use xref_patterns::RawReference;

/// Outcome of resolving one raw reference against the corpus index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Target exists in the corpus (or is a known canonical ID)
    Valid,

    /// Absolute URL; reachability is never checked
    ExternalSkipped,

    /// No candidate path exists in the corpus
    TargetNotFound,

    /// Target string failed to parse (empty or unusable)
    Malformed,
}

impl ResolutionStatus {
    /// External references count as valid: they are never flagged.
    pub fn is_valid(self) -> bool {
        matches!(
            self,
            ResolutionStatus::Valid | ResolutionStatus::ExternalSkipped
        )
    }
}

/// A raw reference plus its validation outcome and, for broken references,
/// an optional replacement proposal.
#[derive(Debug, Clone)]
pub struct ResolvedReference {
    pub raw: RawReference,
    pub status: ResolutionStatus,

    /// Corpus file the target resolved to, when valid
    pub resolved_target: Option<CorpusFile>,

    /// Heuristic replacement, only for `TargetNotFound`
    pub suggestion: Option<CorpusFile>,
}

impl ResolvedReference {
    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }
}

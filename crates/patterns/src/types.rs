use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Recognized reference syntaxes. A file may match several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `[text](target)` with a local target
    MarkdownLink,

    /// `[text](https://...)` — absolute URL, auto-valid, never flagged
    External,

    /// `- 🔗 Reference: [text](target)` line inside a delimited crossref block
    CrossrefBlock,

    /// `<crossref>text -> target</crossref>`
    InlineTag,

    /// `<!-- crossref: text -> target -->`
    HtmlComment,

    /// Entry of the `references:` list in YAML front-matter
    FrontMatter,

    /// Item of a legacy `@references:` trailing annotation
    LegacyAnnotation,
}

impl ReferenceKind {
    /// Priority used by the central de-duplication pass. Context-aware rules
    /// beat the generic markdown rule when their spans overlap.
    pub(crate) fn priority(self) -> u8 {
        match self {
            ReferenceKind::CrossrefBlock => 0,
            ReferenceKind::FrontMatter => 0,
            ReferenceKind::LegacyAnnotation => 0,
            ReferenceKind::InlineTag => 1,
            ReferenceKind::HtmlComment => 1,
            ReferenceKind::MarkdownLink => 2,
            ReferenceKind::External => 2,
        }
    }
}

/// One raw reference occurrence with exact byte offsets.
///
/// `span` covers the whole syntactic construct; `target_span` covers only the
/// target string, which is what in-place rewriting replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    pub source_file: PathBuf,
    pub display_text: String,
    pub target: String,
    pub kind: ReferenceKind,
    pub span: Range<usize>,
    pub target_span: Range<usize>,
}

impl RawReference {
    pub fn is_external(&self) -> bool {
        self.kind == ReferenceKind::External
    }
}

/// Target prefixes treated as external URLs.
pub const EXTERNAL_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "mailto:"];

pub fn is_external_target(target: &str) -> bool {
    EXTERNAL_SCHEMES
        .iter()
        .any(|scheme| target.starts_with(scheme))
}

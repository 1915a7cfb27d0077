//! # Pattern Library & Reference Extractor
//!
//! Recognized cross-reference syntaxes, each with an independent, pure
//! extraction rule, plus the central extractor that applies every rule to a
//! file's content and de-duplicates overlapping matches by byte offset.
//!
//! Byte spans are exact: `content[reference.target_span]` is the as-written
//! target, which is what the fixer rewrites in place.

mod canonical;
mod extract;
mod frontmatter;
mod legacy;
mod rules;
mod types;

pub use canonical::{is_canonical, parse_canonical, CanonicalIdParts, CANONICAL_ID_RE};
pub use extract::extract_references;
pub use frontmatter::{front_matter_span, references_entries, FrontMatterEntry};
pub use legacy::{find_legacy_annotations, LegacyAnnotation, LegacyItem};
pub use rules::PatternMatch;
pub use types::{is_external_target, RawReference, ReferenceKind, EXTERNAL_SCHEMES};

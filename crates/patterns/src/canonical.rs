use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical identifier syntax: `EGOS-<TYPE>-<SUBSYSTEM>-<NUMBER>`.
pub static CANONICAL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^EGOS-([A-Z]+)-([A-Z]+)-(\d+)$").unwrap());

/// Raw fields of a canonical ID string; typed interpretation lives in the
/// registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalIdParts<'a> {
    pub ref_type: &'a str,
    pub subsystem: &'a str,
    pub sequence: u32,
}

pub fn parse_canonical(text: &str) -> Option<CanonicalIdParts<'_>> {
    let caps = CANONICAL_ID_RE.captures(text.trim())?;
    let sequence: u32 = caps.get(3)?.as_str().parse().ok()?;
    Some(CanonicalIdParts {
        ref_type: caps.get(1)?.as_str(),
        subsystem: caps.get(2)?.as_str(),
        sequence,
    })
}

pub fn is_canonical(text: &str) -> bool {
    CANONICAL_ID_RE.is_match(text.trim())
}

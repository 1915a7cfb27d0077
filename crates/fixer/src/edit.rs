use crate::error::{FixerError, Result};

/// One planned in-place replacement, expressed in byte offsets into the
/// original content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }
}

/// Apply all edits over a stable copy of the content in a single pass,
/// back-to-front by offset so earlier replacements cannot shift later ones.
///
/// The full edit list is computed before any byte moves; the content is never
/// rescanned between edits. Overlapping or out-of-range edits are rejected.
pub fn apply_edits(content: &str, edits: &[Edit]) -> Result<String> {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    // Reject overlaps and bounds violations before touching anything
    let mut previous_start = usize::MAX;
    for edit in &ordered {
        if edit.start > edit.end || edit.end > content.len() || edit.end > previous_start {
            return Err(FixerError::InvalidEdit {
                start: edit.start,
                end: edit.end,
            });
        }
        previous_start = edit.start;
    }

    let mut result = content.to_string();
    for edit in ordered {
        result.replace_range(edit.start..edit.end, &edit.replacement);
    }
    Ok(result)
}

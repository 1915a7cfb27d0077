use crate::frontmatter::line_spans;
use std::ops::Range;

/// A legacy `@references:` trailing annotation: either an inline
/// comma-separated list or a run of bullet lines under the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAnnotation {
    /// Whole annotation, marker through last item
    pub span: Range<usize>,
    pub items: Vec<LegacyItem>,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyItem {
    pub text: String,
    pub span: Range<usize>,
}

const MARKER: &str = "@references:";

/// Find every legacy annotation in the content.
///
/// Inline form: `@references: a, b, c` (rest of the line). Bullet form: a bare
/// marker followed by `- item` lines, optionally behind `#` or `//` comment
/// prefixes as found in source files.
pub fn find_legacy_annotations(content: &str) -> Vec<LegacyAnnotation> {
    let lines: Vec<(Range<usize>, &str)> = line_spans(content).collect();
    let mut annotations = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let (range, line) = &lines[i];
        let Some(marker_col) = line.find(MARKER) else {
            i += 1;
            continue;
        };
        let marker_start = range.start + marker_col;
        let rest_start = marker_start + MARKER.len();
        let rest = &line[marker_col + MARKER.len()..];

        if !rest.trim().is_empty() {
            let items = split_inline_items(rest, rest_start);
            annotations.push(LegacyAnnotation {
                span: marker_start..range.end,
                items,
                inline: true,
            });
            i += 1;
            continue;
        }

        // Bullet form: consume following bullet lines
        let mut items = Vec::new();
        let mut end = range.end;
        let mut j = i + 1;
        while j < lines.len() {
            let (item_range, item_line) = &lines[j];
            let Some((item_text, col)) = bullet_item(item_line) else {
                break;
            };
            let start = item_range.start + col;
            items.push(LegacyItem {
                text: item_text.to_string(),
                span: start..start + item_text.len(),
            });
            end = item_range.end;
            j += 1;
        }

        if !items.is_empty() {
            annotations.push(LegacyAnnotation {
                span: marker_start..end,
                items,
                inline: false,
            });
        }
        i = j.max(i + 1);
    }

    annotations
}

fn split_inline_items(rest: &str, rest_start: usize) -> Vec<LegacyItem> {
    let mut items = Vec::new();
    let mut offset = 0;
    for piece in rest.split(',') {
        let text = piece.trim().trim_matches('*').trim();
        if !text.is_empty() {
            let lead = piece.len() - piece.trim_start().len();
            let start = rest_start + offset + lead;
            items.push(LegacyItem {
                text: text.to_string(),
                span: start..start + text.len(),
            });
        }
        offset += piece.len() + 1;
    }
    items
}

/// Parse a bullet line (`- item`, `#   - item`, `//  - item`), returning the
/// item text and its byte column.
fn bullet_item(line: &str) -> Option<(&str, usize)> {
    let stripped = line.trim_start();
    let mut col = line.len() - stripped.len();

    let rest = if let Some(r) = stripped.strip_prefix("//") {
        col += 2;
        r
    } else if let Some(r) = stripped.strip_prefix('#') {
        col += 1;
        r
    } else {
        stripped
    };

    let unindented = rest.trim_start();
    col += rest.len() - unindented.len();

    let item = unindented.strip_prefix("- ")?;
    col += 2;
    let item_trimmed = item.trim();
    if item_trimmed.is_empty() {
        return None;
    }
    col += item.len() - item.trim_start().len();
    Some((item_trimmed, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inline_annotation_splits_on_commas() {
        let content = "# header\n@references: MQP.md, ROADMAP.md, ETHIK module\nbody\n";
        let found = find_legacy_annotations(content);

        assert_eq!(found.len(), 1);
        assert!(found[0].inline);
        let texts: Vec<_> = found[0].items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["MQP.md", "ROADMAP.md", "ETHIK module"]);
        for item in &found[0].items {
            assert_eq!(&content[item.span.clone()], item.text);
        }
    }

    #[test]
    fn bullet_annotation_consumes_comment_prefixed_lines() {
        let content = "# @references:\n#   - .windsurfrules\n#   - MQP.md\nprint()\n";
        let found = find_legacy_annotations(content);

        assert_eq!(found.len(), 1);
        assert!(!found[0].inline);
        let texts: Vec<_> = found[0].items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec![".windsurfrules", "MQP.md"]);
        assert_eq!(&content[found[0].items[1].span.clone()], "MQP.md");
        // Span covers marker through the last bullet line
        assert!(content[found[0].span.clone()].ends_with("- MQP.md"));
    }

    #[test]
    fn bare_marker_without_items_is_ignored() {
        let content = "@references:\n\nnothing here\n";
        assert!(find_legacy_annotations(content).is_empty());
    }

    #[test]
    fn bold_wrapper_is_stripped_from_items() {
        let content = "**@references: MQP.md, ROADMAP.md**\n";
        let found = find_legacy_annotations(content);

        let texts: Vec<_> = found[0].items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["MQP.md", "ROADMAP.md"]);
    }
}

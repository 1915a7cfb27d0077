use crate::rules::{self, PatternMatch};
use crate::types::RawReference;
use std::path::Path;

/// Apply every pattern rule to the content and de-duplicate overlapping
/// matches by byte-offset range.
///
/// De-duplication happens here, never inside individual rules: when two rules
/// claim overlapping spans the context-aware kind wins (crossref block beats
/// the generic markdown rule for the same link), remaining ties go to the
/// earlier, longer match.
pub fn extract_references(source_file: &Path, content: &str) -> Vec<RawReference> {
    let mut matches: Vec<PatternMatch> = Vec::new();
    matches.extend(rules::crossref_blocks(content));
    matches.extend(rules::front_matter_references(content));
    matches.extend(rules::legacy_annotations(content));
    matches.extend(rules::inline_tags(content));
    matches.extend(rules::html_comments(content));
    matches.extend(rules::markdown_links(content));

    matches.sort_by(|a, b| {
        a.kind
            .priority()
            .cmp(&b.kind.priority())
            .then(a.span.start.cmp(&b.span.start))
            .then(b.span.end.cmp(&a.span.end))
    });

    let mut kept: Vec<PatternMatch> = Vec::new();
    for candidate in matches {
        let overlaps = kept
            .iter()
            .any(|k| candidate.span.start < k.span.end && k.span.start < candidate.span.end);
        if !overlaps {
            kept.push(candidate);
        }
    }

    kept.sort_by_key(|m| m.span.start);

    kept.into_iter()
        .map(|m| RawReference {
            source_file: source_file.to_path_buf(),
            display_text: m.display_text,
            target: m.target,
            kind: m.kind,
            span: m.span,
            target_span: m.target_span,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReferenceKind;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn src() -> PathBuf {
        PathBuf::from("/corpus/a.md")
    }

    #[test]
    fn block_links_are_not_double_counted_as_markdown() {
        let content = "<!-- crossref_block:start -->\n- 🔗 Reference: [b](b.md)\n<!-- crossref_block:end -->\n[c](c.md)\n";
        let refs = extract_references(&src(), content);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, ReferenceKind::CrossrefBlock);
        assert_eq!(refs[0].target, "b.md");
        assert_eq!(refs[1].kind, ReferenceKind::MarkdownLink);
        assert_eq!(refs[1].target, "c.md");
    }

    #[test]
    fn multiple_kinds_coexist_in_one_file() {
        let content = "---\nreferences:\n  - EGOS-DOC-CORE-0001\n---\n\
                       [guide](docs/guide.md)\n\
                       <!-- crossref: api -> api.md -->\n\
                       <crossref>schema -> schema.json</crossref>\n\
                       @references: MQP.md, ROADMAP.md\n";
        let refs = extract_references(&src(), content);

        let kinds: Vec<_> = refs.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&ReferenceKind::FrontMatter));
        assert!(kinds.contains(&ReferenceKind::MarkdownLink));
        assert!(kinds.contains(&ReferenceKind::HtmlComment));
        assert!(kinds.contains(&ReferenceKind::InlineTag));
        assert!(kinds.contains(&ReferenceKind::LegacyAnnotation));
        assert_eq!(refs.len(), 6);
    }

    #[test]
    fn output_is_sorted_by_offset() {
        let content = "[z](z.md) then [a](a.md)";
        let refs = extract_references(&src(), content);

        assert_eq!(refs.len(), 2);
        assert!(refs[0].span.start < refs[1].span.start);
        assert_eq!(refs[0].target, "z.md");
    }

    #[test]
    fn spans_slice_back_to_original_text() {
        let content = "see [the guide](docs/guide.md) for details";
        let refs = extract_references(&src(), content);

        assert_eq!(&content[refs[0].span.clone()], "[the guide](docs/guide.md)");
        assert_eq!(&content[refs[0].target_span.clone()], "docs/guide.md");
    }
}

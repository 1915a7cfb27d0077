use crate::types::{is_external_target, ReferenceKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Rule output before the source file is attached and overlaps are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub display_text: String,
    pub target: String,
    pub kind: ReferenceKind,
    pub span: Range<usize>,
    pub target_span: Range<usize>,
}

static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\n]+)\)").unwrap());

static CROSSREF_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!-- crossref_block:start -->(.*?)<!-- crossref_block:end -->").unwrap()
});

static BLOCK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"- 🔗 Reference: \[([^\]\n]+)\]\(([^)\n]+)\)").unwrap());

static INLINE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<crossref>\s*([^<>\n]+?)\s*->\s*([^<>\n]+?)\s*</crossref>").unwrap());

static HTML_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\s*crossref:\s*([^\s]+)\s*->\s*([^\s]+)\s*-->").unwrap());

/// Markdown inline links. Absolute URLs are tagged [`ReferenceKind::External`].
pub fn markdown_links(content: &str) -> Vec<PatternMatch> {
    MARKDOWN_LINK_RE
        .captures_iter(content)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let text = caps.get(1).unwrap();
            let target = caps.get(2).unwrap();
            let kind = if is_external_target(target.as_str()) {
                ReferenceKind::External
            } else {
                ReferenceKind::MarkdownLink
            };
            PatternMatch {
                display_text: text.as_str().to_string(),
                target: target.as_str().to_string(),
                kind,
                span: whole.range(),
                target_span: target.range(),
            }
        })
        .collect()
}

/// Bullet-style reference lines inside a delimited crossref block.
pub fn crossref_blocks(content: &str) -> Vec<PatternMatch> {
    let mut matches = Vec::new();
    for block in CROSSREF_BLOCK_RE.captures_iter(content) {
        let body = block.get(1).unwrap();
        let base = body.start();
        for caps in BLOCK_LINE_RE.captures_iter(body.as_str()) {
            let whole = caps.get(0).unwrap();
            let text = caps.get(1).unwrap();
            let target = caps.get(2).unwrap();
            matches.push(PatternMatch {
                display_text: text.as_str().to_string(),
                target: target.as_str().to_string(),
                kind: if is_external_target(target.as_str()) {
                    ReferenceKind::External
                } else {
                    ReferenceKind::CrossrefBlock
                },
                span: base + whole.start()..base + whole.end(),
                target_span: base + target.start()..base + target.end(),
            });
        }
    }
    matches
}

/// Custom inline tag: `<crossref>text -> target</crossref>`.
pub fn inline_tags(content: &str) -> Vec<PatternMatch> {
    INLINE_TAG_RE
        .captures_iter(content)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let text = caps.get(1).unwrap();
            let target = caps.get(2).unwrap();
            PatternMatch {
                display_text: text.as_str().to_string(),
                target: target.as_str().to_string(),
                kind: ReferenceKind::InlineTag,
                span: whole.range(),
                target_span: target.range(),
            }
        })
        .collect()
}

/// HTML-comment-encoded reference: `<!-- crossref: text -> target -->`.
pub fn html_comments(content: &str) -> Vec<PatternMatch> {
    HTML_COMMENT_RE
        .captures_iter(content)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let text = caps.get(1).unwrap();
            let target = caps.get(2).unwrap();
            PatternMatch {
                display_text: text.as_str().to_string(),
                target: target.as_str().to_string(),
                kind: ReferenceKind::HtmlComment,
                span: whole.range(),
                target_span: target.range(),
            }
        })
        .collect()
}

/// `references:` list entries inside the leading YAML front-matter block.
pub fn front_matter_references(content: &str) -> Vec<PatternMatch> {
    let Some(fm) = crate::frontmatter::front_matter_span(content) else {
        return Vec::new();
    };
    crate::frontmatter::references_entries(content, fm)
        .into_iter()
        .map(|entry| PatternMatch {
            display_text: entry.text.clone(),
            target: entry.text,
            kind: ReferenceKind::FrontMatter,
            span: entry.span.clone(),
            target_span: entry.span,
        })
        .collect()
}

/// Items of legacy `@references:` trailing annotations.
pub fn legacy_annotations(content: &str) -> Vec<PatternMatch> {
    crate::legacy::find_legacy_annotations(content)
        .into_iter()
        .flat_map(|ann| ann.items)
        .map(|item| PatternMatch {
            display_text: item.text.clone(),
            target: item.text,
            kind: ReferenceKind::LegacyAnnotation,
            span: item.span.clone(),
            target_span: item.span,
        })
        .collect()
}

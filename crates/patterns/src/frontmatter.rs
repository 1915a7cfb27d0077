use std::ops::Range;

/// One entry of the front-matter `references:` list, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterEntry {
    pub text: String,
    pub span: Range<usize>,
}

/// Byte range of the front-matter body (between the `---` delimiters), if the
/// content opens with one.
pub fn front_matter_span(content: &str) -> Option<Range<usize>> {
    let mut lines = line_spans(content);
    let (first_range, first) = lines.next()?;
    if first.trim_start_matches('\u{feff}').trim_end() != "---" {
        return None;
    }
    let body_start = first_range.end;
    for (range, line) in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Some(body_start..range.start);
        }
    }
    None
}

/// Entries of the `references:` list field inside the given front-matter body.
///
/// Recognizes the block form (`- item` lines indented under the key) and the
/// inline flow form (`references: [a, b]`).
pub fn references_entries(content: &str, fm: Range<usize>) -> Vec<FrontMatterEntry> {
    let body = &content[fm.clone()];
    let mut entries = Vec::new();
    let mut in_list = false;

    for (range, line) in line_spans(body) {
        let abs = fm.start + range.start;
        let trimmed = line.trim_end();

        if let Some(rest) = strip_key(trimmed, "references:") {
            in_list = true;
            let rest_trim = rest.trim();
            if let Some(flow) = rest_trim
                .strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
            {
                // references: [EGOS-DOC-ETHIK-0001, EGOS-REF-KOIOS-0002]
                let lead = rest.len() - rest.trim_start().len();
                let flow_start = abs + "references:".len() + lead + 1;
                let mut offset = 0;
                for piece in flow.split(',') {
                    let text = piece.trim();
                    if !text.is_empty() {
                        let lead = piece.len() - piece.trim_start().len();
                        let start = flow_start + offset + lead;
                        entries.push(FrontMatterEntry {
                            text: text.to_string(),
                            span: start..start + text.len(),
                        });
                    }
                    offset += piece.len() + 1;
                }
                in_list = false;
            }
            continue;
        }

        if in_list {
            let stripped = trimmed.trim_start();
            if let Some(item) = stripped.strip_prefix("- ") {
                let text = item.trim();
                if !text.is_empty() {
                    let indent = trimmed.len() - stripped.len();
                    let start = abs + indent + 2 + (item.len() - item.trim_start().len());
                    entries.push(FrontMatterEntry {
                        text: text.to_string(),
                        span: start..start + text.len(),
                    });
                }
            } else if !trimmed.trim().is_empty() {
                // Next key ends the list
                in_list = false;
            }
        }
    }

    entries
}

fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let stripped = line.trim_start();
    if line.len() != stripped.len() {
        // references: must be a top-level key
        return None;
    }
    stripped.strip_prefix(key)
}

/// Iterate lines with their byte ranges (newline excluded).
pub(crate) fn line_spans(content: &str) -> impl Iterator<Item = (Range<usize>, &str)> {
    let mut offset = 0;
    content.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        (start..start + line.len(), line)
    })
}

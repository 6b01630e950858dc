//! Heading-delimited section parser for flat Markdown.
//!
//! - Headings `#` through `######`; levels deeper than 3 are treated as 3
//! - Leading ordinals (`1.`, `2)`, `1.1`) are stripped from titles
//! - Lines inside fenced code blocks are never headings
//! - Text before the first heading is not part of any section

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

/// Deepest level kept; deeper headings are folded into it.
pub const MAX_LEVEL: u8 = 3;

/// Id of the synthetic section produced for heading-less text.
pub const FALLBACK_ID: &str = "documentation";

/// Title of the synthetic section produced for heading-less text.
pub const FALLBACK_TITLE: &str = "Documentation";

/// Separator used in composite section ids.
pub const ID_SEPARATOR: &str = " > ";

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches an ATX heading line.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").expect("heading regex"));

/// Matches `1. `, `2) `, `1.1 `, `3.2.1. ` at the start of a title.
static ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)*[.)]|\d+(?:\.\d+)+)\s+").expect("ordinal regex")
});

/// Matches the opening or closing line of a fenced code block.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(`{3,}|~{3,})").expect("fence regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One heading and the text under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSection {
    /// Composite key: enclosing level-1/level-2 titles plus this title.
    pub id: String,
    pub title: String,
    /// Heading line through just before the next heading.
    pub content: String,
    /// 1, 2 or 3.
    pub level: u8,
    /// Titles of the enclosing level-1/level-2 sections, outermost first.
    pub ancestors: Vec<String>,
}

struct Heading {
    offset: usize,
    level: u8,
    title: String,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Split `markdown` into sections at every heading, in document order.
///
/// Blank input yields no sections; non-blank input without headings yields a
/// single `documentation` section holding the whole trimmed text.
#[instrument(skip_all, fields(len = markdown.len()))]
pub fn parse_sections(markdown: &str) -> Vec<DocSection> {
    if markdown.trim().is_empty() {
        return Vec::new();
    }

    let headings = scan_headings(markdown);
    if headings.is_empty() {
        debug!("no headings found, using a single fallback section");
        return vec![DocSection {
            id: FALLBACK_ID.to_string(),
            title: FALLBACK_TITLE.to_string(),
            content: markdown.trim().to_string(),
            level: 1,
            ancestors: Vec::new(),
        }];
    }

    let mut sections = Vec::with_capacity(headings.len());
    let mut current_h1: Option<String> = None;
    let mut current_h2: Option<String> = None;
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (i, heading) in headings.iter().enumerate() {
        let end = headings
            .get(i + 1)
            .map(|next| next.offset)
            .unwrap_or(markdown.len());
        let content = markdown[heading.offset..end].trim_end().to_string();

        let ancestors: Vec<String> = match heading.level {
            1 => {
                current_h1 = Some(heading.title.clone());
                current_h2 = None;
                Vec::new()
            }
            2 => {
                let ancestors: Vec<String> = current_h1.iter().cloned().collect();
                current_h2 = Some(heading.title.clone());
                ancestors
            }
            _ => current_h1.iter().chain(current_h2.iter()).cloned().collect(),
        };

        let mut id = ancestors
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(heading.title.as_str()))
            .collect::<Vec<_>>()
            .join(ID_SEPARATOR);

        // Repeated titles would collide; later occurrences get a counter.
        let count = seen.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            id = format!("{id} #{count}");
        }

        sections.push(DocSection {
            id,
            title: heading.title.clone(),
            content,
            level: heading.level,
            ancestors,
        });
    }

    debug!(sections = sections.len(), "markdown split into sections");
    sections
}

/// Find heading lines (outside code fences) with their byte offsets.
fn scan_headings(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut fence: Option<char> = None;
    let mut offset = 0;

    for raw_line in markdown.split_inclusive('\n') {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let line_offset = offset;
        offset += raw_line.len();

        if let Some(caps) = FENCE_RE.captures(line) {
            let marker = caps[1].chars().next().unwrap_or('`');
            fence = match fence {
                None => Some(marker),
                Some(open) if open == marker => None,
                other => other,
            };
            continue;
        }
        if fence.is_some() {
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            let level = (caps[1].len() as u8).min(MAX_LEVEL);
            headings.push(Heading {
                offset: line_offset,
                level,
                title: clean_title(&caps[2]),
            });
        }
    }

    headings
}

/// Strip closing hashes and a leading ordinal from heading text.
///
/// Either step is skipped when it would leave nothing behind.
fn clean_title(raw: &str) -> String {
    let raw = raw.trim();
    let text = match raw.trim_end_matches('#').trim() {
        "" => raw,
        text => text,
    };
    let stripped = ORDINAL_RE.replace(text, "");
    if stripped.trim().is_empty() {
        text.to_string()
    } else {
        stripped.trim().to_string()
    }
}

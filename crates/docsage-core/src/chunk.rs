//! Heading-aware markdown chunker.
//!
//! Splits a markdown document into [`Chunk`]s that respect a soft
//! `max_chars` budget while keeping document and section context attached
//! to every chunk.
//!
//! # Algorithm
//!
//! 1. Extract the document title: the first line starting with `# `
//!    (but not `## `). The title stays in the body; it is only reused as
//!    a context prefix.
//! 2. Split the document into sections on whole-line `## ` headings.
//!    Content before the first heading becomes the preamble section.
//! 3. For each section, compose `title + heading + body` separated by blank
//!    lines. The preamble never repeats the title.
//! 4. If the composed text fits in `max_chars`, emit it as one chunk.
//! 5. Otherwise split the body on blank-line runs and greedily pack
//!    paragraphs, prefixing every sub-chunk with the title and heading.
//!    A paragraph is never split; a single paragraph larger than the
//!    budget is emitted whole.
//!
//! Lengths are measured in characters (Unicode scalar values), not bytes.
//!
//! # Example
//!
//! ```rust
//! use docsage_core::chunk::chunk_markdown;
//!
//! let text = "# Guide\n\nWelcome.\n\n## Install\n\nRun the installer.";
//! let chunks = chunk_markdown(text, 1500);
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks[0].section, "(intro)");
//! assert_eq!(chunks[1].text, "# Guide\n\n## Install\n\nRun the installer.");
//! assert_eq!(chunks[1].section, "Install");
//! ```

use crate::models::{Chunk, Section, INTRO_SECTION};

/// Default chunk size bound, in characters.
pub const DEFAULT_MAX_CHARS: usize = 1500;

const TITLE_MARKER: &str = "# ";
const SECTION_MARKER: &str = "## ";
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Split a markdown document into heading-aware chunks, in document order.
///
/// Pure and deterministic: the same input always yields the same output.
/// An empty or whitespace-only document yields no chunks.
pub fn chunk_markdown(text: &str, max_chars: usize) -> Vec<Chunk> {
    let title = extract_title(text);
    split_sections(text)
        .iter()
        .flat_map(|section| assemble_section(section, &title, max_chars))
        .collect()
}

/// Return the first `# Title` line (trimmed, marker kept), or an empty string.
///
/// Lines starting with `## ` are never taken for a title. Lines break on
/// every Unicode line boundary, not only `\n`.
pub fn extract_title(text: &str) -> String {
    text.split(is_line_boundary)
        .map(str::trim)
        .find(|line| line.starts_with(TITLE_MARKER) && !line.starts_with(SECTION_MARKER))
        .unwrap_or_default()
        .to_string()
}

/// `\r\n` splits twice, leaving an empty line that never matches a title.
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Whether a whole line (without its newline) is a level-2 heading.
///
/// The marker must be followed by at least one character.
pub fn is_section_heading(line: &str) -> bool {
    line.strip_prefix(SECTION_MARKER)
        .is_some_and(|rest| !rest.is_empty())
}

/// Partition a document into ordered `(heading, body)` sections.
///
/// The preamble (text before the first heading) is included with an empty
/// heading only when it is non-empty after trimming. Every heading yields a
/// section, even when its body is empty.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading: Option<&str> = None;
    let mut body_start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        if is_section_heading(content) {
            push_section(&mut sections, heading, &text[body_start..offset]);
            heading = Some(content);
            body_start = offset + line.len();
        }
        offset += line.len();
    }
    push_section(&mut sections, heading, &text[body_start..]);

    sections
}

fn push_section(sections: &mut Vec<Section>, heading: Option<&str>, body: &str) {
    let body = body.trim();
    match heading {
        None if body.is_empty() => {}
        None => sections.push(Section {
            heading: String::new(),
            body: body.to_string(),
        }),
        Some(heading) => sections.push(Section {
            heading: heading.trim().to_string(),
            body: body.to_string(),
        }),
    }
}

/// Human-readable label for a section heading.
///
/// Strips leading `#` and space characters; an empty heading maps to
/// `"(intro)"`.
pub fn section_label(heading: &str) -> String {
    if heading.is_empty() {
        return INTRO_SECTION.to_string();
    }
    heading
        .trim_start_matches(|c| c == '#' || c == ' ')
        .trim()
        .to_string()
}

/// Compose one section into one or more chunks.
///
/// The title is included only when both title and heading are present.
/// Oversized sections are delegated to [`split_section_by_paragraphs`].
/// Never returns an empty or whitespace-only chunk.
pub fn assemble_section(section: &Section, title: &str, max_chars: usize) -> Vec<Chunk> {
    let label = section_label(&section.heading);

    let mut parts: Vec<&str> = Vec::with_capacity(3);
    if !title.is_empty() && !section.heading.is_empty() {
        parts.push(title);
    }
    if !section.heading.is_empty() {
        parts.push(&section.heading);
    }
    if !section.body.is_empty() {
        parts.push(&section.body);
    }
    let full_text = parts.join(PARAGRAPH_SEPARATOR);

    if full_text.trim().is_empty() {
        return Vec::new();
    }

    if char_len(&full_text) <= max_chars {
        return vec![Chunk {
            text: full_text,
            section: label,
        }];
    }

    split_section_by_paragraphs(&section.body, title, &section.heading, max_chars)
        .into_iter()
        .map(|text| Chunk {
            text,
            section: label.clone(),
        })
        .collect()
}

/// Split an oversized section body into sub-chunks at paragraph boundaries.
///
/// Every sub-chunk starts with the same `title + heading` prefix. Paragraphs
/// are packed greedily and never split; a paragraph that alone exceeds
/// `max_chars` becomes its own sub-chunk.
///
/// If no paragraph survives trimming, the trimmed body is returned as a
/// single unprefixed sub-chunk, or the trimmed prefix when the body is
/// empty too.
pub fn split_section_by_paragraphs(
    body: &str,
    title: &str,
    heading: &str,
    max_chars: usize,
) -> Vec<String> {
    let mut prefix = String::new();
    if !title.is_empty() {
        prefix.push_str(title);
        prefix.push_str(PARAGRAPH_SEPARATOR);
    }
    if !heading.is_empty() {
        prefix.push_str(heading);
        prefix.push_str(PARAGRAPH_SEPARATOR);
    }
    let prefix_len = char_len(&prefix);

    let mut chunks = Vec::new();
    let mut current = prefix.clone();
    let mut current_len = prefix_len;
    let mut held = 0usize;

    for para in split_paragraphs(body) {
        let para_len = char_len(para) + PARAGRAPH_SEPARATOR.len();
        if current_len + para_len <= max_chars {
            current.push_str(para);
            current.push_str(PARAGRAPH_SEPARATOR);
            current_len += para_len;
            held += 1;
            continue;
        }

        if held > 0 {
            chunks.push(current.trim().to_string());
        }
        current = format!("{prefix}{para}{PARAGRAPH_SEPARATOR}");
        current_len = prefix_len + para_len;
        held = 1;
    }

    if held > 0 {
        chunks.push(current.trim().to_string());
    }

    if chunks.is_empty() {
        let fallback = match body.trim() {
            "" => prefix.trim(),
            trimmed => trimmed,
        };
        if !fallback.is_empty() {
            chunks.push(fallback.to_string());
        }
    }

    chunks
}

/// Split text on runs of two or more `\n`, returning trimmed, non-empty
/// paragraphs in order.
///
/// A line holding only spaces does not count as a separator.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut paragraphs = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\n' {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < bytes.len() && bytes[i] == b'\n' {
            i += 1;
        }
        if i - run_start >= 2 {
            paragraphs.push(&text[start..run_start]);
            start = i;
        }
    }
    paragraphs.push(&text[start..]);

    paragraphs
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Length in characters, the unit of the `max_chars` budget.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

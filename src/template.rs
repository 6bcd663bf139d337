use crate::template::vocabulary::VariableVocabulary;

pub mod vocabulary;

/// One piece of a prompt template: literal text, or an atomic variable chip.
/// A chip stores the bare variable name; its canonical form is `{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Chip(String),
}

impl Segment {
    /// The canonical contribution of this segment to the template string.
    /// Chip decoration (the delete glyph drawn next to a chip) is a display
    /// concern and never appears here.
    pub fn canonical(&self) -> String {
        match self {
            Segment::Text(text) => text.clone(),
            Segment::Chip(name) => format!("{{{name}}}"),
        }
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Returns the bare names of all well-formed `{identifier}` tokens in the
/// template, known or not, in order of occurrence.
pub fn scan_tokens(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = value;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let end = after
            .find(|ch: char| !is_identifier_char(ch))
            .unwrap_or(after.len());
        if end > 0 && after[end..].starts_with('}') {
            tokens.push(&after[..end]);
            rest = &after[end + 1..];
        } else {
            rest = after;
        }
    }
    tokens
}

/// Splits a canonical template string into segments. A `{identifier}`
/// substring becomes a chip only when the identifier is a member of the
/// vocabulary; any other `{...}` text (unknown name, unclosed brace,
/// non-identifier interior) stays literal text. Never fails.
pub fn parse_segments(value: &str, vocabulary: &VariableVocabulary) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = value;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let end = after
            .find(|ch: char| !is_identifier_char(ch))
            .unwrap_or(after.len());
        if end > 0 && after[end..].starts_with('}') && vocabulary.contains_name(&after[..end]) {
            text.push_str(&rest[..open]);
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Chip(after[..end].to_string()));
            rest = &after[end + 1..];
        } else {
            text.push_str(&rest[..=open]);
            rest = after;
        }
    }

    text.push_str(rest);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

/// Rebuilds the canonical template string from a segment list. For any input
/// string `s`, `canonical_text(&parse_segments(s, v)) == s`.
pub fn canonical_text(segments: &[Segment]) -> String {
    segments.iter().map(Segment::canonical).collect()
}

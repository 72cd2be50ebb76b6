//! Coded-subtree selection.
//!
//! Coding queries mark subtrees by inserting a coding node as the first
//! child of the coded constituent: `(IP-MAT (CODING ipHead=V:coord=0) …)`.
//! This module finds every such subtree and yields its terminal nodes.
//!
//! Coding subtrees can nest. To keep terminal yields disjoint, candidates
//! are processed in ascending order of their end offset: a strictly nested
//! span always closes before its ancestor, so the innermost span is
//! consumed first. Consumed spans are overwritten in a working buffer with
//! placeholder bytes, addressed by offset rather than by content search,
//! so an enclosing span cannot re-extract the inner terminals and two
//! textually identical coding spans cannot shadow each other.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::psd::spans::{match_parens, SpanError};
use crate::psd::terminals::{extract_terminals, TerminalNode};

/// Coding-marker label used by CorpusSearch coding queries.
pub const DEFAULT_CODING_LABEL: &str = "CODING";

const PLACEHOLDER_BYTE: u8 = b'X';

/// One coding subtree with its full terminal yield.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodedSpan {
    /// Byte offset of the subtree's opening paren in the original text.
    pub start: usize,
    /// Byte offset of the matching closing paren.
    pub end: usize,
    /// `attribute=value:attribute=value` payload of the coding node.
    pub features: Option<String>,
    /// Terminal yield in nesting order, excluding the coding node itself
    /// and excluding terminals already consumed by a nested coding span.
    pub terminals: Vec<TerminalNode>,
}

/// Errors raised during coded-span selection.
#[derive(Debug, Clone, PartialEq)]
pub enum CodingError {
    /// The text's parentheses do not balance.
    Span(SpanError),
    /// A matched coding opener has no entry in the span map. Cannot occur
    /// for text that passed parenthesis matching; checked defensively.
    Structural { offset: usize },
}

impl std::fmt::Display for CodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodingError::Span(err) => write!(f, "{}", err),
            CodingError::Structural { offset } => {
                write!(f, "coding opener at byte offset {} has no matching span", offset)
            }
        }
    }
}

impl std::error::Error for CodingError {}

impl From<SpanError> for CodingError {
    fn from(err: SpanError) -> Self {
        CodingError::Span(err)
    }
}

static CODING_LABEL_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s()]+").unwrap());

/// Select every coding subtree of `text`, innermost first, and return the
/// spans sorted by start offset.
pub fn select_coded(text: &str, coding_label: &str) -> Result<Vec<CodedSpan>, CodingError> {
    let spans = match_parens(text)?;
    // The label must end at a `-` suffix or whitespace, the same
    // boundary rule `is_coding_tag` applies; a longer label sharing the
    // prefix (e.g. CODINGX) is not a coding node.
    let opener = Regex::new(&format!(
        r"\([^\s()]+\s+\({}[-\s]",
        regex::escape(coding_label)
    ))
    .expect("escaped coding label forms a valid pattern");

    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for found in opener.find_iter(text) {
        let start = found.start();
        let end = spans
            .matching(start)
            .ok_or(CodingError::Structural { offset: start })?;
        candidates.push((start, end));
    }
    // Innermost first: a nested span's end offset is strictly smaller
    // than its ancestor's.
    candidates.sort_by_key(|&(_, end)| end);

    let mut buf = text.as_bytes().to_vec();
    let mut selected = Vec::with_capacity(candidates.len());
    for (start, end) in candidates {
        let span_text = String::from_utf8_lossy(&buf[start..=end]).into_owned();
        let (features, terminals) = split_coding_yield(&span_text, coding_label);
        for byte in &mut buf[start..=end] {
            *byte = PLACEHOLDER_BYTE;
        }
        selected.push(CodedSpan {
            start,
            end,
            features,
            terminals,
        });
    }
    selected.sort_by_key(|span| span.start);
    Ok(selected)
}

/// Separate the coding node (metadata) from the real terminal yield.
/// The coding node matches the terminal pattern (`(CODING a=b:c=d)`) but
/// carries features, not a word.
fn split_coding_yield(
    span_text: &str,
    coding_label: &str,
) -> (Option<String>, Vec<TerminalNode>) {
    let mut features = None;
    let mut terminals = Vec::new();
    for node in extract_terminals(span_text) {
        if is_coding_tag(&node.tag, coding_label) {
            if features.is_none() {
                features = Some(node.form);
            }
        } else {
            terminals.push(node);
        }
    }
    (features, terminals)
}

/// `CODING` itself or a suffixed variant like `CODING-IP`.
fn is_coding_tag(tag: &str, coding_label: &str) -> bool {
    match CODING_LABEL_SPLIT.find(tag) {
        Some(head) => {
            let head = head.as_str();
            head == coding_label
                || (head.starts_with(coding_label)
                    && head[coding_label.len()..].starts_with('-'))
        }
        None => false,
    }
}

//! Terminal node extraction.
//!
//! A terminal node is a leaf subtree `(TAG form)`: an opening paren, a run
//! of non-paren non-space tag characters, one space, a run of non-paren
//! characters, and the closing paren. Because the form run excludes
//! parentheses, no nested subtree can match, so extraction is a flat
//! regex scan with no recursive descent.
//!
//! Forms are returned verbatim. Inline annotation (`word@l=lemma@t=tag`)
//! is not split here; interpreting markers is the consumer's job (see
//! [`crate::psd::annotation`]). A malformed form containing whitespace is
//! still returned rather than rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Pattern for one terminal node. Shared by the numberer, which needs the
/// same match boundaries to place positional tags.
pub(crate) static TERMINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^\s()]+) ([^()]+)\)").unwrap());

/// One `(TAG form)` leaf, produced fresh per extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalNode {
    pub tag: String,
    pub form: String,
}

impl TerminalNode {
    pub fn new(tag: impl Into<String>, form: impl Into<String>) -> Self {
        TerminalNode {
            tag: tag.into(),
            form: form.into(),
        }
    }
}

/// Extract the ordered list of terminal nodes contained in `span_text`,
/// skipping internal (non-leaf) nodes.
pub fn extract_terminals(span_text: &str) -> Vec<TerminalNode> {
    TERMINAL
        .captures_iter(span_text)
        .map(|caps| TerminalNode::new(&caps[1], &caps[2]))
        .collect()
}

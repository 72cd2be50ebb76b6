//! Terminal numbering.
//!
//! Numbering walks a sentence left to right and appends a positional tag
//! `#<n>` immediately after the closing paren of every terminal node,
//! producing a numbered copy of the sentence plus one entry per terminal
//! for the downstream tagger protocol.
//!
//! Position ids must be dense and file-global: the counter is owned by
//! the caller and never reset between sentences, so the tagger's flat
//! per-word stream aligns one-to-one with ids across sentence boundaries.
//! Non-taggable terminals (ID nodes, traces, markup) still consume an id;
//! they are only excluded from the tagger-facing outputs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::psd::annotation::{self, DEFAULT_LEMMA_CODE, PLACEHOLDER};
use crate::psd::terminals::TERMINAL;

/// File-global position counter, owned by the caller.
///
/// Explicit rather than ambient so a future per-sentence partitioning of
/// id ranges stays possible; the numbered copy and the position list it
/// produced are only valid together with one counter run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionCounter {
    next: u64,
}

impl PositionCounter {
    pub fn new() -> Self {
        PositionCounter::default()
    }

    /// Counter whose first issued id is `n`.
    pub fn starting_at(n: u64) -> Self {
        PositionCounter { next: n }
    }

    /// The id the next terminal will receive.
    pub fn peek(&self) -> u64 {
        self.next
    }

    fn advance(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Classification of a numbered terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TerminalKind {
    /// An ordinary word, candidate for tagging.
    Word,
    /// ID node or empty category (`*...` trace, `0`).
    Ignorable,
    /// Line-break markup node.
    LineBreak,
    /// Contracted-form markup node.
    Contraction,
}

/// One numbered terminal with its tagger-protocol fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionEntry {
    pub id: u64,
    /// Normalized word form (case and character substitutions applied).
    pub word: String,
    /// Normalized tag (indices and composition markers stripped).
    pub tag: String,
    /// Lemma parsed from inline annotation, or `NA`.
    pub lemma: String,
    pub kind: TerminalKind,
    /// Whether this entry belongs in the tagger-facing word list.
    pub taggable: bool,
}

/// A numbered sentence: the rewritten copy plus its position entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedSentence {
    pub numbered: String,
    pub entries: Vec<PositionEntry>,
}

static UPPERCASE_FORM_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(NPR|NUM)").unwrap());
static TRACE_FORM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\*|0)").unwrap());

/// Number every terminal of `sentence` with the default lemma code.
pub fn number(sentence: &str, counter: &mut PositionCounter) -> NumberedSentence {
    number_with(sentence, counter, DEFAULT_LEMMA_CODE)
}

/// Number every terminal of `sentence`, reading inline lemmas from
/// `@<lemma_code>=` markers.
pub fn number_with(
    sentence: &str,
    counter: &mut PositionCounter,
    lemma_code: &str,
) -> NumberedSentence {
    let mut numbered = String::with_capacity(sentence.len() + 64);
    let mut entries = Vec::new();
    let mut last = 0;
    for caps in TERMINAL.captures_iter(sentence) {
        let whole = caps.get(0).expect("regex match has a group 0");
        let id = counter.advance();
        numbered.push_str(&sentence[last..whole.end()]);
        numbered.push('#');
        numbered.push_str(&id.to_string());
        last = whole.end();
        entries.push(classify_terminal(id, &caps[1], &caps[2], lemma_code));
    }
    numbered.push_str(&sentence[last..]);
    NumberedSentence { numbered, entries }
}

fn classify_terminal(id: u64, raw_tag: &str, raw_form: &str, lemma_code: &str) -> PositionEntry {
    let mut word = raw_form.replace('$', "").replace("<slash>", "/");
    if !UPPERCASE_FORM_TAG.is_match(raw_tag) {
        word = word.to_lowercase();
    }
    let tag = normalize_tag(raw_tag);

    let kind = if raw_tag.starts_with("ID") || TRACE_FORM.is_match(&word) {
        TerminalKind::Ignorable
    } else if raw_tag.starts_with("LINEBREAK") {
        TerminalKind::LineBreak
    } else if raw_tag.starts_with("CNJCTR") {
        TerminalKind::Contraction
    } else {
        TerminalKind::Word
    };

    let (word, lemma) = match annotation::split_form(&word, lemma_code) {
        Some(split) => (split.word, split.lemma),
        None => (word, PLACEHOLDER.to_string()),
    };

    // Words carrying residual markup never reach the tagger.
    let taggable = kind == TerminalKind::Word && !word.contains(['<', '{']);

    PositionEntry {
        id,
        word,
        tag,
        lemma,
        kind,
        taggable,
    }
}

/// Normalize a part-of-speech tag: truncate at the first digit, truncate
/// at `+` (composed tags), delete `-` and stray spaces.
pub fn normalize_tag(tag: &str) -> String {
    let cut = tag
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(tag.len());
    let tag = &tag[..cut];
    let cut = tag.find('+').unwrap_or(tag.len());
    tag[..cut].chars().filter(|&c| c != '-' && c != ' ').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_terminal_with_offset_counter() {
        let mut counter = PositionCounter::starting_at(5);
        let out = number("(V barks)", &mut counter);
        assert_eq!(out.numbered, "(V barks)#5");
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].id, 5);
        assert_eq!(out.entries[0].word, "barks");
        assert_eq!(counter.peek(), 6);
    }

    #[test]
    fn test_ids_dense_over_all_terminals() {
        let mut counter = PositionCounter::new();
        let text = "(IP (ID doc.1) (NP (NP-SBJ *pro*) (V vint)))";
        let out = number(text, &mut counter);
        let ids: Vec<u64> = out.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        // ID node and trace consume ids but are not taggable
        assert!(!out.entries[0].taggable);
        assert!(!out.entries[1].taggable);
        assert!(out.entries[2].taggable);
    }

    #[test]
    fn test_counter_spans_sentences() {
        let mut counter = PositionCounter::new();
        number("(V a)", &mut counter);
        let out = number("(V b)", &mut counter);
        assert_eq!(out.numbered, "(V b)#1");
    }

    #[test]
    fn test_case_normalization_spares_proper_nouns() {
        let mut counter = PositionCounter::new();
        let out = number("(S (NPR Rome) (V Fell))", &mut counter);
        assert_eq!(out.entries[0].word, "Rome");
        assert_eq!(out.entries[1].word, "fell");
    }

    #[test]
    fn test_word_character_substitutions() {
        let mut counter = PositionCounter::new();
        let out = number("(N hors$) (N a<slash>b)", &mut counter);
        assert_eq!(out.entries[0].word, "hors");
        assert_eq!(out.entries[1].word, "a/b");
    }

    #[test]
    fn test_inline_lemma_split_into_entry() {
        let mut counter = PositionCounter::new();
        let out = number("(VJ vint@l=venir@t=VERcjg)", &mut counter);
        assert_eq!(out.entries[0].word, "vint");
        assert_eq!(out.entries[0].lemma, "venir");
    }

    #[test]
    fn test_no_lemma_yields_placeholder() {
        let mut counter = PositionCounter::new();
        let out = number("(V barks)", &mut counter);
        assert_eq!(out.entries[0].lemma, "NA");
    }

    #[test]
    fn test_markup_terminals_classified() {
        let mut counter = PositionCounter::new();
        let out = number("(LINEBREAK lb) (CNJCTR c) (N word)", &mut counter);
        assert_eq!(out.entries[0].kind, TerminalKind::LineBreak);
        assert_eq!(out.entries[1].kind, TerminalKind::Contraction);
        assert_eq!(out.entries[2].kind, TerminalKind::Word);
        assert!(!out.entries[0].taggable);
        assert!(!out.entries[1].taggable);
    }

    #[test]
    fn test_residual_markup_words_not_taggable() {
        let mut counter = PositionCounter::new();
        let out = number("(N <gap>) (N {COM:x})", &mut counter);
        assert!(out.entries.iter().all(|e| !e.taggable));
        assert_eq!(out.entries.len(), 2);
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("VB21"), "VB");
        assert_eq!(normalize_tag("NEG+VB"), "NEG");
        assert_eq!(normalize_tag("NP-SBJ"), "NPSBJ");
        assert_eq!(normalize_tag("VERcjg"), "VERcjg");
    }

    #[test]
    fn test_numbered_copy_preserves_structure() {
        let mut counter = PositionCounter::new();
        let text = "(S (NP (D the) (N dog)) (VP (V barks)))";
        let out = number(text, &mut counter);
        assert_eq!(
            out.numbered,
            "(S (NP (D the)#0 (N dog)#1) (VP (V barks)#2))"
        );
    }
}

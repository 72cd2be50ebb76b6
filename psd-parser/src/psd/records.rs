//! Corpus records and whole-file runs.
//!
//! A corpus file is a stream of records separated by blank lines. Most
//! records are sentences carrying an `(ID …)` node; the rest are
//! meta-textual markup (`( (CODE …)` document-boundary records) or
//! non-bracket noise that is copied through untouched.
//!
//! `number_corpus` is the first pass of the two-pass tagging protocol:
//! it numbers every record with one file-global counter and accumulates
//! the numbered copy, the `#id<TAB>word` position list, and the
//! words-only tagger input (blank line per sentence, the line contract
//! the external tagger must preserve). The unit of failure is one
//! record: a sentence whose parentheses do not balance is reported,
//! copied through un-numbered, and counted as skipped; the run goes on.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::psd::annotation::DEFAULT_LEMMA_CODE;
use crate::psd::numbering::{number_with, PositionCounter, PositionEntry};
use crate::psd::spans::match_parens;

static CODE_RECORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\( \(CODE ([^()]+)\)").unwrap());
static ID_NODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(ID ([^()]+)\)").unwrap());

/// Classification of one blank-line-separated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<'a> {
    /// Meta-textual markup record, `( (CODE …)` with no sentence body.
    Markup { code: String, text: &'a str },
    /// No bracket structure at all; copied through untouched.
    Ignorable { text: &'a str },
    /// A sentence. `id` is `None` when the `(ID …)` node is missing,
    /// which is a reported anomaly but not fatal.
    Sentence { id: Option<String>, text: &'a str },
}

/// Classify one record.
pub fn classify(record: &str) -> Record<'_> {
    let trimmed = record.trim_start();
    if let Some(caps) = CODE_RECORD.captures(trimmed) {
        return Record::Markup {
            code: caps[1].trim().to_string(),
            text: record,
        };
    }
    if !record.contains("))") {
        return Record::Ignorable { text: record };
    }
    let id = ID_NODE.captures(record).map(|caps| caps[1].to_string());
    Record::Sentence { id, text: record }
}

/// Counts reported at the end of a corpus run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub sentences: usize,
    pub markup: usize,
    pub ignorable: usize,
    /// Terminals numbered, taggable or not.
    pub terminals: usize,
    /// Terminals written to the tagger-facing lists.
    pub taggable: usize,
    /// Sentences without an `(ID …)` node.
    pub missing_ids: usize,
    /// Records skipped for unbalanced parentheses.
    pub skipped: usize,
}

/// Output of one corpus numbering run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedCorpus {
    /// The whole file with `#n` tags appended to every terminal.
    pub numbered: String,
    /// `#id<TAB>word` per taggable terminal, blank line per sentence.
    pub nodes: String,
    /// One word per line per taggable terminal, blank line per sentence.
    pub tagme: String,
    pub summary: RunSummary,
}

/// Number every record of `content` with the default lemma code.
pub fn number_corpus(content: &str, counter: &mut PositionCounter) -> NumberedCorpus {
    number_corpus_with(content, counter, DEFAULT_LEMMA_CODE)
}

/// Number every record of `content`, reading inline lemmas from
/// `@<lemma_code>=` markers.
pub fn number_corpus_with(
    content: &str,
    counter: &mut PositionCounter,
    lemma_code: &str,
) -> NumberedCorpus {
    let mut numbered_parts: Vec<String> = Vec::new();
    let mut nodes = String::new();
    let mut tagme = String::new();
    let mut summary = RunSummary::default();

    // Splitting keeps empty segments so re-joining reproduces the
    // original blank-line layout byte for byte.
    for (index, segment) in content.split("\n\n").enumerate() {
        if segment.trim().is_empty() {
            numbered_parts.push(segment.to_string());
            continue;
        }
        summary.records += 1;
        match classify(segment) {
            Record::Markup { .. } => {
                summary.markup += 1;
                let out = number_with(segment, counter, lemma_code);
                summary.terminals += out.entries.len();
                numbered_parts.push(out.numbered);
            }
            Record::Ignorable { .. } => {
                summary.ignorable += 1;
                let out = number_with(segment, counter, lemma_code);
                summary.terminals += out.entries.len();
                numbered_parts.push(out.numbered);
            }
            Record::Sentence { id, .. } => {
                if let Err(err) = match_parens(segment) {
                    eprintln!(
                        ">>>>> record {} skipped ({}): {}",
                        index + 1,
                        err,
                        first_line(segment)
                    );
                    summary.skipped += 1;
                    numbered_parts.push(segment.to_string());
                    continue;
                }
                summary.sentences += 1;
                if id.is_none() {
                    eprintln!(
                        ">>>>> ID not found in record {}: {}",
                        index + 1,
                        first_line(segment)
                    );
                    summary.missing_ids += 1;
                }
                let out = number_with(segment, counter, lemma_code);
                summary.terminals += out.entries.len();
                append_tagger_lines(&out.entries, &mut nodes, &mut tagme, &mut summary);
                numbered_parts.push(out.numbered);
            }
        }
    }

    NumberedCorpus {
        numbered: numbered_parts.join("\n\n"),
        nodes,
        tagme,
        summary,
    }
}

fn append_tagger_lines(
    entries: &[PositionEntry],
    nodes: &mut String,
    tagme: &mut String,
    summary: &mut RunSummary,
) {
    for entry in entries.iter().filter(|entry| entry.taggable) {
        summary.taggable += 1;
        nodes.push('#');
        nodes.push_str(&entry.id.to_string());
        nodes.push('\t');
        nodes.push_str(&entry.word);
        nodes.push('\n');
        tagme.push_str(&entry.word);
        tagme.push('\n');
    }
    // The tagger protocol marks sentence boundaries with a blank line.
    nodes.push('\n');
    tagme.push('\n');
}

/// One word/tag/lemma row per taggable terminal, the flat corpus listing.
/// `columns` selects 1 (word), 2 (word, tag) or 3 (word, tag, lemma).
pub fn token_rows(content: &str, lemma_code: &str, columns: u8) -> String {
    let mut rows = String::new();
    let mut counter = PositionCounter::new();
    for segment in content.split("\n\n") {
        if segment.trim().is_empty() {
            continue;
        }
        if let Record::Sentence { .. } = classify(segment) {
            if match_parens(segment).is_err() {
                continue;
            }
            let out = number_with(segment, &mut counter, lemma_code);
            for entry in out.entries.iter().filter(|entry| entry.taggable) {
                if entry.word.is_empty() || entry.tag.is_empty() || entry.lemma.is_empty() {
                    eprintln!(
                        ">>>>> skipping incomplete token at #{}: word={:?} tag={:?} lemma={:?}",
                        entry.id, entry.word, entry.tag, entry.lemma
                    );
                    continue;
                }
                match columns {
                    1 => rows.push_str(&entry.word),
                    2 => {
                        rows.push_str(&entry.word);
                        rows.push('\t');
                        rows.push_str(&entry.tag);
                    }
                    _ => {
                        rows.push_str(&entry.word);
                        rows.push('\t');
                        rows.push_str(&entry.tag);
                        rows.push('\t');
                        rows.push_str(&entry.lemma);
                    }
                }
                rows.push('\n');
            }
        }
    }
    rows
}

fn first_line(record: &str) -> &str {
    record.lines().next().unwrap_or(record)
}

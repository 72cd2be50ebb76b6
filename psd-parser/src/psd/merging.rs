//! Positional merge of external annotation.
//!
//! The external tagger returns tab-separated rows keyed by position id.
//! Merging rewrites a numbered copy in a single pass over `)#<id>`
//! occurrences: the row's payload is inserted immediately before the
//! closing paren and the positional tag is removed. Ids without a row
//! just lose their tag, so merging an empty table is the identity on
//! structure and `number` followed by `merge` never desynchronizes the
//! annotation from the source text.
//!
//! Row hygiene happens at parse time: a row with the wrong field count is
//! logged and skipped, a lemma that would corrupt bracket balance is
//! replaced with a safe fallback, and a duplicate position id is fatal
//! because it means the numbered copy and the row file no longer belong
//! to the same numbering run.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Marker codes used to format merged payloads, e.g. `@l=…@t=…`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeMarkers {
    pub lemma: String,
    pub tag: String,
}

impl MergeMarkers {
    /// Primary-layer markers `@l=` / `@t=`.
    pub fn primary() -> Self {
        MergeMarkers {
            lemma: "l".to_string(),
            tag: "t".to_string(),
        }
    }

    /// Secondary-layer markers `@rl=` / `@rt=`, the convention for
    /// tagger-produced annotation merged next to an existing layer.
    pub fn secondary() -> Self {
        MergeMarkers {
            lemma: "rl".to_string(),
            tag: "rt".to_string(),
        }
    }
}

impl Default for MergeMarkers {
    fn default() -> Self {
        MergeMarkers::primary()
    }
}

/// Errors that abort a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    /// Two rows carry the same position id: the row file cannot belong to
    /// the numbered copy's numbering run, so no safe merge exists.
    DuplicatePositionId { id: u64 },
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeError::DuplicatePositionId { id } => {
                write!(f, "duplicate position id #{} in annotation rows", id)
            }
        }
    }
}

impl std::error::Error for MergeError {}

/// Counts reported by table parsing and merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Positional tags replaced by a payload.
    pub applied: usize,
    /// Positional tags with no annotation row (tag removed, nothing inserted).
    pub unmatched: usize,
    /// Rows skipped for wrong field count or unparsable id.
    pub rejected_rows: usize,
    /// Rows whose lemma was replaced by the safe fallback.
    pub sanitized_lemmas: usize,
}

/// Parsed annotation rows keyed by position id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTable {
    payloads: HashMap<u64, String>,
    rejected_rows: usize,
    sanitized_lemmas: usize,
}

static UNSAFE_LEMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<>()]").unwrap());
static POSITION_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)#(\d+)").unwrap());

impl AnnotationTable {
    /// Parse tab-separated annotation rows: `#id`, word, tag, lemma.
    ///
    /// Blank lines are sentence separators and are skipped. Rows with any
    /// other field count are logged and skipped. A lemma containing
    /// bracket characters would corrupt parenthesis balance once merged;
    /// it is replaced by the row's word, or by `NA` if the word is no
    /// safer.
    pub fn parse(input: &str, markers: &MergeMarkers) -> Result<Self, MergeError> {
        let mut table = AnnotationTable::default();
        for line in input.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 4 {
                eprintln!(
                    ">>>>> annotation row skipped, expected 4 fields, got {}: {}",
                    fields.len(),
                    line
                );
                table.rejected_rows += 1;
                continue;
            }
            let id: u64 = match fields[0].trim_start_matches('#').parse() {
                Ok(id) => id,
                Err(_) => {
                    eprintln!(">>>>> annotation row skipped, bad position id: {}", line);
                    table.rejected_rows += 1;
                    continue;
                }
            };
            let word = fields[1];
            let tag = fields[2];
            let mut lemma = fields[3];
            if UNSAFE_LEMMA.is_match(lemma) {
                lemma = if UNSAFE_LEMMA.is_match(word) { "NA" } else { word };
                eprintln!(
                    ">>>>> annotation row #{}: lemma contains brackets, using {:?}",
                    id, lemma
                );
                table.sanitized_lemmas += 1;
            }
            let payload = format!("@{}={}@{}={}", markers.lemma, lemma, markers.tag, tag);
            if table.payloads.insert(id, payload).is_some() {
                return Err(MergeError::DuplicatePositionId { id });
            }
        }
        Ok(table)
    }

    pub fn payload(&self, id: u64) -> Option<&str> {
        self.payloads.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Merge `table` into `numbered` in a single pass, returning the final
/// annotated text and the merge counts.
pub fn merge(numbered: &str, table: &AnnotationTable) -> (String, MergeStats) {
    let mut stats = MergeStats {
        rejected_rows: table.rejected_rows,
        sanitized_lemmas: table.sanitized_lemmas,
        ..MergeStats::default()
    };
    let merged = POSITION_TAG.replace_all(numbered, |caps: &regex::Captures| {
        let payload = caps[1].parse::<u64>().ok().and_then(|id| table.payload(id));
        match payload {
            Some(payload) => {
                stats.applied += 1;
                format!("{})", payload)
            }
            None => {
                stats.unmatched += 1;
                ")".to_string()
            }
        }
    });
    (merged.into_owned(), stats)
}

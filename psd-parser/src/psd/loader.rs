//! Corpus loading utilities.
//!
//! `CorpusLoader` loads corpus text from a file or a string and offers
//! shortcut methods over the core stages: numbering, coded-span
//! selection, reconciliation, and merging. Used by the CLI and by
//! integration tests.

use std::fs;
use std::path::Path;

use crate::psd::coding::{select_coded, CodedSpan, CodingError};
use crate::psd::merging::{merge, AnnotationTable, MergeError, MergeMarkers, MergeStats};
use crate::psd::numbering::PositionCounter;
use crate::psd::records::{self, classify, NumberedCorpus, Record};
use crate::psd::repair::{reconcile, RepairCounts};

/// Error that can occur when loading or driving a corpus.
#[derive(Debug)]
pub enum LoaderError {
    /// IO error when reading a file.
    Io(String),
    /// Coded-span selection failure.
    Coding(CodingError),
    /// Annotation-table or merge failure.
    Merge(MergeError),
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderError::Io(msg) => write!(f, "IO error: {}", msg),
            LoaderError::Coding(err) => write!(f, "coding error: {}", err),
            LoaderError::Merge(err) => write!(f, "merge error: {}", err),
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        LoaderError::Io(err.to_string())
    }
}

impl From<CodingError> for LoaderError {
    fn from(err: CodingError) -> Self {
        LoaderError::Coding(err)
    }
}

impl From<MergeError> for LoaderError {
    fn from(err: MergeError) -> Self {
        LoaderError::Merge(err)
    }
}

/// Coded spans found in one sentence record.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceCodings {
    /// `(ID …)` value of the sentence, when present.
    pub id: Option<String>,
    /// Spans with record-relative offsets, sorted by start.
    pub spans: Vec<CodedSpan>,
}

/// Corpus loader with stage shortcuts.
#[derive(Debug)]
pub struct CorpusLoader {
    source: String,
}

impl CorpusLoader {
    /// Load from a file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let source = fs::read_to_string(path.as_ref())?;
        Ok(CorpusLoader { source })
    }

    /// Load from an in-memory string.
    pub fn from_string(source: impl Into<String>) -> Self {
        CorpusLoader {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number every record with the given file-global counter.
    pub fn number_corpus(&self, counter: &mut PositionCounter) -> NumberedCorpus {
        records::number_corpus(&self.source, counter)
    }

    /// Number every record, reading inline lemmas from `@<lemma_code>=`.
    pub fn number_corpus_with(
        &self,
        counter: &mut PositionCounter,
        lemma_code: &str,
    ) -> NumberedCorpus {
        records::number_corpus_with(&self.source, counter, lemma_code)
    }

    /// Select coded spans per sentence record. A record whose brackets do
    /// not balance is reported and skipped; the walk continues.
    pub fn select_coded(&self, coding_label: &str) -> Vec<SentenceCodings> {
        let mut sentences = Vec::new();
        for (index, segment) in self.source.split("\n\n").enumerate() {
            if segment.trim().is_empty() {
                continue;
            }
            if let Record::Sentence { id, text } = classify(segment) {
                match select_coded(text, coding_label) {
                    Ok(spans) => {
                        if !spans.is_empty() {
                            sentences.push(SentenceCodings { id, spans });
                        }
                    }
                    Err(err) => {
                        eprintln!(">>>>> record {} skipped ({})", index + 1, err);
                    }
                }
            }
        }
        sentences
    }

    /// Reconcile both annotation layers over the whole source.
    pub fn reconcile(&self) -> (String, RepairCounts) {
        reconcile(&self.source)
    }

    /// Merge annotation rows read from `rows_input` into the source,
    /// which must be a numbered copy from the same numbering run.
    pub fn merge_rows(
        &self,
        rows_input: &str,
        markers: &MergeMarkers,
    ) -> Result<(String, MergeStats), LoaderError> {
        let table = AnnotationTable::parse(rows_input, markers)?;
        Ok(merge(&self.source, &table))
    }
}

//! Main module for psd library functionality

pub mod annotation;
pub mod coding;
pub mod loader;
pub mod merging;
pub mod numbering;
pub mod records;
pub mod repair;
pub mod spans;
pub mod terminals;

pub use coding::{select_coded, CodedSpan, CodingError, DEFAULT_CODING_LABEL};
pub use loader::{CorpusLoader, LoaderError};
pub use merging::{merge, AnnotationTable, MergeError, MergeMarkers, MergeStats};
pub use numbering::{number, NumberedSentence, PositionCounter, PositionEntry};
pub use records::{classify, NumberedCorpus, Record, RunSummary};
pub use repair::{reconcile, RepairCounts};
pub use spans::{match_parens, SpanError, SpanMap};
pub use terminals::{extract_terminals, TerminalNode};

//! # psd
//!
//! A parser library for Penn-style bracketed treebank files (`.psd`).
//!
//! The library works on bracketed sentence text without building a typed
//! parse tree. It addresses subtrees by byte offset through a matching-
//! parenthesis table, enumerates terminal `(TAG form)` nodes within a
//! span, selects specially marked coding subtrees innermost-first, and
//! drives a two-pass numbering/merge protocol that keeps external tagger
//! annotation byte-aligned with the source text.
//!
//! The pipeline, leaf-first:
//!
//! ```text
//! spans       matching-parenthesis table (the only offset authority)
//! terminals   (TAG form) extraction within a span
//! coding      coded-subtree selection, innermost first
//! numbering   positional #n tags + tagger-facing word lists
//! merging     positional merge of external annotation rows
//! repair      dual-layer annotation reconciliation
//! records     blank-line record splitting and whole-corpus runs
//! loader      file/string loading shortcuts over all of the above
//! ```

#![allow(rustdoc::invalid_html_tags)]

pub mod psd;

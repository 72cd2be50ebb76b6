//! Dual-layer annotation reconciliation.
//!
//! Corpora annotated in two passes can end up with terminals that carry
//! only one of the two inline layers: the primary `@l=…@t=…` layer or the
//! secondary `@rl=…@rt=…` layer. Reconciliation inserts an explicit `NA`
//! placeholder for whichever layer is missing, so downstream consumers
//! can assume both layers are present or both absent.
//!
//! The placeholder markers satisfy the presence checks themselves, which
//! makes the pass idempotent: a second run sees both layers present and
//! changes nothing. A form carrying neither layer is left untouched,
//! never invented. When both layers exist with real, differing lemmas the
//! divergence is counted and reported; neither layer is favored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::psd::annotation::{
    has_primary_layer, has_secondary_layer, primary_lemma, secondary_lemma, PLACEHOLDER,
};

/// Terminals as the repair pass sees them: tags start with an uppercase
/// letter, forms run to the closing paren.
static REPAIR_TERMINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([A-Z][^\s()]*) ([^()]+)\)").unwrap());

/// Insertion and divergence counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairCounts {
    /// Primary-layer placeholders inserted (`@l=NA@t=NA`).
    pub added_primary: usize,
    /// Secondary-layer placeholders appended (`@rl=NA@rt=NA`).
    pub added_secondary: usize,
    /// Terminals whose two real lemma layers disagree.
    pub divergent: usize,
}

/// Reconcile both annotation layers over every terminal of `text`.
pub fn reconcile(text: &str) -> (String, RepairCounts) {
    let mut counts = RepairCounts::default();
    let repaired = REPAIR_TERMINAL.replace_all(text, |caps: &regex::Captures| {
        let tag = &caps[1];
        let form = &caps[2];
        let form = match (has_primary_layer(form), has_secondary_layer(form)) {
            (true, true) => {
                if lemmas_diverge(form) {
                    counts.divergent += 1;
                }
                form.to_string()
            }
            (false, true) => {
                counts.added_primary += 1;
                form.replacen("@rl=", "@l=NA@t=NA@rl=", 1)
            }
            (true, false) => {
                counts.added_secondary += 1;
                format!("{}@rl=NA@rt=NA", form)
            }
            // Unannotated or unrecognized: treated as both absent.
            (false, false) => form.to_string(),
        };
        format!("({} {})", tag, form)
    });
    (repaired.into_owned(), counts)
}

fn lemmas_diverge(form: &str) -> bool {
    match (primary_lemma(form), secondary_lemma(form)) {
        (Some(primary), Some(secondary)) => {
            primary != PLACEHOLDER && secondary != PLACEHOLDER && primary != secondary
        }
        _ => false,
    }
}

//! Inline `@marker=value` annotation helpers shared across numbering,
//! merging, and repair.
//!
//! Terminal forms may carry machine-readable annotation appended to the
//! word, e.g. `vint@l=venir@t=VERcjg`. Two independent layers use distinct
//! marker sets: the primary layer `@l=` / `@t=` and the secondary layer
//! `@rl=` / `@rt=`. This module keeps the marker parsing rules in one
//! place so every stage enforces the same constraints.
//!
//! A literal `@` can also occur inside word forms for amalgamated tokens
//! (e.g. `el` < `en`+`le` written as `e@ @l`). Those are masked before
//! marker parsing and stripped from the clean word afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Default marker code for the primary lemma layer (`@l=`).
pub const DEFAULT_LEMMA_CODE: &str = "l";

/// Placeholder value inserted for a missing annotation layer.
pub const PLACEHOLDER: &str = "NA";

// Layer presence checks preserve marker order: the lemma marker is
// expected before the tag marker within one layer.
static PRIMARY_LAYER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@l=.*@t=").unwrap());
static SECONDARY_LAYER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@rl=.*@rt=").unwrap());

static PRIMARY_LEMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"@l=([^@]*)").unwrap());
static SECONDARY_LEMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"@rl=([^@]*)").unwrap());

static AMALGAM_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(@|$)").unwrap());

/// True if the form carries the primary annotation layer (`@l=…@t=…`).
pub fn has_primary_layer(form: &str) -> bool {
    PRIMARY_LAYER.is_match(form)
}

/// True if the form carries the secondary annotation layer (`@rl=…@rt=…`).
pub fn has_secondary_layer(form: &str) -> bool {
    SECONDARY_LAYER.is_match(form)
}

/// Raw primary-layer lemma value, if any.
pub fn primary_lemma(form: &str) -> Option<String> {
    PRIMARY_LEMMA.captures(form).map(|c| c[1].to_string())
}

/// Raw secondary-layer lemma value, if any.
pub fn secondary_lemma(form: &str) -> Option<String> {
    SECONDARY_LEMMA.captures(form).map(|c| c[1].to_string())
}

/// Masks literal `@` characters that belong to amalgamated word forms so
/// that marker parsing cannot mistake them for annotation delimiters.
/// A word-final `@` (immediately before annotation or end of form) and a
/// word-initial `@` become `++`.
pub fn mask_amalgams(form: &str) -> String {
    let masked = AMALGAM_AT.replace_all(form, "++$1");
    if let Some(rest) = masked.strip_prefix('@') {
        format!("++{}", rest)
    } else {
        masked.into_owned()
    }
}

/// Strips amalgam masks and stray marker characters from a word destined
/// for the external tagger.
pub fn clean_word(word: &str) -> String {
    word.replace("++", "").replace(['=', '_'], "")
}

/// Word and lemma split out of an annotated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormAnnotation {
    pub word: String,
    pub lemma: String,
}

/// Split `form` into its word and the lemma carried by `@<lemma_code>=`.
///
/// Returns `None` when the form carries no lemma marker. Ambiguous lemma
/// strings (`a|b|c`) are simplified: `_tag` suffixes stripped per
/// alternative, `NA` alternatives dropped, uniques joined with `_`.
/// Auxiliary `@a=` / `@m=` / `@e=` markers are carried onto the lemma.
pub fn split_form(form: &str, lemma_code: &str) -> Option<FormAnnotation> {
    let masked = mask_amalgams(form);
    let marker = format!("@{}=", lemma_code);
    let at = masked.rfind(&marker)?;
    // Word runs up to the first annotation marker.
    let word_end = masked.find('@').unwrap_or(masked.len()).min(at);
    let word = &masked[..word_end];
    let value = masked[at + marker.len()..]
        .split('@')
        .next()
        .unwrap_or("");
    let mut lemma = simplify_lemma(value);
    for code in ["a", "m", "e"] {
        let aux = format!("@{}=", code);
        if let Some(pos) = masked.find(&aux) {
            let val = masked[pos + aux.len()..].split('@').next().unwrap_or("");
            lemma.push_str(&aux);
            lemma.push_str(val);
        }
    }
    Some(FormAnnotation {
        word: clean_word(word),
        lemma,
    })
}

fn simplify_lemma(raw: &str) -> String {
    if !raw.contains('|') {
        return raw.to_string();
    }
    let uniques: BTreeSet<&str> = raw
        .split('|')
        .map(|alt| alt.split('_').next().unwrap_or(""))
        .filter(|alt| *alt != PLACEHOLDER)
        .collect();
    uniques.into_iter().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_detection() {
        assert!(has_primary_layer("vint@l=venir@t=VERcjg"));
        assert!(!has_primary_layer("vint@rl=venir@rt=VERcjg"));
        assert!(has_secondary_layer("vint@rl=venir@rt=VERcjg"));
        assert!(!has_secondary_layer("vint@l=venir@t=VERcjg"));
        assert!(has_primary_layer("w@l=NA@t=NA@rl=x@rt=Y"));
        assert!(!has_primary_layer("vint"));
    }

    #[test]
    fn test_split_form_simple() {
        assert_eq!(
            split_form("vint@l=venir@t=VERcjg", "l"),
            Some(FormAnnotation {
                word: "vint".to_string(),
                lemma: "venir".to_string()
            })
        );
    }

    #[test]
    fn test_split_form_without_marker() {
        assert_eq!(split_form("vint", "l"), None);
        assert_eq!(split_form("vint@rl=venir@rt=V", "q"), None);
    }

    #[test]
    fn test_split_form_custom_code() {
        assert_eq!(
            split_form("vint@rl=venir@rt=V", "rl"),
            Some(FormAnnotation {
                word: "vint".to_string(),
                lemma: "venir".to_string()
            })
        );
    }

    #[test]
    fn test_ambiguous_lemma_simplified() {
        let got = split_form("chief@l=chief_N|chef_N|NA@t=N", "l").unwrap();
        assert_eq!(got.word, "chief");
        // NA dropped, tag suffixes stripped, uniques joined
        assert_eq!(got.lemma, "chef_chief");
    }

    #[test]
    fn test_auxiliary_markers_carried() {
        let got = split_form("hound@l=hound@t=N@a=anim", "l").unwrap();
        assert_eq!(got.lemma, "hound@a=anim");
    }

    #[test]
    fn test_amalgam_masking() {
        // e@ (first half of an amalgam) with annotation appended
        assert_eq!(mask_amalgams("e@@l=en"), "e++@l=en");
        assert_eq!(mask_amalgams("e@"), "e++");
        assert_eq!(mask_amalgams("@l"), "++l");
        let got = split_form("e@@l=en", "l").unwrap();
        assert_eq!(got.word, "e");
        assert_eq!(got.lemma, "en");
    }

    #[test]
    fn test_clean_word() {
        assert_eq!(clean_word("e++"), "e");
        assert_eq!(clean_word("a_b=c"), "abc");
    }
}

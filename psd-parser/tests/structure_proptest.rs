//! Structural properties of parenthesis matching and the numbering/merge
//! round trip, over generated well-formed bracket trees.

use proptest::prelude::*;

use psd_parser::psd::{
    extract_terminals, match_parens, merge, number, AnnotationTable, PositionCounter, SpanError,
};

/// One `(TAG word)` leaf.
fn terminal() -> impl Strategy<Value = String> {
    ("[A-Z]{1,3}", "[a-z]{1,6}").prop_map(|(tag, word)| format!("({} {})", tag, word))
}

/// A well-formed bracket tree of bounded depth.
fn tree() -> impl Strategy<Value = String> {
    terminal().prop_recursive(4, 48, 4, |inner| {
        ("[A-Z]{1,3}", prop::collection::vec(inner, 1..4))
            .prop_map(|(label, children)| format!("({} {})", label, children.join(" ")))
    })
}

proptest! {
    #[test]
    fn match_parens_accepts_well_formed_trees(text in tree()) {
        let map = match_parens(&text).unwrap();
        let opens = text.bytes().filter(|&b| b == b'(').count();
        prop_assert_eq!(map.len(), opens);
    }

    #[test]
    fn spans_are_disjoint_or_strictly_nested(text in tree()) {
        let map = match_parens(&text).unwrap();
        let spans: Vec<(usize, usize)> = map.iter().collect();
        for &(b1, e1) in &spans {
            for &(b2, e2) in &spans {
                if b1 == b2 {
                    continue;
                }
                let disjoint = e1 < b2 || e2 < b1;
                let nested = (b1 < b2 && e2 < e1) || (b2 < b1 && e1 < e2);
                prop_assert!(disjoint || nested);
            }
        }
    }

    #[test]
    fn stray_close_fails_at_its_offset(text in tree()) {
        let broken = format!("{})", text);
        prop_assert_eq!(
            match_parens(&broken),
            Err(SpanError::UnbalancedParen { offset: text.len() })
        );
    }

    #[test]
    fn unmatched_open_fails_at_earliest_offset(text in tree()) {
        let broken = format!("({}", text);
        prop_assert_eq!(
            match_parens(&broken),
            Err(SpanError::UnbalancedParen { offset: 0 })
        );
    }

    #[test]
    fn numbering_then_merging_nothing_is_identity(text in tree()) {
        let mut counter = PositionCounter::new();
        let numbered = number(&text, &mut counter).numbered;
        let (merged, stats) = merge(&numbered, &AnnotationTable::default());
        prop_assert_eq!(merged, text);
        prop_assert_eq!(stats.applied, 0);
    }

    #[test]
    fn position_ids_are_dense(text in tree(), start in 0u64..10_000) {
        let mut counter = PositionCounter::starting_at(start);
        let out = number(&text, &mut counter);
        prop_assert_eq!(out.entries.len(), extract_terminals(&text).len());
        for (index, entry) in out.entries.iter().enumerate() {
            prop_assert_eq!(entry.id, start + index as u64);
        }
        prop_assert_eq!(counter.peek(), start + out.entries.len() as u64);
    }

    #[test]
    fn terminal_order_matches_text_order(text in tree()) {
        // Terminal extraction is left-to-right; the word sequence must
        // appear in the same order in the source text.
        let mut at = 0;
        for node in extract_terminals(&text) {
            let needle = format!("({} {})", node.tag, node.form);
            let found = text[at..].find(&needle).map(|i| at + i);
            prop_assert!(found.is_some());
            at = found.unwrap() + 1;
        }
    }
}

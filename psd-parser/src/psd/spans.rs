//! Parenthesis matching over bracketed text.
//!
//! A single linear scan builds the matching-parenthesis table for one text
//! unit. Every later stage (coding selection, numbering, merging) addresses
//! subtrees through the offset pairs recorded here; no other module works
//! with raw offsets directly.
//!
//! Nesting depth is unbounded, so matching has to be a stack scan. The scan
//! pushes the offset of each `(` and pops-and-records on each `)`. Offsets
//! are byte offsets into the source; parentheses are ASCII, so slicing a
//! recorded span out of the source is always char-boundary safe.

use std::collections::BTreeMap;

/// Error raised when the parentheses of a text unit do not balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanError {
    /// A parenthesis with no partner at the given byte offset.
    ///
    /// For a stray `)` this is the offset of that `)`. For leftover `(`
    /// after the scan it is the offset of the earliest unmatched `(`.
    UnbalancedParen { offset: usize },
}

impl std::fmt::Display for SpanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanError::UnbalancedParen { offset } => {
                write!(f, "unbalanced parenthesis at byte offset {}", offset)
            }
        }
    }
}

impl std::error::Error for SpanError {}

/// Matching-parenthesis table for one bracketed text.
///
/// Maps each opening `(` byte offset to the byte offset of its matching
/// `)`. Within one text the mapping is bijective, and any two recorded
/// spans are either disjoint or strictly nested; partial overlap cannot
/// occur in balanced text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanMap {
    pairs: BTreeMap<usize, usize>,
}

impl SpanMap {
    /// Offset of the `)` matching the `(` at `open`, if `open` is a
    /// recorded opening offset.
    pub fn matching(&self, open: usize) -> Option<usize> {
        self.pairs.get(&open).copied()
    }

    /// Number of recorded pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate `(open, close)` pairs in ascending open offset.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().map(|(&open, &close)| (open, close))
    }
}

/// Build the [`SpanMap`] for `text` in one linear scan.
///
/// Fails with [`SpanError::UnbalancedParen`] on the first `)` seen with an
/// empty pending-open stack, or on any `(` left unmatched after the scan
/// (reporting the earliest one).
pub fn match_parens(text: &str) -> Result<SpanMap, SpanError> {
    let mut pairs = BTreeMap::new();
    let mut pending: Vec<usize> = Vec::new();
    for (offset, byte) in text.bytes().enumerate() {
        match byte {
            b'(' => pending.push(offset),
            b')' => {
                let open = pending
                    .pop()
                    .ok_or(SpanError::UnbalancedParen { offset })?;
                pairs.insert(open, offset);
            }
            _ => {}
        }
    }
    if let Some(&open) = pending.first() {
        return Err(SpanError::UnbalancedParen { offset: open });
    }
    Ok(SpanMap { pairs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_pairs() {
        let map = match_parens("(a)(b)").unwrap();
        assert_eq!(map.matching(0), Some(2));
        assert_eq!(map.matching(3), Some(5));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_nested_pairs() {
        let text = "(S (NP (D the) (N dog)) (VP (V barks)))";
        let map = match_parens(text).unwrap();
        // Outermost pair covers the whole text
        assert_eq!(map.matching(0), Some(text.len() - 1));
        // (D the)
        let d_open = text.find("(D").unwrap();
        assert_eq!(map.matching(d_open), Some(d_open + 6));
    }

    #[test]
    fn test_stray_close_reports_its_offset() {
        assert_eq!(
            match_parens("(a))"),
            Err(SpanError::UnbalancedParen { offset: 3 })
        );
    }

    #[test]
    fn test_leftover_open_reports_earliest() {
        // Both opens at 0 and 1 are unmatched by the close at 5; the open
        // at 0 is the one left over, and it is the earliest.
        assert_eq!(
            match_parens("((a)"),
            Err(SpanError::UnbalancedParen { offset: 0 })
        );
        assert_eq!(
            match_parens("(a)(("),
            Err(SpanError::UnbalancedParen { offset: 3 })
        );
    }

    #[test]
    fn test_empty_text() {
        let map = match_parens("").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_spans_disjoint_or_nested() {
        let text = "(A (B (C x)) (D y) (E (F z) (G w)))";
        let map = match_parens(text).unwrap();
        let spans: Vec<(usize, usize)> = map.iter().collect();
        for &(b1, e1) in &spans {
            for &(b2, e2) in &spans {
                if b1 == b2 {
                    continue;
                }
                let disjoint = e1 < b2 || e2 < b1;
                let nested = (b1 < b2 && e2 < e1) || (b2 < b1 && e1 < e2);
                assert!(disjoint || nested, "partial overlap: {:?} {:?}", (b1, e1), (b2, e2));
            }
        }
    }

    #[test]
    fn test_multibyte_text_between_parens() {
        let text = "(N cœur)";
        let map = match_parens(text).unwrap();
        assert_eq!(map.matching(0), Some(text.len() - 1));
    }
}

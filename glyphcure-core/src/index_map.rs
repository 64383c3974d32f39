// glyphcure-core/src/index_map.rs
//! Mapping from byte offsets in cured text back to byte ranges of the original.
//!
//! The curing engine pushes one [`IndexEntry`] per code point that produced
//! output. Code points that produced nothing are folded into a neighbouring
//! entry whose original range touches theirs, so a base letter followed by
//! stripped combining marks maps back to the whole cluster.
//!
//! Explicit bidi formatting characters are kept out of the entries. Each
//! embedding, override or isolate is recorded as a scope instead, and a
//! range that reaches inside a scope widens to take in its controls.
//!
//! License: MIT OR APACHE 2.0

use std::ops::Range;

/// One cured output unit: where it starts in the cured text and which original bytes produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub cured: usize,
    pub original: Range<usize>,
}

/// A contiguous run of original bytes behind part of a cured range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalSpan {
    pub original: Range<usize>,
    /// The cured bytes this run produced, clipped to the requested range.
    pub cured: Vec<Range<usize>>,
}

impl OriginalSpan {
    /// Offset of the earliest cured byte this run produced.
    pub fn first_cured(&self) -> usize {
        self.cured.iter().map(|range| range.start).min().unwrap_or(0)
    }
}

/// Original bytes of an explicit bidi scope, with (`outer`) and without (`inner`) its controls.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ControlScope {
    outer: Range<usize>,
    inner: Range<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMap {
    entries: Vec<IndexEntry>,
    scopes: Vec<ControlScope>,
    /// Deleted bytes not yet attached to an entry.
    pending: Option<Range<usize>>,
}

fn touches(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.end == b.start || b.end == a.start
}

fn union(a: &Range<usize>, b: &Range<usize>) -> Range<usize> {
    a.start.min(b.start)..a.end.max(b.end)
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

impl IndexMap {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), scopes: Vec::new(), pending: None }
    }

    /// Records output starting at `cured` produced by the `original` bytes.
    pub(crate) fn push(&mut self, cured: usize, original: Range<usize>) {
        let original = match self.pending.take() {
            Some(pending) if touches(&pending, &original) => union(&pending, &original),
            other => {
                self.pending = other;
                original
            }
        };
        self.entries.push(IndexEntry { cured, original });
    }

    /// Records `original` bytes that produced no output.
    pub(crate) fn absorb(&mut self, original: Range<usize>) {
        if let Some(last) = self.entries.last_mut() {
            if touches(&last.original, &original) {
                last.original = union(&last.original, &original);
                return;
            }
        }
        self.pending = match self.pending.take() {
            Some(pending) if touches(&pending, &original) => Some(union(&pending, &original)),
            _ => Some(original),
        };
    }

    /// Records deleted `original` bytes that were skipped while output was
    /// produced out of logical order. They join the entry ending where they
    /// start, or failing that the entry starting where they end.
    pub(crate) fn attach(&mut self, original: Range<usize>) {
        let target = self
            .entries
            .iter()
            .position(|entry| entry.original.end == original.start)
            .or_else(|| self.entries.iter().position(|entry| entry.original.start == original.end));
        match target {
            Some(i) => self.entries[i].original = union(&self.entries[i].original, &original),
            None => self.absorb(original),
        }
    }

    /// Records an explicit bidi scope spanning `outer`, whose content is `inner`.
    pub(crate) fn push_scope(&mut self, outer: Range<usize>, inner: Range<usize>) {
        self.scopes.push(ControlScope { outer, inner });
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of the entries overlapping `cured`. Never empty unless the map is.
    fn covered(&self, cured: &Range<usize>) -> Range<usize> {
        let first = self.entries.partition_point(|entry| entry.cured <= cured.start).saturating_sub(1);
        let last = self
            .entries
            .partition_point(|entry| entry.cured < cured.end)
            .max(first + 1)
            .min(self.entries.len());
        first..last
    }

    /// Smallest original byte range covering every entry that overlaps `cured`,
    /// widened to whole bidi scopes wherever it reaches inside one.
    ///
    /// An empty `cured` range maps to an empty range at the start of the entry it falls in.
    pub fn to_original(&self, cured: Range<usize>) -> Range<usize> {
        let covered = self.covered(&cured);
        let Some(first) = self.entries.get(covered.start) else {
            return 0..0;
        };
        if cured.start >= cured.end {
            return first.original.start..first.original.start;
        }

        let hull = self.entries[covered]
            .iter()
            .fold(first.original.clone(), |acc, entry| union(&acc, &entry.original));
        self.widen(hull)
    }

    fn widen(&self, mut range: Range<usize>) -> Range<usize> {
        loop {
            let before = range.clone();
            for scope in &self.scopes {
                if overlaps(&scope.inner, &range) {
                    range = union(&range, &scope.outer);
                }
            }
            if range == before {
                return range;
            }
        }
    }

    /// The original bytes behind `cured`, split into contiguous runs in original order.
    ///
    /// Unlike [`IndexMap::to_original`] this never takes in bytes that did not
    /// produce part of `cured`, so text reordered into the gap between two runs
    /// and the bidi controls around them are left out.
    pub fn to_original_spans(&self, cured: Range<usize>) -> Vec<OriginalSpan> {
        if cured.start >= cured.end {
            return Vec::new();
        }

        let mut pieces: Vec<(Range<usize>, Range<usize>)> = self
            .covered(&cured)
            .map(|i| {
                let entry = &self.entries[i];
                let next = self.entries.get(i + 1).map_or(usize::MAX, |next| next.cured);
                (entry.original.clone(), entry.cured.max(cured.start)..next.min(cured.end))
            })
            .collect();
        pieces.sort_by_key(|(original, _)| original.start);

        let mut spans: Vec<OriginalSpan> = Vec::with_capacity(pieces.len());
        for (original, produced) in pieces {
            match spans.last_mut() {
                Some(span) if span.original.end == original.start => {
                    span.original.end = original.end;
                    span.cured.push(produced);
                }
                _ => spans.push(OriginalSpan { original, cured: vec![produced] }),
            }
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_marks_join_their_base() {
        // "ñx" written as n + U+0303 + x
        let mut map = IndexMap::default();
        map.push(0, 0..1);
        map.absorb(1..3);
        map.push(1, 3..4);

        assert_eq!(map.to_original(0..1), 0..3);
        assert_eq!(map.to_original(1..2), 3..4);
        assert_eq!(map.to_original(0..2), 0..4);
    }

    #[test]
    fn test_leading_deletion_attaches_to_next_entry() {
        let mut map = IndexMap::default();
        map.absorb(0..3);
        map.push(0, 3..4);
        assert_eq!(map.entries(), &[IndexEntry { cured: 0, original: 0..4 }]);
    }

    #[test]
    fn test_multi_byte_output_maps_to_one_code_point() {
        // 🆎 (4 bytes) cured to "ab", then "c"
        let mut map = IndexMap::default();
        map.push(0, 0..4);
        map.push(2, 4..5);

        assert_eq!(map.to_original(1..2), 0..4);
        assert_eq!(map.to_original(1..3), 0..5);
        assert_eq!(map.to_original(2..2), 4..4);
    }

    #[test]
    fn test_reordered_entries_use_min_and_max() {
        // Two right-to-left letters emitted in visual order.
        let mut map = IndexMap::default();
        map.push(0, 2..4);
        map.push(1, 0..2);
        assert_eq!(map.to_original(0..2), 0..4);
        assert_eq!(map.to_original(1..2), 0..2);
    }

    #[test]
    fn test_empty_map() {
        assert_eq!(IndexMap::default().to_original(0..3), 0..0);
        assert!(IndexMap::default().to_original_spans(0..3).is_empty());
    }

    /// "x" RLO "abc" PDF "y" displayed as "xcbay".
    fn overridden() -> IndexMap {
        let mut map = IndexMap::default();
        map.push(0, 0..1);
        map.push(1, 6..7);
        map.push(2, 5..6);
        map.push(3, 4..5);
        map.push(4, 10..11);
        map.push_scope(1..10, 4..7);
        map
    }

    #[test]
    fn test_spans_skip_reordered_gaps() {
        let map = overridden();
        assert_eq!(
            map.to_original_spans(0..2),
            vec![
                OriginalSpan { original: 0..1, cured: vec![0..1] },
                OriginalSpan { original: 6..7, cured: vec![1..2] },
            ]
        );
        assert_eq!(
            map.to_original_spans(1..4),
            vec![OriginalSpan { original: 4..7, cured: vec![3..4, 2..3, 1..2] }]
        );
        assert_eq!(map.to_original_spans(1..4)[0].first_cured(), 1);
        assert!(map.to_original_spans(2..2).is_empty());
    }

    #[test]
    fn test_spans_clip_multi_byte_output() {
        let mut map = IndexMap::default();
        map.push(0, 0..4);
        map.push(2, 4..5);
        assert_eq!(map.to_original_spans(1..3), vec![OriginalSpan { original: 0..5, cured: vec![1..2, 2..3] }]);
    }

    #[test]
    fn test_hull_widens_to_whole_scope() {
        let map = overridden();
        assert_eq!(map.to_original(1..4), 1..10);
        assert_eq!(map.to_original(0..2), 0..10);
        assert_eq!(map.to_original(0..1), 0..1);
        assert_eq!(map.to_original(4..5), 10..11);
    }

    #[test]
    fn test_nested_scopes_widen_transitively() {
        let mut map = IndexMap::default();
        map.push(0, 6..7);
        map.push_scope(3..10, 6..7);
        map.push_scope(0..13, 3..10);
        assert_eq!(map.to_original(0..1), 0..13);
    }

    #[test]
    fn test_attach_joins_a_touching_entry() {
        let mut map = IndexMap::default();
        map.push(0, 4..5);
        map.push(1, 0..2);
        map.attach(2..4);
        map.attach(5..7);
        assert_eq!(
            map.entries(),
            &[IndexEntry { cured: 0, original: 4..7 }, IndexEntry { cured: 1, original: 0..4 }]
        );
    }
}

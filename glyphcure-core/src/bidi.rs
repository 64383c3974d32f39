// glyphcure-core/src/bidi.rs
//! Visual reordering of mixed-direction text before curing.
//!
//! This is a reduced form of the Unicode Bidirectional Algorithm: explicit
//! embeddings, overrides and isolates (X1-X9), weak types (W1-W7), neutrals
//! (N1-N2), implicit levels (I1-I2), then per-paragraph reordering (L1-L2)
//! and bracket mirroring at odd levels. Paired-bracket resolution (N0) is not
//! performed and level runs stand in for isolating run sequences.
//!
//! Explicit formatting characters are consumed here and never reach the output.
//!
//! License: MIT OR APACHE 2.0

use glyphcure_codec::layout::BidiClass::{self, *};

use crate::database::Database;

const MAX_DEPTH: u8 = 125;

/// Whether `text` contains anything that makes reordering observable.
pub(crate) fn needs_reordering(db: &Database<'_>, text: &str) -> bool {
    text.chars()
        .filter(|ch| !ch.is_ascii())
        .map(|ch| db.bidi_class(ch))
        .any(|class| class.is_rtl_trigger() || class.is_explicit())
}

/// A character in visual position, with its index in the logical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Visual {
    pub index: usize,
    pub ch: char,
}

/// Reorders `chars` into display order, dropping explicit formatting characters
/// and mirroring brackets that end up right-to-left.
pub(crate) fn reorder(db: &Database<'_>, chars: &[char]) -> Vec<Visual> {
    let classes: Vec<BidiClass> = chars.iter().map(|&ch| db.bidi_class(ch)).collect();
    let mut visual = Vec::with_capacity(chars.len());

    let mut start = 0;
    while start < chars.len() {
        let end = classes[start..]
            .iter()
            .position(|&class| class == B)
            .map_or(chars.len(), |i| start + i + 1);
        reorder_paragraph(db, chars, &classes, start..end, &mut visual);
        start = end;
    }

    visual
}

/// An explicit embedding, override or isolate, by character index.
///
/// `close` is the PDF or PDI that terminates it. Without one the scope runs
/// up to `end`, the paragraph separator or the end of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scope {
    pub open: usize,
    pub close: Option<usize>,
    pub end: usize,
}

/// Pairs every explicit formatting initiator in `chars` with whatever terminates it.
pub(crate) fn scopes(db: &Database<'_>, chars: &[char]) -> Vec<Scope> {
    let mut scopes = Vec::new();
    let mut open: Vec<(usize, bool)> = Vec::new();

    for (i, &ch) in chars.iter().enumerate() {
        match db.bidi_class(ch) {
            RLE | LRE | RLO | LRO => open.push((i, false)),
            RLI | LRI | FSI => open.push((i, true)),
            PDF => {
                if let Some(&(start, false)) = open.last() {
                    open.pop();
                    scopes.push(Scope { open: start, close: Some(i), end: i + 1 });
                }
            }
            PDI if open.iter().any(|&(_, isolate)| isolate) => {
                while let Some((start, isolate)) = open.pop() {
                    if isolate {
                        scopes.push(Scope { open: start, close: Some(i), end: i + 1 });
                        break;
                    }
                    scopes.push(Scope { open: start, close: None, end: i });
                }
            }
            B => {
                scopes.extend(open.drain(..).map(|(start, _)| Scope { open: start, close: None, end: i }));
            }
            _ => {}
        }
    }

    scopes.extend(open.drain(..).map(|(start, _)| Scope { open: start, close: None, end: chars.len() }));
    scopes
}

fn is_removed(class: BidiClass) -> bool {
    matches!(class, RLE | LRE | RLO | LRO | PDF | BN)
}

fn is_isolate_control(class: BidiClass) -> bool {
    matches!(class, LRI | RLI | FSI | PDI)
}

fn is_neutral(class: BidiClass) -> bool {
    matches!(class, B | S | WS | ON | LRI | RLI | FSI | PDI)
}

fn direction(level: u8) -> BidiClass {
    if level % 2 == 0 {
        L
    } else {
        R
    }
}

/// First strong direction in `classes`, skipping isolated content.
///
/// With `stop_at_pdi` the scan ends at the PDI closing the current isolate.
fn first_strong(classes: &[BidiClass], stop_at_pdi: bool) -> Option<u8> {
    let mut depth = 0usize;
    for &class in classes {
        match class {
            LRI | RLI | FSI => depth += 1,
            PDI if depth > 0 => depth -= 1,
            PDI if stop_at_pdi => return None,
            B => return None,
            L if depth == 0 => return Some(0),
            R | AL if depth == 0 => return Some(1),
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Copy)]
struct Status {
    level: u8,
    overriding: Option<BidiClass>,
    isolate: bool,
}

/// X1-X8. Returns one embedding level per character and applies overrides to `classes`.
fn explicit_levels(classes: &mut [BidiClass], paragraph_level: u8) -> Vec<u8> {
    let mut levels = vec![paragraph_level; classes.len()];
    let mut stack = vec![Status { level: paragraph_level, overriding: None, isolate: false }];
    let mut overflow_isolates = 0usize;
    let mut overflow_embeddings = 0usize;
    let mut valid_isolates = 0usize;

    for i in 0..classes.len() {
        let top = stack[stack.len() - 1];
        let next_level = |rtl: bool| if rtl { (top.level + 1) | 1 } else { (top.level + 2) & !1 };

        let class = classes[i];
        match class {
            RLE | LRE | RLO | LRO => {
                levels[i] = top.level;
                let level = next_level(matches!(class, RLE | RLO));
                if level <= MAX_DEPTH && overflow_isolates == 0 && overflow_embeddings == 0 {
                    let overriding = match class {
                        RLO => Some(R),
                        LRO => Some(L),
                        _ => None,
                    };
                    stack.push(Status { level, overriding, isolate: false });
                } else if overflow_isolates == 0 {
                    overflow_embeddings += 1;
                }
            }
            RLI | LRI | FSI => {
                levels[i] = top.level;
                let rtl = match class {
                    RLI => true,
                    LRI => false,
                    _ => first_strong(&classes[i + 1..], true) == Some(1),
                };
                let level = next_level(rtl);
                if level <= MAX_DEPTH && overflow_isolates == 0 && overflow_embeddings == 0 {
                    valid_isolates += 1;
                    stack.push(Status { level, overriding: None, isolate: true });
                } else {
                    overflow_isolates += 1;
                }
            }
            PDI => {
                if overflow_isolates > 0 {
                    overflow_isolates -= 1;
                } else if valid_isolates > 0 {
                    overflow_embeddings = 0;
                    while stack.len() > 1 && !stack[stack.len() - 1].isolate {
                        stack.pop();
                    }
                    if stack.len() > 1 {
                        stack.pop();
                    }
                    valid_isolates -= 1;
                }
                levels[i] = stack[stack.len() - 1].level;
            }
            PDF => {
                levels[i] = top.level;
                if overflow_isolates == 0 {
                    if overflow_embeddings > 0 {
                        overflow_embeddings -= 1;
                    } else if !top.isolate && stack.len() > 1 {
                        stack.pop();
                    }
                }
            }
            B => levels[i] = paragraph_level,
            BN => levels[i] = top.level,
            _ => {
                levels[i] = top.level;
                if let Some(overriding) = top.overriding {
                    classes[i] = overriding;
                }
            }
        }
    }

    levels
}

/// W1-W7 over one level run.
fn resolve_weak(classes: &mut [BidiClass], sos: BidiClass) {
    let mut previous = sos;
    for class in classes.iter_mut() {
        if *class == NSM {
            *class = if is_isolate_control(previous) { ON } else { previous };
        }
        previous = *class;
    }

    let mut last_strong = sos;
    for class in classes.iter_mut() {
        match *class {
            EN if last_strong == AL => *class = AN,
            L | R | AL => last_strong = *class,
            _ => {}
        }
    }

    for class in classes.iter_mut() {
        if *class == AL {
            *class = R;
        }
    }

    for i in 1..classes.len().saturating_sub(1) {
        let (before, after) = (classes[i - 1], classes[i + 1]);
        classes[i] = match classes[i] {
            ES | CS if before == EN && after == EN => EN,
            CS if before == AN && after == AN => AN,
            class => class,
        };
    }

    let mut i = 0;
    while i < classes.len() {
        if classes[i] != ET {
            i += 1;
            continue;
        }
        let start = i;
        while i < classes.len() && classes[i] == ET {
            i += 1;
        }
        let touches_number = (start > 0 && classes[start - 1] == EN) || (i < classes.len() && classes[i] == EN);
        if touches_number {
            classes[start..i].fill(EN);
        }
    }

    for class in classes.iter_mut() {
        if matches!(*class, ES | ET | CS) {
            *class = ON;
        }
    }

    let mut last_strong = sos;
    for class in classes.iter_mut() {
        match *class {
            EN if last_strong == L => *class = L,
            L | R => last_strong = *class,
            _ => {}
        }
    }
}

/// N1-N2 over one level run. Numbers count as right-to-left.
fn resolve_neutral(classes: &mut [BidiClass], sos: BidiClass, eos: BidiClass, embedding: BidiClass) {
    let strong = |class: BidiClass| match class {
        L => L,
        R | EN | AN => R,
        _ => embedding,
    };

    let mut i = 0;
    while i < classes.len() {
        if !is_neutral(classes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < classes.len() && is_neutral(classes[i]) {
            i += 1;
        }
        let before = if start == 0 { sos } else { strong(classes[start - 1]) };
        let after = if i == classes.len() { eos } else { strong(classes[i]) };
        classes[start..i].fill(if before == after { before } else { embedding });
    }
}

fn reorder_paragraph(
    db: &Database<'_>,
    chars: &[char],
    original: &[BidiClass],
    range: std::ops::Range<usize>,
    visual: &mut Vec<Visual>,
) {
    let mut classes = original[range.clone()].to_vec();
    let paragraph_level = first_strong(&classes, false).unwrap_or(0);
    let explicit = explicit_levels(&mut classes, paragraph_level);

    // X9: positions (relative to the paragraph) that take part in resolution.
    let kept: Vec<usize> = (0..classes.len()).filter(|&i| !is_removed(original[range.start + i])).collect();
    let mut resolved: Vec<BidiClass> = kept.iter().map(|&i| classes[i]).collect();
    let mut levels: Vec<u8> = kept.iter().map(|&i| explicit[i]).collect();

    let mut run_start = 0;
    while run_start < kept.len() {
        let level = levels[run_start];
        let run_end = levels[run_start..]
            .iter()
            .position(|&l| l != level)
            .map_or(kept.len(), |i| run_start + i);

        let before = if run_start == 0 { paragraph_level } else { levels[run_start - 1] };
        let after = if run_end == kept.len() { paragraph_level } else { levels[run_end] };
        let sos = direction(level.max(before));
        let eos = direction(level.max(after));

        let run = &mut resolved[run_start..run_end];
        resolve_weak(run, sos);
        resolve_neutral(run, sos, eos, direction(level));
        run_start = run_end;
    }

    // I1-I2
    for (level, &class) in levels.iter_mut().zip(&resolved) {
        *level += match (*level % 2 == 0, class) {
            (true, R) => 1,
            (true, AN | EN) => 2,
            (false, L | EN | AN) => 1,
            _ => 0,
        };
    }

    // L1: separators and trailing whitespace return to the paragraph level.
    let mut trailing = true;
    for k in (0..kept.len()).rev() {
        match original[range.start + kept[k]] {
            S | B => {
                levels[k] = paragraph_level;
                trailing = true;
            }
            WS | LRI | RLI | FSI | PDI if trailing => levels[k] = paragraph_level,
            _ => trailing = false,
        }
    }

    // L2. A closing paragraph separator stays at the end of the line.
    let line_len = match kept.last() {
        Some(&last) if original[range.start + last] == B => kept.len() - 1,
        _ => kept.len(),
    };
    let mut order: Vec<usize> = (0..line_len).collect();
    let line_levels = &levels[..line_len];
    let highest = line_levels.iter().copied().max().unwrap_or(0);
    if let Some(lowest_odd) = line_levels.iter().copied().filter(|l| l % 2 == 1).min() {
        for level in (lowest_odd..=highest).rev() {
            let mut i = 0;
            while i < order.len() {
                if levels[order[i]] < level {
                    i += 1;
                    continue;
                }
                let start = i;
                while i < order.len() && levels[order[i]] >= level {
                    i += 1;
                }
                order[start..i].reverse();
            }
        }
    }

    order.extend(line_len..kept.len());

    for k in order {
        let index = range.start + kept[k];
        if is_isolate_control(original[index]) {
            continue;
        }
        let ch = chars[index];
        let ch = if levels[k] % 2 == 1 { db.mirror(ch).unwrap_or(ch) } else { ch };
        visual.push(Visual { index, ch });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visual_string(text: &str) -> String {
        let db = Database::embedded().unwrap();
        let chars: Vec<char> = text.chars().collect();
        reorder(db, &chars).into_iter().map(|v| v.ch).collect()
    }

    #[test]
    fn test_left_to_right_text_is_untouched() {
        assert_eq!(visual_string("hello, world"), "hello, world");
    }

    #[test]
    fn test_hebrew_run_is_reversed() {
        // Logical alef bet gimel displays as gimel bet alef.
        assert_eq!(visual_string("\u{5D0}\u{5D1}\u{5D2}"), "\u{5D2}\u{5D1}\u{5D0}");
        assert_eq!(visual_string("ab \u{5D0}\u{5D1} cd"), "ab \u{5D1}\u{5D0} cd");
    }

    #[test]
    fn test_numbers_keep_their_order_inside_rtl() {
        assert_eq!(visual_string("\u{5D0} 12 \u{5D1}"), "\u{5D1} 12 \u{5D0}");
    }

    #[test]
    fn test_override_reverses_latin() {
        assert_eq!(visual_string("\u{202E}abc\u{202C}"), "cba");
    }

    #[test]
    fn test_isolate_controls_are_dropped() {
        assert_eq!(visual_string("x\u{2067}\u{5D0}\u{5D1}\u{2069}y"), "x\u{5D1}\u{5D0}y");
    }

    #[test]
    fn test_brackets_mirror_in_rtl() {
        assert_eq!(visual_string("\u{5D0}(\u{5D1})"), "(\u{5D1})\u{5D0}");
    }

    #[test]
    fn test_paragraphs_resolve_independently() {
        assert_eq!(visual_string("\u{5D0}\u{5D1}\nab"), "\u{5D1}\u{5D0}\nab");
    }

    #[test]
    fn test_scopes_pair_initiators_with_terminators() {
        let db = Database::embedded().unwrap();
        let chars: Vec<char> = "a\u{202E}bc\u{202C}d\u{2067}e\u{202B}f\u{2069}\u{202D}g".chars().collect();
        assert_eq!(
            scopes(db, &chars),
            vec![
                Scope { open: 1, close: Some(4), end: 5 },
                Scope { open: 8, close: None, end: 10 },
                Scope { open: 6, close: Some(10), end: 11 },
                Scope { open: 11, close: None, end: 13 },
            ]
        );
    }

    #[test]
    fn test_unmatched_terminators_open_no_scope() {
        let db = Database::embedded().unwrap();
        let chars: Vec<char> = "a\u{202C}b\u{2069}\u{202E}c\nd".chars().collect();
        assert_eq!(scopes(db, &chars), vec![Scope { open: 4, close: None, end: 6 }]);
    }

    #[test]
    fn test_needs_reordering() {
        let db = Database::embedded().unwrap();
        assert!(!needs_reordering(db, "plain ascii"));
        assert!(!needs_reordering(db, "ѕсаm"));
        assert!(needs_reordering(db, "\u{5D0}"));
        assert!(needs_reordering(db, "a\u{202E}b"));
        assert!(needs_reordering(db, "\u{661}"));
    }
}

use std::cmp::{max, min, Ordering};

use crate::node::NodeOptions;
use crate::range::TextRange;

/// A document change: `[start, end)` is replaced by `text_len` new characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub text_len: usize,
    /// Push every marker touching the replaced span past the new text,
    /// regardless of stickiness.
    pub force_move_markers: bool,
}

impl TextEdit {
    pub fn replace(range: impl Into<TextRange>, text_len: usize) -> Self {
        let range = range.into();
        Self {
            start: range.start,
            end: range.end,
            text_len,
            force_move_markers: false,
        }
    }

    pub fn insert(position: usize, text_len: usize) -> Self {
        Self::replace(TextRange::collapsed(position), text_len)
    }

    pub fn delete(range: impl Into<TextRange>) -> Self {
        Self::replace(range, 0)
    }

    pub fn force_move_markers(mut self, yes: bool) -> Self {
        self.force_move_markers = yes;
        self
    }

    #[inline]
    pub fn removed_len(&self) -> usize {
        self.end - self.start
    }

    /// Net change in document length.
    #[inline]
    pub fn delta(&self) -> i64 {
        self.text_len as i64 - self.removed_len() as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerMove {
    MarkerDefined,
    ForceMove,
    ForceStay,
}

/// Whether a marker at `marker` stays in front of `check`.
fn stays_before(marker: i64, sticks_to_previous: bool, check: i64, semantics: MarkerMove) -> bool {
    match marker.cmp(&check) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => match semantics {
            MarkerMove::ForceMove => false,
            MarkerMove::ForceStay => true,
            MarkerMove::MarkerDefined => sticks_to_previous,
        },
    }
}

/// New absolute `(start, end)` of an interval after `edit` is applied.
///
/// Each endpoint is tested against three offsets in turn: the edit start, the
/// end of the part of the edit where old and new text overlap, and the edit
/// end. An endpoint that stays in front of one of them is final; one that
/// stops at the edit end moves to the end of the inserted text; anything left
/// shifts with the edit.
pub(crate) fn accept_edit(
    node_start: i64,
    node_end: i64,
    options: &NodeOptions,
    edit: &TextEdit,
) -> (i64, i64) {
    let start_sticks = options.stickiness.start_sticks_to_previous();
    let end_sticks = options.stickiness.end_sticks_to_previous();

    let edit_start = edit.start as i64;
    let edit_end = edit.end as i64;
    let deleting = edit_end - edit_start;
    let inserting = edit.text_len as i64;
    let common = min(deleting, inserting);
    let force = edit.force_move_markers;

    let mut start = node_start;
    let mut end = node_end;
    let mut start_done = false;
    let mut end_done = false;

    if options.collapse_on_replace_edit && edit_start <= node_start && node_end <= edit_end {
        start = edit_start;
        end = edit_start;
        start_done = true;
        end_done = true;
    }

    let semantics = if force {
        MarkerMove::ForceMove
    } else if deleting > 0 {
        MarkerMove::ForceStay
    } else {
        MarkerMove::MarkerDefined
    };
    if !start_done && stays_before(node_start, start_sticks, edit_start, semantics) {
        start_done = true;
    }
    if !end_done && stays_before(node_end, end_sticks, edit_start, semantics) {
        end_done = true;
    }

    if common > 0 && !force {
        let semantics = if deleting > inserting {
            MarkerMove::ForceStay
        } else {
            MarkerMove::MarkerDefined
        };
        let check = edit_start + common;
        if !start_done && stays_before(node_start, start_sticks, check, semantics) {
            start_done = true;
        }
        if !end_done && stays_before(node_end, end_sticks, check, semantics) {
            end_done = true;
        }
    }

    let semantics = if force {
        MarkerMove::ForceMove
    } else {
        MarkerMove::MarkerDefined
    };
    if !start_done && stays_before(node_start, start_sticks, edit_end, semantics) {
        start = edit_start + inserting;
        start_done = true;
    }
    if !end_done && stays_before(node_end, end_sticks, edit_end, semantics) {
        end = edit_start + inserting;
        end_done = true;
    }

    let delta = inserting - deleting;
    if !start_done {
        start = max(0, node_start + delta);
    }
    if !end_done {
        end = max(0, node_end + delta);
    }

    (start, max(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{IntervalNode, Stickiness};

    use Stickiness::*;

    fn edited(range: (usize, usize), stickiness: Stickiness, edit: TextEdit) -> (usize, usize) {
        let mut node = IntervalNode::new((), range.0, range.1).with_stickiness(stickiness);
        node.accept_edit(&edit);
        (node.start, node.end)
    }

    #[test]
    fn typing_into_collapsed_marker() {
        let edit = TextEdit::insert(0, 1);
        assert_eq!(edited((0, 0), AlwaysGrowsWhenTypingAtEdges, edit), (0, 1));
        assert_eq!(edited((0, 0), NeverGrowsWhenTypingAtEdges, edit), (1, 1));
        assert_eq!(edited((0, 0), GrowsOnlyWhenTypingBefore, edit), (0, 0));
        assert_eq!(edited((0, 0), GrowsOnlyWhenTypingAfter, edit), (1, 1));
    }

    #[test]
    fn full_replace_with_longer_text() {
        let edit = TextEdit::replace(5..10, 7);
        assert_eq!(edited((5, 10), NeverGrowsWhenTypingAtEdges, edit), (5, 10));
        assert_eq!(
            edited((5, 10), NeverGrowsWhenTypingAtEdges, edit.force_move_markers(true)),
            (12, 12)
        );
    }

    #[test]
    fn typing_at_start_edge() {
        let edit = TextEdit::insert(1, 1);
        assert_eq!(edited((1, 3), AlwaysGrowsWhenTypingAtEdges, edit), (1, 4));
        assert_eq!(edited((1, 3), NeverGrowsWhenTypingAtEdges, edit), (2, 4));
        assert_eq!(edited((1, 3), GrowsOnlyWhenTypingBefore, edit), (1, 4));
        assert_eq!(edited((1, 3), GrowsOnlyWhenTypingAfter, edit), (2, 4));
    }

    #[test]
    fn typing_at_end_edge() {
        let edit = TextEdit::insert(3, 1);
        assert_eq!(edited((1, 3), AlwaysGrowsWhenTypingAtEdges, edit), (1, 4));
        assert_eq!(edited((1, 3), NeverGrowsWhenTypingAtEdges, edit), (1, 3));
        assert_eq!(edited((1, 3), GrowsOnlyWhenTypingBefore, edit), (1, 3));
        assert_eq!(edited((1, 3), GrowsOnlyWhenTypingAfter, edit), (1, 4));
    }

    #[test]
    fn typing_inside_grows_regardless_of_stickiness() {
        for stickiness in [
            AlwaysGrowsWhenTypingAtEdges,
            NeverGrowsWhenTypingAtEdges,
            GrowsOnlyWhenTypingBefore,
            GrowsOnlyWhenTypingAfter,
        ] {
            assert_eq!(edited((1, 3), stickiness, TextEdit::insert(2, 5)), (1, 8));
        }
    }

    #[test]
    fn forced_move_at_edges() {
        let at_end = TextEdit::insert(3, 1).force_move_markers(true);
        assert_eq!(edited((1, 3), NeverGrowsWhenTypingAtEdges, at_end), (1, 4));
        let at_start = TextEdit::insert(1, 2).force_move_markers(true);
        assert_eq!(edited((1, 3), AlwaysGrowsWhenTypingAtEdges, at_start), (3, 5));
    }

    #[test]
    fn edits_beside_the_interval() {
        // before: shifted by the net delta
        assert_eq!(edited((5, 10), NeverGrowsWhenTypingAtEdges, TextEdit::replace(1..2, 4)), (8, 13));
        assert_eq!(edited((5, 10), NeverGrowsWhenTypingAtEdges, TextEdit::delete(0..3)), (2, 7));
        // after: untouched
        assert_eq!(edited((5, 10), AlwaysGrowsWhenTypingAtEdges, TextEdit::replace(11..20, 1)), (5, 10));
    }

    #[test]
    fn deletions() {
        let never = NeverGrowsWhenTypingAtEdges;
        assert_eq!(edited((5, 10), never, TextEdit::delete(3..12)), (3, 3));
        assert_eq!(edited((5, 10), never, TextEdit::delete(6..8)), (5, 8));
        assert_eq!(edited((5, 10), never, TextEdit::delete(3..7)), (3, 6));
        assert_eq!(edited((5, 10), never, TextEdit::delete(8..14)), (5, 8));
    }

    #[test]
    fn replace_inside_with_shorter_text() {
        let edit = TextEdit::replace(6..9, 1);
        assert_eq!(edited((5, 10), NeverGrowsWhenTypingAtEdges, edit), (5, 8));
    }

    #[test]
    fn collapse_on_replace_edit() {
        let options = NodeOptions::default().collapse_on_replace_edit(true);
        let mut node = IntervalNode::new((), 5, 10).with_options(options);
        node.accept_edit(&TextEdit::replace(4..11, 3));
        assert_eq!(node.range(), TextRange::collapsed(4));

        // a partial overlap does not collapse
        let mut node = IntervalNode::new((), 5, 10).with_options(options);
        node.accept_edit(&TextEdit::replace(6..11, 3));
        assert_eq!(node.range(), TextRange::new(5, 9));
    }

    #[test]
    fn never_inverts() {
        for stickiness in [
            AlwaysGrowsWhenTypingAtEdges,
            NeverGrowsWhenTypingAtEdges,
            GrowsOnlyWhenTypingBefore,
            GrowsOnlyWhenTypingAfter,
        ] {
            for force in [false, true] {
                for (s, e) in [(0, 0), (2, 2), (2, 6), (4, 9)] {
                    for (es, ee, len) in [(2, 2, 3), (2, 6, 0), (3, 5, 9), (0, 9, 1), (6, 6, 2)] {
                        let edit = TextEdit::replace(es..ee, len).force_move_markers(force);
                        let (ns, ne) = edited((s, e), stickiness, edit);
                        assert!(ns <= ne, "{stickiness:?} {edit:?} on ({s},{e}) -> ({ns},{ne})");
                    }
                }
            }
        }
    }
}

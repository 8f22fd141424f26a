use crate::edit::{self, TextEdit};
use crate::range::TextRange;

/// How an interval reacts to text typed exactly at one of its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stickiness {
    AlwaysGrowsWhenTypingAtEdges,
    #[default]
    NeverGrowsWhenTypingAtEdges,
    GrowsOnlyWhenTypingBefore,
    GrowsOnlyWhenTypingAfter,
}

impl Stickiness {
    /// Whether the start edge stays put (and so absorbs) text inserted at it.
    pub fn start_sticks_to_previous(self) -> bool {
        matches!(
            self,
            Stickiness::AlwaysGrowsWhenTypingAtEdges | Stickiness::GrowsOnlyWhenTypingBefore
        )
    }

    /// Whether the end edge stays put (and so rejects) text inserted at it.
    pub fn end_sticks_to_previous(self) -> bool {
        matches!(
            self,
            Stickiness::NeverGrowsWhenTypingAtEdges | Stickiness::GrowsOnlyWhenTypingBefore
        )
    }
}

/// Per-node flags that the tree stores but does not order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeOptions {
    pub stickiness: Stickiness,
    /// 0 means "no owner"; such nodes pass every owner filter.
    pub owner_id: u32,
    pub for_validation: bool,
    pub in_margin: bool,
    /// collapse to the edit start when an edit replaces the whole interval
    pub collapse_on_replace_edit: bool,
}

impl NodeOptions {
    pub fn stickiness(mut self, stickiness: Stickiness) -> Self {
        self.stickiness = stickiness;
        self
    }

    pub fn owner(mut self, owner_id: u32) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn for_validation(mut self, yes: bool) -> Self {
        self.for_validation = yes;
        self
    }

    pub fn in_margin(mut self, yes: bool) -> Self {
        self.in_margin = yes;
        self
    }

    pub fn collapse_on_replace_edit(mut self, yes: bool) -> Self {
        self.collapse_on_replace_edit = yes;
        self
    }
}

/// A node that is not linked into any tree.
///
/// Built by the caller and handed to [`IntervalTree::insert`], or handed back
/// by [`IntervalTree::delete`] with its absolute interval restored.
///
/// [`IntervalTree::insert`]: crate::IntervalTree::insert
/// [`IntervalTree::delete`]: crate::IntervalTree::delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalNode<T> {
    pub id: T,
    pub start: usize,
    pub end: usize,
    pub options: NodeOptions,
}

impl<T> IntervalNode<T> {
    /// caller should check that start <= end
    pub fn new(id: T, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted interval {start}..{end}");
        Self {
            id,
            start,
            end,
            options: NodeOptions::default(),
        }
    }

    pub fn with_stickiness(mut self, stickiness: Stickiness) -> Self {
        self.options.stickiness = stickiness;
        self
    }

    pub fn with_options(mut self, options: NodeOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        TextRange {
            start: self.start,
            end: self.end,
        }
    }

    #[inline]
    pub fn stickiness(&self) -> Stickiness {
        self.options.stickiness
    }

    /// Move a detached node to a new interval before re-inserting it.
    pub fn reset(&mut self, start: usize, end: usize, stickiness: Stickiness) {
        debug_assert!(start <= end, "inverted interval {start}..{end}");
        self.start = start;
        self.end = end;
        self.options.stickiness = stickiness;
    }

    /// Reposition this node as if `edit` had been applied to the document.
    pub fn accept_edit(&mut self, edit: &TextEdit) {
        let (start, end) = edit::accept_edit(
            self.start as i64,
            self.end as i64,
            &self.options,
            edit,
        );
        self.start = start as usize;
        self.end = end as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_never_growing() {
        let node = IntervalNode::new((), 3, 7);
        assert_eq!(node.stickiness(), Stickiness::NeverGrowsWhenTypingAtEdges);
        assert_eq!(node.range(), TextRange::new(3, 7));
    }

    #[test]
    fn reset_moves_and_restyles() {
        let mut node = IntervalNode::new("a", 3, 7);
        node.reset(10, 12, Stickiness::GrowsOnlyWhenTypingAfter);
        assert_eq!(node.range(), TextRange::new(10, 12));
        assert_eq!(node.stickiness(), Stickiness::GrowsOnlyWhenTypingAfter);
        assert_eq!(node.id, "a");
    }

    #[test]
    fn edge_policy_table() {
        use Stickiness::*;
        let table = [
            (AlwaysGrowsWhenTypingAtEdges, true, false),
            (NeverGrowsWhenTypingAtEdges, false, true),
            (GrowsOnlyWhenTypingBefore, true, true),
            (GrowsOnlyWhenTypingAfter, false, false),
        ];
        for (stickiness, start, end) in table {
            assert_eq!(stickiness.start_sticks_to_previous(), start, "{stickiness:?}");
            assert_eq!(stickiness.end_sticks_to_previous(), end, "{stickiness:?}");
        }
    }
}

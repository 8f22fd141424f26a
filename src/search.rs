use crate::node::NodeOptions;
use crate::range::TextRange;
use crate::{IntervalTree, NodeId, SENTINEL};

/// Filters applied by [`IntervalTree::interval_search`] and
/// [`IntervalTree::search`]. The default keeps every node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Keep nodes owned by this owner, plus nodes without an owner.
    pub owner: Option<u32>,
    /// Drop nodes flagged `for_validation`.
    pub filter_out_validation: bool,
    /// Keep only nodes flagged `in_margin`.
    pub only_margin: bool,
}

impl SearchOptions {
    pub fn owner(mut self, owner: u32) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn filter_out_validation(mut self, yes: bool) -> Self {
        self.filter_out_validation = yes;
        self
    }

    pub fn only_margin(mut self, yes: bool) -> Self {
        self.only_margin = yes;
        self
    }

    fn accepts(&self, options: &NodeOptions) -> bool {
        if let Some(owner) = self.owner {
            if options.owner_id != 0 && options.owner_id != owner {
                return false;
            }
        }
        if self.filter_out_validation && options.for_validation {
            return false;
        }
        !(self.only_margin && !options.in_margin)
    }
}

/// A node as seen from outside the tree: its handle, absolute range and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef<'a, T> {
    pub node: NodeId,
    pub range: TextRange,
    pub id: &'a T,
}

impl<T> IntervalTree<T> {
    /// Recursively collect the nodes of the subtree rooted at `n` whose
    /// interval overlaps `[start, end]`, in order. `delta` is the base of `n`.
    fn search_subtree(
        &self,
        n: NodeId,
        delta: i64,
        start: i64,
        end: i64,
        options: &SearchOptions,
        results: &mut Vec<(NodeId, i64, i64)>,
    ) {
        if n == SENTINEL {
            return;
        }
        let node = self.node(n);
        if delta + node.max_end < start {
            // everything here ends before the query
            return;
        }
        self.search_subtree(node.left, delta, start, end, options, results);
        let node_start = delta + node.start;
        if node_start > end {
            // so does everything to the right
            return;
        }
        let node_end = delta + node.end;
        if node_end >= start && options.accepts(&node.options) {
            results.push((n, node_start, node_end));
        }
        self.search_subtree(node.right, delta + node.delta, start, end, options, results);
    }

    /// Unfiltered search, used to find the nodes an edit touches.
    pub(crate) fn collect_touching(
        &self,
        n: NodeId,
        delta: i64,
        start: i64,
        end: i64,
        results: &mut Vec<(NodeId, i64, i64)>,
    ) {
        self.search_subtree(n, delta, start, end, &SearchOptions::default(), results);
    }

    fn node_refs(&self, found: Vec<(NodeId, i64, i64)>) -> Vec<NodeRef<'_, T>> {
        found
            .into_iter()
            .filter_map(|(n, start, end)| {
                let id = self.values[n.index()].as_ref()?;
                Some(NodeRef {
                    node: n,
                    range: TextRange {
                        start: start as usize,
                        end: end as usize,
                    },
                    id,
                })
            })
            .collect()
    }

    /// Find all nodes whose interval overlaps `[start, end]`, in order.
    /// Both ends are inclusive: an interval ending at `start` or starting at
    /// `end` is a match.
    pub fn interval_search(
        &self,
        start: usize,
        end: usize,
        options: &SearchOptions,
    ) -> Vec<NodeRef<'_, T>> {
        let mut found = Vec::new();
        self.search_subtree(self.root, 0, start as i64, end as i64, options, &mut found);
        self.node_refs(found)
    }

    /// All nodes passing `options`, in order.
    pub fn search(&self, options: &SearchOptions) -> Vec<NodeRef<'_, T>> {
        let mut found = Vec::new();
        self.walk_in_order(self.root, 0, &mut |n, node_start, node_end| {
            if options.accepts(&self.node(n).options) {
                found.push((n, node_start, node_end));
            }
        });
        self.node_refs(found)
    }

    /// A snapshot of every node in order, with absolute ranges.
    pub fn get_all_in_order(&self) -> Vec<NodeRef<'_, T>> {
        self.search(&SearchOptions::default())
    }

    /// Handles of every node whose owner is exactly `owner_id`, in order.
    pub fn collect_nodes_from_owner(&self, owner_id: u32) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk_in_order(self.root, 0, &mut |n, _, _| {
            if self.node(n).options.owner_id == owner_id {
                found.push(n);
            }
        });
        found
    }

    /// Recursively applies a function to each node in the subtree in order,
    /// with its absolute start and end.
    fn walk_in_order<F>(&self, n: NodeId, delta: i64, f: &mut F)
    where
        F: FnMut(NodeId, i64, i64),
    {
        if n == SENTINEL {
            return;
        }
        let node = self.node(n);
        self.walk_in_order(node.left, delta, f);
        f(n, delta + node.start, delta + node.end);
        self.walk_in_order(node.right, delta + node.delta, f);
    }
}

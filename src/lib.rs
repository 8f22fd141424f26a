use std::cmp::{max, Ordering};

pub mod config;
pub mod edit;
pub mod node;
pub mod range;
pub mod search;
mod validate;

pub use config::TreeConfig;
pub use edit::TextEdit;
pub use node::{IntervalNode, NodeOptions, Stickiness};
pub use range::TextRange;
pub use search::{NodeRef, SearchOptions};

use range::interval_cmp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Color {
    Red = 0,
    Black,
}

/// Handle of a node stored in an [`IntervalTree`].
///
/// Handles stay valid while the node is in the tree, across rotations, edits
/// and [`IntervalTree::change`]. Once the node is deleted the slot may be
/// reused by a later insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena slot 0. Stands in for every missing child and for the parent of the
/// root. Nothing ever writes to it.
const SENTINEL: NodeId = NodeId(0);

/// A linked node. `start`, `end` and `max_end` are relative to the node's
/// base, which is the sum of `delta` over every ancestor whose right subtree
/// contains this node.
#[derive(Debug, Clone)]
struct Node {
    parent: NodeId,
    left: NodeId,
    right: NodeId,
    color: Color,
    start: i64,
    end: i64,
    /// offset applied to the right subtree
    delta: i64,
    max_end: i64,
    options: NodeOptions,
}

impl Node {
    const SENTINEL: Node = Node {
        parent: SENTINEL,
        left: SENTINEL,
        right: SENTINEL,
        color: Color::Black,
        start: 0,
        end: 0,
        delta: 0,
        max_end: 0,
        options: NodeOptions {
            stickiness: Stickiness::NeverGrowsWhenTypingAtEdges,
            owner_id: 0,
            for_validation: false,
            in_margin: false,
            collapse_on_replace_edit: false,
        },
    };

    fn detached(start: i64, end: i64, options: NodeOptions) -> Self {
        Self {
            parent: SENTINEL,
            left: SENTINEL,
            right: SENTINEL,
            color: Color::Red,
            start,
            end,
            delta: 0,
            max_end: end,
            options,
        }
    }
}

#[derive(Debug, Clone)]
/// An interval tree using a red-black tree, whereas keys are document ranges
/// and values are whatever the caller tracks with them (decoration ids,
/// markers, diagnostics).
///
/// Intervals are sorted by their starting point, then their ending point.
/// Overlapping and identical intervals are allowed and kept as separate
/// nodes.
///
/// NOTE positions are delta-encoded: shifting every interval after an edit
/// touches only the O(log n) nodes on the boundary of the edit, the rest move
/// along with an ancestor's `delta`.
pub struct IntervalTree<T> {
    nodes: Vec<Node>,
    values: Vec<Option<T>>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
    config: TreeConfig,
    normalize_requested: bool,
}

impl<T> Default for IntervalTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

// arena access
impl<T> IntervalTree<T> {
    #[inline]
    fn node(&self, n: NodeId) -> &Node {
        &self.nodes[n.index()]
    }

    #[inline]
    fn node_mut(&mut self, n: NodeId) -> &mut Node {
        debug_assert_ne!(n, SENTINEL, "write to the sentinel");
        &mut self.nodes[n.index()]
    }

    #[inline]
    fn parent(&self, n: NodeId) -> NodeId {
        self.node(n).parent
    }

    #[inline]
    fn left(&self, n: NodeId) -> NodeId {
        self.node(n).left
    }

    #[inline]
    fn right(&self, n: NodeId) -> NodeId {
        self.node(n).right
    }

    #[inline]
    fn color(&self, n: NodeId) -> Color {
        self.node(n).color
    }

    #[inline]
    fn set_color(&mut self, n: NodeId, color: Color) {
        if n != SENTINEL {
            self.node_mut(n).color = color;
        }
    }

    fn is_linked(&self, n: NodeId) -> bool {
        n != SENTINEL && self.values.get(n.index()).is_some_and(Option::is_some)
    }

    fn alloc(&mut self, node: Node, val: T) -> NodeId {
        match self.free.pop() {
            Some(n) => {
                self.nodes[n.index()] = node;
                self.values[n.index()] = Some(val);
                n
            }
            None => {
                let n = NodeId(self.nodes.len() as u32);
                self.nodes.push(node);
                self.values.push(Some(val));
                n
            }
        }
    }

    /// Shift `n` and, through its delta, its right subtree by `by`. The left
    /// subtree shares `n`'s base and does not move.
    fn rebase(&mut self, n: NodeId, by: i64) {
        if n == SENTINEL || by == 0 {
            return;
        }
        let node = self.node_mut(n);
        node.start += by;
        node.end += by;
        node.delta += by;
        let delta = node.delta;
        self.note_delta(delta);
    }

    #[inline]
    fn note_delta(&mut self, delta: i64) {
        if self.config.delta_overflows(delta) {
            self.normalize_requested = true;
        }
    }
}

// augmentation
impl<T> IntervalTree<T> {
    fn compute_max_end(&self, n: NodeId) -> i64 {
        let node = self.node(n);
        let mut max_end = node.end;
        if node.left != SENTINEL {
            max_end = max(max_end, self.node(node.left).max_end);
        }
        if node.right != SENTINEL {
            max_end = max(max_end, self.node(node.right).max_end + node.delta);
        }
        max_end
    }

    fn recompute_max_end(&mut self, n: NodeId) {
        if n != SENTINEL {
            let max_end = self.compute_max_end(n);
            self.node_mut(n).max_end = max_end;
        }
    }

    /// Recompute `max_end` upwards from `n`, stopping once a value is stable.
    fn recompute_max_end_to_root(&mut self, mut n: NodeId) {
        while n != SENTINEL {
            let max_end = self.compute_max_end(n);
            if self.node(n).max_end == max_end {
                return;
            }
            self.node_mut(n).max_end = max_end;
            n = self.parent(n);
        }
    }

    /// perform the following operation on x and its right child y:
    ///      |            |
    ///      x            y
    ///     / \          / \
    ///    a   y   =>   x   c
    ///       / \      / \
    ///      b   c    a   b
    ///
    /// y leaves x's right subtree, so x's delta is folded into it.
    fn rotate_left(&mut self, x: NodeId) {
        let y = self.right(x);
        let x_delta = self.node(x).delta;
        self.rebase(y, x_delta);

        let b = self.left(y);
        self.node_mut(x).right = b;
        if b != SENTINEL {
            self.node_mut(b).parent = x;
        }
        let x_parent = self.parent(x);
        self.node_mut(y).parent = x_parent;
        if x_parent == SENTINEL {
            self.root = y;
        } else if x == self.left(x_parent) {
            self.node_mut(x_parent).left = y;
        } else {
            self.node_mut(x_parent).right = y;
        }
        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;

        self.recompute_max_end(x);
        self.recompute_max_end(y);
    }

    /// perform the following operation on y and its left child x:
    ///      |            |
    ///      y            x
    ///     / \          / \
    ///    x   c   =>   a   y
    ///   / \              / \
    ///  a   b            b   c
    ///
    /// y moves into x's right subtree, so x's delta is taken out of it.
    fn rotate_right(&mut self, y: NodeId) {
        let x = self.left(y);
        let x_delta = self.node(x).delta;
        self.rebase(y, -x_delta);

        let b = self.right(x);
        self.node_mut(y).left = b;
        if b != SENTINEL {
            self.node_mut(b).parent = y;
        }
        let y_parent = self.parent(y);
        self.node_mut(x).parent = y_parent;
        if y_parent == SENTINEL {
            self.root = x;
        } else if y == self.right(y_parent) {
            self.node_mut(y_parent).right = x;
        } else {
            self.node_mut(y_parent).left = x;
        }
        self.node_mut(x).right = y;
        self.node_mut(y).parent = x;

        self.recompute_max_end(y);
        self.recompute_max_end(x);
    }
}

// insertion
impl<T> IntervalTree<T> {
    /// Plain BST insert of `z`, whose `start`/`end` are absolute on entry and
    /// relative to its new parent on exit.
    fn bst_insert(&mut self, z: NodeId) {
        let (z_start, z_end) = {
            let node = self.node(z);
            (node.start, node.end)
        };
        let mut delta = 0;
        let mut x = self.root;
        loop {
            let node = self.node(x);
            let (left, right, x_delta) = (node.left, node.right, node.delta);
            let cmp = interval_cmp(z_start, z_end, node.start + delta, node.end + delta);
            if cmp == Ordering::Less {
                if left == SENTINEL {
                    self.shift_detached(z, -delta);
                    self.node_mut(x).left = z;
                    break;
                }
                x = left;
            } else {
                if right == SENTINEL {
                    self.shift_detached(z, -(delta + x_delta));
                    self.node_mut(x).right = z;
                    break;
                }
                delta += x_delta;
                x = right;
            }
        }
        let node = self.node_mut(z);
        node.parent = x;
        node.left = SENTINEL;
        node.right = SENTINEL;
        node.color = Color::Red;
    }

    fn shift_detached(&mut self, n: NodeId, by: i64) {
        let node = self.node_mut(n);
        node.start += by;
        node.end += by;
        node.max_end += by;
    }

    /// Link a node whose `start`/`end` hold absolute coordinates.
    fn link(&mut self, z: NodeId) {
        {
            let node = self.node_mut(z);
            node.parent = SENTINEL;
            node.left = SENTINEL;
            node.right = SENTINEL;
            node.delta = 0;
            node.max_end = node.end;
        }
        self.len += 1;

        if self.root == SENTINEL {
            self.node_mut(z).color = Color::Black;
            self.root = z;
            return;
        }

        self.bst_insert(z);
        self.recompute_max_end_to_root(self.parent(z));

        let mut x = z;
        while x != self.root && self.color(self.parent(x)) == Color::Red {
            let p = self.parent(x);
            let g = self.parent(p);
            if p == self.left(g) {
                let uncle = self.right(g);
                if self.color(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    x = g;
                } else {
                    if x == self.right(p) {
                        x = p;
                        self.rotate_left(x);
                    }
                    let p = self.parent(x);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.left(g);
                if self.color(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    x = g;
                } else {
                    if x == self.left(p) {
                        x = p;
                        self.rotate_right(x);
                    }
                    let p = self.parent(x);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_left(g);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }
}

// deletion
impl<T> IntervalTree<T> {
    fn leftmost(&self, mut n: NodeId) -> NodeId {
        while self.left(n) != SENTINEL {
            n = self.left(n);
        }
        n
    }

    /// Unlink `z` from the tree. The slot stays allocated; `z`'s coordinates
    /// are meaningless afterwards.
    ///
    /// `z` itself is always the node removed: with two children its in-order
    /// successor `y` takes over `z`'s position, links, color and delta.
    fn unlink(&mut self, z: NodeId) {
        let (z_left, z_right, z_delta) = {
            let node = self.node(z);
            (node.left, node.right, node.delta)
        };
        let x;
        let y;
        if z_left == SENTINEL {
            x = z_right;
            y = z;
            // x leaves z's right subtree
            self.rebase(x, z_delta);
        } else if z_right == SENTINEL {
            x = z_left;
            y = z;
        } else {
            y = self.leftmost(z_right);
            x = self.right(y);
            // keep z's delta in y instead of rewriting z's right subtree;
            // only x, which moves up to y's old place, needs adjusting
            let y_delta = self.node(y).delta;
            self.rebase(x, y_delta);
            let node = self.node_mut(y);
            node.start += z_delta;
            node.end += z_delta;
            node.delta = z_delta;
            self.note_delta(z_delta);
        }
        self.len -= 1;

        if y == self.root {
            self.root = x;
            if x != SENTINEL {
                let node = self.node_mut(x);
                node.color = Color::Black;
                node.parent = SENTINEL;
                self.recompute_max_end(x);
            }
            self.detach(z);
            return;
        }

        let y_was_red = self.color(y) == Color::Red;
        let y_parent = self.parent(y);
        if y == self.left(y_parent) {
            self.node_mut(y_parent).left = x;
        } else {
            self.node_mut(y_parent).right = x;
        }

        let x_parent = if y == z {
            y_parent
        } else {
            let x_parent = if y_parent == z { y } else { y_parent };
            let (z_left, z_right, z_parent, z_color) = {
                let node = self.node(z);
                (node.left, node.right, node.parent, node.color)
            };
            {
                let node = self.node_mut(y);
                node.left = z_left;
                node.right = z_right;
                node.parent = z_parent;
                node.color = z_color;
            }
            if z == self.root {
                self.root = y;
            } else if z == self.left(z_parent) {
                self.node_mut(z_parent).left = y;
            } else {
                self.node_mut(z_parent).right = y;
            }
            if z_left != SENTINEL {
                self.node_mut(z_left).parent = y;
            }
            if z_right != SENTINEL {
                self.node_mut(z_right).parent = y;
            }
            x_parent
        };
        if x != SENTINEL {
            self.node_mut(x).parent = x_parent;
        }

        self.detach(z);

        self.recompute_max_end(x);
        self.recompute_max_end_to_root(x_parent);
        if y != z {
            self.recompute_max_end_to_root(y);
            self.recompute_max_end_to_root(self.parent(y));
        }

        if !y_was_red {
            self.delete_fixup(x, x_parent);
        }
    }

    /// Restore the red-black rules after a black node was removed above `x`.
    /// `x` may be the sentinel, so its parent is tracked separately.
    fn delete_fixup(&mut self, mut x: NodeId, mut x_parent: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            if x == self.left(x_parent) {
                let mut w = self.right(x_parent);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(x_parent, Color::Red);
                    self.rotate_left(x_parent);
                    w = self.right(x_parent);
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = x_parent;
                    x_parent = self.parent(x);
                } else {
                    if self.color(self.right(w)) == Color::Black {
                        self.set_color(self.left(w), Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(x_parent);
                    }
                    self.set_color(w, self.color(x_parent));
                    self.set_color(x_parent, Color::Black);
                    self.set_color(self.right(w), Color::Black);
                    self.rotate_left(x_parent);
                    x = self.root;
                    x_parent = SENTINEL;
                }
            } else {
                let mut w = self.left(x_parent);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(x_parent, Color::Red);
                    self.rotate_right(x_parent);
                    w = self.left(x_parent);
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = x_parent;
                    x_parent = self.parent(x);
                } else {
                    if self.color(self.left(w)) == Color::Black {
                        self.set_color(self.right(w), Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(x_parent);
                    }
                    self.set_color(w, self.color(x_parent));
                    self.set_color(x_parent, Color::Black);
                    self.set_color(self.left(w), Color::Black);
                    self.rotate_right(x_parent);
                    x = self.root;
                    x_parent = SENTINEL;
                }
            }
        }
        self.set_color(x, Color::Black);
    }

    /// Clear the links of a removed node so it cannot reach live structure.
    fn detach(&mut self, n: NodeId) {
        let node = self.node_mut(n);
        node.parent = SENTINEL;
        node.left = SENTINEL;
        node.right = SENTINEL;
        node.delta = 0;
    }
}

// delta normalization
impl<T> IntervalTree<T> {
    fn normalize_delta_if_necessary(&mut self) {
        if !self.normalize_requested {
            return;
        }
        self.normalize_requested = false;
        log::debug!(
            "flattening deltas of {} nodes (threshold {})",
            self.len,
            self.config.max_delta
        );
        self.normalize_subtree(self.root, 0);
    }

    /// Post-order pass turning every coordinate absolute.
    fn normalize_subtree(&mut self, n: NodeId, delta: i64) {
        if n == SENTINEL {
            return;
        }
        let (left, right, n_delta) = {
            let node = self.node(n);
            (node.left, node.right, node.delta)
        };
        self.normalize_subtree(left, delta);
        self.normalize_subtree(right, delta + n_delta);
        let node = self.node_mut(n);
        node.start += delta;
        node.end += delta;
        node.delta = 0;
        self.recompute_max_end(n);
    }
}

// edits
impl<T> IntervalTree<T> {
    /// Shift every node starting after `end` by `edit_delta`, skipping
    /// subtrees that end before `start`. Nodes intersecting `[start, end]`
    /// must already be unlinked.
    fn shift_after_edit(&mut self, n: NodeId, delta: i64, start: i64, end: i64, edit_delta: i64) {
        if n == SENTINEL {
            return;
        }
        let (left, right, max_end) = {
            let node = self.node(n);
            (node.left, node.right, node.max_end)
        };
        if delta + max_end < start {
            return;
        }
        self.shift_after_edit(left, delta, start, end, edit_delta);
        if delta + self.node(n).start > end {
            // moves the right subtree along with this node
            self.rebase(n, edit_delta);
        } else {
            let n_delta = self.node(n).delta;
            self.shift_after_edit(right, delta + n_delta, start, end, edit_delta);
        }
        self.recompute_max_end(n);
    }

    /// Reposition every interval after the document applied `edit`.
    ///
    /// Intervals touching the edited span are taken out, the rest of the tree
    /// is shifted in place, then the touched intervals are adjusted one by one
    /// according to their stickiness and linked back in. Handles stay valid.
    pub fn accept_edit(&mut self, edit: &TextEdit) {
        let start = edit.start as i64;
        let end = edit.end as i64;
        let mut touched = Vec::new();
        self.collect_touching(self.root, 0, start, end, &mut touched);
        log::debug!("applying {edit:?}: {} of {} intervals touched", touched.len(), self.len);

        for &(n, _, _) in &touched {
            self.unlink(n);
        }
        self.normalize_delta_if_necessary();

        self.shift_after_edit(self.root, 0, start, end, edit.delta());
        self.normalize_delta_if_necessary();

        for (n, node_start, node_end) in touched {
            let (new_start, new_end) =
                edit::accept_edit(node_start, node_end, &self.node(n).options, edit);
            let node = self.node_mut(n);
            node.start = new_start;
            node.end = new_end;
            self.link(n);
        }
        self.normalize_delta_if_necessary();
    }
}

impl<T> IntervalTree<T> {
    /// Creates an empty interval tree.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            nodes: vec![Node::SENTINEL],
            values: vec![None],
            free: Vec::new(),
            root: SENTINEL,
            len: 0,
            config,
            normalize_requested: false,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of intervals in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root == SENTINEL
    }

    /// Link a detached node into the tree and return its handle.
    pub fn insert(&mut self, node: IntervalNode<T>) -> NodeId {
        let IntervalNode {
            id,
            start,
            end,
            options,
        } = node;
        let n = self.alloc(Node::detached(start as i64, end as i64, options), id);
        self.link(n);
        log::trace!("inserted {n:?} at {start}..{end}");
        self.normalize_delta_if_necessary();
        n
    }

    /// Remove the node from the tree and hand it back with its absolute
    /// interval. Returns `None` for a handle that is not in the tree.
    pub fn delete(&mut self, n: NodeId) -> Option<IntervalNode<T>> {
        let range = self.resolve(n)?;
        self.unlink(n);
        self.normalize_delta_if_necessary();
        let id = self.values[n.index()].take()?;
        self.free.push(n);
        log::trace!("deleted {n:?} at {}..{}", range.start, range.end);
        Some(IntervalNode {
            id,
            start: range.start,
            end: range.end,
            options: self.node(n).options,
        })
    }

    /// Move a node to a new interval, keeping its handle.
    ///
    /// Returns `false` for a handle that is not in the tree.
    pub fn change(&mut self, n: NodeId, range: impl Into<TextRange>) -> bool {
        if !self.is_linked(n) {
            return false;
        }
        let range = range.into();
        self.unlink(n);
        self.normalize_delta_if_necessary();
        let node = self.node_mut(n);
        node.start = range.start as i64;
        node.end = range.end as i64;
        self.link(n);
        self.normalize_delta_if_necessary();
        true
    }

    /// Absolute interval of a node, computed by walking up to the root.
    pub fn resolve(&self, n: NodeId) -> Option<TextRange> {
        if !self.is_linked(n) {
            return None;
        }
        let mut delta = 0;
        let mut cur = n;
        while cur != self.root {
            let parent = self.parent(cur);
            if cur == self.right(parent) {
                delta += self.node(parent).delta;
            }
            cur = parent;
        }
        let node = self.node(n);
        Some(TextRange {
            start: (node.start + delta) as usize,
            end: (node.end + delta) as usize,
        })
    }

    pub fn get(&self, n: NodeId) -> Option<&T> {
        self.values.get(n.index())?.as_ref()
    }

    pub fn get_mut(&mut self, n: NodeId) -> Option<&mut T> {
        self.values.get_mut(n.index())?.as_mut()
    }

    pub fn options(&self, n: NodeId) -> Option<NodeOptions> {
        self.is_linked(n).then(|| self.node(n).options)
    }

    /// Replace a node's flags. Its position in the tree does not depend on
    /// them, so no rebalancing happens.
    pub fn set_options(&mut self, n: NodeId, options: NodeOptions) -> bool {
        if !self.is_linked(n) {
            return false;
        }
        self.node_mut(n).options = options;
        true
    }

    /// Drop every interval.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.values.truncate(1);
        self.free.clear();
        self.root = SENTINEL;
        self.len = 0;
        self.normalize_requested = false;
    }
}

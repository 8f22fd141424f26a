use std::cmp::{max, Ordering};

use anyhow::{bail, ensure, Result};

use crate::range::interval_cmp;
use crate::{Color, IntervalTree, NodeId, SENTINEL};

/// Facts about a checked subtree, all in absolute coordinates.
struct Subtree {
    size: usize,
    max_end: Option<i64>,
    black_height: usize,
    first: Option<(i64, i64)>,
    last: Option<(i64, i64)>,
}

impl<T> IntervalTree<T> {
    /// Validate the whole tree, returning the first broken invariant.
    ///
    /// Walks every node, so this is meant for tests and debugging rather than
    /// production call paths.
    pub fn check_invariants(&self) -> Result<()> {
        let sentinel = self.node(SENTINEL);
        ensure!(
            sentinel.parent == SENTINEL && sentinel.left == SENTINEL && sentinel.right == SENTINEL,
            "sentinel links were modified"
        );
        ensure!(
            sentinel.start == 0 && sentinel.end == 0 && sentinel.delta == 0 && sentinel.max_end == 0,
            "sentinel coordinates were modified"
        );
        ensure!(sentinel.color == Color::Black, "sentinel is not black");

        if self.root == SENTINEL {
            ensure!(self.len == 0, "empty tree reports {} nodes", self.len);
            return Ok(());
        }
        ensure!(self.parent(self.root) == SENTINEL, "root has a parent");
        ensure!(self.color(self.root) == Color::Black, "root is not black");

        let subtree = self.check_subtree(self.root, 0)?;
        ensure!(
            subtree.size == self.len,
            "tree holds {} nodes but reports {}",
            subtree.size,
            self.len
        );
        Ok(())
    }

    fn check_subtree(&self, n: NodeId, delta: i64) -> Result<Subtree> {
        if n == SENTINEL {
            return Ok(Subtree {
                size: 0,
                max_end: None,
                black_height: 0,
                first: None,
                last: None,
            });
        }
        let node = self.node(n);
        ensure!(self.get(n).is_some(), "{n:?} is linked but has no value");
        let start = delta + node.start;
        let end = delta + node.end;
        ensure!(start >= 0 && start <= end, "{n:?} has invalid interval {start}..{end}");
        ensure!(
            !self.config.delta_overflows(node.delta),
            "{n:?} delta {} exceeds {}",
            node.delta,
            self.config.max_delta
        );

        for child in [node.left, node.right] {
            if child == SENTINEL {
                continue;
            }
            ensure!(self.parent(child) == n, "{child:?} does not point back to {n:?}");
            if node.color == Color::Red {
                ensure!(self.color(child) == Color::Black, "red {n:?} has red child {child:?}");
            }
        }

        let left = self.check_subtree(node.left, delta)?;
        let right = self.check_subtree(node.right, delta + node.delta)?;
        if left.black_height != right.black_height {
            bail!(
                "black height differs below {n:?}: {} vs {}",
                left.black_height,
                right.black_height
            );
        }
        if let Some((s, e)) = left.last {
            ensure!(
                interval_cmp(s, e, start, end) != Ordering::Greater,
                "left of {n:?} holds {s}..{e} after {start}..{end}"
            );
        }
        if let Some((s, e)) = right.first {
            ensure!(
                interval_cmp(s, e, start, end) != Ordering::Less,
                "right of {n:?} holds {s}..{e} before {start}..{end}"
            );
        }

        let max_end = [Some(end), left.max_end, right.max_end]
            .into_iter()
            .flatten()
            .fold(end, max);
        ensure!(
            delta + node.max_end == max_end,
            "{n:?} caches max end {} instead of {max_end}",
            delta + node.max_end
        );

        Ok(Subtree {
            size: left.size + right.size + 1,
            max_end: Some(max_end),
            black_height: left.black_height + usize::from(node.color == Color::Black),
            first: left.first.or(Some((start, end))),
            last: right.last.or(Some((start, end))),
        })
    }
}

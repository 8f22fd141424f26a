use anyhow::{ensure, Result};
use marker_tree::{IntervalNode, IntervalTree, SearchOptions, Stickiness, TextEdit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MARKERS: usize = 1000;
const EDITS: usize = 500;
const DOC_LEN: usize = 100_000;

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(42);
    let mut tree = IntervalTree::new();
    for i in 0..MARKERS {
        let start = rng.gen_range(0..DOC_LEN);
        let end = start + rng.gen_range(0..80);
        let stickiness = match rng.gen_range(0..4) {
            0 => Stickiness::AlwaysGrowsWhenTypingAtEdges,
            1 => Stickiness::NeverGrowsWhenTypingAtEdges,
            2 => Stickiness::GrowsOnlyWhenTypingBefore,
            _ => Stickiness::GrowsOnlyWhenTypingAfter,
        };
        tree.insert(IntervalNode::new(i, start, end).with_stickiness(stickiness));
    }

    let mut doc_len = DOC_LEN;
    for _ in 0..EDITS {
        let start = rng.gen_range(0..doc_len);
        let end = (start + rng.gen_range(0..20)).min(doc_len);
        let edit = TextEdit::replace(start..end, rng.gen_range(0..20));
        tree.accept_edit(&edit);
        doc_len = (doc_len as i64 + edit.delta()) as usize;
    }
    tree.check_invariants()?;

    let all = tree.get_all_in_order();
    ensure!(all.len() == MARKERS, "lost markers: {} left", all.len());
    println!("{} markers after {EDITS} edits, document is {doc_len} long", all.len());
    for node in all.iter().take(5) {
        println!("marker {:>4}: {:?}", node.id, node.range);
    }

    let window = tree.interval_search(doc_len / 2, doc_len / 2 + 200, &SearchOptions::default());
    println!("{} markers overlap the middle of the document", window.len());
    Ok(())
}

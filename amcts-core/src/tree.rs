//! Shared search tree data model.
//!
//! ## Architecture
//! - Level 2: `Tree` — owns the synthetic root edge and the depth cap.
//! - Level 3: `Edge` / `Node` — the statistics UCT reads and writes, lock-free.
//!
//! All mutable edge/node state is reached through atomics or raw pointers so
//! multiple workers can traverse and update the tree without a lock. Reading
//! a raw pointer obtained from an `AtomicPtr` load is safe only because nodes
//! are never freed individually — the owning `NodePool` frees everything at
//! once when the tree (and its workers) are torn down.

use std::sync::atomic::{AtomicI64, AtomicPtr, AtomicU64, Ordering};

// ============================================================================
// EDGE
// ============================================================================

/// One branching decision in the tree.
pub struct Edge {
    /// Position within the owning node's `actions`, stable for the edge's
    /// lifetime. `0` (and meaningless) for the tree's synthetic root edge.
    pub id: u32,
    /// Non-owning back-reference to the node that owns this edge. Null only
    /// for the synthetic root edge, whose "parent" is the tree itself.
    pub prev_state: *const Node,
    /// The child node this edge leads to, or null when unexpanded. Monotone:
    /// published exactly once via `publish_state`, never cleared afterward.
    state: AtomicPtr<Node>,
    pub visits: AtomicU64,
    pub pending_updates: AtomicU64,
    score_bits: AtomicU64,
    /// Reserved extension point for a future prior probability; unused by
    /// the current UCT formula.
    pub prior: f32,
}

// Safety: all shared mutable fields are atomics; `prev_state` is a read-only
// back-reference valid for the arena's lifetime (never mutated after
// construction, never dereferenced past teardown).
unsafe impl Send for Edge {}
unsafe impl Sync for Edge {}

impl Edge {
    fn new(id: u32) -> Self {
        Self {
            id,
            prev_state: std::ptr::null(),
            state: AtomicPtr::new(std::ptr::null_mut()),
            visits: AtomicU64::new(0),
            pending_updates: AtomicU64::new(0),
            score_bits: AtomicU64::new(0f64.to_bits()),
            prior: 0.0,
        }
    }

    /// The tree's synthetic root edge: no parent, no child yet.
    pub fn synthetic_root() -> Self {
        Self::new(0)
    }

    pub fn score(&self) -> f64 {
        f64::from_bits(self.score_bits.load(Ordering::Relaxed))
    }

    pub fn set_score(&self, value: f64) {
        self.score_bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn state(&self) -> *const Node {
        self.state.load(Ordering::Acquire)
    }

    pub fn is_unexpanded(&self) -> bool {
        self.state().is_null()
    }

    /// Publish a freshly initialized child node. Single-writer per edge in
    /// the documented protocol; concurrent racing writers are tolerated
    /// (last writer wins, the losing node leaks into the arena).
    pub fn publish_state(&self, node: *mut Node) {
        self.state.store(node, Ordering::Release);
    }
}

// ============================================================================
// NODE
// ============================================================================

/// A search state reached via exactly one edge.
pub struct Node {
    /// The edge that led to this node. Never null: even the real root's
    /// node is reached via the tree's synthetic root edge.
    pub prev_action: *const Edge,
    /// One edge per available branching variable at this state.
    pub actions: Box<[Edge]>,
    /// Parallel to `actions`: the evaluator's variable ID for action `i`.
    /// Permuted once at construction time for random tie-breaking.
    pub action_vars: Box<[i64]>,
    /// Index into `actions` of the child edge with the highest (worst) mean
    /// score so far, or `-1` (sentinel "none").
    pub worst_score_id: AtomicI64,
}

unsafe impl Send for Node {}
unsafe impl Sync for Node {}

impl Node {
    pub(crate) fn new(prev_action: *const Edge, n_actions: usize) -> Self {
        let actions = (0..n_actions)
            .map(|i| Edge::new(i as u32))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            prev_action,
            actions,
            action_vars: vec![0i64; n_actions].into_boxed_slice(),
            worst_score_id: AtomicI64::new(-1),
        }
    }

    pub fn n_actions(&self) -> usize {
        self.actions.len()
    }
}

// ============================================================================
// TREE
// ============================================================================

/// Owns the synthetic root edge and the immutable depth cap.
///
/// Workers are not stored here: each worker owns its own arena and is driven
/// by the caller (see `crate::worker`). `Tree` only needs to outlive every
/// worker thread, which callers typically ensure by holding it in an `Arc`.
pub struct Tree {
    pub root: Edge,
    /// Negative means "no cap".
    pub max_depth: i64,
}

unsafe impl Send for Tree {}
unsafe impl Sync for Tree {}

impl Tree {
    pub fn new(max_depth: i64) -> Self {
        Self { root: Edge::synthetic_root(), max_depth }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tree_root_is_unexpanded() {
        let tree = Tree::new(-1);
        assert!(tree.root.is_unexpanded());
        assert_eq!(tree.root.visits.load(Ordering::Relaxed), 0);
        assert_eq!(tree.root.score(), 0.0);
    }

    #[test]
    fn score_round_trips_through_atomic_bits() {
        let edge = Edge::synthetic_root();
        edge.set_score(3.5);
        assert_eq!(edge.score(), 3.5);
        edge.set_score(-1.25);
        assert_eq!(edge.score(), -1.25);
    }

    #[test]
    fn node_actions_have_consistent_back_references() {
        let root = Edge::synthetic_root();
        let node = Node::new(&root as *const Edge, 4);
        for (i, edge) in node.actions.iter().enumerate() {
            assert_eq!(edge.id as usize, i);
        }
        assert_eq!(node.n_actions(), 4);
    }
}

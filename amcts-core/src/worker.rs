//! Per-rollout protocol driver.
//!
//! A `Worker` owns its own arena and random generator and is driven by
//! `run_rollout` in a loop by the caller — the core does not decide how many
//! rollouts to run or when to stop; that's an orchestrator's job.

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::backprop::backprop;
use crate::channel::{Channel, MSG_GET_SCORE, MSG_START, MSG_SWITCH_ROLLOUT, MSG_STOP};
use crate::config::WorkerConfig;
use crate::error::ProtocolError;
use crate::expand::expand;
use crate::pool::NodePool;
use crate::select::select_child;
use crate::tree::{Edge, Tree};

/// One worker's private state: its arena, its RNG, its exploration
/// constant. Not `Sync` — a worker is driven by exactly one thread.
pub struct Worker {
    pool: NodePool,
    rng: ChaCha8Rng,
    exploration_c: f64,
}

impl Worker {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            pool: NodePool::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            exploration_c: config.exploration_c,
        }
    }

    /// Number of nodes this worker has allocated so far (diagnostic only).
    pub fn arena_len(&self) -> usize {
        self.pool.len()
    }

    /// Run one rollout to completion against `tree` over `channel`.
    ///
    /// On success, `tree` has been updated by exactly one selection +
    /// (possibly) expansion + backpropagation pass. On error, the rollout is
    /// abandoned; the tree may be left with a non-zero `pending_updates` on
    /// the descent path and no local retry is attempted.
    pub fn run_rollout<C: Channel>(&mut self, tree: &Tree, channel: &mut C) -> Result<(), ProtocolError> {
        channel.write(MSG_START)?;

        let leaf = self.rollin(tree, channel)?;

        channel.write(MSG_SWITCH_ROLLOUT)?;
        let n_actions = channel.read()?;
        if n_actions < 0 {
            return Err(ProtocolError::NegativeActionCount(n_actions));
        }
        if n_actions > 0 {
            let leaf_ref = unsafe { &*leaf };
            expand(&mut self.pool, leaf_ref, n_actions as usize, channel, &mut self.rng)?;
        }

        channel.write(MSG_GET_SCORE)?;
        let score = channel.read()? as f64;

        backprop(leaf, score);
        tracing::trace!(n_actions, score, "rollout complete");
        Ok(())
    }

    /// Descend from the root via UCT, emitting one variable ID per edge
    /// crossed, until a leaf or the depth cap is reached. Selection is
    /// evaluated one step ahead of the depth-cap check, so the cap is
    /// honored even when `max_depth == 0` (no variable IDs emitted, leaf =
    /// tree root).
    fn rollin<C: Channel>(&mut self, tree: &Tree, channel: &mut C) -> Result<*const Edge, ProtocolError> {
        let mut current: *const Edge = &tree.root as *const Edge;
        let mut next = select_child(unsafe { &*current }, self.exploration_c);
        let mut depth: i64 = 0;

        while let Some(candidate) = next {
            if !(tree.max_depth < 0 || depth < tree.max_depth) {
                break;
            }
            current = candidate;
            let edge = unsafe { &*current };
            next = select_child(edge, self.exploration_c);

            let owning_node = unsafe { &*edge.prev_state };
            let var_id = owning_node.action_vars[edge.id as usize];
            channel.write(var_id)?;
            depth += 1;
        }

        Ok(current)
    }

    /// Cooperative stop: tell the evaluator to unwind. Does not touch the
    /// tree or interrupt an in-flight rollout.
    pub fn stop<C: Channel>(channel: &mut C) -> Result<(), ProtocolError> {
        channel.write(MSG_STOP)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MockChannel;

    /// `stop` writes exactly one `MSG_STOP` and touches no tree state.
    #[test]
    fn stop_sends_msg_stop_and_does_not_touch_tree() {
        let tree = Tree::new(-1);
        let mut channel = MockChannel::default();

        Worker::stop(&mut channel).unwrap();

        assert_eq!(channel.outbound, vec![MSG_STOP]);
        assert!(tree.root.is_unexpanded());
        assert_eq!(tree.root.visits.load(std::sync::atomic::Ordering::Relaxed), 0);
        assert_eq!(tree.root.pending_updates.load(std::sync::atomic::Ordering::Relaxed), 0);
    }

    /// Single rollout on an empty tree: expands the root and sets its mean.
    #[test]
    fn single_rollout_on_empty_tree() {
        let tree = Tree::new(-1);
        let mut worker = Worker::new(WorkerConfig { exploration_c: 1.0, seed: 0 });
        let mut channel = MockChannel::with_replies([3, 7, 4, 9, 10]);

        worker.run_rollout(&tree, &mut channel).unwrap();

        assert_eq!(tree.root.visits.load(std::sync::atomic::Ordering::Relaxed), 1);
        assert_eq!(tree.root.pending_updates.load(std::sync::atomic::Ordering::Relaxed), 0);
        assert_eq!(tree.root.score(), 10.0);

        let node = unsafe { &*tree.root.state() };
        let mut vars = node.action_vars.to_vec();
        vars.sort();
        assert_eq!(vars, vec![4, 7, 9]);
        assert_eq!(channel.outbound, vec![
            crate::channel::MSG_START,
            crate::channel::MSG_SWITCH_ROLLOUT,
            crate::channel::MSG_GET_SCORE,
        ]);
    }

    /// A depth cap of zero behaves like an unlimited depth on the very
    /// first rollout — no variable IDs are emitted during rollin.
    #[test]
    fn depth_cap_zero_emits_no_rollin_messages() {
        let tree = Tree::new(0);
        let mut worker = Worker::new(WorkerConfig { exploration_c: 1.0, seed: 0 });
        let mut channel = MockChannel::with_replies([3, 7, 4, 9, 10]);

        worker.run_rollout(&tree, &mut channel).unwrap();

        assert_eq!(
            channel.outbound,
            vec![crate::channel::MSG_START, crate::channel::MSG_SWITCH_ROLLOUT, crate::channel::MSG_GET_SCORE]
        );
        assert_eq!(tree.root.score(), 10.0);
    }

    /// A zero-action leaf is terminal: no expansion occurs.
    #[test]
    fn zero_action_leaf_skips_expansion() {
        let tree = Tree::new(-1);
        let mut worker = Worker::new(WorkerConfig { exploration_c: 1.0, seed: 0 });
        let mut channel = MockChannel::with_replies([0, 5]);

        worker.run_rollout(&tree, &mut channel).unwrap();

        assert_eq!(tree.root.visits.load(std::sync::atomic::Ordering::Relaxed), 1);
        assert_eq!(tree.root.score(), 5.0);
        assert!(tree.root.is_unexpanded());
    }

    /// Two rollouts down the same path average into a running mean and
    /// update the visited child's worst-score pointer.
    #[test]
    fn two_rollouts_same_path() {
        let tree = Tree::new(-1);
        let mut worker = Worker::new(WorkerConfig { exploration_c: 1.0, seed: 0 });

        let mut first = MockChannel::with_replies([3, 7, 4, 9, 10]);
        worker.run_rollout(&tree, &mut first).unwrap();

        // second rollout: descends into the newly expanded node (picking
        // whichever of its 3 children the zero-visit rule selects first),
        // then the evaluator reports a terminal leaf.
        let mut second = MockChannel::with_replies([0, 20]);
        worker.run_rollout(&tree, &mut second).unwrap();

        assert_eq!(tree.root.visits.load(std::sync::atomic::Ordering::Relaxed), 2);
        assert_eq!(tree.root.score(), 15.0);

        let node = unsafe { &*tree.root.state() };
        let visited_child = node
            .actions
            .iter()
            .find(|e| e.visits.load(std::sync::atomic::Ordering::Relaxed) == 1)
            .expect("one child must have been visited");
        assert_eq!(visited_child.score(), 20.0);

        let worst_id = node.worst_score_id.load(std::sync::atomic::Ordering::Relaxed);
        assert_eq!(&node.actions[worst_id as usize] as *const Edge, visited_child as *const Edge);
    }

    /// With one child visited, the next selection must pick an unvisited
    /// sibling regardless of `c`.
    #[test]
    fn force_explore_ties_break_to_unvisited_child() {
        let tree = Tree::new(-1);
        let mut worker = Worker::new(WorkerConfig { exploration_c: 1.0, seed: 0 });

        let mut first = MockChannel::with_replies([3, 7, 4, 9, 10]);
        worker.run_rollout(&tree, &mut first).unwrap();

        let node = unsafe { &*tree.root.state() };
        let next = crate::select::select_child(&tree.root, 1.0).unwrap();
        let next_edge = unsafe { &*next };
        assert_eq!(next_edge.visits.load(std::sync::atomic::Ordering::Relaxed), 0);
        assert!(node.actions.iter().any(|e| e as *const Edge == next));
    }
}

//! UCT variant used for action selection.
//!
//! Locally-normalized reward: each child's mean score is mapped into
//! `[0, +inf)` relative to the node's "worst" (highest-mean, since higher
//! score means higher cost in this domain) child seen so far.

use std::sync::atomic::Ordering;

use crate::tree::{Edge, Node};

/// Advance one rollin step from `prev_action`.
///
/// Always increments `prev_action.visits` and `prev_action.pending_updates`
/// — this happens even when `prev_action` turns out to be unexpanded, and
/// even when the caller discards the result because a depth cap was already
/// reached: the rollin driver calls this once per edge on the path
/// unconditionally.
///
/// Returns `None` ("no successor") when `prev_action` is unexpanded.
pub fn select_child(prev_action: &Edge, exploration_c: f64) -> Option<*const Edge> {
    // lock-free: these two increments must stay in program order relative
    // to the reads below; AcqRel on both sides pins that.
    prev_action.visits.fetch_add(1, Ordering::AcqRel);
    prev_action.pending_updates.fetch_add(1, Ordering::AcqRel);

    let state_ptr = prev_action.state();
    if state_ptr.is_null() {
        return None;
    }
    let state: &Node = unsafe { &*state_ptr };

    let parent_visits = prev_action.visits.load(Ordering::Acquire);
    let worst_id = state.worst_score_id.load(Ordering::Relaxed);

    let mut best_idx = 0usize;
    let mut best_ucb1 = 0f64;

    for (i, edge) in state.actions.iter().enumerate() {
        let visits = edge.visits.load(Ordering::Acquire);

        if visits == 0 {
            // force exploration of never-visited children; the per-node
            // shuffle of action_vars at expansion time randomizes scan order
            best_idx = i;
            break;
        }

        let score = edge.score();
        let worst = if worst_id == -1 {
            score
        } else {
            state.actions[worst_id as usize].score()
        };

        let reward = if worst == 0.0 || worst == score {
            0.0
        } else {
            (worst - score) / worst
        };
        let reward = if reward < 0.0 { 0.0 } else { reward };

        let ucb1 = reward + exploration_c * ((parent_visits as f64).ln() / visits as f64).sqrt();
        if ucb1 >= best_ucb1 {
            best_ucb1 = ucb1;
            best_idx = i;
        }
    }

    Some(&state.actions[best_idx] as *const Edge)
}

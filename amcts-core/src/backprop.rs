//! Backpropagation: push a terminal score from a leaf edge up to the root,
//! updating running mean scores and the per-node worst-child pointer.

use std::sync::atomic::Ordering;

use crate::tree::Edge;

/// Walk from `leaf` to the root, applying `score` at every edge on the path.
///
/// `visits` is not incremented here — selection already incremented it
/// during rollin. The running mean uses `tmp_visits + 1` as the new
/// denominator: exactly one new sample inserted with weight 1.
pub fn backprop(leaf: *const Edge, score: f64) {
    let mut action = leaf;

    loop {
        let a: &Edge = unsafe { &*action };

        // must not be reordered with the pending_updates read below
        let visits = a.visits.load(Ordering::Acquire);
        let pending = a.pending_updates.load(Ordering::Acquire);
        // guaranteed >= 0: rollin increments pending_updates before the
        // matching backprop decrements it
        let tmp_visits = visits.saturating_sub(pending) as f64;

        let new_score = (a.score() * tmp_visits + score) / (tmp_visits + 1.0);
        a.set_score(new_score);
        a.pending_updates.fetch_sub(1, Ordering::AcqRel);

        let parent_ptr = a.prev_state;
        if parent_ptr.is_null() {
            break;
        }
        let parent = unsafe { &*parent_ptr };

        let updated_score = a.score();
        let cur_worst = parent.worst_score_id.load(Ordering::Relaxed);
        if cur_worst == -1 || updated_score > parent.actions[cur_worst as usize].score() {
            parent.worst_score_id.store(a.id as i64, Ordering::Relaxed);
        }

        action = parent.prev_action;
    }
}

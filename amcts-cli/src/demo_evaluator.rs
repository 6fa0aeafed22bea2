//! A toy in-process evaluator used by `amcts demo`.
//!
//! This is not a combinatorial solver — it has no notion of variables,
//! constraints, or objective value. It exists only to drive the wire
//! protocol so the CLI can demonstrate a complete search without an
//! external process. Real deployments pair each worker with an actual
//! solver process over [`crate::process_channel::ProcessChannel`].

use amcts_core::{Channel, ChannelPair, MSG_GET_SCORE, MSG_START, MSG_STOP, MSG_SWITCH_ROLLOUT};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Run a deterministic toy evaluator on `endpoint` until the worker sends
/// `MSG_STOP` or its channel closes.
///
/// Each rollout: offers `branching_factor` actions with fresh variable IDs
/// up to `max_expansions` total across the whole run, then times out to
/// "terminal leaf" (`n_actions = 0`); the score is the number of rollin
/// steps the worker took plus a small seeded random perturbation, giving a
/// gradient for UCT to climb without modeling any real problem.
pub fn run_demo_evaluator(mut endpoint: ChannelPair, seed: u64, branching_factor: i64, max_expansions: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut next_var_id: i64 = 0;
    let mut expansions_done = 0usize;

    loop {
        let msg = match endpoint.read() {
            Ok(m) => m,
            Err(_) => return,
        };
        if msg == MSG_STOP {
            return;
        }
        if msg != MSG_START {
            continue;
        }

        let mut steps = 0i64;
        loop {
            let m = match endpoint.read() {
                Ok(m) => m,
                Err(_) => return,
            };
            if m == MSG_SWITCH_ROLLOUT {
                break;
            }
            steps += 1;
        }

        if expansions_done < max_expansions {
            expansions_done += 1;
            if endpoint.write(branching_factor).is_err() {
                return;
            }
            for _ in 0..branching_factor {
                if endpoint.write(next_var_id).is_err() {
                    return;
                }
                next_var_id += 1;
            }
        } else if endpoint.write(0).is_err() {
            return;
        }

        match endpoint.read() {
            Ok(m) if m == MSG_GET_SCORE => {}
            _ => return,
        }

        let noise: i64 = rng.gen_range(0..3);
        if endpoint.write(steps + noise).is_err() {
            return;
        }
    }
}

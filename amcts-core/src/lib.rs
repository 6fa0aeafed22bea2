//! Lock-free parallel Monte Carlo Tree Search core for an external
//! combinatorial solver.
//!
//! This crate implements the shared search tree, the lock-free
//! selection/expansion/backpropagation protocol, the locally-normalized UCT
//! variant, and the per-rollout message protocol exchanged with an external
//! evaluator over an abstract bidirectional integer channel. It does not
//! implement the evaluator itself, does not spawn worker OS processes or
//! pipes, and does not decide how many rollouts to run or when to stop —
//! those are an orchestrator's job.
//!
//! ## Architecture
//! - Level 1: [`Engine`] — drives a fixed number of rollouts per worker thread.
//! - Level 2: [`Tree`], [`Worker`] — the shared tree and the per-rollout driver.
//! - Level 3: `select`, `expand`, `backprop` — the three lock-free phases.
//! - Level 4: [`pool::NodePool`], [`channel::Channel`] — arena and transport.

mod backprop;
mod channel;
mod config;
mod error;
mod expand;
mod pool;
mod select;
mod tree;
mod worker;

pub use channel::{channel_pair, Channel, ChannelPair, MockChannel, MSG_GET_SCORE, MSG_START, MSG_STOP, MSG_SWITCH_ROLLOUT};
pub use config::{TreeConfig, WorkerConfig};
pub use error::{ChannelError, ProtocolError};
pub use pool::NodePool;
pub use tree::{Edge, Node, Tree};
pub use worker::Worker;

use std::sync::Arc;
use std::thread::JoinHandle;

// ============================================================================
// ENGINE (Level 1 - Orchestration)
// ============================================================================

/// Drives a fixed-size pool of workers, each on its own OS thread, running
/// a caller-chosen number of rollouts against a shared [`Tree`].
///
/// `Engine` itself holds no opinion on total rollout budgets or termination
/// — the caller passes `rollouts_per_worker` and decides whether/when to
/// call it again; an external controller decides rollout counts and
/// termination.
pub struct Engine {
    tree: Arc<Tree>,
}

impl Engine {
    pub fn new(config: TreeConfig) -> Self {
        Self { tree: Arc::new(Tree::new(config.max_depth)) }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Spawn one thread per `(WorkerConfig, channel)` pair, each running
    /// `rollouts_per_worker` rollouts in sequence, then join all of them.
    ///
    /// Returns the first error encountered (from any worker), if any; other
    /// workers still run to completion or to their own first error — a
    /// channel failure on one worker does not cancel its siblings — channel
    /// failures are local to the rollout/worker that hit them.
    pub fn run_rollouts<C>(&self, workers: Vec<(WorkerConfig, C)>, rollouts_per_worker: usize) -> Result<(), ProtocolError>
    where
        C: Channel + Send + 'static,
    {
        let handles: Vec<JoinHandle<Result<(), ProtocolError>>> = workers
            .into_iter()
            .map(|(worker_config, mut channel)| {
                let tree = Arc::clone(&self.tree);
                std::thread::spawn(move || {
                    let mut worker = Worker::new(worker_config);
                    for _ in 0..rollouts_per_worker {
                        worker.run_rollout(&tree, &mut channel)?;
                    }
                    Ok(())
                })
            })
            .collect();

        let mut first_err = None;
        for handle in handles {
            let result = handle.join().expect("worker thread panicked");
            if let Err(e) = result {
                tracing::warn!(error = %e, "worker rollout failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

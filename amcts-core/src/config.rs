//! Per-tree and per-worker configuration surface.

/// Per-tree configuration.
#[derive(Clone, Copy, Debug)]
pub struct TreeConfig {
    /// Maximum descent depth; negative means unlimited.
    pub max_depth: i64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { max_depth: -1 }
    }
}

/// Per-worker configuration.
#[derive(Clone, Copy, Debug)]
pub struct WorkerConfig {
    /// UCT exploration constant `c` (non-negative).
    pub exploration_c: f64,
    pub seed: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { exploration_c: 1.0, seed: 0 }
    }
}

//! Error types for the channel transport and the per-rollout protocol.

/// Failure reading or writing a single message on a [`crate::channel::Channel`].
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of the per-rollout message protocol.
///
/// Both variants are fatal for the rollout that hit them: the worker gives up
/// on this rollout and surfaces the error to its caller. Neither is used as
/// control flow inside the hot (selection/expansion/backprop) path.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("evaluator returned negative n_actions: {0}")]
    NegativeActionCount(i64),

    #[error("channel error during protocol exchange: {0}")]
    Channel(#[from] ChannelError),
}

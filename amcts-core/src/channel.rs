//! Bidirectional integer-message transport between a worker and its paired
//! evaluator.
//!
//! The core only requires `read` / `write` / `close` on a single machine
//! integer at a time, FIFO per direction, no framing beyond the integer
//! itself. Concrete transports (OS pipes, spawned subprocess stdio) are an
//! orchestrator concern and live outside this crate; [`ChannelPair`] and
//! [`MockChannel`] here exist to make the core usable and testable without
//! one.

use crate::error::ChannelError;

/// Worker → evaluator: begins a rollout's rollin phase.
pub const MSG_START: i64 = -1;
/// Worker → evaluator: ends rollin, requests branching data + rollout.
pub const MSG_SWITCH_ROLLOUT: i64 = -2;
/// Worker → evaluator: requests the terminal score for this rollout.
pub const MSG_GET_SCORE: i64 = -3;
/// Worker → evaluator: ends the worker's engagement with this evaluator.
pub const MSG_STOP: i64 = -4;

/// A duplex carrier of fixed-size integer messages.
///
/// Not `Clone`: a channel is owned by exactly one worker. `read` and `write`
/// block until a message is available / enqueued.
pub trait Channel {
    fn read(&mut self) -> Result<i64, ChannelError>;
    fn write(&mut self, msg: i64) -> Result<(), ChannelError>;
    fn close(&mut self) -> Result<(), ChannelError>;
}

/// One endpoint of an in-process channel pair, backed by
/// `crossbeam_channel`. [`channel_pair`] builds two of these wired so each
/// side's output feeds the other's input.
pub struct ChannelPair {
    tx: crossbeam_channel::Sender<i64>,
    rx: crossbeam_channel::Receiver<i64>,
    closed: bool,
}

/// Build a pair of connected endpoints: `(a, b)` where `a`'s writes are `b`'s
/// reads and vice versa.
pub fn channel_pair() -> (ChannelPair, ChannelPair) {
    let (tx_a, rx_a) = crossbeam_channel::unbounded();
    let (tx_b, rx_b) = crossbeam_channel::unbounded();
    (
        ChannelPair { tx: tx_a, rx: rx_b, closed: false },
        ChannelPair { tx: tx_b, rx: rx_a, closed: false },
    )
}

impl Channel for ChannelPair {
    fn read(&mut self) -> Result<i64, ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.rx.recv().map_err(|_| ChannelError::Closed)
    }

    fn write(&mut self, msg: i64) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.tx.send(msg).map_err(|_| ChannelError::Closed)
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        self.closed = true;
        Ok(())
    }
}

/// A scripted channel for deterministic single-worker tests.
///
/// Pre-load `inbound` with the replies an evaluator would send; every
/// `write` is recorded into `outbound` so a test can assert on the exact
/// sequence of messages the worker emitted.
#[derive(Default)]
pub struct MockChannel {
    pub inbound: std::collections::VecDeque<i64>,
    pub outbound: Vec<i64>,
    closed: bool,
}

impl MockChannel {
    pub fn with_replies(replies: impl IntoIterator<Item = i64>) -> Self {
        Self {
            inbound: replies.into_iter().collect(),
            outbound: Vec::new(),
            closed: false,
        }
    }
}

impl Channel for MockChannel {
    fn read(&mut self) -> Result<i64, ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.inbound.pop_front().ok_or(ChannelError::Closed)
    }

    fn write(&mut self, msg: i64) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.outbound.push(msg);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_channel_round_trip() {
        let mut ch = MockChannel::with_replies([7, 4, 9]);
        assert_eq!(ch.read().unwrap(), 7);
        ch.write(MSG_START).unwrap();
        assert_eq!(ch.read().unwrap(), 4);
        assert_eq!(ch.outbound, vec![MSG_START]);
    }

    #[test]
    fn channel_pair_is_connected() {
        let (mut a, mut b) = channel_pair();
        a.write(42).unwrap();
        assert_eq!(b.read().unwrap(), 42);
        b.write(-7).unwrap();
        assert_eq!(a.read().unwrap(), -7);
    }
}

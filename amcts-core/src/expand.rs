//! Expansion: installing a freshly allocated child node under a leaf edge.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::channel::Channel;
use crate::error::ProtocolError;
use crate::pool::NodePool;
use crate::tree::Edge;

/// Allocate a node with `n_actions` children under `leaf`, read their
/// variable IDs from `channel`, shuffle them, and publish the node.
///
/// `leaf.state` must be unexpanded when called; concurrent expansion of the
/// same edge by two workers is tolerated (last publish wins, the other
/// node leaks harmlessly into the arena until teardown).
pub fn expand<C: Channel, R: Rng + ?Sized>(
    pool: &mut NodePool,
    leaf: &Edge,
    n_actions: usize,
    channel: &mut C,
    rng: &mut R,
) -> Result<(), ProtocolError> {
    let node_ptr = pool.alloc(leaf as *const Edge, n_actions);
    let node = unsafe { &mut *node_ptr };

    for slot in node.action_vars.iter_mut() {
        *slot = channel.read()?;
    }

    node.action_vars.shuffle(rng);

    leaf.publish_state(node_ptr);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MockChannel;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn expand_reads_vars_and_permutes_them() {
        let root = Edge::synthetic_root();
        let mut pool = NodePool::new();
        let mut channel = MockChannel::with_replies([7, 4, 9]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        expand(&mut pool, &root, 3, &mut channel, &mut rng).unwrap();

        assert!(!root.is_unexpanded());
        let node = unsafe { &*root.state() };
        let mut vars: Vec<i64> = node.action_vars.to_vec();
        vars.sort();
        assert_eq!(vars, vec![4, 7, 9]);
        for (i, edge) in node.actions.iter().enumerate() {
            assert_eq!(edge.id as usize, i);
            assert_eq!(edge.prev_state, root.state());
        }
    }
}

//! Longest-valid-chain rule
//!
//! Only used by the explicit consensus request; block broadcast never reorganizes.

use crate::core::{Block, ProofOfWork};
use log::debug;

/// Genesis first, then every block links to its predecessor by hash and index
/// and carries a hash that recomputes and meets `target_prefix`.
pub fn chain_is_valid(chain: &[Block], target_prefix: &str) -> bool {
    let Some(first) = chain.first() else {
        return false;
    };
    if !first.is_genesis() {
        debug!("Chain rejected: first block is not genesis");
        return false;
    }

    chain.windows(2).all(|pair| {
        let (previous, block) = (&pair[0], &pair[1]);
        let linked = block.get_previous_hash() == previous.get_hash()
            && block.get_index() == previous.get_index() + 1;
        if !linked {
            debug!("Chain rejected: block {} is not linked", block.get_index());
            return false;
        }
        if !ProofOfWork::validate(block, target_prefix) {
            debug!("Chain rejected: block {} fails proof-of-work", block.get_index());
            return false;
        }
        true
    })
}

/// Position of the longest valid candidate strictly longer than `local_len`.
/// The first one wins among equally long candidates.
pub fn select_longest(
    local_len: usize,
    candidates: &[&[Block]],
    target_prefix: &str,
) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (position, chain) in candidates.iter().enumerate() {
        let best_len = best.map(|(_, len)| len).unwrap_or(local_len);
        if chain.len() > best_len && chain_is_valid(chain, target_prefix) {
            best = Some((position, chain.len()));
        }
    }
    best.map(|(position, _)| position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Blockchain;
    use crate::testnet::mine_next_block;

    const PREFIX: &str = "0";

    fn chain_of(blocks: usize) -> Vec<Block> {
        let mut blockchain = Blockchain::new(PREFIX);
        for _ in 1..blocks {
            mine_next_block(&mut blockchain).unwrap();
        }
        blockchain.get_chain().to_vec()
    }

    #[test]
    fn test_genesis_only_chain_is_valid() {
        assert!(chain_is_valid(&[Block::genesis()], PREFIX));
        assert!(!chain_is_valid(&[], PREFIX));
    }

    #[test]
    fn test_mined_chain_is_valid() {
        assert!(chain_is_valid(&chain_of(4), PREFIX));
    }

    #[test]
    fn test_tampered_transaction_invalidates_chain() {
        let mut blockchain = Blockchain::new(PREFIX);
        blockchain
            .add_pending(crate::core::Transaction::new(5, "a", "b"))
            .unwrap();
        mine_next_block(&mut blockchain).unwrap();
        let mut chain = blockchain.get_chain().to_vec();

        let original = chain[1].clone();
        chain[1] = Block::new_test_block(
            original.get_index(),
            original.get_nonce(),
            original.get_previous_hash(),
            original.get_hash(),
            vec![crate::core::Transaction::new(5_000, "a", "b")],
        );
        assert!(!chain_is_valid(&chain, PREFIX));
    }

    #[test]
    fn test_wrong_genesis_invalidates_chain() {
        let fake = Block::new_test_block(1, 0, "", "beef", vec![]);
        assert!(!chain_is_valid(&[fake], PREFIX));
    }

    #[test]
    fn test_select_longest() {
        let short = chain_of(2);
        let long = chain_of(4);
        let mut broken = chain_of(5);
        broken.remove(2);

        let candidates = vec![short.as_slice(), broken.as_slice(), long.as_slice()];
        assert_eq!(select_longest(2, &candidates, PREFIX), Some(2));
        assert_eq!(select_longest(4, &candidates, PREFIX), None);
    }
}

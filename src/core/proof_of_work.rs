use crate::core::hashing::hash_block;
use crate::core::{Block, BlockData};
use log::{debug, info};

/// Default difficulty: four leading zero hex digits
pub const DEFAULT_TARGET_PREFIX: &str = "0000";

const MAX_NONCE: u64 = u64::MAX;

/// Nonce search over `(previous_hash, block_data, nonce)`
pub struct ProofOfWork {
    previous_hash: String,
    block_data: BlockData,
    target_prefix: String,
}

impl ProofOfWork {
    pub fn new_proof_of_work(
        previous_hash: &str,
        block_data: BlockData,
        target_prefix: &str,
    ) -> ProofOfWork {
        ProofOfWork {
            previous_hash: previous_hash.to_string(),
            block_data,
            target_prefix: target_prefix.to_string(),
        }
    }

    /// Search nonces from 0 upward. Returns the nonce and its hash.
    pub fn run(&self) -> (u64, String) {
        info!(
            "Mining block {} (target prefix {:?})",
            self.block_data.index, self.target_prefix
        );
        let mut nonce = 0;
        let mut hash = hash_block(&self.previous_hash, &self.block_data, nonce);
        while !hash.starts_with(self.target_prefix.as_str()) && nonce < MAX_NONCE {
            nonce += 1;
            hash = hash_block(&self.previous_hash, &self.block_data, nonce);
        }
        debug!("Found nonce {nonce} for block {}: {hash}", self.block_data.index);
        (nonce, hash)
    }

    /// Nonce whose hash meets the target prefix
    pub fn find_nonce(previous_hash: &str, block_data: &BlockData, target_prefix: &str) -> u64 {
        ProofOfWork::new_proof_of_work(previous_hash, block_data.clone(), target_prefix)
            .run()
            .0
    }

    /// Recompute the hash for `nonce` and check the prefix
    pub fn verify(
        previous_hash: &str,
        block_data: &BlockData,
        nonce: u64,
        target_prefix: &str,
    ) -> bool {
        hash_block(previous_hash, block_data, nonce).starts_with(target_prefix)
    }

    /// Check a whole block: stored hash must be the recomputed one, and meet the prefix
    pub fn validate(block: &Block, target_prefix: &str) -> bool {
        let hash = block.compute_hash();
        hash == block.get_hash() && hash.starts_with(target_prefix)
    }
}

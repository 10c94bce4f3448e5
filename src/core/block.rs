use crate::core::hashing::hash_block;
use crate::core::Transaction;
use crate::error::Result;
use crate::utils::{current_timestamp, deserialize, serialize};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Index of the genesis block
pub const GENESIS_INDEX: u64 = 1;

static GENESIS_BLOCK: Lazy<Block> = Lazy::new(|| {
    let data = BlockData {
        transactions: vec![],
        index: GENESIS_INDEX,
    };
    Block {
        index: GENESIS_INDEX,
        timestamp: 0,
        hash: hash_block("", &data, 0),
        transactions: data.transactions,
        nonce: 0,
        previous_hash: String::new(),
    }
});

/// The part of a block that proof-of-work commits to besides the previous hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    pub transactions: Vec<Transaction>,
    pub index: u64,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Block {
    index: u64,
    timestamp: i64,
    transactions: Vec<Transaction>,
    nonce: u64,
    hash: String,
    previous_hash: String,
}

impl Block {
    /// Assemble a block whose nonce and hash were already found by the caller
    pub fn new_block(
        index: u64,
        nonce: u64,
        previous_hash: String,
        hash: String,
        transactions: Vec<Transaction>,
    ) -> Result<Block> {
        Ok(Block {
            index,
            timestamp: current_timestamp()?,
            transactions,
            nonce,
            hash,
            previous_hash,
        })
    }

    /// Fixed sentinel shared by every node so chains are comparable
    pub fn genesis() -> Block {
        GENESIS_BLOCK.clone()
    }

    pub fn is_genesis(&self) -> bool {
        *self == *GENESIS_BLOCK
    }

    /// Block built from raw parts, no timestamp lookup
    #[cfg(test)]
    pub fn new_test_block(
        index: u64,
        nonce: u64,
        previous_hash: &str,
        hash: &str,
        transactions: Vec<Transaction>,
    ) -> Block {
        Block {
            index,
            timestamp: 0,
            transactions,
            nonce,
            hash: hash.to_string(),
            previous_hash: previous_hash.to_string(),
        }
    }

    /// The payload that was hashed for this block
    pub fn block_data(&self) -> BlockData {
        BlockData {
            transactions: self.transactions.clone(),
            index: self.index,
        }
    }

    /// Hash recomputed from content, independent of the stored `hash`
    pub fn compute_hash(&self) -> String {
        hash_block(&self.previous_hash, &self.block_data(), self.nonce)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize::<Block>(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }
}

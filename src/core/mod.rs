//! Core ledger functionality
//!
//! Blocks, transactions, the hash codec, proof-of-work, the chain itself and
//! the longest-valid-chain rule.

pub mod block;
pub mod blockchain;
pub mod consensus;
pub mod hashing;
pub mod monetary;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, BlockData, GENESIS_INDEX};
pub use blockchain::{
    AddressSummary, BlockAcceptance, Blockchain, RejectReason, TransactionLocation,
};
pub use hashing::hash_block;
pub use monetary::{MINING_REWARD, REWARD_SENDER, UNITS_PER_COIN};
pub use proof_of_work::{ProofOfWork, DEFAULT_TARGET_PREFIX};
pub use transaction::Transaction;

// The ledger: an in-memory chain seeded with the shared genesis block, plus the
// pool of transactions waiting for the next block.
// Nothing is persisted; a restarted node starts again from genesis.

use crate::core::{consensus, Block, ProofOfWork, Transaction};
use crate::error::{BlockchainError, Result};
use crate::storage::MemoryPool;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an external block was not appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    PreviousHashMismatch { expected: String, found: String },
    IndexMismatch { expected: u64, found: u64 },
    InvalidProofOfWork,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::PreviousHashMismatch { expected, found } => {
                write!(f, "previous hash {found} does not match tip {expected}")
            }
            RejectReason::IndexMismatch { expected, found } => {
                write!(f, "index {found} does not follow tip (expected {expected})")
            }
            RejectReason::InvalidProofOfWork => write!(f, "hash does not verify"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockAcceptance {
    Accepted,
    Rejected(RejectReason),
}

impl BlockAcceptance {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BlockAcceptance::Accepted)
    }
}

/// Where a transaction was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLocation {
    pub transaction: Transaction,
    pub block_index: u64,
    pub block_hash: String,
}

/// Every mined transaction touching an address and the resulting balance in units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSummary {
    pub address: String,
    pub transactions: Vec<Transaction>,
    pub balance: i128,
}

#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
    pending_transactions: MemoryPool,
    target_prefix: String,
}

impl Blockchain {
    /// A chain holding only genesis, with an empty pool
    pub fn new(target_prefix: &str) -> Blockchain {
        Blockchain {
            chain: vec![Block::genesis()],
            pending_transactions: MemoryPool::new(),
            target_prefix: target_prefix.to_string(),
        }
    }

    pub fn get_chain(&self) -> &[Block] {
        self.chain.as_slice()
    }

    pub fn get_pending_transactions(&self) -> &MemoryPool {
        &self.pending_transactions
    }

    pub fn get_target_prefix(&self) -> &str {
        self.target_prefix.as_str()
    }

    pub fn get_best_height(&self) -> usize {
        self.chain.len()
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(BlockchainError::EmptyChain)
    }

    /// Index the next block will carry
    pub fn next_index(&self) -> Result<u64> {
        Ok(self.last_block()?.get_index() + 1)
    }

    /// Pool a transaction; returns the index of the block expected to contain it
    pub fn add_pending(&mut self, tx: Transaction) -> Result<u64> {
        let block_index = self.next_index()?;
        self.pending_transactions.add(tx);
        Ok(block_index)
    }

    pub fn snapshot_pending(&self) -> Vec<Transaction> {
        self.pending_transactions.snapshot()
    }

    /// Append a locally mined block. `nonce` and `hash` must already be validated
    /// against `previous_hash`; if the tip has moved since, the block is refused.
    /// The mined transactions leave the pool, anything pooled during mining stays.
    pub fn create_block(
        &mut self,
        nonce: u64,
        previous_hash: &str,
        hash: &str,
        transactions: Vec<Transaction>,
    ) -> Result<Block> {
        let last_block = self.last_block()?;
        if last_block.get_hash() != previous_hash {
            return Err(BlockchainError::StaleTip {
                expected: previous_hash.to_string(),
                actual: last_block.get_hash().to_string(),
            });
        }

        let mined_count = transactions.len();
        let block = Block::new_block(
            last_block.get_index() + 1,
            nonce,
            previous_hash.to_string(),
            hash.to_string(),
            transactions,
        )?;
        self.chain.push(block.clone());
        self.pending_transactions.remove_mined(mined_count);

        info!(
            "Appended block {} ({} transactions): {}",
            block.get_index(),
            mined_count,
            block.get_hash()
        );
        Ok(block)
    }

    /// Decide on a block broadcast by a peer. Accepted blocks are appended and the
    /// pool is cleared; rejected ones leave the ledger untouched.
    pub fn accept_external_block(&mut self, candidate: &Block) -> Result<BlockAcceptance> {
        let last_block = self.last_block()?;

        if candidate.get_previous_hash() != last_block.get_hash() {
            let reason = RejectReason::PreviousHashMismatch {
                expected: last_block.get_hash().to_string(),
                found: candidate.get_previous_hash().to_string(),
            };
            warn!("Rejected block {}: {reason}", candidate.get_index());
            return Ok(BlockAcceptance::Rejected(reason));
        }

        let expected_index = last_block.get_index() + 1;
        if candidate.get_index() != expected_index {
            let reason = RejectReason::IndexMismatch {
                expected: expected_index,
                found: candidate.get_index(),
            };
            warn!("Rejected block {}: {reason}", candidate.get_index());
            return Ok(BlockAcceptance::Rejected(reason));
        }

        if !ProofOfWork::validate(candidate, &self.target_prefix) {
            warn!(
                "Rejected block {}: {}",
                candidate.get_index(),
                RejectReason::InvalidProofOfWork
            );
            return Ok(BlockAcceptance::Rejected(RejectReason::InvalidProofOfWork));
        }

        self.chain.push(candidate.clone());
        self.pending_transactions.clear();
        info!(
            "Accepted block {} from peer: {}",
            candidate.get_index(),
            candidate.get_hash()
        );
        Ok(BlockAcceptance::Accepted)
    }

    /// Swap in a longer chain chosen by consensus, along with its owner's pool
    pub fn replace_chain(&mut self, chain: Vec<Block>, pending: Vec<Transaction>) -> Result<()> {
        if !consensus::chain_is_valid(&chain, &self.target_prefix) {
            return Err(BlockchainError::InvalidBlock(
                "Replacement chain does not validate".to_string(),
            ));
        }
        self.adopt_chain(chain, pending);
        Ok(())
    }

    /// Swap in a chain the caller has already checked with `chain_is_valid`
    pub(crate) fn adopt_chain(&mut self, chain: Vec<Block>, pending: Vec<Transaction>) {
        info!(
            "Replacing chain of length {} with chain of length {}",
            self.chain.len(),
            chain.len()
        );
        self.chain = chain;
        self.pending_transactions = MemoryPool::from_transactions(pending);
    }

    pub fn block_by_hash(&self, hash: &str) -> Option<&Block> {
        self.chain.iter().find(|block| block.get_hash() == hash)
    }

    pub fn transaction_by_id(&self, id: &str) -> Option<TransactionLocation> {
        self.chain.iter().find_map(|block| {
            block
                .get_transactions()
                .iter()
                .find(|tx| tx.get_id() == id)
                .map(|tx| TransactionLocation {
                    transaction: tx.clone(),
                    block_index: block.get_index(),
                    block_hash: block.get_hash().to_string(),
                })
        })
    }

    pub fn address_summary(&self, address: &str) -> AddressSummary {
        let mut transactions = vec![];
        let mut balance: i128 = 0;
        for tx in self.chain.iter().flat_map(|block| block.get_transactions()) {
            let mut touched = false;
            if tx.get_recipient() == address {
                balance += i128::from(tx.get_amount());
                touched = true;
            }
            if tx.get_sender() == address {
                balance -= i128::from(tx.get_amount());
                touched = true;
            }
            if touched {
                transactions.push(tx.clone());
            }
        }
        AddressSummary {
            address: address.to_string(),
            transactions,
            balance,
        }
    }
}

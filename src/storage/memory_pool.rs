use crate::core::Transaction;
use serde::{Deserialize, Serialize};

/// Pending transactions in arrival order. No dedup by id: a resubmitted
/// transaction is pooled, and mined, twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPool {
    inner: Vec<Transaction>,
}

impl MemoryPool {
    pub fn new() -> MemoryPool {
        MemoryPool { inner: vec![] }
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> MemoryPool {
        MemoryPool {
            inner: transactions,
        }
    }

    /// Append and return the pool size after insertion
    pub fn add(&mut self, tx: Transaction) -> usize {
        self.inner.push(tx);
        self.inner.len()
    }

    /// Exact ordered contents to put into a candidate block
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.inner.clone()
    }

    /// Drop the first `count` transactions once they are in an appended block
    pub fn remove_mined(&mut self, count: usize) {
        let count = count.min(self.inner.len());
        self.inner.drain(..count);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn get_all(&self) -> &[Transaction] {
        self.inner.as_slice()
    }

    pub fn contains(&self, txid: &str) -> bool {
        self.inner.iter().any(|tx| tx.get_id() == txid)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

//! # Peer Ledger
//!
//! A small proof-of-work ledger replicated across a flat network of peer nodes.
//! Every node keeps its own chain in memory, mines on request, and pushes what
//! it mined or was handed by a client to each peer it knows.
//!
//! ## Layout
//! - `core/`: blocks, transactions, the hash codec, proof-of-work and the chain
//! - `storage/`: the pending transaction pool
//! - `network/`: wire protocol, transport, fan-out, the node service and its server
//! - `config/`: layered node settings
//! - `utils/`: hashing, ids, timestamps and binary encoding
//! - `cli/`: the `startnode` command and the client commands
//!
//! ## Ground rules
//! - Blocks link by previous hash and carry consecutive indices from genesis (index 1)
//! - A block is valid when its hash recomputes and starts with the target prefix
//! - Replication is single-hop; forks only resolve through an explicit consensus request
//! - Amounts are integer units, 1 coin = 100 000 000 units

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::Config;
pub use core::{
    AddressSummary, Block, BlockAcceptance, BlockData, Blockchain, ProofOfWork, RejectReason,
    Transaction, TransactionLocation, DEFAULT_TARGET_PREFIX, MINING_REWARD, REWARD_SENDER,
};
pub use error::{BlockchainError, Result};
pub use network::{
    expect_success, BlockDelivery, ChainSnapshot, ConsensusOutcome, FanOutReport, NodeService,
    PeerRegistry, RegistrationOutcome, Request, Response, Server, TcpTransport, Transport,
};
pub use storage::MemoryPool;
pub use utils::{current_timestamp, new_id, sha256_digest};

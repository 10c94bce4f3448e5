//! Error handling for the ledger node
//!
//! Validation failures of external blocks are not errors: they come back as
//! [`crate::core::BlockAcceptance::Rejected`]. What lives here is what actually
//! fails an operation.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

#[derive(Debug, Clone)]
pub enum BlockchainError {
    /// Peer unreachable, timed out, or answered with an error
    Network(String),
    /// A transaction could not be built from the given input
    Transaction(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// A block that cannot be appended locally
    InvalidBlock(String),
    /// The chain has no blocks; only possible if genesis seeding was skipped
    EmptyChain,
    /// The tail moved while a block was being mined on top of `expected`
    StaleTip { expected: String, actual: String },
    /// Broken internal state (bad genesis, poisoned lock)
    InvariantViolation(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Network(msg) => write!(f, "Network error: {msg}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::EmptyChain => write!(f, "Chain is empty"),
            BlockchainError::StaleTip { expected, actual } => write!(
                f,
                "Chain tip moved while mining: mined on {expected}, tip is now {actual}"
            ),
            BlockchainError::InvariantViolation(msg) => write!(f, "Invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BlockchainError {
    fn from(err: serde_json::Error) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BlockchainError {
    fn from(err: toml::de::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}

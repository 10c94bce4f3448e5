//! Pending transaction storage
//!
//! In-memory only; nothing survives a restart.

pub mod memory_pool;

pub use memory_pool::MemoryPool;

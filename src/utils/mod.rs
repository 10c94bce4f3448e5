//! Utility functions and helpers
//!
//! Hashing, timestamps, identifiers, and the binary payload codec.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, new_id, sha256_digest, sha256_hex};
pub use serialization::{deserialize, serialize};

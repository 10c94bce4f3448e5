//! Configuration management
//!
//! Node address, proof-of-work difficulty, peer request timeout and the mining
//! reward. There is no global configuration; each node owns its `Config`.

pub mod settings;

pub use settings::Config;

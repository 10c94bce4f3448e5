//! Command-line interface
//!
//! One node process (`startnode`) plus thin client commands that send a single
//! request to a running node and print its reply.

pub mod commands;

pub use commands::{Command, Opt};

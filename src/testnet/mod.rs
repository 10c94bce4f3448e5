//! In-process helpers for exercising nodes without sockets

pub mod test_utils;

pub use test_utils::*;

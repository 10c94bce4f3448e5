//! Peer-to-peer networking
//!
//! Every node is a server answering [`Request`]s and a client of its peers.
//! Replication is single-hop: a node sends what it mined or received from a
//! client to each peer it knows, and peers never relay further.

pub mod broadcast;
pub mod node;
pub mod protocol;
pub mod server;
pub mod service;
pub mod transport;

pub use broadcast::{BlockDelivery, FanOutReport, PeerFailure};
pub use node::{PeerRegistry, RegistrationOutcome};
pub use protocol::{ChainSnapshot, ConsensusOutcome, Request, Response};
pub use server::Server;
pub use service::{JoinOutcome, MineOutcome, NodeService, NodeState};
pub use transport::{expect_success, TcpTransport, Transport};

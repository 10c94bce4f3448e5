use crate::core::{
    AddressSummary, Block, RejectReason, Transaction, TransactionLocation,
};
use crate::error::Result;
use crate::network::broadcast::{BlockDelivery, FanOutReport};
use crate::network::RegistrationOutcome;
use serde::{Deserialize, Serialize};

/// Requests a node answers. Blocks and transactions travel as binary payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    GetChainState,
    SubmitTransaction {
        addr_from: String,
        transaction: Vec<u8>,
    },
    /// Decimal coin amount, as a client types it
    BroadcastTransaction {
        amount: f64,
        sender: String,
        recipient: String,
    },
    Mine,
    ReceiveBlock {
        addr_from: String,
        block: Vec<u8>,
    },
    RegisterAndBroadcastPeer {
        address: String,
    },
    RegisterPeer {
        address: String,
    },
    RegisterPeersBulk {
        addresses: Vec<String>,
    },
    Consensus,
    GetBlock {
        hash: String,
    },
    GetTransaction {
        id: String,
    },
    GetAddress {
        address: String,
    },
}

impl Request {
    pub fn submit_transaction(addr_from: &str, tx: &Transaction) -> Result<Request> {
        Ok(Request::SubmitTransaction {
            addr_from: addr_from.to_string(),
            transaction: tx.serialize()?,
        })
    }

    pub fn receive_block(addr_from: &str, block: &Block) -> Result<Request> {
        Ok(Request::ReceiveBlock {
            addr_from: addr_from.to_string(),
            block: block.serialize()?,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Request::GetChainState => "GetChainState",
            Request::SubmitTransaction { .. } => "SubmitTransaction",
            Request::BroadcastTransaction { .. } => "BroadcastTransaction",
            Request::Mine => "Mine",
            Request::ReceiveBlock { .. } => "ReceiveBlock",
            Request::RegisterAndBroadcastPeer { .. } => "RegisterAndBroadcastPeer",
            Request::RegisterPeer { .. } => "RegisterPeer",
            Request::RegisterPeersBulk { .. } => "RegisterPeersBulk",
            Request::Consensus => "Consensus",
            Request::GetBlock { .. } => "GetBlock",
            Request::GetTransaction { .. } => "GetTransaction",
            Request::GetAddress { .. } => "GetAddress",
        }
    }
}

/// Everything a node holds, as `GetChainState` reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub pending_transactions: Vec<Transaction>,
    pub network_nodes: Vec<String>,
    pub current_node_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusOutcome {
    Replaced { length: usize, source: String },
    Kept { length: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    ChainState(ChainSnapshot),
    Submitted {
        note: String,
        block_index: u64,
    },
    Broadcast {
        note: String,
        transaction: Transaction,
        report: FanOutReport,
    },
    Mined {
        note: String,
        block: Block,
        delivery: BlockDelivery,
        reward: FanOutReport,
    },
    BlockReceived {
        note: String,
        accepted: bool,
        reason: Option<RejectReason>,
        block: Block,
    },
    Joined {
        note: String,
        outcome: RegistrationOutcome,
        announced: FanOutReport,
        bulk: FanOutReport,
    },
    Registered {
        note: String,
        outcome: RegistrationOutcome,
    },
    BulkRegistered {
        note: String,
        outcomes: Vec<RegistrationOutcome>,
    },
    Consensus {
        note: String,
        outcome: ConsensusOutcome,
    },
    Block(Option<Block>),
    Transaction(Option<TransactionLocation>),
    Address(AddressSummary),
    Error {
        message: String,
    },
}

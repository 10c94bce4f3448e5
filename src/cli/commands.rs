use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_NODE: &str = "127.0.0.1:3001";

#[derive(Debug, Parser)]
#[command(name = "peer-ledger")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a ledger node")]
    StartNode {
        #[arg(long, help = "Interface to listen on")]
        host: Option<String>,
        #[arg(long, help = "Port to listen on")]
        port: Option<u16>,
        #[arg(long, help = "TOML config file")]
        config: Option<PathBuf>,
        #[arg(long, help = "Address peers use to reach this node")]
        url: Option<String>,
        #[arg(long, help = "Join the network through this peer once listening")]
        join: Option<String>,
    },
    #[command(name = "chain", about = "Print a node's chain, pool and peers")]
    Chain {
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    #[command(name = "send", about = "Create a transaction and broadcast it")]
    Send {
        #[arg(help = "Sender address")]
        sender: String,
        #[arg(help = "Recipient address")]
        recipient: String,
        #[arg(help = "Amount in coins, e.g. 12.5")]
        amount: f64,
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    #[command(name = "mine", about = "Mine the pending transactions into a block")]
    Mine {
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    #[command(name = "join", about = "Register a new node with the network")]
    Join {
        #[arg(help = "Address of the joining node")]
        address: String,
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    #[command(name = "consensus", about = "Adopt the longest valid chain among peers")]
    Consensus {
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    #[command(name = "block", about = "Look up a block by hash")]
    Block {
        hash: String,
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    #[command(name = "transaction", about = "Look up a mined transaction by id")]
    Transaction {
        id: String,
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    #[command(name = "address", about = "List an address's transactions and balance")]
    Address {
        address: String,
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
}

//! Test utilities for ledger and node testing

use crate::config::Config;
use crate::core::{Block, BlockData, Blockchain, ProofOfWork};
use crate::error::{BlockchainError, Result};
use crate::network::{NodeService, Request, Response, Transport};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Weak};

/// Single hex digit, so tests mine in a handful of attempts
pub const TEST_TARGET_PREFIX: &str = "0";

/// Mine the whole pending pool onto `blockchain` using its own target prefix
pub fn mine_next_block(blockchain: &mut Blockchain) -> Result<Block> {
    let last_block = blockchain.last_block()?;
    let previous_hash = last_block.get_hash().to_string();
    let block_data = BlockData {
        transactions: blockchain.snapshot_pending(),
        index: last_block.get_index() + 1,
    };
    let (nonce, hash) = ProofOfWork::new_proof_of_work(
        &previous_hash,
        block_data.clone(),
        blockchain.get_target_prefix(),
    )
    .run();
    blockchain.create_block(nonce, &previous_hash, &hash, block_data.transactions)
}

/// Config for a node reachable as `node_url`, with an easy target
pub fn test_config(node_url: &str) -> Config {
    let mut config = Config::default();
    config.set_node_url(node_url);
    config.set_target_prefix(TEST_TARGET_PREFIX);
    config.set_request_timeout_ms(2000);
    config
}

/// Routes requests between nodes in one process. Every message goes through
/// JSON like it would on a socket; nodes marked down or never added are unreachable.
#[derive(Default)]
pub struct LocalNetwork {
    nodes: Mutex<HashMap<String, Weak<NodeService>>>,
    down: Mutex<HashSet<String>>,
}

impl LocalNetwork {
    pub fn new() -> Arc<LocalNetwork> {
        Arc::new(LocalNetwork::default())
    }

    pub fn add_node(self: &Arc<Self>, node_url: &str) -> Result<Arc<NodeService>> {
        let transport: Arc<dyn Transport> = Arc::clone(self) as Arc<dyn Transport>;
        let node = Arc::new(NodeService::new(test_config(node_url), transport)?);
        self.nodes
            .lock()
            .map_err(|_| BlockchainError::Network("Local network lock poisoned".to_string()))?
            .insert(node_url.to_string(), Arc::downgrade(&node));
        Ok(node)
    }

    pub fn set_down(&self, node_url: &str, down: bool) {
        let mut set = self.down.lock().unwrap();
        if down {
            set.insert(node_url.to_string());
        } else {
            set.remove(node_url);
        }
    }

    fn lookup(&self, peer: &str) -> Option<Arc<NodeService>> {
        if self.down.lock().unwrap().contains(peer) {
            return None;
        }
        self.nodes.lock().unwrap().get(peer).and_then(Weak::upgrade)
    }
}

impl Transport for LocalNetwork {
    fn call(&self, peer: &str, request: &Request) -> Result<Response> {
        let node = self
            .lookup(peer)
            .ok_or_else(|| BlockchainError::Network(format!("Failed to connect to {peer}")))?;
        let request: Request = serde_json::from_str(&serde_json::to_string(request)?)?;
        let response = node.handle(request);
        Ok(serde_json::from_str(&serde_json::to_string(&response)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::consensus;

    #[test]
    fn test_mine_next_block_extends_chain() {
        let mut blockchain = Blockchain::new(TEST_TARGET_PREFIX);
        let block = mine_next_block(&mut blockchain).unwrap();
        assert_eq!(block.get_index(), 2);
        assert!(block.get_hash().starts_with(TEST_TARGET_PREFIX));
        assert!(consensus::chain_is_valid(blockchain.get_chain(), TEST_TARGET_PREFIX));
    }

    #[test]
    fn test_down_node_is_unreachable() {
        let network = LocalNetwork::new();
        let _node = network.add_node("n1").unwrap();
        assert!(network.call("n1", &Request::GetChainState).is_ok());

        network.set_down("n1", true);
        assert!(network.call("n1", &Request::GetChainState).is_err());
        network.set_down("n1", false);
        assert!(network.call("n1", &Request::GetChainState).is_ok());
    }

    #[test]
    fn test_dropped_node_is_unreachable() {
        let network = LocalNetwork::new();
        drop(network.add_node("n1").unwrap());
        assert!(network.call("n1", &Request::GetChainState).is_err());
    }
}

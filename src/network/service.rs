// A node: its ledger, its peer registry, and the replication rules that keep it
// in step with the other nodes. All three structures sit behind one mutex; the
// proof-of-work search and every outgoing peer call run without holding it.

use crate::config::Config;
use crate::core::{
    consensus, AddressSummary, Block, BlockAcceptance, BlockData, Blockchain, ProofOfWork,
    Transaction, TransactionLocation,
};
use crate::error::{BlockchainError, Result};
use crate::network::broadcast::{fan_out, gather, BlockDelivery, FanOutReport};
use crate::network::protocol::{ChainSnapshot, ConsensusOutcome, Request, Response};
use crate::network::transport::Transport;
use crate::network::{PeerRegistry, RegistrationOutcome};
use crate::utils::new_id;
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct NodeState {
    pub blockchain: Blockchain,
    pub peers: PeerRegistry,
}

/// What a mine request produced
#[derive(Debug, Clone)]
pub struct MineOutcome {
    pub block: Block,
    pub delivery: BlockDelivery,
    pub reward: FanOutReport,
}

/// What announcing a joining node produced
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub outcome: RegistrationOutcome,
    /// Existing peers told about the joiner
    pub announced: FanOutReport,
    /// The joiner, sent the full membership
    pub bulk: FanOutReport,
}

pub struct NodeService {
    config: Config,
    node_url: String,
    reward_address: String,
    state: Mutex<NodeState>,
    transport: Arc<dyn Transport>,
}

impl NodeService {
    /// Fails on an invalid config or a malformed genesis; such a node must not start
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Result<NodeService> {
        config.validate()?;

        let node_url = config.get_node_url();
        let blockchain = Blockchain::new(config.get_target_prefix());
        let genesis = blockchain.last_block()?;
        if !genesis.is_genesis() || genesis.compute_hash() != genesis.get_hash() {
            return Err(BlockchainError::InvariantViolation(
                "Chain does not start from the shared genesis block".to_string(),
            ));
        }

        let reward_address = new_id();
        info!("Node {node_url} starting, mining rewards go to {reward_address}");

        Ok(NodeService {
            state: Mutex::new(NodeState {
                blockchain,
                peers: PeerRegistry::new(&node_url),
            }),
            config,
            node_url,
            reward_address,
            transport,
        })
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, NodeState>> {
        self.state
            .lock()
            .map_err(|e| BlockchainError::InvariantViolation(format!("Node state lock poisoned: {e}")))
    }

    pub fn get_node_url(&self) -> &str {
        self.node_url.as_str()
    }

    pub fn get_reward_address(&self) -> &str {
        self.reward_address.as_str()
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn peer_addresses(&self) -> Result<Vec<String>> {
        Ok(self.lock_state()?.peers.get_nodes())
    }

    pub fn chain_state(&self) -> Result<ChainSnapshot> {
        let state = self.lock_state()?;
        Ok(ChainSnapshot {
            chain: state.blockchain.get_chain().to_vec(),
            pending_transactions: state.blockchain.snapshot_pending(),
            network_nodes: state.peers.get_nodes(),
            current_node_url: self.node_url.clone(),
        })
    }

    /// Pool a transaction without forwarding it; returns the expected block index
    pub fn submit_transaction(&self, tx: Transaction) -> Result<u64> {
        let mut state = self.lock_state()?;
        let txid = tx.get_id().to_string();
        let block_index = state.blockchain.add_pending(tx)?;
        info!("Transaction {txid} pooled for block {block_index}");
        Ok(block_index)
    }

    /// Pool locally, then send to every peer. Peers do not forward it again.
    pub fn broadcast_transaction(&self, tx: Transaction) -> Result<FanOutReport> {
        let peers = {
            let mut state = self.lock_state()?;
            state.blockchain.add_pending(tx.clone())?;
            state.peers.get_nodes()
        };
        let request = Request::submit_transaction(&self.node_url, &tx)?;
        Ok(fan_out(self.transport.as_ref(), &peers, &request))
    }

    /// Mine the pending pool into a block, append it, send it to every peer,
    /// then broadcast the reward, which goes into the next block
    pub fn mine(&self) -> Result<MineOutcome> {
        let (previous_hash, block_data) = self.mining_candidate()?;

        let pow = ProofOfWork::new_proof_of_work(
            &previous_hash,
            block_data.clone(),
            self.config.get_target_prefix(),
        );
        let (nonce, hash) = pow.run();

        let (block, peers) = self.append_mined(nonce, &previous_hash, &hash, block_data)?;

        let request = Request::receive_block(&self.node_url, &block)?;
        let delivery = BlockDelivery::from_results(gather(self.transport.as_ref(), &peers, &request));
        if !delivery.rejected.is_empty() {
            warn!(
                "Block {} rejected by {} peer(s): {:?}",
                block.get_index(),
                delivery.rejected.len(),
                delivery.rejected
            );
        }
        for failure in &delivery.unreachable {
            warn!("Block {} not delivered to {}: {}", block.get_index(), failure.peer, failure.error);
        }

        let reward = Transaction::new_reward(&self.reward_address, self.config.get_mining_reward());
        let reward = self.broadcast_transaction(reward)?;

        info!("Mined block {}: {}", block.get_index(), block.get_hash());
        Ok(MineOutcome {
            block,
            delivery,
            reward,
        })
    }

    /// Current tip hash and the pool snapshot to mine on top of it
    fn mining_candidate(&self) -> Result<(String, BlockData)> {
        let state = self.lock_state()?;
        let last_block = state.blockchain.last_block()?;
        Ok((
            last_block.get_hash().to_string(),
            BlockData {
                transactions: state.blockchain.snapshot_pending(),
                index: last_block.get_index() + 1,
            },
        ))
    }

    /// Append a solved candidate; fails with `StaleTip` if another block landed first
    fn append_mined(
        &self,
        nonce: u64,
        previous_hash: &str,
        hash: &str,
        block_data: BlockData,
    ) -> Result<(Block, Vec<String>)> {
        let mut state = self.lock_state()?;
        let block = state.blockchain.create_block(
            nonce,
            previous_hash,
            hash,
            block_data.transactions,
        )?;
        Ok((block, state.peers.get_nodes()))
    }

    pub fn receive_block(&self, block: &Block) -> Result<BlockAcceptance> {
        self.lock_state()?.blockchain.accept_external_block(block)
    }

    /// Register a joining node, announce it to every other peer, then send it the
    /// full membership (all peers plus this node) so it learns everyone at once
    pub fn register_and_broadcast_peer(&self, address: &str) -> Result<JoinOutcome> {
        let (outcome, others, members) = {
            let mut state = self.lock_state()?;
            let outcome = state.peers.register(address);
            let members = state.peers.get_nodes();
            let others: Vec<String> = members
                .iter()
                .filter(|peer| peer.as_str() != address)
                .cloned()
                .collect();
            (outcome, others, members)
        };

        if outcome == RegistrationOutcome::RejectedSelf {
            warn!("Refusing to register {address}: it is this node");
            return Ok(JoinOutcome {
                outcome,
                announced: FanOutReport::default(),
                bulk: FanOutReport::default(),
            });
        }
        info!("Node {address} joining ({outcome:?}), announcing to {} peer(s)", others.len());

        let announce = Request::RegisterPeer {
            address: address.to_string(),
        };
        let announced = fan_out(self.transport.as_ref(), &others, &announce);

        let mut addresses = members;
        addresses.push(self.node_url.clone());
        let bulk = fan_out(
            self.transport.as_ref(),
            &[address.to_string()],
            &Request::RegisterPeersBulk { addresses },
        );

        Ok(JoinOutcome {
            outcome,
            announced,
            bulk,
        })
    }

    pub fn register_peer(&self, address: &str) -> Result<RegistrationOutcome> {
        let outcome = self.lock_state()?.peers.register(address);
        info!("Register {address}: {outcome:?}");
        Ok(outcome)
    }

    pub fn register_peers_bulk(&self, addresses: &[String]) -> Result<Vec<RegistrationOutcome>> {
        let outcomes = self.lock_state()?.peers.bulk_register(addresses);
        let added = outcomes
            .iter()
            .filter(|outcome| **outcome == RegistrationOutcome::Added)
            .count();
        info!("Bulk registration: {added} of {} address(es) added", addresses.len());
        Ok(outcomes)
    }

    /// Adopt the longest valid chain among the peers if it beats the local one
    pub fn resolve_chain(&self) -> Result<ConsensusOutcome> {
        let peers = self.peer_addresses()?;
        let snapshots: Vec<ChainSnapshot> = gather(self.transport.as_ref(), &peers, &Request::GetChainState)
            .into_iter()
            .filter_map(|(peer, result)| match result {
                Ok(Response::ChainState(snapshot)) => Some(snapshot),
                Ok(_) => {
                    warn!("{peer} sent an unexpected reply to GetChainState");
                    None
                }
                Err(e) => {
                    warn!("Could not fetch chain from {peer}: {e}");
                    None
                }
            })
            .collect();

        // Hashing every candidate is slow, so it happens before taking the lock
        let local_len = self.lock_state()?.blockchain.get_best_height();
        let candidates: Vec<&[Block]> = snapshots.iter().map(|s| s.chain.as_slice()).collect();
        let selected = consensus::select_longest(local_len, &candidates, self.config.get_target_prefix());

        let mut state = self.lock_state()?;
        let current_len = state.blockchain.get_best_height();
        match selected {
            // The local chain may have grown while candidates were checked
            Some(position) if snapshots[position].chain.len() > current_len => {
                let snapshot = &snapshots[position];
                state.blockchain.adopt_chain(
                    snapshot.chain.clone(),
                    snapshot.pending_transactions.clone(),
                );
                Ok(ConsensusOutcome::Replaced {
                    length: snapshot.chain.len(),
                    source: snapshot.current_node_url.clone(),
                })
            }
            _ => {
                info!("Local chain of length {current_len} kept");
                Ok(ConsensusOutcome::Kept { length: current_len })
            }
        }
    }

    pub fn block_by_hash(&self, hash: &str) -> Result<Option<Block>> {
        Ok(self.lock_state()?.blockchain.block_by_hash(hash).cloned())
    }

    pub fn transaction_by_id(&self, id: &str) -> Result<Option<TransactionLocation>> {
        Ok(self.lock_state()?.blockchain.transaction_by_id(id))
    }

    pub fn address_summary(&self, address: &str) -> Result<AddressSummary> {
        Ok(self.lock_state()?.blockchain.address_summary(address))
    }

    /// Answer one request. Failures become `Response::Error`.
    pub fn handle(&self, request: Request) -> Response {
        let name = request.name();
        match self.dispatch(request) {
            Ok(response) => response,
            Err(e) => {
                error!("{name} failed: {e}");
                Response::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    fn dispatch(&self, request: Request) -> Result<Response> {
        match request {
            Request::GetChainState => Ok(Response::ChainState(self.chain_state()?)),
            Request::SubmitTransaction {
                addr_from,
                transaction,
            } => {
                let tx = Transaction::deserialize(&transaction)?;
                info!("Transaction {} received from {addr_from}", tx.get_id());
                let block_index = self.submit_transaction(tx)?;
                Ok(Response::Submitted {
                    note: format!("Transaction will be added in block {block_index}."),
                    block_index,
                })
            }
            Request::BroadcastTransaction {
                amount,
                sender,
                recipient,
            } => {
                let tx = Transaction::from_coins(amount, &sender, &recipient)?;
                let report = self.broadcast_transaction(tx.clone())?;
                Ok(Response::Broadcast {
                    note: "Transaction created and broadcast.".to_string(),
                    transaction: tx,
                    report,
                })
            }
            Request::Mine => {
                let outcome = self.mine()?;
                Ok(Response::Mined {
                    note: "New block mined and broadcast.".to_string(),
                    block: outcome.block,
                    delivery: outcome.delivery,
                    reward: outcome.reward,
                })
            }
            Request::ReceiveBlock { addr_from, block } => {
                let block = Block::deserialize(&block)?;
                info!("Block {} received from {addr_from}", block.get_index());
                let (accepted, note, reason) = match self.receive_block(&block)? {
                    BlockAcceptance::Accepted => {
                        (true, "New block received and accepted.".to_string(), None)
                    }
                    BlockAcceptance::Rejected(reason) => {
                        (false, format!("New block rejected: {reason}."), Some(reason))
                    }
                };
                Ok(Response::BlockReceived {
                    note,
                    accepted,
                    reason,
                    block,
                })
            }
            Request::RegisterAndBroadcastPeer { address } => {
                let joined = self.register_and_broadcast_peer(&address)?;
                Ok(Response::Joined {
                    note: format!("Node {address} registered with the network."),
                    outcome: joined.outcome,
                    announced: joined.announced,
                    bulk: joined.bulk,
                })
            }
            Request::RegisterPeer { address } => {
                let outcome = self.register_peer(&address)?;
                Ok(Response::Registered {
                    note: format!("Node {address} registered."),
                    outcome,
                })
            }
            Request::RegisterPeersBulk { addresses } => {
                let outcomes = self.register_peers_bulk(&addresses)?;
                Ok(Response::BulkRegistered {
                    note: "Bulk registration successful.".to_string(),
                    outcomes,
                })
            }
            Request::Consensus => {
                let outcome = self.resolve_chain()?;
                let note = match &outcome {
                    ConsensusOutcome::Replaced { source, .. } => {
                        format!("Chain replaced with the one from {source}.")
                    }
                    ConsensusOutcome::Kept { .. } => "Current chain kept.".to_string(),
                };
                Ok(Response::Consensus { note, outcome })
            }
            Request::GetBlock { hash } => Ok(Response::Block(self.block_by_hash(&hash)?)),
            Request::GetTransaction { id } => {
                Ok(Response::Transaction(self.transaction_by_id(&id)?))
            }
            Request::GetAddress { address } => {
                Ok(Response::Address(self.address_summary(&address)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MINING_REWARD, REWARD_SENDER};
    use crate::testnet::{test_config, LocalNetwork, TEST_TARGET_PREFIX};

    #[test]
    fn test_fresh_node_has_genesis_only() {
        let network = LocalNetwork::new();
        let node = network.add_node("n1").unwrap();
        let state = node.chain_state().unwrap();
        assert_eq!(state.chain.len(), 1);
        assert_eq!(state.chain[0].get_index(), 1);
        assert!(state.pending_transactions.is_empty());
        assert!(state.network_nodes.is_empty());
        assert_eq!(state.current_node_url, "n1");
    }

    #[test]
    fn test_invalid_config_aborts_startup() {
        let mut config = test_config("n1");
        config.set_target_prefix("xyz");
        let result = NodeService::new(config, LocalNetwork::new());
        assert!(matches!(result, Err(BlockchainError::Config(_))));
    }

    // Scenario A
    #[test]
    fn test_mined_block_holds_submitted_transaction_and_reward_waits() {
        let network = LocalNetwork::new();
        let node = network.add_node("n1").unwrap();

        let tx = Transaction::new(100, "alice", "bob");
        assert_eq!(node.submit_transaction(tx.clone()).unwrap(), 2);

        let outcome = node.mine().unwrap();
        assert_eq!(outcome.block.get_index(), 2);
        assert_eq!(outcome.block.get_transactions(), &[tx]);

        let state = node.chain_state().unwrap();
        assert_eq!(state.chain.len(), 2);
        assert_eq!(state.pending_transactions.len(), 1);
        let reward = &state.pending_transactions[0];
        assert_eq!(reward.get_sender(), REWARD_SENDER);
        assert_eq!(reward.get_recipient(), node.get_reward_address());
        assert_eq!(reward.get_amount(), MINING_REWARD);

        let next = node.mine().unwrap();
        assert_eq!(next.block.get_index(), 3);
        assert_eq!(next.block.get_transactions(), &[reward.clone()]);
    }

    // Scenario B
    #[test]
    fn test_broadcast_transaction_reaches_peer_once() {
        let network = LocalNetwork::new();
        let n1 = network.add_node("n1").unwrap();
        let n2 = network.add_node("n2").unwrap();
        n1.register_peer("n2").unwrap();
        n2.register_peer("n1").unwrap();

        let tx = Transaction::new(42, "alice", "bob");
        let report = n1.broadcast_transaction(tx.clone()).unwrap();
        assert_eq!(report.delivered, vec!["n2".to_string()]);

        assert_eq!(n2.chain_state().unwrap().pending_transactions, vec![tx.clone()]);
        // The receiving peer does not bounce it back
        assert_eq!(n1.chain_state().unwrap().pending_transactions, vec![tx]);
    }

    // Scenario C
    #[test]
    fn test_block_accepted_by_matching_peer_and_rejected_by_divergent_one() {
        let network = LocalNetwork::new();
        let n1 = network.add_node("n1").unwrap();
        let n2 = network.add_node("n2").unwrap();
        let n3 = network.add_node("n3").unwrap();

        // n3 moves its tip before hearing from anyone
        n3.mine().unwrap();
        let n3_before = n3.chain_state().unwrap();

        n1.register_peer("n2").unwrap();
        n1.register_peer("n3").unwrap();
        n2.submit_transaction(Transaction::new(5, "x", "y")).unwrap();

        let outcome = n1.mine().unwrap();
        assert_eq!(outcome.delivery.accepted, vec!["n2".to_string()]);
        assert_eq!(outcome.delivery.rejected, vec!["n3".to_string()]);

        let n2_state = n2.chain_state().unwrap();
        assert_eq!(n2_state.chain.len(), 2);
        assert_eq!(n2_state.chain[1], outcome.block);
        // Pool cleared on acceptance, then the reward broadcast arrived
        assert_eq!(n2_state.pending_transactions.len(), 1);
        assert!(n2_state.pending_transactions[0].is_reward());

        let n3_after = n3.chain_state().unwrap();
        assert_eq!(n3_after.chain, n3_before.chain);
    }

    #[test]
    fn test_accepted_block_empties_pool() {
        let network = LocalNetwork::new();
        let n1 = network.add_node("n1").unwrap();
        let n2 = network.add_node("n2").unwrap();
        n2.submit_transaction(Transaction::new(1, "a", "b")).unwrap();
        n2.submit_transaction(Transaction::new(2, "a", "b")).unwrap();

        // Mine on n1 without peers, then hand the block to n2 directly
        let block = n1.mine().unwrap().block;
        assert!(n2.receive_block(&block).unwrap().is_accepted());
        assert!(n2.chain_state().unwrap().pending_transactions.is_empty());
    }

    #[test]
    fn test_mining_survives_unreachable_peer() {
        let network = LocalNetwork::new();
        let n1 = network.add_node("n1").unwrap();
        n1.register_peer("ghost").unwrap();

        let outcome = n1.mine().unwrap();
        assert_eq!(outcome.delivery.unreachable.len(), 1);
        assert_eq!(outcome.reward.failed.len(), 1);
        assert_eq!(n1.chain_state().unwrap().chain.len(), 2);
    }

    #[test]
    fn test_join_spreads_membership() {
        let network = LocalNetwork::new();
        let n1 = network.add_node("n1").unwrap();
        let n2 = network.add_node("n2").unwrap();
        let n3 = network.add_node("n3").unwrap();

        // n2 joins through n1, then n3 joins through n1
        let first = n1.register_and_broadcast_peer("n2").unwrap();
        assert_eq!(first.outcome, RegistrationOutcome::Added);
        assert!(first.announced.delivered.is_empty());
        assert_eq!(first.bulk.delivered, vec!["n2".to_string()]);

        let second = n1.register_and_broadcast_peer("n3").unwrap();
        assert_eq!(second.announced.delivered, vec!["n2".to_string()]);

        let sorted = |node: &NodeService| {
            let mut peers = node.peer_addresses().unwrap();
            peers.sort();
            peers
        };
        assert_eq!(sorted(n1.as_ref()), vec!["n2".to_string(), "n3".to_string()]);
        assert_eq!(sorted(n2.as_ref()), vec!["n1".to_string(), "n3".to_string()]);
        assert_eq!(sorted(n3.as_ref()), vec!["n1".to_string(), "n2".to_string()]);
    }

    #[test]
    fn test_join_refuses_self() {
        let network = LocalNetwork::new();
        let n1 = network.add_node("n1").unwrap();
        let joined = n1.register_and_broadcast_peer("n1").unwrap();
        assert_eq!(joined.outcome, RegistrationOutcome::RejectedSelf);
        assert!(n1.peer_addresses().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_chain_adopts_longer_chain() {
        let network = LocalNetwork::new();
        let n1 = network.add_node("n1").unwrap();
        let n2 = network.add_node("n2").unwrap();
        n2.mine().unwrap();
        n2.mine().unwrap();

        n1.register_peer("n2").unwrap();
        let outcome = n1.resolve_chain().unwrap();
        assert_eq!(
            outcome,
            ConsensusOutcome::Replaced {
                length: 3,
                source: "n2".to_string(),
            }
        );
        let n1_state = n1.chain_state().unwrap();
        let n2_state = n2.chain_state().unwrap();
        assert_eq!(n1_state.chain, n2_state.chain);
        assert_eq!(n1_state.pending_transactions, n2_state.pending_transactions);

        // Nothing longer left to adopt
        assert_eq!(
            n1.resolve_chain().unwrap(),
            ConsensusOutcome::Kept { length: 3 }
        );
    }

    #[test]
    fn test_handle_maps_failures_to_error_response() {
        let network = LocalNetwork::new();
        let node = network.add_node("n1").unwrap();
        let response = node.handle(Request::ReceiveBlock {
            addr_from: "n2".to_string(),
            block: vec![0xFF, 0x00],
        });
        assert!(matches!(response, Response::Error { .. }));

        let response = node.handle(Request::BroadcastTransaction {
            amount: -1.0,
            sender: "a".to_string(),
            recipient: "b".to_string(),
        });
        assert!(matches!(response, Response::Error { .. }));
    }

    #[test]
    fn test_oversized_block_payload_is_an_error_reply() {
        let network = LocalNetwork::new();
        let node = network.add_node("n1").unwrap();

        // index 2, timestamp 0, then a transaction count of 2^40
        let mut payload = vec![2, 0, 0xFD];
        payload.extend((1u64 << 40).to_le_bytes());
        let response = node.handle(Request::ReceiveBlock {
            addr_from: "n2".to_string(),
            block: payload.clone(),
        });
        assert!(matches!(response, Response::Error { .. }));

        let response = node.handle(Request::SubmitTransaction {
            addr_from: "n2".to_string(),
            transaction: payload,
        });
        assert!(matches!(response, Response::Error { .. }));
        assert_eq!(node.chain_state().unwrap().chain.len(), 1);
    }

    fn solve(node: &NodeService) -> (String, BlockData, u64, String) {
        let (previous_hash, block_data) = node.mining_candidate().unwrap();
        let (nonce, hash) = ProofOfWork::new_proof_of_work(
            &previous_hash,
            block_data.clone(),
            node.get_config().get_target_prefix(),
        )
        .run();
        (previous_hash, block_data, nonce, hash)
    }

    #[test]
    fn test_second_miner_on_same_tip_gets_stale_tip() {
        let network = LocalNetwork::new();
        let node = network.add_node("n1").unwrap();

        let first_tx = Transaction::new(1, "alice", "bob");
        node.submit_transaction(first_tx.clone()).unwrap();
        let (prev_a, data_a, nonce_a, hash_a) = solve(&node);

        let second_tx = Transaction::new(2, "carol", "dave");
        node.submit_transaction(second_tx.clone()).unwrap();
        let (prev_b, data_b, nonce_b, hash_b) = solve(&node);
        assert_eq!(prev_a, prev_b);

        let (block, _) = node.append_mined(nonce_a, &prev_a, &hash_a, data_a).unwrap();
        assert_eq!(block.get_transactions(), &[first_tx]);

        let result = node.append_mined(nonce_b, &prev_b, &hash_b, data_b);
        assert!(matches!(result, Err(BlockchainError::StaleTip { .. })));

        let state = node.chain_state().unwrap();
        assert_eq!(state.chain.len(), 2);
        assert_eq!(state.chain[1], block);
        assert_eq!(state.pending_transactions, vec![second_tx]);
    }

    #[test]
    fn test_concurrent_mines_never_fork_the_chain() {
        let network = LocalNetwork::new();
        let node = network.add_node("n1").unwrap();
        node.submit_transaction(Transaction::new(1, "alice", "bob"))
            .unwrap();

        let results: Vec<Result<MineOutcome>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| node.mine())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mined = results.iter().filter(|r| r.is_ok()).count();
        assert!(mined >= 1);
        for result in &results {
            if let Err(e) = result {
                assert!(matches!(e, BlockchainError::StaleTip { .. }));
            }
        }

        let state = node.chain_state().unwrap();
        assert_eq!(state.chain.len(), 1 + mined);
        assert!(crate::core::consensus::chain_is_valid(&state.chain, TEST_TARGET_PREFIX));
        // The user transaction was mined exactly once
        let user_txs = state
            .chain
            .iter()
            .flat_map(|block| block.get_transactions())
            .filter(|tx| !tx.is_reward())
            .count();
        assert_eq!(user_txs, 1);
    }

    #[test]
    fn test_handle_lookups() {
        let network = LocalNetwork::new();
        let node = network.add_node("n1").unwrap();
        let response = node.handle(Request::BroadcastTransaction {
            amount: 2.5,
            sender: "alice".to_string(),
            recipient: "bob".to_string(),
        });
        let tx = match response {
            Response::Broadcast { transaction, .. } => transaction,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(tx.get_amount(), 250_000_000);

        let block = match node.handle(Request::Mine) {
            Response::Mined { block, .. } => block,
            other => panic!("unexpected response {other:?}"),
        };

        match node.handle(Request::GetBlock {
            hash: block.get_hash().to_string(),
        }) {
            Response::Block(Some(found)) => assert_eq!(found, block),
            other => panic!("unexpected response {other:?}"),
        }
        match node.handle(Request::GetTransaction {
            id: tx.get_id().to_string(),
        }) {
            Response::Transaction(Some(location)) => assert_eq!(location.block_index, 2),
            other => panic!("unexpected response {other:?}"),
        }
        match node.handle(Request::GetAddress {
            address: "bob".to_string(),
        }) {
            Response::Address(summary) => assert_eq!(summary.balance, 250_000_000),
            other => panic!("unexpected response {other:?}"),
        }
    }
}

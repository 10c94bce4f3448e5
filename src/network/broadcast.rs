// Single-hop fan-out: one scoped thread per peer, every call runs to completion
// or fails on its own. Nothing is retried or queued.

use crate::error::{BlockchainError, Result};
use crate::network::protocol::{Request, Response};
use crate::network::transport::{expect_success, Transport};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerFailure {
    pub peer: String,
    pub error: String,
}

/// Which peers got the artifact. The broadcast itself succeeds either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutReport {
    pub delivered: Vec<String>,
    pub failed: Vec<PeerFailure>,
}

impl FanOutReport {
    pub fn from_results(results: Vec<(String, Result<Response>)>) -> FanOutReport {
        let mut report = FanOutReport::default();
        for (peer, result) in results {
            match result.and_then(|response| expect_success(&peer, response)) {
                Ok(_) => report.delivered.push(peer),
                Err(e) => report.failed.push(PeerFailure {
                    peer,
                    error: e.to_string(),
                }),
            }
        }
        report
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-peer verdicts on a broadcast block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDelivery {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    pub unreachable: Vec<PeerFailure>,
}

impl BlockDelivery {
    pub fn from_results(results: Vec<(String, Result<Response>)>) -> BlockDelivery {
        let mut delivery = BlockDelivery::default();
        for (peer, result) in results {
            match result.and_then(|response| expect_success(&peer, response)) {
                Ok(Response::BlockReceived { accepted: true, .. }) => delivery.accepted.push(peer),
                Ok(Response::BlockReceived { accepted: false, .. }) => {
                    delivery.rejected.push(peer)
                }
                Ok(_) => delivery.unreachable.push(PeerFailure {
                    peer,
                    error: "unexpected reply to ReceiveBlock".to_string(),
                }),
                Err(e) => delivery.unreachable.push(PeerFailure {
                    peer,
                    error: e.to_string(),
                }),
            }
        }
        delivery
    }
}

/// Send `request` to every peer in parallel and collect each result in peer order
pub fn gather(
    transport: &dyn Transport,
    peers: &[String],
    request: &Request,
) -> Vec<(String, Result<Response>)> {
    thread::scope(|scope| {
        let handles: Vec<_> = peers
            .iter()
            .map(|peer| (peer, scope.spawn(move || transport.call(peer, request))))
            .collect();

        handles
            .into_iter()
            .map(|(peer, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(BlockchainError::Network(format!("Call to {peer} panicked")))
                });
                (peer.clone(), result)
            })
            .collect()
    })
}

pub fn fan_out(transport: &dyn Transport, peers: &[String], request: &Request) -> FanOutReport {
    let report = FanOutReport::from_results(gather(transport, peers, request));
    log_report(request, &report);
    report
}

fn log_report(request: &Request, report: &FanOutReport) {
    if report.delivered.is_empty() && report.failed.is_empty() {
        return;
    }
    info!(
        "{} delivered to {} of {} peers",
        request.name(),
        report.delivered.len(),
        report.delivered.len() + report.failed.len()
    );
    for failure in &report.failed {
        warn!("{} to {} failed: {}", request.name(), failure.peer, failure.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Answers every peer except the ones marked down
    struct ScriptedTransport {
        down: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl Transport for ScriptedTransport {
        fn call(&self, peer: &str, _request: &Request) -> Result<Response> {
            self.calls.lock().unwrap().push(peer.to_string());
            if self.down.contains(peer) {
                Err(BlockchainError::Network(format!("{peer} is down")))
            } else if peer == "broken" {
                Ok(Response::Error {
                    message: "bad request".to_string(),
                })
            } else {
                Ok(Response::Block(None))
            }
        }
    }

    fn peers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_fan_out_isolates_failures() {
        let transport = ScriptedTransport {
            down: ["b".to_string()].into_iter().collect(),
            calls: Mutex::new(vec![]),
        };
        let report = fan_out(&transport, &peers(&["a", "b", "c", "broken"]), &Request::Mine);

        assert_eq!(report.delivered, peers(&["a", "c"]));
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].peer, "b");
        assert_eq!(report.failed[1].peer, "broken");
        assert!(!report.is_complete());
        assert_eq!(transport.calls.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_fan_out_to_nobody() {
        let transport = ScriptedTransport {
            down: HashSet::new(),
            calls: Mutex::new(vec![]),
        };
        let report = fan_out(&transport, &[], &Request::Mine);
        assert!(report.is_complete());
        assert!(report.delivered.is_empty());
    }

    #[test]
    fn test_block_delivery_sorts_verdicts() {
        let block = crate::core::Block::genesis();
        let received = |accepted: bool| -> Result<Response> {
            Ok(Response::BlockReceived {
                note: String::new(),
                accepted,
                reason: None,
                block: block.clone(),
            })
        };
        let delivery = BlockDelivery::from_results(vec![
            ("a".to_string(), received(true)),
            ("b".to_string(), received(false)),
            (
                "c".to_string(),
                Err(BlockchainError::Network("down".to_string())),
            ),
            ("d".to_string(), Ok(Response::Block(None))),
        ]);
        assert_eq!(delivery.accepted, peers(&["a"]));
        assert_eq!(delivery.rejected, peers(&["b"]));
        assert_eq!(delivery.unreachable.len(), 2);
    }
}

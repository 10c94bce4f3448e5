use serde::{Deserialize, Serialize};

/// Result of registering one peer address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationOutcome {
    Added,
    AlreadyPresent,
    /// The address is this node's own
    RejectedSelf,
}

/// Known peers in registration order. Never holds the node's own address and
/// never shrinks; there is no leave protocol.
#[derive(Debug, Clone)]
pub struct PeerRegistry {
    self_addr: String,
    inner: Vec<String>,
}

impl PeerRegistry {
    pub fn new(self_addr: &str) -> PeerRegistry {
        PeerRegistry {
            self_addr: self_addr.to_string(),
            inner: vec![],
        }
    }

    pub fn register(&mut self, addr: &str) -> RegistrationOutcome {
        if addr == self.self_addr {
            return RegistrationOutcome::RejectedSelf;
        }
        if self.node_is_known(addr) {
            return RegistrationOutcome::AlreadyPresent;
        }
        self.inner.push(addr.to_string());
        RegistrationOutcome::Added
    }

    pub fn bulk_register(&mut self, addrs: &[String]) -> Vec<RegistrationOutcome> {
        addrs.iter().map(|addr| self.register(addr)).collect()
    }

    pub fn node_is_known(&self, addr: &str) -> bool {
        self.inner.iter().any(|x| x == addr)
    }

    pub fn get_self_addr(&self) -> &str {
        self.self_addr.as_str()
    }

    pub fn get_nodes(&self) -> Vec<String> {
        self.inner.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

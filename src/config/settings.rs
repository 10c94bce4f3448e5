use crate::core::{DEFAULT_TARGET_PREFIX, MINING_REWARD};
use crate::error::{BlockchainError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

static DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";
const TARGET_PREFIX_KEY: &str = "TARGET_PREFIX";
const REQUEST_TIMEOUT_KEY: &str = "REQUEST_TIMEOUT_MS";

/// Node settings. Layered as defaults, then an optional TOML file, then
/// environment variables, then whatever the CLI sets explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    host: String,
    port: u16,
    /// Address peers use to reach this node; defaults to `host:port`
    node_url: Option<String>,
    target_prefix: String,
    request_timeout_ms: u64,
    /// Units paid to the miner per block
    mining_reward: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            node_url: None,
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            mining_reward: MINING_REWARD,
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Result<Config> {
        let mut config = Config::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// TOML file with environment overrides applied
    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|e| {
            BlockchainError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let mut config: Config = toml::from_str(&text)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `NODE_ADDRESS`, `TARGET_PREFIX` and `REQUEST_TIMEOUT_MS` from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(NODE_ADDRESS_KEY) {
            self.set_node_addr(&addr)?;
        }
        if let Some(prefix) = lookup(TARGET_PREFIX_KEY) {
            self.target_prefix = prefix;
        }
        if let Some(timeout) = lookup(REQUEST_TIMEOUT_KEY) {
            self.request_timeout_ms = timeout.parse().map_err(|e| {
                BlockchainError::Config(format!("Invalid {REQUEST_TIMEOUT_KEY} {timeout:?}: {e}"))
            })?;
        }
        Ok(())
    }

    /// Refuse settings a node cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.target_prefix.is_empty() {
            return Err(BlockchainError::Config(
                "Target prefix must not be empty".to_string(),
            ));
        }
        if !self
            .target_prefix
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            // Digests are lowercase hex, anything else can never match
            return Err(BlockchainError::Config(format!(
                "Target prefix {:?} is not lowercase hex",
                self.target_prefix
            )));
        }
        if self.target_prefix.len() > 64 {
            return Err(BlockchainError::Config(
                "Target prefix is longer than a digest".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(BlockchainError::Config(
                "Request timeout must be positive".to_string(),
            ));
        }
        if self.get_node_url().is_empty() {
            return Err(BlockchainError::Config(
                "Node address must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Split `host:port` into host and port; the node URL follows
    pub fn set_node_addr(&mut self, addr: &str) -> Result<()> {
        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| BlockchainError::Config(format!("Address {addr:?} has no port")))?;
        self.port = port
            .parse()
            .map_err(|e| BlockchainError::Config(format!("Invalid port in {addr:?}: {e}")))?;
        self.host = host.to_string();
        self.node_url = None;
        Ok(())
    }

    pub fn set_host(&mut self, host: &str) {
        self.host = host.to_string();
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    pub fn set_node_url(&mut self, node_url: &str) {
        self.node_url = Some(node_url.to_string());
    }

    pub fn set_target_prefix(&mut self, prefix: &str) {
        self.target_prefix = prefix.to_string();
    }

    pub fn set_request_timeout_ms(&mut self, timeout_ms: u64) {
        self.request_timeout_ms = timeout_ms;
    }

    pub fn set_mining_reward(&mut self, units: u64) {
        self.mining_reward = units;
    }

    /// Address the server binds to
    pub fn get_listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address this node registers under in peers' registries
    pub fn get_node_url(&self) -> String {
        self.node_url
            .clone()
            .unwrap_or_else(|| self.get_listen_addr())
    }

    pub fn get_target_prefix(&self) -> &str {
        self.target_prefix.as_str()
    }

    pub fn get_request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn get_mining_reward(&self) -> u64 {
        self.mining_reward
    }
}

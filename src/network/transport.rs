use crate::error::{BlockchainError, Result};
use crate::network::protocol::{Request, Response};
use log::debug;
use serde_json::Deserializer;
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// One request, one response. Implementations must give up on a dead peer
/// instead of blocking forever.
pub trait Transport: Send + Sync {
    fn call(&self, peer: &str, request: &Request) -> Result<Response>;
}

/// JSON over a fresh TCP connection per request
pub struct TcpTransport {
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(timeout: Duration) -> TcpTransport {
        TcpTransport { timeout }
    }

    fn resolve(peer: &str) -> Result<SocketAddr> {
        peer.to_socket_addrs()
            .map_err(|e| BlockchainError::Network(format!("Invalid address {peer}: {e}")))?
            .next()
            .ok_or_else(|| BlockchainError::Network(format!("Address {peer} did not resolve")))
    }
}

impl Transport for TcpTransport {
    fn call(&self, peer: &str, request: &Request) -> Result<Response> {
        let addr = Self::resolve(peer)?;
        debug!("Sending {} to {addr}", request.name());

        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| BlockchainError::Network(format!("Failed to connect to {peer}: {e}")))?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| BlockchainError::Network(format!("Failed to set write timeout: {e}")))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| BlockchainError::Network(format!("Failed to set read timeout: {e}")))?;

        serde_json::to_writer(&stream, request)
            .map_err(|e| BlockchainError::Network(format!("Failed to send to {peer}: {e}")))?;
        stream.flush()?;
        let _ = stream.shutdown(Shutdown::Write);

        let reader = BufReader::new(&stream);
        let response = Deserializer::from_reader(reader)
            .into_iter::<Response>()
            .next()
            .ok_or_else(|| {
                BlockchainError::Network(format!("{peer} closed the connection without a reply"))
            })?
            .map_err(|e| BlockchainError::Network(format!("Bad reply from {peer}: {e}")))?;
        Ok(response)
    }
}

/// Turn an `Error` reply into a network error
pub fn expect_success(peer: &str, response: Response) -> Result<Response> {
    match response {
        Response::Error { message } => Err(BlockchainError::Network(format!(
            "{peer} answered with an error: {message}"
        ))),
        other => Ok(other),
    }
}

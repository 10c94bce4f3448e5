use crate::error::{BlockchainError, Result};
use crate::network::protocol::{Request, Response};
use crate::network::NodeService;
use log::{error, info};
use serde_json::Deserializer;
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long a connected client may take to send its request
const TCP_READ_TIMEOUT: u64 = 60_000;
const TCP_WRITE_TIMEOUT: u64 = 5000;

/// Accepts connections and hands each request to the node
pub struct Server {
    node: Arc<NodeService>,
}

impl Server {
    pub fn new(node: Arc<NodeService>) -> Server {
        Server { node }
    }

    pub fn bind(addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .map_err(|e| BlockchainError::Network(format!("Failed to bind to {addr}: {e}")))
    }

    /// Bind and serve on the calling thread
    pub fn run(&self, addr: &str) -> Result<()> {
        let listener = Server::bind(addr)?;
        self.serve(listener)
    }

    /// Serve until the listener fails. One thread per connection, so a slow
    /// request (mining, fan-out) never blocks the others.
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        info!(
            "Node {} listening on {}",
            self.node.get_node_url(),
            listener.local_addr()?
        );

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer_addr = match stream.peer_addr() {
                        Ok(addr) => addr,
                        Err(e) => {
                            error!("Failed to get peer address: {e}");
                            continue;
                        }
                    };

                    let node = Arc::clone(&self.node);
                    thread::spawn(move || {
                        if let Err(e) = Server::handle_connection(&node, stream, peer_addr) {
                            error!("Error handling connection from {peer_addr}: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }

        Ok(())
    }

    /// Serve on a background thread
    pub fn spawn(self, listener: TcpListener) -> JoinHandle<()> {
        thread::spawn(move || {
            if let Err(e) = self.serve(listener) {
                error!("Server stopped: {e}");
            }
        })
    }

    fn handle_connection(node: &NodeService, stream: TcpStream, peer_addr: SocketAddr) -> Result<()> {
        stream
            .set_read_timeout(Some(Duration::from_millis(TCP_READ_TIMEOUT)))
            .map_err(|e| BlockchainError::Network(format!("Failed to set read timeout: {e}")))?;
        stream
            .set_write_timeout(Some(Duration::from_millis(TCP_WRITE_TIMEOUT)))
            .map_err(|e| BlockchainError::Network(format!("Failed to set write timeout: {e}")))?;

        let reader = BufReader::new(&stream);
        let request = Deserializer::from_reader(reader).into_iter::<Request>().next();

        let response = match request {
            Some(Ok(request)) => {
                info!("Received {} from {peer_addr}", request.name());
                node.handle(request)
            }
            Some(Err(e)) => Response::Error {
                message: format!("Malformed request: {e}"),
            },
            None => {
                return Err(BlockchainError::Network(format!(
                    "{peer_addr} closed the connection without a request"
                )))
            }
        };

        let mut stream = stream;
        serde_json::to_writer(&stream, &response)
            .map_err(|e| BlockchainError::Network(format!("Failed to reply to {peer_addr}: {e}")))?;
        stream.flush()?;
        let _ = stream.shutdown(Shutdown::Both);
        Ok(())
    }
}

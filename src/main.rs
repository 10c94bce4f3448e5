// Entry point for the ledger node and its client commands
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use peer_ledger::{
    expect_success, Command, Config, NodeService, Opt, Request, Server, TcpTransport, Transport,
};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Mining plus a fan-out to slow peers can take a while, so clients wait longer than peers do
const CLIENT_TIMEOUT_SECS: u64 = 120;

fn main() {
    // Info by default; RUST_LOG still takes precedence
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::StartNode {
            host,
            port,
            config,
            url,
            join,
        } => {
            // Defaults, then the file, then the environment, then these flags
            let mut settings = match config {
                Some(path) => Config::from_file(&path)?,
                None => Config::new()?,
            };
            if let Some(host) = host {
                settings.set_host(&host);
            }
            if let Some(port) = port {
                settings.set_port(port);
            }
            if let Some(url) = url {
                settings.set_node_url(&url);
            }

            let transport = Arc::new(TcpTransport::new(settings.get_request_timeout()));
            let listener = Server::bind(&settings.get_listen_addr())?;
            let node = Arc::new(NodeService::new(settings, transport.clone())?);

            // Listening already, so the bulk registration the peer sends back can land
            if let Some(peer) = join {
                let node_url = node.get_node_url().to_string();
                thread::spawn(move || {
                    let request = Request::RegisterAndBroadcastPeer { address: node_url };
                    match transport
                        .call(&peer, &request)
                        .and_then(|response| expect_success(&peer, response))
                    {
                        Ok(_) => info!("Joined the network through {peer}"),
                        Err(e) => warn!("Could not join through {peer}: {e}"),
                    }
                });
            }

            Server::new(node).serve(listener)?;
        }
        Command::Chain { node } => send_request(&node, Request::GetChainState)?,
        Command::Send {
            sender,
            recipient,
            amount,
            node,
        } => send_request(
            &node,
            Request::BroadcastTransaction {
                amount,
                sender,
                recipient,
            },
        )?,
        Command::Mine { node } => send_request(&node, Request::Mine)?,
        Command::Join { address, node } => {
            send_request(&node, Request::RegisterAndBroadcastPeer { address })?
        }
        Command::Consensus { node } => send_request(&node, Request::Consensus)?,
        Command::Block { hash, node } => send_request(&node, Request::GetBlock { hash })?,
        Command::Transaction { id, node } => {
            send_request(&node, Request::GetTransaction { id })?
        }
        Command::Address { address, node } => {
            send_request(&node, Request::GetAddress { address })?
        }
    }
    Ok(())
}

// Send one request and print the reply as JSON
fn send_request(node: &str, request: Request) -> Result<(), Box<dyn std::error::Error>> {
    let transport = TcpTransport::new(Duration::from_secs(CLIENT_TIMEOUT_SECS));
    let response = expect_success(node, transport.call(node, &request)?)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

//! WebSocket server: accept loop and per-connection task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections from the device and the controller.
//! 3. Upgrading each connection to a WebSocket session.
//! 4. Running, per connection:
//!    - a **reader** that forwards text frames to the dispatch queue, and
//!    - a **writer** that drains the connection's outbound queue into the socket.
//! 5. Starting the single dispatch task that owns all hub state.
//! 6. Gracefully stopping the accept loop when the `running` flag is cleared.
//!
//! # Why an outbound queue per connection?
//!
//! The coordinator must never wait on a socket.  It hands frames to a
//! [`WsLink`], which pushes them into an unbounded channel; the writer task
//! does the actual I/O.  Once the writer stops (socket gone) the channel is
//! closed and the link reports itself as not sendable.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::{anyhow, Context};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::{Coordinator, LinkError, PeerLink};
use crate::domain::config::HubConfig;
use crate::infrastructure::dispatch::{run_dispatch, HubEvent};
use crate::infrastructure::keepalive::{spawn_keepalive, KeepaliveHandle};

/// Capacity of the shared inbound event queue.
const EVENT_QUEUE_DEPTH: usize = 256;

/// How often the accept loop wakes up to check the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

// ── Link ──────────────────────────────────────────────────────────────────────

/// [`PeerLink`] backed by a WebSocket connection's outbound queue.
///
/// Owns the connection's keepalive timer, so dropping the link (which the
/// registry does on close) also stops the pings.
#[derive(Debug)]
pub struct WsLink {
    outbound: mpsc::UnboundedSender<String>,
    _keepalive: KeepaliveHandle,
}

impl WsLink {
    pub fn new(outbound: mpsc::UnboundedSender<String>, keepalive: KeepaliveHandle) -> Self {
        Self {
            outbound,
            _keepalive: keepalive,
        }
    }
}

impl PeerLink for WsLink {
    fn is_sendable(&self) -> bool {
        !self.outbound.is_closed()
    }

    fn send_text(&self, text: String) -> Result<(), LinkError> {
        self.outbound.send(text).map_err(|_| LinkError::Closed)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `config.ws_bind_addr` and serves until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use or the process lacks permission to bind).
pub async fn run_server(config: HubConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.ws_bind_addr)
        .await
        .with_context(|| {
            format!(
                "failed to bind WebSocket listener on {}",
                config.ws_bind_addr
            )
        })?;

    info!("QuizLink hub listening on {}", config.ws_bind_addr);
    serve(listener, config, running).await
}

/// Serves connections from an already bound `listener`.
///
/// Starts the dispatch task, then accepts connections until `running` is
/// cleared.  Tests bind `127.0.0.1:0` themselves and call this directly.
///
/// # Errors
///
/// Currently never fails once the listener is bound; accept errors are
/// logged and the loop continues.
pub async fn serve(
    listener: TcpListener,
    config: HubConfig,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let (events_tx, events_rx) = mpsc::channel::<HubEvent<WsLink>>(EVENT_QUEUE_DEPTH);
    let coordinator = Coordinator::new(config.initial_answer.clone());
    let dispatcher = tokio::spawn(run_dispatch(coordinator, events_rx));

    let config = Arc::new(config);

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout so the `running` flag is checked even when idle.
        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                debug!("new TCP connection from {peer_addr}");
                let cfg = Arc::clone(&config);
                let events = events_tx.clone();
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, cfg, events).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error (e.g., too many open file descriptors).
                error!("accept error: {e}");
            }
            Err(_) => {}
        }
    }

    dispatcher.abort();
    Ok(())
}

// ── Per-connection handler ────────────────────────────────────────────────────

async fn handle_connection(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<HubConfig>,
    events: mpsc::Sender<HubEvent<WsLink>>,
) {
    match run_connection(raw_stream, peer_addr, config, events).await {
        Ok(()) => debug!("connection {peer_addr} finished"),
        Err(e) => warn!("connection {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs one WebSocket connection from handshake to close.
///
/// The hub is told about the connection once the handshake succeeds and is
/// always told when it ends, whichever side ended it.
async fn run_connection(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<HubConfig>,
    events: mpsc::Sender<HubEvent<WsLink>>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let id = Uuid::new_v4();
    let label = peer_addr.to_string();
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let keepalive = spawn_keepalive(out_tx.clone(), config.ping_interval, label.clone());

    events
        .send(HubEvent::Opened {
            id,
            label: label.clone(),
            link: WsLink::new(out_tx, keepalive),
        })
        .await
        .map_err(|_| anyhow!("dispatch loop stopped"))?;

    // ── Writer: outbound queue → socket ───────────────────────────────────────
    //
    // Ends when every sender is gone (the registry dropped the link) or the
    // socket rejects a write.
    let label_w = label.clone();
    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if let Err(e) = ws_tx.send(WsMessage::Text(text)).await {
                debug!("{label_w}: WebSocket send failed: {e}");
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // ── Reader: socket → dispatch queue ───────────────────────────────────────
    let reader = async {
        loop {
            let msg = match ws_rx.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                    debug!("{label}: WebSocket closed");
                    break;
                }
                Some(Err(e)) => {
                    warn!("{label}: WebSocket error: {e}");
                    break;
                }
                None => {
                    debug!("{label}: stream ended");
                    break;
                }
            };

            match msg {
                WsMessage::Text(text) => {
                    if events.send(HubEvent::Frame { id, text }).await.is_err() {
                        break;
                    }
                }
                WsMessage::Binary(_) => {
                    // The protocol is JSON text only.
                    warn!("{label}: unexpected binary frame (ignored)");
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
                WsMessage::Close(_) => {
                    debug!("{label}: Close frame received");
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = reader => {}
        _ = writer => {
            debug!("{label}: writer stopped");
        }
    }

    // Dropping the link in the registry closes the outbound queue, which in
    // turn lets the writer (if still running) close the socket.
    let _ = events.send(HubEvent::Closed { id }).await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ws_link_is_sendable_while_queue_open() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let keepalive = spawn_keepalive(tx.clone(), Duration::from_secs(60), "t".to_string());
        let link = WsLink::new(tx, keepalive);

        assert!(link.is_sendable());
        link.send_text("hello".to_string()).unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_ws_link_reports_closed_after_writer_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let keepalive = spawn_keepalive(tx.clone(), Duration::from_secs(60), "t".to_string());
        let link = WsLink::new(tx, keepalive);

        drop(rx);

        assert!(!link.is_sendable());
        assert_eq!(link.send_text("x".to_string()), Err(LinkError::Closed));
    }

    #[tokio::test]
    async fn test_run_server_fails_on_unbindable_address() {
        // Occupy a port, then ask the server to bind the same one.
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = HubConfig {
            ws_bind_addr: taken.local_addr().unwrap(),
            ..HubConfig::default()
        };

        let result = run_server(config, Arc::new(AtomicBool::new(true))).await;

        assert!(result.is_err());
    }
}

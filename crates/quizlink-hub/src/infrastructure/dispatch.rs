//! Single-consumer dispatch loop.
//!
//! Every connection task pushes [`HubEvent`]s into one queue; this loop pops
//! them one at a time and applies them to the [`Coordinator`].  Because only
//! this task touches the coordinator, the registry and session are mutated
//! without locks and dispatches never interleave.  Events from one connection
//! keep their order; events from different connections are ordered by
//! arrival at the queue.

use quizlink_core::ConnectionId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::application::{Coordinator, PeerLink};

/// Something that happened on a connection.
#[derive(Debug)]
pub enum HubEvent<L> {
    /// The WebSocket handshake completed.
    Opened {
        id: ConnectionId,
        label: String,
        link: L,
    },
    /// A text frame arrived.
    Frame { id: ConnectionId, text: String },
    /// The transport closed.
    Closed { id: ConnectionId },
}

/// Applies events to `coordinator` until every sender is dropped.
///
/// Returns the coordinator so callers (and tests) can inspect final state.
pub async fn run_dispatch<L: PeerLink>(
    mut coordinator: Coordinator<L>,
    mut events: mpsc::Receiver<HubEvent<L>>,
) -> Coordinator<L> {
    while let Some(event) = events.recv().await {
        match event {
            HubEvent::Opened { id, label, link } => {
                coordinator.connection_opened(id, label, link);
            }
            HubEvent::Frame { id, text } => {
                debug!("conn {id}: frame {text}");
                if let Err(e) = coordinator.handle_frame(id, &text) {
                    warn!("conn {id}: dropped malformed frame: {e}");
                }
            }
            HubEvent::Closed { id } => coordinator.connection_closed(id),
        }
    }

    debug!("event queue closed; dispatch loop stopped");
    coordinator
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Connection registry: role-indexed view of the live connections.
//!
//! The registry tracks every open connection (so free-text logs can be
//! relayed to "everyone else") and keeps exactly one slot per [`Role`].  A
//! slot holds the id of the connection that currently speaks for that role.
//!
//! # Reconnect policy (last bind wins)
//!
//! When a second connection claims a role that is already bound, the slot is
//! simply overwritten.  The previous occupant is not closed or notified; it
//! stays tracked until its own transport closes and keeps receiving
//! broadcasts, but role-addressed sends go to the newer connection only.
//!
//! # Teardown
//!
//! [`Registry::unbind`] removes a connection and clears every slot that still
//! points at *that* connection.  A stale connection that already lost its slot
//! cannot clear the newer occupant.  Dropping the removed record drops its
//! [`PeerLink`], which releases any per-connection resources the link owns
//! (the WebSocket link owns the keepalive timer).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quizlink_core::{encode_frame, ConnectionId, Outbound, Role};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Error returned by a [`PeerLink`] write.
#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    /// The underlying transport has stopped accepting frames.
    #[error("peer link closed")]
    Closed,
}

/// Write side of one live connection.
///
/// The infrastructure implementation queues text frames for the socket's
/// writer task; tests use a recording implementation.  Writes are
/// fire-and-forget: `Ok` means the frame was handed to the transport, not
/// that the peer received it.
pub trait PeerLink: Send {
    /// `true` while the transport can accept frames.
    fn is_sendable(&self) -> bool;

    /// Hands one text frame to the transport.
    fn send_text(&self, text: String) -> Result<(), LinkError>;
}

/// Result of a role-addressed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame was handed to the role's current connection.
    Delivered,
    /// The slot is empty, the connection is not sendable, or the frame could
    /// not be encoded.  Already logged; callers just move on.
    Unreachable,
}

impl SendOutcome {
    pub fn is_delivered(self) -> bool {
        matches!(self, SendOutcome::Delivered)
    }
}

/// Result of binding a connection to a role slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The slot was empty.
    Fresh,
    /// The connection already held the slot.
    Unchanged,
    /// The slot pointed at another connection, which keeps running unbound.
    Replaced { previous: ConnectionId },
    /// The connection is not tracked (already closed); nothing was bound.
    Untracked,
}

/// Per-connection record.
struct TrackedConnection<L> {
    link: L,
    /// Peer address or other human-readable label for log lines.
    label: String,
    /// Last role this connection announced, if any.
    role: Option<Role>,
    last_seen: Instant,
}

/// A connection removed by [`Registry::unbind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedConnection {
    pub label: String,
    pub role: Option<Role>,
    /// Role slots that pointed at this connection and were cleared.
    pub cleared: Vec<Role>,
    /// Time since the last inbound frame.
    pub idle_for: Duration,
}

/// The connection registry.
///
/// Owned by the coordinator; all mutation happens on the single dispatch
/// task, so no locking is needed.
pub struct Registry<L> {
    connections: HashMap<ConnectionId, TrackedConnection<L>>,
    slots: HashMap<Role, ConnectionId>,
}

impl<L> Default for Registry<L> {
    fn default() -> Self {
        Self {
            connections: HashMap::new(),
            slots: HashMap::new(),
        }
    }
}

impl<L: PeerLink> Registry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a freshly accepted connection.  It has no role yet.
    pub fn track(&mut self, id: ConnectionId, label: impl Into<String>, link: L) {
        self.connections.insert(
            id,
            TrackedConnection {
                link,
                label: label.into(),
                role: None,
                last_seen: Instant::now(),
            },
        );
    }

    /// Number of tracked connections, bound or not.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn is_tracked(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Last role the connection announced.
    pub fn role_of(&self, id: ConnectionId) -> Option<Role> {
        self.connections.get(&id).and_then(|c| c.role)
    }

    /// Connection currently bound to `role`.
    pub fn occupant(&self, role: Role) -> Option<ConnectionId> {
        self.slots.get(&role).copied()
    }

    /// `true` if `role` is bound to a sendable connection.
    pub fn is_reachable(&self, role: Role) -> bool {
        self.occupant_link(role)
            .map(|link| link.is_sendable())
            .unwrap_or(false)
    }

    /// Records inbound activity on a connection.
    pub fn touch(&mut self, id: ConnectionId) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.last_seen = Instant::now();
        }
    }

    /// Points the `role` slot at connection `id`, overwriting any occupant.
    pub fn bind(&mut self, role: Role, id: ConnectionId) -> BindOutcome {
        let Some(conn) = self.connections.get_mut(&id) else {
            return BindOutcome::Untracked;
        };
        conn.role = Some(role);

        match self.slots.insert(role, id) {
            None => BindOutcome::Fresh,
            Some(previous) if previous == id => BindOutcome::Unchanged,
            Some(previous) => BindOutcome::Replaced { previous },
        }
    }

    /// Stops tracking connection `id` and clears the slots that point at it.
    ///
    /// Slots held by other connections are left alone, even if `id` once
    /// claimed the same role.  Returns `None` if `id` was not tracked.
    pub fn unbind(&mut self, id: ConnectionId) -> Option<ClosedConnection> {
        let conn = self.connections.remove(&id)?;

        let cleared: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|role| self.slots.get(role) == Some(&id))
            .collect();
        for role in &cleared {
            self.slots.remove(role);
        }

        Some(ClosedConnection {
            label: conn.label,
            role: conn.role,
            cleared,
            idle_for: conn.last_seen.elapsed(),
        })
    }

    /// Sends `frame` to the connection bound to `role`.
    ///
    /// Never blocks and never retries.  An empty slot or a closed link is
    /// logged and reported as [`SendOutcome::Unreachable`].
    pub fn send_to(&self, role: Role, frame: &Outbound) -> SendOutcome {
        let Some(link) = self.occupant_link(role) else {
            warn!("{role} not connected; frame dropped");
            return SendOutcome::Unreachable;
        };
        if !link.is_sendable() {
            warn!("{role} connection not open; frame dropped");
            return SendOutcome::Unreachable;
        }

        let text = match encode_frame(frame) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to encode frame for {role}: {e}");
                return SendOutcome::Unreachable;
            }
        };

        match link.send_text(text) {
            Ok(()) => {
                debug!("sent frame to {role}");
                SendOutcome::Delivered
            }
            Err(e) => {
                warn!("send to {role} failed: {e}");
                SendOutcome::Unreachable
            }
        }
    }

    /// Sends `frame` to every sendable tracked connection except `sender`.
    ///
    /// Returns how many connections the frame was handed to.
    pub fn broadcast_except(&self, sender: ConnectionId, frame: &Outbound) -> usize {
        let text = match encode_frame(frame) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to encode broadcast frame: {e}");
                return 0;
            }
        };

        let mut delivered = 0;
        for (id, conn) in &self.connections {
            if *id == sender || !conn.link.is_sendable() {
                continue;
            }
            match conn.link.send_text(text.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => debug!("broadcast to {} failed: {e}", conn.label),
            }
        }
        delivered
    }

    fn occupant_link(&self, role: Role) -> Option<&L> {
        let id = self.slots.get(&role)?;
        self.connections.get(id).map(|c| &c.link)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Coordinator: routes decoded frames to the registry and the question session.
//!
//! One `Coordinator` owns the [`Registry`] and the [`QuestionSession`].  The
//! infrastructure layer feeds it connection events one at a time from a single
//! task, so none of the methods here need locking and no two dispatches ever
//! interleave.
//!
//! # Per-frame flow
//!
//! ```text
//! text frame ─► decode_frame ─► "type" marker?  ─► Registry::bind
//!                                                   └─ device bound? redeliver pending question
//!                             ─► "command"?     ─► log | start | check | select
//! ```
//!
//! Nothing here fails a dispatch turn because a peer is away.  Every send goes
//! through [`Registry::send_to`], which logs and reports an unreachable peer;
//! the device catches up on its own when it reconnects and re-announces itself.

use quizlink_core::{
    decode_frame, Command, ConnectionId, Envelope, Outbound, ProtocolError, Role, Verdict,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::registry::{BindOutcome, PeerLink, Registry};
use crate::application::session::QuestionSession;

/// Owns all hub state and applies peer commands to it.
pub struct Coordinator<L> {
    registry: Registry<L>,
    session: QuestionSession,
}

impl<L: PeerLink> Coordinator<L> {
    /// Creates a coordinator with no connections and an idle session.
    pub fn new(initial_answer: Option<String>) -> Self {
        Self {
            registry: Registry::new(),
            session: QuestionSession::new(initial_answer),
        }
    }

    pub fn registry(&self) -> &Registry<L> {
        &self.registry
    }

    pub fn session(&self) -> &QuestionSession {
        &self.session
    }

    // ── Connection lifecycle ──────────────────────────────────────────────────

    /// A transport connection was accepted.
    pub fn connection_opened(&mut self, id: ConnectionId, label: impl Into<String>, link: L) {
        let label = label.into();
        info!("conn {id} ({label}) opened");
        self.registry.track(id, label, link);
    }

    /// A transport connection closed.  Clears any role slot it still holds.
    pub fn connection_closed(&mut self, id: ConnectionId) {
        let Some(closed) = self.registry.unbind(id) else {
            debug!("conn {id} closed but was not tracked");
            return;
        };

        for role in &closed.cleared {
            info!("{role} disconnected (conn {id}, {})", closed.label);
        }
        if self.session.release(id) {
            info!("open question will be resent when the device reconnects");
        }
        info!(
            "conn {id} ({}) closed, idle for {:.1}s",
            closed.label,
            closed.idle_for.as_secs_f32()
        );
    }

    // ── Frame routing ─────────────────────────────────────────────────────────

    /// Decodes and dispatches one inbound text frame from connection `id`.
    ///
    /// # Errors
    ///
    /// Returns the [`ProtocolError`] for a malformed frame.  The frame has been
    /// dropped; the connection stays open and hub state is unchanged.
    pub fn handle_frame(&mut self, id: ConnectionId, text: &str) -> Result<(), ProtocolError> {
        self.registry.touch(id);
        let envelope = decode_frame(text)?;
        self.dispatch(id, envelope);
        Ok(())
    }

    /// Applies an already-decoded frame: role binding first, then the command.
    pub fn dispatch(&mut self, id: ConnectionId, envelope: Envelope) {
        if let Some(role) = envelope.marker.as_ref().and_then(|m| m.role()) {
            self.identify(id, role);
        }

        let Some(command) = envelope.command else {
            return;
        };
        debug!("conn {id}: command '{}'", command.name());

        match command {
            Command::Log { message } => {
                self.relay_log(id, message);
            }
            Command::Start {
                message,
                correct_answer,
            } => self.start(message, correct_answer),
            Command::Check { tag_id } => {
                self.check(&tag_id);
            }
            Command::Select {
                correct_answer,
                message,
            } => self.select(correct_answer, message),
            Command::Unrecognized(name) => {
                warn!("conn {id}: unrecognized command '{name}' ignored");
            }
        }
    }

    /// Binds connection `id` to `role`.
    ///
    /// Binding the device is the redelivery hook: an open question that this
    /// connection has not been sent yet is sent to it now.  Re-announcing on
    /// the same connection does not resend.
    pub fn identify(&mut self, id: ConnectionId, role: Role) {
        match self.registry.bind(role, id) {
            BindOutcome::Fresh => info!("{role} connected (conn {id})"),
            BindOutcome::Unchanged => debug!("{role} re-announced on conn {id}"),
            BindOutcome::Replaced { previous } => {
                info!("{role} reconnected on conn {id}; conn {previous} no longer bound")
            }
            BindOutcome::Untracked => {
                warn!("conn {id} announced {role} but is not tracked");
                return;
            }
        }

        if role == Role::Device {
            self.deliver_pending();
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Relays free text to every connection except the sender.
    pub fn relay_log(&mut self, sender: ConnectionId, message: String) -> usize {
        info!("log from conn {sender}: {message}");
        let relayed = self
            .registry
            .broadcast_except(sender, &Outbound::print_log(message));
        debug!("log relayed to {relayed} connection(s)");
        relayed
    }

    /// Opens a new question and tries to hand it to the device immediately.
    pub fn start(&mut self, payload: Value, expected_answer: Option<String>) {
        if self.session.begin(payload, expected_answer) {
            info!("new question replaces the open one; previous question dropped without verdict");
        }
        if !self.deliver_pending() {
            info!("question held until the device connects");
        }
    }

    /// Judges a submitted tag and reports the verdict to both peers.
    ///
    /// The session is idle afterwards whether or not either peer received its
    /// verdict.
    pub fn check(&mut self, token: &str) -> Verdict {
        debug!("judging tag '{token}'");
        let verdict = self.session.check(token);

        match verdict {
            Verdict::Correct => info!("correct answer"),
            Verdict::Incorrect => info!("wrong answer"),
        }

        self.registry
            .send_to(Role::Device, &Outbound::device_verdict(verdict));
        self.registry
            .send_to(Role::Controller, &Outbound::controller_verdict(verdict, token));
        verdict
    }

    /// Registers the next expected answer and tells the device to get ready.
    ///
    /// This is a direct controller→device relay; it is not a tracked question
    /// and is never redelivered.
    pub fn select(&mut self, expected_answer: String, message: Value) {
        self.session.set_expected_answer(expected_answer);
        let outcome = self
            .registry
            .send_to(Role::Device, &Outbound::start_input(message));
        if !outcome.is_delivered() {
            warn!("answer registered, but no device to prepare");
        }
    }

    /// Sends the open question to the bound device if that connection does
    /// not have it yet.
    ///
    /// Returns `true` if nothing is pending afterwards.
    fn deliver_pending(&mut self) -> bool {
        let Some(device) = self.registry.occupant(Role::Device) else {
            return self.session.pending_payload().is_none();
        };
        let Some(payload) = self.session.pending_for(device).cloned() else {
            return true;
        };

        if self
            .registry
            .send_to(Role::Device, &Outbound::start_input(payload))
            .is_delivered()
        {
            self.session.mark_delivered(device);
            info!("question delivered to device");
            true
        } else {
            false
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

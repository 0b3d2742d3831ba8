//! QuestionSession: lifecycle of the question currently in flight.
//!
//! # States
//!
//! ```text
//!            start                 delivered to device
//!   Idle ───────────► AwaitingDelivery ───────────────► Delivered
//!    ▲                     │   ▲                            │
//!    │        check        │   └──── start (preempts) ──────┤
//!    └─────────────────────┴────────────────────────────────┘
//! ```
//!
//! - `start` always moves to `AwaitingDelivery`, discarding any previous
//!   payload without a verdict.
//! - `check` judges against the current expected answer and always returns
//!   to `Idle`, whatever state it was called in.
//! - `set_expected_answer` (the `select` command) rewrites the expected answer
//!   only; it never changes state.
//! - The session remembers which connection the payload went to.  A device
//!   bound on any other connection still has the question pending, and
//!   [`QuestionSession::release`] moves `Delivered` back to `AwaitingDelivery`
//!   when the connection holding the question closes.
//!
//! The session holds no links.  The coordinator asks it for the pending
//! payload and reports back with [`QuestionSession::mark_delivered`].

use quizlink_core::{judge, ConnectionId, Verdict};
use serde_json::Value;

/// Observable state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No question open.
    Idle,
    /// A question is open but the device has not been sent it yet.
    AwaitingDelivery,
    /// A question is open and the device has been sent it at least once.
    Delivered,
}

/// The single question record.
///
/// Invariant: `delivered_to` is `Some` only while `active`.
#[derive(Debug, Clone, Default)]
pub struct QuestionSession {
    active: bool,
    delivered_to: Option<ConnectionId>,
    payload: Option<Value>,
    expected_answer: Option<String>,
}

impl QuestionSession {
    /// Creates an idle session.  `initial_answer` is the expected answer in
    /// effect until the controller registers one.
    pub fn new(initial_answer: Option<String>) -> Self {
        Self {
            expected_answer: initial_answer,
            ..Self::default()
        }
    }

    pub fn state(&self) -> SessionState {
        match (self.active, self.delivered_to) {
            (false, _) => SessionState::Idle,
            (true, None) => SessionState::AwaitingDelivery,
            (true, Some(_)) => SessionState::Delivered,
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered_to.is_some()
    }

    /// Connection that was last handed the open question.
    pub fn delivered_to(&self) -> Option<ConnectionId> {
        self.delivered_to
    }

    pub fn expected_answer(&self) -> Option<&str> {
        self.expected_answer.as_deref()
    }

    /// Payload of the open question, delivered or not.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref().filter(|_| self.active)
    }

    /// Opens a new question, replacing any open one.
    ///
    /// Returns `true` if an open question was discarded.  When
    /// `expected_answer` is `None` the previously registered answer stays in
    /// effect.
    pub fn begin(&mut self, payload: Value, expected_answer: Option<String>) -> bool {
        let preempted = self.active;
        self.active = true;
        self.delivered_to = None;
        self.payload = Some(payload);
        if let Some(answer) = expected_answer {
            self.expected_answer = Some(answer);
        }
        preempted
    }

    /// Payload that has not reached any device yet.
    pub fn pending_payload(&self) -> Option<&Value> {
        if self.active && self.delivered_to.is_none() {
            self.payload.as_ref()
        } else {
            None
        }
    }

    /// Payload that connection `device` has not been sent yet.
    ///
    /// A device that reconnected on a new connection before its old socket
    /// closed still gets the open question.
    pub fn pending_for(&self, device: ConnectionId) -> Option<&Value> {
        if self.active && self.delivered_to != Some(device) {
            self.payload.as_ref()
        } else {
            None
        }
    }

    /// Records that the open question was handed to connection `device`.
    ///
    /// Ignored while idle, so `delivered_to` never outlives `active`.
    pub fn mark_delivered(&mut self, device: ConnectionId) {
        if self.active {
            self.delivered_to = Some(device);
        }
    }

    /// Forgets the delivery if connection `id` was the one holding the
    /// question, making it pending again.
    ///
    /// Returns `true` if the session moved back to `AwaitingDelivery`.
    /// Ignored while idle.
    pub fn release(&mut self, id: ConnectionId) -> bool {
        if self.active && self.delivered_to == Some(id) {
            self.delivered_to = None;
            true
        } else {
            false
        }
    }

    /// Judges `token` and closes the question.
    ///
    /// The token is compared against whatever expected answer is current, even
    /// when no question is open: a late or duplicate answer is still judged.
    pub fn check(&mut self, token: &str) -> Verdict {
        let verdict = judge(token, self.expected_answer());
        self.active = false;
        self.delivered_to = None;
        self.payload = None;
        verdict
    }

    /// Replaces the expected answer for the next `check`.
    pub fn set_expected_answer(&mut self, answer: String) {
        self.expected_answer = Some(answer);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_new_session_is_idle() {
        let session = QuestionSession::new(None);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.pending_payload().is_none());
        assert!(session.payload().is_none());
    }

    #[test]
    fn test_new_session_keeps_initial_answer() {
        let session = QuestionSession::new(Some("a12345".to_string()));
        assert_eq!(session.expected_answer(), Some("a12345"));
    }

    #[test]
    fn test_begin_moves_to_awaiting_delivery() {
        // Arrange
        let mut session = QuestionSession::new(None);

        // Act
        let preempted = session.begin(json!("Q1"), Some("a1".to_string()));

        // Assert
        assert!(!preempted);
        assert_eq!(session.state(), SessionState::AwaitingDelivery);
        assert_eq!(session.pending_payload(), Some(&json!("Q1")));
        assert_eq!(session.expected_answer(), Some("a1"));
    }

    #[test]
    fn test_begin_without_answer_keeps_registered_answer() {
        let mut session = QuestionSession::new(None);
        session.set_expected_answer("from-select".to_string());

        session.begin(json!("Q1"), None);

        assert_eq!(session.expected_answer(), Some("from-select"));
    }

    #[test]
    fn test_mark_delivered_moves_to_delivered() {
        let mut session = QuestionSession::new(None);
        session.begin(json!("Q1"), None);

        session.mark_delivered(Uuid::new_v4());

        assert_eq!(session.state(), SessionState::Delivered);
        assert!(session.pending_payload().is_none());
        assert_eq!(session.payload(), Some(&json!("Q1")));
    }

    #[test]
    fn test_mark_delivered_while_idle_is_ignored() {
        let mut session = QuestionSession::new(None);
        session.mark_delivered(Uuid::new_v4());
        assert!(!session.is_delivered());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_second_begin_discards_previous_question() {
        let mut session = QuestionSession::new(None);
        session.begin(json!("Q1"), Some("a1".to_string()));
        session.mark_delivered(Uuid::new_v4());

        let preempted = session.begin(json!("Q2"), Some("a2".to_string()));

        assert!(preempted);
        assert_eq!(session.state(), SessionState::AwaitingDelivery);
        assert_eq!(session.pending_payload(), Some(&json!("Q2")));
        assert_eq!(session.expected_answer(), Some("a2"));
    }

    #[test]
    fn test_check_returns_to_idle_from_every_state() {
        // Idle
        let mut session = QuestionSession::new(None);
        session.check("x");
        assert_eq!(session.state(), SessionState::Idle);

        // AwaitingDelivery
        session.begin(json!("Q"), None);
        session.check("x");
        assert_eq!(session.state(), SessionState::Idle);

        // Delivered
        session.begin(json!("Q"), None);
        session.mark_delivered(Uuid::new_v4());
        session.check("x");
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.payload().is_none());
    }

    #[test]
    fn test_check_is_exact_against_expected_answer() {
        let mut session = QuestionSession::new(None);
        session.begin(json!("Q"), Some("Tag-01".to_string()));
        assert_eq!(session.check("tag-01"), Verdict::Incorrect);

        session.begin(json!("Q"), None);
        assert_eq!(session.check("Tag-01"), Verdict::Correct);
    }

    #[test]
    fn test_check_keeps_expected_answer_for_duplicates() {
        let mut session = QuestionSession::new(None);
        session.begin(json!("Q"), Some("a1".to_string()));
        assert_eq!(session.check("a1"), Verdict::Correct);

        // A duplicate arriving after the question closed is judged the same way.
        assert_eq!(session.check("a1"), Verdict::Correct);
    }

    #[test]
    fn test_check_without_any_answer_is_incorrect() {
        let mut session = QuestionSession::new(None);
        assert_eq!(session.check("a1"), Verdict::Incorrect);
    }

    #[test]
    fn test_set_expected_answer_does_not_change_state() {
        let mut session = QuestionSession::new(None);
        session.set_expected_answer("a1".to_string());
        assert_eq!(session.state(), SessionState::Idle);

        session.begin(json!("Q"), None);
        session.mark_delivered(Uuid::new_v4());
        session.set_expected_answer("a2".to_string());
        assert_eq!(session.state(), SessionState::Delivered);
        assert_eq!(session.expected_answer(), Some("a2"));
    }

    #[test]
    fn test_pending_for_skips_only_the_connection_that_has_it() {
        // Arrange
        let mut session = QuestionSession::new(None);
        let old_device = Uuid::new_v4();
        let new_device = Uuid::new_v4();
        session.begin(json!("Q1"), None);

        // Act
        session.mark_delivered(old_device);

        // Assert
        assert_eq!(session.delivered_to(), Some(old_device));
        assert!(session.pending_for(old_device).is_none());
        assert_eq!(session.pending_for(new_device), Some(&json!("Q1")));
    }

    #[test]
    fn test_release_by_holder_makes_question_pending_again() {
        let mut session = QuestionSession::new(None);
        let device = Uuid::new_v4();
        session.begin(json!("Q1"), None);
        session.mark_delivered(device);

        assert!(session.release(device));

        assert_eq!(session.state(), SessionState::AwaitingDelivery);
        assert_eq!(session.pending_payload(), Some(&json!("Q1")));
    }

    #[test]
    fn test_release_by_other_connection_keeps_delivery() {
        let mut session = QuestionSession::new(None);
        let holder = Uuid::new_v4();
        session.begin(json!("Q1"), None);
        session.mark_delivered(holder);

        assert!(!session.release(Uuid::new_v4()));

        assert_eq!(session.state(), SessionState::Delivered);
        assert_eq!(session.delivered_to(), Some(holder));
    }

    #[test]
    fn test_release_while_idle_is_ignored() {
        let mut session = QuestionSession::new(None);
        assert!(!session.release(Uuid::new_v4()));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.pending_payload(), None);
    }
}

//! # quizlink-core
//!
//! Shared library for QuizLink containing the JSON wire protocol, the peer
//! role model, and the answer judge.
//!
//! This crate is used by the session hub and by anything that wants to speak
//! to it (test harnesses, device simulators).  It has zero dependencies on
//! sockets, async runtimes, or the file system.
//!
//! # Architecture overview (for beginners)
//!
//! QuizLink pairs two peers over WebSocket:
//!
//! - the **device**: a hardware answer box with an RFID reader.  It shows a
//!   question, waits for a tag to be tapped, and reports the tag id.
//! - the **controller**: the quiz website.  It picks questions, registers the
//!   correct answer, and displays the verdict.
//!
//! A hub process sits between them, remembers the question in flight, and
//! judges each answer.  This crate defines the shared vocabulary:
//!
//! - **`protocol`** – How frames travel over the wire.  Every frame is one JSON
//!   object; inbound frames are decoded into a typed [`Envelope`] and outbound
//!   frames are built from [`Outbound`].
//!
//! - **`domain`** – Pure business rules: which [`Role`] a connection plays and
//!   how a submitted tag is judged against the expected answer.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `quizlink_core::Role` instead of `quizlink_core::domain::role::Role`.
pub use domain::judge::{answers_match_leniently, judge, Verdict};
pub use domain::role::{ConnectionId, Role, RoleMarker};
pub use protocol::codec::{decode_frame, encode_frame, ProtocolError};
pub use protocol::messages::{Command, Envelope, Outbound};

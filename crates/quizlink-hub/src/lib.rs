//! quizlink-hub library crate.
//!
//! This crate pairs one answer device with one controller website and
//! mediates a single-question-at-a-time quiz between them.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Device (JSON over WebSocket)        Controller (JSON over WebSocket)
//!         ↘                                   ↙
//! [quizlink-hub]
//!   ├── domain/           HubConfig
//!   ├── application/      Coordinator: Registry + QuestionSession + routing
//!   └── infrastructure/
//!         ├── ws_server/    WebSocket accept loop (tokio-tungstenite)
//!         ├── dispatch/     Single-consumer event loop driving the Coordinator
//!         ├── keepalive/    Per-connection ping timer
//!         └── answer_store/ Out-of-band expected-answer lookup
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `application` depends on `domain` and `quizlink-core` only.  It talks to
//!   connections through the [`application::PeerLink`] trait.
//! - `infrastructure` depends on all other layers plus `tokio` and `tungstenite`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: registry, question session, and message routing.
pub mod application;

/// Infrastructure layer: WebSocket server, dispatch loop, answer store.
pub mod infrastructure;

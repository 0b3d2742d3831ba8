//! Infrastructure layer for quizlink-hub.
//!
//! The infrastructure layer handles all I/O: accepting WebSocket connections,
//! moving frames between sockets and the coordinator, per-connection timers,
//! and reading the answer file.
//!
//! # Responsibilities
//!
//! - Binding a TCP listener and performing the WebSocket upgrade handshake
//! - Spawning per-connection reader/writer tasks
//! - Running the single dispatch task that owns the coordinator
//! - Keepalive pings, owned by each connection's link
//! - Loading expected answers for the out-of-band lookup
//!
//! # What does NOT belong here?
//!
//! - Deciding what a frame means (that is the application layer)
//! - Message type definitions (that is `quizlink-core`)
//! - Configuration parsing (that is done in `main.rs`)

pub mod answer_store;
pub mod dispatch;
pub mod keepalive;
pub mod ws_server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use answer_store::{
    check_submitted_answer, AnswerStore, LookupVerdict, StoreError, TomlAnswerStore,
};
pub use ws_server::{run_server, serve};

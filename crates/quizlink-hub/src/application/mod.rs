//! Application layer for quizlink-hub.
//!
//! The application layer holds all hub state and decides what each inbound
//! frame does.  It knows *what* to send to whom, but delegates *how* bytes
//! reach a socket to the infrastructure layer through [`PeerLink`].
//!
//! # Responsibilities
//!
//! - Tracking which connection speaks for the device and for the controller
//!   ([`Registry`])
//! - The open-question state machine ([`QuestionSession`])
//! - Routing decoded commands and fanning out verdicts ([`Coordinator`])
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or listening for connections (that is infrastructure)
//! - Tokio task spawning and timers (that is infrastructure)
//! - WebSocket framing (handled by tokio-tungstenite)

pub mod coordinator;
pub mod registry;
pub mod session;

pub use coordinator::Coordinator;
pub use registry::{BindOutcome, ClosedConnection, LinkError, PeerLink, Registry, SendOutcome};
pub use session::{QuestionSession, SessionState};

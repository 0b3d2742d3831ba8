//! Domain entities for QuizLink.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: the peer roles a connection can claim and the rules for
//! judging a submitted answer.
//!
//! Code in outer layers (the hub's application and infrastructure layers)
//! depends on the domain, but the domain never depends on them.

/// Answer comparison rules.
pub mod judge;

/// Peer roles and connection identity.
pub mod role;

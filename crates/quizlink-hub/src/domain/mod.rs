//! Domain layer for quizlink-hub.
//!
//! Pure configuration types with no dependencies on I/O, networking, or
//! external frameworks.  Protocol messages and roles live in `quizlink-core`
//! because peers and test harnesses share them.

pub mod config;

pub use config::HubConfig;

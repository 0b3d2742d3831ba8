//! Hub configuration types.
//!
//! [`HubConfig`] is the single source of truth for all runtime settings.  It
//! is populated from CLI arguments and environment variables in `main.rs`, or
//! from [`Default`] in tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// All runtime configuration for the session hub.
///
/// # Example
///
/// ```rust
/// use quizlink_hub::domain::HubConfig;
///
/// let cfg = HubConfig::default();
/// assert_eq!(cfg.ws_bind_addr.port(), 3000);
/// ```
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// The address and port the WebSocket server binds to.
    ///
    /// Both the device and the controller connect here; the role is decided
    /// by the first identifying frame, not by the port.
    pub ws_bind_addr: SocketAddr,

    /// How often each connection is sent a `{"type":"ping"}` frame.
    ///
    /// Separate from WebSocket protocol-level ping/pong.  Some device
    /// firmware drops idle sockets unless it sees application traffic.
    pub ping_interval: Duration,

    /// TOML file of expected answers for the out-of-band lookup.
    pub answers_path: Option<PathBuf>,

    /// Expected answer in effect before the controller registers one.
    ///
    /// `None` means a `check` that arrives before any `select` or `start`
    /// with an answer is judged incorrect.
    pub initial_answer: Option<String>,
}

impl Default for HubConfig {
    /// | Field           | Default         |
    /// |-----------------|-----------------|
    /// | ws_bind_addr    | `0.0.0.0:3000`  |
    /// | ping_interval   | 50 seconds      |
    /// | answers_path    | none            |
    /// | initial_answer  | none            |
    fn default() -> Self {
        Self {
            ws_bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            ping_interval: Duration::from_secs(50),
            answers_path: None,
            initial_answer: None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ws_port_is_3000() {
        let cfg = HubConfig::default();
        assert_eq!(cfg.ws_bind_addr.port(), 3000);
    }

    #[test]
    fn test_default_binds_all_interfaces() {
        let cfg = HubConfig::default();
        assert!(cfg.ws_bind_addr.ip().is_unspecified());
    }

    #[test]
    fn test_default_ping_interval_is_50s() {
        let cfg = HubConfig::default();
        assert_eq!(cfg.ping_interval, Duration::from_secs(50));
    }

    #[test]
    fn test_default_has_no_answers_or_initial_answer() {
        let cfg = HubConfig::default();
        assert!(cfg.answers_path.is_none());
        assert!(cfg.initial_answer.is_none());
    }
}

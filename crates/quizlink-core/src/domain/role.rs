//! Peer roles and connection identity.
//!
//! A connection starts out anonymous.  The first frame that carries an
//! identifying `"type"` marker tells the hub which of the two logical peers
//! the connection speaks for.

use std::fmt;

use uuid::Uuid;

/// Unique identifier for one live transport connection.
///
/// A fresh id is minted on every accept, so a device that reconnects gets a
/// new id even though it claims the same [`Role`].
pub type ConnectionId = Uuid;

/// One of the two logical peers the hub mediates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The hardware answer box (RFID reader).
    Device,
    /// The quiz website that issues questions and shows verdicts.
    Controller,
}

impl Role {
    /// Every role, in slot order.
    pub const ALL: [Role; 2] = [Role::Device, Role::Controller];

    /// Resolves an identification marker to a role.
    ///
    /// Accepts the current names (`device`, `controller`) and the names used
    /// by older firmware and site builds (`esp32`, `website`).  Matching is
    /// exact; anything else returns `None`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "device" | "esp32" => Some(Role::Device),
            "controller" | "website" => Some(Role::Controller),
            _ => None,
        }
    }

    /// Canonical wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Device => "device",
            Role::Controller => "controller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `"type"` marker found on an inbound frame, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleMarker {
    /// The frame identifies its sender as one of the two peers.
    Known(Role),
    /// The frame carries a `"type"` value that names no role (e.g. a client
    /// echoing `"ping"`).  It never binds a registry slot.
    Unknown(String),
}

impl RoleMarker {
    /// Classifies a raw `"type"` string.
    pub fn parse(raw: &str) -> Self {
        match Role::from_marker(raw) {
            Some(role) => RoleMarker::Known(role),
            None => RoleMarker::Unknown(raw.to_string()),
        }
    }

    /// Returns the role if the marker identifies one.
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleMarker::Known(role) => Some(*role),
            RoleMarker::Unknown(_) => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_marker_accepts_canonical_names() {
        assert_eq!(Role::from_marker("device"), Some(Role::Device));
        assert_eq!(Role::from_marker("controller"), Some(Role::Controller));
    }

    #[test]
    fn test_from_marker_accepts_legacy_names() {
        assert_eq!(Role::from_marker("esp32"), Some(Role::Device));
        assert_eq!(Role::from_marker("website"), Some(Role::Controller));
    }

    #[test]
    fn test_from_marker_is_case_sensitive() {
        // Firmware sends lowercase markers; anything else is not a role.
        assert_eq!(Role::from_marker("Device"), None);
        assert_eq!(Role::from_marker("CONTROLLER"), None);
    }

    #[test]
    fn test_role_marker_unknown_keeps_raw_value() {
        let marker = RoleMarker::parse("ping");
        assert_eq!(marker, RoleMarker::Unknown("ping".to_string()));
        assert_eq!(marker.role(), None);
    }

    #[test]
    fn test_role_display_uses_canonical_name() {
        assert_eq!(Role::Device.to_string(), "device");
        assert_eq!(Role::Controller.to_string(), "controller");
    }
}

//! Text codec for QuizLink frames.
//!
//! Wire format: one UTF-8 JSON object per WebSocket text frame.  The transport
//! guarantees framing and per-connection ordering; this module only maps text
//! to typed messages and back.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::role::RoleMarker;
use crate::protocol::messages::{Command, Envelope, Outbound, WireCommand, KNOWN_COMMANDS};

/// Errors that can occur while decoding or encoding a frame.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The frame is valid JSON but not an object.
    #[error("frame must be a JSON object")]
    NotAnObject,

    /// A known command is missing a required field or a field has the wrong type.
    #[error("malformed '{command}' command: {reason}")]
    MalformedCommand { command: String, reason: String },

    /// An outbound frame could not be serialized.
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one inbound text frame.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the text is not a JSON object or a known
/// command lacks a required field.  Unknown command names are *not* errors;
/// they decode to [`Command::Unrecognized`].
///
/// # Examples
///
/// ```rust
/// use quizlink_core::{decode_frame, Command, Role};
///
/// let env = decode_frame(r#"{"type":"device","command":"check","tag_id":"a1"}"#).unwrap();
/// assert_eq!(env.marker.and_then(|m| m.role()), Some(Role::Device));
/// assert_eq!(env.command, Some(Command::Check { tag_id: "a1".to_string() }));
/// ```
pub fn decode_frame(text: &str) -> Result<Envelope, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

    let map = match value {
        Value::Object(map) => map,
        _ => return Err(ProtocolError::NotAnObject),
    };

    let marker = match map.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => Some(RoleMarker::parse(raw)),
        Some(other) => Some(RoleMarker::Unknown(other.to_string())),
    };

    let command = match map.get("command") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => {
            let name = name.clone();
            Some(decode_command(name, map)?)
        }
        Some(other) => {
            return Err(ProtocolError::MalformedCommand {
                command: other.to_string(),
                reason: "command tag must be a string".to_string(),
            })
        }
    };

    Ok(Envelope { marker, command })
}

/// Encodes an outbound frame to JSON text.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_frame(frame: &Outbound) -> Result<String, ProtocolError> {
    serde_json::to_string(frame).map_err(|e| ProtocolError::Encode(e.to_string()))
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn decode_command(name: String, map: Map<String, Value>) -> Result<Command, ProtocolError> {
    if !KNOWN_COMMANDS.contains(&name.as_str()) {
        return Ok(Command::Unrecognized(name));
    }

    serde_json::from_value::<WireCommand>(Value::Object(map))
        .map(Command::from)
        .map_err(|e| ProtocolError::MalformedCommand {
            command: name,
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

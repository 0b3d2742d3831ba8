//! JSON message types for the device/controller WebSocket protocol.
//!
//! # Inbound frames
//!
//! Every inbound frame is a single JSON object.  Two independent fields give
//! it meaning:
//!
//! - `"type"`: an identification marker (`"device"` or `"controller"`).  It
//!   binds the sending connection to a role.
//! - `"command"`: what the sender wants the hub to do.
//!
//! A frame may carry either, both, or neither.  For example the device usually
//! announces itself with `{"type":"device"}` and later submits answers with
//! `{"command":"check","tag_id":"04A1B2C3"}`.
//!
//! ```json
//! {"command":"log","message":"hello"}
//! {"command":"start","message":{"question":"Q1"},"correctAnswer":"a1"}
//! {"command":"check","tag_id":"a1"}
//! {"command":"select","correctAnswer":"a1","message":{"question":"Q1"}}
//! ```
//!
//! # Outbound frames
//!
//! Frames sent *to* the device are tagged with `"command"`; frames sent to the
//! controller and the keepalive ping are tagged with `"type"`.  The two shapes
//! are kept as separate enums ([`CommandFrame`], [`TypedFrame`]) and unified by
//! [`Outbound`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::judge::Verdict;
use crate::domain::role::RoleMarker;

// ── Inbound ───────────────────────────────────────────────────────────────────

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The `"type"` marker, if the frame carried one.
    pub marker: Option<RoleMarker>,
    /// The command, if the frame carried a `"command"` tag.
    pub command: Option<Command>,
}

/// A command sent by one of the peers.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Free text to relay to every other connection.
    Log { message: String },

    /// Open a new question.  `message` is forwarded verbatim to the device.
    Start {
        message: Value,
        /// When present, replaces the expected answer for the next `check`.
        correct_answer: Option<String>,
    },

    /// The device submits the tag it read.
    Check { tag_id: String },

    /// The controller registers the next correct answer and tells the device
    /// to prepare for input.
    Select {
        correct_answer: String,
        message: Value,
    },

    /// A well-formed frame whose command name the hub does not know.
    Unrecognized(String),
}

impl Command {
    /// Short name for log lines.  Never includes field values, so answers
    /// and tag ids do not leak into `info` level output.
    pub fn name(&self) -> &str {
        match self {
            Command::Log { .. } => "log",
            Command::Start { .. } => "start",
            Command::Check { .. } => "check",
            Command::Select { .. } => "select",
            Command::Unrecognized(name) => name,
        }
    }
}

/// Command names the hub understands, including the legacy aliases.
pub(crate) const KNOWN_COMMANDS: [&str; 8] = [
    "log",
    "print_log",
    "start",
    "start_input",
    "check",
    "check_answer",
    "select",
    "select_question",
];

/// Serde shape of a known command.  Unknown names never reach this type; the
/// codec turns them into [`Command::Unrecognized`] first.
#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub(crate) enum WireCommand {
    #[serde(alias = "print_log")]
    Log { message: String },

    #[serde(alias = "start_input")]
    Start {
        message: Value,
        #[serde(rename = "correctAnswer", default)]
        correct_answer: Option<String>,
    },

    #[serde(alias = "check_answer")]
    Check { tag_id: String },

    #[serde(alias = "select_question")]
    Select {
        #[serde(rename = "correctAnswer")]
        correct_answer: String,
        #[serde(default)]
        message: Value,
    },
}

impl From<WireCommand> for Command {
    fn from(wire: WireCommand) -> Self {
        match wire {
            WireCommand::Log { message } => Command::Log { message },
            WireCommand::Start {
                message,
                correct_answer,
            } => Command::Start {
                message,
                correct_answer,
            },
            WireCommand::Check { tag_id } => Command::Check { tag_id },
            WireCommand::Select {
                correct_answer,
                message,
            } => Command::Select {
                correct_answer,
                message,
            },
        }
    }
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// Frames tagged with `"command"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandFrame {
    /// Asks the device to show a question and wait for a tag.
    StartInput { message: Value },
    /// Minimal verdict for the device.
    AnswerResult { correct: bool },
    /// Relayed free text.
    PrintLog { message: String },
}

/// Frames tagged with `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypedFrame {
    /// Verdict for the controller, including the raw token the device sent.
    ///
    /// `answer` mirrors `data`; existing controller pages read either field.
    AnswerResult {
        correct: bool,
        data: String,
        answer: String,
    },
    /// Keepalive.  Receivers treat it as a liveness hint only.
    Ping,
}

/// Any frame the hub writes to a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outbound {
    Command(CommandFrame),
    Typed(TypedFrame),
}

impl Outbound {
    /// `{"command":"start_input","message":<payload>}`
    pub fn start_input(payload: Value) -> Self {
        Outbound::Command(CommandFrame::StartInput { message: payload })
    }

    /// `{"command":"answer_result","correct":bool}`
    pub fn device_verdict(verdict: Verdict) -> Self {
        Outbound::Command(CommandFrame::AnswerResult {
            correct: verdict.is_correct(),
        })
    }

    /// `{"type":"answer_result","correct":bool,"data":token,"answer":token}`
    pub fn controller_verdict(verdict: Verdict, token: &str) -> Self {
        Outbound::Typed(TypedFrame::AnswerResult {
            correct: verdict.is_correct(),
            data: token.to_string(),
            answer: token.to_string(),
        })
    }

    /// `{"command":"print_log","message":text}`
    pub fn print_log(message: impl Into<String>) -> Self {
        Outbound::Command(CommandFrame::PrintLog {
            message: message.into(),
        })
    }

    /// `{"type":"ping"}`
    pub fn ping() -> Self {
        Outbound::Typed(TypedFrame::Ping)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_input_serializes_with_command_tag() {
        let frame = Outbound::start_input(json!("Q1"));
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value, json!({"command": "start_input", "message": "Q1"}));
    }

    #[test]
    fn test_device_verdict_carries_only_correct_flag() {
        let frame = Outbound::device_verdict(Verdict::Correct);
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value, json!({"command": "answer_result", "correct": true}));
    }

    #[test]
    fn test_controller_verdict_carries_token_twice() {
        let frame = Outbound::controller_verdict(Verdict::Incorrect, "04A1");
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            json!({"type": "answer_result", "correct": false, "data": "04A1", "answer": "04A1"})
        );
    }

    #[test]
    fn test_print_log_serializes_message() {
        let value = serde_json::to_value(Outbound::print_log("hello")).unwrap();
        assert_eq!(value, json!({"command": "print_log", "message": "hello"}));
    }

    #[test]
    fn test_ping_serializes_as_type_only() {
        let value = serde_json::to_value(Outbound::ping()).unwrap();
        assert_eq!(value, json!({"type": "ping"}));
    }

    #[test]
    fn test_outbound_deserializes_device_and_controller_shapes() {
        // Test clients decode what the hub sends, so both shapes must parse.
        let device: Outbound =
            serde_json::from_str(r#"{"command":"answer_result","correct":true}"#).unwrap();
        assert_eq!(device, Outbound::device_verdict(Verdict::Correct));

        let controller: Outbound = serde_json::from_str(
            r#"{"type":"answer_result","correct":true,"data":"x","answer":"x"}"#,
        )
        .unwrap();
        assert_eq!(controller, Outbound::controller_verdict(Verdict::Correct, "x"));
    }

    #[test]
    fn test_command_name_does_not_expose_fields() {
        let cmd = Command::Check {
            tag_id: "secret-tag".to_string(),
        };
        assert_eq!(cmd.name(), "check");
        assert_eq!(Command::Unrecognized("dance".to_string()).name(), "dance");
    }
}

//! QuizLink session hub: entry point.
//!
//! This binary accepts WebSocket connections from exactly two kinds of peer:
//! an answer **device** that reads tags, and a **controller** website that
//! poses questions.  The hub pairs them, forwards the current question to the
//! device, judges the tag the device reports, and tells both sides the result.
//!
//! # Usage
//!
//! ```text
//! quizlink-hub [OPTIONS] [COMMAND]
//!
//! Options:
//!   --ws-port <PORT>          WebSocket listener port [default: 3000]
//!   --ws-bind <ADDR>          Bind address [default: 0.0.0.0]
//!   --ping-interval <SECS>    Keepalive ping interval in seconds [default: 50]
//!   --answers <PATH>          TOML file of expected answers
//!   --initial-answer <TOKEN>  Expected answer before the controller sets one
//!
//! Commands:
//!   check-answer <QUESTION_ID> <ANSWER>   Look up one answer and exit
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                  | Default   | Description                    |
//! |---------------------------|-----------|--------------------------------|
//! | `PORT`                    | `3000`    | WebSocket listener port        |
//! | `QUIZLINK_WS_BIND`        | `0.0.0.0` | Bind address                   |
//! | `QUIZLINK_PING_INTERVAL`  | `50`      | Keepalive ping interval (secs) |
//! | `QUIZLINK_ANSWERS`        | unset     | Answer file path               |
//! | `QUIZLINK_INITIAL_ANSWER` | unset     | Initial expected answer        |
//!
//! Log verbosity follows `RUST_LOG` and defaults to `info`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quizlink_hub::domain::HubConfig;
use quizlink_hub::infrastructure::{check_submitted_answer, run_server, TomlAnswerStore};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// QuizLink session hub.
///
/// Pairs one answer device with one controller website over WebSocket.
#[derive(Debug, Parser)]
#[command(
    name = "quizlink-hub",
    about = "Session hub pairing a quiz answer device with its controller website",
    version
)]
struct Cli {
    /// TCP port for the WebSocket server to listen on.
    #[arg(long, default_value_t = 3000, env = "PORT")]
    ws_port: u16,

    /// IP address to bind the WebSocket server to.
    ///
    /// Use `0.0.0.0` to accept connections from any interface, or
    /// `127.0.0.1` to accept only local connections.
    #[arg(long, default_value = "0.0.0.0", env = "QUIZLINK_WS_BIND")]
    ws_bind: String,

    /// Keepalive ping interval in seconds.
    ///
    /// Every connection receives `{"type":"ping"}` this often.
    #[arg(long, default_value_t = 50, env = "QUIZLINK_PING_INTERVAL")]
    ping_interval: u64,

    /// TOML file of expected answers, used by `check-answer`.
    #[arg(long, env = "QUIZLINK_ANSWERS")]
    answers: Option<PathBuf>,

    /// Expected answer in effect until the controller registers one.
    #[arg(long, env = "QUIZLINK_INITIAL_ANSWER")]
    initial_answer: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check one answer against the answer file, print the verdict as JSON, and exit.
    CheckAnswer {
        /// Question id as it appears under `[questions.<id>]`.
        question_id: String,
        /// The submitted answer.
        answer: String,
    },
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`HubConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--ws-bind` is not a valid IP address.
    fn into_hub_config(self) -> anyhow::Result<HubConfig> {
        let ws_bind_addr: SocketAddr = format!("{}:{}", self.ws_bind, self.ws_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid WebSocket bind address: '{}:{}'",
                    self.ws_bind, self.ws_port
                )
            })?;

        Ok(HubConfig {
            ws_bind_addr,
            ping_interval: Duration::from_secs(self.ping_interval),
            answers_path: self.answers,
            initial_answer: self.initial_answer,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut cli = Cli::parse();
    let command = cli.command.take();
    let config = cli.into_hub_config()?;

    if let Some(Command::CheckAnswer {
        question_id,
        answer,
    }) = command
    {
        return check_answer(&config, &question_id, &answer).await;
    }

    info!(
        "QuizLink hub starting: ws={}, ping every {:?}",
        config.ws_bind_addr, config.ping_interval
    );

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("QuizLink hub stopped");
    Ok(())
}

/// Runs the out-of-band lookup and prints `{"correct":..,"message":..}`.
async fn check_answer(config: &HubConfig, question_id: &str, answer: &str) -> anyhow::Result<()> {
    let path = config
        .answers_path
        .as_deref()
        .ok_or_else(|| anyhow!("check-answer needs --answers <PATH> or QUIZLINK_ANSWERS"))?;

    let store = TomlAnswerStore::load(path)?;
    let verdict = check_submitted_answer(&store, question_id, answer).await?;

    println!("{}", serde_json::to_string(&verdict)?);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

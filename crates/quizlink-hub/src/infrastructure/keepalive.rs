//! Per-connection keepalive timer.
//!
//! Every connection gets a `{"type":"ping"}` frame once per `ping_interval`.
//! The ping carries no session meaning; it only keeps idle device sockets
//! from being dropped by NAT boxes and firmware watchdogs.
//!
//! The timer task is owned by a [`KeepaliveHandle`].  The handle lives inside
//! the connection's link, which the registry drops when the connection
//! closes, and dropping the handle aborts the task.

use std::time::Duration;

use quizlink_core::{encode_frame, Outbound};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error};

/// Owns a running keepalive task; aborts it on drop.
#[derive(Debug)]
pub struct KeepaliveHandle {
    task: JoinHandle<()>,
}

impl KeepaliveHandle {
    /// `true` once the task has exited (aborted or outbound queue closed).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for KeepaliveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts a keepalive task that queues a ping on `outbound` every `period`.
///
/// The first ping is sent one full period after the call.  The task exits on
/// its own once the outbound queue is closed.
pub fn spawn_keepalive(
    outbound: mpsc::UnboundedSender<String>,
    period: Duration,
    label: String,
) -> KeepaliveHandle {
    // `interval` panics on a zero period.
    let period = period.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        let ping = match encode_frame(&Outbound::ping()) {
            Ok(text) => text,
            Err(e) => {
                error!("{label}: failed to encode keepalive ping: {e}");
                return;
            }
        };

        let mut ticker = interval(period);
        ticker.tick().await; // The first tick resolves immediately.

        loop {
            ticker.tick().await;
            if outbound.send(ping.clone()).is_err() {
                debug!("{label}: outbound queue closed; keepalive stopped");
                break;
            }
            debug!("{label}: queued keepalive ping");
        }
    });

    KeepaliveHandle { task }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_keepalive_queues_ping_frames() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = spawn_keepalive(tx, Duration::from_millis(20), "test".to_string());

        let frame = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("ping must arrive")
            .expect("queue must be open");

        assert_eq!(frame, r#"{"type":"ping"}"#);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_pings() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_keepalive(tx, Duration::from_millis(20), "test".to_string());

        drop(handle);

        // The aborted task drops its sender, so the queue closes.
        let next = timeout(Duration::from_secs(2), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(next.is_ok(), "queue must close after the handle is dropped");
    }

    #[tokio::test]
    async fn test_keepalive_exits_when_queue_closes() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_keepalive(tx, Duration::from_millis(10), "test".to_string());

        drop(rx);

        let finished = timeout(Duration::from_secs(2), async {
            while !handle.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(finished.is_ok(), "task must exit after the receiver is dropped");
    }
}

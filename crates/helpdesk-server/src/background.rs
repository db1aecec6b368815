//! Background tasks for the help-desk server.
//!
//! Includes:
//! - Dropping conversation sessions the orchestrator abandoned.

use crate::SessionMap;
use tokio::time::{sleep, Duration};

/// Removes every session idle for at least `idle_timeout`.
///
/// A session whose lock is held has a tool call in flight and is kept.
/// Returns the number of sessions removed.
pub fn prune_idle_sessions(sessions: &SessionMap, idle_timeout: Duration) -> usize {
    let mut sessions = match sessions.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!("sessions lock poisoned, pruning with recovered state");
            poisoned.into_inner()
        }
    };

    let before = sessions.len();
    sessions.retain(|_, session| match session.try_lock() {
        Ok(session) => session.idle_for() < idle_timeout,
        Err(_) => true,
    });
    before - sessions.len()
}

/// Starts the idle session pruning task.
///
/// Runs indefinitely, checking every `idle_timeout / 2` (between 1 and 60
/// seconds). A zero timeout disables the task.
pub async fn start_session_pruning(sessions: SessionMap, idle_timeout_seconds: u64) {
    if idle_timeout_seconds == 0 {
        tracing::warn!("session pruning disabled (idle_timeout_seconds=0)");
        return;
    }

    let idle_timeout = Duration::from_secs(idle_timeout_seconds);
    let interval_seconds = (idle_timeout_seconds / 2).clamp(1, 60);
    let interval = Duration::from_secs(interval_seconds);

    tracing::info!(
        idle_timeout_seconds,
        interval_seconds,
        "starting session pruning task"
    );

    loop {
        sleep(interval).await;

        let pruned = prune_idle_sessions(&sessions, idle_timeout);
        if pruned > 0 {
            tracing::info!(count = pruned, "dropped idle conversation sessions");
        }
    }
}

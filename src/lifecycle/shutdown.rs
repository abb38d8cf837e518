//! Shutdown coordination for the server.

use std::time::Duration;

use tokio::sync::watch;

/// Time allowed for in-flight requests to finish once shutdown starts.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Why the server is stopping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / SIGTERM, with the signal name.
    Signal(&'static str),
    /// Asked for in code, e.g. by an embedding application or a test.
    Requested,
    /// The serve loop failed.
    Fatal(String),
}

impl ShutdownReason {
    pub fn exit_code(&self) -> u8 {
        match self {
            ShutdownReason::Signal(_) | ShutdownReason::Requested => 0,
            ShutdownReason::Fatal(_) => 1,
        }
    }
}

/// How a shutdown ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownOutcome {
    pub reason: ShutdownReason,
    /// `false` when the drain deadline passed and connections were dropped.
    pub drained: bool,
}

impl ShutdownOutcome {
    /// Process exit code: a forced drain always fails.
    pub fn exit_code(&self) -> u8 {
        if self.drained {
            self.reason.exit_code()
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    Draining(ShutdownReason),
    Terminated(ShutdownOutcome),
}

/// Coordinator for graceful shutdown.
///
/// Holds the state in a watch channel so any number of tasks can wait for
/// the trigger. Only the first trigger counts.
#[derive(Debug)]
pub struct ShutdownController {
    tx: watch::Sender<ShutdownState>,
    drain_timeout: Duration,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ShutdownState::Running);
        Self {
            tx,
            drain_timeout: DRAIN_TIMEOUT,
        }
    }

    /// Override the drain deadline.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }

    /// Start shutting down. Returns `false` if shutdown had already started.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        self.tx.send_if_modified(move |state| {
            if !matches!(state, ShutdownState::Running) {
                return false;
            }
            tracing::info!(reason = ?reason, "Shutdown triggered");
            *state = ShutdownState::Draining(reason);
            true
        })
    }

    /// Record the end of the drain. The reason is the one that triggered it.
    pub fn terminate(&self, drained: bool) -> ShutdownOutcome {
        let mut outcome = None;
        self.tx.send_modify(|state| {
            let reason = match state {
                ShutdownState::Running => ShutdownReason::Requested,
                ShutdownState::Draining(reason) => reason.clone(),
                ShutdownState::Terminated(done) => {
                    outcome = Some(done.clone());
                    return;
                }
            };
            let done = ShutdownOutcome { reason, drained };
            outcome = Some(done.clone());
            *state = ShutdownState::Terminated(done);
        });
        outcome.unwrap_or(ShutdownOutcome {
            reason: ShutdownReason::Requested,
            drained,
        })
    }

    /// Resolve once shutdown has been triggered, returning the reason.
    pub async fn triggered(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        let state = rx
            .wait_for(|state| !matches!(state, ShutdownState::Running))
            .await
            .map(|state| state.clone());
        match state {
            Ok(ShutdownState::Draining(reason)) => reason,
            Ok(ShutdownState::Terminated(outcome)) => outcome.reason,
            // The sender lives in `self`, so the channel cannot close here.
            Ok(ShutdownState::Running) | Err(_) => ShutdownReason::Requested,
        }
    }

    pub fn is_triggered(&self) -> bool {
        !matches!(*self.tx.borrow(), ShutdownState::Running)
    }

    pub fn state(&self) -> ShutdownState {
        self.tx.borrow().clone()
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

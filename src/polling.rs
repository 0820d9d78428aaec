//! Generic polling state machine for long-running operations.
//!
//! Contents jobs, deep research tasks, and batches all follow the same
//! shape: repeatedly fetch a status snapshot until it reaches a terminal
//! state or a wall-clock deadline expires. The snapshot type decides what
//! each state means via [`PollSnapshot`]; the loop here owns timing only.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::errors::{Result, ValyuError};

/// How a status snapshot should drive the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Not terminal yet; sleep and poll again.
    Continue,
    /// Terminal; return the snapshot to the caller.
    Done,
    /// The status itself could not be read (unsuccessful poll). Surfaced
    /// immediately, before any progress callback, since waiting cannot fix
    /// an auth or transport problem.
    Unavailable(String),
    /// The remote reported a terminal failure or cancellation.
    Failed(String),
}

/// A pollable status snapshot.
pub trait PollSnapshot {
    fn disposition(&self) -> Disposition;
}

/// Timing configuration for one wait call.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    /// Sleep between status calls.
    pub interval: Duration,
    /// Wall-clock deadline measured from the first status call.
    pub max_wait: Duration,
}

impl PollOptions {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    /// Defaults for async contents jobs: 5s interval, 1 hour deadline.
    pub fn contents() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(3600))
    }

    /// Defaults for deep research tasks: 5s interval, 2 hour deadline.
    pub fn deepresearch() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(7200))
    }

    /// Defaults for batches: 10s interval, 4 hour deadline.
    pub fn batch() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(14400))
    }
}

/// Poll `fetch` until the snapshot reports a terminal disposition.
///
/// The progress callback is invoked on every successful poll, including the
/// terminal one. Polls whose snapshot is [`Disposition::Unavailable`] do not
/// reach the callback; they raise [`ValyuError::JobFailed`] at once. A
/// [`Disposition::Failed`] snapshot raises [`ValyuError::JobFailed`] with the
/// remote error text. The deadline is checked after each non-terminal
/// snapshot, before sleeping, so no status call is made once it has passed.
///
/// If a snapshot carries both a completed state and an error message, the
/// completed state wins: the snapshot is returned and the error stays on it
/// for the caller to inspect.
pub async fn wait_until_terminal<S, F, Fut>(
    mut fetch: F,
    options: PollOptions,
    mut on_progress: Option<&mut dyn FnMut(&S)>,
) -> Result<S>
where
    S: PollSnapshot,
    F: FnMut() -> Fut,
    Fut: Future<Output = S>,
{
    let start = Instant::now();
    let mut polls = 0u32;

    loop {
        let snapshot = fetch().await;
        polls += 1;

        let disposition = snapshot.disposition();
        debug!(polls, ?disposition, "poll");

        if let Disposition::Unavailable(message) = disposition {
            return Err(ValyuError::JobFailed(message));
        }

        if let Some(callback) = on_progress.as_deref_mut() {
            callback(&snapshot);
        }

        match disposition {
            Disposition::Done => return Ok(snapshot),
            Disposition::Failed(message) => return Err(ValyuError::JobFailed(message)),
            _ => {}
        }

        if start.elapsed() > options.max_wait {
            return Err(ValyuError::Timeout(format!(
                "did not reach a terminal state within {} seconds",
                options.max_wait.as_secs()
            )));
        }

        tokio::time::sleep(options.interval).await;
    }
}

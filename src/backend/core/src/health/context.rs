//! Cancellable execution context handed to every probe.
//!
//! A [`ProbeContext`] pairs a [`CancellationToken`] with an optional deadline.
//! Contexts form a tree: [`ProbeContext::child`] derives a context that is
//! cancelled whenever its parent is, and [`ProbeContext::with_timeout`] only
//! ever tightens the deadline.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_core::health::ProbeContext;
//! use std::time::Duration;
//!
//! let ctx = ProbeContext::new().with_timeout(Duration::from_millis(250));
//! tokio::select! {
//!     res = ping(&pool) => res,
//!     err = ctx.done() => Err(err.into()),
//! }
//! ```

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;

/// Cancellation signal plus optional deadline.
#[derive(Debug, Clone)]
pub struct ProbeContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    created_at: Instant,
}

impl ProbeContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// A context driven by an existing cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
            created_at: Instant::now(),
        }
    }

    /// Derive a child context. Cancelling the parent cancels the child; the
    /// child keeps the parent's deadline.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            created_at: Instant::now(),
        }
    }

    /// Bound the context by `deadline`. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Bound the context to `timeout` from now. An earlier existing deadline wins.
    ///
    /// A timeout too large to represent adds no deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel this context and all contexts derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ProbeError> {
        if self.is_cancelled() {
            Some(ProbeError::Cancelled)
        } else if self.is_expired() {
            Some(self.deadline_error())
        } else {
            None
        }
    }

    /// Resolve once the context is cancelled or its deadline passes.
    ///
    /// Cancellation takes precedence when both are ready.
    pub async fn done(&self) -> ProbeError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => ProbeError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => self.deadline_error(),
                }
            }
            None => {
                self.token.cancelled().await;
                ProbeError::Cancelled
            }
        }
    }

    fn deadline_error(&self) -> ProbeError {
        ProbeError::DeadlineExceeded {
            elapsed: self.created_at.elapsed(),
        }
    }
}

impl Default for ProbeContext {
    fn default() -> Self {
        Self::new()
    }
}

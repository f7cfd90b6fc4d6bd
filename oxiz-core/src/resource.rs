//! Resource limits and cooperative cancellation.
//!
//! A [`ResourceManager`] combines a wall-clock limit with a shared
//! [`CancellationToken`]. Long-running code polls it at checkpoints and bails
//! out with [`OxizError::Timeout`] or [`OxizError::Cancelled`].

use crate::error::{OxizError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared, clonable cancellation flag.
///
/// Clones observe the same flag, so another thread can cancel a session
/// while it is running.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Limits enforced by a [`ResourceManager`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Wall-clock budget measured from [`ResourceManager::start`].
    pub time_limit: Option<Duration>,
}

impl ResourceLimits {
    /// No limits at all.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Limit wall-clock time.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Outcome of a limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStatus {
    /// All limits OK.
    Ok,
    /// Time limit exceeded.
    TimeExceeded,
    /// Cancellation was requested.
    Cancelled,
}

/// Tracks the time budget and cancellation flag of one session.
#[derive(Debug, Clone)]
pub struct ResourceManager {
    limits: ResourceLimits,
    token: CancellationToken,
    started: Option<Instant>,
    checks: u64,
}

impl ResourceManager {
    /// Create a manager with a fresh cancellation token.
    pub fn new(limits: ResourceLimits) -> Self {
        Self::with_token(limits, CancellationToken::new())
    }

    /// Create a manager observing an existing token.
    pub fn with_token(limits: ResourceLimits, token: CancellationToken) -> Self {
        Self {
            limits,
            token,
            started: None,
            checks: 0,
        }
    }

    /// Start the clock. Calling it again restarts it.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Time elapsed since [`start`](Self::start), zero if never started.
    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// The configured limits.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// The cancellation token observed by this manager.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Number of checks performed so far.
    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Check all limits. Cancellation takes precedence over the time limit.
    pub fn check_limits(&mut self) -> LimitStatus {
        self.checks += 1;
        if self.token.is_cancelled() {
            return LimitStatus::Cancelled;
        }
        if let Some(limit) = self.limits.time_limit
            && self.elapsed() >= limit
        {
            return LimitStatus::TimeExceeded;
        }
        LimitStatus::Ok
    }

    /// Check all limits and turn a violation into an error.
    pub fn checkpoint(&mut self) -> Result<()> {
        match self.check_limits() {
            LimitStatus::Ok => Ok(()),
            LimitStatus::TimeExceeded => Err(OxizError::Timeout),
            LimitStatus::Cancelled => Err(OxizError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_is_ok() {
        let mut rm = ResourceManager::new(ResourceLimits::unlimited());
        rm.start();
        assert_eq!(rm.check_limits(), LimitStatus::Ok);
        assert!(rm.checkpoint().is_ok());
        assert_eq!(rm.checks(), 2);
    }

    #[test]
    fn test_zero_time_limit_expires_immediately() {
        let mut rm = ResourceManager::new(ResourceLimits::unlimited().with_time_limit(Duration::ZERO));
        rm.start();
        assert_eq!(rm.check_limits(), LimitStatus::TimeExceeded);
        assert!(matches!(rm.checkpoint(), Err(OxizError::Timeout)));
    }

    #[test]
    fn test_cancellation_shared_between_clones() {
        let token = CancellationToken::new();
        let mut rm = ResourceManager::with_token(ResourceLimits::unlimited(), token.clone());
        rm.start();
        assert_eq!(rm.check_limits(), LimitStatus::Ok);

        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap();

        assert!(rm.token().is_cancelled());
        assert!(matches!(rm.checkpoint(), Err(OxizError::Cancelled)));
    }

    #[test]
    fn test_cancel_wins_over_timeout() {
        let mut rm = ResourceManager::new(ResourceLimits::unlimited().with_time_limit(Duration::ZERO));
        rm.start();
        rm.token().cancel();
        assert_eq!(rm.check_limits(), LimitStatus::Cancelled);
    }
}

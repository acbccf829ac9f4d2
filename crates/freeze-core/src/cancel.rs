//! Cooperative cancellation

use std::fmt;
use std::future::pending;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// Why an operation was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    DeadlineExceeded,
    Stopped,
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::DeadlineExceeded => write!(f, "deadline exceeded"),
            CancelCause::Stopped => write!(f, "stop requested"),
        }
    }
}

/// Sends the stop signal to every clone of its [`Cancellation`]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// External cancellation for one operation: an optional deadline plus an
/// optional stop signal. The operation never cancels itself.
///
/// Dropping the [`CancelHandle`] does not cancel.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    stop: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Cancellation driven by the returned handle
    pub fn new() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (
            CancelHandle { tx },
            Self {
                stop: Some(rx),
                deadline: None,
            },
        )
    }

    /// Never cancels
    pub fn never() -> Self {
        Self::default()
    }

    /// Add a deadline; the earlier one wins when one is already set
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Resolves once cancelled; pends forever otherwise
    pub async fn cancelled(&self) -> CancelCause {
        let stop = async {
            match self.stop.clone() {
                Some(mut rx) => {
                    // Sender gone without stopping: nothing can stop us anymore
                    if rx.wait_for(|stopped| *stopped).await.is_err() {
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };

        let deadline = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = stop => CancelCause::Stopped,
            _ = deadline => CancelCause::DeadlineExceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires() {
        let start = Instant::now();
        let cancel = Cancellation::never().with_timeout(Duration::from_secs(50));

        let early = tokio::time::timeout(Duration::from_secs(49), cancel.cancelled()).await;
        assert!(early.is_err());
        assert_eq!(cancel.cancelled().await, CancelCause::DeadlineExceeded);
        assert!(start.elapsed() >= Duration::from_secs(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_deadline_wins() {
        let start = Instant::now();
        let cancel = Cancellation::never()
            .with_timeout(Duration::from_secs(30))
            .with_timeout(Duration::from_secs(90));

        cancel.cancelled().await;
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert!(start.elapsed() < Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_stop_signal() {
        let (handle, cancel) = Cancellation::new();
        let waiter = cancel.clone();

        let task = tokio::spawn(async move { waiter.cancelled().await });
        handle.cancel();

        assert_eq!(task.await.unwrap(), CancelCause::Stopped);
        // Stays stopped for later waiters
        assert_eq!(cancel.cancelled().await, CancelCause::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_does_not_cancel() {
        let (handle, cancel) = Cancellation::new();
        drop(handle);

        let result = tokio::time::timeout(Duration::from_secs(3600), cancel.cancelled()).await;
        assert!(result.is_err());
    }
}

//! Trailing-edge debounce.
//!
//! Each [`Debouncer::schedule`] call replaces the pending delivery: the
//! previous timer is cancelled and only the newest message is sent once the
//! quiet period has passed without another call.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<CancellationToken>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<T>) -> Self {
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    /// Deliver `message` after the quiet period, cancelling any pending delivery.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, message: T) {
        self.cancel();

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        // Deadline is fixed here, not when the task is first polled.
        let deadline = Instant::now() + self.delay;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    token.cancel();
                    let _ = tx.send(message);
                }
            }
        });
    }

    /// Drop the pending delivery, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    /// True while a delivery is scheduled and has neither fired nor been cancelled
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_quiet_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(300), tx);
        let start = Instant::now();

        debouncer.schedule("mo");
        assert!(debouncer.is_pending());

        assert_eq!(rx.recv().await, Some("mo"));
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_trailing_message_is_delivered() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(300), tx);
        let start = Instant::now();

        debouncer.schedule(1);
        tokio::time::advance(Duration::from_millis(200)).await;
        debouncer.schedule(2);
        tokio::time::advance(Duration::from_millis(200)).await;
        debouncer.schedule(3);

        assert_eq!(rx.recv().await, Some(3));
        assert!(start.elapsed() >= Duration::from_millis(700));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(300), tx);

        debouncer.schedule("mos");
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}

//! Quiet-period debouncing of keystroke-driven commits.
//!
//! Only the last value pushed before the quiet period elapses is committed; every push restarts
//! the timer. There is no queue of earlier values.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};


#[derive(Debug)]
pub struct Debouncer<T> {
    quiet_period: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet_period: Duration) -> Self {
        Self { quiet_period, pending: None }
    }

    pub fn from_millis(quiet_period_ms: u64) -> Self {
        Self::new(Duration::from_millis(quiet_period_ms))
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Replaces any pending value and restarts the quiet period at `now`.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet_period));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Yields the pending value once its quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if deadline <= now => self.cancel(),
            _ => None,
        }
    }

    /// Sleeps until the pending value is due; `None` right away when nothing is pending.
    pub async fn next_due(&mut self) -> Option<T> {
        let deadline = self.deadline()?;
        sleep_until(deadline).await;
        self.take_due(Instant::now())
    }
}

/// Feeds `inputs` through a [`Debouncer`] and calls `commit` with every value that survives its
/// quiet period. Returns when the sender side is dropped; a value still pending then is discarded.
pub async fn run_debounced<T>(mut inputs: mpsc::UnboundedReceiver<T>, quiet_period: Duration, mut commit: impl FnMut(T)) {
    let mut debouncer = Debouncer::new(quiet_period);
    loop {
        let deadline = debouncer.deadline();
        let quiet = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            input = inputs.recv() => match input {
                Some(value) => debouncer.push(value, Instant::now()),
                None => {
                    if debouncer.cancel().is_some() {
                        tracing::debug!("Input closed with an uncommitted value");
                    }
                    return;
                }
            },
            _ = quiet => {
                if let Some(value) = debouncer.take_due(Instant::now()) {
                    commit(value);
                }
            }
        }
    }
}

/// Browser flavour: the pending commit lives in a `setTimeout` that is cancelled on every push.
#[cfg(feature = "web")]
pub struct TimeoutDebouncer {
    quiet_period_ms: u32,
    timeout: Option<gloo_timers::callback::Timeout>,
}

#[cfg(feature = "web")]
impl TimeoutDebouncer {
    pub fn new(quiet_period_ms: u32) -> Self {
        Self { quiet_period_ms, timeout: None }
    }

    pub fn push(&mut self, commit: impl FnOnce() + 'static) {
        // dropping the previous timeout clears it
        self.timeout = Some(gloo_timers::callback::Timeout::new(self.quiet_period_ms, commit));
    }

    pub fn cancel(&mut self) {
        if let Some(timeout) = self.timeout.take() {
            timeout.cancel();
        }
    }
}

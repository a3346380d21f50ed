//! Hardware completion signals
//!
//! Each completion is a single-producer / single-consumer flag: an interrupt
//! handler calls [`Completion::complete`] and one FSM step waits for it with a
//! bound. The waiter must [`Completion::reinit`] before issuing the register
//! write that will eventually trigger the interrupt, otherwise a stale
//! completion from an earlier cycle would satisfy the wait immediately.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};

/// One-shot completion with a timed wait.
pub struct Completion<M: RawMutex> {
    signal: Signal<M, ()>,
}

impl<M: RawMutex> Completion<M> {
    /// Create an un-signalled completion.
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Forget any earlier completion.
    pub fn reinit(&self) {
        self.signal.reset();
    }

    /// Mark the event as having happened.
    pub fn complete(&self) {
        self.signal.signal(());
    }

    /// `true` if completed and not yet consumed.
    pub fn is_completed(&self) -> bool {
        self.signal.signaled()
    }

    /// Wait up to `timeout`. Returns `false` on expiry.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        with_timeout(timeout, self.signal.wait()).await.is_ok()
    }
}

impl<M: RawMutex> Default for Completion<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Completions delivered by the codec interrupt controller.
///
/// Usually a `static`, so interrupt glue can signal it without borrowing the
/// engine:
///
/// ```
/// use codec::Completions;
/// use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
///
/// static JACK_IRQS: Completions<CriticalSectionRawMutex> = Completions::new();
/// ```
pub struct Completions<M: RawMutex> {
    /// Auto-detect circuit finished (`HSDET_DONE`)
    pub type_detect: Completion<M>,
    /// Load detector finished (`HP_LOADDET_DONE`)
    pub load_detect: Completion<M>,
    /// Headphone amplifier powered up (`HP_STARTUP_DONE`)
    pub hp_startup: Completion<M>,
    /// Headphone amplifier powered down (`HP_SHUTDOWN_DONE`)
    pub hp_shutdown: Completion<M>,
}

impl<M: RawMutex> Completions<M> {
    /// Create a set of un-signalled completions.
    pub const fn new() -> Self {
        Self {
            type_detect: Completion::new(),
            load_detect: Completion::new(),
            hp_startup: Completion::new(),
            hp_shutdown: Completion::new(),
        }
    }
}

impl<M: RawMutex> Default for Completions<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    #[tokio::test]
    async fn wait_returns_true_once_completed() {
        let c: Completion<CriticalSectionRawMutex> = Completion::new();
        c.complete();
        assert!(c.is_completed());
        assert!(c.wait_timeout(Duration::from_millis(10)).await);
        assert!(!c.is_completed());
    }

    #[tokio::test]
    async fn reinit_discards_stale_completion() {
        let c: Completion<CriticalSectionRawMutex> = Completion::new();
        c.complete();
        c.reinit();
        assert!(!c.wait_timeout(Duration::from_millis(5)).await);
    }

    #[tokio::test]
    async fn wait_times_out_without_completion() {
        let c: Completion<CriticalSectionRawMutex> = Completion::new();
        assert!(!c.wait_timeout(Duration::from_millis(5)).await);
    }
}

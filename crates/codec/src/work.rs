//! Cancellable delayed work
//!
//! A [`DelayedWork`] is a single deferred job. Whether it is queued and
//! whether its body is executing are tracked separately, so a job re-armed
//! from inside its own body is both pending and running at once:
//!
//! ```text
//! schedule(d) ──► pending ──after d──► running ──done──► idle
//!                    │                    │
//!        cancel() clears pending    cancel() waits until running ends
//! ```
//!
//! The job body is supplied to [`DelayedWork::run`], which must be polled by
//! some task for the lifetime of the owner. `schedule` is synchronous and can
//! be called with other locks held; `cancel` is async and returns only once
//! the job is neither pending nor running.

use core::cell::Cell;
use core::future::Future;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flags {
    pending: bool,
    running: bool,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Schedule(Duration),
    Cancel,
}

/// A deferred job that can be scheduled, re-armed and cancelled.
pub struct DelayedWork<M: RawMutex> {
    flags: BlockingMutex<M, Cell<Flags>>,
    command: Signal<M, Command>,
    finished: Signal<M, ()>,
}

impl<M: RawMutex> DelayedWork<M> {
    /// Create an idle work item.
    pub const fn new() -> Self {
        Self {
            flags: BlockingMutex::new(Cell::new(Flags {
                pending: false,
                running: false,
            })),
            command: Signal::new(),
            finished: Signal::new(),
        }
    }

    fn update<T>(&self, f: impl FnOnce(&mut Flags) -> T) -> T {
        self.flags.lock(|cell| {
            let mut flags = cell.get();
            let out = f(&mut flags);
            cell.set(flags);
            out
        })
    }

    fn flags(&self) -> Flags {
        self.flags.lock(Cell::get)
    }

    /// `true` while scheduled and not yet started.
    pub fn is_pending(&self) -> bool {
        self.flags().pending
    }

    /// `true` while the job body is executing.
    pub fn is_running(&self) -> bool {
        self.flags().running
    }

    /// Queue the job to run after `delay`.
    ///
    /// Returns `false` (and leaves the existing deadline alone) if the job is
    /// already pending. A job scheduled while running runs again afterwards.
    pub fn schedule(&self, delay: Duration) -> bool {
        let queued = self.update(|f| !core::mem::replace(&mut f.pending, true));
        if queued {
            self.command.signal(Command::Schedule(delay));
        }
        queued
    }

    /// Cancel a pending job and wait for a running one to finish.
    ///
    /// Returns `true` if a pending job was dropped.
    pub async fn cancel(&self) -> bool {
        let dropped = self.update(|f| core::mem::replace(&mut f.pending, false));
        if dropped {
            self.command.signal(Command::Cancel);
        }
        while self.is_running() {
            self.finished.wait().await;
        }
        dropped
    }

    /// Drive the job. Never returns.
    pub async fn run<F, Fut>(&self, mut job: F) -> !
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut next = self.command.wait().await;
        loop {
            let delay = match next {
                Command::Schedule(delay) => delay,
                Command::Cancel => {
                    next = self.command.wait().await;
                    continue;
                }
            };

            match select(Timer::after(delay), self.command.wait()).await {
                Either::First(()) => {}
                Either::Second(cmd) => {
                    next = cmd;
                    continue;
                }
            }

            let started = self.update(|f| {
                let start = f.pending;
                if start {
                    f.pending = false;
                    f.running = true;
                }
                start
            });

            if started {
                job().await;
                // A re-arm during the body left its command queued.
                self.update(|f| f.running = false);
                self.finished.signal(());
            }

            next = self.command.wait().await;
        }
    }
}

impl<M: RawMutex> Default for DelayedWork<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    type Work = DelayedWork<CriticalSectionRawMutex>;

    async fn with_runner<'a>(work: &'a Work, count: &'a AtomicUsize, body: impl Future<Output = ()>) {
        let runner = work.run(|| async {
            count.fetch_add(1, Ordering::SeqCst);
        });
        select(runner, body).await;
    }

    #[tokio::test]
    async fn scheduled_job_runs_once_after_delay() {
        let work = Work::new();
        let count = AtomicUsize::new(0);
        with_runner(&work, &count, async {
            assert!(work.schedule(Duration::from_millis(5)));
            assert!(work.is_pending());
            Timer::after(Duration::from_millis(30)).await;
        })
        .await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!work.is_pending());
    }

    #[tokio::test]
    async fn schedule_while_pending_is_ignored() {
        let work = Work::new();
        let count = AtomicUsize::new(0);
        with_runner(&work, &count, async {
            assert!(work.schedule(Duration::from_millis(5)));
            assert!(!work.schedule(Duration::from_millis(5)));
            Timer::after(Duration::from_millis(30)).await;
        })
        .await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_drops_pending_job() {
        let work = Work::new();
        let count = AtomicUsize::new(0);
        with_runner(&work, &count, async {
            work.schedule(Duration::from_millis(10));
            assert!(work.cancel().await);
            Timer::after(Duration::from_millis(30)).await;
        })
        .await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancel_then_reschedule_runs_new_job() {
        let work = Work::new();
        let count = AtomicUsize::new(0);
        with_runner(&work, &count, async {
            work.schedule(Duration::from_millis(50));
            work.cancel().await;
            work.schedule(Duration::from_millis(1));
            Timer::after(Duration::from_millis(20)).await;
        })
        .await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_on_idle_is_noop() {
        let work = Work::new();
        assert!(!work.cancel().await);
    }

    #[tokio::test]
    async fn cancel_waits_for_rearmed_running_job() {
        let work = Work::new();
        let count = AtomicUsize::new(0);
        let executing = AtomicBool::new(false);
        let runner = work.run(|| async {
            count.fetch_add(1, Ordering::SeqCst);
            executing.store(true, Ordering::SeqCst);
            Timer::after(Duration::from_millis(100)).await;
            executing.store(false, Ordering::SeqCst);
        });
        let body = async {
            work.schedule(Duration::from_millis(1));
            while !work.is_running() {
                Timer::after(Duration::from_millis(1)).await;
            }
            // Re-armed while running: pending and running at once.
            assert!(work.schedule(Duration::from_millis(1)));
            assert!(work.is_pending() && work.is_running());

            assert!(work.cancel().await);
            assert!(!executing.load(Ordering::SeqCst));
            assert!(!work.is_running());

            Timer::after(Duration::from_millis(30)).await;
        };
        select(runner, body).await;
        // The re-armed run was dropped.
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_while_running_waits_and_reports_nothing_dropped() {
        let work = Work::new();
        let executing = AtomicBool::new(false);
        let runner = work.run(|| async {
            executing.store(true, Ordering::SeqCst);
            Timer::after(Duration::from_millis(50)).await;
            executing.store(false, Ordering::SeqCst);
        });
        let body = async {
            work.schedule(Duration::from_millis(1));
            while !work.is_running() {
                Timer::after(Duration::from_millis(1)).await;
            }
            assert!(!work.cancel().await);
            assert!(!executing.load(Ordering::SeqCst));
        };
        select(runner, body).await;
    }
}

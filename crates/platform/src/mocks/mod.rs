//! Mock implementations for testing
//!
//! This module provides recording mocks of all platform traits for use in
//! unit and integration tests. Every mock is a cheap cloneable handle over
//! shared state, so a test can keep one clone for inspection while the
//! engine owns the other.

#![cfg(any(test, feature = "std"))]

use crate::*;
use std::boxed::Box;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

// ── Register file ────────────────────────────────────────────────────────────

/// One recorded `update_bits` / `write` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Register address
    pub reg: u32,
    /// Field mask
    pub mask: u32,
    /// Requested field value (already masked)
    pub value: u32,
}

impl RegisterWrite {
    /// `true` if this write targeted `reg` and touched any bit of `mask`.
    pub fn touches(&self, reg: u32, mask: u32) -> bool {
        self.reg == reg && self.mask & mask != 0
    }
}

/// Callback run after every register write, with the register values.
///
/// Hooks run while the register file is locked: they may edit `values` and
/// fire signals but must not call back into the [`MockRegisters`] handle.
pub type WriteHook = Box<dyn FnMut(&RegisterWrite, &mut BTreeMap<u32, u32>) + Send>;

#[derive(Default)]
struct RegisterFile {
    values: BTreeMap<u32, u32>,
    writes: Vec<RegisterWrite>,
    hooks: Vec<WriteHook>,
    not_ready: bool,
    fail_once: Vec<RegisterWrite>,
}

/// In-memory 32-bit register file implementing [`RegisterPort`].
///
/// Unset registers read as zero. Every write is appended to a log, including
/// writes that leave the register unchanged.
#[derive(Clone, Default)]
pub struct MockRegisters {
    file: Arc<Mutex<RegisterFile>>,
}

impl MockRegisters {
    /// Create an empty register file.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegisterFile> {
        // A panicking test must not cascade into every other handle.
        match self.file.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Set a register value without logging a write.
    pub fn set(&self, reg: u32, value: u32) {
        self.lock().values.insert(reg, value);
    }

    /// Set the bits of `mask` in `reg` to `value` without logging a write.
    pub fn set_bits(&self, reg: u32, mask: u32, value: u32) {
        let mut file = self.lock();
        let entry = file.values.entry(reg).or_insert(0);
        *entry = (*entry & !mask) | (value & mask);
    }

    /// Current register value.
    pub fn get(&self, reg: u32) -> u32 {
        self.lock().values.get(&reg).copied().unwrap_or(0)
    }

    /// Snapshot of the write log.
    pub fn writes(&self) -> Vec<RegisterWrite> {
        self.lock().writes.clone()
    }

    /// Number of writes logged so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Writes that touched any bit of `mask` in `reg`.
    pub fn writes_to(&self, reg: u32, mask: u32) -> Vec<RegisterWrite> {
        self.lock()
            .writes
            .iter()
            .filter(|w| w.touches(reg, mask))
            .copied()
            .collect()
    }

    /// Forget all logged writes.
    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    /// Install a write hook.
    pub fn on_write<F>(&self, hook: F)
    where
        F: FnMut(&RegisterWrite, &mut BTreeMap<u32, u32>) + Send + 'static,
    {
        self.lock().hooks.push(Box::new(hook));
    }

    /// Make every access fail with [`PortError::NotReady`] while `true`.
    pub fn set_not_ready(&self, not_ready: bool) {
        self.lock().not_ready = not_ready;
    }

    /// Fail the next write of `value` to the `mask` field of `reg` with
    /// [`PortError::Bus`]. The failed write is neither applied nor logged.
    pub fn fail_next_write(&self, reg: u32, mask: u32, value: u32) {
        self.lock().fail_once.push(RegisterWrite {
            reg,
            mask,
            value: value & mask,
        });
    }
}

impl RegisterPort for MockRegisters {
    async fn read(&mut self, reg: u32) -> Result<u32, PortError> {
        let file = self.lock();
        if file.not_ready {
            return Err(PortError::NotReady);
        }
        Ok(file.values.get(&reg).copied().unwrap_or(0))
    }

    async fn update_bits(&mut self, reg: u32, mask: u32, value: u32) -> Result<(), PortError> {
        let mut guard = self.lock();
        let file = &mut *guard;
        if file.not_ready {
            return Err(PortError::NotReady);
        }
        let write = RegisterWrite {
            reg,
            mask,
            value: value & mask,
        };
        if let Some(i) = file.fail_once.iter().position(|f| *f == write) {
            file.fail_once.remove(i);
            return Err(PortError::Bus);
        }
        let entry = file.values.entry(reg).or_insert(0);
        *entry = (*entry & !mask) | write.value;
        file.writes.push(write);
        for hook in &mut file.hooks {
            hook(&write, &mut file.values);
        }
        Ok(())
    }
}

// ── Power gate ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct GateCounters {
    acquires: AtomicUsize,
    holds: AtomicUsize,
    releases: AtomicUsize,
    fail: AtomicBool,
}

/// [`PowerGate`] that counts acquisitions and hold/release calls.
#[derive(Clone, Default)]
pub struct CountingPowerGate {
    counters: Arc<GateCounters>,
}

impl CountingPowerGate {
    /// Create a gate that always resumes successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `acquire` fail with [`PortError::NotReady`] while `true`.
    pub fn set_fail(&self, fail: bool) {
        self.counters.fail.store(fail, Ordering::SeqCst);
    }

    /// Successful `acquire` calls.
    pub fn acquire_count(&self) -> usize {
        self.counters.acquires.load(Ordering::SeqCst)
    }

    /// `hold` calls.
    pub fn hold_count(&self) -> usize {
        self.counters.holds.load(Ordering::SeqCst)
    }

    /// `release` calls.
    pub fn release_count(&self) -> usize {
        self.counters.releases.load(Ordering::SeqCst)
    }

    /// `true` while more holds than releases have been taken.
    pub fn is_held(&self) -> bool {
        self.hold_count() > self.release_count()
    }
}

impl PowerGate for CountingPowerGate {
    type Guard<'a> = ();

    async fn acquire(&self) -> Result<Self::Guard<'_>, PortError> {
        if self.counters.fail.load(Ordering::SeqCst) {
            return Err(PortError::NotReady);
        }
        self.counters.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn hold(&self) {
        self.counters.holds.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Jack sink ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SinkLog {
    reports: Vec<(JackStatus, JackStatus)>,
    latched: JackStatus,
}

/// [`JackSink`] that records every report and tracks the latched status.
#[derive(Clone, Default)]
pub struct RecordingJackSink {
    log: Arc<Mutex<SinkLog>>,
}

impl RecordingJackSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SinkLog> {
        match self.log.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// All `(status, mask)` reports in order.
    pub fn reports(&self) -> Vec<(JackStatus, JackStatus)> {
        self.lock().reports.clone()
    }

    /// Most recent report.
    pub fn last(&self) -> Option<(JackStatus, JackStatus)> {
        self.lock().reports.last().copied()
    }

    /// Status after applying every report in order.
    pub fn latched(&self) -> JackStatus {
        self.lock().latched
    }

    /// Forget recorded reports (the latched state is kept).
    pub fn clear(&self) {
        self.lock().reports.clear();
    }
}

impl JackSink for RecordingJackSink {
    fn report(&mut self, status: JackStatus, mask: JackStatus) {
        let mut log = self.lock();
        log.latched = log.latched.apply(status, mask);
        log.reports.push((status, mask));
    }
}

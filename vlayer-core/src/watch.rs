//! watch.rs - Cooperative cancellation and rescan scheduling for watch mode.
//!
//! Watch mode reacts to bursts of filesystem events. Two small primitives
//! keep that orderly: a [`CancellationToken`] the scanner polls at file
//! boundaries, and a [`ScanGate`] that admits at most one scan at a time and
//! coalesces every change arriving mid-scan into a single pending rescan.
//!
//! License: MIT OR APACHE 2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag a long-running scan polls between files. Cancelling never
/// interrupts the file currently being scanned.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Admission control for watch-mode rescans. At most one scan runs at a
/// time; change events that arrive while one is in flight collapse into a
/// single pending flag the watcher drains when the scan completes.
#[derive(Debug, Default)]
pub struct ScanGate {
    in_flight: AtomicBool,
    pending: AtomicBool,
}

impl ScanGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries to start a scan. Returns a permit that releases the gate on
    /// drop, or `None` when a scan is already running, in which case the
    /// event is recorded as pending instead.
    pub fn try_begin(&self) -> Option<ScanPermit<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(ScanPermit { gate: self })
        } else {
            self.pending.store(true, Ordering::SeqCst);
            log::debug!("scan already in flight, coalescing change event");
            None
        }
    }

    /// Records a change event without attempting to scan.
    pub fn note_change(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    /// Clears and returns the pending flag. The watcher calls this after a
    /// scan finishes to decide whether one more pass is owed.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// RAII guard for one admitted scan.
pub struct ScanPermit<'a> {
    gate: &'a ScanGate,
}

impl Drop for ScanPermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::SeqCst);
    }
}

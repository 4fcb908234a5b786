//! Run state and cooperative worker control
//!
//! One `RunControl` exists per analysis run and is shared between the
//! coordinating thread, the background worker, and consumers polling state.
//! Cancellation is cooperative: the worker calls `checkpoint()` between
//! record-level steps and exits cleanly when a cancel was requested; the same
//! checkpoint parks the worker while suspended.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::progress::ProgressCell;

/// Phases of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunPhase {
    /// Not started
    Idle = 0,
    /// Coordinating thread is building the path/guid maps
    Mapping = 1,
    /// Worker is computing reachability, normalization, and inbound links
    Graph = 2,
    /// Coordinating thread is gathering bundle tables
    BundleTables = 3,
    /// Worker is applying the bundle overlay
    BundleGraph = 4,
    /// Run complete
    Done = 5,
}

impl RunPhase {
    fn from_u8(raw: u8) -> RunPhase {
        match raw {
            1 => RunPhase::Mapping,
            2 => RunPhase::Graph,
            3 => RunPhase::BundleTables,
            4 => RunPhase::BundleGraph,
            5 => RunPhase::Done,
            _ => RunPhase::Idle,
        }
    }

    /// Whether this phase counts as "analysis in progress"
    pub fn is_active(self) -> bool {
        !matches!(self, RunPhase::Idle | RunPhase::Done)
    }
}

/// Shared state of one analysis run
#[derive(Debug)]
pub struct RunControl {
    phase: AtomicU8,
    cancelled: AtomicBool,
    paused: Mutex<bool>,
    unpaused: Condvar,
    progress: Arc<ProgressCell>,
    started_at: Mutex<Option<Instant>>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(RunPhase::Idle as u8),
            cancelled: AtomicBool::new(false),
            paused: Mutex::new(false),
            unpaused: Condvar::new(),
            progress: Arc::new(ProgressCell::default()),
            started_at: Mutex::new(None),
        }
    }

    pub fn phase(&self) -> RunPhase {
        RunPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn set_phase(&self, phase: RunPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    pub fn progress_cell(&self) -> Arc<ProgressCell> {
        self.progress.clone()
    }

    pub fn progress_value(&self) -> f32 {
        self.progress.get()
    }

    pub fn mark_started(&self) {
        *self.started_at.lock() = Some(Instant::now());
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started_at
            .lock()
            .map(|at| at.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Request cooperative cancellation and wake a parked worker
    pub fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        let _guard = self.paused.lock();
        self.unpaused.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn set_paused(&self, paused: bool) {
        *self.paused.lock() = paused;
        if !paused {
            self.unpaused.notify_all();
        }
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock()
    }

    /// Worker safe point: parks while suspended, returns false on cancel.
    ///
    /// Called between record-level steps so a suspend or cancel takes effect
    /// at the next record boundary.
    pub fn checkpoint(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let mut paused = self.paused.lock();
        while *paused {
            if self.is_cancelled() {
                return false;
            }
            let _ = self
                .unpaused
                .wait_for(&mut paused, Duration::from_millis(50));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_phase_round_trip() {
        let control = RunControl::new();
        assert_eq!(control.phase(), RunPhase::Idle);
        assert!(!control.phase().is_active());

        control.set_phase(RunPhase::Graph);
        assert_eq!(control.phase(), RunPhase::Graph);
        assert!(control.phase().is_active());
    }

    #[test]
    fn test_checkpoint_passes_when_running() {
        let control = RunControl::new();
        assert!(control.checkpoint());
    }

    #[test]
    fn test_checkpoint_fails_after_cancel() {
        let control = RunControl::new();
        control.request_cancel();
        assert!(!control.checkpoint());
    }

    #[test]
    fn test_cancel_unparks_suspended_worker() {
        let control = Arc::new(RunControl::new());
        control.set_paused(true);

        let worker_control = control.clone();
        let worker = thread::spawn(move || worker_control.checkpoint());

        // give the worker a moment to park, then cancel
        thread::sleep(Duration::from_millis(20));
        control.request_cancel();
        assert!(!worker.join().unwrap());
    }

    #[test]
    fn test_resume_unparks_suspended_worker() {
        let control = Arc::new(RunControl::new());
        control.set_paused(true);

        let worker_control = control.clone();
        let worker = thread::spawn(move || worker_control.checkpoint());

        thread::sleep(Duration::from_millis(20));
        control.set_paused(false);
        assert!(worker.join().unwrap());
    }
}

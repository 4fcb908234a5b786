//! Range-based progress reporting
//!
//! Each analysis phase owns a slice of the [0, 1] progress range; within a
//! slice, progress advances by a fixed delta per processed item. The current
//! value is published through an atomic cell so consumers on other threads
//! can poll it at any time.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Shared progress cell readable from any thread
#[derive(Debug, Default)]
pub struct ProgressCell(AtomicU32);

impl ProgressCell {
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Phase-local progress tracker writing into a shared cell.
///
/// Only one execution context drives the tracker at a time; the tracker
/// itself moves between the coordinating thread and the worker with the run.
#[derive(Debug)]
pub struct ProgressTracker {
    cell: Arc<ProgressCell>,
    value: f32,
    range_lo: f32,
    range_hi: f32,
    delta: f32,
    total: f32,
    count: f32,
}

impl ProgressTracker {
    /// Create a tracker whose first range starts at `at`
    pub fn starting_at(cell: Arc<ProgressCell>, at: f32) -> Self {
        let tracker = Self {
            cell,
            value: at,
            range_lo: at,
            range_hi: at,
            delta: 0.0,
            total: 0.0,
            count: 0.0,
        };
        tracker.cell.set(tracker.value);
        tracker
    }

    /// Open the next range, ending at `max`, covering `count` items.
    ///
    /// A zero-item range completes immediately.
    pub fn set_range(&mut self, max: f32, count: usize) {
        self.range_lo = self.range_hi;
        self.range_hi = max;
        if self.value < self.range_lo {
            self.value = self.range_lo;
        }
        if count > 0 {
            self.delta = 1.0 / count as f32;
        } else {
            self.delta = 0.0;
            self.value = self.range_hi;
        }
        self.total = count as f32;
        self.count = 0.0;
        self.cell.set(self.value);
    }

    /// Advance by one item within the current range
    pub fn increment(&mut self) {
        self.count += 1.0;
        // land exactly on the range end despite accumulated rounding
        let t = if self.count >= self.total {
            1.0
        } else {
            (self.count * self.delta).clamp(0.0, 1.0)
        };
        self.value = self.range_lo + (self.range_hi - self.range_lo) * t;
        self.cell.set(self.value);
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

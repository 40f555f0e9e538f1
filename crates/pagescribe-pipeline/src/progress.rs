// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress tracking and the stock progress observers.

use pagescribe_core::traits::ProgressObserver;
use tracing::{debug, info};

/// Computes job progress as a percentage that never goes backwards.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    last: f32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single mode: `processed / total`, capped at 100.
    pub fn single(&mut self, processed: usize, total: usize) -> f32 {
        if total == 0 {
            return self.advance(100.0);
        }
        self.advance(processed as f32 / total as f32 * 100.0)
    }

    /// Batch mode: whole files done plus the fraction of the current file.
    pub fn batch(
        &mut self,
        completed_files: usize,
        pages_done: usize,
        pages_in_file: usize,
        total_files: usize,
    ) -> f32 {
        if total_files == 0 {
            return self.advance(100.0);
        }
        let file_fraction = if pages_in_file == 0 {
            0.0
        } else {
            (pages_done as f32 / pages_in_file as f32).min(1.0)
        };
        self.advance((completed_files as f32 + file_fraction) / total_files as f32 * 100.0)
    }

    /// Normal completion always lands on exactly 100.
    pub fn finish(&mut self) -> f32 {
        self.advance(100.0)
    }

    fn advance(&mut self, raw: f32) -> f32 {
        let value = if raw.is_finite() { raw.clamp(0.0, 100.0) } else { 0.0 };
        self.last = self.last.max(value);
        self.last
    }
}

// -- Observers ----------------------------------------------------------------

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _percent: f32) {}
    fn on_status(&self, _message: &str) {}
}

/// Forwards updates to `tracing`: phases at `info`, percentages at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_progress(&self, percent: f32) {
        debug!(percent = format_args!("{percent:.1}"), "Progress");
    }

    fn on_status(&self, message: &str) {
        info!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_mode_is_a_plain_ratio() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.single(1, 4), 25.0);
        assert_eq!(tracker.single(4, 4), 100.0);
    }

    #[test]
    fn values_never_decrease() {
        let mut tracker = ProgressTracker::new();
        tracker.single(3, 4);
        assert_eq!(tracker.single(1, 4), 75.0);
    }

    #[test]
    fn capped_at_one_hundred() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.single(9, 4), 100.0);
    }

    #[test]
    fn batch_mode_counts_partial_files() {
        let mut tracker = ProgressTracker::new();
        // One of four files done, half of the second file done.
        assert_eq!(tracker.batch(1, 5, 10, 4), 37.5);
        assert_eq!(tracker.batch(2, 0, 0, 4), 50.0);
    }

    #[test]
    fn empty_work_is_complete() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.single(0, 0), 100.0);
        let mut batch = ProgressTracker::new();
        assert_eq!(batch.batch(0, 0, 0, 0), 100.0);
    }

    #[test]
    fn finish_reaches_exactly_one_hundred() {
        let mut tracker = ProgressTracker::new();
        tracker.single(2, 3);
        assert_eq!(tracker.finish(), 100.0);
    }
}

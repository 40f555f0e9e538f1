// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cooperative cancellation for a running job.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared stop flag.
///
/// Clones observe the same flag, so a signal handler on another thread can
/// stop a job running on a blocking worker. The pipeline only checks it
/// between pages (single mode) and between files (batch mode).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    stopped: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the job to stop at its next checkpoint.
    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Clear the flag. Only the job controller calls this, at job start.
    pub(crate) fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }
}

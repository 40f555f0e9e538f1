// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Builds the pipeline for one command and runs it to completion.
//
// Everything here is blocking and single-threaded; the binary calls it from
// `spawn_blocking` and trips the token from the async side.

use std::path::{Path, PathBuf};

use pagescribe_core::error::Result;
use pagescribe_core::{JobSettings, JobStatus};
use pagescribe_document::{PdfOpener, default_engine};
use pagescribe_pipeline::{
    BatchOutcome, BatchQueueItem, CancellationToken, JobController, SingleOutcome,
    TracingObserver,
};
use tracing::{instrument, warn};

/// What the user asked to transcribe.
#[derive(Debug, Clone)]
pub enum JobRequest {
    Single(PathBuf),
    Batch(Vec<PathBuf>),
}

#[derive(Debug)]
pub enum JobOutcome {
    Single(SingleOutcome),
    Batch(BatchOutcome),
}

impl JobOutcome {
    pub fn cancelled(&self) -> bool {
        let status = match self {
            Self::Single(outcome) => outcome.report.status,
            Self::Batch(outcome) => outcome.report.status,
        };
        status == JobStatus::Cancelled
    }
}

#[instrument(skip_all)]
pub fn run_job(
    request: JobRequest,
    settings: &JobSettings,
    model_dir: Option<&Path>,
    token: CancellationToken,
) -> Result<JobOutcome> {
    let engine = default_engine(model_dir);
    let observer = TracingObserver;
    let mut controller =
        JobController::new(&PdfOpener, engine.as_ref(), &observer).with_cancellation(token);

    match request {
        JobRequest::Single(path) => {
            let bytes = std::fs::read(&path)?;
            let outcome = controller.run_single(&display_name(&path), &bytes, settings)?;
            Ok(JobOutcome::Single(outcome))
        }
        JobRequest::Batch(paths) => {
            let items = paths.iter().map(|p| read_queued(p)).collect();
            let outcome = controller.run_batch_items(items, settings)?;
            Ok(JobOutcome::Batch(outcome))
        }
    }
}

/// An unreadable batch file stays in the queue and fails with its read error.
fn read_queued(path: &Path) -> BatchQueueItem {
    let name = display_name(path);
    match std::fs::read(path) {
        Ok(bytes) => BatchQueueItem::new(name, bytes),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read file");
            BatchQueueItem::unreadable(name, e.to_string())
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

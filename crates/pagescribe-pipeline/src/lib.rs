// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagescribe-pipeline — The transcription pipeline.
//
// Decides per page between the embedded text layer and recognition, manages
// the recognition session, reconstructs paragraphs, assembles page text, and
// schedules batches. Everything runs synchronously on the calling thread;
// cancellation is cooperative through `CancellationToken`.

pub mod assemble;
pub mod batch;
pub mod cancel;
pub mod classifier;
pub mod export;
pub mod job;
pub mod pages;
pub mod progress;
pub mod reconstruct;
pub mod session;

#[cfg(test)]
mod test_support;

pub use assemble::{assemble, page_header};
pub use batch::{BatchQueueItem, BatchScheduler};
pub use cancel::CancellationToken;
pub use classifier::classify;
pub use export::ExportFormat;
pub use job::{BatchOutcome, JobContext, JobController, JobReport, SingleOutcome};
pub use pages::{parse_pages, resolve_pages};
pub use progress::{NoopObserver, ProgressTracker, TracingObserver};
pub use reconstruct::TextReconstructor;
pub use session::RecognitionSessionManager;

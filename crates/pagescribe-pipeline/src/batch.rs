// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch scheduler: transcribes queued files strictly one after another.
//
// Each item moves pending → processing → success | error and never back.
// Results land in a registry in completion order.

use pagescribe_core::error::{Result, ScribeError};
use pagescribe_core::traits::{DocumentOpener, RecognitionEngine};
use pagescribe_core::{BatchItemStatus, FileResult, failure_placeholder};
use tracing::{info, instrument, warn};

use crate::assemble::assemble;
use crate::job::{JobContext, extract_pages, reconstruct_pages, select_pages};
use crate::progress::ProgressTracker;

/// A file waiting in (or done with) the batch queue.
#[derive(Debug, Clone)]
pub struct BatchQueueItem {
    pub name: String,
    /// File contents, or why they could not be read.
    input: std::result::Result<Vec<u8>, String>,
    pub status: BatchItemStatus,
}

impl BatchQueueItem {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            input: Ok(bytes),
            status: BatchItemStatus::Pending,
        }
    }

    /// A file whose contents could not be read. It stays in the queue and
    /// fails with `reason` when its turn comes.
    pub fn unreadable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: Err(reason.into()),
            status: BatchItemStatus::Pending,
        }
    }
}

/// Drives a queue of files through the page pipeline.
pub struct BatchScheduler<'a> {
    ctx: &'a JobContext<'a>,
    opener: &'a dyn DocumentOpener,
    engine: &'a dyn RecognitionEngine,
    items: Vec<BatchQueueItem>,
    results: Vec<FileResult>,
    cursor: usize,
    progress: ProgressTracker,
}

impl<'a> BatchScheduler<'a> {
    pub fn new(
        ctx: &'a JobContext<'a>,
        opener: &'a dyn DocumentOpener,
        engine: &'a dyn RecognitionEngine,
        items: Vec<BatchQueueItem>,
    ) -> Self {
        Self {
            ctx,
            opener,
            engine,
            items,
            results: Vec::new(),
            cursor: 0,
            progress: ProgressTracker::new(),
        }
    }

    /// Process the next pending file.
    ///
    /// Returns `false` when the queue is exhausted or a stop was requested.
    /// The stop is only checked here, so a file already started always
    /// finishes.
    pub fn process_next(&mut self) -> bool {
        let total = self.items.len();
        if self.cursor >= total {
            return false;
        }
        if self.ctx.token.is_stopped() {
            info!(done = self.cursor, total, "Batch stopped before next file");
            return false;
        }

        let index = self.cursor;
        let item = &mut self.items[index];
        item.status = BatchItemStatus::Processing;
        let name = item.name.clone();
        let input = std::mem::replace(&mut item.input, Ok(Vec::new()));
        self.ctx
            .observer
            .on_status(&format!("processing file {}/{}: {}", index + 1, total, name));

        let transcribed = match input {
            Ok(bytes) => self.transcribe_file(index, &name, &bytes),
            Err(reason) => Err(ScribeError::DocumentLoad(format!("{name}: {reason}"))),
        };
        let (status, result) = match transcribed {
            Ok(content) => (
                BatchItemStatus::Success,
                FileResult {
                    name,
                    content,
                    success: true,
                },
            ),
            Err(err) => {
                warn!(file = %name, error = %err, "File failed");
                (
                    BatchItemStatus::Error,
                    FileResult {
                        name,
                        content: failure_placeholder(&err.to_string()),
                        success: false,
                    },
                )
            }
        };

        self.items[index].status = status;
        self.results.push(result);
        self.cursor += 1;
        let percent = self.progress.batch(self.cursor, 0, 0, total);
        self.ctx.observer.on_progress(percent);
        true
    }

    /// Open, extract, reconstruct, and assemble one file. The page loop does
    /// not observe the stop flag.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    fn transcribe_file(&mut self, index: usize, name: &str, bytes: &[u8]) -> Result<String> {
        let document = self.opener.open(name, bytes)?;
        let page_numbers = select_pages(self.ctx, document.info().page_count);

        let total_files = self.items.len();
        let observer = self.ctx.observer;
        let progress = &mut self.progress;
        let run = extract_pages(
            self.ctx,
            document.as_ref(),
            self.engine,
            &page_numbers,
            false,
            |done, planned| observer.on_progress(progress.batch(index, done, planned, total_files)),
        );

        let pages = reconstruct_pages(self.ctx, run.pages);
        Ok(assemble(&pages))
    }

    // -- Accessors ------------------------------------------------------------

    /// Registry of finished files, in completion order.
    pub fn results(&self) -> &[FileResult] {
        &self.results
    }

    pub fn items(&self) -> &[BatchQueueItem] {
        &self.items
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Whether every queued file has been processed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }

    pub fn into_results(self) -> Vec<FileResult> {
        self.results
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job controller: runs a single-document or batch transcription job.
//
// A job moves through explicit stages: open → resolve pages → extract pages
// → reconstruct → assemble. State lives in a `JobContext` passed to each
// stage; nothing is global.

use chrono::{DateTime, Utc};
use pagescribe_core::error::{Result, ScribeError};
use pagescribe_core::traits::{DocumentOpener, DocumentSource, ProgressObserver, RecognitionEngine};
use pagescribe_core::{
    BatchItemStatus, DocumentInfo, ExtractionMode, FileResult, JobId, JobMode, JobSettings,
    JobStatus, PageResult,
};
use pagescribe_document::ScanEnhancer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::assemble::assemble;
use crate::batch::{BatchQueueItem, BatchScheduler};
use crate::cancel::CancellationToken;
use crate::classifier::classify;
use crate::pages::{parse_pages, resolve_pages};
use crate::progress::ProgressTracker;
use crate::reconstruct::TextReconstructor;
use crate::session::RecognitionSessionManager;

// ---------------------------------------------------------------------------
// Context and reports
// ---------------------------------------------------------------------------

/// Everything a stage needs to know about the running job.
pub struct JobContext<'a> {
    pub id: JobId,
    pub settings: &'a JobSettings,
    pub token: CancellationToken,
    pub observer: &'a dyn ProgressObserver,
    pub reconstructor: TextReconstructor,
}

impl<'a> JobContext<'a> {
    pub fn new(
        settings: &'a JobSettings,
        token: CancellationToken,
        observer: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            id: JobId::new(),
            settings,
            token,
            observer,
            reconstructor: TextReconstructor::new(settings.reconstruction.clone()),
        }
    }
}

/// Summary of a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub id: JobId,
    pub mode: JobMode,
    pub status: JobStatus,
    /// Pages (single) or files (batch) processed.
    pub processed: usize,
    /// Pages (single) or files (batch) planned.
    pub total: usize,
    /// Pages or files that did not fail.
    pub succeeded: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds().max(0) as f64 / 1000.0
    }

    /// One-line human summary.
    pub fn status_line(&self) -> String {
        let secs = self.elapsed_secs();
        match (self.mode, self.status) {
            (JobMode::Single, JobStatus::Cancelled) => format!(
                "cancelled, {}/{} pages done in {:.1}s",
                self.processed, self.total, secs
            ),
            (JobMode::Single, _) => {
                format!("completed {} pages in {:.1}s", self.processed, secs)
            }
            (JobMode::Batch, JobStatus::Cancelled) => format!(
                "batch cancelled: {}/{} files succeeded, {} not started ({:.1}s)",
                self.succeeded,
                self.total,
                self.total - self.processed,
                secs
            ),
            (JobMode::Batch, _) => format!(
                "batch finished: {}/{} files succeeded in {:.1}s",
                self.succeeded, self.total, secs
            ),
        }
    }
}

/// Result of a single-document job.
#[derive(Debug, Clone)]
pub struct SingleOutcome {
    pub report: JobReport,
    pub info: DocumentInfo,
    /// Per-page results after reconstruction, ascending by page number.
    pub pages: Vec<PageResult>,
    /// Assembled document text with page headers.
    pub text: String,
}

/// Result of a batch job.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub report: JobReport,
    /// Registry in completion order.
    pub results: Vec<FileResult>,
    /// Final status of every queued file, in queue order.
    pub items: Vec<(String, BatchItemStatus)>,
}

// ---------------------------------------------------------------------------
// JobController
// ---------------------------------------------------------------------------

/// Runs one job at a time against a document opener and recognition engine.
pub struct JobController<'a> {
    opener: &'a dyn DocumentOpener,
    engine: &'a dyn RecognitionEngine,
    observer: &'a dyn ProgressObserver,
    token: CancellationToken,
    status: JobStatus,
}

impl<'a> JobController<'a> {
    pub fn new(
        opener: &'a dyn DocumentOpener,
        engine: &'a dyn RecognitionEngine,
        observer: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            opener,
            engine,
            observer,
            token: CancellationToken::new(),
            status: JobStatus::Idle,
        }
    }

    /// Use an externally owned stop flag (e.g. one tripped by Ctrl-C).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// A handle that stops the running job at its next checkpoint.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    fn begin(&mut self, settings: &JobSettings) -> Result<()> {
        if self.status == JobStatus::Running {
            return Err(ScribeError::JobAlreadyRunning);
        }
        settings.validate()?;
        self.token.reset();
        self.status = JobStatus::Running;
        Ok(())
    }

    /// Transcribe one document.
    ///
    /// A document that cannot be opened fails the job with
    /// [`ScribeError::DocumentLoad`]. Page failures do not: they become
    /// placeholder pages. Cancellation returns the pages done so far.
    #[instrument(skip_all, fields(name = %name, bytes_len = bytes.len()))]
    pub fn run_single(
        &mut self,
        name: &str,
        bytes: &[u8],
        settings: &JobSettings,
    ) -> Result<SingleOutcome> {
        self.begin(settings)?;
        let started_at = Utc::now();
        let observer = self.observer;
        let ctx = JobContext::new(settings, self.token.clone(), observer);
        info!(job = %ctx.id, "Starting single-document job");

        let document = match self.opener.open(name, bytes) {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "Document could not be opened");
                observer.on_status(&format!("failed to open {name}: {err}"));
                self.status = JobStatus::Failed;
                return Err(err);
            }
        };
        let info = document.info().clone();

        let page_numbers = select_pages(&ctx, info.page_count);
        observer.on_status(&format!("starting {} pages", page_numbers.len()));

        let mut tracker = ProgressTracker::new();
        let run = extract_pages(
            &ctx,
            document.as_ref(),
            self.engine,
            &page_numbers,
            true,
            |done, planned| observer.on_progress(tracker.single(done, planned)),
        );

        let status = if run.cancelled {
            JobStatus::Cancelled
        } else {
            observer.on_progress(tracker.finish());
            JobStatus::Completed
        };

        let pages = reconstruct_pages(&ctx, run.pages);
        let text = assemble(&pages);
        let report = JobReport {
            id: ctx.id,
            mode: JobMode::Single,
            status,
            processed: pages.len(),
            total: run.planned,
            succeeded: pages.iter().filter(|p| !p.failed).count(),
            started_at,
            finished_at: Utc::now(),
        };
        observer.on_status(&report.status_line());
        info!(job = %ctx.id, ?status, processed = report.processed, "Job finished");

        self.status = status;
        Ok(SingleOutcome {
            report,
            info,
            pages,
            text,
        })
    }

    /// Transcribe several documents one after another.
    ///
    /// The registry starts empty for every batch. Stopping takes effect
    /// before the next file; the file in progress is finished.
    pub fn run_batch(
        &mut self,
        files: Vec<(String, Vec<u8>)>,
        settings: &JobSettings,
    ) -> Result<BatchOutcome> {
        let items = files
            .into_iter()
            .map(|(name, bytes)| BatchQueueItem::new(name, bytes))
            .collect();
        self.run_batch_items(items, settings)
    }

    /// Like [`run_batch`](Self::run_batch), for a prepared queue that may
    /// hold unreadable entries.
    #[instrument(skip_all, fields(files = items.len()))]
    pub fn run_batch_items(
        &mut self,
        items: Vec<BatchQueueItem>,
        settings: &JobSettings,
    ) -> Result<BatchOutcome> {
        self.begin(settings)?;
        let started_at = Utc::now();
        let ctx = JobContext::new(settings, self.token.clone(), self.observer);
        info!(job = %ctx.id, "Starting batch job");

        let mut scheduler = BatchScheduler::new(&ctx, self.opener, self.engine, items);
        while scheduler.process_next() {}

        let status = if scheduler.is_exhausted() {
            JobStatus::Completed
        } else {
            JobStatus::Cancelled
        };
        let report = JobReport {
            id: ctx.id,
            mode: JobMode::Batch,
            status,
            processed: scheduler.results().len(),
            total: scheduler.items().len(),
            succeeded: scheduler.success_count(),
            started_at,
            finished_at: Utc::now(),
        };
        self.observer.on_status(&report.status_line());
        info!(job = %ctx.id, ?status, succeeded = report.succeeded, "Batch finished");

        let items = scheduler
            .items()
            .iter()
            .map(|item| (item.name.clone(), item.status))
            .collect();
        let results = scheduler.into_results();

        self.status = status;
        Ok(BatchOutcome {
            report,
            results,
            items,
        })
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Pages to process; an expression with no valid page selects all of them.
pub(crate) fn select_pages(ctx: &JobContext<'_>, page_count: u32) -> Vec<u32> {
    let expression = ctx.settings.page_range.trim();
    if !expression.is_empty() && parse_pages(expression, page_count).is_empty() {
        ctx.observer
            .on_status("no valid pages in range, processing all pages");
    }
    resolve_pages(expression, page_count)
}

pub(crate) struct PageRun {
    pub pages: Vec<PageResult>,
    pub planned: usize,
    pub cancelled: bool,
}

/// Extract every listed page in order. One recognition session at most is
/// created and it is released before returning.
///
/// With `observe_cancel` the token is checked before each page.
pub(crate) fn extract_pages(
    ctx: &JobContext<'_>,
    document: &dyn DocumentSource,
    engine: &dyn RecognitionEngine,
    page_numbers: &[u32],
    observe_cancel: bool,
    mut on_page_done: impl FnMut(usize, usize),
) -> PageRun {
    let planned = page_numbers.len();
    let mut sessions = RecognitionSessionManager::new(engine, &ctx.settings.language);
    let mut pages = Vec::with_capacity(planned);
    let mut cancelled = false;

    for (index, &number) in page_numbers.iter().enumerate() {
        if observe_cancel && ctx.token.is_stopped() {
            info!(done = index, planned, "Stop requested");
            ctx.observer.on_status("cancellation requested, stopping");
            cancelled = true;
            break;
        }

        ctx.observer
            .on_status(&format!("processing page {number} ({}/{planned})", index + 1));
        let page = match process_page(ctx, document, &mut sessions, number) {
            Ok(page) => page,
            Err(err) => page_failure(err.on_page(number), number),
        };
        pages.push(page);
        on_page_done(index + 1, planned);
    }

    sessions.release();
    PageRun {
        pages,
        planned,
        cancelled,
    }
}

/// Placeholder page for a page-level error; the reason is the error detail.
fn page_failure(err: ScribeError, number: u32) -> PageResult {
    warn!(error = %err, "Page failed");
    match err {
        ScribeError::PageProcessing { page, detail } => PageResult::failure(page, &detail),
        other => PageResult::failure(number, &other.to_string()),
    }
}

#[instrument(skip(ctx, document, sessions))]
fn process_page(
    ctx: &JobContext<'_>,
    document: &dyn DocumentSource,
    sessions: &mut RecognitionSessionManager<'_>,
    number: u32,
) -> Result<PageResult> {
    let settings = ctx.settings;
    let page = document.page(number)?;

    let text_layer = if settings.prefer_text_layer {
        page.text_layer().unwrap_or_else(|err| {
            warn!(error = %err, "Text layer unreadable, using recognition");
            String::new()
        })
    } else {
        String::new()
    };

    match classify(&text_layer, settings.prefer_text_layer, settings.text_threshold) {
        ExtractionMode::TextLayer => {
            debug!(chars = text_layer.chars().count(), "Using text layer");
            Ok(PageResult::extracted(number, text_layer.trim().to_string()))
        }
        ExtractionMode::Recognition => {
            sessions.ensure_session(ctx.observer)?;
            let raster = page.rasterize(settings.raster_scale)?;
            let raster = if settings.binarize {
                ScanEnhancer::from_dynamic(raster)
                    .binarize(settings.binarize_threshold)
                    .into_dynamic()
            } else {
                raster
            };
            let text = sessions.recognize(&raster, ctx.observer)?;
            debug!(chars = text.chars().count(), "Page recognized");
            Ok(PageResult::recognized(number, text))
        }
    }
}

/// Reconstruct the text of every successful page.
pub(crate) fn reconstruct_pages(ctx: &JobContext<'_>, pages: Vec<PageResult>) -> Vec<PageResult> {
    pages
        .into_iter()
        .map(|page| {
            if page.failed {
                page
            } else {
                PageResult {
                    text: ctx.reconstructor.process(&page.text),
                    ..page
                }
            }
        })
        .collect()
}

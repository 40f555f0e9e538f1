// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pagescribe transcription pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a job transcribes one document or a queue of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobMode {
    Single,
    Batch,
}

/// Lifecycle states of a transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// No job has run yet, or the previous job has been collected.
    Idle,
    /// Pages or files are being processed.
    Running,
    /// Stopped early by a cancellation request; partial results are valid.
    Cancelled,
    /// Every page (or file) was processed.
    Completed,
    /// The document could not be opened (single mode only).
    Failed,
}

/// Which extraction path a page takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMode {
    /// Use the machine-readable text embedded in the page.
    TextLayer,
    /// Rasterize the page and run optical recognition.
    Recognition,
}

/// Metadata of an opened document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Display name (usually the file stem).
    pub name: String,
    pub page_count: u32,
    /// Hex SHA-256 of the source bytes.
    pub fingerprint: String,
}

/// The outcome of processing one page.
///
/// Created once per page and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-based page number.
    pub page_number: u32,
    pub text: String,
    /// True when the text came from optical recognition.
    pub recognized: bool,
    /// True when processing failed and `text` holds a placeholder.
    pub failed: bool,
}

impl PageResult {
    pub fn extracted(page_number: u32, text: String) -> Self {
        Self {
            page_number,
            text,
            recognized: false,
            failed: false,
        }
    }

    pub fn recognized(page_number: u32, text: String) -> Self {
        Self {
            page_number,
            text,
            recognized: true,
            failed: false,
        }
    }

    /// A placeholder result for a page whose processing failed.
    pub fn failure(page_number: u32, reason: &str) -> Self {
        Self {
            page_number,
            text: failure_placeholder(reason),
            recognized: false,
            failed: true,
        }
    }
}

/// Visible placeholder text recorded for failed pages and files.
pub fn failure_placeholder(reason: &str) -> String {
    format!("[processing failed: {reason}]")
}

/// States of a file in the batch queue. Transitions never revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchItemStatus {
    Pending,
    Processing,
    Success,
    Error,
}

/// One entry of the batch result registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub name: String,
    pub content: String,
    pub success: bool,
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagescribe.

use thiserror::Error;

/// Top-level error type for all Pagescribe operations.
#[derive(Debug, Error)]
pub enum ScribeError {
    // -- Job-level errors --
    #[error("failed to load document: {0}")]
    DocumentLoad(String),

    #[error("page {page} failed: {detail}")]
    PageProcessing { page: u32, detail: String },

    #[error("recognition session could not be started: {0}")]
    SessionInit(String),

    #[error("a job is already running")]
    JobAlreadyRunning,

    // -- Adapter errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScribeError {
    /// Wrap any error raised while working on a single page.
    ///
    /// Errors that already carry a page number are returned unchanged.
    pub fn on_page(self, page: u32) -> Self {
        match self {
            already @ Self::PageProcessing { .. } => already,
            other => Self::PageProcessing {
                page,
                detail: other.to_string(),
            },
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_page_wraps_adapter_errors() {
        let err = ScribeError::Ocr("model missing".into()).on_page(4);
        match err {
            ScribeError::PageProcessing { page, detail } => {
                assert_eq!(page, 4);
                assert_eq!(detail, "OCR failed: model missing");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn on_page_keeps_existing_page_number() {
        let err = ScribeError::PageProcessing {
            page: 2,
            detail: "boom".into(),
        }
        .on_page(9);
        assert_eq!(err.to_string(), "page 2 failed: boom");
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory documents, engines, and observers for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use image::DynamicImage;
use pagescribe_core::error::{Result, ScribeError};
use pagescribe_core::traits::{
    DocumentOpener, DocumentSource, PageHandle, ProgressObserver, RecognitionEngine,
    RecognitionSession,
};
use pagescribe_core::DocumentInfo;

use crate::cancel::CancellationToken;

// -- Documents ----------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockPage {
    pub text_layer: String,
    pub rasterizable: bool,
}

impl MockPage {
    /// A page with a usable text layer.
    pub fn text(text: &str) -> Self {
        Self {
            text_layer: text.to_string(),
            rasterizable: true,
        }
    }

    /// A scanned page with no text layer.
    pub fn scan() -> Self {
        Self {
            text_layer: String::new(),
            rasterizable: true,
        }
    }

    /// A page with no text layer that also cannot be rendered.
    pub fn broken() -> Self {
        Self {
            text_layer: String::new(),
            rasterizable: false,
        }
    }
}

/// Opens documents registered by name; anything else fails to load.
#[derive(Default)]
pub struct MockOpener {
    documents: HashMap<String, Vec<MockPage>>,
}

impl MockOpener {
    pub fn with(mut self, name: &str, pages: Vec<MockPage>) -> Self {
        self.documents.insert(name.to_string(), pages);
        self
    }
}

impl DocumentOpener for MockOpener {
    fn open(&self, name: &str, _bytes: &[u8]) -> Result<Box<dyn DocumentSource>> {
        let pages = self
            .documents
            .get(name)
            .cloned()
            .ok_or_else(|| ScribeError::DocumentLoad(format!("{name}: not a PDF")))?;
        Ok(Box::new(MockDocument {
            info: DocumentInfo {
                name: name.to_string(),
                page_count: pages.len() as u32,
                fingerprint: "0".repeat(64),
            },
            pages,
        }))
    }
}

struct MockDocument {
    info: DocumentInfo,
    pages: Vec<MockPage>,
}

impl DocumentSource for MockDocument {
    fn info(&self) -> &DocumentInfo {
        &self.info
    }

    fn page(&self, number: u32) -> Result<Box<dyn PageHandle + '_>> {
        let page = number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .ok_or_else(|| ScribeError::Pdf(format!("page {number} out of range")))?;
        Ok(Box::new(page.clone()))
    }
}

impl PageHandle for MockPage {
    fn text_layer(&self) -> Result<String> {
        Ok(self.text_layer.clone())
    }

    fn rasterize(&self, scale: f32) -> Result<DynamicImage> {
        if self.rasterizable {
            let side = (10.0 * scale) as u32;
            Ok(DynamicImage::new_rgb8(side, side))
        } else {
            Err(ScribeError::Pdf("page has no embedded raster image".into()))
        }
    }
}

// -- Engines ------------------------------------------------------------------

#[derive(Default)]
struct Counters {
    created: Cell<usize>,
    recognized: Cell<usize>,
    terminated: Cell<usize>,
}

/// Engine whose sessions return a fixed text and count their use.
pub struct MockEngine {
    text: String,
    counters: Rc<Counters>,
}

impl MockEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            counters: Rc::default(),
        }
    }

    pub fn created(&self) -> usize {
        self.counters.created.get()
    }

    pub fn recognized(&self) -> usize {
        self.counters.recognized.get()
    }

    pub fn terminated(&self) -> usize {
        self.counters.terminated.get()
    }
}

impl RecognitionEngine for MockEngine {
    fn create_session(&self, _language: &str) -> Result<Box<dyn RecognitionSession>> {
        self.counters.created.set(self.counters.created.get() + 1);
        Ok(Box::new(MockSession {
            text: self.text.clone(),
            counters: Rc::clone(&self.counters),
        }))
    }
}

struct MockSession {
    text: String,
    counters: Rc<Counters>,
}

impl RecognitionSession for MockSession {
    fn recognize(&mut self, _image: &DynamicImage) -> Result<String> {
        self.counters.recognized.set(self.counters.recognized.get() + 1);
        Ok(self.text.clone())
    }

    fn terminate(&mut self) {
        self.counters.terminated.set(self.counters.terminated.get() + 1);
    }
}

/// Engine that can never create a session.
#[derive(Default)]
pub struct FailingEngine {
    attempts: Cell<usize>,
}

impl FailingEngine {
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl RecognitionEngine for FailingEngine {
    fn create_session(&self, _language: &str) -> Result<Box<dyn RecognitionSession>> {
        self.attempts.set(self.attempts.get() + 1);
        Err(ScribeError::SessionInit("models missing".into()))
    }
}

// -- Observers ----------------------------------------------------------------

/// Records every update.
#[derive(Default)]
pub struct RecordingObserver {
    progress: RefCell<Vec<f32>>,
    statuses: RefCell<Vec<String>>,
}

impl RecordingObserver {
    pub fn progress(&self) -> Vec<f32> {
        self.progress.borrow().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.borrow().clone()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, percent: f32) {
        self.progress.borrow_mut().push(percent);
    }

    fn on_status(&self, message: &str) {
        self.statuses.borrow_mut().push(message.to_string());
    }
}

/// Requests a stop once a status message containing `trigger` is seen.
pub struct StopOnStatus {
    pub trigger: String,
    pub token: CancellationToken,
}

impl ProgressObserver for StopOnStatus {
    fn on_progress(&self, _percent: f32) {}

    fn on_status(&self, message: &str) {
        if message.contains(&self.trigger) {
            self.token.request_stop();
        }
    }
}

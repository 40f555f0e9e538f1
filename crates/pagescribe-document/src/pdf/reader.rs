// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open a document, read per-page text layers, and rasterize
// scanned pages from their embedded images using the `lopdf` crate.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pagescribe_core::error::ScribeError;
use pagescribe_core::traits::{DocumentOpener, DocumentSource, PageHandle};
use pagescribe_core::types::DocumentInfo;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::{RasterProcessor, SampleLayout, check_raster_size};

/// Maximum depth followed when walking `/Parent` links for inherited page
/// attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// An opened PDF document.
///
/// Wraps `lopdf::Document` and exposes the page-level operations the pipeline
/// needs: text-layer extraction and rasterization.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    info: DocumentInfo,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    ///
    /// Any parse failure is reported as [`ScribeError::DocumentLoad`].
    #[instrument(skip(data), fields(bytes_len = data.len()))]
    pub fn from_bytes(name: &str, data: &[u8]) -> Result<Self, ScribeError> {
        let document = Document::load_mem(data).map_err(|err| {
            ScribeError::DocumentLoad(format!("{}: {}", name, err))
        })?;

        let page_count = document.get_pages().len() as u32;
        if page_count == 0 {
            return Err(ScribeError::DocumentLoad(format!(
                "{}: document has no pages",
                name
            )));
        }

        let fingerprint = hex::encode(Sha256::digest(data));
        info!(name, page_count, %fingerprint, "PDF loaded");

        Ok(Self {
            document,
            info: DocumentInfo {
                name: name.to_string(),
                page_count,
                fingerprint,
            },
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.info.page_count
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId, ScribeError> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            ScribeError::Pdf(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract the embedded text layer of a page (1-indexed).
    #[instrument(skip(self))]
    pub fn text_layer(&self, page_number: u32) -> Result<String, ScribeError> {
        self.page_id(page_number)?;
        let text = self.document.extract_text(&[page_number]).map_err(|err| {
            ScribeError::Pdf(format!(
                "text extraction failed on page {}: {}",
                page_number, err
            ))
        })?;
        debug!(page_number, chars = text.chars().count(), "Text layer read");
        Ok(text)
    }

    /// Rasterize a page (1-indexed) at `scale` pixels per PDF point.
    ///
    /// Uses the largest image embedded in the page, which for scanned
    /// documents is the scan itself, resized to the page box at `scale`.
    /// Pages drawn purely with vector operators cannot be rasterized.
    #[instrument(skip(self))]
    pub fn rasterize(
        &self,
        page_number: u32,
        scale: f32,
    ) -> Result<image::DynamicImage, ScribeError> {
        let page_id = self.page_id(page_number)?;
        let page = self.dictionary(page_id)?;

        let stream = self.largest_page_image(page)?.ok_or_else(|| {
            ScribeError::Pdf(format!(
                "page {} has no embedded raster image to recognise",
                page_number
            ))
        })?;

        let raster = decode_image_stream(&self.document, stream)?;
        let (target_w, target_h) = match self.media_box(page) {
            Some([x0, y0, x1, y1]) => (
                raster_extent((x1 - x0).abs(), scale, page_number)?,
                raster_extent((y1 - y0).abs(), scale, page_number)?,
            ),
            None => (raster.width(), raster.height()),
        };
        check_raster_size(target_w, target_h)
            .map_err(|err| ScribeError::Pdf(format!("page {}: {}", page_number, err)))?;

        let image = raster.scale_to(target_w, target_h).into_dynamic();
        debug!(
            page_number,
            width = image.width(),
            height = image.height(),
            "Page rasterized"
        );
        Ok(image)
    }

    // -- Helpers --------------------------------------------------------------

    fn dictionary(&self, id: ObjectId) -> Result<&Dictionary, ScribeError> {
        self.document
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|err| ScribeError::Pdf(format!("cannot read object {:?}: {}", id, err)))
    }

    /// Resolve a possibly indirect object.
    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Look up a page attribute, following `/Parent` for inheritable keys
    /// such as `/Resources` and `/MediaBox`.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut node = page;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = node.get(key) {
                return self.resolve(value);
            }
            let parent = node.get(b"Parent").ok().and_then(|p| self.resolve(p))?;
            node = parent.as_dict().ok()?;
        }
        None
    }

    fn media_box(&self, page: &Dictionary) -> Option<[f32; 4]> {
        let array = self.inherited(page, b"MediaBox")?.as_array().ok()?;
        if array.len() != 4 {
            return None;
        }
        let mut corners = [0f32; 4];
        for (slot, value) in corners.iter_mut().zip(array) {
            *slot = self.resolve(value)?.as_float().ok()?;
        }
        Some(corners)
    }

    /// Find the image XObject with the largest pixel area on the page.
    fn largest_page_image<'a>(
        &'a self,
        page: &'a Dictionary,
    ) -> Result<Option<&'a Stream>, ScribeError> {
        let Some(resources) = self.inherited(page, b"Resources").and_then(|r| r.as_dict().ok())
        else {
            return Ok(None);
        };
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|x| self.resolve(x))
            .and_then(|x| x.as_dict().ok())
        else {
            return Ok(None);
        };

        let mut best: Option<(u64, &Stream)> = None;
        for (name, entry) in xobjects.iter() {
            let Some(Object::Stream(stream)) = self.resolve(entry) else {
                continue;
            };
            if !is_name(&stream.dict, b"Subtype", b"Image") {
                continue;
            }
            if stream
                .dict
                .get(b"ImageMask")
                .and_then(Object::as_bool)
                .unwrap_or(false)
            {
                debug!(name = %String::from_utf8_lossy(name), "Skipping image mask");
                continue;
            }
            let width = int_entry(&stream.dict, b"Width").unwrap_or(0);
            let height = int_entry(&stream.dict, b"Height").unwrap_or(0);
            let area = width as u64 * height as u64;
            if best.is_none_or(|(best_area, _)| area > best_area) {
                best = Some((area, stream));
            }
        }

        Ok(best.map(|(_, stream)| stream))
    }
}

/// Opens PDF bytes as [`DocumentSource`]s for the pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfOpener;

impl DocumentOpener for PdfOpener {
    fn open(&self, name: &str, bytes: &[u8]) -> pagescribe_core::Result<Box<dyn DocumentSource>> {
        Ok(Box::new(PdfReader::from_bytes(name, bytes)?))
    }
}

impl DocumentSource for PdfReader {
    fn info(&self) -> &DocumentInfo {
        &self.info
    }

    fn page(&self, number: u32) -> pagescribe_core::Result<Box<dyn PageHandle + '_>> {
        self.page_id(number)?;
        Ok(Box::new(PdfPage {
            reader: self,
            number,
        }))
    }
}

/// A borrowed page of a [`PdfReader`].
pub struct PdfPage<'a> {
    reader: &'a PdfReader,
    number: u32,
}

impl PageHandle for PdfPage<'_> {
    fn text_layer(&self) -> pagescribe_core::Result<String> {
        self.reader.text_layer(self.number)
    }

    fn rasterize(&self, scale: f32) -> pagescribe_core::Result<image::DynamicImage> {
        self.reader.rasterize(self.number, scale)
    }
}

/// Pixel length of one page side at `scale`.
fn raster_extent(points: f32, scale: f32, page_number: u32) -> Result<u32, ScribeError> {
    let pixels = (points * scale).round();
    if !pixels.is_finite() || pixels > u32::MAX as f32 {
        return Err(ScribeError::Pdf(format!(
            "page {} has an unusable page box ({} points at scale {})",
            page_number, points, scale
        )));
    }
    Ok(pixels as u32)
}

// ---------------------------------------------------------------------------
// Image stream decoding
// ---------------------------------------------------------------------------

/// Decode an image XObject stream into a raster.
fn decode_image_stream(
    document: &Document,
    stream: &Stream,
) -> Result<RasterProcessor, ScribeError> {
    let filters = filter_names(document, &stream.dict);

    if filters.iter().any(|f| f == "DCTDecode") {
        return RasterProcessor::from_encoded(&stream.content);
    }
    if let Some(unsupported) = filters
        .iter()
        .find(|f| matches!(f.as_str(), "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode"))
    {
        return Err(ScribeError::Image(format!(
            "embedded image uses unsupported filter {}",
            unsupported
        )));
    }

    let samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream.decompressed_content().map_err(|err| {
            ScribeError::Image(format!("failed to decompress image stream: {}", err))
        })?
    };

    let width = int_entry(&stream.dict, b"Width").unwrap_or(0);
    let height = int_entry(&stream.dict, b"Height").unwrap_or(0);
    let bits = int_entry(&stream.dict, b"BitsPerComponent").unwrap_or(8);
    let layout = sample_layout(document, &stream.dict);

    let expected = width as usize * height as usize * layout.components();
    if bits == 8 && samples.len() < expected {
        warn!(expected, found = samples.len(), "Image stream shorter than declared");
    }

    RasterProcessor::from_samples(&samples, width, height, bits as u8, layout)
}

/// Names of the stream filters, whether given as a single name or an array.
fn filter_names(document: &Document, dict: &Dictionary) -> Vec<String> {
    let resolve = |obj: &Object| -> Option<Object> {
        match obj {
            Object::Reference(id) => document.get_object(*id).ok().cloned(),
            other => Some(other.clone()),
        }
    };
    let Some(filter) = dict.get(b"Filter").ok().and_then(resolve) else {
        return Vec::new();
    };
    match filter {
        Object::Name(name) => vec![String::from_utf8_lossy(&name).into_owned()],
        Object::Array(items) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}

/// Map a `/ColorSpace` entry to a sample layout.
///
/// ICC-based spaces are classified by their component count. Anything
/// unrecognised is treated as RGB.
fn sample_layout(document: &Document, dict: &Dictionary) -> SampleLayout {
    let resolve = |obj: &Object| -> Option<Object> {
        match obj {
            Object::Reference(id) => document.get_object(*id).ok().cloned(),
            other => Some(other.clone()),
        }
    };
    let Some(space) = dict.get(b"ColorSpace").ok().and_then(resolve) else {
        return SampleLayout::Gray;
    };
    match space {
        Object::Name(name) => layout_for_name(&name),
        Object::Array(items) => {
            let family = items.first().and_then(|f| f.as_name().ok()).unwrap_or(b"");
            if family == b"ICCBased" {
                let components = items
                    .get(1)
                    .and_then(resolve)
                    .and_then(|profile| match profile {
                        Object::Stream(s) => int_entry(&s.dict, b"N"),
                        _ => None,
                    })
                    .unwrap_or(3);
                match components {
                    1 => SampleLayout::Gray,
                    4 => SampleLayout::Cmyk,
                    _ => SampleLayout::Rgb,
                }
            } else {
                layout_for_name(family)
            }
        }
        _ => SampleLayout::Rgb,
    }
}

fn layout_for_name(name: &[u8]) -> SampleLayout {
    match name {
        b"DeviceGray" | b"CalGray" | b"G" => SampleLayout::Gray,
        b"DeviceCMYK" | b"CMYK" => SampleLayout::Cmyk,
        _ => SampleLayout::Rgb,
    }
}

fn int_entry(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
}

fn is_name(dict: &Dictionary, key: &[u8], expected: &[u8]) -> bool {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_name().ok())
        .is_some_and(|name| name == expected)
}

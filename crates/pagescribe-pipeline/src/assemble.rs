// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page assembly: joins per-page results into one document text with a
// header line per page.

use pagescribe_core::PageResult;

/// Header line for a page: `=== Page N ===`, or `=== Page N (OCR) ===` when
/// the text came from recognition.
pub fn page_header(page: &PageResult) -> String {
    if page.recognized {
        format!("=== Page {} (OCR) ===", page.page_number)
    } else {
        format!("=== Page {} ===", page.page_number)
    }
}

/// One `header\ntext\n` block per page, blocks separated by a newline.
pub fn assemble(pages: &[PageResult]) -> String {
    pages
        .iter()
        .map(|page| format!("{}\n{}\n", page_header(page), page.text))
        .collect::<Vec<_>>()
        .join("\n")
}

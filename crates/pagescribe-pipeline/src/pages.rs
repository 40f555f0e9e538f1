// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page range expressions: "1-3,5,8".
//
// Parsing is strict: a token must be a whole integer or a single `a-b` pair.
// Partially numeric tokens such as "3abc" or "1-2-3" are dropped entirely
// rather than read up to the first non-digit.

use std::collections::BTreeSet;

/// Parse a page range expression against a document of `total` pages.
///
/// Tokens are comma-separated integers or inclusive `a-b` ranges. Ranges are
/// clamped to `1..=total`, single pages outside it are dropped, and tokens
/// that do not parse are ignored. The result is ascending and unique; it is
/// empty when nothing valid remains.
pub fn parse_pages(expression: &str, total: u32) -> Vec<u32> {
    let mut pages = BTreeSet::new();
    let total = i64::from(total);

    for token in expression.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((start, end)) = token.split_once('-') {
            let (Ok(start), Ok(end)) = (start.trim().parse::<i64>(), end.trim().parse::<i64>())
            else {
                continue;
            };
            for page in start.max(1)..=end.min(total) {
                pages.insert(page as u32);
            }
        } else if let Ok(page) = token.parse::<i64>() {
            if (1..=total).contains(&page) {
                pages.insert(page as u32);
            }
        }
    }

    pages.into_iter().collect()
}

/// Like [`parse_pages`], but an empty result selects every page.
pub fn resolve_pages(expression: &str, total: u32) -> Vec<u32> {
    let pages = parse_pages(expression, total);
    if pages.is_empty() {
        (1..=total).collect()
    } else {
        pages
    }
}

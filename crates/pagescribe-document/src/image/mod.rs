// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decoding embedded page images and scaling page rasters.

pub mod processor;

pub use processor::{RasterProcessor, SampleLayout};

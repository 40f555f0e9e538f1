// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagescribe — Core types, error definitions, configuration, and the boundary
// traits shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod traits;
pub mod types;

pub use config::{JobSettings, ReconstructionOptions, ScribeConfig};
pub use error::{Result, ScribeError};
pub use types::*;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer between the command line and the pipeline crates.

pub mod config_dir;
pub mod config_store;
pub mod output;
pub mod runner;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Loading of the persistent JSON configuration.

use std::io::ErrorKind;
use std::path::Path;

use pagescribe_core::error::{Result, ScribeError};
use pagescribe_core::ScribeConfig;
use tracing::{debug, info, warn};

use super::config_dir::config_path;

/// Load the configuration.
///
/// An explicitly named file must exist and parse. The default file is
/// optional: when it is missing or broken the defaults are used.
pub fn load_config(explicit: Option<&Path>) -> Result<ScribeConfig> {
    match explicit {
        Some(path) => load_required(path),
        None => Ok(load_optional(&config_path())),
    }
}

fn load_required(path: &Path) -> Result<ScribeConfig> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        ScribeError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
    })?;
    let config = ScribeConfig::from_json(&data).map_err(|e| {
        ScribeError::InvalidConfig(format!("{}: {e}", path.display()))
    })?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

fn load_optional(path: &Path) -> ScribeConfig {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return ScribeConfig::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Configuration unreadable, using defaults");
            return ScribeConfig::default();
        }
    };
    match ScribeConfig::from_json(&data) {
        Ok(config) => {
            info!(path = %path.display(), "Loaded configuration");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Configuration invalid, using defaults");
            ScribeConfig::default()
        }
    }
}

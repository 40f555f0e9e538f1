// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration directory resolution.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "pagescribe";
const CONFIG_FILE: &str = "config.json";

/// Directory holding the user's configuration. Nothing is created.
pub fn config_dir() -> PathBuf {
    config_dir_from(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

/// Default location of the configuration file.
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

fn config_dir_from(xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    // XDG requires an absolute path; relative values are ignored.
    let base = match (xdg, home) {
        (Some(xdg), _) if xdg.is_absolute() => xdg,
        (_, Some(home)) => home.join(".config"),
        _ => Path::new("/tmp").to_path_buf(),
    };
    base.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_config_home_wins() {
        let dir = config_dir_from(Some("/xdg".into()), Some("/home/ada".into()));
        assert_eq!(dir, PathBuf::from("/xdg/pagescribe"));
    }

    #[test]
    fn relative_xdg_falls_back_to_home() {
        let dir = config_dir_from(Some("relative".into()), Some("/home/ada".into()));
        assert_eq!(dir, PathBuf::from("/home/ada/.config/pagescribe"));
    }

    #[test]
    fn last_resort_is_tmp() {
        assert_eq!(config_dir_from(None, None), PathBuf::from("/tmp/pagescribe"));
    }
}

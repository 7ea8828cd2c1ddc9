// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "scancrop";

/// Application data directory. Not created here; writers create it on demand.
pub fn data_dir() -> PathBuf {
    base_dir().join(APP_DIR)
}

/// Default location of the settings file.
pub fn default_settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

fn base_dir() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort: next to wherever we were started
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_live_in_the_app_dir() {
        let path = default_settings_path();
        assert!(path.ends_with("scancrop/settings.json"));
    }
}

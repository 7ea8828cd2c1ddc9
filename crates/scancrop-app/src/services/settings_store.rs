// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings persistence for the command-line front end.
//
// Settings are read once at startup and the whole record is written back when
// the command finishes, whether or not it succeeded.

use std::path::{Path, PathBuf};

use scancrop_core::Settings;
use scancrop_core::error::Result;
use tracing::info;

use super::data_dir;

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at `path`, or at the default data-dir location.
    pub fn open(path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(data_dir::default_settings_path);
        info!(path = %path.display(), "Using settings file");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored settings; defaults if the file is missing or unreadable.
    pub fn load(&self) -> Settings {
        Settings::load(&self.path)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.save(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(Some(dir.path().join("s.json")));
        assert_eq!(store.load(), Settings::default());

        let mut settings = Settings::default();
        settings.custom_prefix = "crop".into();
        settings.threshold = 64;
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `scancrop settings`

use scancrop_core::Settings;
use scancrop_core::error::Result;

use crate::services::settings_store::SettingsStore;

pub fn run(settings: &mut Settings, store: &SettingsStore, reset: bool) -> Result<()> {
    if reset {
        *settings = Settings::default();
        println!("Settings reset to defaults.");
    }
    println!("{}", store.path().display());
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers. Each takes the loaded settings, applies any overrides the
// operator gave (they are remembered), and does its work.

pub mod calibrate;
pub mod list;
pub mod preview;
pub mod process;
pub mod settings;

use scancrop_core::Settings;

use crate::cli::{InputArgs, ParamArgs};

/// Remember `--input` if given. A different folder starts at its first image.
pub fn apply_input(settings: &mut Settings, input: &InputArgs) {
    if let Some(folder) = &input.folder {
        if *folder != settings.input_folder {
            settings.current_index = 0;
        }
        settings.input_folder = folder.clone();
    }
}

/// Remember `--threshold` / `--margin` if given.
pub fn apply_params(settings: &mut Settings, params: &ParamArgs) {
    if let Some(threshold) = params.threshold {
        settings.threshold = threshold;
    }
    if let Some(margin) = params.margin {
        settings.margin = margin;
    }
}

/// File name for display, falling back to the full path.
pub fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One-line progress indicator on stderr, overwritten in place.
pub fn print_progress(label: &str, done: usize, total: usize) {
    eprint!("\r{label}: {done}/{total}");
    if done == total {
        eprintln!();
    }
}

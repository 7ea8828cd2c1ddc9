// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `scancrop list`

use scancrop_core::Settings;
use scancrop_core::error::{Result, ScanCropError};
use scancrop_imaging::ImageSource;

use super::{apply_input, display_name};
use crate::cli::InputArgs;

pub fn run(settings: &mut Settings, input: &InputArgs) -> Result<()> {
    apply_input(settings, input);
    let folder = settings
        .input_folder()
        .ok_or(ScanCropError::MissingFolder("input"))?;
    let source = ImageSource::scan_non_empty(folder)?;

    for (index, path) in source.paths().iter().enumerate() {
        println!("{index:>5}  {}", display_name(path));
    }
    println!("{} images in {}", source.len(), source.folder().display());
    Ok(())
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persisted operator settings (settings.json).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{Result, ScanCropError};
use crate::types::{CropParameters, OutputFormat, OutputSpec};

/// Persistent settings record.
///
/// Every key is optional on disk; absent keys take their defaults. Numeric
/// keys are rounded and clamped into range, and a key of the wrong type falls
/// back to its own default without discarding the rest. Empty folder strings
/// mean "not selected".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last used input folder.
    pub input_folder: PathBuf,
    /// Last used output folder.
    pub output_folder: PathBuf,
    /// Brightness threshold (0-255).
    #[serde(deserialize_with = "deserialize_threshold")]
    pub threshold: u8,
    /// Margin in pixels around the detected object.
    #[serde(deserialize_with = "deserialize_margin")]
    pub margin: u32,
    /// Prefix prepended (with `_`) to output file names.
    pub custom_prefix: String,
    /// Output encoding.
    #[serde(deserialize_with = "deserialize_output_format")]
    pub output_format: OutputFormat,
    /// Index of the image last previewed in `input_folder`.
    #[serde(deserialize_with = "deserialize_index")]
    pub current_index: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let params = CropParameters::default();
        Self {
            input_folder: PathBuf::new(),
            output_folder: PathBuf::new(),
            threshold: params.threshold,
            margin: params.margin,
            custom_prefix: String::new(),
            output_format: OutputFormat::Original,
            current_index: 0,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults.
    ///
    /// A missing file is normal on first launch. An unreadable or corrupt file
    /// is logged and otherwise ignored.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path.as_ref()) {
            Ok(Some(settings)) => {
                debug!("Settings loaded");
                settings
            }
            Ok(None) => {
                info!("No settings file yet, using defaults");
                Self::default()
            }
            Err(err) => {
                error!(error = %err, "Settings file unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from `path`, returning `Ok(None)` when the file does not
    /// exist.
    pub fn try_load(path: &Path) -> Result<Option<Self>> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    /// Write the whole record to `path`, replacing any previous contents.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!("Settings saved");
        Ok(())
    }

    /// Selected input folder, if any.
    pub fn input_folder(&self) -> Option<&Path> {
        non_empty(&self.input_folder)
    }

    /// Selected output folder, if any.
    pub fn output_folder(&self) -> Option<&Path> {
        non_empty(&self.output_folder)
    }

    pub fn crop_parameters(&self) -> CropParameters {
        CropParameters::new(self.threshold, self.margin)
    }

    /// Output naming and location, or `MissingFolder` if no output folder is set.
    pub fn output_spec(&self) -> Result<OutputSpec> {
        let folder = self
            .output_folder()
            .ok_or(ScanCropError::MissingFolder("output"))?;
        Ok(OutputSpec::new(
            folder,
            self.custom_prefix.as_str(),
            self.output_format,
        ))
    }
}

fn non_empty(path: &Path) -> Option<&Path> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Accept any number and clamp it into 0-255.
fn deserialize_threshold<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = clamped_number(deserializer, "threshold", u8::MAX as f64)?;
    Ok(value.map_or(CropParameters::default().threshold, |v| v as u8))
}

fn deserialize_margin<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = clamped_number(deserializer, "margin", u32::MAX as f64)?;
    Ok(value.map_or(CropParameters::default().margin, |v| v as u32))
}

fn deserialize_index<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = clamped_number(deserializer, "current_index", u32::MAX as f64)?;
    Ok(value.map_or(0, |v| v as usize))
}

fn deserialize_output_format<'de, D>(deserializer: D) -> std::result::Result<OutputFormat, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value(value.clone()) {
        Ok(format) => Ok(format),
        Err(_) => {
            warn!(%value, "Unknown output_format in settings, using Original");
            Ok(OutputFormat::Original)
        }
    }
}

/// Any JSON number, rounded and clamped into `0..=max`. `None` (logged) for
/// values that are not numbers.
fn clamped_number<'de, D>(
    deserializer: D,
    key: &str,
    max: f64,
) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value.as_f64() {
        Some(number) => Ok(Some(number.round().clamp(0.0, max))),
        None => {
            warn!(key, %value, "Ignoring non-numeric setting");
            Ok(None)
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `scancrop process` — single image or whole-folder batch export.

use std::path::PathBuf;

use scancrop_core::Settings;
use scancrop_core::error::{Result, ScanCropError};
use scancrop_core::types::OutputFormat;
use scancrop_imaging::batch::{BatchSummary, FileOutcome};
use scancrop_imaging::{BatchJob, process_image};
use tracing::warn;

use super::{apply_input, apply_params, display_name};
use crate::cli::{InputArgs, ParamArgs};
use crate::state::Session;

/// Output-related overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct OutputArgs {
    pub folder: Option<PathBuf>,
    pub prefix: Option<String>,
    pub format: Option<OutputFormat>,
}

/// What a `process` run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Single(PathBuf),
    Batch(BatchSummary),
}

pub async fn run(
    settings: &mut Settings,
    input: &InputArgs,
    output: OutputArgs,
    params: &ParamArgs,
    index: Option<usize>,
) -> Result<ProcessOutcome> {
    apply_input(settings, input);
    apply_params(settings, params);
    if let Some(folder) = output.folder {
        settings.output_folder = folder;
    }
    if let Some(prefix) = output.prefix {
        settings.custom_prefix = prefix.trim().to_owned();
    }
    if let Some(format) = output.format {
        settings.output_format = format;
    }

    // Both folders must be chosen before anything starts.
    if settings.input_folder().is_none() {
        return Err(ScanCropError::MissingFolder("input"));
    }
    let spec = settings.output_spec()?;
    let mut session = Session::from_settings(settings)?;

    if let Some(index) = index {
        session.go_to(index);
        settings.current_index = session.index();
        let written = process_image(session.current_path()?, &session.params, &spec)?;
        println!("Saved cropped image to {}", written.display());
        return Ok(ProcessOutcome::Single(written));
    }

    let handle = BatchJob::new(session.source(), session.params, spec).spawn();

    let cancel = handle.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current image");
            cancel.cancel();
        }
    });

    let result = handle
        .finish(|progress| {
            let status = match &progress.report.outcome {
                FileOutcome::Written(_) => "ok".to_owned(),
                FileOutcome::NoBrightObject => "skipped, no bright object".to_owned(),
                FileOutcome::Failed(reason) => format!("failed: {reason}"),
            };
            eprintln!(
                "[{}/{}] {}: {status}",
                progress.done,
                progress.total,
                display_name(&progress.report.source)
            );
        })
        .await;
    interrupt.abort();
    let summary = result?;

    if summary.cancelled {
        println!(
            "Processing cancelled after {} of {} images.",
            summary.attempted(),
            summary.total
        );
    } else {
        println!("Processing complete. {} images processed.", summary.processed());
    }
    if summary.skipped > 0 || summary.failed > 0 {
        println!(
            "  {} skipped (no bright object), {} failed.",
            summary.skipped, summary.failed
        );
    }
    Ok(ProcessOutcome::Batch(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn scans() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in ["one.png", "two.tif"] {
            let mut img = GrayImage::from_pixel(40, 30, Luma([10u8]));
            for y in 5..15 {
                for x in 5..25 {
                    img.put_pixel(x, y, Luma([250u8]));
                }
            }
            img.save(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("three.jpg"), b"not a jpeg").unwrap();
        dir
    }

    fn params() -> ParamArgs {
        ParamArgs {
            threshold: Some(128),
            margin: Some(1),
        }
    }

    #[tokio::test]
    async fn batch_writes_and_remembers_output_settings() {
        let input = scans();
        let out = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();

        let outcome = run(
            &mut settings,
            &InputArgs {
                folder: Some(input.path().to_path_buf()),
            },
            OutputArgs {
                folder: Some(out.path().to_path_buf()),
                prefix: Some(" crop ".into()),
                format: Some(OutputFormat::Png),
            },
            &params(),
            None,
        )
        .await
        .unwrap();

        let ProcessOutcome::Batch(summary) = outcome else {
            panic!("expected a batch run");
        };
        assert_eq!((summary.total, summary.written, summary.failed), (3, 2, 1));
        assert!(out.path().join("crop_one.png").exists());
        assert!(out.path().join("crop_two.png").exists());
        assert_eq!(settings.custom_prefix, "crop");
        assert_eq!(settings.output_format, OutputFormat::Png);
        assert_eq!(settings.margin, 1);
    }

    #[tokio::test]
    async fn single_index_keeps_original_extension() {
        let input = scans();
        let out = tempfile::tempdir().unwrap();
        let mut settings = Settings {
            input_folder: input.path().to_path_buf(),
            output_folder: out.path().to_path_buf(),
            ..Settings::default()
        };

        // Sorted: one.png, three.jpg, two.tif
        let outcome = run(
            &mut settings,
            &InputArgs { folder: None },
            OutputArgs::default(),
            &params(),
            Some(2),
        )
        .await
        .unwrap();
        assert_eq!(outcome, ProcessOutcome::Single(out.path().join("two.tif")));
    }

    #[tokio::test]
    async fn missing_folders_stop_before_any_work() {
        let mut settings = Settings::default();
        let err = run(
            &mut settings,
            &InputArgs { folder: None },
            OutputArgs::default(),
            &params(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScanCropError::MissingFolder("input")));

        let input = scans();
        settings.input_folder = input.path().to_path_buf();
        let err = run(
            &mut settings,
            &InputArgs { folder: None },
            OutputArgs::default(),
            &params(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScanCropError::MissingFolder("output")));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch export — crop every image of a folder into the output folder.
//
// A batch runs synchronously via `BatchJob::run`, or on tokio's blocking pool
// via `BatchJob::spawn`, which streams progress over an mpsc channel and ends
// with exactly one terminal event.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scancrop_core::error::{Result, ScanCropError};
use scancrop_core::types::{CropParameters, OutputSpec};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::crop::engine::crop_rect_for;
use crate::raster::ImageProcessor;
use crate::source::ImageSource;

/// Crop a single image and write it to the output folder.
///
/// Unlike a batch, a missing bright object is an error here.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn process_image(path: &Path, params: &CropParameters, output: &OutputSpec) -> Result<PathBuf> {
    std::fs::create_dir_all(&output.output_folder)?;
    crop_one(path, params, output)?.ok_or_else(|| ScanCropError::NoBrightObject(path.to_path_buf()))
}

/// `Ok(None)` when the image has no bright object.
fn crop_one(path: &Path, params: &CropParameters, output: &OutputSpec) -> Result<Option<PathBuf>> {
    let processor = ImageProcessor::open(path)?;
    let Some(rect) = crop_rect_for(processor.as_dynamic(), params) else {
        return Ok(None);
    };
    let out_path = output.output_path_for(path)?;
    processor.crop(rect).save(&out_path)?;
    Ok(Some(out_path))
}

// -- Reports ------------------------------------------------------------------

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Cropped image written to this path.
    Written(PathBuf),
    /// No region brighter than the threshold; nothing written.
    NoBrightObject,
    /// Decode or write failure.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub source: PathBuf,
    pub outcome: FileOutcome,
}

/// Emitted after every attempted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Files attempted so far.
    pub done: usize,
    pub total: usize,
    pub report: FileReport,
}

/// Final tally of a batch.
///
/// `total` is the number of images in the job; `written + skipped + failed`
/// is the number attempted, which is less than `total` only when cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    /// Images successfully cropped and written.
    pub fn processed(&self) -> usize {
        self.written
    }

    pub fn attempted(&self) -> usize {
        self.reports.len()
    }

    fn record(&mut self, report: FileReport) {
        match report.outcome {
            FileOutcome::Written(_) => self.written += 1,
            FileOutcome::NoBrightObject => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
        self.reports.push(report);
    }
}

// -- Cancellation -------------------------------------------------------------

/// Shared stop flag, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// -- Job ----------------------------------------------------------------------

/// Everything a batch needs, owned so it can move to a worker thread.
#[derive(Debug, Clone)]
pub struct BatchJob {
    paths: Vec<PathBuf>,
    params: CropParameters,
    output: OutputSpec,
}

impl BatchJob {
    pub fn new(source: &ImageSource, params: CropParameters, output: OutputSpec) -> Self {
        Self::from_paths(source.paths().to_vec(), params, output)
    }

    pub fn from_paths(paths: Vec<PathBuf>, params: CropParameters, output: OutputSpec) -> Self {
        Self {
            paths,
            params,
            output,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Process every path in order on the current thread.
    ///
    /// Per-file problems are recorded in the summary and never stop the
    /// batch. The only error is failing to create the output folder.
    #[instrument(skip_all, fields(
        total = self.paths.len(),
        output = %self.output.output_folder.display(),
        threshold = self.params.threshold,
        margin = self.params.margin,
    ))]
    pub fn run(
        &self,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> Result<BatchSummary> {
        std::fs::create_dir_all(&self.output.output_folder)?;

        let total = self.paths.len();
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        info!("Batch started");

        for (i, path) in self.paths.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(done = i, "Batch cancelled");
                summary.cancelled = true;
                break;
            }

            let outcome = match crop_one(path, &self.params, &self.output) {
                Ok(Some(out_path)) => {
                    debug!(source = %path.display(), output = %out_path.display(), "Cropped");
                    FileOutcome::Written(out_path)
                }
                Ok(None) => {
                    warn!(source = %path.display(), "No bright object, skipping");
                    FileOutcome::NoBrightObject
                }
                Err(err) => {
                    error!(source = %path.display(), error = %err, "Failed to process image");
                    FileOutcome::Failed(err.to_string())
                }
            };

            let report = FileReport {
                source: path.clone(),
                outcome,
            };
            on_progress(&BatchProgress {
                done: i + 1,
                total,
                report: report.clone(),
            });
            summary.record(report);
        }

        info!(
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "Batch finished"
        );
        Ok(summary)
    }

    /// Run the batch on tokio's blocking pool. Must be called from within a
    /// tokio runtime.
    pub fn spawn(self) -> BatchHandle {
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let worker_cancel = cancel.clone();

        let task = tokio::task::spawn_blocking(move || {
            let progress_tx = tx.clone();
            let result = self.run(&worker_cancel, |progress| {
                // The receiver may already be gone; the batch still completes.
                let _ = progress_tx.send(BatchEvent::Progress(progress.clone()));
            });
            let terminal = match result {
                Ok(summary) => BatchEvent::Finished(summary),
                Err(err) => BatchEvent::Failed(err.to_string()),
            };
            let _ = tx.send(terminal);
        });

        BatchHandle {
            cancel,
            events: rx,
            task,
        }
    }
}

// -- Background handle ----------------------------------------------------------

/// Messages from a spawned batch. Exactly one of `Finished` or `Failed` is
/// sent, always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Progress(BatchProgress),
    Finished(BatchSummary),
    Failed(String),
}

/// Owner-side view of a spawned batch.
#[derive(Debug)]
pub struct BatchHandle {
    cancel: CancelToken,
    events: mpsc::UnboundedReceiver<BatchEvent>,
    task: JoinHandle<()>,
}

impl BatchHandle {
    /// Ask the worker to stop after the file it is currently processing.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next event, or `None` once the worker has exited and all events were
    /// received.
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Drain events until the terminal one, forwarding progress.
    pub async fn finish(mut self, mut on_progress: impl FnMut(&BatchProgress)) -> Result<BatchSummary> {
        while let Some(event) = self.events.recv().await {
            match event {
                BatchEvent::Progress(progress) => on_progress(&progress),
                BatchEvent::Finished(summary) => return Ok(summary),
                BatchEvent::Failed(reason) => return Err(ScanCropError::WorkerFailed(reason)),
            }
        }
        // Channel closed without a terminal event: the worker panicked.
        match self.task.await {
            Err(join_err) => Err(ScanCropError::WorkerFailed(join_err.to_string())),
            Ok(()) => Err(ScanCropError::WorkerFailed(
                "worker exited without a result".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use scancrop_core::types::OutputFormat;

    /// Dark image with a bright 20x10 block at (10, 10).
    fn write_scan(path: &Path) {
        let mut img = GrayImage::from_pixel(50, 40, Luma([15u8]));
        for y in 10..20 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([240u8]));
            }
        }
        img.save(path).unwrap();
    }

    fn params() -> CropParameters {
        CropParameters::new(128, 2)
    }

    #[test]
    fn broken_file_does_not_stop_the_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_scan(&input.path().join("a.png"));
        std::fs::write(input.path().join("b.png"), b"garbage").unwrap();
        write_scan(&input.path().join("c.png"));

        let source = ImageSource::scan(input.path()).unwrap();
        let job = BatchJob::new(
            &source,
            params(),
            OutputSpec::new(output.path(), "", OutputFormat::Original),
        );
        let mut seen = Vec::new();
        let summary = job
            .run(&CancelToken::new(), |p| seen.push((p.done, p.total)))
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 0);
        assert!(!summary.cancelled);
        assert_eq!(seen, [(1, 3), (2, 3), (3, 3)]);
        assert!(matches!(summary.reports[1].outcome, FileOutcome::Failed(_)));

        let written = ImageSource::scan(output.path()).unwrap();
        assert_eq!(written.len(), 2);
        let cropped = ImageProcessor::open(output.path().join("a.png")).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (24, 14));
    }

    #[test]
    fn dark_images_are_skipped() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        GrayImage::from_pixel(10, 10, Luma([5u8]))
            .save(input.path().join("dark.png"))
            .unwrap();

        let job = BatchJob::from_paths(
            vec![input.path().join("dark.png")],
            params(),
            OutputSpec::new(output.path(), "", OutputFormat::Original),
        );
        let summary = job.run(&CancelToken::new(), |_| {}).unwrap();
        assert_eq!((summary.written, summary.skipped, summary.failed), (0, 1, 0));
        assert!(ImageSource::scan(output.path()).unwrap().is_empty());
    }

    #[test]
    fn output_format_controls_extension() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let src = input.path().join("page.tif");
        write_scan(&src);

        let kept = process_image(
            &src,
            &params(),
            &OutputSpec::new(output.path(), "", OutputFormat::Original),
        )
        .unwrap();
        assert_eq!(kept, output.path().join("page.tif"));

        let png = process_image(
            &src,
            &params(),
            &OutputSpec::new(output.path(), "", OutputFormat::Png),
        )
        .unwrap();
        assert_eq!(png, output.path().join("page.png"));
        assert!(png.exists());

        let jpg = process_image(
            &src,
            &params(),
            &OutputSpec::new(output.path(), "", OutputFormat::Jpg),
        )
        .unwrap();
        assert!(ImageProcessor::open(&jpg).is_ok());
    }

    #[test]
    fn prefix_and_missing_output_folder() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let nested = output.path().join("crops").join("run1");
        let src = input.path().join("scan_01.png");
        write_scan(&src);

        let out = process_image(
            &src,
            &params(),
            &OutputSpec::new(&nested, "  cropped ", OutputFormat::Original),
        )
        .unwrap();
        assert_eq!(out, nested.join("cropped_scan_01.png"));
        assert!(out.exists());
    }

    #[test]
    fn single_image_without_object_is_an_error() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let src = input.path().join("black.png");
        GrayImage::new(10, 10).save(&src).unwrap();

        let result = process_image(
            &src,
            &params(),
            &OutputSpec::new(output.path(), "", OutputFormat::Original),
        );
        assert!(matches!(result, Err(ScanCropError::NoBrightObject(p)) if p == src));
    }

    #[test]
    fn cancel_stops_between_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_scan(&input.path().join(name));
        }
        let source = ImageSource::scan(input.path()).unwrap();
        let job = BatchJob::new(
            &source,
            params(),
            OutputSpec::new(output.path(), "", OutputFormat::Original),
        );

        let cancel = CancelToken::new();
        let summary = job
            .run(&cancel, |p| {
                if p.done == 1 {
                    cancel.cancel();
                }
            })
            .unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.attempted(), 1);
        assert_eq!(summary.total, 3);
    }

    #[tokio::test]
    async fn spawned_batch_streams_progress_then_finishes() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_scan(&input.path().join("a.png"));
        write_scan(&input.path().join("b.png"));

        let source = ImageSource::scan(input.path()).unwrap();
        let handle = BatchJob::new(
            &source,
            params(),
            OutputSpec::new(output.path(), "x", OutputFormat::Png),
        )
        .spawn();

        let mut progress = Vec::new();
        let summary = handle.finish(|p| progress.push(p.done)).await.unwrap();
        assert_eq!(progress, [1, 2]);
        assert_eq!(summary.written, 2);
        assert!(output.path().join("x_a.png").exists());
    }

    #[tokio::test]
    async fn spawned_batch_reports_failure_as_terminal_event() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the output folder should be.
        let blocker = dir.path().join("out");
        std::fs::write(&blocker, b"").unwrap();

        let mut handle = BatchJob::from_paths(
            vec![dir.path().join("a.png")],
            params(),
            OutputSpec::new(&blocker, "", OutputFormat::Original),
        )
        .spawn();

        let event = handle.next_event().await;
        assert!(matches!(event, Some(BatchEvent::Failed(_))));
        assert_eq!(handle.next_event().await, None);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use scancrop_core::types::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "scancrop")]
#[command(version, about = "Auto-crop bright objects out of folders of scans", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to $XDG_DATA_HOME/scancrop/settings.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the images of the input folder with their indices
    List {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show the crop rectangle for one image
    Preview {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        select: SelectArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Write the image with the crop outlined in green
        #[arg(long, value_name = "FILE")]
        overlay: Option<PathBuf>,
    },

    /// Set the threshold from the mean brightness of a region
    Sample {
        #[command(flatten)]
        input: InputArgs,

        /// Image index (clamped to the folder); defaults to the current image
        #[arg(short, long, value_name = "N")]
        index: Option<usize>,

        /// Region in source pixels
        #[arg(long, value_name = "X,Y,W,H", value_parser = parse_region, conflicts_with = "drag", required_unless_present = "drag")]
        region: Option<[f64; 4]>,

        /// Pointer drag on a 600x400 preview canvas fitted to the image
        #[arg(long, value_name = "X1,Y1,X2,Y2", value_parser = parse_region)]
        drag: Option<[f64; 4]>,

        /// Preview zoom to use instead of the fitted zoom (with --drag)
        #[arg(long, value_name = "Z", requires = "drag")]
        zoom: Option<f64>,

        /// Preview pan offset in canvas pixels (with --drag)
        #[arg(long, value_name = "DX,DY", value_parser = parse_pair, requires = "drag", allow_hyphen_values = true)]
        pan: Option<(f64, f64)>,
    },

    /// Find the darkest image of the folder
    Darkest {
        #[command(flatten)]
        input: InputArgs,

        /// Immediately sample this region (source pixels) of the darkest image
        #[arg(long, value_name = "X,Y,W,H", value_parser = parse_region)]
        sample: Option<[f64; 4]>,
    },

    /// Crop every image (or one) into the output folder
    Process {
        #[command(flatten)]
        input: InputArgs,

        /// Output folder (remembered)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// File name prefix (remembered; empty string clears it)
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,

        /// Output format: Original, TIFF, PNG or JPG (remembered)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,

        #[command(flatten)]
        params: ParamArgs,

        /// Only process the image with this index
        #[arg(short, long, value_name = "N")]
        index: Option<usize>,
    },

    /// Print the stored settings
    Settings {
        /// Restore the defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Input folder (remembered for the next run)
    #[arg(short = 'I', long = "input", value_name = "DIR")]
    pub folder: Option<PathBuf>,
}

/// Which image to show. Without any of these the current image is used.
#[derive(Debug, Clone, Default, Args)]
#[group(multiple = false)]
pub struct SelectArgs {
    /// Image index (clamped to the folder)
    #[arg(short, long, value_name = "N")]
    pub index: Option<usize>,

    /// Use the darkest image of the folder
    #[arg(long)]
    pub darkest: bool,

    /// Next image
    #[arg(long)]
    pub next: bool,

    /// Previous image
    #[arg(long)]
    pub prev: bool,

    /// Ten images forward
    #[arg(long)]
    pub skip_forward: bool,

    /// Ten images back
    #[arg(long)]
    pub skip_back: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ParamArgs {
    /// Brightness threshold 0-255 (remembered)
    #[arg(short, long, value_name = "T")]
    pub threshold: Option<u8>,

    /// Margin in pixels (remembered)
    #[arg(short, long, value_name = "M")]
    pub margin: Option<u32>,
}

/// Parse `a,b,c,d` into four numbers.
pub fn parse_region(s: &str) -> Result<[f64; 4], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 {
        return Err(format!("expected four comma-separated numbers, got: {s}"));
    }
    let mut values = [0.0; 4];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = parse_number(part)?;
    }
    Ok(values)
}

/// Parse `a,b` into two numbers.
pub fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    match s.split_once(',') {
        Some((a, b)) => Ok((parse_number(a)?, parse_number(b)?)),
        None => Err(format!("expected two comma-separated numbers, got: {s}")),
    }
}

fn parse_number(part: &str) -> Result<f64, String> {
    let value = part
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid number: {part}"))?;
    if !value.is_finite() {
        return Err(format!("invalid number: {part}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_regions_and_pairs() {
        assert_eq!(parse_region("1, 2,3.5,4").unwrap(), [1.0, 2.0, 3.5, 4.0]);
        assert!(parse_region("1,2,3").is_err());
        assert!(parse_region("1,2,x,4").is_err());
        assert!(parse_region("1,2,inf,4").is_err());
        assert_eq!(parse_pair("-10,5").unwrap(), (-10.0, 5.0));
        assert!(parse_pair("10").is_err());
    }

    #[test]
    fn sample_needs_region_or_drag() {
        assert!(Cli::try_parse_from(["scancrop", "sample"]).is_err());
        assert!(
            Cli::try_parse_from(["scancrop", "sample", "--region", "0,0,5,5", "--drag", "0,0,5,5"])
                .is_err()
        );
        let cli = Cli::try_parse_from(["scancrop", "sample", "--drag", "10,10,50,40", "--zoom", "2"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Sample { zoom: Some(z), .. } if z == 2.0));
    }

    #[test]
    fn process_accepts_format_names() {
        let cli = Cli::try_parse_from([
            "scancrop", "--settings", "/tmp/s.json", "process", "--format", "png", "-t", "90",
        ])
        .unwrap();
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Commands::Process { format, params, .. } => {
                assert_eq!(format, Some(OutputFormat::Png));
                assert_eq!(params.threshold, Some(90));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["scancrop", "process", "--format", "gif"]).is_err());
        assert!(Cli::try_parse_from(["scancrop", "process", "-t", "300"]).is_err());
    }

    #[test]
    fn preview_selections_are_exclusive() {
        assert!(Cli::try_parse_from(["scancrop", "preview", "--index", "2", "--darkest"]).is_err());
        assert!(Cli::try_parse_from(["scancrop", "preview", "--next", "--prev"]).is_err());
        let cli = Cli::try_parse_from(["scancrop", "preview", "--skip-back"]).unwrap();
        match cli.command {
            Commands::Preview { select, .. } => {
                assert!(select.skip_back);
                assert!(!select.next && select.index.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

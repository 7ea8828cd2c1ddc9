// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scancrop — auto-crop bright objects out of folders of scans.
//
// Entry point. Initialises logging, loads the stored settings, runs one
// command and writes the settings back.

mod cli;
mod commands;
mod services;
mod state;

use std::process::ExitCode;

use clap::Parser;
use scancrop_core::Settings;
use scancrop_core::error::{Result, ScanCropError};
use scancrop_core::human_errors::{Severity, humanize_error};

use cli::{Cli, Commands};
use commands::calibrate::RegionInput;
use commands::process::OutputArgs;
use services::settings_store::SettingsStore;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "Scancrop starting");

    let store = SettingsStore::open(cli.settings.clone());
    let mut settings = store.load();

    let result = dispatch(cli.command, &mut settings, &store).await;

    // Settings are written back on every exit path.
    if let Err(err) = store.save(&settings) {
        tracing::error!(error = %err, "Failed to save settings");
        report(&err);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "Command failed");
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Commands, settings: &mut Settings, store: &SettingsStore) -> Result<()> {
    match command {
        Commands::List { input } => commands::list::run(settings, &input),

        Commands::Preview {
            input,
            select,
            params,
            overlay,
        } => commands::preview::run(settings, &input, &select, &params, overlay.as_deref())
            .map(|_| ()),

        Commands::Sample {
            input,
            index,
            region,
            drag,
            zoom,
            pan,
        } => {
            let region = match (region, drag) {
                (Some(region), _) => RegionInput::Source(region),
                (None, Some(corners)) => RegionInput::Drag { corners, zoom, pan },
                (None, None) => {
                    return Err(ScanCropError::InvalidArgument(
                        "give either --region or --drag".into(),
                    ));
                }
            };
            commands::calibrate::run_sample(settings, &input, index, region).map(|_| ())
        }

        Commands::Darkest { input, sample } => {
            commands::calibrate::run_darkest(settings, &input, sample).map(|_| ())
        }

        Commands::Process {
            input,
            output,
            prefix,
            format,
            params,
            index,
        } => {
            let output = OutputArgs {
                folder: output,
                prefix,
                format,
            };
            commands::process::run(settings, &input, output, &params, index)
                .await
                .map(|_| ())
        }

        Commands::Settings { reset } => commands::settings::run(settings, store, reset),
    }
}

/// Print an operator-facing description of `err` on stderr.
fn report(err: &ScanCropError) {
    let human = humanize_error(err);
    let label = match human.severity {
        Severity::Warning => "Warning",
        _ => "Error",
    };
    eprintln!("{label}: {}", human.message);
    eprintln!("  {}", human.suggestion);
    if human.retriable {
        eprintln!("  (Trying again may help.)");
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagescribe — PDF transcription from the command line.
//
// Entry point. Initialises logging, loads configuration, runs the job on a
// blocking thread while listening for Ctrl-C, and writes the export.

mod cli;
mod services;

use std::process::ExitCode;

use clap::Parser;
use pagescribe_core::error::{Result, ScribeError};
use pagescribe_core::human_errors::humanize_error;
use pagescribe_pipeline::{CancellationToken, ExportFormat};

use cli::{Cli, Command};
use services::config_store::load_config;
use services::output::OutputTarget;
use services::runner::{JobOutcome, JobRequest, run_job};

/// Exit code for a job stopped by the user (128 + SIGINT).
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Pagescribe starting");

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "Job failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("       {}", human.suggestion);
            if human.retriable {
                eprintln!("       Running the command again may succeed.");
            }
            ExitCode::from(human.severity.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;
    let model_dir = cli.model_dir.or(config.model_dir.take());

    let (request, job, output, output_dir) = match cli.command {
        Command::Transcribe {
            file,
            output,
            output_dir,
            job,
        } => (JobRequest::Single(file), job, output, output_dir),
        Command::Batch {
            files,
            output,
            output_dir,
            job,
        } => (JobRequest::Batch(files), job, output, output_dir),
    };
    job.apply(&mut config.job);
    let format: ExportFormat = job.format.parse()?;
    let target = OutputTarget::new(output, output_dir);
    let settings = config.job;

    let token = CancellationToken::new();
    let stopper = token.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping at the next checkpoint");
            stopper.request_stop();
        }
    });

    let joined = tokio::task::spawn_blocking(move || {
        run_job(request, &settings, model_dir.as_deref(), token)
    })
    .await;
    interrupt.abort();
    let outcome = joined.map_err(|e| ScribeError::Io(std::io::Error::other(e)))??;

    let cancelled = outcome.cancelled();
    match &outcome {
        JobOutcome::Single(single) => {
            target.write_document(format, &single.info.name, &single.text)?;
            eprintln!("{}: {}", single.info.name, single.report.status_line());
        }
        JobOutcome::Batch(batch) => {
            target.write_batch(format, &batch.results)?;
            for (name, status) in &batch.items {
                eprintln!("  {name}: {status:?}");
            }
            eprintln!("{}", batch.report.status_line());
        }
    }

    Ok(if cancelled {
        ExitCode::from(EXIT_CANCELLED)
    } else {
        ExitCode::SUCCESS
    })
}

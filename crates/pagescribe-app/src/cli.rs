// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pagescribe_core::JobSettings;

#[derive(Debug, Parser)]
#[command(name = "pagescribe")]
#[command(about = "Transcribe PDFs using their text layer or OCR, page by page")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/pagescribe/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing the OCR models
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Transcribe a single PDF
    Transcribe {
        /// PDF file to transcribe
        file: PathBuf,

        /// Write the result to this file instead of stdout
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Write the result into this directory as <name>.<ext>
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Transcribe several PDFs one after another
    Batch {
        /// PDF files to transcribe
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the combined result to this file instead of stdout
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Write one result file per input into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        job: JobArgs,
    },
}

/// Per-job options shared by both commands. Unset flags keep the configured
/// value.
#[derive(Debug, Clone, Args)]
pub struct JobArgs {
    /// Pages to process, e.g. "1-3,5,8" (default: all)
    #[arg(short, long)]
    pub pages: Option<String>,

    /// Recognition language
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Raster scale used for recognition (pixels per PDF point)
    #[arg(short, long)]
    pub scale: Option<f32>,

    /// Always recognize, ignoring embedded text layers
    #[arg(long)]
    pub no_text_layer: bool,

    /// Binarize page rasters before recognition
    #[arg(long)]
    pub binarize: bool,

    /// Binarization threshold, 0 picks one automatically
    #[arg(long, value_name = "0-255")]
    pub threshold: Option<u8>,

    /// Output format: txt, md, csv, or json
    #[arg(short, long, default_value = "txt")]
    pub format: String,

    /// Skip paragraph reconstruction and keep the raw page text
    #[arg(long)]
    pub no_format: bool,
}

impl JobArgs {
    /// Layer the command-line flags over configured settings.
    pub fn apply(&self, settings: &mut JobSettings) {
        if let Some(pages) = &self.pages {
            settings.page_range = pages.clone();
        }
        if let Some(lang) = &self.lang {
            settings.language = lang.clone();
        }
        if let Some(scale) = self.scale {
            settings.raster_scale = scale;
        }
        if self.no_text_layer {
            settings.prefer_text_layer = false;
        }
        if self.binarize {
            settings.binarize = true;
        }
        if let Some(threshold) = self.threshold {
            settings.binarize_threshold = threshold;
        }
        if self.no_format {
            settings.reconstruction.auto_format = false;
        }
    }
}

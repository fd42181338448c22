//! Command-line interface argument parsing.
//!
//! This module handles CLI argument parsing using clap, plus the
//! interactive menu used when no `--mode` is given.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// JoinMetrics - merge metric files into one aggregate JSON document
///
/// Each metric file maps repository names to values. Joining a file
/// registers it under `metrics.<file name>` in the aggregate.
///
/// Examples:
///   joinmetrics --mode single --file metrics/stars.json
///   joinmetrics --mode folder --metrics-dir ./metrics
///   joinmetrics --list
///   joinmetrics                (interactive menu)
///   joinmetrics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// What to join: one file, or every metric file of a folder
    ///
    /// Prompts with a menu when omitted.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// Metric file to join in single mode
    ///
    /// The `.json` suffix may be omitted. Prompted for when missing.
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<String>,

    /// Path of the aggregate document
    #[arg(short, long, value_name = "FILE", env = "JOINMETRICS_AGGREGATE")]
    pub aggregate: Option<PathBuf>,

    /// Directory scanned in folder mode
    #[arg(short = 'd', long, value_name = "DIR", env = "JOINMETRICS_METRICS_DIR")]
    pub metrics_dir: Option<PathBuf>,

    /// Suffix of metric files (default: .json)
    #[arg(long, value_name = "SUFFIX")]
    pub extension: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .joinmetrics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save once after the whole folder instead of after every file
    #[arg(long)]
    pub save_once: bool,

    /// Write the aggregate as indented JSON
    #[arg(long)]
    pub pretty: bool,

    /// Show what would be joined without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// List the metrics already in the aggregate and exit
    #[arg(long, conflicts_with_all = ["mode", "file", "dry_run"])]
    pub list: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .joinmetrics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Join mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Join one named file
    Single,
    /// Join every metric file of the metrics directory
    Folder,
}

impl Mode {
    /// Menu number of this mode.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim().parse::<u32>() {
            Ok(1) => Some(Mode::Single),
            Ok(2) => Some(Mode::Folder),
            _ => None,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.file.is_some() && self.mode == Some(Mode::Folder) {
            return Err("--file only applies to --mode single".to_string());
        }

        if let Some(ref file) = self.file {
            if file.trim().is_empty() {
                return Err("--file must not be empty".to_string());
            }
        }

        if let Some(ref extension) = self.extension {
            if extension.is_empty() || extension.contains(['/', '\\']) {
                return Err(format!("Invalid metric file suffix: '{}'", extension));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Show the mode menu until a valid choice is entered.
///
/// Invalid input is re-prompted; end of input is an error.
pub fn prompt_mode<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Mode> {
    loop {
        writeln!(output, "\n---------- OPTIONS ----------\n")?;
        writeln!(output, "1 - Insert only one file")?;
        writeln!(output, "2 - Insert all files from a folder")?;
        write!(output, "\n\nInsert an option: ")?;
        output.flush()?;

        let line = read_line(input)?;
        if let Some(mode) = Mode::from_menu_choice(&line) {
            return Ok(mode);
        }
    }
}

/// Ask for the metric file to join in single mode.
pub fn prompt_file<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    loop {
        write!(output, "Type the file name of the new metric: ")?;
        output.flush()?;

        let line = read_line(input)?;
        let file = line.trim();
        if !file.is_empty() {
            return Ok(file.to_string());
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read from standard input")?;

    if read == 0 {
        bail!("Input closed before a choice was made");
    }
    Ok(line)
}

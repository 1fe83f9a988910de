//! Command-line interface for emojivur.
//!
//! Parses arguments with clap and merges them with the config file into the
//! options a run needs.

use std::path::PathBuf;

use clap::Parser;
use emojivur_fonts::FontSource;

use crate::config::{Config, ConfigError, LogLevel, MAX_PRINT_SCALE};
use crate::error::EXIT_FAILURE;
use crate::layout::Viewport;

/// emojivur - render a line of text, emoji included, to a window or a PDF
#[derive(Parser, Debug)]
#[command(name = "emojivur")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Font file, or a family name looked up among the system fonts
    #[arg(short, long, value_name = "FONT")]
    pub font: String,

    /// Text to shape and render
    #[arg(short, long, value_name = "TEXT")]
    pub text: String,

    /// Glyph size in pixels [default: 109, or default_pxsize from the config]
    #[arg(short, long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub pxsize: Option<u32>,

    /// Write a PDF to this path instead of opening a window
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Face index inside a font collection
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub face_index: u32,

    /// PDF raster density in pixels per point [default: 4]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=MAX_PRINT_SCALE as i64))]
    pub print_scale: Option<u32>,

    /// Log verbosity; overrides the config file and RUST_LOG
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Where the rendered text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Interactive window
    Screen,
    /// Single-page PDF at this path
    Document(PathBuf),
}

/// Everything a run needs, with CLI values merged over config values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub font: FontSource,
    pub face_index: u32,
    pub text: String,
    pub pxsize: u32,
    pub target: OutputTarget,
    pub print_scale: u32,
    pub min_window: Viewport,
    pub background_color: [u8; 3],
    pub paint_color: [u8; 4],
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with a run
    Continue(Cli),
    /// Exit with the given code (help, version or a usage error was printed)
    Exit(u8),
}

/// Parse the process arguments. Usage errors exit with the same code as
/// every other failure.
pub fn process_cli() -> CliResult {
    match Cli::try_parse() {
        Ok(cli) => CliResult::Continue(cli),
        Err(e) => {
            let code = if e.use_stderr() { EXIT_FAILURE } else { 0 };
            if let Err(print_err) = e.print() {
                eprintln!("emojivur: {print_err}");
            }
            CliResult::Exit(code)
        }
    }
}

impl Cli {
    /// Load the config named by `--config`, or the default one.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    /// Merge with `config`. Flags win.
    pub fn into_options(self, config: &Config) -> RunOptions {
        let target = match self.output {
            Some(path) => OutputTarget::Document(path),
            None => OutputTarget::Screen,
        };
        RunOptions {
            font: FontSource::resolve(&self.font),
            face_index: self.face_index,
            text: self.text,
            pxsize: self.pxsize.unwrap_or(config.default_pxsize),
            target,
            print_scale: self.print_scale.unwrap_or(config.print_scale),
            min_window: Viewport::new(config.min_window_width, config.min_window_height),
            background_color: config.background_color,
            paint_color: config.paint_color,
        }
    }
}

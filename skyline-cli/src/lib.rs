//! Command-line interface for the Skyline extractor.
#![forbid(unsafe_code)]

use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use skyline_data::{DecodePolicy, ExtractOptions, ExtractionReport};

mod error;

pub use error::CliError;

const ARG_INPUT: &str = "input";
const ARG_OUTPUT: &str = "output";
const ARG_WORKERS: &str = "workers";
const ARG_BATCH_SIZE: &str = "batch-size";
const ARG_STRICT_DECODE: &str = "strict-decode";
const ENV_INPUT: &str = "SKYLINE_CMDS_EXTRACT_INPUT";
const ENV_OUTPUT: &str = "SKYLINE_CMDS_EXTRACT_OUTPUT";
const EXTRACT_USAGE: &str = "The dataset and store paths belong to the extract subcommand:\n  \
                             skyline extract planet.osm.pbf skyline.db";

/// Run the Skyline CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments cannot be parsed, configuration is
/// incomplete, or the extraction fails fatally.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Extract(args) => {
            let config = resolve_extract_config(args)?;
            execute_extract(&config)?;
        }
    }
    Ok(())
}

fn resolve_extract_config(args: ExtractArgs) -> Result<ExtractConfig, CliError> {
    let config = args.into_config()?;
    config.validate_paths()?;
    Ok(config)
}

fn execute_extract(config: &ExtractConfig) -> Result<ExtractionReport, CliError> {
    info!("Extracting {} into {}", config.input, config.output);
    skyline_data::run_extraction(config.input.as_std_path(), &config.output, &config.options)
        .map_err(|source| CliError::Extract {
            input: config.input.clone(),
            source,
        })
}

#[derive(Debug, Parser)]
#[command(
    name = "skyline",
    about = "Extract tall buildings, peaks, masts and towers from OpenStreetMap data",
    after_help = EXTRACT_USAGE,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract tall features from a PBF dataset into a SQLite store.
    Extract(ExtractArgs),
}

/// CLI arguments for the `extract` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "extract",
    about = "Extract tall features into a SQLite store",
    long_about = "Scan an OpenStreetMap PBF dataset twice: once for tall \
                  buildings, once for peaks, masts, towers and the points \
                  those buildings are anchored to. Paths can come from \
                  positional arguments, configuration files, or \
                  environment variables."
)]
#[ortho_config(prefix = "SKYLINE")]
struct ExtractArgs {
    /// Path to the OpenStreetMap PBF file.
    #[arg(value_name = "INPUT")]
    #[serde(default)]
    input: Option<Utf8PathBuf>,
    /// Path to the SQLite store to create or extend.
    #[arg(value_name = "OUTPUT")]
    #[serde(default)]
    output: Option<Utf8PathBuf>,
    /// Decoder worker count; 0 or absent uses every available CPU.
    #[arg(long = ARG_WORKERS, value_name = "count")]
    #[serde(default)]
    workers: Option<usize>,
    /// Rows committed per transaction.
    #[arg(long = ARG_BATCH_SIZE, value_name = "rows")]
    #[serde(default)]
    batch_size: Option<usize>,
    /// Fail the run on a corrupt blob instead of ending the pass early.
    #[arg(long = ARG_STRICT_DECODE, num_args = 0, default_missing_value = "true")]
    #[serde(default)]
    strict_decode: Option<bool>,
}

impl ExtractArgs {
    fn into_config(self) -> Result<ExtractConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExtractConfig::try_from(merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtractConfig {
    input: Utf8PathBuf,
    output: Utf8PathBuf,
    options: ExtractOptions,
}

impl ExtractConfig {
    fn validate_paths(&self) -> Result<(), CliError> {
        Self::require_file(&self.input, ARG_INPUT)?;
        if self.output.is_dir() {
            return Err(CliError::OutputIsDirectory {
                path: self.output.clone(),
            });
        }
        Ok(())
    }

    fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
    }
}

impl TryFrom<ExtractArgs> for ExtractConfig {
    type Error = CliError;

    fn try_from(args: ExtractArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_INPUT,
        })?;
        let output = args.output.ok_or(CliError::MissingArgument {
            field: ARG_OUTPUT,
            env: ENV_OUTPUT,
        })?;
        let batch_size = match args.batch_size {
            None => ExtractOptions::default().batch_size,
            Some(rows) => NonZeroUsize::new(rows).ok_or(CliError::InvalidBatchSize)?,
        };
        let decode_policy = if args.strict_decode.unwrap_or(false) {
            DecodePolicy::Fail
        } else {
            DecodePolicy::Truncate
        };
        Ok(Self {
            input,
            output,
            options: ExtractOptions {
                workers: args.workers,
                batch_size,
                decode_policy,
            },
        })
    }
}

#[cfg(test)]
mod tests;

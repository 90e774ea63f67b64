//! Error types emitted by the Skyline CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use skyline_data::ExtractError;
use thiserror::Error;

/// Errors emitted by the Skyline CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required value is missing after configuration merging.
    #[error("missing {field} (pass it as an argument or set {env})")]
    MissingArgument {
        /// Name of the missing argument.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Name of the argument holding the path.
        field: &'static str,
        /// The rejected path.
        path: Utf8PathBuf,
    },
    /// The output path names an existing directory.
    #[error("output path {path:?} is a directory")]
    OutputIsDirectory {
        /// The rejected path.
        path: Utf8PathBuf,
    },
    /// `--batch-size` was zero.
    #[error("batch size must be at least 1")]
    InvalidBatchSize,
    /// The extraction failed fatally.
    #[error("failed to extract {input:?}: {source}")]
    Extract {
        /// Dataset being extracted.
        input: Utf8PathBuf,
        /// Underlying pipeline failure.
        #[source]
        source: ExtractError,
    },
}

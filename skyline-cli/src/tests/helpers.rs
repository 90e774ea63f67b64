//! Test helpers for composing extract CLI datasets and layered overrides.

use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::Connection;
use std::fs;
use tempfile::TempDir;

#[path = "../../../skyline-data/tests/support.rs"]
#[expect(
    dead_code,
    reason = "coordinate assertions are only used by skyline-data tests"
)]
mod support;

use support::decode_fixture;
pub(super) use support::missing_fixture;

#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) input: Option<Utf8PathBuf>,
    pub(super) output: Option<Utf8PathBuf>,
    pub(super) workers: Option<usize>,
    pub(super) batch_size: Option<usize>,
}

/// Decoded PBF fixtures and output locations inside one temporary directory.
#[derive(Debug)]
pub(super) struct DatasetFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
    cli_input: Utf8PathBuf,
    config_input: Utf8PathBuf,
    corrupt_input: Utf8PathBuf,
}

impl DatasetFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 tempdir");
        let cli_input = root.join("cli.osm.pbf");
        let config_input = root.join("config.osm.pbf");
        let corrupt_input = root.join("corrupt.osm.pbf");
        write_fixture("skyline", &cli_input);
        write_fixture("skyline", &config_input);
        write_fixture("truncated", &corrupt_input);
        Self {
            _dir: dir,
            root,
            cli_input,
            config_input,
            corrupt_input,
        }
    }

    pub(super) fn input(&self) -> &Utf8Path {
        &self.cli_input
    }

    pub(super) fn config_input(&self) -> &Utf8Path {
        &self.config_input
    }

    pub(super) fn corrupt_input(&self) -> &Utf8Path {
        &self.corrupt_input
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn store(&self, name: &str) -> Utf8PathBuf {
        self.root.join("stores").join(name)
    }
}

fn write_fixture(stem: &str, target: &Utf8Path) {
    let decoded = decode_fixture(stem);
    fs::copy(&decoded, target)
        .unwrap_or_else(|err| panic!("failed to copy {stem} fixture to {target}: {err}"));
}

pub(super) fn count_features(path: &Utf8Path) -> i64 {
    let connection = Connection::open(path.as_std_path()).expect("open store");
    connection
        .query_row("SELECT COUNT(*) FROM features", [], |row| row.get(0))
        .expect("count features")
}

pub(super) fn merge_layers(
    mut cli_args: ExtractArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<ExtractConfig, CliError> {
    merge_field(
        &mut cli_args.input,
        extract_field(&env_layer, |layer| &layer.input),
        extract_field(&file_layer, |layer| &layer.input),
    );
    merge_field(
        &mut cli_args.output,
        extract_field(&env_layer, |layer| &layer.output),
        extract_field(&file_layer, |layer| &layer.output),
    );
    merge_field(
        &mut cli_args.workers,
        extract_field(&env_layer, |layer| &layer.workers),
        extract_field(&file_layer, |layer| &layer.workers),
    );
    merge_field(
        &mut cli_args.batch_size,
        extract_field(&env_layer, |layer| &layer.batch_size),
        extract_field(&file_layer, |layer| &layer.batch_size),
    );
    let config = ExtractConfig::try_from(cli_args)?;
    config.validate_paths()?;
    Ok(config)
}

fn merge_field<T: Clone>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: &Option<LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.as_ref().and_then(|entry| accessor(entry).clone())
}

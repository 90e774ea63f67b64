//! Skyline PBF fixtures shared by unit, behaviour and CLI tests.
//!
//! Fixtures live under `skyline-data/tests/fixtures` as Base64 text:
//! - `skyline`: buildings, peaks, a mast and a tower across three data blobs;
//! - `truncated`: the same blobs with the second one corrupted;
//! - `invalid`: bytes that are not a PBF file at all.

use base64::{Engine as _, engine::general_purpose};
use std::{fs, io::Write, path::PathBuf};
use tempfile::{Builder, TempPath};

const COORDINATE_EPSILON: f64 = 1.0e-7;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../skyline-data/tests/fixtures")
}

/// Path inside the fixture directory that is guaranteed not to exist.
pub fn missing_fixture() -> PathBuf {
    fixtures_dir().join("missing.osm.pbf")
}

/// Decode the fixture named `stem` into a temporary `.osm.pbf` file.
pub fn decode_fixture(stem: &str) -> TempPath {
    let encoded_path = fixtures_dir().join(format!("{stem}.osm.pbf.b64"));
    let encoded = fs::read_to_string(&encoded_path).unwrap_or_else(|err| {
        panic!("failed to read fixture {encoded_path:?}: {err}");
    });
    let cleaned: String = encoded.split_ascii_whitespace().collect();
    let decoded = general_purpose::STANDARD
        .decode(cleaned)
        .unwrap_or_else(|err| panic!("fixture {encoded_path:?} is not Base64: {err}"));

    let mut pbf = Builder::new()
        .prefix(stem)
        .suffix(".osm.pbf")
        .tempfile()
        .unwrap_or_else(|err| panic!("failed to create {stem} fixture file: {err}"));
    pbf.write_all(&decoded)
        .and_then(|()| pbf.flush())
        .unwrap_or_else(|err| panic!("failed to write {stem} fixture file: {err}"));
    pbf.into_temp_path()
}

/// Assert two coordinates agree to within a tenth of a microdegree.
#[expect(
    clippy::float_arithmetic,
    reason = "test delta computation requires float maths"
)]
pub fn assert_close(actual: f64, expected: f64) {
    let delta = (actual - expected).abs();
    assert!(
        delta <= COORDINATE_EPSILON,
        "expected {expected} degrees, got {actual} (off by {delta})"
    );
}

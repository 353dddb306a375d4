use std::fs;
use std::path::{Path, PathBuf};

use arazzo_testgen::document::{load_sources, Sources};

/// Get path to a fixture under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a test fixture from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// The robot lifecycle workflow and its OpenAPI description
pub fn robot_sources() -> Sources {
    load_sources(&fixture_path("robots/arazzo.yaml"))
        .expect("Failed to load robot fixtures")
}

//! Test fixtures for golden-file assertions
//!
//! - Toolchain config and its expected Starlark export
//! - Module properties for a representative cc library

#![allow(dead_code)]

use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Repo-layer toolchain config
pub fn toolchain_config_path() -> PathBuf {
    fixture("toolchain.toml")
}

/// Expected export of [`toolchain_config_path`]
pub fn toolchain_golden() -> String {
    let golden = std::fs::read_to_string(fixture("toolchain.bzl")).expect("read golden");
    golden.trim_end_matches('\n').to_string()
}

/// Module properties for `libfoo`
pub fn libfoo_path() -> PathBuf {
    fixture("libfoo.json")
}

//! Build script for game discovery.
//!
//! Scans `src/games/` for game modules and generates `in_tree_games.rs`,
//! which `src/games/mod.rs` includes. Also records the compiler version so
//! dynamically loaded bundles can be checked against the host.
//!
//! # Environment Variables
//!
//! - `EXTERNAL_GAMES_CONFIG`: JSON list of out-of-tree game crates
//! - `LEGACY_GAME_PATH`: a single out-of-tree game crate
//!
//! Out-of-tree crates are not compiled here; `bgf-host build-bundles` does
//! that. This script only reports entries it would skip.

use std::path::Path;
use std::process::Command;
use std::{env, fs};

#[allow(dead_code)]
#[path = "src/plugin/discovery.rs"]
mod discovery;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");

    let config = discovery::BuildConfig::from_env(Path::new(&manifest_dir));
    let report = discovery::discover_in_tree(&config.candidates);

    for warning in &report.warnings {
        println!("cargo:warning={warning}");
    }
    if report.entries.is_empty() {
        println!("cargo:warning=no in-tree games found");
    }

    let dest = Path::new(&out_dir).join("in_tree_games.rs");
    fs::write(&dest, discovery::render_aggregate(&report.entries))
        .expect("failed to write in_tree_games.rs");

    let stems = report.stems();
    let plan = discovery::plan_external(
        config.external_games.as_deref(),
        config.legacy_game.as_deref(),
        &stems,
    );
    for warning in &plan.warnings {
        println!("cargo:warning={warning}");
    }

    for dir in &config.candidates {
        if dir.is_dir() {
            println!("cargo:rerun-if-changed={}", dir.display());
        }
    }
    for entry in &report.entries {
        println!("cargo:rerun-if-changed={}", entry.source.display());
    }
    println!("cargo:rerun-if-changed=src/plugin/discovery.rs");
    println!("cargo:rerun-if-env-changed={}", discovery::EXTERNAL_GAMES_ENV);
    println!("cargo:rerun-if-env-changed={}", discovery::LEGACY_GAME_ENV);

    println!("cargo:rustc-env=BGF_RUSTC_VERSION={}", rustc_version());
}

fn rustc_version() -> String {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

//! `bgf-host`: load games and inspect the registry.
//!
//! Run with: `bgf-host <command>`

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use anyhow::{bail, Context, Result};
use bgf::definition::{prepare_game, Registry};
use bgf::plugin::discovery::{self, ExternalBundle};
use bgf::plugin::{LoaderConfig, PluginLoader};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Board game framework host
#[derive(Parser)]
#[command(name = "bgf-host")]
#[command(about = "Load and inspect board game plugins", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load every game and list the registry
    List,

    /// Print one game's metadata as JSON
    Inspect(Inspect),

    /// Build out-of-tree game crates into loadable bundles
    BuildBundles(BuildBundles),
}

#[derive(Args)]
struct Inspect {
    /// Game id
    id: String,
}

#[derive(Args)]
struct BuildBundles {
    /// Directory the bundles are copied to
    #[arg(long, default_value = "games")]
    out: PathBuf,

    /// Cargo target directory used for the builds
    #[arg(long, default_value = "target/bundles")]
    target_dir: PathBuf,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::List => list(),
        Command::Inspect(cmd) => cmd.execute(),
        Command::BuildBundles(cmd) => cmd.execute(),
    }
}

fn load_registry() -> Registry {
    let registry = Registry::new();
    let report = PluginLoader::new(LoaderConfig::from_env()).load(&registry);
    for failure in &report.failures {
        warn!("{failure}");
    }
    registry
}

fn list() -> Result<()> {
    let registry = load_registry();
    for game in registry.games() {
        let meta = game.metadata();
        println!(
            "{:<16} {:<24} {}-{} players  moves: {}",
            meta.id,
            meta.display_name,
            meta.min_players,
            meta.max_players,
            game.move_names().join(", ")
        );
    }
    Ok(())
}

impl Inspect {
    fn execute(self) -> Result<()> {
        let registry = load_registry();
        let Some(game) = registry.lookup(&self.id) else {
            bail!("no game registered with id '{}'", self.id);
        };
        println!("{}", serde_json::to_string_pretty(&prepare_game(&game).summary())?);
        Ok(())
    }
}

impl BuildBundles {
    fn execute(self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let config = discovery::BuildConfig::from_env(&cwd);
        let in_tree = discovery::discover_in_tree(&config.candidates);
        let plan = discovery::plan_external(
            config.external_games.as_deref(),
            config.legacy_game.as_deref(),
            &in_tree.stems(),
        );

        for warning in &plan.warnings {
            warn!("{warning}");
        }
        if plan.bundles.is_empty() {
            info!("no external games to build");
            return Ok(());
        }

        fs::create_dir_all(&self.out)
            .with_context(|| format!("failed to create {}", self.out.display()))?;

        for bundle in &plan.bundles {
            let dest = self.build(bundle)?;
            info!(bundle = %bundle.bundle, path = %dest.display(), "built bundle");
        }
        Ok(())
    }

    fn build(&self, bundle: &ExternalBundle) -> Result<PathBuf> {
        let output = Process::new(std::env::var("CARGO").unwrap_or_else(|_| "cargo".into()))
            .args(["build", "--release", "--message-format=json"])
            .arg("--manifest-path")
            .arg(&bundle.manifest)
            .arg("--target-dir")
            .arg(&self.target_dir)
            .output()
            .with_context(|| format!("failed to run cargo for {}", bundle.slug))?;

        if !output.status.success() {
            bail!(
                "cargo build failed for {}:\n{}",
                bundle.slug,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(library) = find_cdylib(&stdout, &bundle.manifest) else {
            bail!("{} did not produce a cdylib", bundle.slug);
        };

        let dest = self
            .out
            .join(format!("{}.{}", bundle.bundle, std::env::consts::DLL_EXTENSION));
        fs::copy(&library, &dest)
            .with_context(|| format!("failed to copy {} to {}", library.display(), dest.display()))?;
        Ok(dest)
    }
}

#[derive(Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    manifest_path: Option<PathBuf>,
    #[serde(default)]
    target: Option<CargoTarget>,
    #[serde(default)]
    filenames: Vec<PathBuf>,
}

#[derive(Deserialize)]
struct CargoTarget {
    kind: Vec<String>,
}

/// The dynamic library built for `manifest`, from cargo's JSON messages.
fn find_cdylib(messages: &str, manifest: &Path) -> Option<PathBuf> {
    let manifest = fs::canonicalize(manifest).unwrap_or_else(|_| manifest.to_path_buf());

    messages
        .lines()
        .filter_map(|line| serde_json::from_str::<CargoMessage>(line).ok())
        .filter(|msg| msg.reason == "compiler-artifact")
        .filter(|msg| msg.manifest_path.as_deref() == Some(manifest.as_path()))
        .filter(|msg| msg.target.as_ref().is_some_and(|t| t.kind.iter().any(|k| k == "cdylib")))
        .flat_map(|msg| msg.filenames)
        .filter(|f| f.extension().is_some_and(|e| e == std::env::consts::DLL_EXTENSION))
        .last()
}

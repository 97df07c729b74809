//! Run-time plugin loading.
//!
//! `PluginLoader::load` fills a `Registry` in a fixed order:
//!
//! 1. the in-tree games generated by `build.rs`
//! 2. `game-*` bundles beside the host executable
//! 3. bundles in `<host>/games`
//! 4. bundles in `<cwd>/games`
//! 5. only if no bundle from 2-4 exported a game: the legacy single-bundle
//!    locations, stopping at the first that exports one
//!
//! Imports of step 2-4 run in parallel; registration then happens on the
//! calling thread in candidate order, so the same files always yield the same
//! winner for a contested id. A bundle that fails to import, or panics while
//! importing, is logged and recorded in the report, never fatal.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use super::config::LoaderConfig;
use super::dylib::DylibImporter;
use crate::definition::{DynGame, GameDefinition, Payload, Registry};
use crate::error::PluginLoadError;

/// What a bundle exports.
#[derive(Debug)]
pub enum BundleExports {
    GameDef(DynGame),
    GameDefs(Vec<DynGame>),
    /// Anything else. Treated as a bundle with no games.
    Unrecognized,
}

impl BundleExports {
    /// Export a single typed definition.
    pub fn game<S: Payload>(def: GameDefinition<S>) -> Self {
        BundleExports::GameDef(std::sync::Arc::new(def))
    }

    pub fn games(games: impl IntoIterator<Item = DynGame>) -> Self {
        BundleExports::GameDefs(games.into_iter().collect())
    }

    pub fn into_games(self) -> Vec<DynGame> {
        match self {
            BundleExports::GameDef(game) => vec![game],
            BundleExports::GameDefs(games) => games,
            BundleExports::Unrecognized => Vec::new(),
        }
    }
}

/// Turns a bundle file into its exports.
pub trait BundleImporter: Send + Sync {
    fn import(&self, path: &Path) -> Result<BundleExports, PluginLoadError>;
}

/// Outcome of one `PluginLoader::load` call.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Games registered by the in-tree aggregate.
    pub in_tree: usize,
    /// Ids registered from bundles, in registration order.
    pub registered: Vec<String>,
    pub failures: Vec<PluginLoadError>,
    /// Whether any bundle from the search directories exported a game, even
    /// one the registry already held. Decides whether the legacy fallback runs.
    pub bundles_exported: bool,
    /// The legacy bundle that supplied games, if the fallback ran and succeeded.
    pub legacy_used: Option<PathBuf>,
}

impl LoadReport {
    /// Games added by this load in total.
    pub fn total(&self) -> usize {
        self.in_tree + self.registered.len()
    }
}

/// Loads games into a registry.
pub struct PluginLoader {
    config: LoaderConfig,
    importer: Box<dyn BundleImporter>,
    in_tree: Option<fn(&Registry) -> usize>,
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("config", &self.config)
            .field("in_tree", &self.in_tree.is_some())
            .finish_non_exhaustive()
    }
}

impl PluginLoader {
    /// A loader for dynamic-library bundles that also registers the
    /// in-tree games.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            importer: Box::new(DylibImporter),
            in_tree: Some(crate::games::register_in_tree_games),
        }
    }

    pub fn with_importer(mut self, importer: impl BundleImporter + 'static) -> Self {
        self.importer = Box::new(importer);
        self
    }

    /// Replace (or with `None`, skip) the in-tree registrant.
    pub fn with_in_tree(mut self, register: Option<fn(&Registry) -> usize>) -> Self {
        self.in_tree = register;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Bundle files found in the search directories, in priority order,
    /// each canonical path once.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut seen = FxHashSet::default();
        let mut found = Vec::new();

        for (dir, prefixed) in self.config.search_dirs() {
            for path in bundles_in(&dir, &self.config.bundle_extension, prefixed) {
                let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
                if seen.insert(key) {
                    found.push(path);
                }
            }
        }
        found
    }

    /// Load every game this loader can find into `registry`.
    pub fn load(&self, registry: &Registry) -> LoadReport {
        let mut report = LoadReport::default();

        if let Some(register) = self.in_tree {
            report.in_tree = register(registry);
            debug!(count = report.in_tree, "registered in-tree games");
        }

        let candidates = self.candidates();
        let imported: Vec<_> = candidates
            .par_iter()
            .map(|path| import_isolated(self.importer.as_ref(), path))
            .collect();

        for (path, result) in candidates.iter().zip(imported) {
            match result {
                Ok(exports) => {
                    let outcome = register_exports(registry, path, exports);
                    report.bundles_exported |= outcome.exported > 0;
                    report.registered.extend(outcome.added);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to load game bundle");
                    report.failures.push(err);
                }
            }
        }

        if !report.bundles_exported {
            self.load_legacy(registry, &mut report);
        }

        info!(
            in_tree = report.in_tree,
            bundles = report.registered.len(),
            failures = report.failures.len(),
            games = ?registry.ids(),
            "game loading finished"
        );
        report
    }

    fn load_legacy(&self, registry: &Registry, report: &mut LoadReport) {
        let explicit = self.config.external_game_path.as_deref();

        for path in self.config.legacy_paths() {
            if Some(path.as_path()) != explicit && !path.is_file() {
                continue;
            }

            match import_isolated(self.importer.as_ref(), &path) {
                Ok(exports) => {
                    let outcome = register_exports(registry, &path, exports);
                    report.registered.extend(outcome.added);
                    if outcome.exported > 0 {
                        info!(path = %path.display(), "loaded legacy game bundle");
                        report.legacy_used = Some(path);
                        return;
                    }
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to load legacy game bundle");
                    report.failures.push(err);
                }
            }
        }
    }
}

fn bundles_in(dir: &Path, extension: &str, prefixed: bool) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|e| e == extension))
        .filter(|path| {
            !prefixed
                || path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(super::discovery::BUNDLE_PREFIX))
        })
        .collect();
    paths.sort();
    paths
}

/// Run one import, turning a panic inside it into a load failure.
fn import_isolated(importer: &dyn BundleImporter, path: &Path) -> Result<BundleExports, PluginLoadError> {
    panic::catch_unwind(AssertUnwindSafe(|| importer.import(path))).unwrap_or_else(|payload| {
        Err(PluginLoadError::Panicked {
            path: path.to_path_buf(),
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string panic payload>".to_string())
}

struct Registered {
    /// Games the bundle exported.
    exported: usize,
    /// Ids that were new to the registry.
    added: Vec<String>,
}

fn register_exports(registry: &Registry, path: &Path, exports: BundleExports) -> Registered {
    let games = exports.into_games();
    if games.is_empty() {
        debug!(path = %path.display(), "bundle exports no games");
    }

    let exported = games.len();
    let added = games
        .into_iter()
        .filter_map(|game| {
            let id = game.id().to_string();
            registry.register_dyn(game).then_some(id)
        })
        .collect();
    Registered { exported, added }
}

//! Build-time game discovery.
//!
//! Shared between the library and `build.rs` (which pulls this file in with
//! `#[path]`), so it depends on nothing but `std`, `serde` and `serde_json`,
//! and reports problems as warning strings instead of logging them.
//!
//! In-tree games are the `*.rs` files (or `<name>/mod.rs` directories) of the
//! first candidate directory that contains any. Each becomes a module of the
//! generated aggregate, which registers them all at startup. Out-of-tree games
//! are separate crates listed in `EXTERNAL_GAMES_CONFIG` (plus one legacy
//! override) and are built into standalone bundles by `bgf-host build-bundles`.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File-name prefix of every bundle.
pub const BUNDLE_PREFIX: &str = "game-";

/// JSON array of `{ "slug": ..., "path": ... }` external game crates.
pub const EXTERNAL_GAMES_ENV: &str = "EXTERNAL_GAMES_CONFIG";

/// A single external game crate, kept for older deployments.
pub const LEGACY_GAME_ENV: &str = "LEGACY_GAME_PATH";

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

/// One game found in the source tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleEntry {
    /// Module name, taken from the file stem.
    pub stem: String,
    /// `game-<stem>`.
    pub bundle: String,
    pub source: PathBuf,
}

/// Result of scanning the candidate directories.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// The directory the entries came from.
    pub source_dir: Option<PathBuf>,
    pub entries: Vec<BundleEntry>,
    pub warnings: Vec<String>,
}

impl DiscoveryReport {
    /// Stems of all discovered games.
    pub fn stems(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.stem.as_str()).collect()
    }
}

/// One `{slug, path}` item of the external games configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExternalGame {
    pub slug: String,
    pub path: PathBuf,
}

/// An external crate to be built into `game-<slug>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalBundle {
    pub slug: String,
    pub bundle: String,
    /// The crate's `Cargo.toml`.
    pub manifest: PathBuf,
    pub legacy: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalPlan {
    pub bundles: Vec<ExternalBundle>,
    pub warnings: Vec<String>,
}

/// Build-time configuration read from the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directories searched for in-tree games, in priority order.
    pub candidates: Vec<PathBuf>,
    pub external_games: Option<String>,
    pub legacy_game: Option<PathBuf>,
}

impl BuildConfig {
    /// Candidates are `<manifest_dir>/src/games` then `<cwd>/src/games`.
    pub fn from_env(manifest_dir: &Path) -> Self {
        let mut candidates = vec![manifest_dir.join("src").join("games")];
        if let Ok(cwd) = env::current_dir() {
            let in_cwd = cwd.join("src").join("games");
            if !candidates.contains(&in_cwd) {
                candidates.push(in_cwd);
            }
        }

        Self {
            candidates,
            external_games: env::var(EXTERNAL_GAMES_ENV).ok().filter(|s| !s.trim().is_empty()),
            legacy_game: env::var_os(LEGACY_GAME_ENV)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Whether `name` can be used as a module name.
pub fn is_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    head_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "_"
        && !KEYWORDS.contains(&name)
}

/// Bundle name for a stem or slug.
pub fn bundle_name(stem: &str) -> String {
    format!("{BUNDLE_PREFIX}{stem}")
}

fn game_sources(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = read.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            if path.is_dir() {
                let module = path.join("mod.rs");
                let stem = path.file_name()?.to_str()?.to_string();
                return module.is_file().then_some((stem, module));
            }
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                return None;
            }
            let stem = path.file_stem()?.to_str()?.to_string();
            (stem != "mod").then_some((stem, path))
        })
        .collect()
}

/// Scan `candidates` in order; the first directory that yields any game
/// wins and later ones are not read.
pub fn discover_in_tree(candidates: &[PathBuf]) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    for dir in candidates {
        if !dir.is_dir() {
            continue;
        }

        let mut seen = HashSet::new();
        for (stem, source) in game_sources(dir) {
            if !is_module_name(&stem) {
                report
                    .warnings
                    .push(format!("skipping {}: '{stem}' is not a valid module name", source.display()));
                continue;
            }
            if !seen.insert(stem.clone()) {
                report
                    .warnings
                    .push(format!("skipping {}: a game named '{stem}' was already found", source.display()));
                continue;
            }
            report.entries.push(BundleEntry {
                bundle: bundle_name(&stem),
                stem,
                source,
            });
        }

        if !report.entries.is_empty() {
            report.source_dir = Some(dir.clone());
            break;
        }
    }

    report
}

/// Parse the external games configuration.
pub fn parse_external_config(json: &str) -> Result<Vec<ExternalGame>, serde_json::Error> {
    serde_json::from_str(json)
}

fn manifest_of(path: &Path) -> PathBuf {
    if path.file_name().is_some_and(|n| n == "Cargo.toml") {
        path.to_path_buf()
    } else {
        path.join("Cargo.toml")
    }
}

/// Decide which external crates to build.
///
/// Entries whose crate does not exist are skipped; a configuration that is
/// not valid JSON contributes nothing. The legacy crate's slug is its
/// directory name and it is skipped when an in-tree game has that name.
pub fn plan_external(config_json: Option<&str>, legacy: Option<&Path>, in_tree: &[&str]) -> ExternalPlan {
    let mut plan = ExternalPlan::default();
    let mut slugs = HashSet::new();

    if let Some(json) = config_json {
        match parse_external_config(json) {
            Ok(games) => {
                for game in games {
                    let manifest = manifest_of(&game.path);
                    if game.slug.is_empty() || !manifest.is_file() {
                        plan.warnings.push(format!(
                            "skipping external game '{}': no crate at {}",
                            game.slug,
                            game.path.display()
                        ));
                        continue;
                    }
                    if !slugs.insert(game.slug.clone()) {
                        plan.warnings
                            .push(format!("skipping duplicate external game '{}'", game.slug));
                        continue;
                    }
                    plan.bundles.push(ExternalBundle {
                        bundle: bundle_name(&game.slug),
                        slug: game.slug,
                        manifest,
                        legacy: false,
                    });
                }
            }
            Err(err) => plan
                .warnings
                .push(format!("ignoring {EXTERNAL_GAMES_ENV}: {err}")),
        }
    }

    if let Some(path) = legacy {
        let manifest = manifest_of(path);
        let slug = manifest
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let module = slug.replace('-', "_");

        if slug.is_empty() || !manifest.is_file() {
            plan.warnings
                .push(format!("skipping legacy game: no crate at {}", path.display()));
        } else if in_tree.contains(&module.as_str()) || in_tree.contains(&slug.as_str()) {
            plan.warnings
                .push(format!("skipping legacy game '{slug}': it is built in-tree"));
        } else if slugs.insert(slug.clone()) {
            plan.bundles.push(ExternalBundle {
                bundle: bundle_name(&slug),
                slug,
                manifest,
                legacy: true,
            });
        }
    }

    plan
}

/// Render the aggregate module for `entries`.
///
/// The output is meant for `include!`: it declares each game as a module
/// (by absolute path), lists their names, and defines
/// `register_in_tree_games(&Registry) -> usize`.
pub fn render_aggregate(entries: &[BundleEntry]) -> String {
    let mut out = String::from("// @generated by build.rs. Do not edit.\n\n");

    for entry in entries {
        let source = entry.source.display().to_string();
        out.push_str(&format!("#[path = {source:?}]\npub mod {};\n", entry.stem));
    }

    let names: Vec<String> = entries.iter().map(|e| format!("{:?}", e.stem)).collect();
    out.push_str(&format!(
        "\n/// Games compiled into this crate.\npub const IN_TREE_GAMES: &[&str] = &[{}];\n",
        names.join(", ")
    ));

    out.push_str(
        "\n/// Register every in-tree game. Returns how many were newly registered.\n\
         pub fn register_in_tree_games(registry: &crate::definition::Registry) -> usize {\n\
         \x20   #[allow(unused_mut)]\n\
         \x20   let mut registered = 0;\n",
    );
    for entry in entries {
        out.push_str(&format!(
            "    match {stem}::game_def() {{\n\
             \x20       Ok(def) => registered += usize::from(registry.register_game(def)),\n\
             \x20       Err(err) => ::tracing::warn!(game = {stem:?}, %err, \"in-tree game is invalid\"),\n\
             \x20   }}\n",
            stem = entry.stem
        ));
    }
    out.push_str("    registered\n}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_module_names() {
        assert!(is_module_name("zia"));
        assert!(is_module_name("golden_ages2"));
        assert!(!is_module_name("the-golden-ages"));
        assert!(!is_module_name("2048"));
        assert!(!is_module_name("mod"));
        assert!(!is_module_name("_"));
        assert!(!is_module_name(""));
    }

    #[test]
    fn test_first_nonempty_candidate_wins() {
        let root = tempfile::tempdir().unwrap();
        let empty = root.path().join("empty");
        let first = root.path().join("first");
        let second = root.path().join("second");
        fs::create_dir_all(&empty).unwrap();
        touch(&first.join("zia.rs"));
        touch(&first.join("mod.rs"));
        touch(&first.join("notes.txt"));
        touch(&second.join("chess.rs"));

        let report = discover_in_tree(&[root.path().join("missing"), empty, first.clone(), second]);

        assert_eq!(report.source_dir, Some(first.clone()));
        assert_eq!(report.stems(), vec!["zia"]);
        assert_eq!(report.entries[0].bundle, "game-zia");
        assert_eq!(report.entries[0].source, first.join("zia.rs"));
    }

    #[test]
    fn test_collisions_and_bad_names_skipped() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("sampler").join("mod.rs"));
        touch(&root.path().join("sampler.rs"));
        touch(&root.path().join("the-golden-ages.rs"));
        touch(&root.path().join("zia.rs"));

        let report = discover_in_tree(&[root.path().to_path_buf()]);

        assert_eq!(report.stems(), vec!["sampler", "zia"]);
        assert_eq!(report.entries[0].source, root.path().join("sampler").join("mod.rs"));
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_nothing_found() {
        let root = tempfile::tempdir().unwrap();
        let report = discover_in_tree(&[root.path().to_path_buf()]);
        assert!(report.entries.is_empty());
        assert_eq!(report.source_dir, None);
    }

    #[test]
    fn test_plan_external() {
        let root = tempfile::tempdir().unwrap();
        let present = root.path().join("present");
        touch(&present.join("Cargo.toml"));

        let config = format!(
            r#"[{{"slug": "present", "path": {:?}}}, {{"slug": "gone", "path": "/no/such/crate"}}]"#,
            present.display().to_string()
        );
        let plan = plan_external(Some(&config), None, &[]);

        assert_eq!(plan.bundles.len(), 1);
        assert_eq!(plan.bundles[0].bundle, "game-present");
        assert_eq!(plan.bundles[0].manifest, present.join("Cargo.toml"));
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn test_malformed_config_yields_nothing() {
        let plan = plan_external(Some("{not json"), None, &[]);
        assert!(plan.bundles.is_empty());
        assert_eq!(plan.warnings.len(), 1);

        let plan = plan_external(Some(r#"{"slug": "x"}"#), None, &[]);
        assert!(plan.bundles.is_empty());
    }

    #[test]
    fn test_legacy_skipped_when_in_tree() {
        let root = tempfile::tempdir().unwrap();
        let legacy = root.path().join("the-golden-ages");
        touch(&legacy.join("Cargo.toml"));

        let plan = plan_external(None, Some(&legacy), &["the_golden_ages"]);
        assert!(plan.bundles.is_empty());

        let plan = plan_external(None, Some(&legacy), &["zia"]);
        assert_eq!(plan.bundles.len(), 1);
        assert!(plan.bundles[0].legacy);
        assert_eq!(plan.bundles[0].bundle, "game-the-golden-ages");
    }

    #[test]
    fn test_render_aggregate() {
        let entries = vec![
            BundleEntry {
                stem: "sampler".into(),
                bundle: "game-sampler".into(),
                source: PathBuf::from("/src/games/sampler.rs"),
            },
            BundleEntry {
                stem: "zia".into(),
                bundle: "game-zia".into(),
                source: PathBuf::from("/src/games/zia.rs"),
            },
        ];

        let code = render_aggregate(&entries);
        assert!(code.contains("#[path = \"/src/games/sampler.rs\"]\npub mod sampler;"));
        assert!(code.contains("pub const IN_TREE_GAMES: &[&str] = &[\"sampler\", \"zia\"];"));
        assert!(code.contains("match zia::game_def()"));
        assert!(code.contains("pub fn register_in_tree_games(registry: &crate::definition::Registry) -> usize"));

        let empty = render_aggregate(&[]);
        assert!(empty.contains("&[];"));
        assert!(empty.contains("registered\n}"));
    }
}

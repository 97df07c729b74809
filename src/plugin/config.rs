//! Run-time loader configuration.
//!
//! `LoaderConfig::from_env()` describes the running process; tests and
//! embedders adjust it with the `with_*` setters.

use std::env;
use std::path::{Path, PathBuf};

/// Override for a single external game bundle.
pub const EXTERNAL_GAME_ENV: &str = "EXTERNAL_GAME_PATH";

/// Name of the legacy single-bundle file, without extension.
pub const LEGACY_BUNDLE_STEM: &str = "game-logic";

/// Where the loader looks for game bundles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Directory of the host executable.
    pub host_dir: PathBuf,
    pub cwd: PathBuf,
    /// Legacy override, tried first when no bundle directory yields a game.
    pub external_game_path: Option<PathBuf>,
    /// Bundle file extension, without the dot.
    pub bundle_extension: String,
}

impl LoaderConfig {
    /// A configuration rooted at `dir` for both host and working directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            host_dir: dir.clone(),
            cwd: dir,
            external_game_path: None,
            bundle_extension: env::consts::DLL_EXTENSION.to_string(),
        }
    }

    /// Read the process environment.
    ///
    /// The host directory falls back to the working directory when the
    /// executable path is unavailable.
    pub fn from_env() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let host_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| cwd.clone());

        Self {
            host_dir,
            cwd,
            external_game_path: env::var(EXTERNAL_GAME_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| parse_module_path(&v)),
            bundle_extension: env::consts::DLL_EXTENSION.to_string(),
        }
    }

    pub fn with_host_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.host_dir = dir.into();
        self
    }

    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = dir.into();
        self
    }

    /// Accepts a plain path or a `file://` URL.
    pub fn with_external_game_path(mut self, path: &str) -> Self {
        self.external_game_path = Some(parse_module_path(path));
        self
    }

    pub fn with_bundle_extension(mut self, ext: impl Into<String>) -> Self {
        self.bundle_extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    /// Directories searched for bundles, in priority order, and whether
    /// only `game-*` files count in each.
    pub fn search_dirs(&self) -> Vec<(PathBuf, bool)> {
        vec![
            (self.host_dir.clone(), true),
            (self.host_dir.join("games"), false),
            (self.cwd.join("games"), false),
        ]
    }

    /// Legacy single-bundle locations, in priority order.
    pub fn legacy_paths(&self) -> Vec<PathBuf> {
        let file = format!("{LEGACY_BUNDLE_STEM}.{}", self.bundle_extension);
        let mut paths: Vec<PathBuf> = self.external_game_path.iter().cloned().collect();
        paths.push(self.cwd.join(&file));
        paths.push(self.host_dir.join(&file));
        paths
    }
}

fn parse_module_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    PathBuf::from(raw.strip_prefix("file://").unwrap_or(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_accepted() {
        let config = LoaderConfig::new("/srv").with_external_game_path("file:///opt/games/zia.so");
        assert_eq!(config.external_game_path, Some(PathBuf::from("/opt/games/zia.so")));

        let config = LoaderConfig::new("/srv").with_external_game_path("/opt/zia.so");
        assert_eq!(config.external_game_path, Some(PathBuf::from("/opt/zia.so")));
    }

    #[test]
    fn test_search_order() {
        let config = LoaderConfig::new("/work").with_host_dir("/usr/bin");
        let dirs = config.search_dirs();

        assert_eq!(dirs[0], (PathBuf::from("/usr/bin"), true));
        assert_eq!(dirs[1], (PathBuf::from("/usr/bin/games"), false));
        assert_eq!(dirs[2], (PathBuf::from("/work/games"), false));
    }

    #[test]
    fn test_legacy_paths() {
        let config = LoaderConfig::new("/work")
            .with_host_dir("/usr/bin")
            .with_bundle_extension(".bundle")
            .with_external_game_path("/opt/x.bundle");

        assert_eq!(
            config.legacy_paths(),
            vec![
                PathBuf::from("/opt/x.bundle"),
                PathBuf::from("/work/game-logic.bundle"),
                PathBuf::from("/usr/bin/game-logic.bundle"),
            ]
        );
    }
}

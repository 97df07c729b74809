//! Dynamic-library bundles.
//!
//! A bundle is a `cdylib` that depends on this crate and invokes
//! [`declare_game_plugin!`](crate::declare_game_plugin) once. The macro emits a
//! `BGF_PLUGIN_DECLARATION` static; the host reads it, checks that the bundle
//! was built against the same ABI, engine and compiler, and then calls its
//! `exports` function.
//!
//! Rust has no stable ABI, so a mismatch on any of the three is refused
//! rather than risked.

use std::path::Path;

use libloading::Library;
use tracing::debug;

use super::loader::{BundleExports, BundleImporter};
use crate::error::PluginLoadError;

/// Bumped whenever `PluginDeclaration` or `BundleExports` changes shape.
pub const PLUGIN_ABI_VERSION: u32 = 1;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `rustc --version` of the compiler that built this crate.
pub const RUSTC_VERSION: &str = env!("BGF_RUSTC_VERSION");

pub const DECLARATION_SYMBOL: &[u8] = b"BGF_PLUGIN_DECLARATION\0";

/// What a bundle exposes to the host.
#[derive(Clone, Copy, Debug)]
pub struct PluginDeclaration {
    pub abi_version: u32,
    pub rustc_version: &'static str,
    pub engine_version: &'static str,
    pub exports: fn() -> BundleExports,
}

impl PluginDeclaration {
    /// A declaration stamped with this build's versions.
    pub const fn current(exports: fn() -> BundleExports) -> Self {
        Self {
            abi_version: PLUGIN_ABI_VERSION,
            rustc_version: RUSTC_VERSION,
            engine_version: ENGINE_VERSION,
            exports,
        }
    }
}

/// Declare the entry point of a game bundle.
///
/// ```ignore
/// fn exports() -> bgf::plugin::BundleExports {
///     match my_game::game_def() {
///         Ok(def) => bgf::plugin::BundleExports::game(def),
///         Err(_) => bgf::plugin::BundleExports::Unrecognized,
///     }
/// }
///
/// bgf::declare_game_plugin!(exports);
/// ```
#[macro_export]
macro_rules! declare_game_plugin {
    ($exports:path) => {
        #[no_mangle]
        pub static BGF_PLUGIN_DECLARATION: $crate::plugin::PluginDeclaration =
            $crate::plugin::PluginDeclaration::current($exports);
    };
}

/// Refuse declarations built against a different ABI, engine or compiler.
pub fn check_declaration(path: &Path, decl: &PluginDeclaration) -> Result<(), PluginLoadError> {
    let expected = (PLUGIN_ABI_VERSION, ENGINE_VERSION, RUSTC_VERSION);
    let found = (decl.abi_version, decl.engine_version, decl.rustc_version);
    if found == expected {
        return Ok(());
    }

    let describe = |(abi, engine, rustc): (u32, &str, &str)| format!("abi {abi}, bgf {engine}, {rustc}");
    Err(PluginLoadError::AbiMismatch {
        path: path.to_path_buf(),
        expected: describe(expected),
        found: describe(found),
    })
}

/// Imports bundles with `libloading`.
///
/// Loaded libraries are never unloaded: the definitions they export hold
/// vtables and function pointers into the library for the life of the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct DylibImporter;

impl BundleImporter for DylibImporter {
    fn import(&self, path: &Path) -> Result<BundleExports, PluginLoadError> {
        // SAFETY: loading a library runs its initialisers. Bundles are trusted
        // code placed beside the host by the operator.
        let library = unsafe { Library::new(path) }.map_err(|source| PluginLoadError::Library {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: the symbol is emitted by `declare_game_plugin!` with type
        // `PluginDeclaration`; the version check below guards its layout.
        let decl = unsafe {
            let symbol = library
                .get::<*const PluginDeclaration>(DECLARATION_SYMBOL)
                .map_err(|_| PluginLoadError::MissingDeclaration(path.to_path_buf()))?;
            (*symbol).read()
        };

        check_declaration(path, &decl)?;
        debug!(path = %path.display(), "bundle declaration accepted");

        std::mem::forget(library);
        Ok((decl.exports)())
    }
}

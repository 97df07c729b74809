//! Plugin discovery and loading.
//!
//! Discovery happens at build time (`discovery`, shared with `build.rs`):
//! in-tree games are compiled into an aggregate registrant and external game
//! crates are planned for `bgf-host build-bundles`. Loading happens at
//! startup (`loader`): the aggregate runs first, then bundles are imported
//! from the configured directories (`config`) through a `BundleImporter`,
//! by default the dynamic-library one in `dylib`.

pub mod config;
pub mod discovery;
pub mod dylib;
pub mod loader;

pub use config::LoaderConfig;
pub use discovery::{BundleEntry, DiscoveryReport, ExternalBundle, ExternalPlan};
pub use dylib::{
    check_declaration, DylibImporter, PluginDeclaration, ENGINE_VERSION, PLUGIN_ABI_VERSION,
    RUSTC_VERSION,
};
pub use loader::{BundleExports, BundleImporter, LoadReport, PluginLoader};

//! In-tree games.
//!
//! Every `*.rs` file (or `<name>/mod.rs` directory) next to this one is a
//! game module exposing `pub fn game_def()`. `build.rs` discovers them and
//! generates the module declarations plus `register_in_tree_games`, which the
//! plugin loader calls before searching for external bundles.
//!
//! - `sampler`: reveal and claim tiles on a small board
//! - `zia`: hex-map trading and combat

include!(concat!(env!("OUT_DIR"), "/in_tree_games.rs"));

//! Generic state-shape building blocks.
//!
//! None of these know any game's rules. Each one guards its own invariant:
//! - `Board<T>`: coordinates are bounds-checked
//! - `ResourcePool`: quantities never go negative, removal is atomic
//! - `Track`: position stays within `[min, max]`
//! - `Slot<T>`: length never exceeds capacity
//!
//! Failed operations return `PrimitiveError` and leave the value unchanged.
//! `PrimitiveError` converts into a move rejection, so handlers can use `?`.

pub mod board;
pub mod resources;
pub mod track;
pub mod slot;

pub use board::{Board, Cell, GamePiece, SquareBoard};
pub use resources::ResourcePool;
pub use track::Track;
pub use slot::Slot;

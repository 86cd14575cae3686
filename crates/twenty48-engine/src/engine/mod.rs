//! Engine module: compact 2048 board, fast shift/reward ops, precomputed
//! lookup tables, and the symmetry canonicalizer.
//!
//! - `Board` is the packed 4x4 state with useful methods.
//! - Free functions mirror the methods when convenient (e.g., `shift`).
//! - Internals (tables and hot ops) live in submodules to keep things tidy.

mod ops;
pub mod state;
pub mod symmetry;
mod tables;

pub use state::{Board, BoardError, Direction, Score};

pub use ops::{afterstate, count_empty, highest_tile, is_game_over, shift};

pub use symmetry::{canonical, canonical_afterstate, reflect_x, reflect_y, rotate_right};

/// Warm the internal precomputed tables.
/// Safe to call multiple times; table access also initializes lazily on
/// first use, so this only moves the one-time cost to a chosen point.
pub fn new() {
    tables::init();
}

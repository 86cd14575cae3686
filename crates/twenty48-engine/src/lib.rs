//! Deterministic 2048 board engine.
//!
//! The crate exposes a packed 4x4 board value type, table-driven
//! slide/merge moves with per-move rewards, and a symmetry
//! canonicalizer that folds the 8 rotated/reflected variants of a
//! board into one representative.

pub mod engine;

pub use engine::{Board, BoardError, Direction, Score};

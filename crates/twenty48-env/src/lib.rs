//! Step-based 2048 environment for automated agents.
//!
//! [`Env`] owns one live game: `reset` seeds a fresh board, `step`
//! applies a move and spawns a random tile, and the valid-action
//! queries let a caller enumerate legal moves without touching session
//! state. Board mechanics live in `twenty48-engine`.

pub mod config;
pub mod runner;
pub mod session;

pub use session::{Env, Step, ValidAction};
pub use twenty48_engine::engine::{
    afterstate, canonical, canonical_afterstate, reflect_x, reflect_y, rotate_right,
};
pub use twenty48_engine::{Board, BoardError, Direction, Score};

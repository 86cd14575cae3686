//! Dihedral symmetries of the board and the canonical representative.
//!
//! All 8 orbit members derive from two primitives: one horizontal-axis
//! reflection and one 90-degree clockwise rotation (itself the
//! composition of that reflection with the transpose).

use super::ops::{afterstate, transpose};
use super::state::{Board, Direction};

/// Reflect across the horizontal midline: rows swap top-for-bottom.
pub fn reflect_x(board: Board) -> Board {
    let x = board.0;
    Board::from_raw(
        (x << 48)
            | ((x << 16) & 0x0000_FFFF_0000_0000)
            | ((x >> 16) & 0x0000_0000_FFFF_0000)
            | (x >> 48),
    )
}

/// Reflect across the vertical midline: each row reverses.
pub fn reflect_y(board: Board) -> Board {
    let x = board.0;
    Board::from_raw(
        ((x >> 12) & 0x000F_000F_000F_000F)
            | ((x >> 4) & 0x00F0_00F0_00F0_00F0)
            | ((x << 4) & 0x0F00_0F00_0F00_0F00)
            | ((x << 12) & 0xF000_F000_F000_F000),
    )
}

/// Rotate the board 90 degrees clockwise.
pub fn rotate_right(board: Board) -> Board {
    // new[r][c] = old[3-c][r]: reflect rows, then transpose.
    Board::from_raw(transpose(reflect_x(board).0))
}

/// The canonical representative of `board`'s 8-member symmetry orbit.
///
/// Representatives are ordered cell by cell from the top-left, keeping
/// the largest. Cell 0 sits in the most significant
/// nibble of the packed word, so that comparison is numeric comparison
/// of the raw `u64` and the representative is simply the orbit maximum,
/// which is unique even when symmetric variants coincide.
pub fn canonical(board: Board) -> Board {
    let mut best = board.0;
    let mut rotated = board;
    for _ in 0..3 {
        rotated = rotate_right(rotated);
        best = best.max(rotated.0);
    }
    let mut mirrored = reflect_x(board);
    best = best.max(mirrored.0);
    for _ in 0..3 {
        mirrored = rotate_right(mirrored);
        best = best.max(mirrored.0);
    }
    Board::from_raw(best)
}

/// Canonical form of the board after squashing in `direction`, before
/// any random tile spawn.
pub fn canonical_afterstate(board: Board, direction: Direction) -> Board {
    canonical(afterstate(board, direction).0)
}

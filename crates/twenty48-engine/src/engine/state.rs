use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ops, symmetry};

// Internal type aliases for the packed representation
pub(crate) type BoardRaw = u64;
pub(crate) type Line = u64;
pub(crate) type Tile = u64;

/// Reward/score unit. Session scores are monotone sums of these.
pub type Score = u64;

/// Largest representable tile exponent (tile value 32768). Tiles at the
/// cap do not merge further.
pub const MAX_EXPONENT: u8 = 15;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in a fixed reference order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Error returned when external cell data does not describe a valid board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board must have exactly 16 cells, got {0}")]
    WrongLength(usize),
    #[error("cell {index} holds {value}; cells must be 0 or a power of two in 2..=32768")]
    InvalidTile { index: usize, value: u32 },
}

/// Packed 4x4 2048 board as 16 4-bit tile exponents in a `u64`.
///
/// Cells run row-major with cell 0 (top-left) in the most significant
/// nibble. A nibble `e` denotes the tile `2^e`; 0 is an empty cell.
/// Boards are plain values: every operation returns a new `Board`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw {
        self.0
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Pack 16 row-major tile exponents into a `Board`.
    pub fn from_exponents(exponents: [u8; 16]) -> Self {
        let raw = exponents.iter().fold(0u64, |acc, &e| {
            debug_assert!(e <= MAX_EXPONENT);
            (acc << 4) | u64::from(e & 0xf)
        });
        Board(raw)
    }

    /// Build a board from 16 row-major cell values (0 for empty, else a
    /// power of two in `2..=32768`).
    ///
    /// This is the validation boundary for externally supplied boards:
    /// bad input is rejected without producing a board.
    pub fn from_values(cells: &[u32]) -> Result<Self, BoardError> {
        if cells.len() != 16 {
            return Err(BoardError::WrongLength(cells.len()));
        }
        let mut exponents = [0u8; 16];
        for (index, &value) in cells.iter().enumerate() {
            if value == 0 {
                continue;
            }
            if !value.is_power_of_two() || value < 2 || value > (1 << MAX_EXPONENT) {
                return Err(BoardError::InvalidTile { index, value });
            }
            exponents[index] = value.trailing_zeros() as u8;
        }
        Ok(Board::from_exponents(exponents))
    }

    /// The tile exponent at `idx` (0..16, row-major). 0 means empty.
    #[inline]
    pub fn exponent(self, idx: usize) -> u8 {
        ((self.0 >> (60 - (4 * idx))) & 0xf) as u8
    }

    /// The cell's actual value at `idx` (0 if empty), e.g., 2, 4, 8, ...
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 {
        match self.exponent(idx) {
            0 => 0,
            e => 1 << e,
        }
    }

    /// Replace the cell at `idx` with the tile `2^exponent`.
    #[inline]
    pub fn with_tile(self, idx: usize, exponent: u8) -> Self {
        debug_assert!(idx < 16 && exponent <= MAX_EXPONENT);
        let shift = 60 - (4 * idx);
        Board((self.0 & !(0xf << shift)) | (u64::from(exponent) << shift))
    }

    /// Row-major indices of empty cells.
    pub fn empty_cells(self) -> Vec<usize> {
        (0..16).filter(|&idx| self.exponent(idx) == 0).collect()
    }

    /// Return the board resulting from sliding/merging tiles in
    /// `direction` (no random insert).
    ///
    /// ```
    /// use twenty48_engine::{Board, Direction};
    /// let b = Board::EMPTY;
    /// assert_eq!(b.shift(Direction::Left), b);
    /// ```
    #[inline]
    pub fn shift(self, direction: Direction) -> Self {
        ops::shift(self, direction)
    }

    /// Slide/merge in `direction` and report the merge reward for the move.
    ///
    /// The reward is the sum of the tile values created by merges; it is
    /// 0 whenever the move does not change the board.
    #[inline]
    pub fn afterstate(self, direction: Direction) -> (Self, Score) {
        ops::afterstate(self, direction)
    }

    /// The canonical representative of this board's 8-member
    /// rotation/reflection orbit.
    #[inline]
    pub fn canonical(self) -> Self {
        symmetry::canonical(self)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen
    /// empty cell. Returns `None` when the board is full.
    ///
    /// Makes two draws from the one `rng` stream, position first and
    /// value second. A session that reseeds its generator before every
    /// draw spawns through its own per-draw sequence instead.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use twenty48_engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY
    ///     .with_random_tile(&mut rng)
    ///     .unwrap()
    ///     .with_random_tile(&mut rng)
    ///     .unwrap();
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Option<Self> {
        let empty = ops::count_empty(self);
        if empty == 0 {
            return None;
        }
        let mut index = rng.gen_range(0..empty);
        let mut tmp = self.0;
        let mut tile = generate_random_tile(rng) << 60;
        // Walk nibbles from cell 0 until the chosen empty slot lines up.
        loop {
            while (tmp >> 60) != 0 {
                tmp <<= 4;
                tile >>= 4;
            }
            if index == 0 {
                break;
            }
            index -= 1;
            tmp <<= 4;
            tile >>= 4;
        }
        Some(Board(self.0 | tile))
    }

    /// Return true if no legal moves remain.
    #[inline]
    pub fn is_game_over(self) -> bool {
        ops::is_game_over(self)
    }

    /// Return the highest tile value (e.g., 2048) present, 0 if empty.
    #[inline]
    pub fn highest_tile(self) -> u32 {
        ops::highest_tile(self)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u64 {
        ops::count_empty(self)
    }

    /// Iterate over tile exponents in row-major order.
    #[inline]
    pub fn tiles(self) -> TilesIter {
        TilesIter { raw: self.0, idx: 0 }
    }

    /// Collect the 16 row-major tile exponents.
    pub fn to_exponents(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (slot, e) in out.iter_mut().zip(self.tiles()) {
            *slot = e;
        }
        out
    }

    /// Collect the 16 row-major cell values (0 for empty).
    pub fn to_values(self) -> [u32; 16] {
        let mut out = [0u32; 16];
        for (idx, slot) in out.iter_mut().enumerate() {
            *slot = self.tile_value(idx);
        }
        out
    }
}

/// Draw the exponent for a freshly spawned tile: 1 (tile 2) with
/// probability 0.9, else 2 (tile 4).
pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 {
        1
    } else {
        2
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

/// Human-readable grid: four rows of width-5 right-justified cell
/// values, empties shown as a middle dot.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            for col in 0..4 {
                if col > 0 {
                    write!(f, " ")?;
                }
                match self.tile_value(row * 4 + col) {
                    0 => write!(f, "{:>5}", "·")?,
                    v => write!(f, "{v:>5}")?,
                }
            }
            if row < 3 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}
impl From<Board> for BoardRaw {
    fn from(b: Board) -> Self {
        b.into_raw()
    }
}

/// Iterator over board tiles (exponents) in row-major order.
pub struct TilesIter {
    raw: BoardRaw,
    idx: usize,
}

impl Iterator for TilesIter {
    type Item = u8;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= 16 {
            return None;
        }
        let n = ((self.raw >> (60 - (4 * self.idx))) & 0xf) as u8;
        self.idx += 1;
        Some(n)
    }
}

impl IntoIterator for Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn from_values_round_trips() {
        let cells: [u32; 16] = [0, 2, 4, 8, 16, 0, 0, 32, 64, 128, 256, 0, 512, 1024, 2048, 0];
        let board = Board::from_values(&cells).unwrap();
        assert_eq!(board.to_values(), cells);
    }

    #[test]
    fn from_values_rejects_wrong_length() {
        assert_eq!(
            Board::from_values(&[0u32; 15]),
            Err(BoardError::WrongLength(15))
        );
        assert_eq!(
            Board::from_values(&[0u32; 17]),
            Err(BoardError::WrongLength(17))
        );
    }

    #[test]
    fn from_values_rejects_non_powers() {
        let mut cells = [0u32; 16];
        cells[5] = 3;
        assert_eq!(
            Board::from_values(&cells),
            Err(BoardError::InvalidTile { index: 5, value: 3 })
        );
        cells[5] = 1;
        assert_eq!(
            Board::from_values(&cells),
            Err(BoardError::InvalidTile { index: 5, value: 1 })
        );
        cells[5] = 65536;
        assert_eq!(
            Board::from_values(&cells),
            Err(BoardError::InvalidTile {
                index: 5,
                value: 65536
            })
        );
    }

    #[test]
    fn exponent_packing_is_row_major_msb_first() {
        let board = Board::from_raw(0x0123456789abcdef);
        assert_eq!(board.exponent(0), 0);
        assert_eq!(board.exponent(1), 1);
        assert_eq!(board.exponent(15), 0xf);
        assert_eq!(board.tile_value(3), 8);
        assert_eq!(board.tile_value(10), 1024);
        assert_eq!(board.tile_value(15), 32768);
        assert_eq!(Board::from_exponents(board.to_exponents()), board);
    }

    #[test]
    fn with_tile_replaces_one_cell() {
        let board = Board::EMPTY.with_tile(0, 2).with_tile(15, 1);
        assert_eq!(board.tile_value(0), 4);
        assert_eq!(board.tile_value(15), 2);
        assert_eq!(board.count_empty(), 14);
    }

    #[test]
    fn empty_cells_lists_zero_nibbles() {
        let board = Board::from_raw(0x1000_0000_0000_0002);
        assert_eq!(board.empty_cells().len(), 14);
        assert!(!board.empty_cells().contains(&0));
        assert!(!board.empty_cells().contains(&15));
    }

    #[test]
    fn random_tiles_fill_the_board_then_stop() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut board = Board::EMPTY;
        for _ in 0..16 {
            board = board.with_random_tile(&mut rng).unwrap();
        }
        assert_eq!(board.count_empty(), 0);
        assert_eq!(board.with_random_tile(&mut rng), None);
    }

    #[test]
    fn display_matches_render_format() {
        let mut cells = [0u32; 16];
        cells[0] = 2;
        cells[5] = 1024;
        let board = Board::from_values(&cells).unwrap();
        let text = board.to_string();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "    2     ·     ·     ·");
        assert_eq!(lines[1], "    ·  1024     ·     ·");
        assert_eq!(lines[3], "    ·     ·     ·     ·");
    }
}

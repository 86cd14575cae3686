use std::sync::OnceLock;

use super::state::{Line, Score, Tile, MAX_EXPONENT};

/// Precomputed lookup tables for all possible 4-tile lines (16-bit packed).
///
/// Why: squashing a row or column depends only on its 4 nibbles. There
/// are 2^16 possible 16-bit values, so every line is enumerated once
/// through the explicit merge algorithm and the per-move work becomes a
/// handful of table reads.
///
/// Layout:
/// - `shift_left/right[i]`: replacement row-packed line after the move.
/// - `shift_up/down[i]`: replacement column-packed line (the caller
///   extracts columns from a transposed board).
/// - `reward[i]`: sum of tile values created by merges when squashing
///   the line. Merge reward is direction-independent (merges pair up
///   inside maximal equal runs after compaction), so one table serves
///   all four directions.
pub(crate) struct Stores {
    pub(crate) shift_left: Box<[u64]>,
    pub(crate) shift_right: Box<[u64]>,
    pub(crate) shift_up: Box<[u64]>,
    pub(crate) shift_down: Box<[u64]>,
    pub(crate) reward: Box<[Score]>,
}

pub(crate) const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

static STORES: OnceLock<Stores> = OnceLock::new();

/// Force table initialization now instead of on first access.
pub(crate) fn init() {
    let _ = stores();
}

#[inline(always)]
pub(crate) fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    // Allocate on the heap to keep stack frames small during init.
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut reward = vec![0u64; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let tiles = unpack(val as Line);
        let (toward_start, line_reward) = squash(tiles);
        let toward_end = reverse(squash(reverse(tiles)).0);
        shift_left[val] = pack_row(toward_start);
        shift_right[val] = pack_row(toward_end);
        shift_up[val] = pack_col(toward_start);
        shift_down[val] = pack_col(toward_end);
        reward[val] = line_reward;
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        reward: reward.into_boxed_slice(),
    }
}

/// Squash a line toward index 0: compact non-zero tiles, merge adjacent
/// equal pairs once left-to-right, pad with zeros. Returns the squashed
/// tiles and the merge reward (sum of created tile values).
///
/// A freshly merged tile never merges again in the same pass, and tiles
/// already at `MAX_EXPONENT` do not merge at all.
fn squash(tiles: [Tile; 4]) -> ([Tile; 4], Score) {
    let mut compact = [0; 4];
    let mut len = 0;
    for &t in &tiles {
        if t != 0 {
            compact[len] = t;
            len += 1;
        }
    }

    let mut out = [0; 4];
    let mut reward = 0;
    let (mut src, mut dst) = (0, 0);
    while src < len {
        if src + 1 < len
            && compact[src] == compact[src + 1]
            && compact[src] < Tile::from(MAX_EXPONENT)
        {
            out[dst] = compact[src] + 1;
            reward += 1u64 << (compact[src] + 1);
            src += 2;
        } else {
            out[dst] = compact[src];
            src += 1;
        }
        dst += 1;
    }
    (out, reward)
}

fn unpack(line: Line) -> [Tile; 4] {
    [
        (line >> 12) & 0xf,
        (line >> 8) & 0xf,
        (line >> 4) & 0xf,
        line & 0xf,
    ]
}

fn reverse(tiles: [Tile; 4]) -> [Tile; 4] {
    [tiles[3], tiles[2], tiles[1], tiles[0]]
}

fn pack_row(tiles: [Tile; 4]) -> Line {
    tiles[0] << 12 | tiles[1] << 8 | tiles[2] << 4 | tiles[3]
}

fn pack_col(tiles: [Tile; 4]) -> Line {
    tiles[0] << 48 | tiles[1] << 32 | tiles[2] << 16 | tiles[3]
}

#[inline(always)]
pub(crate) fn line_entry(table: &[u64], idx: u16) -> u64 {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    unsafe { *table.get_unchecked(idx as usize) }
}

#[inline(always)]
pub(crate) fn reward_entry(idx: u16) -> Score {
    let reward_table = &stores().reward;
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    unsafe { *reward_table.get_unchecked(idx as usize) }
}

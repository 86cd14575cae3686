use super::state::{Board, BoardRaw, Direction, Line, Score};
use super::tables::{line_entry, reward_entry, stores};

/// Slide/merge tiles in the given direction. No randomness, no reward.
pub fn shift(board: Board, direction: Direction) -> Board {
    match direction {
        Direction::Left | Direction::Right => shift_rows(board, direction),
        Direction::Up | Direction::Down => shift_cols(board, direction),
    }
}

/// Slide/merge tiles and report the move's total merge reward.
///
/// Stateless and referentially transparent: the same `(board,
/// direction)` always yields the same result, and an immovable board
/// comes back identical with reward 0 (a line only earns reward by
/// merging, and merging always changes the line).
pub fn afterstate(board: Board, direction: Direction) -> (Board, Score) {
    let moved = shift(board, direction);
    // The reward table is indexed by the pre-move line; columns are read
    // off the transposed board the same way rows are.
    let lanes = match direction {
        Direction::Left | Direction::Right => board.0,
        Direction::Up | Direction::Down => transpose(board.0),
    };
    let reward = (0..4).fold(0, |acc, lane_idx| {
        acc + reward_entry(extract_line(lanes, lane_idx) as u16)
    });
    (moved, reward)
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

/// True if no move in any direction changes the board.
pub fn is_game_over(board: Board) -> bool {
    Direction::ALL
        .iter()
        .all(|&direction| shift(board, direction) == board)
}

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
/// Count the number of zero tiles.
pub fn count_empty(board: Board) -> u64 {
    16 - count_non_empty(board)
}

/// The highest tile value present on the board, 0 when empty.
pub fn highest_tile(board: Board) -> u32 {
    board
        .tiles()
        .max()
        .map(|e| if e == 0 { 0 } else { 1 << e })
        .unwrap_or(0)
}

fn shift_rows(board: Board, direction: Direction) -> Board {
    let s = stores();
    let table: &[u64] = match direction {
        Direction::Left => &s.shift_left,
        Direction::Right => &s.shift_right,
        _ => unreachable!("shift_rows only handles horizontal moves"),
    };
    let res = (0..4).fold(0, |new_board, row_idx| {
        let row_val = extract_line(board.0, row_idx) as u16;
        let new_row_val = line_entry(table, row_val);
        new_board | (new_row_val << (48 - (16 * row_idx)))
    });
    Board(res)
}

fn shift_cols(board: Board, direction: Direction) -> Board {
    let transpose_board = transpose(board.0);
    let s = stores();
    let table: &[u64] = match direction {
        Direction::Up => &s.shift_up,
        Direction::Down => &s.shift_down,
        _ => unreachable!("shift_cols only handles vertical moves"),
    };
    let res = (0..4).fold(0, |new_board, col_idx| {
        let col_val = extract_line(transpose_board, col_idx) as u16;
        let new_col_val = line_entry(table, col_val);
        new_board | (new_col_val << (12 - (4 * col_idx)))
    });
    Board(res)
}

fn count_non_empty(board: Board) -> u64 {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_left() {
        assert_eq!(
            shift(Board::from_raw(0x0000), Direction::Left),
            Board::from_raw(0x0000)
        );
        assert_eq!(
            shift(Board::from_raw(0x0002), Direction::Left),
            Board::from_raw(0x2000)
        );
        assert_eq!(
            shift(Board::from_raw(0x2020), Direction::Left),
            Board::from_raw(0x3000)
        );
        assert_eq!(
            shift(Board::from_raw(0x1332), Direction::Left),
            Board::from_raw(0x1420)
        );
        assert_eq!(
            shift(Board::from_raw(0x1234), Direction::Left),
            Board::from_raw(0x1234)
        );
        assert_eq!(
            shift(Board::from_raw(0x1002), Direction::Left),
            Board::from_raw(0x1200)
        );
        assert_ne!(
            shift(Board::from_raw(0x1210), Direction::Left),
            Board::from_raw(0x2200)
        );
    }

    #[test]
    fn test_shift_right() {
        assert_eq!(
            shift(Board::from_raw(0x0000), Direction::Right),
            Board::from_raw(0x0000)
        );
        assert_eq!(
            shift(Board::from_raw(0x2000), Direction::Right),
            Board::from_raw(0x0002)
        );
        assert_eq!(
            shift(Board::from_raw(0x2020), Direction::Right),
            Board::from_raw(0x0003)
        );
        assert_eq!(
            shift(Board::from_raw(0x1332), Direction::Right),
            Board::from_raw(0x0142)
        );
        assert_eq!(
            shift(Board::from_raw(0x1234), Direction::Right),
            Board::from_raw(0x1234)
        );
        assert_eq!(
            shift(Board::from_raw(0x1002), Direction::Right),
            Board::from_raw(0x0012)
        );
        assert_ne!(
            shift(Board::from_raw(0x0121), Direction::Right),
            Board::from_raw(0x0022)
        );
    }

    #[test]
    fn test_move_left() {
        let game = Board::from_raw(0x1234133220021002);
        let game = shift(game, Direction::Left);
        assert_eq!(game, Board::from_raw(0x1234142030001200));
    }

    #[test]
    fn test_move_up() {
        let game = Board::from_raw(0x1121230033004222);
        let game = shift(game, Direction::Up);
        assert_eq!(game, Board::from_raw(0x1131240232004000));
    }

    #[test]
    fn test_move_right() {
        let game = Board::from_raw(0x1234133220021002);
        let game = shift(game, Direction::Right);
        assert_eq!(game, Board::from_raw(0x1234014200030012));
    }

    #[test]
    fn test_move_down() {
        let game = Board::from_raw(0x1121230033004222);
        let game = shift(game, Direction::Down);
        assert_eq!(game, Board::from_raw(0x1000210034014232));
    }

    #[test]
    fn afterstate_row_merge_reward() {
        // Row 0 holds [0, 0, 2, 2]; LEFT squashes it to [4, 0, 0, 0]
        // for a reward of 4.
        let board = Board::from_values(&[
            0, 0, 2, 2, //
            0, 0, 0, 0, //
            0, 0, 0, 0, //
            0, 0, 0, 0,
        ])
        .unwrap();
        let (after, reward) = afterstate(board, Direction::Left);
        assert_eq!(after.to_values()[..4], [4, 0, 0, 0]);
        assert_eq!(reward, 4);
    }

    #[test]
    fn afterstate_does_not_chain_merges() {
        // [2, 2, 2, 2] merges pairwise to [4, 4, 0, 0], reward 8; the
        // two fresh 4s do not merge in the same move.
        let board = Board::from_values(&[
            2, 2, 2, 2, //
            0, 0, 0, 0, //
            0, 0, 0, 0, //
            0, 0, 0, 0,
        ])
        .unwrap();
        let (after, reward) = afterstate(board, Direction::Left);
        assert_eq!(after.to_values()[..4], [4, 4, 0, 0]);
        assert_eq!(reward, 8);
    }

    #[test]
    fn afterstate_sums_all_lanes() {
        // Two mergeable columns under UP: 2+2 in column 0, 4+4 in column 3.
        let board = Board::from_values(&[
            2, 0, 0, 4, //
            2, 0, 0, 4, //
            0, 0, 0, 0, //
            0, 0, 0, 0,
        ])
        .unwrap();
        let (after, reward) = afterstate(board, Direction::Up);
        assert_eq!(reward, 12);
        assert_eq!(after.tile_value(0), 4);
        assert_eq!(after.tile_value(3), 8);
        assert_eq!(after.count_empty(), 14);
    }

    #[test]
    fn immovable_board_is_a_no_op_in_all_directions() {
        // Full board, no adjacent equal neighbors in any direction.
        let board = Board::from_values(&[
            2, 4, 2, 4, //
            4, 2, 4, 2, //
            2, 4, 2, 4, //
            4, 2, 4, 2,
        ])
        .unwrap();
        for direction in Direction::ALL {
            let (after, reward) = afterstate(board, direction);
            assert_eq!(after, board);
            assert_eq!(reward, 0);
        }
        assert!(is_game_over(board));
    }

    #[test]
    fn game_over_needs_full_board_and_no_merges() {
        assert!(!is_game_over(Board::from_raw(0x1000_0000_0000_0000)));
        // Full board with one mergeable pair is not over.
        let board = Board::from_values(&[
            2, 4, 2, 4, //
            4, 2, 4, 2, //
            2, 4, 2, 4, //
            4, 2, 4, 4,
        ])
        .unwrap();
        assert!(!is_game_over(board));
    }

    #[test]
    fn it_count_empty() {
        let game = Board::from_raw(0x1111000011110000);
        assert_eq!(count_empty(game), 8);
        let game = Board::from_raw(0x1100000000000000);
        assert_eq!(count_empty(game), 14);
    }

    #[test]
    fn it_count_non_empty() {
        let game = Board::from_raw(0x1134000000000000);
        assert_eq!(count_non_empty(game), 4);
    }

    #[test]
    fn highest_tile_handles_empty_boards() {
        assert_eq!(highest_tile(Board::EMPTY), 0);
        assert_eq!(highest_tile(Board::from_raw(0x0123456789abcdef)), 32768);
    }
}

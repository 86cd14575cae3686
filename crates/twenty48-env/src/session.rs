use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use twenty48_engine::engine::{self, Board, BoardError, Direction, Score};

/// Spawn randomness for one session.
///
/// `Entropy` draws from a single entropy-seeded stream. `Reseeded`
/// rebuilds the generator from the fixed seed immediately before every
/// draw: a draw's outcome depends only on the seed and the draw's
/// range, never on session history.
enum SpawnRng {
    Entropy(StdRng),
    Reseeded(u64),
}

impl SpawnRng {
    fn draw<T>(&mut self, draw: impl FnOnce(&mut StdRng) -> T) -> T {
        match self {
            SpawnRng::Entropy(rng) => draw(rng),
            SpawnRng::Reseeded(seed) => draw(&mut StdRng::seed_from_u64(*seed)),
        }
    }
}

/// The observable outcome of one `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Board after the move and any tile spawn.
    pub board: Board,
    /// Merge reward earned by the move (0 for a no-op move).
    pub reward: Score,
    /// True when no direction can change the board any more.
    pub done: bool,
}

/// One legal move: the direction, its merge reward, and the board it
/// produces (afterstate only, no random spawn).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidAction {
    pub direction: Direction,
    pub reward: Score,
    pub board: Board,
}

/// A live 2048 game session.
///
/// Owns the current board, the cumulative score (monotone within an
/// episode), a cache of empty-cell indices, and the spawn RNG policy.
/// `step` and `reset` are the only mutating operations; everything
/// else is a pure query. One session is single-threaded; distinct
/// sessions are fully independent.
pub struct Env {
    board: Board,
    score: Score,
    empty: Vec<usize>,
    rng: SpawnRng,
}

impl Env {
    /// A fresh session with entropy-seeded spawns, already reset.
    pub fn new() -> Self {
        Self::build(SpawnRng::Entropy(StdRng::from_entropy()))
    }

    /// A fresh session whose spawn draws reseed from `seed` before
    /// every draw, already reset.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(SpawnRng::Reseeded(seed))
    }

    fn build(rng: SpawnRng) -> Self {
        let mut env = Self {
            board: Board::EMPTY,
            score: 0,
            empty: Vec::new(),
            rng,
        };
        env.reset();
        env
    }

    /// Clear the board, spawn two random tiles, and zero the score.
    pub fn reset(&mut self) -> Board {
        self.replace_board(Board::EMPTY);
        self.spawn_tile();
        self.spawn_tile();
        self.score = 0;
        self.board
    }

    /// Apply one move. If the move changes the board, a random tile is
    /// spawned into a uniformly chosen empty cell (2 with probability
    /// 0.9, else 4). The move's merge reward is added to the score.
    pub fn step(&mut self, direction: Direction) -> Step {
        let (after, reward) = engine::afterstate(self.board, direction);
        if after != self.board {
            self.replace_board(after);
            self.spawn_tile();
        }
        self.score += reward;
        Step {
            board: self.board,
            reward,
            done: self.is_done(),
        }
    }

    /// Replace the live board with externally supplied cell values.
    /// Rejects malformed input without touching session state; the
    /// score is deliberately left alone.
    pub fn set_board(&mut self, cells: &[u32]) -> Result<Board, BoardError> {
        let board = Board::from_values(cells)?;
        self.replace_board(board);
        Ok(board)
    }

    /// The current board.
    pub fn board(&self) -> Board {
        self.board
    }

    /// Cumulative score for this episode.
    pub fn score(&self) -> Score {
        self.score
    }

    /// True iff no direction produces a changed board.
    pub fn is_done(&self) -> bool {
        engine::is_game_over(self.board)
    }

    /// Every direction that would change the board, with its reward and
    /// afterstate. Directions are probed in randomized order; the probe
    /// never spawns a tile and never touches session state.
    pub fn get_valid_actions(&self) -> Vec<ValidAction> {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut rand::thread_rng());
        directions
            .iter()
            .filter_map(|&direction| {
                let (board, reward) = engine::afterstate(self.board, direction);
                (board != self.board).then_some(ValidAction {
                    direction,
                    reward,
                    board,
                })
            })
            .collect()
    }

    /// Legal moves sorted by descending reward. Order among equal
    /// rewards is unspecified.
    pub fn get_valid_actions_by_reward(&self) -> Vec<ValidAction> {
        let mut actions = self.get_valid_actions();
        actions.sort_unstable_by(|a, b| b.reward.cmp(&a.reward));
        actions
    }

    /// Just the legal directions.
    pub fn valid_actions(&self) -> Vec<Direction> {
        self.get_valid_actions()
            .into_iter()
            .map(|action| action.direction)
            .collect()
    }

    /// The board as a printable grid: width-5 right-justified cell
    /// values, `·` for empty cells, followed by a blank line.
    pub fn render(&self) -> String {
        format!("{}\n\n", self.board)
    }

    /// Print the grid to stdout.
    pub fn render_board(&self) {
        println!("{}", self.render());
    }

    fn replace_board(&mut self, board: Board) {
        self.board = board;
        self.empty = board.empty_cells();
    }

    /// Spawn one random tile. Returns the cell index, or `None` when no
    /// empty cell exists (benign: a move can fill the board exactly).
    fn spawn_tile(&mut self) -> Option<usize> {
        if self.empty.is_empty() {
            return None;
        }
        // Value first, then position. Two separate draws, so the
        // fixed-seed policy reseeds before each.
        let exponent = self
            .rng
            .draw(|rng| if rng.gen_range(0..10) < 9 { 1u8 } else { 2u8 });
        let slots = self.empty.len();
        let slot = self.rng.draw(|rng| rng.gen_range(0..slots));
        let idx = self.empty[slot];
        self.replace_board(self.board.with_tile(idx, exponent));
        Some(idx)
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

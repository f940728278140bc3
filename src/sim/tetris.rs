//! Tetris on a 10x20 board
//!
//! Gravity pulls the current piece down one row per tick; the tick interval
//! shrinks as the level rises. Rotation is clockwise without wall kicks.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::game::{Game, GameEvent, GameId, GamePhase, Key};
use crate::canvas::{Canvas, Rgba, hex, palette};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
pub const CELL_SIZE: f32 = 20.0;
pub const LINES_PER_LEVEL: u32 = 10;
pub const LINE_SCORE: u32 = 100;

/// Gravity interval at level 0 (ms); each level shaves off `LEVEL_SPEEDUP_MS`
const BASE_DROP_MS: f64 = 500.0;
const LEVEL_SPEEDUP_MS: f64 = 50.0;
const MIN_DROP_MS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tetromino {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::O,
        Tetromino::T,
        Tetromino::S,
        Tetromino::Z,
        Tetromino::J,
        Tetromino::L,
    ];

    /// Spawn orientation, rows top to bottom
    pub fn shape(&self) -> Shape {
        let rows: &[&[u8]] = match self {
            Tetromino::I => &[&[1, 1, 1, 1]],
            Tetromino::O => &[&[1, 1], &[1, 1]],
            Tetromino::T => &[&[0, 1, 0], &[1, 1, 1]],
            Tetromino::S => &[&[0, 1, 1], &[1, 1, 0]],
            Tetromino::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Tetromino::J => &[&[1, 0, 0], &[1, 1, 1]],
            Tetromino::L => &[&[0, 0, 1], &[1, 1, 1]],
        };
        Shape(rows.iter().map(|r| r.iter().map(|&c| c == 1).collect()).collect())
    }

    pub fn color(&self) -> Rgba {
        match self {
            Tetromino::I => hex(0x00ffff),
            Tetromino::O => hex(0xffff00),
            Tetromino::T => hex(0x800080),
            Tetromino::S => hex(0x00ff00),
            Tetromino::Z => hex(0xff0000),
            Tetromino::J => hex(0x0000ff),
            Tetromino::L => hex(0xffa500),
        }
    }
}

/// Occupancy matrix of a piece, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape(pub Vec<Vec<bool>>);

impl Shape {
    pub fn width(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.0.len()
    }

    /// Quarter turn clockwise: column `i` read bottom-up becomes row `i`
    pub fn rotated_cw(&self) -> Shape {
        let h = self.height();
        Shape(
            (0..self.width())
                .map(|col| (0..h).rev().map(|row| self.0[row][col]).collect())
                .collect(),
        )
    }

    /// Occupied (dx, dy) offsets
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.0.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| (x as i32, y as i32))
        })
    }
}

/// The falling piece
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: Tetromino,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Centred on the top row
    pub fn spawn(kind: Tetromino) -> Self {
        let shape = kind.shape();
        let x = (BOARD_WIDTH / 2) as i32 - (shape.width() / 2) as i32;
        Self { kind, shape, x, y: 0 }
    }

    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated_cw(),
            ..self.clone()
        }
    }

    /// Absolute board coordinates of every occupied cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.cells().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }
}

/// Locked cells; `None` is empty
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: Vec<[Option<Tetromino>; BOARD_WIDTH]>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            rows: vec![[None; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }
}

impl Board {
    pub fn get(&self, x: usize, y: usize) -> Option<Tetromino> {
        self.rows.get(y).and_then(|row| row.get(x).copied().flatten())
    }

    /// A piece fits when every cell is inside the walls, above the floor and
    /// on an empty cell. Cells above the top edge are allowed.
    pub fn fits(&self, piece: &Piece) -> bool {
        piece.cells().all(|(x, y)| {
            if x < 0 || x >= BOARD_WIDTH as i32 || y >= BOARD_HEIGHT as i32 {
                return false;
            }
            y < 0 || self.rows[y as usize][x as usize].is_none()
        })
    }

    /// Write the piece into the board; cells above the top edge are dropped
    pub fn lock(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            if y >= 0 && (x as usize) < BOARD_WIDTH && (y as usize) < BOARD_HEIGHT {
                self.rows[y as usize][x as usize] = Some(piece.kind);
            }
        }
    }

    /// Remove full rows, shift the rest down, return the count
    pub fn clear_lines(&mut self) -> u32 {
        self.rows.retain(|row| row.iter().any(Option::is_none));
        let cleared = BOARD_HEIGHT - self.rows.len();
        for _ in 0..cleared {
            self.rows.insert(0, [None; BOARD_WIDTH]);
        }
        cleared as u32
    }

    /// Height of each column (0 = empty)
    pub fn column_heights(&self) -> [usize; BOARD_WIDTH] {
        let mut heights = [0; BOARD_WIDTH];
        for (x, h) in heights.iter_mut().enumerate() {
            *h = self
                .rows
                .iter()
                .position(|row| row[x].is_some())
                .map_or(0, |top| BOARD_HEIGHT - top);
        }
        heights
    }

    /// Empty cells with a filled cell somewhere above them
    pub fn holes(&self) -> usize {
        (0..BOARD_WIDTH)
            .map(|x| {
                self.rows
                    .iter()
                    .skip_while(|row| row[x].is_none())
                    .filter(|row| row[x].is_none())
                    .count()
            })
            .sum()
    }

    pub fn filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }
}

#[derive(Debug, Clone)]
pub struct Tetris {
    pub board: Board,
    pub current: Piece,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub phase: GamePhase,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl Tetris {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let current = Piece::spawn(random_kind(&mut rng));
        Self {
            board: Board::default(),
            current,
            score: 0,
            level: 1,
            lines: 0,
            phase: GamePhase::Playing,
            rng,
            events: Vec::new(),
        }
    }

    /// Gravity interval for the current level
    pub fn drop_interval_ms(&self) -> f64 {
        (BASE_DROP_MS - self.level as f64 * LEVEL_SPEEDUP_MS).max(MIN_DROP_MS)
    }

    fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let moved = self.current.shifted(dx, dy);
        if self.board.fits(&moved) {
            self.current = moved;
            true
        } else {
            false
        }
    }

    fn try_rotate(&mut self) {
        let rotated = self.current.rotated();
        if self.board.fits(&rotated) {
            self.current = rotated;
        }
    }

    /// Move down one row, locking the piece if it can't
    fn step_down(&mut self) {
        if !self.try_move(0, 1) {
            self.lock_piece();
        }
    }

    fn hard_drop(&mut self) {
        while self.try_move(0, 1) {}
        self.lock_piece();
    }

    fn lock_piece(&mut self) {
        self.board.lock(&self.current);
        self.events.push(GameEvent::PieceLocked);

        let cleared = self.board.clear_lines();
        if cleared > 0 {
            // Scored at the level the lines were cleared on
            self.score += cleared * LINE_SCORE * self.level;
            self.lines += cleared;
            self.level = self.lines / LINES_PER_LEVEL + 1;
            self.events.push(GameEvent::LinesCleared(cleared));
        }

        let next = Piece::spawn(random_kind(&mut self.rng));
        if self.board.fits(&next) {
            self.current = next;
        } else {
            self.phase = GamePhase::Lost;
            self.events.push(GameEvent::Lost);
            log::info!(
                "Tetris over: score {}, level {}, lines {}",
                self.score,
                self.level,
                self.lines
            );
        }
    }

    /// Best (rotations, x) for the current piece by a simple stacking heuristic
    fn best_placement(&self) -> Option<(usize, i32)> {
        let mut best: Option<(f32, usize, i32)> = None;
        let mut shape_piece = self.current.clone();

        for rotations in 0..4 {
            for x in -3..BOARD_WIDTH as i32 {
                let mut candidate = Piece { x, ..shape_piece.clone() };
                if !self.board.fits(&candidate) {
                    continue;
                }
                while self.board.fits(&candidate.shifted(0, 1)) {
                    candidate.y += 1;
                }

                let mut board = self.board.clone();
                board.lock(&candidate);
                let cleared = board.clear_lines() as f32;
                let heights = board.column_heights();
                let aggregate: usize = heights.iter().sum();
                let bumpiness: usize = heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum();
                let score = cleared * 8.0
                    - board.holes() as f32 * 4.0
                    - aggregate as f32 * 0.5
                    - bumpiness as f32 * 0.3;

                if best.is_none_or(|(s, _, _)| score > s) {
                    best = Some((score, rotations, x));
                }
            }
            shape_piece = shape_piece.rotated();
        }

        best.map(|(_, r, x)| (r, x))
    }
}

fn random_kind(rng: &mut Pcg32) -> Tetromino {
    Tetromino::ALL[rng.random_range(0..Tetromino::ALL.len())]
}

impl Game for Tetris {
    fn id(&self) -> GameId {
        GameId::Tetris
    }

    fn canvas_size(&self) -> (f32, f32) {
        (
            BOARD_WIDTH as f32 * CELL_SIZE,
            BOARD_HEIGHT as f32 * CELL_SIZE,
        )
    }

    fn tick_interval_ms(&self) -> f64 {
        self.drop_interval_ms()
    }

    fn tick(&mut self) {
        if self.phase.is_over() {
            return;
        }
        self.step_down();
    }

    fn handle_key(&mut self, key: Key) {
        if self.phase.is_over() {
            return;
        }
        match key {
            Key::Left => {
                self.try_move(-1, 0);
            }
            Key::Right => {
                self.try_move(1, 0);
            }
            Key::Down => self.step_down(),
            Key::Up => self.try_rotate(),
            Key::Space => self.hard_drop(),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.board = Board::default();
        self.current = Piece::spawn(random_kind(&mut self.rng));
        self.score = 0;
        self.level = 1;
        self.lines = 0;
        self.phase = GamePhase::Playing;
        self.events.clear();
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn hud(&self) -> String {
        format!(
            "SCORE: {} | LEVEL: {} | LINES: {}",
            self.score, self.level, self.lines
        )
    }

    fn summary(&self) -> Vec<String> {
        vec![
            format!("Final Score: {}", self.score),
            format!("Level: {}", self.level),
        ]
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.clear(palette::BLACK);
        let size = CELL_SIZE - 1.0;

        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                if let Some(kind) = self.board.get(x, y) {
                    canvas.fill_rect(
                        x as f32 * CELL_SIZE,
                        y as f32 * CELL_SIZE,
                        size,
                        size,
                        kind.color(),
                    );
                }
            }
        }

        if !self.phase.is_over() {
            let color = self.current.kind.color();
            for (x, y) in self.current.cells().filter(|(_, y)| *y >= 0) {
                canvas.fill_rect(x as f32 * CELL_SIZE, y as f32 * CELL_SIZE, size, size, color);
            }
        }

        let (w, h) = self.canvas_size();
        for x in 0..=BOARD_WIDTH {
            canvas.vline(x as f32 * CELL_SIZE, 0.0, h, palette::GRID);
        }
        for y in 0..=BOARD_HEIGHT {
            canvas.hline(0.0, w, y as f32 * CELL_SIZE, palette::GRID);
        }
    }

    fn demo_key(&self) -> Option<Key> {
        if self.phase.is_over() {
            return None;
        }
        let (rotations, x) = self.best_placement()?;
        if rotations > 0 {
            if self.board.fits(&self.current.rotated()) {
                return Some(Key::Up);
            }
            // No wall kicks: slide toward the target first, or off the wall
            // when the target column itself is too tight to turn in
            let toward = if self.current.x != x {
                x
            } else {
                (BOARD_WIDTH / 2) as i32
            };
            Some(if self.current.x < toward {
                Key::Right
            } else {
                Key::Left
            })
        } else if self.current.x < x {
            Some(Key::Right)
        } else if self.current.x > x {
            Some(Key::Left)
        } else {
            Some(Key::Space)
        }
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

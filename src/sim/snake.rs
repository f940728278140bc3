//! Snake on a 20x20 grid
//!
//! The snake steps one cell per tick. Leaving the grid or running into its
//! own body ends the game; eating food grows it by one cell.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::game::{Game, GameEvent, GameId, GamePhase, Key};
use crate::canvas::{Canvas, palette};

/// Pixels per grid cell
pub const GRID_SIZE: i32 = 20;
/// Canvas is square
pub const CANVAS_SIZE: i32 = 400;
/// Cells per side
pub const CELLS: i32 = CANVAS_SIZE / GRID_SIZE;
pub const TICK_MS: f64 = 150.0;
pub const FOOD_SCORE: u32 = 10;

const START: Cell = Cell { x: 10, y: 10 };
const START_FOOD: Cell = Cell { x: 15, y: 15 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(&self) -> bool {
        (0..CELLS).contains(&self.x) && (0..CELLS).contains(&self.y)
    }

    fn manhattan(&self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            _ => None,
        }
    }

    fn key(self) -> Key {
        match self {
            Direction::Up => Key::Up,
            Direction::Down => Key::Down,
            Direction::Left => Key::Left,
            Direction::Right => Key::Right,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snake {
    /// Head first
    pub body: VecDeque<Cell>,
    pub food: Cell,
    /// Direction used by the last step
    pub heading: Direction,
    /// Direction the next step will use
    pub queued: Direction,
    pub score: u32,
    pub phase: GamePhase,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        Self {
            body: VecDeque::from([START]),
            food: START_FOOD,
            heading: Direction::Up,
            queued: Direction::Up,
            score: 0,
            phase: GamePhase::Playing,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Pick a random free cell for the food. `None` when the snake fills the grid.
    fn spawn_food(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..CELLS)
            .flat_map(|y| (0..CELLS).map(move |x| Cell::new(x, y)))
            .filter(|c| !self.occupies(*c))
            .collect();
        if free.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..free.len());
        Some(free[idx])
    }

    fn end(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.events.push(match phase {
            GamePhase::Won => GameEvent::Won,
            _ => GameEvent::Lost,
        });
        log::info!("Snake over ({:?}) with score {}", phase, self.score);
    }

    /// Would stepping in `dir` kill the snake right now?
    fn is_deadly(&self, dir: Direction) -> bool {
        let next = self.head().step(dir);
        !next.in_bounds() || self.occupies(next)
    }
}

impl Game for Snake {
    fn id(&self) -> GameId {
        GameId::Snake
    }

    fn canvas_size(&self) -> (f32, f32) {
        (CANVAS_SIZE as f32, CANVAS_SIZE as f32)
    }

    fn tick_interval_ms(&self) -> f64 {
        TICK_MS
    }

    fn tick(&mut self) {
        if self.phase.is_over() {
            return;
        }

        self.heading = self.queued;
        let head = self.head().step(self.heading);

        if !head.in_bounds() || self.occupies(head) {
            self.end(GamePhase::Lost);
            return;
        }

        self.body.push_front(head);

        if head == self.food {
            self.score += FOOD_SCORE;
            self.events.push(GameEvent::FoodEaten);
            match self.spawn_food() {
                Some(food) => self.food = food,
                None => self.end(GamePhase::Won),
            }
        } else {
            self.body.pop_back();
        }
    }

    fn handle_key(&mut self, key: Key) {
        if self.phase.is_over() {
            return;
        }
        // Only turns onto the other axis; compared against the last applied
        // step so two quick presses can't reverse the snake into itself
        if let Some(dir) = Direction::from_key(key) {
            if dir.is_vertical() != self.heading.is_vertical() {
                self.queued = dir;
            }
        }
    }

    fn reset(&mut self) {
        self.body = VecDeque::from([START]);
        self.heading = Direction::Up;
        self.queued = Direction::Up;
        self.score = 0;
        self.phase = GamePhase::Playing;
        self.events.clear();
        self.food = self.spawn_food().unwrap_or(START_FOOD);
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn hud(&self) -> String {
        format!("SCORE: {}", self.score)
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.clear(palette::BLACK);

        let size = (GRID_SIZE - 2) as f32;
        for segment in &self.body {
            canvas.fill_rect(
                (segment.x * GRID_SIZE) as f32,
                (segment.y * GRID_SIZE) as f32,
                size,
                size,
                palette::GREEN,
            );
        }

        canvas.fill_rect(
            (self.food.x * GRID_SIZE) as f32,
            (self.food.y * GRID_SIZE) as f32,
            size,
            size,
            palette::RED,
        );
    }

    fn demo_key(&self) -> Option<Key> {
        if self.phase.is_over() {
            return None;
        }
        // Greedy: closest safe move to the food, never reversing
        let best = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .into_iter()
            .filter(|d| *d != self.heading.opposite())
            .filter(|d| !self.is_deadly(*d))
            .min_by_key(|d| self.head().step(*d).manhattan(self.food))?;

        (best != self.queued).then(|| best.key())
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_state() {
        let snake = Snake::new(1);
        assert_eq!(snake.body.len(), 1);
        assert_eq!(snake.head(), Cell::new(10, 10));
        assert_eq!(snake.food, Cell::new(15, 15));
        assert_eq!(snake.heading, Direction::Up);
        assert_eq!(snake.phase, GamePhase::Playing);
    }

    #[test]
    fn test_moves_up_each_tick() {
        let mut snake = Snake::new(1);
        snake.tick();
        assert_eq!(snake.head(), Cell::new(10, 9));
        assert_eq!(snake.body.len(), 1);
    }

    #[test]
    fn test_wall_collision_ends_game() {
        let mut snake = Snake::new(1);
        // 10 steps reach row 0, the 11th leaves the grid
        for _ in 0..10 {
            snake.tick();
        }
        assert_eq!(snake.phase, GamePhase::Playing);
        assert_eq!(snake.head(), Cell::new(10, 0));
        snake.tick();
        assert_eq!(snake.phase, GamePhase::Lost);
        // Body unchanged by the fatal step
        assert_eq!(snake.head(), Cell::new(10, 0));
        assert!(snake.drain_events().contains(&GameEvent::Lost));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut snake = Snake::new(7);
        snake.food = Cell::new(10, 9);
        snake.tick();
        assert_eq!(snake.score, FOOD_SCORE);
        assert_eq!(snake.body.len(), 2);
        assert_ne!(snake.food, Cell::new(10, 9));
        assert!(!snake.occupies(snake.food));
        assert_eq!(snake.drain_events(), vec![GameEvent::FoodEaten]);
    }

    #[test]
    fn test_filling_the_grid_wins() {
        let mut snake = Snake::new(3);
        // Everything but the top-left corner is snake, head just right of it
        let head = Cell::new(1, 0);
        snake.body = std::iter::once(head)
            .chain((0..CELLS).flat_map(|y| (0..CELLS).map(move |x| Cell::new(x, y))))
            .filter(|c| *c != Cell::new(0, 0))
            .fold(VecDeque::new(), |mut body, c| {
                if !body.contains(&c) {
                    body.push_back(c);
                }
                body
            });
        assert_eq!(snake.body.len() as i32, CELLS * CELLS - 1);
        snake.food = Cell::new(0, 0);
        snake.heading = Direction::Left;
        snake.queued = Direction::Left;

        snake.tick();
        assert_eq!(snake.phase, GamePhase::Won);
        assert_eq!(snake.score, FOOD_SCORE);
        assert_eq!(snake.body.len() as i32, CELLS * CELLS);
        assert_eq!(
            snake.drain_events(),
            vec![GameEvent::FoodEaten, GameEvent::Won]
        );
    }

    #[test]
    fn test_reverse_is_ignored() {
        let mut snake = Snake::new(1);
        snake.handle_key(Key::Down);
        assert_eq!(snake.queued, Direction::Up);
        snake.handle_key(Key::Left);
        assert_eq!(snake.queued, Direction::Left);
    }

    #[test]
    fn test_quick_double_turn_cannot_reverse() {
        let mut snake = Snake::new(1);
        snake.body = VecDeque::from([Cell::new(10, 10), Cell::new(10, 11), Cell::new(10, 12)]);
        // Heading up: Left then Down within one tick must not turn the snake around
        snake.handle_key(Key::Left);
        snake.handle_key(Key::Down);
        snake.tick();
        assert_eq!(snake.phase, GamePhase::Playing);
        assert_eq!(snake.head(), Cell::new(9, 10));
    }

    #[test]
    fn test_self_collision() {
        let mut snake = Snake::new(1);
        // A hook shape: heading left into its own body
        snake.body = VecDeque::from([
            Cell::new(5, 5),
            Cell::new(5, 6),
            Cell::new(4, 6),
            Cell::new(4, 5),
            Cell::new(4, 4),
        ]);
        snake.heading = Direction::Up;
        snake.queued = Direction::Left;
        snake.food = Cell::new(0, 0);
        snake.tick();
        assert_eq!(snake.phase, GamePhase::Lost);
    }

    #[test]
    fn test_keys_ignored_after_game_over() {
        let mut snake = Snake::new(1);
        snake.phase = GamePhase::Lost;
        snake.handle_key(Key::Left);
        assert_eq!(snake.queued, Direction::Up);
        snake.tick();
        assert_eq!(snake.head(), Cell::new(10, 10));
    }

    #[test]
    fn test_reset() {
        let mut snake = Snake::new(3);
        snake.food = Cell::new(10, 9);
        snake.tick();
        snake.reset();
        assert_eq!(snake.score, 0);
        assert_eq!(snake.body, VecDeque::from([Cell::new(10, 10)]));
        assert!(!snake.occupies(snake.food));
        assert!(snake.food.in_bounds());
    }

    #[test]
    fn test_draw_paints_body_and_food() {
        let snake = Snake::new(1);
        let mut canvas = Canvas::new(400.0, 400.0);
        snake.draw(&mut canvas);
        assert_eq!(canvas.rects().len(), 2);
        let food = canvas.rects()[1];
        assert_eq!((food.x, food.y, food.w), (300.0, 300.0, 18.0));
        assert_eq!(food.color, palette::RED);
    }

    #[test]
    fn test_demo_heads_for_food() {
        let mut snake = Snake::new(1);
        // Food is down-right; heading up, the bot turns right first
        assert_eq!(snake.demo_key(), Some(Key::Right));
        snake.food = Cell::new(10, 2);
        assert_eq!(snake.demo_key(), None);
    }

    proptest! {
        #[test]
        fn prop_snake_stays_on_grid(seed in any::<u64>(), keys in proptest::collection::vec(0u8..4, 0..200)) {
            let mut snake = Snake::new(seed);
            for k in keys {
                let key = [Key::Up, Key::Down, Key::Left, Key::Right][k as usize];
                snake.handle_key(key);
                snake.tick();
                prop_assert!(snake.body.iter().all(|c| c.in_bounds()));
                prop_assert!(snake.food.in_bounds());
                if snake.phase.is_over() {
                    break;
                }
            }
        }
    }
}

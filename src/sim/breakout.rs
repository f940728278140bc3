//! Breakout: clear a 5x10 wall of bricks without letting the ball fall

use glam::Vec2;

use super::collision::{Aabb, clamp_span};
use super::game::{Game, GameEvent, GameId, GamePhase, Key};
use crate::canvas::{Canvas, palette};

pub const CANVAS_WIDTH: f32 = 600.0;
pub const CANVAS_HEIGHT: f32 = 400.0;
pub const PADDLE_WIDTH: f32 = 80.0;
pub const PADDLE_HEIGHT: f32 = 10.0;
pub const BALL_SIZE: f32 = 8.0;
pub const BRICK_ROWS: usize = 5;
pub const BRICK_COLS: usize = 10;
pub const BRICK_WIDTH: f32 = CANVAS_WIDTH / BRICK_COLS as f32;
pub const BRICK_HEIGHT: f32 = 20.0;
/// y of the top brick row
pub const BRICK_TOP: f32 = 50.0;
pub const BRICK_SCORE: u32 = 10;
pub const PADDLE_STEP: f32 = 20.0;
pub const TICK_MS: f64 = 16.0;

/// Horizontal speed range imparted by the paddle: vx = (hit - 0.5) * ENGLISH
const ENGLISH: f32 = 8.0;
const BALL_START: Vec2 = Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT - 50.0);
const BALL_START_VEL: Vec2 = Vec2::new(4.0, -4.0);
const PADDLE_START_X: f32 = CANVAS_WIDTH / 2.0 - PADDLE_WIDTH / 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brick {
    pub pos: Vec2,
    pub visible: bool,
}

impl Brick {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, BRICK_WIDTH, BRICK_HEIGHT)
    }
}

/// Full wall, row-major
pub fn brick_wall() -> Vec<Brick> {
    (0..BRICK_ROWS)
        .flat_map(|row| {
            (0..BRICK_COLS).map(move |col| Brick {
                pos: Vec2::new(
                    col as f32 * BRICK_WIDTH,
                    row as f32 * BRICK_HEIGHT + BRICK_TOP,
                ),
                visible: true,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Breakout {
    pub paddle_x: f32,
    /// Ball top-left corner
    pub ball: Vec2,
    pub vel: Vec2,
    pub bricks: Vec<Brick>,
    pub score: u32,
    pub phase: GamePhase,
    events: Vec<GameEvent>,
}

impl Default for Breakout {
    fn default() -> Self {
        Self::new()
    }
}

impl Breakout {
    pub fn new() -> Self {
        Self {
            paddle_x: PADDLE_START_X,
            ball: BALL_START,
            vel: BALL_START_VEL,
            bricks: brick_wall(),
            score: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
        }
    }

    pub fn ball_bounds(&self) -> Aabb {
        Aabb::from_pos(self.ball, Vec2::splat(BALL_SIZE))
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.visible).count()
    }

    fn bounce_walls(&mut self) {
        if self.ball.x <= 0.0 {
            self.ball.x = 0.0;
            self.vel.x = self.vel.x.abs();
            self.events.push(GameEvent::WallBounce);
        } else if self.ball.x >= CANVAS_WIDTH - BALL_SIZE {
            self.ball.x = CANVAS_WIDTH - BALL_SIZE;
            self.vel.x = -self.vel.x.abs();
            self.events.push(GameEvent::WallBounce);
        }

        if self.ball.y <= 0.0 {
            self.ball.y = 0.0;
            self.vel.y = self.vel.y.abs();
            self.events.push(GameEvent::WallBounce);
        }
    }

    /// Ball in the band just above the paddle and within its span bounces
    /// up, with horizontal speed set by where it struck
    fn bounce_paddle(&mut self) {
        let band = (CANVAS_HEIGHT - PADDLE_HEIGHT - BALL_SIZE)..=(CANVAS_HEIGHT - PADDLE_HEIGHT);
        let paddle = Aabb::new(
            self.paddle_x,
            CANVAS_HEIGHT - PADDLE_HEIGHT,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
        );
        if self.vel.y > 0.0 && band.contains(&self.ball.y) && paddle.spans_x(self.ball.x) {
            self.vel.y = -self.vel.y.abs();
            let hit = (self.ball.x - self.paddle_x) / PADDLE_WIDTH;
            self.vel.x = (hit - 0.5) * ENGLISH;
            self.events.push(GameEvent::PaddleHit);
        }
    }

    /// Knock out the first visible brick touching the ball (at most one per tick)
    fn hit_bricks(&mut self) {
        let ball = self.ball_bounds();
        if let Some(brick) = self
            .bricks
            .iter_mut()
            .find(|b| b.visible && b.bounds().overlaps(&ball))
        {
            brick.visible = false;
            self.score += BRICK_SCORE;
            self.vel.y = -self.vel.y;
            self.events.push(GameEvent::BrickBroken);
        }
    }

    fn finish(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.events.push(if phase == GamePhase::Won {
            GameEvent::Won
        } else {
            GameEvent::Lost
        });
        log::info!("Breakout over ({:?}) with score {}", phase, self.score);
    }
}

impl Game for Breakout {
    fn id(&self) -> GameId {
        GameId::Breakout
    }

    fn canvas_size(&self) -> (f32, f32) {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    fn tick_interval_ms(&self) -> f64 {
        TICK_MS
    }

    fn tick(&mut self) {
        if self.phase.is_over() {
            return;
        }

        self.ball += self.vel;
        self.bounce_walls();
        self.bounce_paddle();

        if self.ball.y > CANVAS_HEIGHT {
            self.finish(GamePhase::Lost);
            return;
        }

        self.hit_bricks();
        if self.bricks_left() == 0 {
            self.finish(GamePhase::Won);
        }
    }

    fn handle_key(&mut self, key: Key) {
        if self.phase.is_over() {
            return;
        }
        let dx = match key {
            Key::Left => -PADDLE_STEP,
            Key::Right => PADDLE_STEP,
            _ => return,
        };
        self.paddle_x = clamp_span(self.paddle_x + dx, PADDLE_WIDTH, CANVAS_WIDTH);
    }

    fn reset(&mut self) {
        *self = Self::new();
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

        for brick in self.bricks.iter().filter(|b| b.visible) {
            canvas.fill_rect(
                brick.pos.x + 1.0,
                brick.pos.y + 1.0,
                BRICK_WIDTH - 2.0,
                BRICK_HEIGHT - 2.0,
                palette::ORANGE,
            );
        }

        canvas.fill_rect(
            self.paddle_x,
            CANVAS_HEIGHT - PADDLE_HEIGHT,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
            palette::GREEN,
        );

        canvas.fill_rect(self.ball.x, self.ball.y, BALL_SIZE, BALL_SIZE, palette::GREEN);
    }

    fn demo_key(&self) -> Option<Key> {
        if self.phase.is_over() {
            return None;
        }
        // Meet the ball left of centre so it never settles into a vertical loop
        let target = self.ball.x + BALL_SIZE / 2.0;
        let aim = self.paddle_x + PADDLE_WIDTH * 0.35;
        if aim < target - PADDLE_STEP / 2.0 && self.paddle_x < CANVAS_WIDTH - PADDLE_WIDTH {
            Some(Key::Right)
        } else if aim > target + PADDLE_STEP / 2.0 && self.paddle_x > 0.0 {
            Some(Key::Left)
        } else {
            None
        }
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_layout() {
        let game = Breakout::new();
        assert_eq!(game.bricks.len(), BRICK_ROWS * BRICK_COLS);
        assert_eq!(game.bricks[0].pos, Vec2::new(0.0, 50.0));
        assert_eq!(game.bricks[49].pos, Vec2::new(540.0, 130.0));
        assert_eq!(game.bricks_left(), 50);
    }

    #[test]
    fn test_ball_moves_by_velocity() {
        let mut game = Breakout::new();
        game.tick();
        assert_eq!(game.ball, Vec2::new(304.0, 346.0));
    }

    #[test]
    fn test_side_wall_reflects() {
        let mut game = Breakout::new();
        game.ball = Vec2::new(590.0, 300.0);
        game.vel = Vec2::new(4.0, -4.0);
        game.tick();
        assert_eq!(game.ball.x, CANVAS_WIDTH - BALL_SIZE);
        assert_eq!(game.vel.x, -4.0);
    }

    #[test]
    fn test_ceiling_reflects() {
        let mut game = Breakout::new();
        game.bricks.iter_mut().for_each(|b| b.visible = b.pos.y > 100.0);
        game.ball = Vec2::new(300.0, 2.0);
        game.vel = Vec2::new(0.0, -4.0);
        game.tick();
        assert_eq!(game.vel.y, 4.0);
    }

    #[test]
    fn test_paddle_sets_angle() {
        let mut game = Breakout::new();
        game.paddle_x = 260.0;
        // Strikes the right quarter of the paddle
        game.ball = Vec2::new(320.0, 378.0);
        game.vel = Vec2::new(0.0, 4.0);
        game.tick();
        assert!(game.vel.y < 0.0);
        assert_eq!(game.vel.x, (60.0 / 80.0 - 0.5) * 8.0);
        assert!(game.drain_events().contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_ball_below_canvas_loses() {
        let mut game = Breakout::new();
        game.paddle_x = 0.0;
        game.ball = Vec2::new(500.0, 398.0);
        game.vel = Vec2::new(0.0, 4.0);
        game.tick();
        assert_eq!(game.phase, GamePhase::Lost);
        assert_eq!(game.banner(), Some("GAME OVER"));
    }

    #[test]
    fn test_brick_hit_scores_once() {
        let mut game = Breakout::new();
        // Straddling two bricks in the bottom row: only the first is removed
        game.ball = Vec2::new(56.0, 152.0);
        game.vel = Vec2::new(0.0, -4.0);
        game.tick();
        assert_eq!(game.score, BRICK_SCORE);
        assert_eq!(game.bricks_left(), 49);
        assert_eq!(game.vel.y, 4.0);
        assert!(!game.bricks[40].visible);
        assert!(game.bricks[41].visible);
    }

    #[test]
    fn test_last_brick_wins() {
        let mut game = Breakout::new();
        for brick in game.bricks.iter_mut().skip(1) {
            brick.visible = false;
        }
        game.ball = Vec2::new(10.0, 72.0);
        game.vel = Vec2::new(0.0, -4.0);
        game.tick();
        assert_eq!(game.phase, GamePhase::Won);
        assert_eq!(game.banner(), Some("YOU WIN!"));
        assert_eq!(game.score, BRICK_SCORE);
    }

    #[test]
    fn test_paddle_clamped() {
        let mut game = Breakout::new();
        for _ in 0..40 {
            game.handle_key(Key::Left);
        }
        assert_eq!(game.paddle_x, 0.0);
        for _ in 0..40 {
            game.handle_key(Key::Right);
        }
        assert_eq!(game.paddle_x, CANVAS_WIDTH - PADDLE_WIDTH);
    }

    #[test]
    fn test_reset_restores_wall() {
        let mut game = Breakout::new();
        game.bricks[3].visible = false;
        game.score = 90;
        game.phase = GamePhase::Lost;
        game.reset();
        assert_eq!(game.bricks_left(), 50);
        assert_eq!(game.score, 0);
        assert_eq!(game.ball, BALL_START);
    }

    #[test]
    fn test_draw_counts() {
        let mut game = Breakout::new();
        game.bricks[0].visible = false;
        let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        game.draw(&mut canvas);
        // 49 bricks + paddle + ball
        assert_eq!(canvas.rects().len(), 51);
    }
}

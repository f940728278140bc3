//! Pong: player paddle on the left, AI paddle on the right, first to 5

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{Aabb, clamp_span};
use super::game::{Game, GameEvent, GameId, GamePhase, Key};
use crate::canvas::{Canvas, palette};

pub const CANVAS_WIDTH: f32 = 600.0;
pub const CANVAS_HEIGHT: f32 = 400.0;
pub const PADDLE_HEIGHT: f32 = 80.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const BALL_SIZE: f32 = 10.0;
pub const TICK_MS: f64 = 16.0;

/// Horizontal serve speed (px/tick)
pub const SERVE_SPEED_X: f32 = 5.0;
/// Vertical serve speed is drawn from [-SPREAD/2, SPREAD/2)
pub const SERVE_SPREAD_Y: f32 = 6.0;
/// Player paddle movement per key press
pub const PLAYER_STEP: f32 = 20.0;
/// AI paddle speed (px/tick)
pub const AI_STEP: f32 = 4.0;
/// AI ignores the ball while it is this close to the paddle centre
pub const AI_DEAD_ZONE: f32 = 35.0;
pub const WINNING_SCORE: u32 = 5;

const PADDLE_START_Y: f32 = CANVAS_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0;

#[derive(Debug, Clone)]
pub struct Pong {
    pub player_y: f32,
    pub ai_y: f32,
    /// Ball top-left corner
    pub ball: Vec2,
    /// Ball velocity (px/tick)
    pub vel: Vec2,
    pub player_score: u32,
    pub ai_score: u32,
    pub phase: GamePhase,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl Pong {
    pub fn new(seed: u64) -> Self {
        Self {
            player_y: PADDLE_START_Y,
            ai_y: PADDLE_START_Y,
            ball: Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            vel: Vec2::new(SERVE_SPEED_X, 3.0),
            player_score: 0,
            ai_score: 0,
            phase: GamePhase::Playing,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn player_paddle(&self) -> Aabb {
        Aabb::new(0.0, self.player_y, PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    pub fn ai_paddle(&self) -> Aabb {
        Aabb::new(CANVAS_WIDTH - PADDLE_WIDTH, self.ai_y, PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    /// Re-serve from the centre in a random direction
    fn serve(&mut self) {
        self.ball = Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
        let vx = if self.rng.random_bool(0.5) {
            SERVE_SPEED_X
        } else {
            -SERVE_SPEED_X
        };
        let vy = (self.rng.random::<f32>() - 0.5) * SERVE_SPREAD_Y;
        self.vel = Vec2::new(vx, vy);
    }

    fn bounce_walls(&mut self) {
        if self.ball.y <= 0.0 {
            self.ball.y = 0.0;
            self.vel.y = self.vel.y.abs();
            self.events.push(GameEvent::WallBounce);
        } else if self.ball.y >= CANVAS_HEIGHT - BALL_SIZE {
            self.ball.y = CANVAS_HEIGHT - BALL_SIZE;
            self.vel.y = -self.vel.y.abs();
            self.events.push(GameEvent::WallBounce);
        }
    }

    /// Reflect off a paddle when the ball sits in its column and the ball's
    /// top edge lies within the paddle span
    fn bounce_paddles(&mut self) {
        let player_column = 0.0..=PADDLE_WIDTH;
        if self.vel.x < 0.0
            && player_column.contains(&self.ball.x)
            && self.player_paddle().spans_y(self.ball.y)
        {
            self.vel.x = self.vel.x.abs();
            self.events.push(GameEvent::PaddleHit);
        }

        let ai_column = (CANVAS_WIDTH - PADDLE_WIDTH - BALL_SIZE)..=(CANVAS_WIDTH - BALL_SIZE);
        if self.vel.x > 0.0
            && ai_column.contains(&self.ball.x)
            && self.ai_paddle().spans_y(self.ball.y)
        {
            self.vel.x = -self.vel.x.abs();
            self.events.push(GameEvent::PaddleHit);
        }
    }

    /// Award a point once the ball has fully left the canvas
    fn check_score(&mut self) {
        let by_player = if self.ball.x + BALL_SIZE < 0.0 {
            self.ai_score += 1;
            false
        } else if self.ball.x > CANVAS_WIDTH {
            self.player_score += 1;
            true
        } else {
            return;
        };
        self.events.push(GameEvent::PointScored { by_player });

        if self.player_score >= WINNING_SCORE {
            self.finish(GamePhase::Won);
        } else if self.ai_score >= WINNING_SCORE {
            self.finish(GamePhase::Lost);
        } else {
            self.serve();
        }
    }

    fn finish(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.events.push(if phase == GamePhase::Won {
            GameEvent::Won
        } else {
            GameEvent::Lost
        });
        log::info!(
            "Pong over: player {} - AI {}",
            self.player_score,
            self.ai_score
        );
    }

    /// Track the ball centre with a dead zone
    fn move_ai(&mut self) {
        let ai_center = self.ai_y + PADDLE_HEIGHT / 2.0;
        let ball_center = self.ball.y + BALL_SIZE / 2.0;
        if ai_center < ball_center - AI_DEAD_ZONE {
            self.ai_y += AI_STEP;
        } else if ai_center > ball_center + AI_DEAD_ZONE {
            self.ai_y -= AI_STEP;
        }
        self.ai_y = clamp_span(self.ai_y, PADDLE_HEIGHT, CANVAS_HEIGHT);
    }
}

impl Game for Pong {
    fn id(&self) -> GameId {
        GameId::Pong
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
        self.bounce_paddles();
        self.check_score();
        if self.phase.is_over() {
            return;
        }
        self.move_ai();
    }

    fn handle_key(&mut self, key: Key) {
        if self.phase.is_over() {
            return;
        }
        match key {
            Key::Up => {
                self.player_y =
                    clamp_span(self.player_y - PLAYER_STEP, PADDLE_HEIGHT, CANVAS_HEIGHT)
            }
            Key::Down => {
                self.player_y =
                    clamp_span(self.player_y + PLAYER_STEP, PADDLE_HEIGHT, CANVAS_HEIGHT)
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.player_y = PADDLE_START_Y;
        self.ai_y = PADDLE_START_Y;
        self.player_score = 0;
        self.ai_score = 0;
        self.phase = GamePhase::Playing;
        self.events.clear();
        self.serve();
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u32 {
        self.player_score
    }

    fn hud(&self) -> String {
        format!("PLAYER: {} | AI: {}", self.player_score, self.ai_score)
    }

    fn summary(&self) -> Vec<String> {
        vec![format!(
            "Final Score: {} - {}",
            self.player_score, self.ai_score
        )]
    }

    fn banner(&self) -> Option<&'static str> {
        match self.phase {
            GamePhase::Playing => None,
            GamePhase::Won => Some("YOU WIN!"),
            GamePhase::Lost => Some("AI WINS!"),
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.clear(palette::BLACK);

        canvas.dashed_vline(CANVAS_WIDTH / 2.0, 0.0, CANVAS_HEIGHT, 5.0, 15.0, palette::GREEN);

        canvas.fill_rect(0.0, self.player_y, PADDLE_WIDTH, PADDLE_HEIGHT, palette::GREEN);
        canvas.fill_rect(
            CANVAS_WIDTH - PADDLE_WIDTH,
            self.ai_y,
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
        let paddle_center = self.player_y + PADDLE_HEIGHT / 2.0;
        let ball_center = self.ball.y + BALL_SIZE / 2.0;
        if paddle_center < ball_center - PLAYER_STEP {
            Some(Key::Down)
        } else if paddle_center > ball_center + PLAYER_STEP {
            Some(Key::Up)
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
    use proptest::prelude::*;

    #[test]
    fn test_initial_state() {
        let pong = Pong::new(1);
        assert_eq!(pong.player_y, 160.0);
        assert_eq!(pong.ai_y, 160.0);
        assert_eq!(pong.ball, Vec2::new(300.0, 200.0));
        assert_eq!(pong.vel, Vec2::new(5.0, 3.0));
    }

    #[test]
    fn test_ball_moves_by_velocity() {
        let mut pong = Pong::new(1);
        pong.tick();
        assert_eq!(pong.ball, Vec2::new(305.0, 203.0));
    }

    #[test]
    fn test_top_wall_reflects() {
        let mut pong = Pong::new(1);
        pong.ball = Vec2::new(300.0, 2.0);
        pong.vel = Vec2::new(5.0, -3.0);
        pong.tick();
        assert_eq!(pong.ball.y, 0.0);
        assert_eq!(pong.vel.y, 3.0);
        assert!(pong.drain_events().contains(&GameEvent::WallBounce));
    }

    #[test]
    fn test_player_paddle_reflects() {
        let mut pong = Pong::new(1);
        pong.player_y = 150.0;
        pong.ball = Vec2::new(12.0, 180.0);
        pong.vel = Vec2::new(-5.0, 0.0);
        pong.tick();
        assert_eq!(pong.vel.x, 5.0);
        assert!(pong.drain_events().contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_ai_paddle_reflects() {
        let mut pong = Pong::new(1);
        pong.ai_y = 150.0;
        pong.ball = Vec2::new(578.0, 180.0);
        pong.vel = Vec2::new(5.0, 0.0);
        pong.tick();
        assert_eq!(pong.vel.x, -5.0);
    }

    #[test]
    fn test_missed_ball_scores_for_ai() {
        let mut pong = Pong::new(1);
        pong.player_y = 0.0;
        pong.ball = Vec2::new(-8.0, 300.0);
        pong.vel = Vec2::new(-5.0, 0.0);
        pong.tick();
        assert_eq!(pong.ai_score, 1);
        assert_eq!(pong.player_score, 0);
        // Re-served from the centre
        assert_eq!(pong.ball, Vec2::new(300.0, 200.0));
        assert_eq!(pong.vel.x.abs(), SERVE_SPEED_X);
        assert!(pong.vel.y >= -3.0 && pong.vel.y < 3.0);
    }

    #[test]
    fn test_player_wins_at_five() {
        let mut pong = Pong::new(1);
        pong.player_score = 4;
        pong.ai_y = 0.0;
        pong.ball = Vec2::new(598.0, 350.0);
        pong.vel = Vec2::new(5.0, 0.0);
        pong.tick();
        assert_eq!(pong.player_score, 5);
        assert_eq!(pong.phase, GamePhase::Won);
        assert_eq!(pong.banner(), Some("YOU WIN!"));
        assert_eq!(pong.summary(), vec!["Final Score: 5 - 0".to_string()]);
    }

    #[test]
    fn test_ai_wins_at_five() {
        let mut pong = Pong::new(1);
        pong.ai_score = 4;
        pong.player_y = 0.0;
        pong.ball = Vec2::new(-9.0, 350.0);
        pong.vel = Vec2::new(-5.0, 0.0);
        pong.tick();
        assert_eq!(pong.phase, GamePhase::Lost);
        assert_eq!(pong.banner(), Some("AI WINS!"));
        // Frozen once over
        let ball = pong.ball;
        pong.tick();
        assert_eq!(pong.ball, ball);
    }

    #[test]
    fn test_ai_tracks_ball() {
        let mut pong = Pong::new(1);
        pong.ai_y = 0.0;
        pong.ball = Vec2::new(300.0, 300.0);
        pong.vel = Vec2::ZERO;
        pong.tick();
        assert_eq!(pong.ai_y, AI_STEP);

        // Within the dead zone the AI holds still
        pong.ai_y = 265.0;
        pong.tick();
        assert_eq!(pong.ai_y, 265.0);
    }

    #[test]
    fn test_player_keys_clamped() {
        let mut pong = Pong::new(1);
        for _ in 0..20 {
            pong.handle_key(Key::Up);
        }
        assert_eq!(pong.player_y, 0.0);
        for _ in 0..30 {
            pong.handle_key(Key::Down);
        }
        assert_eq!(pong.player_y, CANVAS_HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn test_reset_clears_scores() {
        let mut pong = Pong::new(1);
        pong.player_score = 3;
        pong.ai_score = 5;
        pong.phase = GamePhase::Lost;
        pong.reset();
        assert_eq!(pong.hud(), "PLAYER: 0 | AI: 0");
        assert_eq!(pong.phase, GamePhase::Playing);
    }

    proptest! {
        #[test]
        fn prop_paddles_stay_on_canvas(seed in any::<u64>(), keys in proptest::collection::vec(any::<bool>(), 0..300)) {
            let mut pong = Pong::new(seed);
            for up in keys {
                pong.handle_key(if up { Key::Up } else { Key::Down });
                pong.tick();
                prop_assert!(pong.player_y >= 0.0 && pong.player_y <= CANVAS_HEIGHT - PADDLE_HEIGHT);
                prop_assert!(pong.ai_y >= 0.0 && pong.ai_y <= CANVAS_HEIGHT - PADDLE_HEIGHT);
                prop_assert!(pong.ball.y >= 0.0 && pong.ball.y <= CANVAS_HEIGHT - BALL_SIZE);
            }
        }
    }
}

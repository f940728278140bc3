//! Space Invaders: a 5x10 swarm marches side to side and drops at the edges

use glam::Vec2;

use super::collision::{Aabb, clamp_span};
use super::game::{Game, GameEvent, GameId, GamePhase, Key};
use crate::canvas::{Canvas, palette};

pub const CANVAS_WIDTH: f32 = 600.0;
pub const CANVAS_HEIGHT: f32 = 400.0;
pub const PLAYER_WIDTH: f32 = 30.0;
pub const PLAYER_HEIGHT: f32 = 20.0;
pub const BULLET_WIDTH: f32 = 3.0;
pub const BULLET_HEIGHT: f32 = 10.0;
pub const INVADER_WIDTH: f32 = 20.0;
pub const INVADER_HEIGHT: f32 = 15.0;
pub const INVADER_ROWS: usize = 5;
pub const INVADER_COLS: usize = 10;
pub const TICK_MS: f64 = 50.0;

pub const BULLET_SPEED: f32 = 8.0;
/// Horizontal swarm step per tick
pub const SWARM_STEP: f32 = 2.0;
/// Vertical drop when the swarm reaches an edge
pub const SWARM_DROP: f32 = 20.0;
pub const PLAYER_STEP: f32 = 15.0;
pub const INVADER_SCORE: u32 = 100;
/// An invader at or below this y has landed
pub const INVASION_LINE: f32 = CANVAS_HEIGHT - 50.0;

const FORMATION_ORIGIN: Vec2 = Vec2::new(50.0, 50.0);
const FORMATION_SPACING: Vec2 = Vec2::new(50.0, 40.0);
const PLAYER_START_X: f32 = CANVAS_WIDTH / 2.0 - PLAYER_WIDTH / 2.0;
/// Bullets spawn this far above the player
const MUZZLE_Y: f32 = CANVAS_HEIGHT - PLAYER_HEIGHT - 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invader {
    pub pos: Vec2,
    pub alive: bool,
}

impl Invader {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, INVADER_WIDTH, INVADER_HEIGHT)
    }
}

/// Fresh formation, row-major
pub fn formation() -> Vec<Invader> {
    (0..INVADER_ROWS)
        .flat_map(|row| {
            (0..INVADER_COLS).map(move |col| Invader {
                pos: FORMATION_ORIGIN + FORMATION_SPACING * Vec2::new(col as f32, row as f32),
                alive: true,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SpaceInvaders {
    pub player_x: f32,
    /// Bullet tip positions
    pub bullets: Vec<Vec2>,
    pub invaders: Vec<Invader>,
    /// +1 marching right, -1 marching left
    pub direction: f32,
    pub score: u32,
    pub phase: GamePhase,
    events: Vec<GameEvent>,
}

impl Default for SpaceInvaders {
    fn default() -> Self {
        Self::new()
    }
}

impl SpaceInvaders {
    pub fn new() -> Self {
        Self {
            player_x: PLAYER_START_X,
            bullets: Vec::new(),
            invaders: formation(),
            direction: 1.0,
            score: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
        }
    }

    pub fn alive(&self) -> impl Iterator<Item = &Invader> {
        self.invaders.iter().filter(|i| i.alive)
    }

    pub fn shoot(&mut self) {
        self.bullets.push(Vec2::new(self.player_x + PLAYER_WIDTH / 2.0, MUZZLE_Y));
        self.events.push(GameEvent::ShotFired);
    }

    fn move_bullets(&mut self) {
        for bullet in &mut self.bullets {
            bullet.y -= BULLET_SPEED;
        }
        self.bullets.retain(|b| b.y > 0.0);
    }

    /// Step sideways, or drop and turn around if the step would cross an edge
    fn march(&mut self) {
        let (left, right) = self.alive().fold((f32::MAX, f32::MIN), |(l, r), inv| {
            (l.min(inv.pos.x), r.max(inv.pos.x))
        });
        if left > right {
            return;
        }

        let dx = self.direction * SWARM_STEP;
        let at_edge = left + dx < 0.0 || right + dx > CANVAS_WIDTH - INVADER_WIDTH;
        for invader in self.invaders.iter_mut().filter(|i| i.alive) {
            if at_edge {
                invader.pos.y += SWARM_DROP;
            } else {
                invader.pos.x += dx;
            }
        }
        if at_edge {
            self.direction = -self.direction;
        }
    }

    /// Each bullet kills the first live invader containing its tip and is spent
    fn resolve_hits(&mut self) {
        let mut i = self.bullets.len();
        while i > 0 {
            i -= 1;
            let bullet = self.bullets[i];
            if let Some(invader) = self
                .invaders
                .iter_mut()
                .find(|inv| inv.alive && inv.bounds().contains_point(bullet))
            {
                invader.alive = false;
                self.bullets.remove(i);
                self.score += INVADER_SCORE;
                self.events.push(GameEvent::InvaderDestroyed);
            }
        }
    }

    fn finish(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.events.push(if phase == GamePhase::Won {
            GameEvent::Won
        } else {
            GameEvent::Lost
        });
        log::info!("Space Invaders over ({:?}) with score {}", phase, self.score);
    }
}

impl Game for SpaceInvaders {
    fn id(&self) -> GameId {
        GameId::SpaceInvaders
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

        self.move_bullets();
        self.march();

        if self.alive().any(|inv| inv.pos.y >= INVASION_LINE) {
            self.finish(GamePhase::Lost);
            return;
        }

        self.resolve_hits();
        if self.alive().next().is_none() {
            self.finish(GamePhase::Won);
        }
    }

    fn handle_key(&mut self, key: Key) {
        if self.phase.is_over() {
            return;
        }
        match key {
            Key::Left => {
                self.player_x = clamp_span(self.player_x - PLAYER_STEP, PLAYER_WIDTH, CANVAS_WIDTH)
            }
            Key::Right => {
                self.player_x = clamp_span(self.player_x + PLAYER_STEP, PLAYER_WIDTH, CANVAS_WIDTH)
            }
            Key::Space => self.shoot(),
            _ => {}
        }
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

        canvas.fill_rect(
            self.player_x,
            CANVAS_HEIGHT - PLAYER_HEIGHT,
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
            palette::GREEN,
        );

        for bullet in &self.bullets {
            canvas.fill_rect(bullet.x, bullet.y, BULLET_WIDTH, BULLET_HEIGHT, palette::YELLOW);
        }

        for invader in self.alive() {
            canvas.fill_rect(
                invader.pos.x,
                invader.pos.y,
                INVADER_WIDTH,
                INVADER_HEIGHT,
                palette::RED,
            );
        }
    }

    fn demo_key(&self) -> Option<Key> {
        if self.phase.is_over() {
            return None;
        }
        let muzzle = self.player_x + PLAYER_WIDTH / 2.0;
        // Lowest invaders are the most urgent; among those pick the nearest column
        let target = self
            .alive()
            .max_by(|a, b| {
                a.pos.y.total_cmp(&b.pos.y).then_with(|| {
                    let da = (a.pos.x + INVADER_WIDTH / 2.0 - muzzle).abs();
                    let db = (b.pos.x + INVADER_WIDTH / 2.0 - muzzle).abs();
                    db.total_cmp(&da)
                })
            })?;

        let aim = target.pos.x + INVADER_WIDTH / 2.0 + self.direction * SWARM_STEP * 4.0;
        if muzzle < aim - PLAYER_STEP / 2.0 {
            Some(Key::Right)
        } else if muzzle > aim + PLAYER_STEP / 2.0 {
            Some(Key::Left)
        } else if self.bullets.len() < 3 {
            Some(Key::Space)
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
    fn test_formation_layout() {
        let game = SpaceInvaders::new();
        assert_eq!(game.invaders.len(), 50);
        assert_eq!(game.invaders[0].pos, Vec2::new(50.0, 50.0));
        assert_eq!(game.invaders[49].pos, Vec2::new(500.0, 210.0));
    }

    #[test]
    fn test_swarm_marches_right() {
        let mut game = SpaceInvaders::new();
        game.tick();
        assert_eq!(game.invaders[0].pos, Vec2::new(52.0, 50.0));
        assert_eq!(game.direction, 1.0);
    }

    #[test]
    fn test_swarm_drops_and_reverses_at_edge() {
        let mut game = SpaceInvaders::new();
        // Rightmost column at x = 500 + 2k; the edge is 580
        for _ in 0..40 {
            game.tick();
        }
        assert_eq!(game.invaders[9].pos, Vec2::new(580.0, 50.0));
        game.tick();
        assert_eq!(game.invaders[9].pos, Vec2::new(580.0, 70.0));
        assert_eq!(game.direction, -1.0);
        game.tick();
        assert_eq!(game.invaders[9].pos, Vec2::new(578.0, 70.0));
    }

    #[test]
    fn test_bullet_kills_invader() {
        let mut game = SpaceInvaders::new();
        // Bottom-left invader after one march step sits at (52, 210)
        game.bullets.push(Vec2::new(60.0, 228.0));
        game.tick();
        assert!(!game.invaders[40].alive);
        assert!(game.bullets.is_empty());
        assert_eq!(game.score, INVADER_SCORE);
        assert_eq!(game.drain_events(), vec![GameEvent::InvaderDestroyed]);
    }

    #[test]
    fn test_bullets_leave_top() {
        let mut game = SpaceInvaders::new();
        game.invaders.iter_mut().for_each(|i| i.alive = i.pos.x > 300.0);
        game.bullets.push(Vec2::new(10.0, 5.0));
        game.tick();
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn test_shoot_from_player() {
        let mut game = SpaceInvaders::new();
        game.handle_key(Key::Space);
        assert_eq!(game.bullets, vec![Vec2::new(300.0, 370.0)]);
        assert_eq!(game.drain_events(), vec![GameEvent::ShotFired]);
    }

    #[test]
    fn test_invasion_loses() {
        let mut game = SpaceInvaders::new();
        for inv in game.invaders.iter_mut() {
            inv.pos.y += INVASION_LINE - 212.0;
        }
        game.tick();
        assert_eq!(game.phase, GamePhase::Playing);
        // Force the edge drop
        game.invaders.iter_mut().for_each(|i| i.pos.x += 80.0);
        game.tick();
        assert_eq!(game.phase, GamePhase::Lost);
    }

    #[test]
    fn test_last_invader_wins() {
        let mut game = SpaceInvaders::new();
        game.invaders.iter_mut().skip(1).for_each(|i| i.alive = false);
        game.bullets.push(Vec2::new(60.0, 68.0));
        game.tick();
        assert_eq!(game.phase, GamePhase::Won);
        assert_eq!(game.score, INVADER_SCORE);
    }

    #[test]
    fn test_player_clamped() {
        let mut game = SpaceInvaders::new();
        for _ in 0..50 {
            game.handle_key(Key::Right);
        }
        assert_eq!(game.player_x, CANVAS_WIDTH - PLAYER_WIDTH);
        for _ in 0..50 {
            game.handle_key(Key::Left);
        }
        assert_eq!(game.player_x, 0.0);
    }

    #[test]
    fn test_dead_invaders_dont_steer_swarm() {
        let mut game = SpaceInvaders::new();
        // Only the leftmost column survives, so the swarm can march further right
        for (idx, inv) in game.invaders.iter_mut().enumerate() {
            inv.alive = idx % INVADER_COLS == 0;
        }
        for _ in 0..100 {
            game.tick();
        }
        assert_eq!(game.invaders[0].pos, Vec2::new(250.0, 50.0));
    }
}

//! The contract every mini-game implements

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::error::ArcadeError;

/// Which game is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameId {
    Snake,
    Pong,
    Breakout,
    SpaceInvaders,
    Tetris,
}

impl GameId {
    /// Menu order
    pub const ALL: [GameId; 5] = [
        GameId::Snake,
        GameId::Pong,
        GameId::Breakout,
        GameId::SpaceInvaders,
        GameId::Tetris,
    ];

    /// Selector string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::Pong => "pong",
            GameId::Breakout => "breakout",
            GameId::SpaceInvaders => "space-invaders",
            GameId::Tetris => "tetris",
        }
    }

    /// Title shown above the canvas
    pub fn title(&self) -> &'static str {
        match self {
            GameId::Snake => "SNAKE",
            GameId::Pong => "PONG",
            GameId::Breakout => "BREAKOUT",
            GameId::SpaceInvaders => "SPACE INVADERS",
            GameId::Tetris => "TETRIS",
        }
    }

    /// One-line control hint
    pub fn controls(&self) -> &'static str {
        match self {
            GameId::Snake => "Use arrow keys to control the snake",
            GameId::Pong => "Use arrow keys to move your paddle",
            GameId::Breakout => "Use arrow keys to move the paddle",
            GameId::SpaceInvaders => "Arrow keys to move, SPACE to shoot",
            GameId::Tetris => "Arrow keys: Move/Rotate | Down: Drop faster | SPACE: Hard drop",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameId {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snake" => Ok(GameId::Snake),
            "pong" => Ok(GameId::Pong),
            "breakout" => Ok(GameId::Breakout),
            "space-invaders" | "space_invaders" | "spaceinvaders" | "invaders" => {
                Ok(GameId::SpaceInvaders)
            }
            "tetris" => Ok(GameId::Tetris),
            _ => Err(ArcadeError::UnknownGame(s.to_string())),
        }
    }
}

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    Playing,
    /// Terminal: player won (board cleared, match won)
    Won,
    /// Terminal: game over
    Lost,
}

impl GamePhase {
    pub fn is_over(&self) -> bool {
        !matches!(self, GamePhase::Playing)
    }
}

/// Something the shell may want to react to (sound, HUD flash)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Snake ate the food
    FoodEaten,
    /// Ball bounced off a wall
    WallBounce,
    /// Ball bounced off a paddle
    PaddleHit,
    /// Breakout brick destroyed
    BrickBroken,
    /// Player fired a bullet
    ShotFired,
    /// Invader destroyed by a bullet
    InvaderDestroyed,
    /// Pong point; `by_player` is false when the AI scored
    PointScored { by_player: bool },
    /// Tetromino written into the board
    PieceLocked,
    /// Full rows removed
    LinesCleared(u32),
    Won,
    Lost,
    /// Final score entered the leaderboard (1-indexed rank)
    HighScore { rank: usize },
}

/// Keyboard input the games understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" | "Up" => Some(Key::Up),
            "ArrowDown" | "Down" => Some(Key::Down),
            "ArrowLeft" | "Left" => Some(Key::Left),
            "ArrowRight" | "Right" => Some(Key::Right),
            " " | "Spacebar" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Escape" | "Esc" => Some(Key::Escape),
            _ => None,
        }
    }

    /// Keys whose browser default (scrolling) should be suppressed
    pub fn is_navigation(&self) -> bool {
        matches!(self, Key::Up | Key::Down | Key::Left | Key::Right | Key::Space)
    }
}

/// A mini-game: owns its state, advances one fixed step per `tick`
pub trait Game {
    fn id(&self) -> GameId;

    /// Canvas size in pixels (width, height)
    fn canvas_size(&self) -> (f32, f32);

    /// Milliseconds between ticks at normal speed
    fn tick_interval_ms(&self) -> f64;

    /// Advance one fixed step. No-op once the game is over.
    fn tick(&mut self);

    /// Apply a key press immediately. Ignored once the game is over.
    fn handle_key(&mut self, key: Key);

    /// Back to the initial state (score 0, fresh entities)
    fn reset(&mut self);

    fn phase(&self) -> GamePhase;

    /// Score credited to the player
    fn score(&self) -> u32;

    /// Score line shown in the header
    fn hud(&self) -> String;

    /// Lines shown on the game-over overlay
    fn summary(&self) -> Vec<String> {
        vec![format!("Final Score: {}", self.score())]
    }

    /// Overlay heading, `None` while playing
    fn banner(&self) -> Option<&'static str> {
        match self.phase() {
            GamePhase::Playing => None,
            GamePhase::Won => Some("YOU WIN!"),
            GamePhase::Lost => Some("GAME OVER"),
        }
    }

    /// Repaint the whole frame
    fn draw(&self, canvas: &mut Canvas);

    /// Autopilot for demo mode: the key a simple bot would press now
    fn demo_key(&self) -> Option<Key>;

    /// Events produced since the last drain
    fn drain_events(&mut self) -> Vec<GameEvent>;
}

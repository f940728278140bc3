//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `tick` per game interval)
//! - Seeded RNG only
//! - No rendering or platform dependencies (games paint into a plain `Canvas`)

pub mod breakout;
pub mod collision;
pub mod game;
pub mod invaders;
pub mod pong;
pub mod snake;
pub mod tetris;

pub use breakout::Breakout;
pub use collision::{Aabb, clamp_span};
pub use game::{Game, GameEvent, GameId, GamePhase, Key};
pub use invaders::SpaceInvaders;
pub use pong::Pong;
pub use snake::Snake;
pub use tetris::Tetris;

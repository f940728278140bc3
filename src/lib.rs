//! Retro Arcade - five classic mini-games behind one cabinet
//!
//! Core modules:
//! - `sim`: Deterministic game logic (Snake, Pong, Breakout, Space Invaders, Tetris)
//! - `arcade`: Game selector and the fixed-timestep cabinet that drives a mounted game
//! - `canvas`: Display list of filled rectangles produced by each game
//! - `renderer`: WebGPU rendering of a canvas display list
//! - `settings` / `highscores`: Preferences and leaderboards (LocalStorage on web)
//! - `audio`: Procedural sound effects for game events (Web Audio on web)

pub mod arcade;
pub mod audio;
pub mod canvas;
pub mod error;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use arcade::{Cabinet, GameInfo, catalog, mount};
pub use error::{ArcadeError, Result};
pub use highscores::HighScores;
pub use settings::{Settings, SpeedPreset};
pub use sim::{Game, GameEvent, GameId, GamePhase, Key};

/// Cabinet timing constants
pub mod consts {
    /// Largest frame delta fed to the accumulator (ms), so a stalled tab
    /// doesn't replay seconds of game time at once
    pub const MAX_FRAME_MS: f64 = 100.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Fallback frame delta for the very first frame (ms)
    pub const FIRST_FRAME_MS: f64 = 1000.0 / 60.0;
}

/// Derive the seed for the next mounted game from the previous one (SplitMix64 step)
#[inline]
pub fn next_seed(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_seed_is_deterministic_and_moves() {
        assert_eq!(next_seed(42), next_seed(42));
        assert_ne!(next_seed(42), 42);
        assert_ne!(next_seed(42), next_seed(43));
    }
}

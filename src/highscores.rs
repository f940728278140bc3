//! High score leaderboards, one per game
//!
//! Persisted to LocalStorage, each table tracks the top 10 scores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::GameId;

/// Maximum number of high scores to keep per game
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Extra line from the game's summary (e.g. "Level: 3")
    #[serde(default)]
    pub detail: String,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Leaderboard for one game, sorted descending by score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score if it qualifies and return the rank achieved.
    /// Ties rank below existing entries.
    pub fn add_score(&mut self, score: u64, detail: String, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            detail,
            timestamp,
        };

        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// All leaderboards keyed by game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub tables: BTreeMap<GameId, Leaderboard>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "retro_arcade_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, game: GameId) -> Option<&Leaderboard> {
        self.tables.get(&game)
    }

    pub fn qualifies(&self, game: GameId, score: u64) -> bool {
        self.table(game).map_or(score > 0, |t| t.qualifies(score))
    }

    pub fn potential_rank(&self, game: GameId, score: u64) -> Option<usize> {
        match self.table(game) {
            Some(t) => t.potential_rank(score),
            None => (score > 0).then_some(1),
        }
    }

    pub fn add_score(
        &mut self,
        game: GameId,
        score: u64,
        detail: String,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(game, score) {
            return None;
        }
        self.tables
            .entry(game)
            .or_default()
            .add_score(score, detail, timestamp)
    }

    pub fn top_score(&self, game: GameId) -> Option<u64> {
        self.table(game).and_then(Leaderboard::top_score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded high scores for {} games", scores.tables.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding stored high scores: {}", e),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} games)", self.tables.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

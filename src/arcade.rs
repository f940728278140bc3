//! Game selector and the cabinet that drives the mounted game
//!
//! The cabinet owns at most one game. It feeds wall-clock frame deltas into a
//! fixed-timestep accumulator, so each game ticks at its own interval no
//! matter the display refresh rate.

use crate::canvas::Canvas;
use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS};
use crate::error::Result;
use crate::highscores::HighScores;
use crate::next_seed;
use crate::settings::{Settings, SpeedPreset};
use crate::sim::{
    Breakout, Game, GameEvent, GameId, GamePhase, Key, Pong, Snake, SpaceInvaders, Tetris,
};

/// Menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameInfo {
    pub id: GameId,
    pub name: &'static str,
    pub description: &'static str,
}

/// Menu entries in display order
pub fn catalog() -> Vec<GameInfo> {
    GameId::ALL
        .iter()
        .map(|&id| GameInfo {
            id,
            name: id.title(),
            description: match id {
                GameId::Snake => "Eat, grow, don't bite yourself",
                GameId::Pong => "First to five against the machine",
                GameId::Breakout => "Clear the wall with one ball",
                GameId::SpaceInvaders => "Stop the swarm before it lands",
                GameId::Tetris => "Stack and clear lines as the pace rises",
            },
        })
        .collect()
}

/// Construct a fresh game
pub fn mount(id: GameId, seed: u64) -> Box<dyn Game> {
    match id {
        GameId::Snake => Box::new(Snake::new(seed)),
        GameId::Pong => Box::new(Pong::new(seed)),
        GameId::Breakout => Box::new(Breakout::new()),
        GameId::SpaceInvaders => Box::new(SpaceInvaders::new()),
        GameId::Tetris => Box::new(Tetris::new(seed)),
    }
}

/// Hosts one game at a time plus everything that outlives it
pub struct Cabinet {
    seed: u64,
    game: Option<Box<dyn Game>>,
    accumulator: f64,
    paused: bool,
    demo: bool,
    /// The autopilot played some part of the current run
    demo_used: bool,
    settings: Settings,
    high_scores: HighScores,
    /// Phase seen after the last update, to catch the game-over edge
    last_phase: GamePhase,
    events: Vec<GameEvent>,
    /// Timestamp of the latest frame (ms), stamped on high score entries
    now_ms: f64,
}

impl Cabinet {
    pub fn new(seed: u64, settings: Settings, high_scores: HighScores) -> Self {
        Self {
            seed,
            game: None,
            accumulator: 0.0,
            paused: false,
            demo: false,
            demo_used: false,
            settings,
            high_scores,
            last_phase: GamePhase::Playing,
            events: Vec::new(),
            now_ms: 0.0,
        }
    }

    /// Mount a game by selector string
    pub fn select(&mut self, selector: &str) -> Result<GameId> {
        let id: GameId = selector.parse()?;
        self.mount(id);
        Ok(id)
    }

    pub fn mount(&mut self, id: GameId) {
        self.seed = next_seed(self.seed);
        self.game = Some(mount(id, self.seed));
        self.start_fresh();
        log::info!("Mounted {} (seed {})", id, self.seed);
    }

    /// Unmount and return to the menu
    pub fn back(&mut self) {
        if let Some(game) = self.game.take() {
            log::info!("Unmounted {} at score {}", game.id(), game.score());
        }
        self.paused = false;
        self.accumulator = 0.0;
        self.events.clear();
    }

    pub fn restart(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        game.reset();
        log::info!("Restarted {}", game.id());
        self.start_fresh();
    }

    fn start_fresh(&mut self) {
        self.accumulator = 0.0;
        self.paused = false;
        self.last_phase = GamePhase::Playing;
        self.demo_used = self.demo;
        self.events.clear();
    }

    /// Route a key press. Escape toggles pause; everything else goes to the
    /// game while it is running.
    pub fn key(&mut self, key: Key) {
        if key == Key::Escape {
            self.toggle_pause();
            return;
        }
        if self.paused {
            return;
        }
        let Some(game) = self.game.as_mut() else {
            return;
        };
        if game.phase().is_over() {
            return;
        }
        game.handle_key(key);
        self.events.extend(game.drain_events());
        self.check_game_over();
    }

    pub fn toggle_pause(&mut self) {
        let paused = !self.paused;
        self.set_paused(paused);
    }

    /// Pausing only applies to a running game
    pub fn set_paused(&mut self, paused: bool) {
        let running = self.game.as_ref().is_some_and(|g| !g.phase().is_over());
        let paused = paused && running;
        if paused != self.paused {
            self.paused = paused;
            // Don't replay the time spent paused
            self.accumulator = 0.0;
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_demo(&mut self) -> bool {
        let demo = !self.demo;
        self.set_demo(demo);
        log::info!("Demo mode: {}", demo);
        demo
    }

    /// Once switched on, the rest of the run no longer counts for high scores
    pub fn set_demo(&mut self, demo: bool) {
        self.demo = demo;
        self.demo_used |= demo;
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// Feed one frame of wall-clock time. Returns the number of ticks run.
    pub fn advance(&mut self, dt_ms: f64, now_ms: f64) -> u32 {
        self.now_ms = now_ms;
        let scale = self.settings.speed.tick_scale();
        let Some(game) = self.game.as_mut() else {
            return 0;
        };
        if self.paused || game.phase().is_over() {
            return 0;
        }

        self.accumulator += dt_ms.clamp(0.0, MAX_FRAME_MS);

        let mut substeps = 0;
        loop {
            // Re-read every step: Tetris speeds up mid-frame
            let interval = game.tick_interval_ms() * scale;
            if self.accumulator < interval || substeps >= MAX_SUBSTEPS {
                break;
            }
            if self.demo {
                if let Some(key) = game.demo_key() {
                    game.handle_key(key);
                    self.demo_used = true;
                }
            }
            game.tick();
            self.accumulator -= interval;
            substeps += 1;
            self.events.extend(game.drain_events());

            if game.phase().is_over() {
                self.accumulator = 0.0;
                break;
            }
        }

        self.check_game_over();
        substeps
    }

    /// Offer the final score to the leaderboard on the transition into a
    /// terminal phase. Runs the autopilot took part in are not recorded.
    fn check_game_over(&mut self) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        let phase = game.phase();
        if phase.is_over() && !self.last_phase.is_over() {
            let id = game.id();
            let score = game.score() as u64;
            log::info!("{} over ({:?}), score {}", id, phase, score);

            if self.demo_used {
                log::info!("Autopilot run, score not recorded");
            } else {
                let detail = game.summary().get(1).cloned().unwrap_or_default();
                if let Some(rank) = self.high_scores.add_score(id, score, detail, self.now_ms) {
                    log::info!("New {} high score: #{}", id, rank);
                    self.high_scores.save();
                    self.events.push(GameEvent::HighScore { rank });
                }
            }
        }
        self.last_phase = phase;
    }

    /// Events since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn current(&self) -> Option<&dyn Game> {
        self.game.as_deref()
    }

    /// Draw the mounted game, or return `None` on the menu
    pub fn draw(&self) -> Option<Canvas> {
        let game = self.game.as_deref()?;
        let (w, h) = game.canvas_size();
        let mut canvas = Canvas::new(w, h);
        game.draw(&mut canvas);
        Some(canvas)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save();
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.settings.muted;
        self.set_settings(Settings {
            muted,
            ..self.settings.clone()
        });
        log::info!("Muted: {}", muted);
        muted
    }

    /// Step to the next speed preset. Takes effect from the next frame.
    pub fn cycle_speed(&mut self) -> SpeedPreset {
        let speed = self.settings.speed.next();
        self.set_settings(Settings {
            speed,
            ..self.settings.clone()
        });
        log::info!("Speed: {}", speed.as_str());
        speed
    }

    /// Nudge the master volume, returning the new level
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        let master_volume = (self.settings.master_volume + delta).clamp(0.0, 1.0);
        self.set_settings(Settings {
            master_volume,
            ..self.settings.clone()
        });
        master_volume
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }
}

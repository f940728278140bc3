//! Procedural sound effects
//!
//! Each effect is a short list of oscillator tones. On the web they are played
//! through the Web Audio API; natively nothing is played.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Snake ate the food
    Chomp,
    WallBounce,
    PaddleHit,
    BrickBreak,
    Shoot,
    InvaderHit,
    /// Player took a point
    PointWon,
    /// AI took a point
    PointLost,
    PieceLock,
    LineClear,
    Victory,
    GameOver,
    HighScore,
}

impl SoundEffect {
    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::FoodEaten => SoundEffect::Chomp,
            GameEvent::WallBounce => SoundEffect::WallBounce,
            GameEvent::PaddleHit => SoundEffect::PaddleHit,
            GameEvent::BrickBroken => SoundEffect::BrickBreak,
            GameEvent::ShotFired => SoundEffect::Shoot,
            GameEvent::InvaderDestroyed => SoundEffect::InvaderHit,
            GameEvent::PointScored { by_player: true } => SoundEffect::PointWon,
            GameEvent::PointScored { by_player: false } => SoundEffect::PointLost,
            GameEvent::PieceLocked => SoundEffect::PieceLock,
            GameEvent::LinesCleared(_) => SoundEffect::LineClear,
            GameEvent::Won => SoundEffect::Victory,
            GameEvent::Lost => SoundEffect::GameOver,
            GameEvent::HighScore { .. } => SoundEffect::HighScore,
        }
    }

    /// Tones making up the effect
    pub fn tones(&self) -> Vec<Tone> {
        use Wave::*;
        match self {
            SoundEffect::Chomp => vec![Tone::sweep(Square, 300.0, 600.0, 0.06, 0.25)],
            SoundEffect::WallBounce => vec![Tone::new(Sine, 400.0, 0.08, 0.3)],
            // Solid thump
            SoundEffect::PaddleHit => vec![Tone::sweep(Sine, 150.0, 60.0, 0.1, 0.6)],
            SoundEffect::BrickBreak => vec![
                Tone::new(Triangle, 300.0, 0.05, 0.25),
                Tone::new(Square, 900.0, 0.04, 0.1).after(0.02),
            ],
            SoundEffect::Shoot => vec![Tone::sweep(Sawtooth, 1200.0, 200.0, 0.12, 0.2)],
            SoundEffect::InvaderHit => vec![
                Tone::sweep(Square, 600.0, 80.0, 0.2, 0.3),
                Tone::new(Sine, 60.0, 0.1, 0.3),
            ],
            SoundEffect::PointWon => arpeggio(Triangle, &[500.0, 750.0], 0.08, 0.15, 0.3),
            SoundEffect::PointLost => arpeggio(Sine, &[300.0, 200.0], 0.1, 0.2, 0.3),
            SoundEffect::PieceLock => vec![Tone::new(Triangle, 220.0, 0.05, 0.25)],
            SoundEffect::LineClear => {
                arpeggio(Triangle, &[400.0, 500.0, 600.0, 800.0], 0.06, 0.2, 0.3)
            }
            SoundEffect::Victory => {
                arpeggio(Triangle, &[400.0, 500.0, 600.0, 800.0], 0.1, 0.4, 0.3)
            }
            // Sad descending
            SoundEffect::GameOver => arpeggio(Sine, &[400.0, 350.0, 300.0, 200.0], 0.2, 0.3, 0.3),
            SoundEffect::HighScore => {
                arpeggio(Triangle, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08, 0.25, 0.25)
            }
        }
    }
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator with an exponential decay envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Wave,
    pub freq: f32,
    /// Exponential pitch glide target
    pub glide_to: Option<f32>,
    /// Start offset (s)
    pub delay: f64,
    /// Decay time (s); the oscillator stops shortly after
    pub decay: f64,
    /// Peak gain before the volume settings are applied
    pub gain: f32,
}

impl Tone {
    pub const fn new(wave: Wave, freq: f32, decay: f64, gain: f32) -> Self {
        Self {
            wave,
            freq,
            glide_to: None,
            delay: 0.0,
            decay,
            gain,
        }
    }

    pub const fn sweep(wave: Wave, from: f32, to: f32, decay: f64, gain: f32) -> Self {
        Self {
            glide_to: Some(to),
            ..Self::new(wave, from, decay, gain)
        }
    }

    pub const fn after(self, delay: f64) -> Self {
        Self { delay, ..self }
    }

    /// When the oscillator is stopped, relative to the effect start
    pub fn end(&self) -> f64 {
        self.delay + self.decay * 1.25
    }
}

fn arpeggio(wave: Wave, notes: &[f32], step: f64, decay: f64, gain: f32) -> Vec<Tone> {
    notes
        .iter()
        .enumerate()
        .map(|(i, &freq)| Tone::new(wave, freq, decay, gain).after(i as f64 * step))
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, Tone, Wave};
    use crate::settings::Settings;

    /// Web Audio player
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
        /// Muted because the window lost focus
        blurred: bool,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
                blurred: false,
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        pub fn set_blurred(&mut self, blurred: bool) {
            self.blurred = blurred;
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn play(&self, effect: SoundEffect) {
            let vol = if self.blurred { 0.0 } else { self.volume };
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for tone in effect.tones() {
                Self::play_tone(ctx, &tone, vol);
            }
        }

        /// Create an oscillator routed through a gain node
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(ctx: &AudioContext, tone: &Tone, vol: f32) {
            let osc_type = match tone.wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Triangle => OscillatorType::Triangle,
                Wave::Sawtooth => OscillatorType::Sawtooth,
            };
            let Some((osc, gain)) = Self::create_osc(ctx, tone.freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + tone.delay;

            gain.gain().set_value_at_time(vol * tone.gain, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + tone.decay)
                .ok();
            if let Some(to) = tone.glide_to {
                osc.frequency().set_value_at_time(tone.freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to, t + tone.decay)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(ctx.current_time() + tone.end()).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_event_has_audible_tones() {
        let events = [
            GameEvent::FoodEaten,
            GameEvent::WallBounce,
            GameEvent::PaddleHit,
            GameEvent::BrickBroken,
            GameEvent::ShotFired,
            GameEvent::InvaderDestroyed,
            GameEvent::PointScored { by_player: true },
            GameEvent::PointScored { by_player: false },
            GameEvent::PieceLocked,
            GameEvent::LinesCleared(4),
            GameEvent::Won,
            GameEvent::Lost,
            GameEvent::HighScore { rank: 1 },
        ];
        for event in events {
            let tones = SoundEffect::for_event(&event).tones();
            assert!(!tones.is_empty(), "{:?}", event);
            for tone in tones {
                assert!(tone.freq > 0.0 && tone.gain > 0.0 && tone.gain <= 1.0);
                assert!(tone.glide_to.is_none_or(|f| f > 0.0));
                assert!(tone.end() > tone.delay);
            }
        }
    }

    #[test]
    fn test_point_sounds_depend_on_scorer() {
        assert_ne!(
            SoundEffect::for_event(&GameEvent::PointScored { by_player: true }),
            SoundEffect::for_event(&GameEvent::PointScored { by_player: false })
        );
    }

    #[test]
    fn test_arpeggio_staggers_notes() {
        let tones = SoundEffect::GameOver.tones();
        let delays: Vec<f64> = tones.iter().map(|t| t.delay).collect();
        assert_eq!(delays.len(), 4);
        assert!(delays.windows(2).all(|w| w[1] > w[0]));
    }
}

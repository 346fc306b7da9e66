//! Audio system
//!
//! Procedurally generated sound effects and music - no external files needed!
//! The game only talks to an `AudioSink`; the Web Audio implementation is
//! compiled for wasm32 and a silent one everywhere else.

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Obstacle passed
    Reward,
    /// Run ended
    GameOver,
}

/// Fire-and-forget audio capability.
///
/// Implementations must never panic or report errors to the caller; a
/// failure only silences the affected sound.
pub trait AudioSink {
    /// Play a one-shot effect (ignored while muted)
    fn play_once(&mut self, effect: SoundEffect);
    /// Apply the mute toggle to music and effects immediately
    fn set_muted(&mut self, muted: bool);
    /// Start the background loop; repeated calls are no-ops
    fn start_music_loop(&mut self);
}

/// Audio sink that plays nothing (native builds, tests)
#[derive(Debug, Default)]
pub struct SilentAudio {
    muted: bool,
    music_started: bool,
}

impl SilentAudio {
    pub fn new(settings: &Settings) -> Self {
        Self {
            muted: settings.muted,
            music_started: false,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn music_started(&self) -> bool {
        self.music_started
    }
}

impl AudioSink for SilentAudio {
    fn play_once(&mut self, effect: SoundEffect) {
        if !self.muted {
            log::debug!("Sound: {:?}", effect);
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn start_music_loop(&mut self) {
        if !self.music_started {
            self.music_started = true;
            log::debug!("Music loop started");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};
    use crate::settings::Settings;

    /// Notes of the background drone (A major, low register)
    const MUSIC_CHORD: [(f32, OscillatorType); 3] = [
        (110.0, OscillatorType::Sine),
        (164.81, OscillatorType::Sine),
        (277.18, OscillatorType::Triangle),
    ];
    /// The drone sits well under the effects
    const MUSIC_LEVEL: f32 = 0.12;

    /// Web Audio backed sink
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        music_gain: Option<GainNode>,
        music_voices: Vec<OscillatorNode>,
        settings: Settings,
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                music_gain: None,
                music_voices: Vec::new(),
                settings: settings.clone(),
            }
        }

        fn music_level(&self) -> f32 {
            self.settings.effective_music_volume() * MUSIC_LEVEL
        }

        /// Browsers keep the context suspended until a user gesture
        fn resume(ctx: &AudioContext) {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator routed through its own gain node
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

        /// Reward - bright two-note ding
        fn play_reward(ctx: &AudioContext, vol: f32) {
            for (i, freq) in [1046.5_f32, 1568.0].iter().enumerate() {
                let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Sine) else {
                    return;
                };
                let t = ctx.current_time() + i as f64 * 0.06;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }

        /// Game over - descending sawtooth "wah"
        fn play_game_over(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 400.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.5).ok();
            osc.frequency().set_value_at_time(400.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(80.0, t + 0.4)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.55).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play_once(&mut self, effect: SoundEffect) {
            let vol = self.settings.effective_sfx_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            Self::resume(ctx);

            match effect {
                SoundEffect::Reward => Self::play_reward(ctx, vol),
                SoundEffect::GameOver => Self::play_game_over(ctx, vol),
            }
        }

        fn set_muted(&mut self, muted: bool) {
            self.settings.muted = muted;
            if let (Some(ctx), Some(gain)) = (&self.ctx, &self.music_gain) {
                let level = self.music_level();
                gain.gain()
                    .set_target_at_time(level, ctx.current_time(), 0.02)
                    .ok();
            }
        }

        fn start_music_loop(&mut self) {
            if self.music_gain.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            Self::resume(ctx);

            let Ok(master) = ctx.create_gain() else {
                log::warn!("Failed to create music gain node");
                return;
            };
            master.gain().set_value(self.music_level());
            if master.connect_with_audio_node(&ctx.destination()).is_err() {
                log::warn!("Failed to connect music output");
                return;
            }

            for (freq, osc_type) in MUSIC_CHORD {
                let Ok(osc) = ctx.create_oscillator() else {
                    continue;
                };
                osc.set_type(osc_type);
                osc.frequency().set_value(freq);
                if osc.connect_with_audio_node(&master).is_ok() && osc.start().is_ok() {
                    self.music_voices.push(osc);
                }
            }
            log::info!("Music loop started ({} voices)", self.music_voices.len());
            self.music_gain = Some(master);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_audio_follows_settings() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        let mut audio = SilentAudio::new(&settings);
        assert!(audio.is_muted());
        audio.set_muted(false);
        assert!(!audio.is_muted());
    }

    #[test]
    fn test_music_start_is_idempotent() {
        let mut audio = SilentAudio::default();
        assert!(!audio.music_started());
        audio.start_music_loop();
        audio.start_music_loop();
        assert!(audio.music_started());
        audio.play_once(SoundEffect::Reward);
    }
}

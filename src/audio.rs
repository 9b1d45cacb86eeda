//! Audio notifier
//!
//! The simulation only names cues; a backend decides how they sound. The
//! browser backend synthesizes every cue with the Web Audio API, no external
//! files needed.

use serde::{Deserialize, Serialize};

/// Sound cues raised by the round controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Round begins
    Dice,
    /// Seeker bounced off a wall, or a dialog opened
    Plop,
    /// Infection spread, or the round ended badly
    Lost,
    /// An infection ran its course, or the runner won
    Won,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Dice => "dice",
            Cue::Plop => "plop",
            Cue::Lost => "lost",
            Cue::Won => "won",
        }
    }
}

/// User audio toggles, persisted with the stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Sound effects enabled
    pub sfx: bool,
    /// Background music enabled
    pub music: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sfx: true,
            music: true,
        }
    }
}

/// Audio capability consumed by the round controller
pub trait AudioNotifier {
    /// Play a cue; `rate` scales the pitch (1.0 = normal)
    fn play(&mut self, cue: Cue, rate: f32);

    fn play_music(&mut self);

    fn stop_music(&mut self);

    /// Music has been started at least once
    fn music_played(&self) -> bool;

    fn settings(&self) -> AudioSettings;

    fn apply_settings(&mut self, settings: AudioSettings);
}

/// Headless backend that records what would have been heard
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    settings: AudioSettings,
    /// Cues played, in order, with their rate
    pub played: Vec<(Cue, f32)>,
    pub music_on: bool,
    music_played: bool,
    /// Number of `play_music` calls that actually started music
    pub music_starts: u32,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues played so far, without rates
    pub fn cues(&self) -> Vec<Cue> {
        self.played.iter().map(|(cue, _)| *cue).collect()
    }

    pub fn clear(&mut self) {
        self.played.clear();
    }
}

impl AudioNotifier for RecordingAudio {
    fn play(&mut self, cue: Cue, rate: f32) {
        if !self.settings.sfx {
            return;
        }
        log::debug!("cue {} x{}", cue.as_str(), rate);
        self.played.push((cue, rate));
    }

    fn play_music(&mut self) {
        self.music_played = true;
        if self.settings.music && !self.music_on {
            self.music_on = true;
            self.music_starts += 1;
        }
    }

    fn stop_music(&mut self) {
        self.music_on = false;
    }

    fn music_played(&self) -> bool {
        self.music_played
    }

    fn settings(&self) -> AudioSettings {
        self.settings
    }

    fn apply_settings(&mut self, settings: AudioSettings) {
        self.settings = settings;
        if !settings.music {
            self.music_on = false;
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioNotifier, AudioSettings, Cue};

    /// Web Audio backend with procedurally generated cues
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        settings: AudioSettings,
        volume: f32,
        music: Vec<OscillatorNode>,
        music_played: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                settings: AudioSettings::default(),
                volume: 0.8,
                music: Vec::new(),
                music_played: false,
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_volume(&mut self, vol: f32) {
            self.volume = vol.clamp(0.0, 1.0);
        }

        /// Create an oscillator with gain envelope
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

        /// One enveloped note, `delay` seconds from now
        fn note(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
            vol: f32,
            delay: f64,
            length: f64,
        ) {
            let Some((osc, gain)) = Self::create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;
            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }
    }

    impl AudioNotifier for WebAudio {
        fn play(&mut self, cue: Cue, rate: f32) {
            if !self.settings.sfx || self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers suspend the context until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let vol = self.volume;
            match cue {
                // Quick rattle
                Cue::Dice => {
                    for (i, freq) in [700.0, 900.0, 650.0].iter().enumerate() {
                        Self::note(ctx, freq * rate, OscillatorType::Square, vol * 0.15, i as f64 * 0.05, 0.04);
                    }
                }
                Cue::Plop => {
                    Self::note(ctx, 300.0 * rate, OscillatorType::Sine, vol * 0.4, 0.0, 0.08);
                }
                Cue::Lost => {
                    for (i, freq) in [400.0, 300.0].iter().enumerate() {
                        Self::note(ctx, freq * rate, OscillatorType::Triangle, vol * 0.3, i as f64 * 0.1, 0.15);
                    }
                }
                Cue::Won => {
                    for (i, freq) in [500.0, 700.0, 1000.0].iter().enumerate() {
                        Self::note(ctx, freq * rate, OscillatorType::Triangle, vol * 0.25, i as f64 * 0.08, 0.2);
                    }
                }
            }
        }

        fn play_music(&mut self) {
            self.music_played = true;
            if !self.settings.music || !self.music.is_empty() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Soft sustained drone
            for freq in [110.0, 165.0] {
                if let Some((osc, gain)) = Self::create_osc(ctx, freq, OscillatorType::Sine) {
                    gain.gain().set_value(self.volume * 0.05);
                    if osc.start().is_ok() {
                        self.music.push(osc);
                    }
                }
            }
        }

        fn stop_music(&mut self) {
            for osc in self.music.drain(..) {
                osc.stop().ok();
            }
        }

        fn music_played(&self) -> bool {
            self.music_played
        }

        fn settings(&self) -> AudioSettings {
            self.settings
        }

        fn apply_settings(&mut self, settings: AudioSettings) {
            self.settings = settings;
            if !settings.music {
                self.stop_music();
            }
        }
    }
}

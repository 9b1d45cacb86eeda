//! Round lifecycle controller
//!
//! Owns the round state and everything around it: spawning, the tick timer,
//! transient flag timers, audio cues and persisted stats. The host feeds it
//! time with [`RoundController::advance`] and forwards user actions.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioNotifier, AudioSettings, Cue};
use crate::config::{ConfigError, GameConfig, Variant};
use crate::persistence::{self, Store};
use crate::platform::{Viewport, arena_scale};
use crate::sim::{
    Fob, GameEvent, Over, SimulationState, SpawnError, TimerEvent, TimerHandle, TimerQueue,
    spawn_round, tick,
};
use crate::stats::{RunnerStats, SavedGame, SeekerStats, Stats};

pub struct RoundController<A, S, V> {
    config: GameConfig,
    state: SimulationState,
    stats: Stats,
    timers: TimerQueue,
    tick_timer: Option<TimerHandle>,
    rng: Pcg32,
    prompt_visible: bool,
    audio: A,
    store: S,
    viewport: V,
}

impl<A: AudioNotifier, S: Store, V: Viewport> RoundController<A, S, V> {
    /// Validate the config, load saved stats and measure the arena
    pub fn new(
        config: GameConfig,
        seed: u64,
        audio: A,
        store: S,
        viewport: V,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut controller = Self {
            stats: Stats::empty(config.variant),
            config,
            state: SimulationState::default(),
            timers: TimerQueue::new(),
            tick_timer: None,
            rng: Pcg32::seed_from_u64(seed),
            prompt_visible: false,
            audio,
            store,
            viewport,
        };
        controller.load_game();
        controller.resize(false);
        Ok(controller)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_timer
            .is_some_and(|handle| self.timers.is_scheduled(handle))
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    pub fn show_prompt(&mut self) {
        self.prompt_visible = true;
    }

    /// The special body of this round
    pub fn special(&self) -> Option<&Fob> {
        self.state.find(&self.config.rules.special_id)
    }

    pub fn live_count(&self) -> usize {
        self.state.live_count()
    }

    /// Start (or restart) a round
    ///
    /// A failed spawn leaves the previous round untouched and silent.
    pub fn on_start(&mut self) -> Result<(), SpawnError> {
        let fobs = spawn_round(
            &mut self.rng,
            self.config.variant,
            &self.config.rules,
            self.state.space,
            self.state.scale,
            self.config.max_spawn_attempts,
        )
        .inspect_err(|e| log::error!("Round start failed: {}", e))?;

        if !self.audio.music_played() {
            self.audio.play_music();
        }
        self.audio.play(Cue::Dice, 1.0);

        self.state.over = None;
        self.state.dialog = false;
        self.state.bounced = false;
        self.state.ticks = 0;
        self.state.fobs = fobs;

        // Old round's timers must not leak into the new one
        self.timers.clear();
        self.tick_timer = Some(self.timers.every(TimerEvent::Tick, self.config.tick_ms));

        self.stats.add_play();
        log::info!(
            "Round {} started ({}, {} bodies, scale {:.3})",
            self.stats.plays(),
            self.config.variant.as_str(),
            self.state.fobs.len(),
            self.state.scale
        );
        self.persist();
        Ok(())
    }

    /// Re-measure the arena.
    ///
    /// The initial call also resets the screen: prompt hidden, music stopped,
    /// and any leftover round discarded behind the start dialog.
    pub fn resize(&mut self, initial: bool) {
        self.state.space = self.viewport.arena_size();
        self.state.scale = arena_scale(self.state.space, self.config.reference);
        log::debug!(
            "Arena {}x{} scale {:.3}",
            self.state.space.width,
            self.state.space.height,
            self.state.scale
        );

        if !initial {
            return;
        }

        self.prompt_visible = false;
        self.audio.stop_music();

        if !self.state.fobs.is_empty() {
            self.state.fobs.clear();
            self.state.dialog = true;
            self.state.over = None;
            self.cancel_tick_timer();
        }
    }

    /// Open or close the modal dialog; ticks are frozen while it is open
    pub fn show_dialog(&mut self, open: bool, plop: bool) {
        if plop {
            self.audio.play(Cue::Plop, 1.0);
        }
        self.state.dialog = open;
    }

    /// Advance virtual time, firing ticks and flag clears as they fall due
    pub fn advance(&mut self, ms: u64) {
        let until = self.timers.now_ms() + ms;
        while let Some((_, event)) = self.timers.pop_due(until) {
            match event {
                TimerEvent::Tick => self.on_tick(),
                TimerEvent::ClearShake { id } => {
                    if let Some(fob) = self.state.find_mut(&id) {
                        fob.shake = false;
                    }
                }
                TimerEvent::ClearBounced { .. } => self.state.bounced = false,
            }
        }
        self.timers.settle(until);
    }

    /// Run one tick and react to what happened
    pub fn on_tick(&mut self) {
        let events = tick(&mut self.state, &self.config);
        for event in events {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::RoundLost { ticks } => {
                self.audio.play(Cue::Lost, 1.0);
                if let Stats::Seeker(stats) = &mut self.stats {
                    if stats.record_ticks(ticks) {
                        log::info!("New best: {} ticks", ticks);
                        self.persist();
                    }
                }
            }
            GameEvent::WallBounce { id, .. } => {
                if id != self.config.rules.special_id {
                    return;
                }
                if !self.state.is_over() {
                    self.audio.play(Cue::Plop, 1.0);
                }
                self.timers
                    .after(TimerEvent::ClearBounced { id }, self.config.bounce_ms);
            }
            GameEvent::Infected { id, carrier } => {
                log::debug!("{} infected by {}", id, carrier);
                self.audio.play(Cue::Lost, 2.0);
                self.schedule_unshake(id);
                self.schedule_unshake(carrier);
            }
            GameEvent::InfectionResolved { id, rate, .. } => {
                self.audio.play(Cue::Won, rate);
                self.schedule_unshake(id);
            }
        }
    }

    fn schedule_unshake(&mut self, id: String) {
        self.timers
            .after(TimerEvent::ClearShake { id }, self.config.shake_ms);
    }

    fn cancel_tick_timer(&mut self) {
        if let Some(handle) = self.tick_timer.take() {
            self.timers.cancel(handle);
        }
    }

    /// Runner score: the ceiling minus whole elapsed seconds, never below zero
    pub fn score(&self) -> u64 {
        let seconds = self.state.ticks * self.config.tick_ms / 1000;
        self.config.rules.max_points.saturating_sub(seconds)
    }

    /// The round ended without a win
    pub fn lost(&self) -> bool {
        matches!(self.state.over, Some(Over::Ticks(_)))
    }

    /// End a runner round as won or lost.
    ///
    /// Ignored when the round is already over or not a runner round. Returns
    /// whether the round was finished by this call.
    pub fn finish(&mut self, won: bool) -> bool {
        if self.config.variant != Variant::Runner || self.state.is_over() {
            log::warn!("finish({}) ignored", won);
            return false;
        }

        self.cancel_tick_timer();

        if won {
            let points = self.score();
            self.state.over = Some(Over::Won);
            self.audio.play(Cue::Won, 1.0);
            if let Stats::Runner(stats) = &mut self.stats {
                if stats.record_win(points) {
                    log::info!("New best: {} points", points);
                }
            }
            log::info!("Round won with {} points", points);
        } else {
            self.state.over = Some(Over::Ticks(self.state.ticks));
            self.audio.play(Cue::Lost, 1.0);
            log::info!("Round lost at tick {}", self.state.ticks);
        }

        self.persist();
        true
    }

    /// Change the audio toggles and save them
    pub fn set_audio_settings(&mut self, settings: AudioSettings) {
        self.audio.apply_settings(settings);
        self.persist();
    }

    /// Read saved stats and audio toggles; anything unreadable starts at zero
    pub fn load_game(&mut self) {
        let audio = match self.config.variant {
            Variant::Seeker => {
                let saved: SavedGame<SeekerStats> = persistence::read_or_default(&self.store);
                self.stats = Stats::Seeker(saved.stats);
                saved.audio
            }
            Variant::Runner => {
                let saved: SavedGame<RunnerStats> = persistence::read_or_default(&self.store);
                self.stats = Stats::Runner(saved.stats);
                saved.audio
            }
        };
        self.audio.apply_settings(audio);
    }

    /// Save stats and audio toggles
    pub fn persist(&mut self) {
        let audio = self.audio.settings();
        let result = match self.stats {
            Stats::Seeker(stats) => persistence::write(&mut self.store, &SavedGame { audio, stats }),
            Stats::Runner(stats) => persistence::write(&mut self.store, &SavedGame { audio, stats }),
        };
        if let Err(e) = result {
            log::warn!("Failed to save game: {}", e);
        }
    }
}

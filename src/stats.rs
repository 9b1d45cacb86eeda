//! Play statistics
//!
//! Persisted together with the audio toggles as one flat JSON blob.

use serde::{Deserialize, Serialize};

pub use crate::audio::AudioSettings;
use crate::config::Variant;

/// Seeker counters: fewer ticks to take down the swarm is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeekerStats {
    pub plays: u32,
    /// Fastest round in ticks (0 = none yet)
    pub best_ticks: u64,
}

impl SeekerStats {
    /// Record a finished round; true if it is a new best
    pub fn record_ticks(&mut self, ticks: u64) -> bool {
        if self.best_ticks == 0 || ticks < self.best_ticks {
            self.best_ticks = ticks;
            true
        } else {
            false
        }
    }
}

/// Runner counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerStats {
    pub plays: u32,
    /// Rounds won
    pub won: u32,
    /// Points summed over all wins
    pub total_points: u64,
    pub best_points: u64,
}

impl RunnerStats {
    /// Record a win worth `points`; true if it is a new best
    pub fn record_win(&mut self, points: u64) -> bool {
        self.won += 1;
        self.total_points += points;
        if points > self.best_points {
            self.best_points = points;
            true
        } else {
            false
        }
    }
}

/// Stats of the variant being played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stats {
    Seeker(SeekerStats),
    Runner(RunnerStats),
}

impl Stats {
    pub fn empty(variant: Variant) -> Self {
        match variant {
            Variant::Seeker => Stats::Seeker(SeekerStats::default()),
            Variant::Runner => Stats::Runner(RunnerStats::default()),
        }
    }

    pub fn plays(&self) -> u32 {
        match self {
            Stats::Seeker(s) => s.plays,
            Stats::Runner(s) => s.plays,
        }
    }

    pub fn add_play(&mut self) {
        match self {
            Stats::Seeker(s) => s.plays += 1,
            Stats::Runner(s) => s.plays += 1,
        }
    }
}

/// The persisted blob: audio toggles next to the counters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedGame<S> {
    #[serde(flatten)]
    pub audio: AudioSettings,
    #[serde(flatten)]
    pub stats: S,
}

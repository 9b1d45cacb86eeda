//! Fob Arena - bouncing bodies in a bounded arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, round state)
//! - `round`: Round lifecycle controller (start, resize, scoring, stats)
//! - `config`: Data-driven timing and per-variant spawn rules
//! - `stats`: Persisted play counters and best results
//! - `audio`: Audio notifier abstraction
//! - `persistence`: Key-value store abstraction
//! - `platform`: Arena layout query

pub mod audio;
pub mod config;
pub mod persistence;
pub mod platform;
pub mod round;
pub mod sim;
pub mod stats;

pub use config::{ConfigError, GameConfig, InfectionOutcome, Variant, VariantRules};
pub use round::RoundController;
pub use stats::{AudioSettings, SavedGame};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation interval (ms per tick)
    pub const TICK_MS: u64 = 20;
    /// How long an infected body stays infected
    pub const INFECTION_MS: u64 = 3000;
    /// Lifetime of the shake display flag
    pub const SHAKE_MS: u64 = 200;
    /// Lifetime of the special body's bounce flag
    pub const BOUNCE_MS: u64 = 1000;

    /// Reference arena size; smaller arenas scale everything down
    pub const REFERENCE_WIDTH: f32 = 1700.0;
    pub const REFERENCE_HEIGHT: f32 = 940.0;

    /// Seeker variant: the special body and its swarm
    pub const ZET_ID: &str = "zet";
    pub const ZET_RADIUS: f32 = 30.0;
    pub const PET_COUNT: usize = 6;
    pub const PET_RADIUS: f32 = 20.0;
    pub const PET_VELOCITY: f32 = 4.0;
    /// Minimum spawn separation, in special-body radii
    pub const SCATTER_FACTOR: f32 = 5.0;

    /// Runner variant
    pub const HERO_ID: &str = "hero";
    pub const HERO_RADIUS: f32 = 30.0;
    pub const FOE_COUNT: usize = 10;
    pub const FOE_RADIUS: f32 = 20.0;
    pub const FOE_VELOCITY: f32 = 5.0;
    /// Score ceiling; one point is lost per elapsed second
    pub const MAX_POINTS: u64 = 100;

    /// Rejection-sampling cap for scattered spawns
    pub const MAX_SPAWN_ATTEMPTS: u32 = 10_000;

    /// Swarm body id prefix (`pet-1`, `pet-2`, ...)
    pub const SWARM_ID_PREFIX: &str = "pet";
}

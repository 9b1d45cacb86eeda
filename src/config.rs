//! Game configuration
//!
//! Timing and spawn rules, loadable from JSON. Every field has a default so a
//! partial document only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Space;

/// Which game is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The dead seeker infects the swarm; clear the arena as fast as possible
    #[default]
    Seeker,
    /// A protagonist survives the swarm; score decays with time
    Runner,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Seeker => "seeker",
            Variant::Runner => "runner",
        }
    }

}

impl std::str::FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "seeker" | "a" => Ok(Variant::Seeker),
            "runner" | "b" => Ok(Variant::Runner),
            _ => Err(ConfigError::UnknownVariant(s.to_string())),
        }
    }
}

/// What happens once an infected body's delay runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InfectionOutcome {
    /// The body shakes off the infection and is alive again
    #[default]
    Recover,
    /// The body becomes permanently dead
    Perish,
}

/// Spawn and elimination rules for one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantRules {
    /// Reserved id of the special body
    pub special_id: String,
    /// Special body radius at scale 1
    pub special_radius: f32,
    /// Number of ordinary bodies
    pub swarm_count: usize,
    /// Ordinary body radius at scale 1
    pub swarm_radius: f32,
    /// Manhattan speed budget of ordinary bodies at scale 1
    pub swarm_speed: f32,
    /// Minimum spawn separation in special radii (None = no constraint)
    pub scatter_factor: Option<f32>,
    /// Infection resolution rule
    pub infection_outcome: InfectionOutcome,
    /// Score ceiling (runner only)
    pub max_points: u64,
}

impl VariantRules {
    pub fn seeker() -> Self {
        Self {
            special_id: ZET_ID.to_string(),
            special_radius: ZET_RADIUS,
            swarm_count: PET_COUNT,
            swarm_radius: PET_RADIUS,
            swarm_speed: PET_VELOCITY,
            scatter_factor: Some(SCATTER_FACTOR),
            infection_outcome: InfectionOutcome::Recover,
            max_points: 0,
        }
    }

    pub fn runner() -> Self {
        Self {
            special_id: HERO_ID.to_string(),
            special_radius: HERO_RADIUS,
            swarm_count: FOE_COUNT,
            swarm_radius: FOE_RADIUS,
            swarm_speed: FOE_VELOCITY,
            scatter_factor: None,
            infection_outcome: InfectionOutcome::Recover,
            max_points: MAX_POINTS,
        }
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Seeker => Self::seeker(),
            Variant::Runner => Self::runner(),
        }
    }
}

impl Default for VariantRules {
    fn default() -> Self {
        Self::seeker()
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,
    /// Tick interval (ms)
    pub tick_ms: u64,
    /// Infection delay (ms)
    pub infection_ms: u64,
    /// Shake flag lifetime (ms)
    pub shake_ms: u64,
    /// Bounce flag lifetime (ms)
    pub bounce_ms: u64,
    /// Arena size at which scale is 1
    pub reference: Space,
    /// Cap on scattered spawn attempts
    pub max_spawn_attempts: u32,
    pub rules: VariantRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_variant(Variant::Seeker)
    }
}

impl GameConfig {
    /// Default configuration for a variant
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            tick_ms: TICK_MS,
            infection_ms: INFECTION_MS,
            shake_ms: SHAKE_MS,
            bounce_ms: BOUNCE_MS,
            reference: Space::new(REFERENCE_WIDTH, REFERENCE_HEIGHT),
            max_spawn_attempts: MAX_SPAWN_ATTEMPTS,
            rules: VariantRules::for_variant(variant),
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// Rule fields the document leaves out come from the named variant's
    /// defaults, not the seeker's.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let parse = |e: serde_json::Error| ConfigError::Parse(e.to_string());

        let mut value: serde_json::Value = serde_json::from_str(json).map_err(parse)?;
        let overrides = value.as_object_mut().and_then(|doc| doc.remove("rules"));
        let mut config: GameConfig = serde_json::from_value(value).map_err(parse)?;

        let defaults = VariantRules::for_variant(config.variant);
        config.rules = match overrides {
            None => defaults,
            Some(serde_json::Value::Object(fields)) => {
                let mut merged = serde_json::to_value(defaults).map_err(parse)?;
                if let Some(base) = merged.as_object_mut() {
                    base.extend(fields);
                }
                serde_json::from_value(merged).map_err(parse)?
            }
            Some(other) => serde_json::from_value(other).map_err(parse)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::InvalidTickInterval);
        }
        if !(self.reference.width > 0.0 && self.reference.height > 0.0) {
            return Err(ConfigError::InvalidReferenceSize);
        }
        if !(self.rules.special_radius > 0.0 && self.rules.swarm_radius > 0.0) {
            return Err(ConfigError::InvalidRadius);
        }
        if !(self.rules.swarm_speed >= 0.0) {
            return Err(ConfigError::InvalidSpeed);
        }
        if self.rules.swarm_count == 0 {
            return Err(ConfigError::EmptySwarm);
        }
        if let Some(factor) = self.rules.scatter_factor {
            if !(factor >= 0.0) {
                return Err(ConfigError::InvalidScatterFactor);
            }
        }
        if self.max_spawn_attempts == 0 {
            return Err(ConfigError::NoSpawnAttempts);
        }
        Ok(())
    }
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// JSON could not be parsed
    Parse(String),
    /// Variant name not recognized
    UnknownVariant(String),
    /// Tick interval must be positive
    InvalidTickInterval,
    /// Reference width/height must be positive
    InvalidReferenceSize,
    /// Body radii must be positive
    InvalidRadius,
    /// Swarm speed must be non-negative
    InvalidSpeed,
    /// At least one swarm body is required
    EmptySwarm,
    /// Scatter factor must be non-negative
    InvalidScatterFactor,
    /// Spawn attempt cap must be positive
    NoSpawnAttempts,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::UnknownVariant(name) => write!(f, "unknown variant '{}'", name),
            ConfigError::InvalidTickInterval => write!(f, "tick_ms must be > 0"),
            ConfigError::InvalidReferenceSize => write!(f, "reference size must be > 0"),
            ConfigError::InvalidRadius => write!(f, "body radii must be > 0"),
            ConfigError::InvalidSpeed => write!(f, "swarm_speed must be >= 0"),
            ConfigError::EmptySwarm => write!(f, "swarm_count must be > 0"),
            ConfigError::InvalidScatterFactor => write!(f, "scatter_factor must be >= 0"),
            ConfigError::NoSpawnAttempts => write!(f, "max_spawn_attempts must be > 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

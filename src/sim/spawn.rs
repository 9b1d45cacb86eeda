//! Body spawning
//!
//! Positions and velocities are rolled from the round RNG and scaled to the
//! arena. The seeker variant additionally rejects batches whose bodies start
//! too close together.

use glam::Vec2;
use rand::Rng;

use super::state::{Fob, Life, Space};
use crate::config::{Variant, VariantRules};
use crate::consts::SWARM_ID_PREFIX;

/// Uniform draw in `[0, upper]`; a non-positive range collapses to 0
fn uniform<R: Rng + ?Sized>(rng: &mut R, upper: f32) -> f32 {
    if upper > 0.0 {
        rng.random_range(0.0..=upper)
    } else {
        0.0
    }
}

/// Random center for a body of `radius`, inset so the circle fits
fn random_center<R: Rng + ?Sized>(rng: &mut R, space: Space, radius: f32) -> Vec2 {
    let width = space.width - radius * 2.0;
    let height = space.height - radius * 2.0;
    Vec2::new(uniform(rng, width) + radius, uniform(rng, height) + radius)
}

/// Split a speed budget randomly between the axes.
///
/// `|x| + |y| == magnitude * scale`; each component's sign is a coin toss.
pub fn spawn_velocity<R: Rng + ?Sized>(rng: &mut R, magnitude: f32, scale: f32) -> Vec2 {
    let budget = magnitude * scale;

    let mut x = uniform(rng, budget);
    let mut y = budget - x;

    if rng.random_bool(0.5) {
        x = -x;
    }
    if rng.random_bool(0.5) {
        y = -y;
    }

    Vec2::new(x, y)
}

/// The special body: random position, at rest.
///
/// The seeker starts dead; the runner's hero starts alive.
pub fn spawn_special<R: Rng + ?Sized>(
    rng: &mut R,
    variant: Variant,
    rules: &VariantRules,
    space: Space,
    scale: f32,
) -> Fob {
    let radius = rules.special_radius * scale;
    let pos = random_center(rng, space, radius);
    let life = match variant {
        Variant::Seeker => Life::Dead,
        Variant::Runner => Life::Alive,
    };
    Fob::new(rules.special_id.clone(), pos, radius, Vec2::ZERO).with_life(life)
}

/// The ordinary bodies, each with its own rolled velocity
pub fn spawn_swarm<R: Rng + ?Sized>(
    rng: &mut R,
    rules: &VariantRules,
    space: Space,
    scale: f32,
) -> Vec<Fob> {
    let radius = rules.swarm_radius * scale;
    (0..rules.swarm_count)
        .map(|i| {
            let pos = random_center(rng, space, radius);
            let vel = spawn_velocity(rng, rules.swarm_speed, scale);
            Fob::new(format!("{}-{}", SWARM_ID_PREFIX, i + 1), pos, radius, vel)
        })
        .collect()
}

/// No two centers closer than `min_distance`
pub fn well_scattered(fobs: &[Fob], min_distance: f32) -> bool {
    fobs.iter().enumerate().all(|(i, a)| {
        fobs[i + 1..]
            .iter()
            .all(|b| a.pos.distance(b.pos) >= min_distance)
    })
}

/// Spawn a full round of bodies.
///
/// With a scatter factor the whole batch is re-rolled until it is well
/// scattered, giving up after `max_attempts`. Tiny arenas with large bodies
/// can make the constraint unsatisfiable.
pub fn spawn_round<R: Rng + ?Sized>(
    rng: &mut R,
    variant: Variant,
    rules: &VariantRules,
    space: Space,
    scale: f32,
    max_attempts: u32,
) -> Result<Vec<Fob>, SpawnError> {
    let min_distance = rules
        .scatter_factor
        .map(|factor| factor * rules.special_radius * scale);

    for attempt in 1..=max_attempts.max(1) {
        let mut fobs = Vec::with_capacity(rules.swarm_count + 1);
        fobs.push(spawn_special(rng, variant, rules, space, scale));
        fobs.extend(spawn_swarm(rng, rules, space, scale));

        match min_distance {
            Some(min) if !well_scattered(&fobs, min) => {
                log::debug!("Spawn attempt {} not scattered, rerolling", attempt);
            }
            _ => {
                if attempt > 1 {
                    log::debug!("Spawned {} bodies after {} attempts", fobs.len(), attempt);
                }
                return Ok(fobs);
            }
        }
    }

    Err(SpawnError::ScatterExhausted {
        attempts: max_attempts,
    })
}

/// Spawning failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    /// No well-scattered batch was found; the arena is too small for the rules
    ScatterExhausted { attempts: u32 },
}

impl std::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpawnError::ScatterExhausted { attempts } => write!(
                f,
                "no well-scattered spawn found after {} attempts",
                attempts
            ),
        }
    }
}

impl std::error::Error for SpawnError {}

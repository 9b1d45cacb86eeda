//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No audio, storage or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Edge, hit_edge, overlap, quantize_half_step, resolve_collision};
pub use spawn::{SpawnError, spawn_round, spawn_special, spawn_swarm, spawn_velocity, well_scattered};
pub use state::{Fob, Life, Over, RoundPhase, SimulationState, Space};
pub use tick::{GameEvent, tick};
pub use timers::{TimerEvent, TimerHandle, TimerQueue};

//! Round state and core simulation types
//!
//! Everything a tick reads or writes lives in [`SimulationState`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Arena dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Space {
    pub width: f32,
    pub height: f32,
}

impl Space {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Life state of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Life {
    #[default]
    Alive,
    /// Touched a dead body at the given tick; counts as not alive
    Infected { since: u64 },
    /// Permanently dead
    Dead,
}

/// A moving circular body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fob {
    pub id: String,
    /// Center in arena space
    pub pos: Vec2,
    pub radius: f32,
    /// Arena units per tick
    pub vel: Vec2,
    pub life: Life,
    /// Transient display flag
    #[serde(skip)]
    pub shake: bool,
}

impl Fob {
    pub fn new(id: impl Into<String>, pos: Vec2, radius: f32, vel: Vec2) -> Self {
        Self {
            id: id.into(),
            pos,
            radius,
            vel,
            life: Life::Alive,
            shake: false,
        }
    }

    pub fn with_life(mut self, life: Life) -> Self {
        self.life = life;
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life == Life::Alive
    }

    /// Keep the whole circle inside the arena.
    ///
    /// An arena narrower than the body pins it to the middle of that axis.
    pub fn clamp_into(&mut self, space: Space) {
        self.pos.x = clamp_axis(self.pos.x, self.radius, space.width);
        self.pos.y = clamp_axis(self.pos.y, self.radius, space.height);
    }
}

fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    let lo = radius;
    let hi = extent - radius;
    if hi < lo {
        extent / 2.0
    } else {
        value.max(lo).min(hi)
    }
}

/// Terminal marker of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Over {
    /// Ended at this tick
    Ticks(u64),
    /// Runner won
    Won,
}

/// Round phase, derived from the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No bodies spawned yet
    Idle,
    Running,
    Over,
}

/// Complete round state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationState {
    pub fobs: Vec<Fob>,
    pub space: Space,
    /// Resolution factor applied to spawned radii and speeds
    pub scale: f32,
    /// Simulation tick counter
    pub ticks: u64,
    pub over: Option<Over>,
    /// Modal dialog open; ticks are frozen
    pub dialog: bool,
    /// The special body bounced off a wall recently
    #[serde(skip)]
    pub bounced: bool,
}

impl SimulationState {
    pub fn new(space: Space, scale: f32) -> Self {
        Self {
            space,
            scale,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> RoundPhase {
        if self.over.is_some() {
            RoundPhase::Over
        } else if self.fobs.is_empty() {
            RoundPhase::Idle
        } else {
            RoundPhase::Running
        }
    }

    pub fn is_over(&self) -> bool {
        self.over.is_some()
    }

    pub fn live_count(&self) -> usize {
        self.fobs.iter().filter(|f| f.is_alive()).count()
    }

    pub fn find(&self, id: &str) -> Option<&Fob> {
        self.fobs.iter().find(|f| f.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Fob> {
        self.fobs.iter_mut().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_into() {
        let space = Space::new(200.0, 100.0);
        let mut fob = Fob::new("a", Vec2::new(-5.0, 120.0), 10.0, Vec2::ZERO);
        fob.clamp_into(space);
        assert_eq!(fob.pos, Vec2::new(10.0, 90.0));

        // Arena thinner than the body
        let mut fob = Fob::new("b", Vec2::new(3.0, 50.0), 10.0, Vec2::ZERO);
        fob.clamp_into(Space::new(15.0, 100.0));
        assert_eq!(fob.pos.x, 7.5);
    }

    #[test]
    fn test_phase_and_live_count() {
        let mut state = SimulationState::new(Space::new(100.0, 100.0), 1.0);
        assert_eq!(state.phase(), RoundPhase::Idle);

        state.fobs.push(Fob::new("a", Vec2::splat(50.0), 5.0, Vec2::ZERO));
        state
            .fobs
            .push(Fob::new("b", Vec2::splat(20.0), 5.0, Vec2::ZERO).with_life(Life::Dead));
        state.fobs.push(
            Fob::new("c", Vec2::splat(80.0), 5.0, Vec2::ZERO)
                .with_life(Life::Infected { since: 3 }),
        );
        assert_eq!(state.phase(), RoundPhase::Running);
        assert_eq!(state.live_count(), 1);
        assert!(state.find("c").is_some());
        assert!(state.find("zet").is_none());

        state.over = Some(Over::Ticks(4));
        assert_eq!(state.phase(), RoundPhase::Over);
    }
}

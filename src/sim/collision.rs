//! Collision detection and response for circular bodies
//!
//! Circle-circle overlap, elastic impulse exchange along the contact normal,
//! and arena wall detection with a fixed edge priority.

use glam::Vec2;

use super::state::{Fob, Space};

/// Arena edge crossed by a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// Check order; the first crossed edge wins, later ones wait a tick
    pub const PRIORITY: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    /// Numeric code (top 1, right 2, bottom 3, left 4)
    pub fn code(&self) -> u8 {
        match self {
            Edge::Top => 1,
            Edge::Right => 2,
            Edge::Bottom => 3,
            Edge::Left => 4,
        }
    }

    /// Whether the body's circle touches or passes this edge
    fn crossed(&self, fob: &Fob, space: Space) -> bool {
        match self {
            Edge::Left => fob.pos.x - fob.radius <= 0.0,
            Edge::Right => fob.pos.x + fob.radius >= space.width,
            Edge::Top => fob.pos.y - fob.radius <= 0.0,
            Edge::Bottom => fob.pos.y + fob.radius >= space.height,
        }
    }

    /// Whether the velocity already points back into the arena
    fn moving_inward(&self, vel: Vec2) -> bool {
        match self {
            Edge::Left => vel.x > 0.0,
            Edge::Right => vel.x < 0.0,
            Edge::Top => vel.y > 0.0,
            Edge::Bottom => vel.y < 0.0,
        }
    }

    /// Reflect the velocity component perpendicular to this edge
    pub fn reflect(&self, vel: Vec2) -> Vec2 {
        match self {
            Edge::Left | Edge::Right => Vec2::new(-vel.x, vel.y),
            Edge::Top | Edge::Bottom => Vec2::new(vel.x, -vel.y),
        }
    }
}

/// Find the edge a body should bounce off this tick.
///
/// Only the first crossed edge in [`Edge::PRIORITY`] is considered. If the
/// body is already heading back inside, there is no bounce, so a body
/// overlapping a wall bounces once per approach.
pub fn hit_edge(fob: &Fob, space: Space) -> Option<Edge> {
    let edge = Edge::PRIORITY
        .into_iter()
        .find(|edge| edge.crossed(fob, space))?;

    if edge.moving_inward(fob.vel) {
        None
    } else {
        Some(edge)
    }
}

/// Circles intersect (touching does not count)
#[inline]
pub fn overlap(a: &Fob, b: &Fob) -> bool {
    a.pos.distance(b.pos) < a.radius + b.radius
}

/// Elastic collision between two bodies, returning their new velocities.
///
/// Mass is proportional to the radius squared. The tangential components are
/// kept and the normal components are exchanged; equal masses swap them
/// exactly. Coincident centers use the x axis as the normal.
pub fn resolve_collision(a: &Fob, b: &Fob) -> (Vec2, Vec2) {
    let normal = (b.pos - a.pos).normalize_or_zero();
    let normal = if normal == Vec2::ZERO { Vec2::X } else { normal };

    let v1n = a.vel.dot(normal);
    let v2n = b.vel.dot(normal);

    let m1 = a.radius * a.radius;
    let m2 = b.radius * b.radius;

    let (u1n, u2n) = if m1 == m2 {
        (v2n, v1n)
    } else {
        let total = m1 + m2;
        (
            (v1n * (m1 - m2) + 2.0 * m2 * v2n) / total,
            (v2n * (m2 - m1) + 2.0 * m1 * v1n) / total,
        )
    };

    (
        a.vel + (u1n - v1n) * normal,
        b.vel + (u2n - v2n) * normal,
    )
}

/// Snap a velocity to the nearest half unit per component.
///
/// Components are first rounded to one decimal, then halves round up.
pub fn quantize_half_step(vel: Vec2) -> Vec2 {
    fn snap(value: f32) -> f32 {
        let tenth = (value * 10.0).round() / 10.0;
        (tenth * 2.0 + 0.5).floor() / 2.0
    }
    Vec2::new(snap(vel.x), snap(vel.y))
}

//! Fixed timestep simulation tick
//!
//! Advances one round by exactly one step. The tick never touches audio,
//! storage or timers; it reports what happened as [`GameEvent`]s and the
//! round controller reacts to them.

use super::collision::{Edge, hit_edge, overlap, quantize_half_step, resolve_collision};
use super::state::{Life, Over, SimulationState};
use crate::config::{GameConfig, InfectionOutcome, Variant};

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Nobody was alive; the round ended at this tick
    RoundLost { ticks: u64 },
    /// A body bounced off an arena edge
    WallBounce { id: String, edge: Edge },
    /// An alive body touched a non-alive one and caught the infection
    Infected { id: String, carrier: String },
    /// An infection ran its course; `rate` is the cue pitch multiplier
    InfectionResolved {
        id: String,
        outcome: InfectionOutcome,
        rate: f32,
    },
}

/// Advance the round by one fixed timestep
pub fn tick(state: &mut SimulationState, config: &GameConfig) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Frozen while a dialog is open
    if state.dialog {
        return events;
    }

    state.ticks += 1;

    match config.variant {
        Variant::Runner => events,
        Variant::Seeker => {
            step_seeker(state, config, &mut events);
            events
        }
    }
}

fn step_seeker(state: &mut SimulationState, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let ticks = state.ticks;

    if !state.is_over() && state.live_count() == 0 {
        state.over = Some(Over::Ticks(ticks));
        log::info!("Round over at tick {}", ticks);
        events.push(GameEvent::RoundLost { ticks });
        return;
    }

    for fob in &mut state.fobs {
        fob.pos += fob.vel;
    }

    if !state.is_over() {
        resolve_infections(state, config, events);
    }

    let excluded = bounce_off_walls(state, config, events);
    collide_pairs(state, config, excluded, events);
}

/// Finish infections whose delay has elapsed
fn resolve_infections(state: &mut SimulationState, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let ticks = state.ticks;
    let outcome = config.rules.infection_outcome;

    for i in 0..state.fobs.len() {
        let Life::Infected { since } = state.fobs[i].life else {
            continue;
        };
        if ticks.saturating_sub(since) * config.tick_ms < config.infection_ms {
            continue;
        }

        let fob = &mut state.fobs[i];
        fob.life = match outcome {
            InfectionOutcome::Recover => Life::Alive,
            InfectionOutcome::Perish => Life::Dead,
        };
        fob.shake = true;
        let id = fob.id.clone();

        // Higher pitch while part of the swarm is still down
        let rate = if state.live_count() < config.rules.swarm_count {
            4.0
        } else {
            1.0
        };
        events.push(GameEvent::InfectionResolved { id, outcome, rate });
    }
}

/// Reflect bodies off the arena edges; bounced bodies sit out pair collisions
fn bounce_off_walls(
    state: &mut SimulationState,
    config: &GameConfig,
    events: &mut Vec<GameEvent>,
) -> Vec<bool> {
    let space = state.space;
    let mut excluded = vec![false; state.fobs.len()];
    let mut special_bounced = false;

    for (i, fob) in state.fobs.iter_mut().enumerate() {
        if let Some(edge) = hit_edge(fob, space) {
            fob.vel = edge.reflect(fob.vel);
            excluded[i] = true;
            if fob.id == config.rules.special_id {
                special_bounced = true;
            }
            events.push(GameEvent::WallBounce {
                id: fob.id.clone(),
                edge,
            });
        }
        fob.clamp_into(space);
    }

    if special_bounced {
        state.bounced = true;
    }
    excluded
}

/// Resolve at most one body-body collision per body
fn collide_pairs(
    state: &mut SimulationState,
    config: &GameConfig,
    mut excluded: Vec<bool>,
    events: &mut Vec<GameEvent>,
) {
    let ticks = state.ticks;
    let special_id = config.rules.special_id.as_str();
    let fobs = &mut state.fobs;

    for i in 0..fobs.len() {
        if excluded[i] {
            continue;
        }
        for j in (i + 1)..fobs.len() {
            if excluded[j] || !overlap(&fobs[i], &fobs[j]) {
                continue;
            }

            if fobs[i].is_alive() != fobs[j].is_alive() {
                let (victim, carrier) = if fobs[i].is_alive() { (i, j) } else { (j, i) };
                fobs[victim].life = Life::Infected { since: ticks };
                fobs[i].shake = true;
                fobs[j].shake = true;
                events.push(GameEvent::Infected {
                    id: fobs[victim].id.clone(),
                    carrier: fobs[carrier].id.clone(),
                });
            }

            let (mut v1, mut v2) = resolve_collision(&fobs[i], &fobs[j]);
            if fobs[i].id == special_id {
                v1 = quantize_half_step(v1);
            }
            if fobs[j].id == special_id {
                v2 = quantize_half_step(v2);
            }
            fobs[i].vel = v1;
            fobs[j].vel = v2;

            excluded[i] = true;
            excluded[j] = true;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Fob, Space};
    use glam::Vec2;

    const ARENA: Space = Space::new(1700.0, 940.0);

    fn seeker_state(fobs: Vec<Fob>) -> SimulationState {
        let mut state = SimulationState::new(ARENA, 1.0);
        state.fobs = fobs;
        state
    }

    fn zet(x: f32, y: f32, vx: f32, vy: f32) -> Fob {
        Fob::new("zet", Vec2::new(x, y), 30.0, Vec2::new(vx, vy)).with_life(Life::Dead)
    }

    fn pet(n: usize, x: f32, y: f32, vx: f32, vy: f32) -> Fob {
        Fob::new(format!("pet-{}", n), Vec2::new(x, y), 20.0, Vec2::new(vx, vy))
    }

    fn bounces(events: &[GameEvent]) -> Vec<(String, u8)> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::WallBounce { id, edge } => Some((id.clone(), edge.code())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_special_approaches_left_wall() {
        let config = GameConfig::default();
        let mut state = seeker_state(vec![
            zet(100.0, 465.0, -2.0, 0.0),
            pet(1, 1000.0, 300.0, 0.0, 0.0),
        ]);

        let events = tick(&mut state, &config);
        assert_eq!(state.fobs[0].pos, Vec2::new(98.0, 465.0));
        assert!(bounces(&events).is_empty());

        let events = tick(&mut state, &config);
        assert_eq!(state.fobs[0].pos, Vec2::new(96.0, 465.0));
        assert!(bounces(&events).is_empty());

        let mut bounce = None;
        for _ in 0..100 {
            let events = tick(&mut state, &config);
            if let Some(b) = bounces(&events).into_iter().next() {
                bounce = Some(b);
                break;
            }
            assert_eq!(state.fobs[0].vel.x, -2.0);
        }

        assert_eq!(bounce, Some(("zet".to_string(), 4)));
        assert!(state.fobs[0].pos.x - state.fobs[0].radius <= 0.0);
        assert!(state.fobs[0].vel.x >= 0.0);
        assert!(state.bounced);

        // Moving away again: no second bounce
        let events = tick(&mut state, &config);
        assert!(bounces(&events).is_empty());
    }

    #[test]
    fn test_dead_touch_infects_and_exchanges() {
        let config = GameConfig::default();
        let mut dead = pet(1, 500.0, 400.0, 2.0, 1.0).with_life(Life::Dead);
        dead.id = "pet-9".to_string();
        let mut state = seeker_state(vec![dead, pet(2, 530.0, 400.0, -3.0, 1.0)]);
        state.ticks = 9;

        let events = tick(&mut state, &config);

        assert_eq!(state.ticks, 10);
        assert_eq!(state.fobs[1].life, Life::Infected { since: 10 });
        assert_eq!(state.fobs[0].life, Life::Dead);
        // Normal is the x axis: x components swapped, y kept
        assert_eq!(state.fobs[0].vel, Vec2::new(-3.0, 1.0));
        assert_eq!(state.fobs[1].vel, Vec2::new(2.0, 1.0));
        assert!(state.fobs[0].shake && state.fobs[1].shake);
        assert!(events.contains(&GameEvent::Infected {
            id: "pet-2".to_string(),
            carrier: "pet-9".to_string(),
        }));
    }

    #[test]
    fn test_alive_pair_keeps_life() {
        let config = GameConfig::default();
        let mut state = seeker_state(vec![
            zet(100.0, 100.0, 0.0, 0.0),
            pet(1, 500.0, 400.0, 1.0, 0.0),
            pet(2, 530.0, 400.0, -1.0, 0.0),
        ]);
        tick(&mut state, &config);
        assert!(state.fobs[1].is_alive() && state.fobs[2].is_alive());
        assert_eq!(state.fobs[1].vel, Vec2::new(-1.0, 0.0));
        assert_eq!(state.fobs[2].vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_special_velocity_quantized() {
        let config = GameConfig::default();
        // Oblique contact gives fractional components
        let mut state = seeker_state(vec![
            zet(500.0, 500.0, 0.0, 0.0),
            pet(1, 540.0, 520.0, -3.0, 0.0),
        ]);
        tick(&mut state, &config);
        let vel = state.fobs[0].vel;
        assert_eq!(vel * 2.0, (vel * 2.0).round());
        assert_ne!(vel, Vec2::ZERO);
    }

    #[test]
    fn test_one_collision_per_body() {
        let config = GameConfig::default();
        // pet-1 overlaps both neighbours; only the first pair resolves
        let mut state = seeker_state(vec![
            zet(100.0, 100.0, 0.0, 0.0),
            pet(1, 500.0, 400.0, 0.0, 0.0),
            pet(2, 470.0, 400.0, 1.0, 0.0),
            pet(3, 530.0, 400.0, -1.0, 0.0),
        ]);
        tick(&mut state, &config);
        assert_eq!(state.fobs[1].vel, Vec2::new(1.0, 0.0));
        assert_eq!(state.fobs[2].vel, Vec2::new(0.0, 0.0));
        // pet-3 found no free partner
        assert_eq!(state.fobs[3].vel, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_wall_bounce_blocks_infection() {
        let config = GameConfig::default();
        // The dead zet bounces off the left wall while touching pet-1
        let mut state = seeker_state(vec![
            zet(31.0, 400.0, -2.0, 0.0),
            pet(1, 70.0, 400.0, -1.0, 0.0),
        ]);
        let events = tick(&mut state, &config);
        assert_eq!(bounces(&events), vec![("zet".to_string(), 4)]);
        assert!(state.fobs[1].is_alive());
        assert_eq!(state.fobs[1].vel, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_no_live_bodies_ends_round_once() {
        let config = GameConfig::default();
        let mut state = seeker_state(vec![
            zet(500.0, 500.0, 1.0, 0.0),
            pet(1, 200.0, 200.0, 1.0, 0.0).with_life(Life::Infected { since: 1 }),
        ]);
        state.ticks = 5;

        let events = tick(&mut state, &config);
        assert_eq!(events, vec![GameEvent::RoundLost { ticks: 6 }]);
        assert_eq!(state.over, Some(Over::Ticks(6)));
        // Nothing moved on the terminal tick
        assert_eq!(state.fobs[0].pos, Vec2::new(500.0, 500.0));

        let events = tick(&mut state, &config);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::RoundLost { .. })));
        assert_eq!(state.over, Some(Over::Ticks(6)));
        assert_eq!(state.fobs[0].pos, Vec2::new(501.0, 500.0));
    }

    #[test]
    fn test_infection_recovers_after_delay() {
        let config = GameConfig::default();
        let delay_ticks = config.infection_ms / config.tick_ms;
        let mut state = seeker_state(vec![
            zet(100.0, 100.0, 0.0, 0.0),
            pet(1, 600.0, 400.0, 0.0, 0.0).with_life(Life::Infected { since: 1 }),
            pet(2, 900.0, 400.0, 0.0, 0.0),
        ]);
        state.ticks = 1;

        for _ in 1..delay_ticks {
            let events = tick(&mut state, &config);
            assert!(events.is_empty());
        }
        assert!(!state.fobs[1].is_alive());

        let events = tick(&mut state, &config);
        assert!(state.fobs[1].is_alive());
        assert!(state.fobs[1].shake);
        assert_eq!(
            events,
            vec![GameEvent::InfectionResolved {
                id: "pet-1".to_string(),
                outcome: InfectionOutcome::Recover,
                rate: 4.0,
            }]
        );
    }

    #[test]
    fn test_recovery_cue_rate_follows_swarm() {
        let mut config = GameConfig::default();
        config.rules.swarm_count = 3;
        let delay_ticks = config.infection_ms / config.tick_ms;
        let mut state = seeker_state(vec![
            zet(100.0, 100.0, 0.0, 0.0),
            pet(1, 600.0, 400.0, 0.0, 0.0).with_life(Life::Infected { since: 1 }),
            pet(2, 900.0, 400.0, 0.0, 0.0).with_life(Life::Infected { since: 2 }),
            pet(3, 1200.0, 400.0, 0.0, 0.0),
        ]);
        state.ticks = 1;

        for _ in 1..delay_ticks {
            assert!(tick(&mut state, &config).is_empty());
        }

        // pet-2 is still infected: high pitch
        let events = tick(&mut state, &config);
        assert_eq!(
            events,
            vec![GameEvent::InfectionResolved {
                id: "pet-1".to_string(),
                outcome: InfectionOutcome::Recover,
                rate: 4.0,
            }]
        );

        // Whole swarm alive again: normal pitch
        let events = tick(&mut state, &config);
        assert_eq!(
            events,
            vec![GameEvent::InfectionResolved {
                id: "pet-2".to_string(),
                outcome: InfectionOutcome::Recover,
                rate: 1.0,
            }]
        );
        assert_eq!(state.live_count(), 3);
    }

    #[test]
    fn test_infection_perish_rule() {
        let mut config = GameConfig::default();
        config.rules.infection_outcome = InfectionOutcome::Perish;
        let mut state = seeker_state(vec![
            zet(100.0, 100.0, 0.0, 0.0),
            pet(1, 600.0, 400.0, 0.0, 0.0).with_life(Life::Infected { since: 1 }),
            pet(2, 900.0, 400.0, 0.0, 0.0),
        ]);
        state.ticks = 1 + config.infection_ms / config.tick_ms - 1;
        tick(&mut state, &config);
        assert_eq!(state.fobs[1].life, Life::Dead);
    }

    #[test]
    fn test_no_recovery_after_round_over() {
        let config = GameConfig::default();
        let mut state = seeker_state(vec![
            zet(100.0, 100.0, 0.0, 0.0),
            pet(1, 600.0, 400.0, 0.0, 0.0).with_life(Life::Infected { since: 1 }),
        ]);
        state.over = Some(Over::Ticks(2));
        state.ticks = 10_000;
        tick(&mut state, &config);
        assert_eq!(state.fobs[1].life, Life::Infected { since: 1 });
    }

    #[test]
    fn test_dialog_freezes_tick() {
        let config = GameConfig::default();
        let mut state = seeker_state(vec![zet(100.0, 100.0, 3.0, 0.0)]);
        state.dialog = true;
        let events = tick(&mut state, &config);
        assert!(events.is_empty());
        assert_eq!(state.ticks, 0);
        assert_eq!(state.fobs[0].pos, Vec2::new(100.0, 100.0));
        assert!(state.over.is_none());
    }

    #[test]
    fn test_runner_only_counts() {
        let config = GameConfig::for_variant(Variant::Runner);
        let mut state = seeker_state(vec![
            Fob::new("hero", Vec2::new(100.0, 100.0), 30.0, Vec2::new(2.0, 0.0)),
            pet(1, 110.0, 100.0, 1.0, 0.0).with_life(Life::Dead),
        ]);
        for _ in 0..3 {
            assert!(tick(&mut state, &config).is_empty());
        }
        assert_eq!(state.ticks, 3);
        assert_eq!(state.fobs[0].pos, Vec2::new(100.0, 100.0));
        assert!(state.fobs[0].is_alive());
    }

    mod proptests {
        use super::*;
        use crate::sim::spawn::spawn_round;
        use proptest::prelude::*;
        use rand::SeedableRng;
        use rand_pcg::Pcg32;

        proptest! {
            #[test]
            fn bodies_stay_inside_arena(
                seed in 0u64..1000,
                width in 400.0f32..1700.0,
                height in 300.0f32..940.0,
                steps in 1usize..400,
            ) {
                let config = GameConfig::default();
                let space = Space::new(width, height);
                let scale = (width / 1700.0).min(1.0).min((height / 940.0).min(1.0));
                let mut rng = Pcg32::seed_from_u64(seed);
                let Ok(fobs) = spawn_round(
                    &mut rng,
                    Variant::Seeker,
                    &config.rules,
                    space,
                    scale,
                    config.max_spawn_attempts,
                ) else {
                    return Ok(());
                };
                let mut state = SimulationState::new(space, scale);
                state.fobs = fobs;
                // Give the seeker some speed too
                state.fobs[0].vel = Vec2::new(-3.0, 2.5);

                for _ in 0..steps {
                    tick(&mut state, &config);
                    for fob in &state.fobs {
                        prop_assert!(fob.pos.x >= fob.radius && fob.pos.x <= width - fob.radius);
                        prop_assert!(fob.pos.y >= fob.radius && fob.pos.y <= height - fob.radius);
                    }
                }
            }
        }
    }
}

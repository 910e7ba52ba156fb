//! Simulation Tick
//!
//! One logical update per frame, in a fixed order:
//!
//! 1. advance the simulated clock by `dt_ms`
//! 2. resolve intents (velocity, bomb placement)
//! 3. integrate movement against the terrain
//! 4. collect overlapped pickups
//! 5. run every scheduled task now due (fuses, respawns, reveals, cleanup)
//! 6. report each visible entity's animation key
//!
//! A detonation's whole chain resolves inside step 5, so observers see it
//! as a single atomic change.

use std::collections::BTreeMap;

use tracing::trace;

use crate::game::blast::{BlastReport, despawn_bomb, detonate, place_bomb};
use crate::game::entity::{EntityId, Updatable};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{InputFrame, PlayerInputBuffer};
use crate::game::movement::intent_velocity;
use crate::game::player::{hide_player, process_pickups, respawn_player, reveal_pickup};
use crate::game::state::SessionState;
use crate::game::timer::TimerTask;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Bombs placed this tick
    pub placed: Vec<EntityId>,
    /// Fuse-driven detonations resolved this tick, chains included
    pub blasts: Vec<BlastReport>,
    /// (pickup, player) pairs collected this tick
    pub pickups: Vec<(EntityId, EntityId)>,
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `state` - The session state (will be mutated)
/// * `inputs` - Player intents for this tick; players without an entry idle
/// * `dt_ms` - Simulated milliseconds since the previous tick
///
/// # Determinism
///
/// Entities are visited in id order, timers fire by deadline then
/// submission order, and all arithmetic is integer.
pub fn tick(state: &mut SessionState, inputs: &BTreeMap<EntityId, InputFrame>, dt_ms: u32) -> TickResult {
    let mut result = TickResult::default();

    // 1. Advance clock
    state.tick += 1;
    state.scheduler.advance(dt_ms);

    // 2. Apply intents
    apply_inputs(state, inputs, &mut result);

    // 3. Movement
    let grid = &state.grid;
    for entity in state.registry.iter_mut() {
        entity.update(grid, dt_ms);
    }

    // 4. Pickups
    result.pickups = process_pickups(state);

    // 5. Scheduled tasks
    run_due_timers(state, &mut result);

    // 6. Animation state
    emit_animation_keys(state);

    result.events = state.take_events();
    result
}

/// Set velocities and place bombs for every live player.
fn apply_inputs(state: &mut SessionState, inputs: &BTreeMap<EntityId, InputFrame>, result: &mut TickResult) {
    let speed = state.config.player_speed;

    for player_id in state.player_ids() {
        let frame = inputs.get(&player_id).copied().unwrap_or_default();

        let Some(player) = state.registry.player_mut(player_id) else {
            continue;
        };
        if player.dead {
            continue;
        }
        player.velocity = intent_velocity(frame, speed);

        if frame.place_bomb() {
            if let Some(bomb) = place_bomb(state, player_id) {
                result.placed.push(bomb);
            }
        }
    }
}

/// Dispatch every task whose deadline has passed.
fn run_due_timers(state: &mut SessionState, result: &mut TickResult) {
    while let Some(task) = state.scheduler.pop_due() {
        trace!(?task, now_ms = state.now_ms(), "timer fired");
        match task {
            TimerTask::Detonate(bomb) => {
                let report = detonate(state, bomb, None);
                if !report.is_empty() {
                    result.blasts.push(report);
                }
            }
            TimerTask::DespawnBomb(bomb) => {
                despawn_bomb(state, bomb);
            }
            TimerTask::HidePlayer(player, death) => {
                hide_player(state, player, death);
            }
            TimerTask::Respawn(player) => {
                respawn_player(state, player);
            }
            TimerTask::RevealPickup(pickup) => {
                reveal_pickup(state, pickup);
            }
            TimerTask::ExpireSegment(id) => {
                state.expire_segment(id);
            }
        }
    }
}

fn emit_animation_keys(state: &mut SessionState) {
    let keys: Vec<_> = state
        .registry
        .iter()
        .filter_map(|e| e.animation_key().map(|key| (e.id(), key)))
        .collect();

    for (entity, key) in keys {
        state.emit(GameEventData::AnimationKey { entity, key });
    }
}

/// Replay recorded intents from an initial state.
///
/// Buffers are indexed by the session tick at which each intent was
/// submitted, counting from zero.
pub fn replay_session(
    initial_state: SessionState,
    buffers: &[PlayerInputBuffer],
    tick_count: u32,
    dt_ms: u32,
) -> (SessionState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    for t in 0..tick_count {
        let tick_inputs: BTreeMap<EntityId, InputFrame> = buffers
            .iter()
            .map(|b| (b.player_id, b.get_input_at(t)))
            .collect();

        let result = tick(&mut state, &tick_inputs, dt_ms);
        all_events.extend(result.events);
    }

    (state, all_events)
}

//! Player Lifecycle & Pickups
//!
//! Alive -> Dead on blast contact; Dead -> Alive after `respawn_ms` at a
//! random corner spawn. The corpse stays visible for the death animation,
//! then a scheduled task hides it. Every transition is guarded by the
//! player's own flags, so stale or duplicate tasks do nothing.

use tracing::debug;

use crate::core::vec2::FixedVec2;
use crate::game::entity::{Collidable, EntityId};
use crate::game::events::GameEventData;
use crate::game::grid::TileKind;
use crate::game::movement::body_overlaps_cell;
use crate::game::state::SessionState;
use crate::game::timer::TimerTask;

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Kill a live player caught by `by_bomb`. Returns false if already dead.
pub fn kill_player(state: &mut SessionState, player_id: EntityId, by_bomb: EntityId) -> bool {
    let (cell, death) = match state.registry.player_mut(player_id) {
        Some(player) if !player.dead => {
            player.dead = true;
            player.velocity = FixedVec2::ZERO;
            player.deaths += 1;
            (player.cell(), player.deaths)
        }
        _ => return false,
    };

    // Credit the bomb's owner, unless it was their own bomb
    let owner = state.registry.bomb(by_bomb).map(|b| b.owner);
    if let Some(owner) = owner.filter(|o| *o != player_id) {
        if let Some(killer) = state.registry.player_mut(owner) {
            killer.kills += 1;
        }
    }

    state.scheduler.after(state.config.death_animation_ms, TimerTask::HidePlayer(player_id, death));
    state.scheduler.after(state.config.respawn_ms, TimerTask::Respawn(player_id));
    state.emit(GameEventData::PlayerKilled {
        player: player_id,
        cell,
        by_bomb,
    });
    debug!(player = player_id.0, bomb = by_bomb.0, col = cell.col, row = cell.row, "player killed");

    true
}

/// Hide a dead player once the death animation has played.
///
/// `death` is the player's death count when the task was scheduled; a task
/// left over from an earlier death does nothing.
pub fn hide_player(state: &mut SessionState, player_id: EntityId, death: u32) -> bool {
    match state.registry.player_mut(player_id) {
        Some(player) if player.dead && player.visible && player.deaths == death => player.visible = false,
        _ => return false,
    }
    state.emit(GameEventData::EntityHidden { entity: player_id });
    true
}

/// Bring a dead player back at a random corner spawn.
pub fn respawn_player(state: &mut SessionState, player_id: EntityId) -> bool {
    if !state.registry.player(player_id).is_some_and(|p| p.dead) {
        return false;
    }

    let spawns = state.grid.spawn_points();
    let Some(spawn) = state.rng.choose(&spawns).copied() else {
        return false;
    };

    let keep = state.config.keep_upgrades_on_respawn;
    let (base_power, base_bombs) = (state.config.base_power, state.config.base_bombs);
    if let Some(player) = state.registry.player_mut(player_id) {
        player.dead = false;
        player.visible = true;
        player.position = spawn.center();
        player.velocity = FixedVec2::ZERO;
        if !keep {
            player.power = base_power;
            player.bomb_capacity = base_bombs;
        }
    }

    state.emit(GameEventData::PlayerRespawned {
        player: player_id,
        cell: spawn,
    });
    debug!(player = player_id.0, col = spawn.col, row = spawn.row, "player respawned");
    true
}

// =============================================================================
// PICKUPS
// =============================================================================

/// Collect every visible pickup a live player's body overlaps.
///
/// Players are checked in id order, so when both overlap the same pickup
/// on the same tick the lower id takes it.
pub fn process_pickups(state: &mut SessionState) -> Vec<(EntityId, EntityId)> {
    let mut hits = Vec::new();
    for player in state.registry.players().filter(|p| !p.dead) {
        for pickup in state.registry.pickups().filter(|u| !u.hidden) {
            if body_overlaps_cell(player.position, pickup.cell) {
                hits.push((pickup.id, player.id));
            }
        }
    }

    hits.into_iter()
        .filter(|(pickup, player)| collect_pickup(state, *pickup, *player))
        .collect()
}

/// Apply a pickup to a player and hide it until it regenerates.
///
/// A pickup is consumed even when the stat it raises is already capped.
pub fn collect_pickup(state: &mut SessionState, pickup_id: EntityId, player_id: EntityId) -> bool {
    if !state.registry.player(player_id).is_some_and(|p| !p.dead) {
        return false;
    }

    let delay_ms = state.config.pickup_respawn_ms;
    let reveal_at_ms = state.now_ms() + delay_ms as u64;
    let (cell, kind) = match state.registry.pickup_mut(pickup_id) {
        Some(pickup) if !pickup.hidden => {
            pickup.hidden = true;
            pickup.reveal_at_ms = Some(reveal_at_ms);
            (pickup.cell, pickup.kind)
        }
        _ => return false,
    };

    let (max_power, max_bombs) = (state.config.max_power, state.config.max_bombs);
    if let Some(player) = state.registry.player_mut(player_id) {
        match kind {
            TileKind::PickupPower => player.power = player.power.saturating_add(1).min(max_power),
            TileKind::PickupBomb => player.bomb_capacity = player.bomb_capacity.saturating_add(1).min(max_bombs),
            _ => {}
        }
    }

    state.grid.set_kind(cell, TileKind::Free);
    state.scheduler.after(delay_ms, TimerTask::RevealPickup(pickup_id));
    state.emit(GameEventData::PickupCollected {
        pickup: pickup_id,
        player: player_id,
        kind,
    });
    debug!(pickup = pickup_id.0, player = player_id.0, ?kind, "pickup collected");
    true
}

/// Restore a hidden pickup's tile. No-op when already visible.
pub fn reveal_pickup(state: &mut SessionState, pickup_id: EntityId) -> bool {
    let (cell, kind) = match state.registry.pickup_mut(pickup_id) {
        Some(pickup) if pickup.hidden => {
            pickup.hidden = false;
            pickup.reveal_at_ms = None;
            (pickup.cell, pickup.kind)
        }
        _ => return false,
    };

    state.grid.set_kind(cell, kind);
    state.emit(GameEventData::PickupRevealed { pickup: pickup_id, kind });
    true
}

// =============================================================================
// TESTS
// =============================================================================

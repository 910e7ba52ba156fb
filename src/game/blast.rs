//! Bomb & Blast Engine
//!
//! Placement, fuse expiry and explosion resolution. A blast walks outward
//! from its bomb in the four cardinal directions, one cell at a time, and
//! stops at the first Wall or Brick. Cells it reaches kill live players and
//! force-detonate live bombs; the chain recurses depth-first and finishes
//! before `detonate` returns. A bomb is marked exploded before its own walk
//! starts, so a chain never revisits it.

use std::collections::BTreeSet;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::entity::{Bomb, Collidable, EntityId, EntityKind};
use crate::game::events::{AnimationKey, GameEventData};
use crate::game::grid::{Cell, Direction, TileKind};
use crate::game::player::kill_player;
use crate::game::state::SessionState;
use crate::game::timer::TimerTask;

// =============================================================================
// MARKERS
// =============================================================================

/// What a transient blast marker shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SegmentKind {
    /// Bomb's own cell
    Emitter = 0,
    /// Blast passing through
    Wave = 1,
    /// Blast at full range
    Edge = 2,
    /// Brick breaking apart
    Debris = 3,
}

impl SegmentKind {
    pub fn animation_key(self) -> AnimationKey {
        match self {
            SegmentKind::Emitter => AnimationKey::BlastEmitter,
            SegmentKind::Wave => AnimationKey::BlastWave,
            SegmentKind::Edge => AnimationKey::BlastEdge,
            SegmentKind::Debris => AnimationKey::BrickDestroy,
        }
    }
}

/// Transient visual marker. Not part of the simulated outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastSegment {
    pub id: u32,
    pub cell: Cell,
    /// Walk direction; None for emitter and debris
    pub direction: Option<Direction>,
    pub kind: SegmentKind,
    pub expires_at_ms: u64,
}

// =============================================================================
// REPORT
// =============================================================================

/// Everything one `detonate` call resolved, chain included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlastReport {
    /// Bombs exploded, in resolution order
    pub detonated: Vec<EntityId>,
    /// Cells any blast in the chain reached
    pub cells: BTreeSet<Cell>,
    /// Players killed
    pub kills: Vec<EntityId>,
    /// Bricks reverted to Free
    pub bricks: Vec<Cell>,
}

impl BlastReport {
    /// Did the call do anything?
    pub fn is_empty(&self) -> bool {
        self.detonated.is_empty()
    }
}

// =============================================================================
// PLACEMENT
// =============================================================================

/// Arm a bomb under `player_id`.
///
/// Returns None when the player is dead or unknown, already has
/// `bomb_capacity` armed bombs, or the cell already holds a live bomb.
pub fn place_bomb(state: &mut SessionState, player_id: EntityId) -> Option<EntityId> {
    let player = state.registry.player(player_id)?;
    if player.dead {
        return None;
    }

    let armed = player
        .bombs
        .iter()
        .filter(|id| state.registry.bomb(**id).is_some_and(|b| !b.exploded))
        .count();
    if armed >= player.bomb_capacity as usize {
        return None;
    }

    let cell = player.cell();
    let power = player.power;
    if !state.registry.query_at(cell, EntityKind::Bomb).is_empty() {
        return None;
    }

    let fuse_ms = state.config.fuse_ms;
    let detonates_at_ms = state.now_ms() + fuse_ms as u64;
    let bomb_id = state.registry.register(Bomb::new(player_id, cell, power, detonates_at_ms));
    if let Some(player) = state.registry.player_mut(player_id) {
        player.bombs.push(bomb_id);
    }
    state.scheduler.after(fuse_ms, TimerTask::Detonate(bomb_id));

    state.emit(GameEventData::EntitySpawned {
        entity: bomb_id,
        kind: EntityKind::Bomb,
        cell,
    });
    state.emit(GameEventData::BombPlaced {
        bomb: bomb_id,
        owner: player_id,
        cell,
        power,
    });
    debug!(bomb = bomb_id.0, owner = player_id.0, col = cell.col, row = cell.row, power, "bomb placed");

    Some(bomb_id)
}

// =============================================================================
// DETONATION
// =============================================================================

/// Explode `bomb_id` and everything its blast chains into.
///
/// Unknown or already exploded bombs yield an empty report.
pub fn detonate(state: &mut SessionState, bomb_id: EntityId, triggered_by: Option<EntityId>) -> BlastReport {
    let mut report = BlastReport::default();
    resolve(state, bomb_id, triggered_by, &mut report);
    report
}

fn resolve(
    state: &mut SessionState,
    bomb_id: EntityId,
    triggered_by: Option<EntityId>,
    report: &mut BlastReport,
) {
    let (cell, power) = match state.registry.bomb_mut(bomb_id) {
        Some(bomb) if !bomb.exploded => {
            bomb.exploded = true;
            (bomb.cell, bomb.power)
        }
        _ => return,
    };

    report.detonated.push(bomb_id);
    state.emit(GameEventData::BombDetonated {
        bomb: bomb_id,
        cell,
        power,
        triggered_by,
    });
    match triggered_by {
        Some(by) => debug!(bomb = bomb_id.0, by = by.0, col = cell.col, row = cell.row, "chain detonation"),
        None => debug!(bomb = bomb_id.0, col = cell.col, row = cell.row, power, "bomb detonated"),
    }

    let display_ms = state.config.blast_display_ms;
    state.scheduler.after(display_ms, TimerTask::DespawnBomb(bomb_id));
    state.spawn_segment(cell, None, SegmentKind::Emitter, display_ms);
    if power == 0 {
        // The origin is the last cell a zero-power blast reaches
        state.spawn_segment(cell, None, SegmentKind::Edge, display_ms);
    }
    apply_effects(state, cell, bomb_id, report);

    let mut candidates = Vec::new();
    for direction in Direction::ALL {
        for range in 1..=power as i32 {
            let target = cell.step(direction, range);
            let kind = state.grid.classify(target);
            if kind.is_solid() {
                if kind == TileKind::Brick {
                    candidates.push(target);
                }
                break;
            }

            apply_effects(state, target, bomb_id, report);
            let marker = if range == power as i32 {
                SegmentKind::Edge
            } else {
                SegmentKind::Wave
            };
            state.spawn_segment(target, Some(direction), marker, display_ms);
        }
    }

    let debris_ms = state.config.brick_debris_ms;
    for target in candidates {
        // A brick another blast in the chain already cleared stays cleared
        if !state.grid.destroy(target) {
            continue;
        }
        report.bricks.push(target);
        state.emit(GameEventData::BrickDestroyed { cell: target });
        state.spawn_segment(target, None, SegmentKind::Debris, debris_ms);
    }
}

/// Kill players and chain bombs standing in `cell`.
fn apply_effects(state: &mut SessionState, cell: Cell, bomb_id: EntityId, report: &mut BlastReport) {
    report.cells.insert(cell);

    for player_id in state.registry.query_at(cell, EntityKind::Player) {
        if kill_player(state, player_id, bomb_id) {
            report.kills.push(player_id);
        }
    }

    for other in state.registry.query_at(cell, EntityKind::Bomb) {
        resolve(state, other, Some(bomb_id), report);
    }
}

/// Drop a spent bomb from the registry and its owner's list.
pub fn despawn_bomb(state: &mut SessionState, bomb_id: EntityId) -> bool {
    let owner = match state.registry.bomb(bomb_id) {
        Some(bomb) if bomb.exploded => bomb.owner,
        _ => return false,
    };

    state.registry.unregister(bomb_id);
    if let Some(player) = state.registry.player_mut(owner) {
        player.bombs.retain(|id| *id != bomb_id);
    }
    state.emit(GameEventData::EntityDespawned { entity: bomb_id });
    true
}

// =============================================================================
// TESTS
// =============================================================================

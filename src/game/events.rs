//! View Events
//!
//! Discrete events the core emits for a presentation layer. The
//! simulation never waits on them; anything that must happen after an
//! animation is a scheduled task instead.

use serde::{Serialize, Deserialize};

use crate::game::blast::BlastSegment;
use crate::game::entity::{EntityId, EntityKind, Team};
use crate::game::grid::{Cell, TileKind};

/// Animation a visible entity should currently be playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationKey {
    PlayerIdle,
    PlayerLeft,
    PlayerRight,
    PlayerUp,
    PlayerDown,
    PlayerDeath,
    BombFuse,
    BlastEmitter,
    BlastWave,
    BlastEdge,
    BrickDestroy,
}

impl AnimationKey {
    /// Presentation key string. Player keys carry the team suffix.
    pub fn name(self, team: Option<Team>) -> String {
        let base = match self {
            AnimationKey::PlayerIdle => "player-idle",
            AnimationKey::PlayerLeft => "player-left",
            AnimationKey::PlayerRight => "player-right",
            AnimationKey::PlayerUp => "player-up",
            AnimationKey::PlayerDown => "player-down",
            AnimationKey::PlayerDeath => "player-death",
            AnimationKey::BombFuse => return "bomb".to_string(),
            AnimationKey::BlastEmitter => return "blast-emitter".to_string(),
            AnimationKey::BlastWave => return "blast-wave".to_string(),
            AnimationKey::BlastEdge => return "blast-edge".to_string(),
            AnimationKey::BrickDestroy => return "brick-destroy".to_string(),
        };
        match team {
            Some(team) => format!("{}-{}", base, team.name()),
            None => base.to_string(),
        }
    }
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Entity entered the registry
    EntitySpawned {
        entity: EntityId,
        kind: EntityKind,
        cell: Cell,
    },

    /// Entity left the registry
    EntityDespawned { entity: EntityId },

    /// Dead player's death animation finished
    EntityHidden { entity: EntityId },

    /// Per-tick animation state of a visible entity
    AnimationKey { entity: EntityId, key: AnimationKey },

    /// Player armed a bomb
    BombPlaced {
        bomb: EntityId,
        owner: EntityId,
        cell: Cell,
        power: u8,
    },

    /// Bomb exploded; `triggered_by` is the bomb whose blast caught it
    BombDetonated {
        bomb: EntityId,
        cell: Cell,
        power: u8,
        triggered_by: Option<EntityId>,
    },

    /// Player caught in a blast
    PlayerKilled {
        player: EntityId,
        cell: Cell,
        by_bomb: EntityId,
    },

    /// Player back at a spawn point
    PlayerRespawned { player: EntityId, cell: Cell },

    /// Brick reverted to Free
    BrickDestroyed { cell: Cell },

    /// Transient blast marker appeared
    BlastSegmentSpawned { segment: BlastSegment },

    /// Transient blast marker expired
    BlastSegmentExpired { id: u32 },

    /// Pickup consumed
    PickupCollected {
        pickup: EntityId,
        player: EntityId,
        kind: TileKind,
    },

    /// Hidden pickup reappeared
    PickupRevealed { pickup: EntityId, kind: TileKind },
}

/// A game event stamped with the tick and clock it happened at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Session clock when event occurred
    pub time_ms: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    pub fn new(tick: u32, time_ms: u64, data: GameEventData) -> Self {
        Self { tick, time_ms, data }
    }

    /// Entity the event is about, if any.
    pub fn subject(&self) -> Option<EntityId> {
        match &self.data {
            GameEventData::EntitySpawned { entity, .. }
            | GameEventData::EntityDespawned { entity }
            | GameEventData::EntityHidden { entity }
            | GameEventData::AnimationKey { entity, .. } => Some(*entity),
            GameEventData::BombPlaced { bomb, .. } | GameEventData::BombDetonated { bomb, .. } => {
                Some(*bomb)
            }
            GameEventData::PlayerKilled { player, .. }
            | GameEventData::PlayerRespawned { player, .. } => Some(*player),
            GameEventData::PickupCollected { pickup, .. }
            | GameEventData::PickupRevealed { pickup, .. } => Some(*pickup),
            GameEventData::BrickDestroyed { .. }
            | GameEventData::BlastSegmentSpawned { .. }
            | GameEventData::BlastSegmentExpired { .. } => None,
        }
    }

    /// Is this a per-tick animation event?
    pub fn is_animation(&self) -> bool {
        matches!(self.data, GameEventData::AnimationKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_key_names() {
        assert_eq!(AnimationKey::PlayerLeft.name(Some(Team::Blue)), "player-left-blue");
        assert_eq!(AnimationKey::PlayerDeath.name(Some(Team::Red)), "player-death-red");
        assert_eq!(AnimationKey::BlastEdge.name(None), "blast-edge");
        // Team only decorates player keys
        assert_eq!(AnimationKey::BombFuse.name(Some(Team::Red)), "bomb");
        assert_eq!(AnimationKey::BrickDestroy.name(None), "brick-destroy");
    }

    #[test]
    fn test_event_subject() {
        let killed = GameEvent::new(
            3,
            50,
            GameEventData::PlayerKilled {
                player: EntityId(0),
                cell: Cell::new(1, 1),
                by_bomb: EntityId(4),
            },
        );
        assert_eq!(killed.subject(), Some(EntityId(0)));
        assert!(!killed.is_animation());

        let brick = GameEvent::new(3, 50, GameEventData::BrickDestroyed { cell: Cell::new(2, 1) });
        assert_eq!(brick.subject(), None);
    }

    #[test]
    fn test_event_serializes() {
        let event = GameEvent::new(
            1,
            16,
            GameEventData::AnimationKey {
                entity: EntityId(2),
                key: AnimationKey::BombFuse,
            },
        );
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("BombFuse"));
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}

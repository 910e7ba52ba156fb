//! Session State
//!
//! Everything one arena session owns: terrain, entities, the simulated
//! clock with its pending tasks, the RNG, transient blast markers and the
//! buffer of events not yet handed to the presentation layer. Subsystems
//! receive it by `&mut` reference; there is no shared global state.

use std::collections::BTreeMap;

use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::game::blast::{BlastSegment, SegmentKind};
use crate::game::config::SessionConfig;
use crate::game::entity::{Entity, EntityId, EntityKind, Player, PowerUp, Team};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::grid::{Cell, Direction, TileMap};
use crate::game::registry::EntityRegistry;
use crate::game::timer::{Scheduler, TimerTask};

/// Complete state of one arena session.
#[derive(Clone, Debug)]
pub struct SessionState {
    /// Current tick number
    pub tick: u32,

    /// RNG seed the session started from
    pub rng_seed: u64,

    /// Deterministic RNG (respawn placement)
    pub rng: DeterministicRng,

    /// Tunables
    pub config: SessionConfig,

    /// Terrain, border included
    pub grid: TileMap,

    /// Players, bombs and pickups
    pub registry: EntityRegistry,

    /// Simulated clock and deferred tasks
    pub scheduler: Scheduler,

    /// Blast markers currently on display
    pub segments: BTreeMap<u32, BlastSegment>,

    next_segment_id: u32,

    /// Events generated since the last `take_events`
    pending_events: Vec<GameEvent>,
}

impl SessionState {
    /// Create a session on `grid`. Pickup tiles become PowerUp entities.
    pub fn new(grid: TileMap, config: SessionConfig, rng_seed: u64) -> Self {
        let mut state = Self {
            tick: 0,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            config,
            grid,
            registry: EntityRegistry::new(),
            scheduler: Scheduler::new(),
            segments: BTreeMap::new(),
            next_segment_id: 0,
            pending_events: Vec::new(),
        };

        for (cell, kind) in state.grid.pickup_cells() {
            let id = state.registry.register(PowerUp::new(cell, kind));
            state.emit(GameEventData::EntitySpawned {
                entity: id,
                kind: EntityKind::PowerUp,
                cell,
            });
        }

        state
    }

    /// Two-player session: Blue top-left, Red bottom-right.
    pub fn two_player(grid: TileMap, config: SessionConfig, rng_seed: u64) -> (Self, [EntityId; 2]) {
        let mut state = Self::new(grid, config, rng_seed);
        let blue = state.add_player(Team::Blue, 0);
        let red = state.add_player(Team::Red, 2);
        (state, [blue, red])
    }

    /// Add a player at one of the four corner spawns (index taken mod 4).
    pub fn add_player(&mut self, team: Team, spawn_index: usize) -> EntityId {
        let spawn = self.grid.spawn_points()[spawn_index % 4];
        let player = Player::new(team, spawn, self.config.base_power, self.config.base_bombs);
        let id = self.registry.register(player);
        self.emit(GameEventData::EntitySpawned {
            entity: id,
            kind: EntityKind::Player,
            cell: spawn,
        });
        id
    }

    /// Current simulated time.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Stamp `data` with the current tick and clock and buffer it.
    pub fn emit(&mut self, data: GameEventData) {
        let event = GameEvent::new(self.tick, self.now_ms(), data);
        self.push_event(event);
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Show a blast marker and schedule its removal.
    pub fn spawn_segment(
        &mut self,
        cell: Cell,
        direction: Option<Direction>,
        kind: SegmentKind,
        lifetime_ms: u32,
    ) -> u32 {
        let id = self.next_segment_id;
        self.next_segment_id += 1;

        let segment = BlastSegment {
            id,
            cell,
            direction,
            kind,
            expires_at_ms: self.now_ms() + lifetime_ms as u64,
        };
        self.segments.insert(id, segment);
        self.scheduler.after(lifetime_ms, TimerTask::ExpireSegment(id));
        self.emit(GameEventData::BlastSegmentSpawned { segment });
        id
    }

    /// Remove an expired marker. Unknown ids are ignored.
    pub fn expire_segment(&mut self, id: u32) -> bool {
        if self.segments.remove(&id).is_none() {
            return false;
        }
        self.emit(GameEventData::BlastSegmentExpired { id });
        true
    }

    /// Ids of every player, in creation order.
    pub fn player_ids(&self) -> Vec<EntityId> {
        self.registry.ids_of(EntityKind::Player)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.now_ms(), self.rng_seed, |hasher| {
            // Terrain, row-major
            for (_, kind) in self.grid.cells() {
                hasher.update_u8(kind as u8);
            }

            // Entities in id order (BTreeMap guarantees this)
            for entity in self.registry.iter() {
                hash_entity(entity, hasher);
            }

            for segment in self.segments.values() {
                hasher.update_u32(segment.id);
                hash_cell(segment.cell, hasher);
                hasher.update_u8(segment.kind as u8);
                hasher.update_u64(segment.expires_at_ms);
            }

            hasher.update_u32(self.scheduler.len() as u32);
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }
}

fn hash_cell(cell: Cell, hasher: &mut StateHasher) {
    hasher.update_i32(cell.col);
    hasher.update_i32(cell.row);
}

fn hash_entity(entity: &Entity, hasher: &mut StateHasher) {
    hasher.update_u32(entity.id().0);
    match entity {
        Entity::Player(p) => {
            hasher.update_u8(0);
            hasher.update_u8(p.team as u8);
            hasher.update_vec2(p.position);
            hasher.update_vec2(p.velocity);
            hasher.update_bool(p.dead);
            hasher.update_bool(p.visible);
            hasher.update_u8(p.power);
            hasher.update_u8(p.bomb_capacity);
            hasher.update_u32(p.bombs.len() as u32);
            for bomb in &p.bombs {
                hasher.update_u32(bomb.0);
            }
            hasher.update_u32(p.kills);
            hasher.update_u32(p.deaths);
        }
        Entity::Bomb(b) => {
            hasher.update_u8(1);
            hasher.update_u32(b.owner.0);
            hash_cell(b.cell, hasher);
            hasher.update_u8(b.power);
            hasher.update_u64(b.detonates_at_ms);
            hasher.update_bool(b.exploded);
        }
        Entity::PowerUp(u) => {
            hasher.update_u8(2);
            hash_cell(u.cell, hasher);
            hasher.update_u8(u.kind as u8);
            hasher.update_bool(u.hidden);
            hasher.update_u64(u.reveal_at_ms.unwrap_or(0));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::TileIndexMap;
    use crate::game::grid::TileKind;

    fn grid(csv: &str) -> TileMap {
        TileMap::from_csv(csv, &TileIndexMap::default()).unwrap()
    }

    #[test]
    fn test_pickups_registered_from_map() {
        let mut state = SessionState::new(grid("0,8,0\n0,0,9\n"), SessionConfig::default(), 1);
        let pickups: Vec<_> = state.registry.pickups().map(|u| (u.cell, u.kind)).collect();
        assert_eq!(
            pickups,
            vec![
                (Cell::new(2, 1), TileKind::PickupBomb),
                (Cell::new(3, 2), TileKind::PickupPower),
            ]
        );
        let spawned = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e.data, GameEventData::EntitySpawned { kind: EntityKind::PowerUp, .. }))
            .count();
        assert_eq!(spawned, 2);
    }

    #[test]
    fn test_two_player_bootstrap() {
        let (state, [blue, red]) =
            SessionState::two_player(grid("0,0,0\n0,0,0\n"), SessionConfig::default(), 7);

        let blue = state.registry.player(blue).unwrap();
        let red = state.registry.player(red).unwrap();
        assert_eq!(blue.team, Team::Blue);
        assert_eq!(blue.position, Cell::new(1, 1).center());
        assert_eq!(red.position, Cell::new(3, 2).center());
        assert_eq!((blue.power, blue.bomb_capacity), (1, 1));
    }

    #[test]
    fn test_segment_expiry_is_scheduled() {
        let mut state = SessionState::new(grid("0\n"), SessionConfig::default(), 1);
        let id = state.spawn_segment(Cell::new(1, 1), None, SegmentKind::Emitter, 334);
        assert_eq!(state.scheduler.pending(), vec![(334, TimerTask::ExpireSegment(id))]);

        assert!(state.expire_segment(id));
        assert!(!state.expire_segment(id), "second expiry is a no-op");
        assert!(state.segments.is_empty());
    }

    #[test]
    fn test_hash_tracks_state() {
        let make = || SessionState::two_player(grid("0,2\n0,0\n"), SessionConfig::default(), 3).0;
        let a = make();
        let mut b = make();
        assert_eq!(a.compute_hash(), b.compute_hash());

        b.grid.destroy(Cell::new(2, 1));
        assert_ne!(a.compute_hash(), b.compute_hash());
    }
}

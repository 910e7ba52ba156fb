//! Arena Entities
//!
//! Players, bombs and pickups as one tagged `Entity` type. Subsystems see
//! them through two small capabilities: `Collidable` (where is it, is it
//! live) and `Updatable` (per-tick integration and animation state).

use serde::{Serialize, Deserialize};

use crate::core::vec2::FixedVec2;
use crate::game::events::AnimationKey;
use crate::game::grid::{Cell, Direction, TileKind, TileMap};
use crate::game::movement::{heading, step_body};

// =============================================================================
// IDS & TAGS
// =============================================================================

/// Registry-assigned entity identifier. Monotonic, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Entity tag, used as a query filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Bomb,
    PowerUp,
}

/// Player side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub fn name(self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Red => "red",
        }
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Something that occupies a grid cell.
pub trait Collidable {
    /// Continuous position in pixels.
    fn position(&self) -> FixedVec2;

    /// Dead, exploded or hidden entities are invisible to cell queries.
    fn is_dead(&self) -> bool;

    /// Grid-aligned cell (floor of position / tile size).
    fn cell(&self) -> Cell {
        Cell::containing(self.position())
    }
}

/// Something the tick driver advances every frame.
pub trait Updatable {
    /// Integrate one frame of `dt_ms` against the terrain.
    fn update(&mut self, grid: &TileMap, dt_ms: u32);

    /// Animation the presentation layer should be showing, if visible.
    fn animation_key(&self) -> Option<AnimationKey>;
}

// =============================================================================
// PLAYER
// =============================================================================

/// A controllable bomber.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub team: Team,
    pub position: FixedVec2,
    /// Single-axis velocity in px/sec
    pub velocity: FixedVec2,
    /// Dead covers both the death animation and the respawn wait
    pub dead: bool,
    /// Cleared once the death animation finishes
    pub visible: bool,
    /// Blast radius of bombs this player places
    pub power: u8,
    /// Maximum simultaneously armed bombs
    pub bomb_capacity: u8,
    /// Bombs placed by this player that are still in the registry
    pub bombs: Vec<EntityId>,
    pub kills: u32,
    pub deaths: u32,
}

impl Player {
    /// Create a live player standing on the center of `spawn`.
    pub fn new(team: Team, spawn: Cell, power: u8, bomb_capacity: u8) -> Self {
        Self {
            id: EntityId::default(),
            team,
            position: spawn.center(),
            velocity: FixedVec2::ZERO,
            dead: false,
            visible: true,
            power,
            bomb_capacity,
            bombs: Vec::new(),
            kills: 0,
            deaths: 0,
        }
    }
}

impl Collidable for Player {
    fn position(&self) -> FixedVec2 {
        self.position
    }

    fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Updatable for Player {
    fn update(&mut self, grid: &TileMap, dt_ms: u32) {
        if self.dead {
            return;
        }
        self.position = step_body(self.position, self.velocity, dt_ms, grid);
    }

    fn animation_key(&self) -> Option<AnimationKey> {
        if !self.visible {
            return None;
        }
        if self.dead {
            return Some(AnimationKey::PlayerDeath);
        }
        let key = match heading(self.velocity) {
            Some(Direction::Left) => AnimationKey::PlayerLeft,
            Some(Direction::Right) => AnimationKey::PlayerRight,
            Some(Direction::Up) => AnimationKey::PlayerUp,
            Some(Direction::Down) => AnimationKey::PlayerDown,
            None => AnimationKey::PlayerIdle,
        };
        Some(key)
    }
}

// =============================================================================
// BOMB
// =============================================================================

/// An armed or spent bomb.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bomb {
    pub id: EntityId,
    pub owner: EntityId,
    pub cell: Cell,
    pub power: u8,
    /// Session clock value at which the fuse expires
    pub detonates_at_ms: u64,
    /// Armed -> Exploded happens exactly once
    pub exploded: bool,
}

impl Bomb {
    pub fn new(owner: EntityId, cell: Cell, power: u8, detonates_at_ms: u64) -> Self {
        Self {
            id: EntityId::default(),
            owner,
            cell,
            power,
            detonates_at_ms,
            exploded: false,
        }
    }

    /// Fuse time left at `now_ms`; zero once expired or exploded.
    pub fn countdown_ms(&self, now_ms: u64) -> u64 {
        if self.exploded {
            0
        } else {
            self.detonates_at_ms.saturating_sub(now_ms)
        }
    }
}

impl Collidable for Bomb {
    fn position(&self) -> FixedVec2 {
        self.cell.center()
    }

    fn is_dead(&self) -> bool {
        self.exploded
    }

    fn cell(&self) -> Cell {
        self.cell
    }
}

impl Updatable for Bomb {
    // Bombs never move; the fuse is a scheduled task.
    fn update(&mut self, _grid: &TileMap, _dt_ms: u32) {}

    fn animation_key(&self) -> Option<AnimationKey> {
        (!self.exploded).then_some(AnimationKey::BombFuse)
    }
}

// =============================================================================
// POWER-UP
// =============================================================================

/// A pickup bound to one map tile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub cell: Cell,
    /// Tile kind restored on reappearance
    pub kind: TileKind,
    pub hidden: bool,
    /// Session clock value at which a hidden pickup reappears
    pub reveal_at_ms: Option<u64>,
}

impl PowerUp {
    pub fn new(cell: Cell, kind: TileKind) -> Self {
        Self {
            id: EntityId::default(),
            cell,
            kind,
            hidden: false,
            reveal_at_ms: None,
        }
    }
}

impl Collidable for PowerUp {
    fn position(&self) -> FixedVec2 {
        self.cell.center()
    }

    fn is_dead(&self) -> bool {
        self.hidden
    }

    fn cell(&self) -> Cell {
        self.cell
    }
}

impl Updatable for PowerUp {
    fn update(&mut self, _grid: &TileMap, _dt_ms: u32) {}

    // Drawn by the tile layer, not as a sprite
    fn animation_key(&self) -> Option<AnimationKey> {
        None
    }
}

// =============================================================================
// TAGGED ENTITY
// =============================================================================

/// Any registry-owned entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Entity {
    Player(Player),
    Bomb(Bomb),
    PowerUp(PowerUp),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Player(p) => p.id,
            Entity::Bomb(b) => b.id,
            Entity::PowerUp(u) => u.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        match self {
            Entity::Player(p) => p.id = id,
            Entity::Bomb(b) => b.id = id,
            Entity::PowerUp(u) => u.id = id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Player(_) => EntityKind::Player,
            Entity::Bomb(_) => EntityKind::Bomb,
            Entity::PowerUp(_) => EntityKind::PowerUp,
        }
    }

    fn as_collidable(&self) -> &dyn Collidable {
        match self {
            Entity::Player(p) => p,
            Entity::Bomb(b) => b,
            Entity::PowerUp(u) => u,
        }
    }

    fn as_updatable(&mut self) -> &mut dyn Updatable {
        match self {
            Entity::Player(p) => p,
            Entity::Bomb(b) => b,
            Entity::PowerUp(u) => u,
        }
    }
}

impl Collidable for Entity {
    fn position(&self) -> FixedVec2 {
        self.as_collidable().position()
    }

    fn is_dead(&self) -> bool {
        self.as_collidable().is_dead()
    }

    fn cell(&self) -> Cell {
        self.as_collidable().cell()
    }
}

impl Updatable for Entity {
    fn update(&mut self, grid: &TileMap, dt_ms: u32) {
        self.as_updatable().update(grid, dt_ms);
    }

    fn animation_key(&self) -> Option<AnimationKey> {
        match self {
            Entity::Player(p) => p.animation_key(),
            Entity::Bomb(b) => b.animation_key(),
            Entity::PowerUp(u) => u.animation_key(),
        }
    }
}

impl From<Player> for Entity {
    fn from(player: Player) -> Self {
        Entity::Player(player)
    }
}

impl From<Bomb> for Entity {
    fn from(bomb: Bomb) -> Self {
        Entity::Bomb(bomb)
    }
}

impl From<PowerUp> for Entity {
    fn from(pickup: PowerUp) -> Self {
        Entity::PowerUp(pickup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{PLAYER_SPEED, TILE_SIZE};

    #[test]
    fn test_player_cell_uses_floor() {
        let mut player = Player::new(Team::Blue, Cell::new(2, 3), 1, 1);
        assert_eq!(player.cell(), Cell::new(2, 3));

        // Right at the far edge of the tile is still the same tile
        player.position.x = 3 * TILE_SIZE - 1;
        assert_eq!(player.cell(), Cell::new(2, 3));
        player.position.x = 3 * TILE_SIZE;
        assert_eq!(player.cell(), Cell::new(3, 3));
    }

    #[test]
    fn test_player_animation_keys() {
        let mut player = Player::new(Team::Red, Cell::new(1, 1), 1, 1);
        assert_eq!(player.animation_key(), Some(AnimationKey::PlayerIdle));

        player.velocity = FixedVec2::new(-PLAYER_SPEED, 0);
        assert_eq!(player.animation_key(), Some(AnimationKey::PlayerLeft));
        player.velocity = FixedVec2::new(0, PLAYER_SPEED);
        assert_eq!(player.animation_key(), Some(AnimationKey::PlayerDown));

        player.dead = true;
        assert_eq!(player.animation_key(), Some(AnimationKey::PlayerDeath));
        player.visible = false;
        assert_eq!(player.animation_key(), None);
    }

    #[test]
    fn test_bomb_countdown() {
        let mut bomb = Bomb::new(EntityId(1), Cell::new(2, 2), 1, 3000);
        assert_eq!(bomb.countdown_ms(1000), 2000);
        assert_eq!(bomb.countdown_ms(5000), 0);
        assert_eq!(bomb.animation_key(), Some(AnimationKey::BombFuse));

        bomb.exploded = true;
        assert_eq!(bomb.countdown_ms(1000), 0);
        assert!(bomb.is_dead());
        assert_eq!(bomb.animation_key(), None);
    }

    #[test]
    fn test_entity_dispatch() {
        let mut entity: Entity = PowerUp::new(Cell::new(4, 5), TileKind::PickupPower).into();
        entity.set_id(EntityId(7));
        assert_eq!(entity.id(), EntityId(7));
        assert_eq!(entity.kind(), EntityKind::PowerUp);
        assert_eq!(entity.cell(), Cell::new(4, 5));
        assert!(!entity.is_dead());
    }
}

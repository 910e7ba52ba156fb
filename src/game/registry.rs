//! Entity Registry
//!
//! Owns every live entity of a session. BTreeMap keeps iteration in id
//! order, which is also creation order, so every scan is deterministic.
//! Entity counts are small (two players, a handful of bombs and pickups),
//! so cell queries are a linear scan.

use std::collections::BTreeMap;

use crate::game::entity::{Bomb, Collidable, Entity, EntityId, EntityKind, Player, PowerUp};
use crate::game::grid::Cell;

/// Indexed store of session entities.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, assigning it a fresh id.
    pub fn register(&mut self, entity: impl Into<Entity>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let mut entity = entity.into();
        entity.set_id(id);
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity. Unknown ids are ignored.
    pub fn unregister(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Live, non-dead entities of `kind` whose grid cell is `cell`.
    pub fn query_at(&self, cell: Cell, kind: EntityKind) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.kind() == kind && !e.is_dead() && e.cell() == cell)
            .map(Entity::id)
            .collect()
    }

    /// Ids of every entity of `kind`, dead or alive.
    pub fn ids_of(&self, kind: EntityKind) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.kind() == kind)
            .map(Entity::id)
            .collect()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn player(&self, id: EntityId) -> Option<&Player> {
        match self.entities.get(&id) {
            Some(Entity::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn player_mut(&mut self, id: EntityId) -> Option<&mut Player> {
        match self.entities.get_mut(&id) {
            Some(Entity::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn bomb(&self, id: EntityId) -> Option<&Bomb> {
        match self.entities.get(&id) {
            Some(Entity::Bomb(b)) => Some(b),
            _ => None,
        }
    }

    pub fn bomb_mut(&mut self, id: EntityId) -> Option<&mut Bomb> {
        match self.entities.get_mut(&id) {
            Some(Entity::Bomb(b)) => Some(b),
            _ => None,
        }
    }

    pub fn pickup(&self, id: EntityId) -> Option<&PowerUp> {
        match self.entities.get(&id) {
            Some(Entity::PowerUp(u)) => Some(u),
            _ => None,
        }
    }

    pub fn pickup_mut(&mut self, id: EntityId) -> Option<&mut PowerUp> {
        match self.entities.get_mut(&id) {
            Some(Entity::PowerUp(u)) => Some(u),
            _ => None,
        }
    }

    /// Players in id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.entities.values().filter_map(|e| match e {
            Entity::Player(p) => Some(p),
            _ => None,
        })
    }

    /// Bombs in id order.
    pub fn bombs(&self) -> impl Iterator<Item = &Bomb> {
        self.entities.values().filter_map(|e| match e {
            Entity::Bomb(b) => Some(b),
            _ => None,
        })
    }

    /// Pickups in id order.
    pub fn pickups(&self) -> impl Iterator<Item = &PowerUp> {
        self.entities.values().filter_map(|e| match e {
            Entity::PowerUp(u) => Some(u),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::TILE_SIZE;
    use crate::game::entity::Team;
    use crate::game::grid::TileKind;

    #[test]
    fn test_register_assigns_monotonic_ids() {
        let mut registry = EntityRegistry::new();
        let a = registry.register(Player::new(Team::Blue, Cell::new(1, 1), 1, 1));
        let b = registry.register(PowerUp::new(Cell::new(2, 2), TileKind::PickupBomb));
        assert_eq!(a, EntityId(0));
        assert_eq!(b, EntityId(1));

        registry.unregister(a);
        let c = registry.register(Player::new(Team::Red, Cell::new(1, 1), 1, 1));
        assert_eq!(c, EntityId(2), "ids are never reused");
        assert_eq!(registry.player(c).map(|p| p.id), Some(c));
    }

    #[test]
    fn test_query_filters_kind_cell_and_liveness() {
        let mut registry = EntityRegistry::new();
        let owner = registry.register(Player::new(Team::Blue, Cell::new(3, 3), 1, 1));
        let bomb = registry.register(Bomb::new(owner, Cell::new(3, 3), 1, 3000));
        let spent = registry.register(Bomb::new(owner, Cell::new(4, 3), 1, 3000));
        if let Some(b) = registry.bomb_mut(spent) {
            b.exploded = true;
        }

        assert_eq!(registry.query_at(Cell::new(3, 3), EntityKind::Player), vec![owner]);
        assert_eq!(registry.query_at(Cell::new(3, 3), EntityKind::Bomb), vec![bomb]);
        assert!(registry.query_at(Cell::new(4, 3), EntityKind::Bomb).is_empty());
        assert!(registry.query_at(Cell::new(3, 4), EntityKind::Player).is_empty());

        if let Some(p) = registry.player_mut(owner) {
            p.dead = true;
        }
        assert!(registry.query_at(Cell::new(3, 3), EntityKind::Player).is_empty());
    }

    #[test]
    fn test_query_uses_floor_of_position() {
        let mut registry = EntityRegistry::new();
        let id = registry.register(Player::new(Team::Blue, Cell::new(2, 2), 1, 1));
        if let Some(p) = registry.player_mut(id) {
            // Straddling the boundary, center just inside cell (3,2)
            p.position.x = 3 * TILE_SIZE;
        }
        assert!(registry.query_at(Cell::new(2, 2), EntityKind::Player).is_empty());
        assert_eq!(registry.query_at(Cell::new(3, 2), EntityKind::Player), vec![id]);
    }

    #[test]
    fn test_typed_accessors_reject_wrong_kind() {
        let mut registry = EntityRegistry::new();
        let id = registry.register(PowerUp::new(Cell::new(2, 2), TileKind::PickupPower));
        assert!(registry.player(id).is_none());
        assert!(registry.bomb(id).is_none());
        assert!(registry.pickup(id).is_some());
        assert_eq!(registry.ids_of(EntityKind::PowerUp), vec![id]);
        assert_eq!(registry.len(), 1);
    }
}

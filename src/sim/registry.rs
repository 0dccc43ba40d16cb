//! Level entities and the registry that owns them
//!
//! Entity IDs are handed out in insertion order and never reused within a
//! level, so iterating the registry is deterministic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Stable handle to an entity in the active level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// What a placed level object is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Wall,
    Star,
    Vortex,
    Finish,
    Portal,
}

impl EntityKind {
    /// Map letter for this kind
    pub fn letter(self) -> char {
        match self {
            EntityKind::Wall => 'x',
            EntityKind::Vortex => 'v',
            EntityKind::Star => 's',
            EntityKind::Finish => 'f',
            EntityKind::Portal => 'p',
        }
    }

    /// Kind for a map letter. `None` for blanks and unknown letters.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'x' => Some(EntityKind::Wall),
            'v' => Some(EntityKind::Vortex),
            's' => Some(EntityKind::Star),
            'f' => Some(EntityKind::Finish),
            'p' => Some(EntityKind::Portal),
            _ => None,
        }
    }

    /// Only walls physically block the player
    pub fn is_solid(self) -> bool {
        self == EntityKind::Wall
    }

    /// Collision shape used for every entity of this kind
    pub fn shape(self) -> Shape {
        match self {
            EntityKind::Wall => Shape::Rectangle {
                width: CELL_SIZE,
                height: CELL_SIZE,
            },
            EntityKind::Star => Shape::Circle { radius: STAR_RADIUS },
            EntityKind::Vortex => Shape::Circle { radius: VORTEX_RADIUS },
            EntityKind::Finish => Shape::Circle { radius: FINISH_RADIUS },
            EntityKind::Portal => Shape::Circle { radius: PORTAL_RADIUS },
        }
    }
}

/// Collision shape, centered on the entity position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rectangle { width: f32, height: f32 },
}

/// One placed level object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Grid-cell center
    pub position: Vec2,
    pub shape: Shape,
    pub solid: bool,
    /// Cleared once the entity is collected or used up
    pub alive: bool,
}

/// All entities of the active level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    /// Sorted by id (insertion order)
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new entity; shape and solidity follow from the kind
    pub fn add_entity(&mut self, kind: EntityKind, position: Vec2) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            kind,
            position,
            shape: kind.shape(),
            solid: kind.is_solid(),
            alive: true,
        });
        id
    }

    /// Mark an entity as removed. It stays inspectable until `clear()`.
    ///
    /// Returns false if the id is unknown or the entity was already removed.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) if entity.alive => {
                entity.alive = false;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        // IDs keep counting across clear(), so they are ordered but not indices
        let idx = self.entities.binary_search_by_key(&id, |e| e.id).ok()?;
        self.entities.get(idx)
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let idx = self.entities.binary_search_by_key(&id, |e| e.id).ok()?;
        self.entities.get_mut(idx)
    }

    /// Alive entities of one kind, in insertion order
    pub fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.live().filter(move |e| e.kind == kind)
    }

    /// Alive entities, in insertion order
    pub fn live(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    /// Every entity including removed ones, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Drop all entities. Called before a level is (re)loaded.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of alive entities of a kind
    pub fn count_alive(&self, kind: EntityKind) -> usize {
        self.entities_of_kind(kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_shape_and_solidity() {
        let mut registry = EntityRegistry::new();
        let wall = registry.add_entity(EntityKind::Wall, Vec2::new(32.0, 32.0));
        let star = registry.add_entity(EntityKind::Star, Vec2::new(96.0, 32.0));

        let wall = registry.get(wall).unwrap();
        assert!(wall.solid);
        assert_eq!(
            wall.shape,
            Shape::Rectangle {
                width: 64.0,
                height: 64.0
            }
        );

        let star = registry.get(star).unwrap();
        assert!(!star.solid);
        assert!(matches!(star.shape, Shape::Circle { .. }));
    }

    #[test]
    fn test_remove_keeps_entity_for_inspection() {
        let mut registry = EntityRegistry::new();
        let id = registry.add_entity(EntityKind::Star, Vec2::ZERO);

        assert!(registry.remove_entity(id));
        assert!(!registry.remove_entity(id));
        assert_eq!(registry.len(), 1);
        assert!(!registry.get(id).unwrap().alive);
        assert_eq!(registry.count_alive(EntityKind::Star), 0);
    }

    #[test]
    fn test_entities_of_kind_in_insertion_order() {
        let mut registry = EntityRegistry::new();
        let a = registry.add_entity(EntityKind::Portal, Vec2::new(1.0, 0.0));
        registry.add_entity(EntityKind::Wall, Vec2::new(2.0, 0.0));
        let b = registry.add_entity(EntityKind::Portal, Vec2::new(3.0, 0.0));

        let ids: Vec<_> = registry
            .entities_of_kind(EntityKind::Portal)
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut registry = EntityRegistry::new();
        let first = registry.add_entity(EntityKind::Star, Vec2::ZERO);
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get(first).is_none());

        let second = registry.add_entity(EntityKind::Star, Vec2::ZERO);
        assert_ne!(first, second);
    }

    #[test]
    fn test_letters_round_trip() {
        for kind in [
            EntityKind::Wall,
            EntityKind::Star,
            EntityKind::Vortex,
            EntityKind::Finish,
            EntityKind::Portal,
        ] {
            assert_eq!(EntityKind::from_letter(kind.letter()), Some(kind));
        }
        assert_eq!(EntityKind::from_letter(' '), None);
        assert_eq!(EntityKind::from_letter('X'), None);
    }
}

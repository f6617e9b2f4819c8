//! Hit-testing against registry entities.
//!
//! A linear scan in insertion order: the first entity whose logical circle
//! contains the point wins. Entity counts stay in the low tens, so there is
//! no spatial index.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::pointer::Point;
use crate::registry::{Entity, EntityId, EntityRegistry};

/// The first entity (in insertion order) whose logical radius contains `pt`.
#[must_use]
pub fn entity_at(pt: Point, registry: &EntityRegistry) -> Option<&Entity> {
    registry.iter().find(|e| e.contains(pt))
}

/// Id of the entity under `pt`, if any.
#[must_use]
pub fn id_at(pt: Point, registry: &EntityRegistry) -> Option<EntityId> {
    entity_at(pt, registry).map(|e| e.id.clone())
}

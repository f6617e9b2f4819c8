//! Entity model: positioned circular services and the ordered registry.
//!
//! An [`Entity`] is a hit-testable circle on the viewport. Its position is
//! mutated by the drag controller, its animated fields (`radius`, `pulse`,
//! `activity`) by the engine tick, and everything cosmetic lives in the
//! open-ended `props` JSON bag read through [`Props`].
//!
//! [`EntityRegistry`] keeps entities in insertion order. That order is the
//! hit-test order, so it is never re-sorted: replacing an existing id keeps
//! its slot, and removal shifts later entries down.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ACTIVITY_DECAY, PULSE_AMPLITUDE, PULSE_STEP};
use crate::pointer::Point;

/// Stable identifier for an entity, e.g. `"S3_DATALAKE"`.
pub type EntityId = String;

/// A positioned circular node on the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier within the registry.
    pub id: EntityId,
    /// Human-readable display name.
    pub name: String,
    /// Center x in canvas-local CSS pixels.
    pub x: f64,
    /// Center y in canvas-local CSS pixels.
    pub y: f64,
    /// Logical radius used for hit-testing and drag clamping.
    pub base_radius: f64,
    /// Rendered radius; oscillates around `base_radius` with the pulse.
    #[serde(default)]
    pub radius: f64,
    /// Pulse animation phase in radians.
    #[serde(default)]
    pub pulse: f64,
    /// Presentation-only glow level in `[0, 1]`.
    #[serde(default)]
    pub activity: f64,
    /// Open-ended display metadata (color, service label, instance type, ...).
    #[serde(default)]
    pub props: serde_json::Value,
}

impl Entity {
    /// Create an entity at rest: rendered radius equals the logical radius.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, x: f64, y: f64, radius: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x,
            y,
            base_radius: radius,
            radius,
            pulse: 0.0,
            activity: 0.0,
            props: serde_json::json!({}),
        }
    }

    /// Replace the display metadata.
    #[must_use]
    pub fn with_props(mut self, props: serde_json::Value) -> Self {
        self.props = props;
        self
    }

    /// Center of the entity.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `pt` lies inside (or on) the logical circle.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        self.center().distance(pt) <= self.base_radius
    }

    /// Raise activity by `amount`, saturating at 1.
    pub fn bump_activity(&mut self, amount: f64) {
        self.activity = (self.activity + amount).min(1.0);
    }

    /// Advance the pulse animation and decay activity by one tick.
    ///
    /// The rendered radius never goes negative, even for entities smaller
    /// than the pulse amplitude.
    pub fn animate(&mut self, speed: f64) {
        self.pulse += PULSE_STEP * speed;
        self.activity = (self.activity - ACTIVITY_DECAY).max(0.0);
        self.radius = (self.base_radius + self.pulse.sin() * PULSE_AMPLITUDE).max(0.0);
    }

    /// Set one display field in `props`, turning a non-object bag into an
    /// object first.
    pub fn set_prop(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        if !self.props.is_object() {
            self.props = serde_json::json!({});
        }
        if let Some(map) = self.props.as_object_mut() {
            map.insert(key.to_owned(), value.into());
        }
    }

    /// Typed view of `props`.
    #[must_use]
    pub fn props(&self) -> Props<'_> {
        Props::new(&self.props)
    }
}

/// Typed access to common display fields of an `Entity.props` JSON value.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    fn str_or(&self, key: &str, default: &'a str) -> &'a str {
        self.value.get(key).and_then(|v| v.as_str()).unwrap_or(default)
    }

    fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.value
            .get(key)
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(default)
    }

    /// Fill color as a CSS color string. Defaults to `"#4a90d9"`.
    #[must_use]
    pub fn color(&self) -> &'a str {
        self.str_or("color", "#4a90d9")
    }

    /// Cloud service label, e.g. `"SageMaker"`. Empty when absent.
    #[must_use]
    pub fn service(&self) -> &'a str {
        self.str_or("service", "")
    }

    /// Instance type label. Empty when absent.
    #[must_use]
    pub fn instance_type(&self) -> &'a str {
        self.str_or("instance_type", "")
    }

    /// Availability zone label. Empty when absent.
    #[must_use]
    pub fn availability_zone(&self) -> &'a str {
        self.str_or("availability_zone", "")
    }

    /// Health label. Defaults to `"Healthy"`.
    #[must_use]
    pub fn health(&self) -> &'a str {
        self.str_or("health", "Healthy")
    }

    /// Throughput label, free text. Empty when absent.
    #[must_use]
    pub fn throughput(&self) -> &'a str {
        self.str_or("throughput", "")
    }

    /// Utilization percentage. Defaults to `0`.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        self.f64_or("utilization", 0.0)
    }

    /// Latency in milliseconds. Defaults to `0`.
    #[must_use]
    pub fn latency_ms(&self) -> f64 {
        self.f64_or("latency_ms", 0.0)
    }

    /// SLA target percentage. Defaults to `99.0`.
    #[must_use]
    pub fn sla_target(&self) -> f64 {
        self.f64_or("sla_target", 99.0)
    }

    /// Reliability score percentage. Defaults to `99.0`.
    #[must_use]
    pub fn reliability(&self) -> f64 {
        self.f64_or("reliability", 99.0)
    }

    /// Hourly cost in dollars. Defaults to `0`.
    #[must_use]
    pub fn cost_per_hour(&self) -> f64 {
        self.f64_or("cost_per_hour", 0.0)
    }

    /// Whether the entity runs on spot capacity. Defaults to `false`.
    #[must_use]
    pub fn is_spot(&self) -> bool {
        self.value
            .get("is_spot")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Ordered in-memory store of entities.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { entities: Vec::new() }
    }

    /// Insert an entity at the end, or replace an existing entity with the
    /// same id in place.
    pub fn insert(&mut self, entity: Entity) {
        match self.entities.iter_mut().find(|e| e.id == entity.id) {
            Some(slot) => *slot = entity,
            None => self.entities.push(entity),
        }
    }

    /// Remove an entity by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    /// Entity at insertion index `idx`.
    #[must_use]
    pub fn at(&self, idx: usize) -> Option<&Entity> {
        self.entities.get(idx)
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Replace all entities with `entities`, keeping their order.
    pub fn load_snapshot(&mut self, entities: Vec<Entity>) {
        self.entities.clear();
        for entity in entities {
            self.insert(entity);
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

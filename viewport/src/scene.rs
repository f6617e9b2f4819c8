//! Per-tick snapshot handed to the renderer and the host page.
//!
//! A [`Scene`] is a plain, serializable copy: entity geometry, resolved flow
//! geometry, and the current drag and hover targets. Flows whose endpoints no
//! longer resolve are left out.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::Serialize;

use crate::flow::{FlowId, FlowKind, FlowLayer};
use crate::input::{Indicator, Overlay, UiState};
use crate::pointer::Point;
use crate::registry::{Entity, EntityId, EntityRegistry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Rendered (pulsing) radius.
    pub radius: f64,
    pub activity: f64,
    pub color: String,
    pub dragging: bool,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowView {
    pub id: FlowId,
    pub kind: FlowKind,
    pub from_id: EntityId,
    pub to_id: EntityId,
    pub from: Point,
    pub to: Point,
    pub progress: f64,
    /// Per-particle progress along the edge.
    pub particles: Vec<f64>,
    pub color: &'static str,
    pub data_size: &'static str,
}

impl FlowView {
    /// Position of a particle at edge progress `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        Point::new(
            self.from.x + (self.to.x - self.from.x) * t,
            self.from.y + (self.to.y - self.from.y) * t,
        )
    }
}

/// Content of the hover info panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub id: EntityId,
    pub name: String,
    pub service: String,
    pub instance_type: String,
    pub utilization: f64,
    pub throughput: String,
    pub latency_ms: f64,
    pub health: String,
    pub sla_target: f64,
    pub reliability: f64,
    pub cost_per_hour: f64,
    pub is_spot: bool,
    pub availability_zone: String,
    /// Live flows touching the entity.
    pub connections: usize,
}

impl Tooltip {
    #[must_use]
    pub fn for_entity(entity: &Entity, flows: &FlowLayer) -> Self {
        let props = entity.props();
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            service: props.service().to_owned(),
            instance_type: props.instance_type().to_owned(),
            utilization: props.utilization(),
            throughput: props.throughput().to_owned(),
            latency_ms: props.latency_ms(),
            health: props.health().to_owned(),
            sla_target: props.sla_target(),
            reliability: props.reliability(),
            cost_per_hour: props.cost_per_hour(),
            is_spot: props.is_spot(),
            availability_zone: props.availability_zone().to_owned(),
            connections: flows.connections(&entity.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub entities: Vec<EntityView>,
    pub flows: Vec<FlowView>,
    pub dragging: Option<EntityId>,
    pub hover: Option<Overlay>,
    pub indicator: Option<Indicator>,
    pub paused: bool,
    pub training: bool,
    /// Training run completion in `[0, 100]`.
    pub training_progress: f64,
    pub now_ms: f64,
}

impl Scene {
    /// Snapshot the registry and flows together with overlay state.
    #[must_use]
    pub fn capture(
        registry: &EntityRegistry,
        flows: &FlowLayer,
        ui: &UiState,
        paused: bool,
        training: bool,
        training_progress: f64,
        now_ms: f64,
    ) -> Self {
        let hovered_id = ui.hover.as_ref().map(|h| h.entity_id.as_str());
        let dragging_id = ui.dragging_id.as_deref();

        let entities = registry
            .iter()
            .map(|e| EntityView {
                id: e.id.clone(),
                name: e.name.clone(),
                x: e.x,
                y: e.y,
                radius: e.radius,
                activity: e.activity,
                color: e.props().color().to_owned(),
                dragging: dragging_id == Some(e.id.as_str()),
                hovered: hovered_id == Some(e.id.as_str()),
            })
            .collect();

        let flows = flows
            .iter()
            .filter_map(|f| {
                let from = registry.get(&f.from)?;
                let to = registry.get(&f.to)?;
                Some(FlowView {
                    id: f.id,
                    kind: f.kind,
                    from_id: f.from.clone(),
                    to_id: f.to.clone(),
                    from: from.center(),
                    to: to.center(),
                    progress: f.progress,
                    particles: f.particle_offsets(),
                    color: f.kind.color(),
                    data_size: f.kind.data_size(),
                })
            })
            .collect();

        Self {
            entities,
            flows,
            dragging: ui.dragging_id.clone(),
            hover: ui.hover.clone(),
            indicator: ui.indicator.clone(),
            paused,
            training,
            training_progress,
            now_ms,
        }
    }
}

#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::flow::Flow;

fn registry() -> EntityRegistry {
    let mut registry = EntityRegistry::new();
    registry.insert(Entity::new("A", "Alpha", 0.0, 0.0, 10.0).with_props(json!({ "color": "#111111" })));
    registry.insert(Entity::new("B", "Beta", 100.0, 50.0, 10.0));
    registry
}

#[test]
fn capture_copies_entities_in_order() {
    let scene = Scene::capture(&registry(), &FlowLayer::new(), &UiState::default(), false, false, 0.0, 0.0);
    let ids: Vec<&str> = scene.entities.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["A", "B"]);
    assert_eq!(scene.entities[0].color, "#111111");
    assert_eq!(scene.entities[1].color, "#4a90d9");
}

#[test]
fn capture_marks_drag_and_hover_targets() {
    let ui = UiState {
        dragging_id: Some("A".into()),
        hover: Some(Overlay { entity_id: "B".into(), anchor: Point::new(0.0, 0.0) }),
        ..Default::default()
    };
    let scene = Scene::capture(&registry(), &FlowLayer::new(), &ui, false, false, 0.0, 0.0);
    assert!(scene.entities[0].dragging);
    assert!(!scene.entities[0].hovered);
    assert!(!scene.entities[1].dragging);
    assert!(scene.entities[1].hovered);
    assert_eq!(scene.dragging.as_deref(), Some("A"));
}

#[test]
fn capture_resolves_flow_geometry() {
    let mut flows = FlowLayer::new();
    let mut flow = Flow::new(FlowKind::Control, "A", "B", 0.0);
    flow.progress = 0.5;
    flows.flows.push(flow);

    let scene = Scene::capture(&registry(), &flows, &UiState::default(), false, false, 0.0, 0.0);
    assert_eq!(scene.flows.len(), 1);
    let view = &scene.flows[0];
    assert_eq!(view.from, Point::new(0.0, 0.0));
    assert_eq!(view.to, Point::new(100.0, 50.0));
    assert_eq!(view.point_at(view.progress), Point::new(50.0, 25.0));
    assert_eq!(view.particles.len(), 2);
    assert_eq!(view.color, "#ff6b6b");
}

#[test]
fn capture_skips_dangling_flows() {
    let mut flows = FlowLayer::new();
    flows.flows.push(Flow::new(FlowKind::Control, "A", "GONE", 0.0));
    flows.flows.push(Flow::new(FlowKind::Control, "B", "A", 0.0));
    let scene = Scene::capture(&registry(), &flows, &UiState::default(), false, false, 0.0, 0.0);
    assert_eq!(scene.flows.len(), 1);
    assert_eq!(scene.flows[0].from_id, "B");
}

#[test]
fn capture_carries_flags_and_clock() {
    let scene = Scene::capture(&registry(), &FlowLayer::new(), &UiState::default(), true, true, 42.0, 1234.5);
    assert!(scene.paused);
    assert!(scene.training);
    assert_eq!(scene.training_progress, 42.0);
    assert_eq!(scene.now_ms, 1234.5);
}

#[test]
fn scene_serializes_flow_kind_by_wire_name() {
    let mut flows = FlowLayer::new();
    flows.flows.push(Flow::new(FlowKind::Checkpoint, "A", "B", 0.0));
    let scene = Scene::capture(&registry(), &flows, &UiState::default(), false, false, 0.0, 0.0);
    let value = serde_json::to_value(&scene).unwrap();
    assert_eq!(value["flows"][0]["kind"], "checkpoint");
    assert_eq!(value["entities"][1]["name"], "Beta");
}

#[test]
fn tooltip_reads_props_and_counts_connections() {
    let mut registry = registry();
    registry.insert(
        Entity::new("C", "Gamma", 0.0, 0.0, 5.0).with_props(json!({
            "service": "ECS",
            "instance_type": "c5.4xlarge",
            "utilization": 58,
            "cost_per_hour": 95,
            "availability_zone": "us-east-1a",
        })),
    );
    let mut flows = FlowLayer::new();
    flows.flows.push(Flow::new(FlowKind::Inference, "C", "A", 0.0));
    flows.flows.push(Flow::new(FlowKind::Monitor, "B", "C", 0.0));
    flows.flows.push(Flow::new(FlowKind::Monitor, "A", "B", 0.0));

    let tooltip = Tooltip::for_entity(registry.get("C").unwrap(), &flows);
    assert_eq!(tooltip.name, "Gamma");
    assert_eq!(tooltip.service, "ECS");
    assert_eq!(tooltip.instance_type, "c5.4xlarge");
    assert_eq!(tooltip.utilization, 58.0);
    assert_eq!(tooltip.cost_per_hour, 95.0);
    assert_eq!(tooltip.health, "Healthy");
    assert_eq!(tooltip.connections, 2);
}

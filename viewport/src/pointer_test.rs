#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Point
// =============================================================

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn point_default_is_origin() {
    assert_eq!(Point::default(), Point::new(0.0, 0.0));
}

#[test]
fn point_distance_is_euclidean() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert_eq!(a.distance(b), 5.0);
    assert_eq!(b.distance(a), 5.0);
}

#[test]
fn point_delta_from() {
    let (dx, dy) = Point::new(10.0, 4.0).delta_from(Point::new(7.0, 9.0));
    assert_eq!(dx, 3.0);
    assert_eq!(dy, -5.0);
}

#[test]
fn point_offset() {
    assert_eq!(Point::new(1.0, 1.0).offset(2.0, -3.0), Point::new(3.0, -2.0));
}

#[test]
fn point_serializes_as_xy_object() {
    let json = serde_json::to_value(Point::new(1.5, 2.0)).unwrap();
    assert_eq!(json, serde_json::json!({ "x": 1.5, "y": 2.0 }));
}

// =============================================================
// to_local
// =============================================================

#[test]
fn to_local_subtracts_surface_offset() {
    let surface = SurfaceRect::new(100.0, 50.0, 800.0, 600.0);
    let local = to_local(Point::new(150.0, 75.0), surface);
    assert_eq!(local, Point::new(50.0, 25.0));
}

#[test]
fn to_local_with_zero_offset_is_identity() {
    let local = to_local(Point::new(12.0, 34.0), SurfaceRect::default());
    assert_eq!(local, Point::new(12.0, 34.0));
}

#[test]
fn to_local_can_go_negative_outside_surface() {
    let surface = SurfaceRect::new(100.0, 100.0, 10.0, 10.0);
    let local = to_local(Point::new(90.0, 95.0), surface);
    assert_eq!(local, Point::new(-10.0, -5.0));
}

#[test]
fn to_local_reflects_layout_change_between_calls() {
    let client = Point::new(200.0, 200.0);
    let before = to_local(client, SurfaceRect::new(0.0, 0.0, 500.0, 500.0));
    let after = to_local(client, SurfaceRect::new(40.0, 20.0, 500.0, 500.0));
    assert_eq!(before, Point::new(200.0, 200.0));
    assert_eq!(after, Point::new(160.0, 180.0));
}

#[test]
fn to_local_ignores_surface_size() {
    let small = to_local(Point::new(5.0, 5.0), SurfaceRect::new(1.0, 1.0, 10.0, 10.0));
    let large = to_local(Point::new(5.0, 5.0), SurfaceRect::new(1.0, 1.0, 4000.0, 3000.0));
    assert_eq!(small, large);
}

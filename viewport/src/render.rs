//! Rendering: draws a [`Scene`] to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads a scene snapshot and produces pixels; it never mutates engine state.
//! Tooltips and the drag indicator are DOM overlays owned by the host, so they
//! are not drawn here.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! Every `save()` is paired with a `restore()` on the error path too, so a
//! failed frame does not leak alpha or transform into the next one. The
//! top-level caller ([`crate::engine::Engine`]) logs the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::scene::{EntityView, FlowView, Scene};

const BACKGROUND: &str = "#0b1020";
const GRID_COLOR: &str = "rgba(255, 255, 255, 0.04)";
const GRID_SPACING: f64 = 40.0;

const LINK_ALPHA: f64 = 0.35;
const LINK_WIDTH: f64 = 2.0;
const PARTICLE_RADIUS: f64 = 4.0;

/// Outer glow distance beyond the rendered radius at full activity.
const GLOW_SPREAD: f64 = 15.0;
const LABEL_COLOR: &str = "#e6edf7";
const LABEL_GAP: f64 = 16.0;

/// Draw the full scene: background, flows, then entities on top.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
    draw_background(ctx, viewport_w, viewport_h);

    for flow in &scene.flows {
        draw_flow(ctx, flow)?;
    }
    for entity in &scene.entities {
        draw_entity(ctx, entity)?;
    }

    Ok(())
}

/// The save/restore half of a 2D context.
trait StateStack {
    fn save(&self);
    fn restore(&self);
}

impl StateStack for CanvasRenderingContext2d {
    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }
}

/// Run `body` inside a `save()`/`restore()` pair, restoring before any error
/// is returned.
fn with_saved_state<C, F>(ctx: &C, body: F) -> Result<(), JsValue>
where
    C: StateStack,
    F: FnOnce(&C) -> Result<(), JsValue>,
{
    ctx.save();
    let result = body(ctx);
    ctx.restore();
    result
}

// =============================================================
// Background
// =============================================================

fn draw_background(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0);
    ctx.begin_path();
    let mut x = 0.0;
    while x <= w {
        ctx.move_to(x, 0.0);
        ctx.line_to(x, h);
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y <= h {
        ctx.move_to(0.0, y);
        ctx.line_to(w, y);
        y += GRID_SPACING;
    }
    ctx.stroke();
}

// =============================================================
// Flows
// =============================================================

fn draw_flow(ctx: &CanvasRenderingContext2d, flow: &FlowView) -> Result<(), JsValue> {
    with_saved_state(ctx, |ctx| draw_flow_body(ctx, flow))
}

fn draw_flow_body(ctx: &CanvasRenderingContext2d, flow: &FlowView) -> Result<(), JsValue> {
    // Faint link between the two centers.
    ctx.set_global_alpha(LINK_ALPHA);
    ctx.set_stroke_style_str(flow.color);
    ctx.set_line_width(LINK_WIDTH);
    ctx.begin_path();
    ctx.move_to(flow.from.x, flow.from.y);
    ctx.line_to(flow.to.x, flow.to.y);
    ctx.stroke();

    // Particles, lead particle brightest.
    ctx.set_fill_style_str(flow.color);
    #[allow(clippy::cast_precision_loss)]
    let count = flow.particles.len().max(1) as f64;
    for (i, t) in flow.particles.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let fade = 1.0 - i as f64 / count;
        let p = flow.point_at(*t);
        ctx.set_global_alpha(0.3 + 0.7 * fade);
        ctx.begin_path();
        ctx.arc(p.x, p.y, PARTICLE_RADIUS, 0.0, TAU)?;
        ctx.fill();
    }

    // Kind label rides along the middle of the run.
    if flow.progress > 0.15 && flow.progress < 0.85 {
        let p = flow.point_at(flow.progress);
        ctx.set_global_alpha(0.9);
        ctx.set_font("10px sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("bottom");
        ctx.fill_text(&format!("{} · {}", flow.kind, flow.data_size), p.x, p.y - 8.0)?;
    }
    Ok(())
}

// =============================================================
// Entities
// =============================================================

fn draw_entity(ctx: &CanvasRenderingContext2d, entity: &EntityView) -> Result<(), JsValue> {
    with_saved_state(ctx, |ctx| draw_entity_body(ctx, entity))
}

fn draw_entity_body(ctx: &CanvasRenderingContext2d, entity: &EntityView) -> Result<(), JsValue> {
    if entity.activity > 0.0 {
        ctx.set_global_alpha(entity.activity * 0.5);
        ctx.set_fill_style_str(&entity.color);
        ctx.begin_path();
        ctx.arc(entity.x, entity.y, entity.radius + GLOW_SPREAD * entity.activity, 0.0, TAU)?;
        ctx.fill();
    }

    ctx.set_global_alpha(if entity.dragging { 1.0 } else { 0.85 });
    ctx.set_fill_style_str(&entity.color);
    ctx.begin_path();
    ctx.arc(entity.x, entity.y, entity.radius, 0.0, TAU)?;
    ctx.fill();

    if entity.dragging || entity.hovered {
        ctx.set_global_alpha(1.0);
        ctx.set_stroke_style_str("#ffffff");
        ctx.set_line_width(if entity.dragging { 3.0 } else { 1.5 });
        ctx.stroke();
    }

    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(LABEL_COLOR);
    ctx.set_font("12px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("top");
    ctx.fill_text(&entity.name, entity.x, entity.y + entity.radius + LABEL_GAP)?;
    Ok(())
}

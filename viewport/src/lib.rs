//! Drag-and-interact viewport for an animated cloud training architecture diagram.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! interactive state of the diagram: service entities on a canvas, the data
//! flows animating between them, and the pointer gestures that let a user
//! pick an entity up and move it around. The page creates a [`web::Viewport`]
//! for its canvas; that handle wires mouse events and the animation loop to
//! the engine, and reports the tooltip and drag indicator the engine asks for
//! via [`engine::Action`] so the page can show them.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`web`] | `wasm-bindgen` exports: listeners, frame loop, controls |
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`registry`] | Entity registry and the entity type |
//! | [`pointer`] | Points and client-to-surface coordinate conversion |
//! | [`hit`] | Hit-testing the pointer against entities |
//! | [`input`] | Pointer event types, drag state machine, overlay state |
//! | [`flow`] | Flow kinds, routing, and the live flow layer |
//! | [`schedule`] | Periodic ambient and checkpoint emission |
//! | [`preset`] | The built-in architecture and scale-out instances |
//! | [`scene`] | Read-only per-frame snapshot and tooltip content |
//! | [`render`] | Scene rendering to a 2D canvas context |
//! | [`config`] | Engine configuration from JSON or environment |
//! | [`rng`] | Injected randomness |
//! | [`consts`] | Shared numeric constants (margins, timings, animation steps) |

pub mod config;
pub mod consts;
pub mod engine;
pub mod flow;
pub mod hit;
pub mod input;
pub mod pointer;
pub mod preset;
pub mod registry;
pub mod render;
pub mod rng;
pub mod scene;
pub mod schedule;
pub mod web;

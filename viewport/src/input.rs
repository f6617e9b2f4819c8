//! Input model: pointer events, overlay state, and the drag state machine.
//!
//! `PointerEvent` is the single tagged union the host feeds into
//! [`crate::engine::EngineCore::handle`]. `InputState` is the gesture being
//! tracked between press and release. `UiState` is what the overlay layer
//! needs to show: the marked entity, the hover panel, and the "moving"
//! indicator.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::pointer::Point;
use crate::registry::EntityId;

/// A device pointer event, already translated to canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Mouse button or touch pressed.
    Down { x: f64, y: f64 },
    /// Pointer moved over the surface.
    Move { x: f64, y: f64 },
    /// Mouse button or touch released.
    Up,
    /// Pointer left the tracked surface.
    Leave,
}

/// Hover info panel anchored near the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub entity_id: EntityId,
    pub anchor: Point,
}

/// The "Moving: <name>" label that follows the pointer during a drag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub text: String,
    pub anchor: Point,
}

/// Overlay state visible to the renderer and host.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Entity currently marked as being dragged.
    pub dragging_id: Option<EntityId>,
    /// Hover panel, shown only while idle.
    pub hover: Option<Overlay>,
    /// Drag indicator, shown only while dragging.
    pub indicator: Option<Indicator>,
}

/// Internal state for the drag state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next press.
    Idle,
    /// The user is moving one entity.
    Dragging {
        /// Id of the entity being dragged.
        id: EntityId,
        /// Unclamped pointer position at the previous event, used for deltas.
        last: Point,
    },
}

impl Default for InputState {
    fn default() -> Self {
        Self::Idle
    }
}

impl InputState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Id of the drag target, if dragging.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Dragging { id, .. } => Some(id.as_str()),
            Self::Idle => None,
        }
    }
}

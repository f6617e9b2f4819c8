//! Pointer tracking: canvas-local points and device-to-surface translation.
//!
//! The host reports pointer positions in client (viewport) coordinates. The
//! engine works in canvas-local CSS pixels, so every raw event passes through
//! [`to_local`] with the surface's placement read at the time of the event.
//! Nothing here is cached; a window resize between two events is picked up on
//! the next call.

#[cfg(test)]
#[path = "pointer_test.rs"]
mod pointer_test;

use serde::{Deserialize, Serialize};

/// A point in either client or canvas-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Component-wise difference `self - origin`.
    #[must_use]
    pub fn delta_from(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// This point shifted by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// On-screen placement of the drawing surface, as reported by
/// `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// Translate a client-space pointer position into canvas-local coordinates.
#[must_use]
pub fn to_local(client: Point, surface: SurfaceRect) -> Point {
    Point {
        x: client.x - surface.left,
        y: client.y - surface.top,
    }
}

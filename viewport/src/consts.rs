//! Shared numeric constants for the viewport crate.

// ── Dragging ────────────────────────────────────────────────────

/// Inset added to an entity's radius when clamping its center inside the viewport.
pub const DRAG_MARGIN: f64 = 15.0;

/// Offset of the "moving" indicator from the pointer, in CSS pixels.
pub const INDICATOR_OFFSET_X: f64 = 10.0;
pub const INDICATOR_OFFSET_Y: f64 = -10.0;

// ── Hover overlay ───────────────────────────────────────────────

/// Horizontal gap between the pointer and the hover overlay.
pub const TOOLTIP_OFFSET_X: f64 = 15.0;

/// Vertical lift of the hover overlay above the pointer.
pub const TOOLTIP_OFFSET_Y: f64 = -10.0;

/// Rendered overlay width; the anchor is pulled left so the panel stays on screen.
pub const TOOLTIP_WIDTH: f64 = 340.0;

/// The overlay never sits closer than this to the top edge.
pub const TOOLTIP_MIN_TOP: f64 = 10.0;

// ── Entity animation ────────────────────────────────────────────

/// Pulse phase advance per animation tick at 1x speed.
pub const PULSE_STEP: f64 = 0.04;

/// Amplitude of the rendered radius oscillation around the logical radius.
pub const PULSE_AMPLITUDE: f64 = 4.0;

/// Activity lost per animation tick.
pub const ACTIVITY_DECAY: f64 = 0.006;

/// Activity added to the source entity when a flow is emitted.
pub const SOURCE_ACTIVITY_BUMP: f64 = 0.5;

/// Activity added to the destination entity on emission and on every wrap.
pub const DEST_ACTIVITY_BUMP: f64 = 0.4;

// ── Flows ───────────────────────────────────────────────────────

/// Wall-clock lifetime of a flow, in milliseconds.
pub const FLOW_LIFETIME_MS: f64 = 8000.0;

/// Progress spacing between consecutive particles on one flow.
pub const PARTICLE_SPACING: f64 = 0.12;

// ── Training and service health ─────────────────────────────────

/// Training progress gained per animation tick at 1x speed, in percent.
pub const TRAINING_PROGRESS_STEP: f64 = 0.1;

/// Progress at which a training run completes.
pub const TRAINING_COMPLETE: f64 = 100.0;

/// Upper bound on a flow source's utilization bump at emission.
pub const EMIT_UTILIZATION_BUMP: f64 = 5.0;

/// Utilization is a percentage.
pub const UTILIZATION_MAX: f64 = 100.0;

/// Utilization added to the training services when a run starts, and its cap.
pub const TRAINING_UTILIZATION_BUMP: f64 = 20.0;
pub const TRAINING_UTILIZATION_CAP: f64 = 95.0;

/// Utilization added to the preprocessing service when triggered, and its cap.
pub const PREPROCESS_UTILIZATION_BUMP: f64 = 15.0;
pub const PREPROCESS_UTILIZATION_CAP: f64 = 90.0;

/// Delay between a simulated failure and the automatic recovery.
pub const FAILURE_RECOVERY_MS: f64 = 10_000.0;

/// Reliability lost on failure, and the floor it cannot drop below.
pub const FAILURE_RELIABILITY_DROP: f64 = 15.0;
pub const FAILURE_RELIABILITY_FLOOR: f64 = 80.0;

/// Reliability regained on recovery, and the ceiling it cannot exceed.
pub const RECOVERY_RELIABILITY_GAIN: f64 = 10.0;
pub const RECOVERY_RELIABILITY_CEILING: f64 = 99.5;

/// Recovered utilization is drawn from `[BASE, BASE + SPREAD)`.
pub const RECOVERY_UTILIZATION_BASE: f64 = 45.0;
pub const RECOVERY_UTILIZATION_SPREAD: f64 = 30.0;

// ── Scheduler ───────────────────────────────────────────────────

/// Period of the ambient flow emitter.
pub const AMBIENT_INTERVAL_MS: f64 = 1800.0;

/// Chance that an ambient emitter firing actually emits a flow.
pub const AMBIENT_PROBABILITY: f64 = 0.6;

/// Period of the checkpoint emitter (only active while training).
pub const CHECKPOINT_INTERVAL_MS: f64 = 5000.0;

/// Chance that a checkpoint emitter firing emits its checkpoint pair.
pub const CHECKPOINT_PROBABILITY: f64 = 0.3;

/// Default seed for the engine's random source.
pub const DEFAULT_SEED: u64 = 0x5eed_f10e;

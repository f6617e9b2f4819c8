//! Simulated timers.
//!
//! The host reports elapsed time per frame; [`Scheduler::on_tick`] turns that
//! into due [`Job`]s. Each interval accumulates time independently and fires at
//! most once per tick: a long frame (a backgrounded tab, a debugger pause)
//! drops the whole periods it missed and carries only the remainder forward.
//! Jobs carry no ordering guarantee relative to the animation step or to each
//! other.

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;

use crate::config::EngineConfig;
use crate::flow::FlowKind;
use crate::rng::RandomSource;

/// Periodic work the engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Maybe emit a randomly chosen flow kind along its route.
    AmbientFlow,
    /// Maybe emit the checkpoint pair while training.
    Checkpoint,
}

#[derive(Debug, Clone)]
struct Interval {
    job: Job,
    period_ms: f64,
    accumulated_ms: f64,
}

/// A set of fixed-period jobs driven by reported elapsed time.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    intervals: Vec<Interval>,
}

impl Scheduler {
    /// A scheduler with no jobs.
    #[must_use]
    pub fn new() -> Self {
        Self { intervals: Vec::new() }
    }

    /// The ambient and checkpoint emitters at the configured periods.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new()
            .every(Job::AmbientFlow, config.ambient_interval_ms)
            .every(Job::Checkpoint, config.checkpoint_interval_ms)
    }

    /// Add `job` with the given period. Non-positive periods are ignored.
    #[must_use]
    pub fn every(mut self, job: Job, period_ms: f64) -> Self {
        if period_ms > 0.0 && period_ms.is_finite() {
            self.intervals.push(Interval { job, period_ms, accumulated_ms: 0.0 });
        } else {
            tracing::warn!(?job, period_ms, "ignoring job with non-positive period");
        }
        self
    }

    /// Account `elapsed_ms` of time and return the jobs that fell due, in
    /// registration order. Each job appears at most once.
    pub fn on_tick(&mut self, elapsed_ms: f64) -> Vec<Job> {
        let mut due = Vec::new();
        if !(elapsed_ms > 0.0 && elapsed_ms.is_finite()) {
            return due;
        }
        for interval in &mut self.intervals {
            interval.accumulated_ms += elapsed_ms;
            if interval.accumulated_ms >= interval.period_ms {
                interval.accumulated_ms %= interval.period_ms;
                due.push(interval.job);
            }
        }
        due
    }

    /// Zero all accumulated time.
    pub fn reset(&mut self) {
        for interval in &mut self.intervals {
            interval.accumulated_ms = 0.0;
        }
    }
}

/// Cumulative weights for ambient emission. Checkpoints are emitted only by
/// their own job.
pub const AMBIENT_WEIGHTS: [(FlowKind, f64); 6] = [
    (FlowKind::Transfer, 0.25),
    (FlowKind::Sync, 0.20),
    (FlowKind::Monitor, 0.20),
    (FlowKind::Control, 0.15),
    (FlowKind::Inference, 0.10),
    (FlowKind::Preprocess, 0.10),
];

/// Draw an ambient flow kind: one `unit()` compared against cumulative weights.
pub fn pick_ambient_kind<R>(rng: &mut R) -> Option<FlowKind>
where
    R: RandomSource + ?Sized,
{
    let roll = rng.unit();
    let mut cumulative = 0.0;
    for (kind, weight) in AMBIENT_WEIGHTS {
        cumulative += weight;
        if roll <= cumulative {
            return Some(kind);
        }
    }
    None
}

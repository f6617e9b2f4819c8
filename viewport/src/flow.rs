//! Flow layer: ephemeral directed edges animated between two entities.
//!
//! Flows reference their endpoints by id only. An entity can be removed while
//! a flow still names it; such a dangling flow is skipped by [`FlowLayer::advance`]
//! and by scene capture until its lifetime runs out.
//!
//! Endpoint selection is split out into the pure [`resolve_endpoints`] so
//! routing can be tested against a scripted [`RandomSource`].

#[cfg(test)]
#[path = "flow_test.rs"]
mod flow_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEST_ACTIVITY_BUMP, PARTICLE_SPACING, SOURCE_ACTIVITY_BUMP};
use crate::preset::{
    BEDROCK_MODELS, CLOUDWATCH_MONITORING, EC2_TRAINING_NODES, ECS_SERVING, LAMBDA_PREPROCESSING, S3_DATALAKE,
    SAGEMAKER_TRAINING,
};
use crate::registry::{EntityId, EntityRegistry};
use crate::rng::RandomSource;

/// Unique identifier for a flow.
pub type FlowId = Uuid;

/// Category of a flow. Drives speed, particle count and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    #[serde(rename = "data-transfer")]
    Transfer,
    #[serde(rename = "model-sync")]
    Sync,
    #[serde(rename = "control-signal")]
    Control,
    #[serde(rename = "checkpoint")]
    Checkpoint,
    #[serde(rename = "monitoring")]
    Monitor,
    #[serde(rename = "inference")]
    Inference,
    #[serde(rename = "preprocessing")]
    Preprocess,
}

/// Candidate source and destination ids for routing a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub from: &'static [&'static str],
    pub to: &'static [&'static str],
}

impl FlowKind {
    pub const ALL: [FlowKind; 7] = [
        Self::Transfer,
        Self::Sync,
        Self::Control,
        Self::Checkpoint,
        Self::Monitor,
        Self::Inference,
        Self::Preprocess,
    ];

    /// Wire name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "data-transfer",
            Self::Sync => "model-sync",
            Self::Control => "control-signal",
            Self::Checkpoint => "checkpoint",
            Self::Monitor => "monitoring",
            Self::Inference => "inference",
            Self::Preprocess => "preprocessing",
        }
    }

    /// Progress advanced per tick at 1x speed.
    #[must_use]
    pub fn speed(self) -> f64 {
        match self {
            Self::Transfer => 0.008,
            Self::Sync => 0.006,
            Self::Control => 0.02,
            Self::Checkpoint => 0.004,
            Self::Monitor => 0.015,
            Self::Inference => 0.018,
            Self::Preprocess => 0.012,
        }
    }

    /// Number of particles drawn along the edge.
    #[must_use]
    pub fn particle_count(self) -> usize {
        match self {
            Self::Transfer => 6,
            Self::Sync => 8,
            Self::Control => 2,
            Self::Checkpoint | Self::Inference => 4,
            Self::Monitor => 3,
            Self::Preprocess => 5,
        }
    }

    /// Stroke / particle color.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Transfer => "#ff6b35",
            Self::Sync => "#00d4aa",
            Self::Control => "#ff6b6b",
            Self::Checkpoint => "#ffa502",
            Self::Monitor => "#0080ff",
            Self::Inference => "#9966cc",
            Self::Preprocess => "#ffd32a",
        }
    }

    /// Nominal payload label shown next to the edge.
    #[must_use]
    pub fn data_size(self) -> &'static str {
        match self {
            Self::Transfer => "2.3 GB",
            Self::Sync => "850 MB",
            Self::Control => "15 KB",
            Self::Checkpoint => "1.2 GB",
            Self::Monitor => "500 KB",
            Self::Inference => "125 MB",
            Self::Preprocess => "450 MB",
        }
    }

    /// Static routing table entry.
    #[must_use]
    pub fn route(self) -> Route {
        match self {
            Self::Transfer => Route {
                from: &[S3_DATALAKE],
                to: &[SAGEMAKER_TRAINING, EC2_TRAINING_NODES, LAMBDA_PREPROCESSING],
            },
            Self::Sync => Route {
                from: &[SAGEMAKER_TRAINING, EC2_TRAINING_NODES],
                to: &[ECS_SERVING, BEDROCK_MODELS],
            },
            Self::Control => Route {
                from: &[CLOUDWATCH_MONITORING],
                to: &[SAGEMAKER_TRAINING, EC2_TRAINING_NODES],
            },
            Self::Checkpoint => Route {
                from: &[SAGEMAKER_TRAINING, EC2_TRAINING_NODES],
                to: &[S3_DATALAKE],
            },
            Self::Monitor => Route {
                from: &[SAGEMAKER_TRAINING, EC2_TRAINING_NODES, ECS_SERVING],
                to: &[CLOUDWATCH_MONITORING],
            },
            Self::Inference => Route {
                from: &[ECS_SERVING, BEDROCK_MODELS],
                to: &[LAMBDA_PREPROCESSING],
            },
            Self::Preprocess => Route {
                from: &[LAMBDA_PREPROCESSING],
                to: &[SAGEMAKER_TRAINING, EC2_TRAINING_NODES],
            },
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown flow kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown flow kind: {0}")]
pub struct UnknownFlowKind(pub String);

impl FromStr for FlowKind {
    type Err = UnknownFlowKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownFlowKind(s.to_owned()))
    }
}

/// A live animated edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flow {
    pub id: FlowId,
    pub kind: FlowKind,
    pub from: EntityId,
    pub to: EntityId,
    /// Position of the lead particle along the edge, in `[0, 1)`.
    pub progress: f64,
    /// Progress added per tick before the global speed multiplier.
    pub speed: f64,
    pub particles: usize,
    /// Engine clock time at emission, in milliseconds.
    pub born_ms: f64,
}

impl Flow {
    /// A fresh flow using the kind's speed and particle count.
    #[must_use]
    pub fn new(kind: FlowKind, from: impl Into<EntityId>, to: impl Into<EntityId>, born_ms: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            from: from.into(),
            to: to.into(),
            progress: 0.0,
            speed: kind.speed(),
            particles: kind.particle_count(),
            born_ms,
        }
    }

    /// Whether `id` is either endpoint.
    #[must_use]
    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }

    /// Milliseconds since emission.
    #[must_use]
    pub fn age(&self, now_ms: f64) -> f64 {
        now_ms - self.born_ms
    }

    /// Progress of each particle along the edge, lead particle first.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn particle_offsets(&self) -> Vec<f64> {
        (0..self.particles)
            .map(|i| (self.progress + i as f64 * PARTICLE_SPACING) % 1.0)
            .collect()
    }
}

/// Resolve explicit endpoints: both must exist and differ.
#[must_use]
pub fn resolve_explicit(registry: &EntityRegistry, from: &str, to: &str) -> Option<(EntityId, EntityId)> {
    if from == to || !registry.contains(from) || !registry.contains(to) {
        return None;
    }
    Some((from.to_owned(), to.to_owned()))
}

/// Pick endpoints for `kind` from the routing table, falling back to any two
/// distinct registry entities.
///
/// Draw order from `rng`: one index into the live source set, one into the
/// live destination set; on fallback, one index into the registry and one
/// into the registry minus that first pick.
pub fn resolve_endpoints<R>(kind: FlowKind, registry: &EntityRegistry, rng: &mut R) -> Option<(EntityId, EntityId)>
where
    R: RandomSource + ?Sized,
{
    let route = kind.route();
    let sources: Vec<&str> = route.from.iter().copied().filter(|id| registry.contains(id)).collect();
    let targets: Vec<&str> = route.to.iter().copied().filter(|id| registry.contains(id)).collect();

    if !sources.is_empty() && !targets.is_empty() {
        let from = sources[rng.index(sources.len())];
        let to = targets[rng.index(targets.len())];
        if from != to {
            return Some((from.to_owned(), to.to_owned()));
        }
    }

    random_pair(registry, rng)
}

/// Two distinct entities chosen uniformly from the whole registry.
fn random_pair<R>(registry: &EntityRegistry, rng: &mut R) -> Option<(EntityId, EntityId)>
where
    R: RandomSource + ?Sized,
{
    let n = registry.len();
    if n < 2 {
        return None;
    }
    let first = rng.index(n);
    let mut second = rng.index(n - 1);
    if second >= first {
        second += 1;
    }
    let from = registry.at(first)?;
    let to = registry.at(second)?;
    Some((from.id.clone(), to.id.clone()))
}

/// The collection of live flows.
#[derive(Debug, Clone, Default)]
pub struct FlowLayer {
    pub(crate) flows: Vec<Flow>,
}

impl FlowLayer {
    #[must_use]
    pub fn new() -> Self {
        Self { flows: Vec::new() }
    }

    /// Emit a flow of `kind`.
    ///
    /// With both `from` and `to` given, they are looked up directly and the
    /// call is a no-op if either is missing. Otherwise endpoints come from
    /// [`resolve_endpoints`]. On success the endpoints' activity is bumped.
    pub fn emit<R>(
        &mut self,
        kind: FlowKind,
        from: Option<&str>,
        to: Option<&str>,
        registry: &mut EntityRegistry,
        rng: &mut R,
        now_ms: f64,
    ) -> Option<FlowId>
    where
        R: RandomSource + ?Sized,
    {
        let resolved = match (from, to) {
            (Some(from), Some(to)) => resolve_explicit(registry, from, to),
            _ => resolve_endpoints(kind, registry, rng),
        };
        let Some((from, to)) = resolved else {
            tracing::debug!(%kind, ?from, ?to, "flow emission skipped: endpoints unresolved");
            return None;
        };

        if let Some(source) = registry.get_mut(&from) {
            source.bump_activity(SOURCE_ACTIVITY_BUMP);
        }
        if let Some(dest) = registry.get_mut(&to) {
            dest.bump_activity(DEST_ACTIVITY_BUMP);
        }

        let flow = Flow::new(kind, from, to, now_ms);
        let id = flow.id;
        tracing::debug!(%kind, from = %flow.from, to = %flow.to, "flow emitted");
        self.flows.push(flow);
        Some(id)
    }

    /// Advance every resolvable flow by `speed * multiplier`.
    ///
    /// A flow reaching `1.0` wraps to `0` and bumps its destination's activity
    /// once. Returns the destinations bumped this tick, in flow order.
    pub fn advance(&mut self, multiplier: f64, registry: &mut EntityRegistry) -> Vec<EntityId> {
        let mut bumped = Vec::new();
        for flow in &mut self.flows {
            if !registry.contains(&flow.from) {
                continue;
            }
            let Some(dest) = registry.get_mut(&flow.to) else {
                continue;
            };
            flow.progress += flow.speed * multiplier;
            if flow.progress >= 1.0 {
                flow.progress = 0.0;
                dest.bump_activity(DEST_ACTIVITY_BUMP);
                bumped.push(flow.to.clone());
            }
        }
        bumped
    }

    /// Drop flows whose age has reached `lifetime_ms`. Returns how many were removed.
    pub fn expire(&mut self, now_ms: f64, lifetime_ms: f64) -> usize {
        let before = self.flows.len();
        self.flows.retain(|f| f.age(now_ms) < lifetime_ms);
        before - self.flows.len()
    }

    pub fn clear(&mut self) {
        self.flows.clear();
    }

    #[must_use]
    pub fn get(&self, id: &FlowId) -> Option<&Flow> {
        self.flows.iter().find(|f| f.id == *id)
    }

    /// Number of live flows touching `entity_id`.
    #[must_use]
    pub fn connections(&self, entity_id: &str) -> usize {
        self.flows.iter().filter(|f| f.touches(entity_id)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flow> {
        self.flows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

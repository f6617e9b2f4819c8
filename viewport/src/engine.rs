use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::EngineConfig;
use crate::consts::{
    EMIT_UTILIZATION_BUMP, FAILURE_RECOVERY_MS, FAILURE_RELIABILITY_DROP, FAILURE_RELIABILITY_FLOOR, INDICATOR_OFFSET_X,
    INDICATOR_OFFSET_Y, PREPROCESS_UTILIZATION_BUMP, PREPROCESS_UTILIZATION_CAP, RECOVERY_RELIABILITY_CEILING,
    RECOVERY_RELIABILITY_GAIN, RECOVERY_UTILIZATION_BASE, RECOVERY_UTILIZATION_SPREAD, TOOLTIP_MIN_TOP,
    TOOLTIP_OFFSET_X, TOOLTIP_OFFSET_Y, TOOLTIP_WIDTH, TRAINING_COMPLETE, TRAINING_PROGRESS_STEP,
    TRAINING_UTILIZATION_BUMP, TRAINING_UTILIZATION_CAP, UTILIZATION_MAX,
};
use crate::flow::{FlowId, FlowKind, FlowLayer};
use crate::hit;
use crate::input::{Indicator, InputState, Overlay, PointerEvent, UiState};
use crate::pointer::{Point, SurfaceRect, to_local};
use crate::preset::{
    self, BEDROCK_MODELS, CLOUDWATCH_MONITORING, EC2_TRAINING_NODES, ECS_SERVING, LAMBDA_PREPROCESSING, S3_DATALAKE,
    SAGEMAKER_TRAINING, SCALE_PREFIX,
};
use crate::registry::{Entity, EntityId, EntityRegistry};
use crate::render;
use crate::rng::{RandomSource, RngSource};
use crate::scene::{Scene, Tooltip};
use crate::schedule::{Job, Scheduler, pick_ambient_kind};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
///
/// Serialized as `{"type": "...", "data": ...}` for the browser host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Action {
    ShowTooltip { tooltip: Tooltip, at: Point },
    HideTooltip,
    ShowIndicator { text: String, at: Point },
    MoveIndicator { at: Point },
    HideIndicator,
    EntityMoved { id: EntityId, x: f64, y: f64 },
    SetCursor(String),
    RenderNeeded,
}

/// A failed service waiting for its automatic recovery.
#[derive(Debug, Clone, PartialEq)]
struct Recovery {
    id: EntityId,
    due_ms: f64,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub registry: EntityRegistry,
    pub flows: FlowLayer,
    pub input: InputState,
    pub ui: UiState,
    pub config: EngineConfig,
    pub scheduler: Scheduler,
    /// Drag bound on the x axis, in CSS pixels.
    pub viewport_width: f64,
    /// Drag bound on the y axis, in CSS pixels.
    pub viewport_height: f64,
    pub dpr: f64,
    pub paused: bool,
    pub training: bool,
    /// Training run completion in percent; the run ends at 100.
    pub training_progress: f64,
    /// Global animation speed multiplier.
    pub speed: f64,
    now_ms: f64,
    instance_seq: u64,
    recoveries: Vec<Recovery>,
    rng: Box<dyn RandomSource>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty engine seeded from `config.seed`.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let rng = Box::new(RngSource::seeded(config.seed));
        Self::with_rng(config, rng)
    }

    /// An empty engine drawing randomness from `rng`.
    #[must_use]
    pub fn with_rng(config: EngineConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            registry: EntityRegistry::new(),
            flows: FlowLayer::new(),
            input: InputState::default(),
            ui: UiState::default(),
            scheduler: Scheduler::from_config(&config),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            paused: false,
            training: false,
            training_progress: 0.0,
            speed: config.speed,
            now_ms: 0.0,
            instance_seq: 0,
            recoveries: Vec::new(),
            rng,
            config,
        }
    }

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width: f64, height: f64, dpr: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.dpr = dpr;
    }

    // --- Pointer input ---

    /// Single entry point for pointer events.
    pub fn handle(&mut self, event: PointerEvent) -> Vec<Action> {
        match event {
            PointerEvent::Down { x, y } => self.on_pointer_down(Point::new(x, y)),
            PointerEvent::Move { x, y } => self.on_pointer_move(Point::new(x, y)),
            PointerEvent::Up => self.on_pointer_up(),
            PointerEvent::Leave => self.on_pointer_leave(),
        }
    }

    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        if let Some(target) = self.input.target() {
            tracing::debug!(%target, "press ignored: drag already active");
            return Vec::new();
        }
        let Some(entity) = hit::entity_at(pt, &self.registry) else {
            return Vec::new();
        };

        let id = entity.id.clone();
        let text = format!("Moving: {}", entity.name);
        let at = indicator_anchor(pt);
        tracing::debug!(%id, "drag started");

        self.input = InputState::Dragging { id: id.clone(), last: pt };
        self.ui.dragging_id = Some(id);
        self.ui.hover = None;
        self.ui.indicator = Some(Indicator { text: text.clone(), anchor: at });

        vec![
            Action::HideTooltip,
            Action::SetCursor("grabbing".into()),
            Action::ShowIndicator { text, at },
            Action::RenderNeeded,
        ]
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        if let InputState::Dragging { id, last } = &mut self.input {
            let (dx, dy) = pt.delta_from(*last);
            // Track the raw pointer, not the clamped entity, so slack builds up
            // past the boundary until the pointer comes back.
            *last = pt;

            let at = indicator_anchor(pt);
            if let Some(indicator) = self.ui.indicator.as_mut() {
                indicator.anchor = at;
            }
            let mut actions = vec![Action::MoveIndicator { at }];

            let Some(entity) = self.registry.get_mut(id.as_str()) else {
                tracing::debug!(%id, "drag target no longer exists");
                return actions;
            };
            let margin = self.config.drag_margin;
            entity.x = clamp_axis(entity.x + dx, entity.base_radius, margin, self.viewport_width);
            entity.y = clamp_axis(entity.y + dy, entity.base_radius, margin, self.viewport_height);

            actions.push(Action::EntityMoved { id: entity.id.clone(), x: entity.x, y: entity.y });
            actions.push(Action::RenderNeeded);
            return actions;
        }

        match hit::entity_at(pt, &self.registry) {
            Some(entity) => {
                let at = tooltip_anchor(pt, self.viewport_width);
                let tooltip = Tooltip::for_entity(entity, &self.flows);
                self.ui.hover = Some(Overlay { entity_id: entity.id.clone(), anchor: at });
                vec![Action::ShowTooltip { tooltip, at }]
            }
            None => {
                if self.ui.hover.take().is_some() {
                    vec![Action::HideTooltip]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        if !self.input.is_dragging() {
            return Vec::new();
        }
        self.end_drag();
        vec![
            Action::HideIndicator,
            Action::SetCursor("default".into()),
            Action::RenderNeeded,
        ]
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.ui.hover = None;
        let mut actions = vec![Action::HideTooltip];
        actions.extend(self.on_pointer_up());
        actions
    }

    fn end_drag(&mut self) {
        if let Some(id) = self.input.target() {
            tracing::debug!(%id, "drag ended");
        }
        self.input = InputState::Idle;
        self.ui.dragging_id = None;
        self.ui.indicator = None;
    }

    // --- Time ---

    /// Advance the engine clock by `elapsed_ms` and run one animation step.
    ///
    /// Flow expiry, service recovery and scheduled jobs follow the clock even
    /// while paused; only the entity animation, flow advance and training
    /// progress are skipped.
    pub fn tick(&mut self, elapsed_ms: f64) -> Scene {
        let elapsed = if elapsed_ms.is_finite() && elapsed_ms > 0.0 { elapsed_ms } else { 0.0 };
        self.now_ms += elapsed;

        let expired = self.flows.expire(self.now_ms, self.config.flow_lifetime_ms);
        if expired > 0 {
            tracing::trace!(expired, "flows expired");
        }
        self.recover_due();

        for job in self.scheduler.on_tick(elapsed) {
            self.run_job(job);
        }

        if !self.paused {
            for entity in self.registry.iter_mut() {
                entity.animate(self.speed);
            }
            self.flows.advance(self.speed, &mut self.registry);
            self.advance_training();
        }

        self.scene()
    }

    fn advance_training(&mut self) {
        if !self.training {
            return;
        }
        self.training_progress += TRAINING_PROGRESS_STEP * self.speed;
        if self.training_progress >= TRAINING_COMPLETE {
            self.training_progress = TRAINING_COMPLETE;
            self.training = false;
            tracing::info!("training run complete");
        }
    }

    fn recover_due(&mut self) {
        let now = self.now_ms;
        let (due, pending): (Vec<Recovery>, Vec<Recovery>) =
            self.recoveries.drain(..).partition(|r| r.due_ms <= now);
        self.recoveries = pending;

        for recovery in due {
            let Some(entity) = self.registry.get_mut(&recovery.id) else {
                tracing::debug!(id = %recovery.id, "recovery skipped: entity removed");
                continue;
            };
            let reliability =
                (entity.props().reliability() + RECOVERY_RELIABILITY_GAIN).min(RECOVERY_RELIABILITY_CEILING);
            let utilization = self.rng.span(RECOVERY_UTILIZATION_BASE, RECOVERY_UTILIZATION_SPREAD);
            entity.set_prop("health", "Healthy");
            entity.set_prop("reliability", reliability);
            entity.set_prop("utilization", utilization);
            tracing::info!(id = %recovery.id, reliability, "service recovered");
        }
    }

    fn run_job(&mut self, job: Job) {
        match job {
            Job::AmbientFlow => {
                if self.paused || self.rng.unit() >= self.config.ambient_probability {
                    return;
                }
                if let Some(kind) = pick_ambient_kind(self.rng.as_mut()) {
                    self.emit_flow(kind, None, None);
                }
            }
            Job::Checkpoint => {
                if !self.training || self.rng.unit() >= self.config.checkpoint_probability {
                    return;
                }
                self.emit_pairs(&[
                    (FlowKind::Checkpoint, SAGEMAKER_TRAINING, S3_DATALAKE),
                    (FlowKind::Checkpoint, EC2_TRAINING_NODES, S3_DATALAKE),
                ]);
            }
        }
    }

    // --- Flows ---

    /// Emit a flow. Explicit endpoints must both resolve; omitted endpoints
    /// are routed by kind. Returns `None` (and changes nothing) on failure.
    ///
    /// A successful emission also loads the source service a little.
    pub fn emit_flow(&mut self, kind: FlowKind, from: Option<&str>, to: Option<&str>) -> Option<FlowId> {
        let id = self
            .flows
            .emit(kind, from, to, &mut self.registry, self.rng.as_mut(), self.now_ms)?;
        if let Some(source) = self.flows.get(&id).map(|f| f.from.clone()) {
            let bump = self.rng.unit() * EMIT_UTILIZATION_BUMP;
            self.raise_utilization(&source, bump, UTILIZATION_MAX);
        }
        Some(id)
    }

    fn emit_pairs(&mut self, pairs: &[(FlowKind, &str, &str)]) -> usize {
        pairs
            .iter()
            .filter_map(|&(kind, from, to)| self.emit_flow(kind, Some(from), Some(to)))
            .count()
    }

    pub fn clear_flows(&mut self) {
        self.flows.clear();
    }

    /// Add `amount` to an entity's utilization, saturating at `cap`.
    fn raise_utilization(&mut self, id: &str, amount: f64, cap: f64) {
        if let Some(entity) = self.registry.get_mut(id) {
            let raised = (entity.props().utilization() + amount).min(cap);
            entity.set_prop("utilization", raised);
        }
    }

    // --- Architecture ---

    /// Replace the registry with the built-in architecture laid out for the
    /// current viewport.
    pub fn load_default_architecture(&mut self) {
        self.registry
            .load_snapshot(preset::default_architecture(self.viewport_width, self.viewport_height));
        tracing::info!(entities = self.registry.len(), "default architecture loaded");
    }

    pub fn add_entity(&mut self, entity: Entity) {
        tracing::info!(id = %entity.id, "entity added");
        self.registry.insert(entity);
    }

    /// Remove an entity. Flows naming it are left to expire; an active drag on
    /// it stays open until release.
    pub fn remove_entity(&mut self, id: &str) -> Option<Entity> {
        let removed = self.registry.remove(id);
        if removed.is_some() {
            tracing::info!(%id, "entity removed");
            if self.ui.hover.as_ref().is_some_and(|h| h.entity_id == id) {
                self.ui.hover = None;
            }
        } else {
            tracing::debug!(%id, "remove skipped: unknown entity");
        }
        removed
    }

    /// Add an on-demand training instance and signal it from monitoring.
    pub fn scale_out(&mut self) -> EntityId {
        self.instance_seq += 1;
        let x = self.rng.span(200.0, 400.0);
        let y = self.rng.span(200.0, 300.0);
        let entity = preset::scale_instance(self.instance_seq, x, y);
        let id = entity.id.clone();
        self.add_entity(entity);
        self.emit_flow(FlowKind::Control, Some(CLOUDWATCH_MONITORING), Some(id.as_str()));
        id
    }

    /// Remove the oldest scale-out instance, if any.
    pub fn scale_in(&mut self) -> Option<Entity> {
        let id = self
            .registry
            .iter()
            .find(|e| e.id.starts_with(SCALE_PREFIX))?
            .id
            .clone();
        self.remove_entity(&id)
    }

    pub fn add_spot_instance(&mut self) -> EntityId {
        self.instance_seq += 1;
        let x = self.rng.span(300.0, 200.0);
        let y = self.rng.span(150.0, 200.0);
        let entity = preset::spot_instance(self.instance_seq, x, y);
        let id = entity.id.clone();
        self.add_entity(entity);
        id
    }

    /// Emit a monitoring flow from every entity to the monitor.
    pub fn run_health_check(&mut self) -> usize {
        let ids: Vec<EntityId> = self.registry.iter().map(|e| e.id.clone()).collect();
        ids.iter()
            .filter_map(|id| self.emit_flow(FlowKind::Monitor, Some(id.as_str()), Some(CLOUDWATCH_MONITORING)))
            .count()
    }

    /// Knock a random service offline. It recovers on its own after
    /// [`FAILURE_RECOVERY_MS`] of engine time. Returns the failed id.
    pub fn simulate_failure(&mut self) -> Option<EntityId> {
        if self.registry.is_empty() {
            tracing::debug!("failure skipped: no services");
            return None;
        }
        let index = self.rng.index(self.registry.len());
        let id = self.registry.at(index)?.id.clone();
        let entity = self.registry.get_mut(&id)?;
        let reliability = (entity.props().reliability() - FAILURE_RELIABILITY_DROP).max(FAILURE_RELIABILITY_FLOOR);
        entity.set_prop("health", "Critical");
        entity.set_prop("reliability", reliability);
        entity.set_prop("utilization", 0.0);

        let due_ms = self.now_ms + FAILURE_RECOVERY_MS;
        self.recoveries.push(Recovery { id: id.clone(), due_ms });
        tracing::warn!(%id, reliability, due_ms, "service failure simulated");
        Some(id)
    }

    /// Switch the training cluster to `instance_type` and reprice it.
    /// Returns the new hourly cost, or `None` without a training cluster.
    pub fn update_instance_type(&mut self, instance_type: &str) -> Option<f64> {
        let Some(entity) = self.registry.get_mut(EC2_TRAINING_NODES) else {
            tracing::debug!(instance_type, "instance type update skipped: no training cluster");
            return None;
        };
        let cost = preset::instance_cost(instance_type);
        entity.set_prop("instance_type", instance_type);
        entity.set_prop("cost_per_hour", cost);
        tracing::info!(instance_type, cost, "training instance type updated");
        Some(cost)
    }

    /// Clear everything and reload the built-in architecture. Pause state is kept.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.flows.clear();
        self.recoveries.clear();
        self.input = InputState::Idle;
        self.ui = UiState::default();
        self.training = false;
        self.training_progress = 0.0;
        self.scheduler.reset();
        self.load_default_architecture();
    }

    // --- Controls ---

    /// Flip the pause flag and return the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Set the global speed multiplier. Negative values clamp to zero;
    /// non-finite values are ignored.
    pub fn set_speed(&mut self, multiplier: f64) {
        if multiplier.is_finite() {
            self.speed = multiplier.max(0.0);
        }
    }

    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    // --- Scenarios ---

    /// Begin a fresh training run.
    pub fn start_training(&mut self) -> usize {
        self.training = true;
        self.training_progress = 0.0;
        let emitted = self.emit_pairs(&[
            (FlowKind::Transfer, S3_DATALAKE, SAGEMAKER_TRAINING),
            (FlowKind::Transfer, S3_DATALAKE, EC2_TRAINING_NODES),
            (FlowKind::Preprocess, LAMBDA_PREPROCESSING, SAGEMAKER_TRAINING),
        ]);
        for id in [SAGEMAKER_TRAINING, EC2_TRAINING_NODES] {
            if let Some(entity) = self.registry.get_mut(id) {
                entity.activity = 1.0;
            }
            self.raise_utilization(id, TRAINING_UTILIZATION_BUMP, TRAINING_UTILIZATION_CAP);
        }
        emitted
    }

    /// Stop training after saving a checkpoint.
    pub fn pause_training(&mut self) -> usize {
        self.training = false;
        self.emit_pairs(&[(FlowKind::Checkpoint, SAGEMAKER_TRAINING, S3_DATALAKE)])
    }

    /// End the run and discard its progress.
    pub fn stop_training(&mut self) -> usize {
        self.training = false;
        self.training_progress = 0.0;
        self.emit_pairs(&[
            (FlowKind::Sync, SAGEMAKER_TRAINING, S3_DATALAKE),
            (FlowKind::Sync, EC2_TRAINING_NODES, BEDROCK_MODELS),
        ])
    }

    pub fn trigger_checkpoint(&mut self) -> usize {
        self.emit_pairs(&[
            (FlowKind::Checkpoint, SAGEMAKER_TRAINING, S3_DATALAKE),
            (FlowKind::Checkpoint, EC2_TRAINING_NODES, S3_DATALAKE),
        ])
    }

    pub fn trigger_data_ingestion(&mut self) -> usize {
        self.emit_pairs(&[
            (FlowKind::Transfer, S3_DATALAKE, LAMBDA_PREPROCESSING),
            (FlowKind::Preprocess, LAMBDA_PREPROCESSING, SAGEMAKER_TRAINING),
        ])
    }

    pub fn trigger_preprocessing(&mut self) -> usize {
        let emitted = self.emit_pairs(&[
            (FlowKind::Preprocess, LAMBDA_PREPROCESSING, SAGEMAKER_TRAINING),
            (FlowKind::Preprocess, LAMBDA_PREPROCESSING, EC2_TRAINING_NODES),
        ]);
        if let Some(lambda) = self.registry.get_mut(LAMBDA_PREPROCESSING) {
            lambda.activity = 1.0;
        }
        self.raise_utilization(LAMBDA_PREPROCESSING, PREPROCESS_UTILIZATION_BUMP, PREPROCESS_UTILIZATION_CAP);
        emitted
    }

    /// Run the serving model against the foundation model on fresh data.
    pub fn validate_model(&mut self) -> usize {
        self.emit_pairs(&[
            (FlowKind::Inference, ECS_SERVING, BEDROCK_MODELS),
            (FlowKind::Transfer, S3_DATALAKE, ECS_SERVING),
        ])
    }

    /// Have monitoring inspect the lake and steer preprocessing.
    pub fn trigger_data_validation(&mut self) -> usize {
        self.emit_pairs(&[
            (FlowKind::Monitor, S3_DATALAKE, CLOUDWATCH_MONITORING),
            (FlowKind::Control, CLOUDWATCH_MONITORING, LAMBDA_PREPROCESSING),
        ])
    }

    pub fn trigger_failover(&mut self) -> usize {
        self.emit_pairs(&[
            (FlowKind::Sync, SAGEMAKER_TRAINING, ECS_SERVING),
            (FlowKind::Transfer, S3_DATALAKE, EC2_TRAINING_NODES),
        ])
    }

    // --- Queries ---

    #[must_use]
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.registry.get(id)
    }

    /// Id of the entity currently being dragged.
    #[must_use]
    pub fn dragging(&self) -> Option<&str> {
        self.input.target()
    }

    /// Engine clock in milliseconds since construction.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    #[must_use]
    pub fn tooltip(&self, id: &str) -> Option<Tooltip> {
        self.registry.get(id).map(|e| Tooltip::for_entity(e, &self.flows))
    }

    #[must_use]
    pub fn scene(&self) -> Scene {
        Scene::capture(
            &self.registry,
            &self.flows,
            &self.ui,
            self.paused,
            self.training,
            self.training_progress,
            self.now_ms,
        )
    }
}

/// Clamp one coordinate so a circle of `radius` stays `margin` inside `[0, bound]`.
///
/// When the bound is too small to fit the circle, the low edge wins.
#[must_use]
pub fn clamp_axis(value: f64, radius: f64, margin: f64, bound: f64) -> f64 {
    let lo = radius + margin;
    let hi = bound - radius - margin;
    lo.max(hi.min(value))
}

fn indicator_anchor(pt: Point) -> Point {
    pt.offset(INDICATOR_OFFSET_X, INDICATOR_OFFSET_Y)
}

fn tooltip_anchor(pt: Point, viewport_width: f64) -> Point {
    Point::new(
        (pt.x + TOOLTIP_OFFSET_X).min(viewport_width - TOOLTIP_WIDTH),
        (pt.y + TOOLTIP_OFFSET_Y).max(TOOLTIP_MIN_TOP),
    )
}

/// The full viewport engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to `canvas`, seeded from `Math.random()`.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let seed = (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64;
        Self::with_config(canvas, EngineConfig { seed, ..EngineConfig::default() })
    }

    #[must_use]
    pub fn with_config(canvas: HtmlCanvasElement, config: EngineConfig) -> Self {
        Self { canvas, core: EngineCore::with_config(config) }
    }

    // --- Viewport ---

    /// Resize the backing store to `css * dpr` and update the drag bounds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.canvas.set_width((width_css * dpr).round() as u32);
        self.canvas.set_height((height_css * dpr).round() as u32);
        self.core.set_viewport(width_css, height_css, dpr);
    }

    /// Current on-screen placement of the canvas. Read fresh on every call.
    #[must_use]
    pub fn surface(&self) -> SurfaceRect {
        let rect = self.canvas.get_bounding_client_rect();
        SurfaceRect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn local(&self, client_x: f64, client_y: f64) -> Point {
        to_local(Point::new(client_x, client_y), self.surface())
    }

    // --- Input events (client coordinates) ---

    pub fn on_pointer_down(&mut self, client_x: f64, client_y: f64) -> Vec<Action> {
        let pt = self.local(client_x, client_y);
        self.core.handle(PointerEvent::Down { x: pt.x, y: pt.y })
    }

    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64) -> Vec<Action> {
        let pt = self.local(client_x, client_y);
        self.core.handle(PointerEvent::Move { x: pt.x, y: pt.y })
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.core.handle(PointerEvent::Up)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.handle(PointerEvent::Leave)
    }

    // --- Frame ---

    /// Advance by `elapsed_ms`, draw, and return the scene for the host overlay.
    pub fn frame(&mut self, elapsed_ms: f64) -> Scene {
        let scene = self.core.tick(elapsed_ms);
        self.draw(&scene);
        scene
    }

    /// Draw the current state without advancing time.
    pub fn render(&self) {
        self.draw(&self.core.scene());
    }

    fn draw(&self, scene: &Scene) {
        let ctx = match self.context() {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::warn!(?err, "2d context unavailable");
                return;
            }
        };
        if let Err(err) = render::draw(&ctx, scene, self.core.viewport_width, self.core.viewport_height, self.core.dpr)
        {
            tracing::warn!(?err, "render failed");
        }
    }

    fn context(&self) -> Result<CanvasRenderingContext2d, JsValue> {
        self.canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn dragging(&self) -> Option<&str> {
        self.core.dragging()
    }
}

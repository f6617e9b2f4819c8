//! Browser entry point.
//!
//! [`Viewport`] is the `#[wasm_bindgen]` handle a page creates for its canvas.
//! It owns an [`Engine`], attaches the mouse listeners that feed it, and runs a
//! `requestAnimationFrame` loop that ticks and draws. Control-panel buttons
//! call the exported scenario methods directly.
//!
//! Pointer actions are applied where the engine can (the cursor) and then
//! handed to an optional host callback as a JSON array, so the page can place
//! its tooltip and "moving" indicator overlays.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent};

use crate::config::EngineConfig;
use crate::engine::{Action, Engine};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// An attached DOM listener, detached again on drop.
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            tracing::warn!(event = self.event, ?err, "failed to detach listener");
        }
    }
}

/// Browser handle for one architecture viewport.
#[wasm_bindgen]
pub struct Viewport {
    engine: Rc<RefCell<Engine>>,
    canvas: HtmlCanvasElement,
    on_actions: Rc<RefCell<Option<js_sys::Function>>>,
    frame: FrameCallback,
    frame_handle: Rc<Cell<Option<i32>>>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl Viewport {
    /// Bind to `canvas`, size it to its on-screen box, load the default
    /// architecture and attach mouse listeners.
    ///
    /// `config_json` is an optional JSON engine config; without it the engine
    /// uses defaults and a random seed.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: Option<String>) -> Result<Viewport, JsValue> {
        let engine = match config_json {
            Some(raw) => {
                let config = EngineConfig::from_json(&raw).map_err(|err| JsValue::from_str(&err.to_string()))?;
                Engine::with_config(canvas.clone(), config)
            }
            None => Engine::new(canvas.clone()),
        };

        let mut viewport = Self {
            engine: Rc::new(RefCell::new(engine)),
            canvas,
            on_actions: Rc::new(RefCell::new(None)),
            frame: Rc::new(RefCell::new(None)),
            frame_handle: Rc::new(Cell::new(None)),
            listeners: Vec::new(),
        };
        viewport.resize();
        viewport.engine.borrow_mut().core.load_default_architecture();
        viewport.attach_listeners()?;
        viewport.render();
        tracing::info!("viewport attached");
        Ok(viewport)
    }

    /// Register `callback(actionsJson)` for pointer-driven UI actions.
    #[wasm_bindgen(js_name = onActions)]
    pub fn on_actions(&self, callback: js_sys::Function) {
        *self.on_actions.borrow_mut() = Some(callback);
    }

    /// Match the backing store and drag bounds to the canvas's on-screen box.
    pub fn resize(&mut self) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let mut engine = self.engine.borrow_mut();
        let surface = engine.surface();
        engine.set_viewport(surface.width, surface.height, dpr);
    }

    /// Draw the current state without advancing time.
    pub fn render(&self) {
        self.engine.borrow().render();
    }

    // --- Animation loop ---

    /// Start ticking and drawing on every animation frame.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.frame.borrow().is_some() {
            return Ok(());
        }
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        let engine = Rc::clone(&self.engine);
        let frame_for_cb = Rc::clone(&self.frame);
        let handle_for_cb = Rc::clone(&self.frame_handle);
        let window_for_cb = window.clone();
        let last_ts: Cell<Option<f64>> = Cell::new(None);
        let cb = Closure::wrap(Box::new(move |ts: f64| {
            let elapsed = last_ts.replace(Some(ts)).map_or(0.0, |prev| ts - prev);
            engine.borrow_mut().frame(elapsed);

            let next = frame_for_cb
                .borrow()
                .as_ref()
                .map(|cb| window_for_cb.request_animation_frame(cb.as_ref().unchecked_ref()));
            match next {
                Some(Ok(handle)) => handle_for_cb.set(Some(handle)),
                Some(Err(err)) => {
                    handle_for_cb.set(None);
                    tracing::warn!(?err, "animation frame request failed");
                }
                None => handle_for_cb.set(None),
            }
        }) as Box<dyn FnMut(f64)>);

        let handle = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        self.frame_handle.set(Some(handle));
        *self.frame.borrow_mut() = Some(cb);
        tracing::debug!("animation loop started");
        Ok(())
    }

    /// Stop the animation loop. State is kept; `start` resumes it.
    pub fn stop(&mut self) {
        if let Some(handle) = self.frame_handle.take() {
            if let Some(window) = web_sys::window() {
                if let Err(err) = window.cancel_animation_frame(handle) {
                    tracing::warn!(?err, "failed to cancel animation frame");
                }
            }
        }
        if self.frame.borrow_mut().take().is_some() {
            tracing::debug!("animation loop stopped");
        }
    }

    // --- Controls ---

    #[wasm_bindgen(js_name = startTraining)]
    pub fn start_training(&self) -> usize {
        self.engine.borrow_mut().core.start_training()
    }

    #[wasm_bindgen(js_name = pauseTraining)]
    pub fn pause_training(&self) -> usize {
        self.engine.borrow_mut().core.pause_training()
    }

    #[wasm_bindgen(js_name = stopTraining)]
    pub fn stop_training(&self) -> usize {
        self.engine.borrow_mut().core.stop_training()
    }

    #[wasm_bindgen(js_name = triggerCheckpoint)]
    pub fn trigger_checkpoint(&self) -> usize {
        self.engine.borrow_mut().core.trigger_checkpoint()
    }

    #[wasm_bindgen(js_name = triggerDataIngestion)]
    pub fn trigger_data_ingestion(&self) -> usize {
        self.engine.borrow_mut().core.trigger_data_ingestion()
    }

    #[wasm_bindgen(js_name = triggerPreprocessing)]
    pub fn trigger_preprocessing(&self) -> usize {
        self.engine.borrow_mut().core.trigger_preprocessing()
    }

    #[wasm_bindgen(js_name = triggerFailover)]
    pub fn trigger_failover(&self) -> usize {
        self.engine.borrow_mut().core.trigger_failover()
    }

    #[wasm_bindgen(js_name = validateModel)]
    pub fn validate_model(&self) -> usize {
        self.engine.borrow_mut().core.validate_model()
    }

    #[wasm_bindgen(js_name = triggerDataValidation)]
    pub fn trigger_data_validation(&self) -> usize {
        self.engine.borrow_mut().core.trigger_data_validation()
    }

    /// Id of the failed service, if any.
    #[wasm_bindgen(js_name = simulateFailure)]
    pub fn simulate_failure(&self) -> Option<String> {
        self.engine.borrow_mut().core.simulate_failure()
    }

    /// New hourly cost, if the training cluster exists.
    #[wasm_bindgen(js_name = updateInstanceType)]
    pub fn update_instance_type(&self, instance_type: &str) -> Option<f64> {
        self.engine.borrow_mut().core.update_instance_type(instance_type)
    }

    #[wasm_bindgen(js_name = runHealthCheck)]
    pub fn run_health_check(&self) -> usize {
        self.engine.borrow_mut().core.run_health_check()
    }

    #[wasm_bindgen(js_name = scaleOut)]
    pub fn scale_out(&self) -> String {
        self.engine.borrow_mut().core.scale_out()
    }

    #[wasm_bindgen(js_name = scaleIn)]
    pub fn scale_in(&self) -> Option<String> {
        self.engine.borrow_mut().core.scale_in().map(|e| e.id)
    }

    #[wasm_bindgen(js_name = addSpotInstance)]
    pub fn add_spot_instance(&self) -> String {
        self.engine.borrow_mut().core.add_spot_instance()
    }

    pub fn reset(&self) {
        self.engine.borrow_mut().core.reset();
    }

    /// Flip pause and return the new state.
    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&self) -> bool {
        self.engine.borrow_mut().core.toggle_pause()
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&self, multiplier: f64) {
        self.engine.borrow_mut().core.set_speed(multiplier);
    }

    // --- Queries ---

    /// Id of the entity being dragged.
    pub fn dragging(&self) -> Option<String> {
        self.engine.borrow().dragging().map(str::to_owned)
    }

    /// The current scene as JSON.
    #[wasm_bindgen(js_name = sceneJson)]
    pub fn scene_json(&self) -> Result<String, JsValue> {
        let scene = self.engine.borrow().core.scene();
        serde_json::to_string(&scene).map_err(|err| JsValue::from_str(&err.to_string()))
    }
}

impl Viewport {
    fn attach_listeners(&mut self) -> Result<(), JsValue> {
        let canvas: EventTarget = self.canvas.clone().unchecked_into();
        self.listen(&canvas, "mousedown", |engine, event| {
            event.prevent_default();
            engine.on_pointer_down(f64::from(event.client_x()), f64::from(event.client_y()))
        })?;
        self.listen(&canvas, "mousemove", |engine, event| {
            engine.on_pointer_move(f64::from(event.client_x()), f64::from(event.client_y()))
        })?;
        self.listen(&canvas, "mouseup", |engine, _| engine.on_pointer_up())?;
        self.listen(&canvas, "mouseleave", |engine, _| engine.on_pointer_leave())?;
        Ok(())
    }

    /// Attach a mouse listener that runs `handler` against the engine and
    /// dispatches the resulting actions.
    fn listen<F>(&mut self, target: &EventTarget, event: &'static str, handler: F) -> Result<(), JsValue>
    where
        F: Fn(&mut Engine, &MouseEvent) -> Vec<Action> + 'static,
    {
        let engine = Rc::clone(&self.engine);
        let on_actions = Rc::clone(&self.on_actions);
        let canvas = self.canvas.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |raw: Event| {
            let Some(mouse) = raw.dyn_ref::<MouseEvent>() else {
                return;
            };
            // Release the engine before calling out; the host may call back in.
            let actions = handler(&mut engine.borrow_mut(), mouse);
            dispatch(&canvas, &on_actions, &actions);
        });
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        self.listeners.push(Listener { target: target.clone(), event, callback });
        Ok(())
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        self.stop();
        self.listeners.clear();
    }
}

/// Apply cursor changes, then forward every action to the host callback.
fn dispatch(canvas: &HtmlCanvasElement, on_actions: &RefCell<Option<js_sys::Function>>, actions: &[Action]) {
    if actions.is_empty() {
        return;
    }
    for action in actions {
        if let Action::SetCursor(cursor) = action {
            if let Err(err) = canvas.style().set_property("cursor", cursor) {
                tracing::warn!(?err, "failed to set cursor");
            }
        }
    }

    let Some(callback) = on_actions.borrow().clone() else {
        return;
    };
    let payload = match serde_json::to_string(actions) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(%err, "failed to encode actions");
            return;
        }
    };
    if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
        tracing::warn!(?err, "action callback threw");
    }
}

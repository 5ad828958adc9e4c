// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod error;
pub mod utils;
pub mod ui;
pub mod assets;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Element, Event, HtmlCanvasElement, KeyboardEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::{input::wasm::keyboard_event_to_input, AnimationLoop, FrameScheduler, InputEvent, InputState, KeyBindings, UpdaterConfig};
#[cfg(target_arch = "wasm32")]
use error::AppError;
#[cfg(target_arch = "wasm32")]
use model::Camera;
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, GpuRenderer};

/// Id of the element the canvas is mounted into.
pub const MOUNT_ID: &str = "container";

#[cfg(target_arch = "wasm32")]
const FALLBACK_MESSAGE: &str = "Your browser supports neither WebGPU nor WebGL2, so the raft demo cannot run.";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();

    // Startup failures are reported here and never take the page down
    if let Err(e) = run_web().await {
        tracing::error!("raftwave did not start: {e}");
    }
    Ok(())
}

/// Mount the canvas, build the renderer and start the frame loop.
#[cfg(target_arch = "wasm32")]
async fn run_web() -> Result<(), AppError> {
    let window = web_sys::window().ok_or_else(|| AppError::Host("no global `window`".to_string()))?;
    let document = window.document().ok_or_else(|| AppError::Host("no document on window".to_string()))?;
    let container = document
        .get_element_by_id(MOUNT_ID)
        .ok_or_else(|| AppError::MountMissing(MOUNT_ID.to_string()))?;

    if !backend_available(&window, &document) {
        show_fallback(&document, &container)?;
        return Err(AppError::BackendUnavailable("neither WebGPU nor WebGL2 is available".to_string()));
    }

    let (width, height) = viewport_size(&window);
    let canvas = init_canvas(&document, &container, width, height)?;

    let gpu = match GpuContext::new(&canvas, width, height).await {
        Ok(gpu) => gpu,
        Err(e) => {
            container.remove_child(&canvas)?;
            show_fallback(&document, &container)?;
            return Err(AppError::BackendUnavailable(e.to_string()));
        }
    };

    let config = UpdaterConfig::from_query(&window.location().search().unwrap_or_default());
    let mut renderer = GpuRenderer::new(gpu);
    renderer.set_pixels_per_point(window.device_pixel_ratio() as f32);

    let mut anim = AnimationLoop::new(
        &config,
        Camera::new(width, height),
        renderer,
        Some(assets::load_raft(assets::RAFT_ASSET)),
    );

    let input_state = Rc::new(RefCell::new(InputState::new()));
    setup_input_listeners(&document, &window, input_state.clone(), KeyBindings::default())?;

    let window_for_loop = window.clone();
    RafScheduler::new(window).run(Box::new(move |now| {
        let (w, h) = viewport_size(&window_for_loop);
        if (w, h) != anim.renderer().size() {
            canvas.set_width(w);
            canvas.set_height(h);
            anim.resize(w, h);
        }

        let snapshot = *input_state.borrow();
        anim.tick(now, snapshot);
    }));

    Ok(())
}

/// WebGPU when `navigator.gpu` exists, otherwise a WebGL2 context on a scratch canvas.
#[cfg(target_arch = "wasm32")]
fn backend_available(window: &Window, document: &Document) -> bool {
    let navigator = window.navigator();
    let has_webgpu = js_sys::Reflect::get(&navigator, &JsValue::from_str("gpu"))
        .map(|gpu| !gpu.is_undefined() && !gpu.is_null())
        .unwrap_or(false);
    if has_webgpu {
        return true;
    }

    let has_webgl2 = document
        .create_element("canvas")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .and_then(|scratch| scratch.get_context("webgl2").ok().flatten())
        .is_some();
    tracing::info!("WebGPU unavailable, WebGL2 available: {has_webgl2}");
    has_webgl2
}

#[cfg(target_arch = "wasm32")]
fn show_fallback(document: &Document, container: &Element) -> Result<(), AppError> {
    let message = document.create_element("div")?;
    message.set_class_name("raftwave-fallback");
    message.set_text_content(Some(FALLBACK_MESSAGE));
    container.append_child(&message)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn viewport_size(window: &Window) -> (u32, u32) {
    let read = |v: Result<JsValue, JsValue>, fallback: f64| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
    let w = read(window.inner_width(), 800.0) as u32;
    let h = read(window.inner_height(), 600.0) as u32;
    (w.max(1), h.max(1))
}

#[cfg(target_arch = "wasm32")]
fn init_canvas(document: &Document, container: &Element, width: u32, height: u32) -> Result<HtmlCanvasElement, AppError> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| AppError::Host("failed to create canvas".to_string()))?;
    canvas.set_width(width);
    canvas.set_height(height);
    container.append_child(&canvas)?;
    Ok(canvas)
}

/// Keyboard and focus listeners feeding the shared input state
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    input_state: Rc<RefCell<InputState>>,
    bindings: KeyBindings,
) -> Result<(), AppError> {
    // Keyboard down / up
    for (kind, is_down) in [("keydown", true), ("keyup", false)] {
        let input_state = input_state.clone();
        let bindings = bindings.clone();
        let listener = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let event = keyboard_event_to_input(&e, is_down);
            input_state.borrow_mut().process_event(&event, &bindings);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        window.add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
        listener.forget();
    }

    // Focus loss - release all keys
    {
        let input_state = input_state.clone();
        let bindings = bindings.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().process_event(&InputEvent::FocusLost, &bindings);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change - release all keys
    {
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().process_event(&InputEvent::FocusLost, &bindings);
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    Ok(())
}

/// `requestAnimationFrame` loop that reschedules itself after every frame.
#[cfg(target_arch = "wasm32")]
struct RafScheduler {
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RafScheduler {
    fn new(window: Window) -> Self {
        Self { window }
    }
}

#[cfg(target_arch = "wasm32")]
impl FrameScheduler for RafScheduler {
    fn run(self, mut frame: Box<dyn FnMut(f64)>) {
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut(f64)>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp_ms: f64| {
            frame(timestamp_ms / 1000.0);

            // Recursively schedule next frame
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }
        }) as Box<dyn FnMut(f64)>));

        if let Some(cb) = callback.borrow().as_ref() {
            if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                tracing::error!("requestAnimationFrame start failed: {e:?}");
            }
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
    }
}

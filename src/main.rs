use std::sync::Arc;
use std::time::Instant;

use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::*,
    event_loop::EventLoop,
    window::Window,
};

// Import from the library crate
use raftwave::{assets, controller, error::AppError, logging, model, view};

use controller::input::native::key_event_to_input;
use controller::{AnimationLoop, InputEvent, InputState, KeyBindings, UpdaterConfig};
use model::Camera;
use view::{GpuContext, GpuRenderer};

struct App {
    window: Arc<Window>,
    anim: AnimationLoop<GpuRenderer>,
    input_state: InputState,
    bindings: KeyBindings,
    started: Instant,
}

impl App {
    async fn new(window: Arc<Window>) -> Result<Self, AppError> {
        let size = window.inner_size();

        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;
        let mut renderer = GpuRenderer::new(gpu);
        renderer.set_pixels_per_point(window.scale_factor() as f32);

        let config = UpdaterConfig::from_env();
        let anim = AnimationLoop::new(
            &config,
            Camera::new(size.width, size.height),
            renderer,
            Some(assets::load_raft(assets::RAFT_ASSET)),
        );

        Ok(Self {
            window,
            anim,
            input_state: InputState::new(),
            bindings: KeyBindings::default(),
            started: Instant::now(),
        })
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                if let Some(input) = key_event_to_input(*physical_key, *state) {
                    self.input_state.process_event(&input, &self.bindings);
                }
                true
            }
            // Keys released while unfocused never arrive
            WindowEvent::Focused(false) => {
                self.input_state.process_event(&InputEvent::FocusLost, &self.bindings);
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.anim.resize(new_size.width, new_size.height);
        }
    }

    fn redraw(&mut self) {
        let now = self.started.elapsed().as_secs_f64();
        self.anim.tick(now, self.input_state);
    }
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        tracing::error!("raftwave stopped: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("raftwave")
        .with_inner_size(LogicalSize::new(1280, 720));
    let window = event_loop
        .create_window(window_attributes)
        .map_err(|e| AppError::MountMissing(format!("native window ({e})")))?;
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window))?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
            if !app.input(event) {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(physical_size) => app.resize(*physical_size),
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        app.anim.renderer_mut().set_pixels_per_point(*scale_factor as f32);
                    }
                    WindowEvent::RedrawRequested => app.redraw(),
                    _ => {}
                }
            }
        }
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        _ => {}
    })?;

    Ok(())
}

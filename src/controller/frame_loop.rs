use crate::assets::AssetHandle;
use crate::controller::camera_follow::{CameraFollowState, CameraTrailer};
use crate::controller::config::UpdaterConfig;
use crate::controller::input::InputState;
use crate::controller::movement::MovementIntegrator;
use crate::controller::wave::{wave_phase, WaveParams};
use crate::error::RenderError;
use crate::model::{Camera, Raft, RaftSlot, Scene};

/// Anything that can draw the scene from a camera.
pub trait SceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError>;

    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Host primitive that calls `frame` once per display refresh with the
/// current time in seconds, for as long as the host keeps running.
pub trait FrameScheduler {
    fn run(self, frame: Box<dyn FnMut(f64)>);
}

/// Runs a fixed number of frames at a fixed rate, synchronously. For
/// headless runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedRateScheduler {
    pub frames: u64,
    pub rate_hz: f64,
}

impl FrameScheduler for FixedRateScheduler {
    fn run(self, mut frame: Box<dyn FnMut(f64)>) {
        for i in 0..self.frames {
            frame(i as f64 / self.rate_hz);
        }
    }
}

/// The per-frame update: movement, camera trailing, then waves.
pub struct FrameUpdater {
    movement: MovementIntegrator,
    follow: Option<(CameraTrailer, CameraFollowState)>,
    waves: Option<WaveParams>,
}

impl FrameUpdater {
    pub fn new(config: &UpdaterConfig, camera: &Camera) -> Self {
        Self {
            movement: MovementIntegrator::new(config.step, config.heading),
            follow: config
                .camera_follow
                .map(|trailer| (trailer, CameraFollowState::new(camera.eye))),
            waves: config.waves,
        }
    }

    pub fn follow_state(&self) -> Option<&CameraFollowState> {
        self.follow.as_ref().map(|(_, state)| state)
    }

    /// Advance one frame. `elapsed` is wall-clock seconds since the loop started.
    ///
    /// Movement and camera trailing are skipped while the raft is absent;
    /// the ocean keeps animating regardless.
    pub fn update(&mut self, input: &InputState, scene: &mut Scene, camera: &mut Camera, elapsed: f64) {
        if let Some(raft) = scene.raft_mut() {
            raft.pose = self.movement.integrate(input, raft.pose);

            if let Some((trailer, state)) = self.follow.as_mut() {
                trailer.apply(state, camera, raft.pose.position);
            }
        }

        if let (Some(waves), Some(ocean)) = (self.waves, scene.ocean.as_mut()) {
            waves.displace(ocean, wave_phase(elapsed));
        }
    }
}

/// Owns everything one running demo needs and advances it frame by frame.
pub struct AnimationLoop<R: SceneRenderer> {
    updater: FrameUpdater,
    scene: Scene,
    camera: Camera,
    renderer: R,
    pending: Option<AssetHandle>,
    start: Option<f64>,
    last: f64,
}

impl<R: SceneRenderer> AnimationLoop<R> {
    pub fn new(config: &UpdaterConfig, camera: Camera, renderer: R, asset: Option<AssetHandle>) -> Self {
        tracing::info!(
            "Starting {} variant: heading {:?}, follow camera {}, ocean {}",
            config.variant,
            config.heading,
            config.camera_follow.is_some(),
            config.waves.is_some()
        );

        Self {
            updater: FrameUpdater::new(config, &camera),
            scene: Scene::new(config.build_ocean()),
            camera,
            renderer,
            pending: asset,
            start: None,
            last: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn updater(&self) -> &FrameUpdater {
        &self.updater
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        self.renderer.resize(width, height);
    }

    /// One frame at host time `now` (seconds): attach a finished load,
    /// update, render.
    pub fn tick(&mut self, now: f64, input: InputState) {
        self.attach_loaded_asset();

        let start = *self.start.get_or_insert(now);
        let elapsed = (now - start).max(0.0);
        let dt = if self.scene.stats.frame == 0 { 0.0 } else { (now - self.last).max(0.0) };
        self.last = now;
        self.scene.stats.record(elapsed, dt);

        self.updater.update(&input, &mut self.scene, &mut self.camera, elapsed);

        if let Err(e) = self.renderer.render(&self.scene, &self.camera) {
            tracing::warn!("frame {} not rendered: {e}", self.scene.stats.frame);
        }

        // the renderer has seen this frame's heights
        if let Some(ocean) = self.scene.ocean.as_mut() {
            ocean.take_dirty();
        }
    }

    fn attach_loaded_asset(&mut self) {
        let Some(result) = self.pending.as_mut().and_then(AssetHandle::poll) else {
            return;
        };
        self.pending = None;

        match result {
            Ok(mesh) => {
                tracing::info!("Raft ready ({} vertices)", mesh.vertices.len());
                self.scene.raft = RaftSlot::Loaded(Raft::new(mesh));
            }
            Err(e) => {
                tracing::error!("Error loading the model: {e}");
                self.scene.raft = RaftSlot::Failed(e.to_string());
            }
        }
    }
}

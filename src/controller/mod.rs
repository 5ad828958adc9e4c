// CONTROLLER: Input, movement, camera trailing, waves and the update loop
pub mod input;
pub mod movement;
pub mod camera_follow;
pub mod wave;
pub mod config;
pub mod frame_loop;

pub use input::{Direction, InputEvent, InputState, KeyBindings};
pub use movement::{AngleLerp, HeadingPolicy, MovementIntegrator};
pub use camera_follow::{CameraFollowState, CameraTrailer};
pub use wave::WaveParams;
pub use config::{UpdaterConfig, Variant};
pub use frame_loop::{AnimationLoop, FixedRateScheduler, FrameScheduler, FrameUpdater, SceneRenderer};

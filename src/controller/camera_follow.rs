use glam::Vec3;

use crate::model::Camera;

pub const FOLLOW_OFFSET: Vec3 = Vec3::new(0.0, 5.0, 10.0);
pub const FOLLOW_BLEND: f32 = 0.1;

/// Accumulators of the follow filter, kept between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFollowState {
    pub desired: Vec3,
    pub current: Vec3,
}

impl CameraFollowState {
    /// Start the filter at wherever the camera was placed.
    pub fn new(start: Vec3) -> Self {
        Self { desired: start, current: start }
    }
}

/// One-pole low-pass filter that drags the camera behind a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTrailer {
    pub offset: Vec3,
    pub blend: f32,
}

impl Default for CameraTrailer {
    fn default() -> Self {
        Self { offset: FOLLOW_OFFSET, blend: FOLLOW_BLEND }
    }
}

impl CameraTrailer {
    pub fn step(&self, state: CameraFollowState, target: Vec3) -> CameraFollowState {
        let desired = target + self.offset;
        CameraFollowState {
            desired,
            current: state.current + (desired - state.current) * self.blend,
        }
    }

    /// Advance the filter and point the camera at `target`.
    pub fn apply(&self, state: &mut CameraFollowState, camera: &mut Camera, target: Vec3) {
        *state = self.step(*state, target);
        camera.eye = state.current;
        camera.look_at(target);
    }
}

use crate::model::{HeightField, Raft};

/// Lifecycle of the controlled object. Only `Loaded` has something to move;
/// the other two states are the normal "object absent" case.
#[derive(Debug, Clone)]
pub enum RaftSlot {
    Loading,
    Loaded(Raft),
    Failed(String),
}

/// Frame counters shown in the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub elapsed: f64,
    pub fps: f32,
    fps_frames: u32,
    fps_window: f64,
}

impl FrameStats {
    /// Count one frame that took `dt` seconds; FPS is averaged over one-second windows.
    pub fn record(&mut self, elapsed: f64, dt: f64) {
        self.frame += 1;
        self.elapsed = elapsed;
        self.fps_frames += 1;
        self.fps_window += dt;
        if self.fps_window >= 1.0 {
            self.fps = (self.fps_frames as f64 / self.fps_window) as f32;
            self.fps_frames = 0;
            self.fps_window = 0.0;
        }
    }
}

pub struct Scene {
    pub raft: RaftSlot,
    pub ocean: Option<HeightField>,
    pub stats: FrameStats,
}

impl Scene {
    pub fn new(ocean: Option<HeightField>) -> Self {
        Self {
            raft: RaftSlot::Loading,
            ocean,
            stats: FrameStats::default(),
        }
    }

    pub fn raft(&self) -> Option<&Raft> {
        match &self.raft {
            RaftSlot::Loaded(raft) => Some(raft),
            _ => None,
        }
    }

    pub fn raft_mut(&mut self) -> Option<&mut Raft> {
        match &mut self.raft {
            RaftSlot::Loaded(raft) => Some(raft),
            _ => None,
        }
    }
}

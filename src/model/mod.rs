// MODEL: Scene state owned by the frame loop
pub mod pose;
pub mod camera;
pub mod ocean;
pub mod scene;

pub use pose::{Pose, Raft};
pub use camera::Camera;
pub use ocean::HeightField;
pub use scene::{FrameStats, RaftSlot, Scene};

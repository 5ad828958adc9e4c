use glam::{Mat4, Quat, Vec3};

use crate::utils::Mesh;

/// Position plus yaw. No pitch or roll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub heading: f32,
}

impl Pose {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self { position, heading }
    }
}

/// The keyboard-controlled object.
#[derive(Debug, Clone)]
pub struct Raft {
    pub pose: Pose,
    pub scale: Vec3,
    pub mesh: Mesh,
}

impl Raft {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            pose: Pose::default(),
            scale: Vec3::ONE,
            mesh,
        }
    }

    /// Model matrix: translation * yaw * scale.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_y(self.pose.heading),
            self.pose.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_raft_sits_at_origin() {
        let raft = Raft::new(Mesh::empty());
        assert_eq!(raft.pose, Pose::default());
        assert_eq!(raft.scale, Vec3::ONE);
        assert_eq!(raft.transform(), Mat4::IDENTITY);
    }

    #[test]
    fn test_transform_applies_heading_then_translation() {
        let mut raft = Raft::new(Mesh::empty());
        raft.pose = Pose::new(Vec3::new(1.0, 0.0, 2.0), std::f32::consts::FRAC_PI_2);

        // +Z yawed by 90 degrees points along +X
        let p = raft.transform().transform_point3(Vec3::Z);
        assert_abs_diff_eq!(p.x, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.z, 2.0, epsilon = 1e-6);
    }
}

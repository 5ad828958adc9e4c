use glam::{Mat4, Vec3};

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, 10.0),
            target: Vec3::new(0.0, 3.0, 0.0),
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn look_at(&mut self, target: Vec3) { self.target = target; }

    pub fn forward(&self) -> Vec3 { (self.target - self.eye).normalize_or_zero() }

    pub fn set_aspect(&mut self, width: u32, height: u32) { self.aspect = width as f32 / height.max(1) as f32; }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_camera_looks_level_down_negative_z() {
        let cam = Camera::new(800, 600);
        assert_eq!(cam.eye, Vec3::new(0.0, 3.0, 10.0));
        assert_abs_diff_eq!(cam.aspect, 800.0 / 600.0);
        let forward = cam.forward();
        assert_abs_diff_eq!(forward.x, 0.0);
        assert_abs_diff_eq!(forward.y, 0.0);
        assert_abs_diff_eq!(forward.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut cam = Camera::new(800, 600);
        cam.look_at(Vec3::new(1.0, 0.0, -2.0));
        let clip = cam.view_proj().project_point3(cam.target);
        assert_abs_diff_eq!(clip.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(clip.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_height_does_not_divide_by_zero() {
        let mut cam = Camera::new(800, 0);
        assert!(cam.aspect.is_finite());
        cam.set_aspect(1024, 0);
        assert!(cam.aspect.is_finite());
    }
}

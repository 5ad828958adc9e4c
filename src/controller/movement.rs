use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::controller::input::InputState;
use crate::model::Pose;

/// Distance moved per frame. Not scaled by frame time, so speed follows the refresh rate.
pub const STEP: f32 = 0.1;

/// Per-frame blend toward the target heading under the smoothed policy.
pub const HEADING_BLEND: f32 = 0.1;

/// How the smoothed policy interpolates between two angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleLerp {
    /// Lerp the raw angles. Turning across ±π takes the long way round.
    Linear,
    /// Wrap the difference into (-π, π] first.
    ShortestArc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingPolicy {
    /// Face the movement direction immediately.
    Snap,
    /// Move a fixed fraction of the way toward the movement direction each frame.
    Smoothed { blend: f32, lerp: AngleLerp },
}

impl HeadingPolicy {
    pub fn smoothed() -> Self {
        HeadingPolicy::Smoothed { blend: HEADING_BLEND, lerp: AngleLerp::Linear }
    }

    pub fn next_heading(&self, current: f32, target: f32) -> f32 {
        match *self {
            HeadingPolicy::Snap => target,
            HeadingPolicy::Smoothed { blend, lerp } => {
                let delta = match lerp {
                    AngleLerp::Linear => target - current,
                    AngleLerp::ShortestArc => shortest_arc(current, target),
                };
                current + delta * blend
            }
        }
    }
}

/// Signed difference `target - current` wrapped into (-π, π].
pub fn shortest_arc(current: f32, target: f32) -> f32 {
    let wrapped = (target - current + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI { PI } else { wrapped }
}

/// Sum of the basis vectors of every held direction. Not normalized.
pub fn direction_from_input(input: &InputState) -> Vec3 {
    input.held().map(|d| d.basis()).sum()
}

/// Yaw that makes the model's +Z axis point along `direction`.
pub fn target_heading(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

/// Turns held directions into a new pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementIntegrator {
    pub step: f32,
    pub heading: HeadingPolicy,
}

impl Default for MovementIntegrator {
    fn default() -> Self {
        Self { step: STEP, heading: HeadingPolicy::Snap }
    }
}

impl MovementIntegrator {
    pub fn new(step: f32, heading: HeadingPolicy) -> Self {
        Self { step, heading }
    }

    /// One frame of movement. A zero direction (nothing held, or opposite
    /// keys cancelling) leaves the pose untouched, heading included.
    pub fn integrate(&self, input: &InputState, pose: Pose) -> Pose {
        let direction = direction_from_input(input);
        if direction.length_squared() == 0.0 {
            return pose;
        }

        let direction = direction.normalize();
        Pose {
            position: pose.position + direction * self.step,
            heading: self.heading.next_heading(pose.heading, target_heading(direction)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::Direction::{self, *};
    use approx::assert_abs_diff_eq;

    fn all_combinations() -> impl Iterator<Item = InputState> {
        (0u8..16).map(|bits| {
            let held: Vec<Direction> = Direction::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| bits & (1 << i) != 0)
                .map(|(_, d)| d)
                .collect();
            InputState::with_held(&held)
        })
    }

    #[test]
    fn test_cancelling_input_is_a_no_op() {
        let start = Pose::new(Vec3::new(1.0, 2.0, 3.0), 0.7);
        for policy in [HeadingPolicy::Snap, HeadingPolicy::smoothed()] {
            let mover = MovementIntegrator::new(STEP, policy);
            let cancelling: [&[Direction]; 4] =
                [&[], &[Forward, Backward], &[Left, Right], &Direction::ALL];
            for held in cancelling {
                let input = InputState::with_held(held);
                assert_eq!(direction_from_input(&input), Vec3::ZERO);
                assert_eq!(mover.integrate(&input, start), start);
            }
        }
    }

    #[test]
    fn test_every_move_is_exactly_one_step() {
        let mover = MovementIntegrator::default();
        for input in all_combinations() {
            let direction = direction_from_input(&input);
            let moved = mover.integrate(&input, Pose::default());
            if direction == Vec3::ZERO {
                assert_eq!(moved.position, Vec3::ZERO);
            } else {
                assert_abs_diff_eq!(direction.normalize().length(), 1.0, epsilon = 1e-6);
                assert_abs_diff_eq!(moved.position.length(), STEP, epsilon = 1e-6);
                assert_eq!(moved.position.y, 0.0);
            }
        }
    }

    #[test]
    fn test_forward_from_origin() {
        let mover = MovementIntegrator::default();
        let pose = mover.integrate(&InputState::with_held(&[Forward]), Pose::default());

        assert_abs_diff_eq!(pose.position.x, 0.0);
        assert_abs_diff_eq!(pose.position.y, 0.0);
        assert_abs_diff_eq!(pose.position.z, -0.1);
        assert_eq!(pose.heading, 0f32.atan2(-1.0));
    }

    #[test]
    fn test_snap_heading_has_no_lag() {
        let mover = MovementIntegrator::new(STEP, HeadingPolicy::Snap);
        let pose = mover.integrate(&InputState::with_held(&[Right]), Pose::new(Vec3::ZERO, -2.0));
        assert_eq!(pose.heading, 1f32.atan2(0.0));
    }

    #[test]
    fn test_diagonal_heading() {
        let mover = MovementIntegrator::default();
        let pose = mover.integrate(&InputState::with_held(&[Backward, Right]), Pose::default());
        assert_abs_diff_eq!(pose.heading, std::f32::consts::FRAC_PI_4, epsilon = 1e-6);
    }

    #[test]
    fn test_smoothed_heading_converges_geometrically() {
        let mover = MovementIntegrator::new(STEP, HeadingPolicy::smoothed());
        let input = InputState::with_held(&[Right]);
        let target = std::f32::consts::FRAC_PI_2;
        let eps = 1e-3_f32;

        let mut pose = Pose::new(Vec3::ZERO, -1.0);
        let initial_error = (target - pose.heading).abs();
        let bound = ((eps / initial_error).ln() / (1.0 - HEADING_BLEND).ln()).ceil() as usize;

        let mut previous_error = initial_error;
        for _ in 0..bound {
            pose = mover.integrate(&input, pose);
            let error = (target - pose.heading).abs();
            assert!(error < previous_error, "heading must approach the target monotonically");
            previous_error = error;
        }
        assert!(previous_error <= eps * 1.01, "error {previous_error} after {bound} frames");
    }

    #[test]
    fn test_linear_lerp_whips_around_near_pi() {
        // 170 degrees toward -170 degrees: linear goes the long way (through 0)
        let current = 170f32.to_radians();
        let target = -170f32.to_radians();

        let linear = HeadingPolicy::smoothed().next_heading(current, target);
        assert!(linear < current);

        let wrapped = HeadingPolicy::Smoothed { blend: HEADING_BLEND, lerp: AngleLerp::ShortestArc }
            .next_heading(current, target);
        assert!(wrapped > current);
        assert_abs_diff_eq!(wrapped - current, 2f32.to_radians(), epsilon = 1e-5);
    }

    #[test]
    fn test_shortest_arc_range() {
        assert_abs_diff_eq!(shortest_arc(0.0, 0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(shortest_arc(3.0, -3.0), TAU - 6.0, epsilon = 1e-5);
        assert_abs_diff_eq!(shortest_arc(0.0, PI), PI, epsilon = 1e-6);
        assert_abs_diff_eq!(shortest_arc(0.0, 3.0 * TAU + 0.25), 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_position_y_never_changes() {
        let mover = MovementIntegrator::default();
        let mut pose = Pose::new(Vec3::new(0.0, 1.5, 0.0), 0.0);
        for input in all_combinations() {
            pose = mover.integrate(&input, pose);
        }
        assert_eq!(pose.position.y, 1.5);
    }
}

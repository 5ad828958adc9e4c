use std::f64::consts::TAU;

use crate::model::HeightField;

pub const WAVE_FREQUENCY: f32 = 0.1;
pub const WAVE_AMPLITUDE: f32 = 0.5;

/// Two crossing sine waves travelling with time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub frequency: f32,
    pub amplitude: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self { frequency: WAVE_FREQUENCY, amplitude: WAVE_AMPLITUDE }
    }
}

impl WaveParams {
    /// Height of the surface at plane coordinate `(x, y)` at time `t` seconds.
    pub fn height(&self, x: f32, y: f32, t: f32) -> f32 {
        (x * self.frequency + t).sin() * self.amplitude + (y * self.frequency + t).sin() * self.amplitude
    }

    /// Rewrite every height in `field` for time `t` and flag it for re-upload.
    pub fn displace(&self, field: &mut HeightField, t: f32) {
        field.rewrite_heights(|x, y| self.height(x, y, t));
    }
}

/// Fold elapsed seconds into one period of the wave before narrowing to f32.
pub fn wave_phase(elapsed: f64) -> f32 {
    elapsed.rem_euclid(TAU) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_height_matches_closed_form() {
        let waves = WaveParams::default();
        for (x, y, t) in [(0.0, 0.0, 0.0), (12.5, -3.0, 1.25), (-50.0, 50.0, 4.0), (7.0, 7.0, 100.0)] {
            let expected = (0.1f32 * x + t).sin() * 0.5 + (0.1f32 * y + t).sin() * 0.5;
            assert_eq!(waves.height(x, y, t), expected);
        }
    }

    #[test]
    fn test_height_is_periodic_and_bounded() {
        let waves = WaveParams::default();
        for i in 0..200 {
            let x = i as f32 * 0.7 - 50.0;
            let y = 30.0 - i as f32 * 0.3;
            let t = i as f32 * 0.05;

            let h = waves.height(x, y, t);
            assert!((-1.0..=1.0).contains(&h));
            assert_abs_diff_eq!(h, waves.height(x, y, t + std::f32::consts::TAU), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_displace_only_touches_heights() {
        let waves = WaveParams::default();
        let mut field = HeightField::plane(20.0, 20.0, 4, 4);
        field.take_dirty();
        let coords = field.coords().to_vec();

        waves.displace(&mut field, 0.75);

        assert!(field.is_dirty());
        assert_eq!(field.coords(), coords.as_slice());
        for ([x, y], h) in field.coords().iter().zip(field.heights()) {
            assert_eq!(*h, waves.height(*x, *y, 0.75));
        }
    }

    #[test]
    fn test_displace_is_deterministic() {
        let waves = WaveParams::default();
        let mut a = HeightField::plane(10.0, 10.0, 3, 3);
        let mut b = a.clone();
        waves.displace(&mut a, 2.0);
        waves.displace(&mut b, 9.0);
        waves.displace(&mut b, 2.0);
        assert_eq!(a.heights(), b.heights());
    }

    #[test]
    fn test_phase_keeps_the_wave_unchanged() {
        let waves = WaveParams::default();
        let elapsed = 3.0 * TAU + 0.5;
        assert_abs_diff_eq!(wave_phase(elapsed), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(
            waves.height(4.0, -2.0, wave_phase(elapsed)),
            waves.height(4.0, -2.0, 0.5),
            epsilon = 1e-5
        );
        assert!(wave_phase(1.0e7) <= std::f32::consts::TAU);
    }
}

//! Humanising jitter applied at playback time.
//!
//! Offsets are drawn uniformly from `[-magnitude * c, +magnitude * c]`,
//! so the spread grows linearly with the coefficient `c` and `c = 0`
//! returns the input untouched.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::{Position, ScreenBounds};

/// Perturb `value` by at most `magnitude * coefficient` in either direction.
///
/// `coefficient` is clamped to `[0, 1]`.
pub fn jitter<R: Rng>(rng: &mut R, value: f64, magnitude: f64, coefficient: f64) -> f64 {
    let spread = magnitude.abs() * clamp_coefficient(coefficient);
    if spread == 0.0 || !spread.is_finite() {
        return value;
    }
    value + rng.gen_range(-spread..=spread)
}

fn clamp_coefficient(coefficient: f64) -> f64 {
    if coefficient.is_nan() {
        0.0
    } else {
        coefficient.clamp(0.0, 1.0)
    }
}

/// Source of jitter for one playback run
#[derive(Debug, Clone)]
pub struct Randomizer<R = StdRng> {
    rng: R,
}

impl Randomizer<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible jitter, for tests and dry runs
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Randomizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Randomizer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Jitter a span of seconds by up to `spread` times its own length.
    ///
    /// Never returns less than zero.
    pub fn seconds(&mut self, secs: f64, spread: f64, coefficient: f64) -> f64 {
        let secs = secs.max(0.0);
        jitter(&mut self.rng, secs, secs * spread, coefficient).max(0.0)
    }

    /// [`Randomizer::seconds`] as a [`Duration`]
    pub fn duration(&mut self, secs: f64, spread: f64, coefficient: f64) -> Duration {
        Duration::try_from_secs_f64(self.seconds(secs, spread, coefficient)).unwrap_or(Duration::MAX)
    }

    /// Jitter a single coordinate by up to `radius` pixels, clamped to `min..=max`
    pub fn coordinate(&mut self, value: i32, radius: f64, coefficient: f64, min: i32, max: i32) -> i32 {
        let jittered = jitter(&mut self.rng, f64::from(value), radius, coefficient).round();
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        jittered.clamp(f64::from(lo), f64::from(hi)) as i32
    }

    /// Jitter both axes of a position independently and keep it on screen
    pub fn position(
        &mut self,
        position: Position,
        radius: f64,
        coefficient: f64,
        bounds: ScreenBounds,
    ) -> Position {
        Position {
            x: self.coordinate(position.x, radius, coefficient, 0, bounds.max_x()),
            y: self.coordinate(position.y, radius, coefficient, 0, bounds.max_y()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_coefficient_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        for value in [0.0, 0.1, 1.5, -42.25, 1e9] {
            for magnitude in [0.0, 1.0, 10.0, 1e6] {
                assert_eq!(jitter(&mut rng, value, magnitude, 0.0), value);
            }
        }
    }

    #[test]
    fn test_spread_scales_with_coefficient() {
        let mut rng = StdRng::seed_from_u64(7);
        for coefficient in [0.1, 0.5, 1.0] {
            let mut widest: f64 = 0.0;
            for _ in 0..2_000 {
                let offset = jitter(&mut rng, 100.0, 10.0, coefficient) - 100.0;
                assert!(offset.abs() <= 10.0 * coefficient + 1e-9);
                widest = widest.max(offset.abs());
            }
            // Uniform draws cover most of the allowed range
            assert!(widest > 10.0 * coefficient * 0.9);
        }
    }

    #[test]
    fn test_coefficient_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let v = jitter(&mut rng, 0.0, 1.0, 5.0);
            assert!(v.abs() <= 1.0);
        }
        assert_eq!(jitter(&mut rng, 3.0, 1.0, -1.0), 3.0);
        assert_eq!(jitter(&mut rng, 3.0, 1.0, f64::NAN), 3.0);
    }

    #[test]
    fn test_seconds_never_negative() {
        let mut randomizer = Randomizer::seeded(11);
        for secs in [0.0, 0.001, 0.3, 2.0, -1.0] {
            for spread in [0.5, 1.0, 3.0] {
                for _ in 0..200 {
                    assert!(randomizer.seconds(secs, spread, 1.0) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_seconds_identity_at_zero() {
        let mut randomizer = Randomizer::seeded(5);
        assert_eq!(randomizer.seconds(0.75, 0.5, 0.0), 0.75);
        assert_eq!(randomizer.duration(0.75, 0.5, 0.0), Duration::from_millis(750));
    }

    #[test]
    fn test_position_stays_on_screen() {
        let mut randomizer = Randomizer::seeded(9);
        let bounds = ScreenBounds::new(100, 50);
        for _ in 0..1_000 {
            let p = randomizer.position(Position::new(0, 49), 20.0, 1.0, bounds);
            assert!(bounds.contains(p), "{p} escaped the screen");
            assert!(p.x <= 20 && p.y >= 29);
        }
    }

    #[test]
    fn test_position_identity_at_zero() {
        let mut randomizer = Randomizer::seeded(2);
        let bounds = ScreenBounds::new(1920, 1080);
        let p = Position::new(640, 480);
        assert_eq!(randomizer.position(p, 25.0, 0.0, bounds), p);
    }
}

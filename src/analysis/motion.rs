// Motion - finite-difference velocity and acceleration estimation
//
// Converts successive fingertip positions and the elapsed tick time into
// instantaneous velocity and acceleration. The first sample after
// (re)acquiring tracking only seeds the state, so no velocity spike is ever
// computed across a tracking gap.

use crate::tracking::Vec3;

/// Running state of the estimator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    pub last_position: Vec3,
    pub last_velocity: Vec3,
    pub initialized: bool,
}

/// Derivatives produced for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEstimate {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
}

/// Why the estimator produced nothing this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    /// First sample after construction or reset; state was seeded
    Seeded,
    /// `dt` was zero, negative or non-finite; state untouched
    InvalidDelta,
}

#[derive(Debug, Default)]
pub struct DerivativeEstimator {
    state: MotionState,
}

impl DerivativeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Forget the previous sample (tracking lost)
    pub fn reset(&mut self) {
        self.state = MotionState::default();
    }

    /// Estimate velocity and acceleration for `position` sampled `dt`
    /// seconds after the previous one.
    pub fn estimate(&mut self, position: Vec3, dt: f32) -> Result<MotionEstimate, NotReady> {
        if !self.state.initialized {
            self.state = MotionState {
                last_position: position,
                last_velocity: Vec3::ZERO,
                initialized: true,
            };
            return Err(NotReady::Seeded);
        }

        if !(dt.is_finite() && dt > 0.0) {
            return Err(NotReady::InvalidDelta);
        }

        let velocity = (position - self.state.last_position) / dt;
        let acceleration = (velocity - self.state.last_velocity) / dt;

        self.state.last_position = position;
        self.state.last_velocity = velocity;

        Ok(MotionEstimate {
            position,
            velocity,
            acceleration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-4 * b.abs().max(1.0)
    }

    #[test]
    fn test_first_sample_seeds_state() {
        let mut estimator = DerivativeEstimator::new();
        let p0 = Vec3::new(0.1, 0.2, 0.3);

        assert_eq!(estimator.estimate(p0, 0.016), Err(NotReady::Seeded));
        assert!(estimator.state().initialized);
        assert_eq!(estimator.state().last_position, p0);
        assert_eq!(estimator.state().last_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_velocity_and_acceleration() {
        let mut estimator = DerivativeEstimator::new();
        let (p0, p1, p2) = (0.0_f32, 0.02_f32, 0.05_f32);
        let (dt1, dt2) = (0.01_f32, 0.02_f32);

        let _ = estimator.estimate(Vec3::new(0.0, p0, 0.0), 0.5);
        let first = estimator.estimate(Vec3::new(0.0, p1, 0.0), dt1).unwrap();
        assert!(approx(first.velocity.y, (p1 - p0) / dt1));

        let second = estimator.estimate(Vec3::new(0.0, p2, 0.0), dt2).unwrap();
        let expected_velocity = (p2 - p1) / dt2;
        let expected_acceleration = ((p2 - p1) / dt2 - (p1 - p0) / dt1) / dt2;
        assert!(approx(second.velocity.y, expected_velocity));
        assert!(approx(second.acceleration.y, expected_acceleration));
        assert_eq!(second.velocity.x, 0.0);
    }

    #[test]
    fn test_non_positive_dt_leaves_state_untouched() {
        let mut estimator = DerivativeEstimator::new();
        let _ = estimator.estimate(Vec3::new(1.0, 1.0, 1.0), 0.016);
        let before = *estimator.state();

        assert_eq!(
            estimator.estimate(Vec3::new(5.0, 5.0, 5.0), 0.0),
            Err(NotReady::InvalidDelta)
        );
        assert_eq!(
            estimator.estimate(Vec3::new(5.0, 5.0, 5.0), -0.01),
            Err(NotReady::InvalidDelta)
        );
        assert_eq!(
            estimator.estimate(Vec3::new(5.0, 5.0, 5.0), f32::NAN),
            Err(NotReady::InvalidDelta)
        );
        assert_eq!(*estimator.state(), before);
    }

    #[test]
    fn test_reset_requires_reseed() {
        let mut estimator = DerivativeEstimator::new();
        let _ = estimator.estimate(Vec3::new(0.0, 0.0, 0.0), 0.016);
        assert!(estimator.estimate(Vec3::new(0.0, 1.0, 0.0), 0.016).is_ok());

        estimator.reset();
        assert!(!estimator.state().initialized);

        // A large jump across the gap must not produce a velocity
        assert_eq!(
            estimator.estimate(Vec3::new(0.0, 50.0, 0.0), 0.016),
            Err(NotReady::Seeded)
        );
        let next = estimator.estimate(Vec3::new(0.0, 50.0, 0.0), 0.016).unwrap();
        assert_eq!(next.velocity, Vec3::ZERO);
    }
}

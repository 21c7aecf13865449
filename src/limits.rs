//! Joint limit filtering and angle harmonization.

use std::f64::consts::PI;

use crate::chain::JointSpec;
use crate::kinematic_traits::LIMIT_TOLERANCE;

/// Checks one value against one joint. Joints without limits always pass.
/// The tolerance absorbs floating point noise when a value sits exactly
/// at a limit.
pub fn within_limits(spec: &JointSpec, value: f64) -> bool {
    !spec.has_limits || (value >= spec.min - LIMIT_TOLERANCE && value <= spec.max + LIMIT_TOLERANCE)
}

/// Checks a full solution against the chain limits, short-circuiting on the
/// first violation. The result does not depend on joint order.
pub fn obeys_limits(joints: &[JointSpec], solution: &[f64]) -> bool {
    for (i, spec) in joints.iter().enumerate() {
        if !within_limits(spec, solution[i]) {
            log::debug!(
                "Not in limits! joint {} value {} being {} to {}",
                i, solution[i], spec.min, spec.max
            );
            return false;
        }
    }
    true
}

/// Normalizes an angle into [0, 2*PI) before periodic comparison.
pub fn harmonize(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    ((angle % two_pi) + two_pi) % two_pi
}

/// Distance between seed and solution used for ranking: the sum of absolute
/// per joint differences, both sides harmonized into the same revolution band.
pub fn harmonized_distance(seed: &[f64], solution: &[f64]) -> f64 {
    seed.iter()
        .zip(solution.iter())
        .map(|(s, q)| (harmonize(*s) - harmonize(*q)).abs())
        .sum()
}

/// Plain seed distance without harmonization, used by the search engine cost
/// where the displacement itself matters: the largest absolute per joint
/// motion from the seed.
pub fn max_joint_motion(seed: &[f64], solution: &[f64]) -> f64 {
    seed.iter()
        .zip(solution.iter())
        .map(|(s, q)| (s - q).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_limits_tolerance() {
        let spec = JointSpec::limited("j", -1.0, 1.0);
        assert!(within_limits(&spec, 1.0));
        assert!(within_limits(&spec, 1.0 + 0.5 * LIMIT_TOLERANCE));
        assert!(!within_limits(&spec, 1.0 + 1.0e-6));
        assert!(within_limits(&spec, -1.0 - 0.5 * LIMIT_TOLERANCE));
        assert!(!within_limits(&spec, -1.0 - 1.0e-6));
    }

    #[test]
    fn test_continuous_always_passes() {
        let spec = JointSpec::continuous("j");
        assert!(within_limits(&spec, 100.0));
        assert!(within_limits(&spec, -100.0));
    }

    #[test]
    fn test_obeys_limits_short_circuit() {
        let joints = vec![
            JointSpec::limited("j1", -1.0, 1.0),
            JointSpec::limited("j2", -1.0, 1.0),
        ];
        assert!(obeys_limits(&joints, &[0.5, -0.5]));
        assert!(!obeys_limits(&joints, &[1.5, 0.0]));
        assert!(!obeys_limits(&joints, &[0.0, -1.5]));
    }

    #[test]
    fn test_harmonize_interval() {
        let two_pi = 2.0 * PI;
        for angle in [-10.0, -PI, -0.1, 0.0, 0.1, PI, two_pi, 10.0, 100.0] {
            let h = harmonize(angle);
            assert!((0.0..two_pi).contains(&h), "harmonize({}) = {}", angle, h);
            // Same representative of the same angle class
            assert!((harmonize(angle + two_pi) - h).abs() < 1e-12);
        }
    }

    #[test]
    fn test_harmonized_distance() {
        let two_pi = 2.0 * PI;
        // A full revolution apart is zero distance after harmonization
        let seed = vec![0.5, 0.5];
        let solution = vec![0.5 + two_pi, 0.5 - two_pi];
        assert!(harmonized_distance(&seed, &solution) < 1e-12);
    }

    #[test]
    fn test_max_joint_motion() {
        let seed = vec![0.0, 1.0, -1.0];
        let solution = vec![0.2, 0.5, -1.1];
        assert!((max_joint_motion(&seed, &solution) - 0.5).abs() < 1e-12);
    }
}

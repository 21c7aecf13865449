//! Sampling of the redundant joint for the batch (multi solution) IK path.

use rand::Rng;

use crate::chain::JointSpec;
use crate::kinematic_traits::{DiscretizationMethod, KinematicError};

/// Produces the candidate values of the redundant joint for one batch query.
/// The random source is injected so tests can use a seeded generator;
/// production callers pass a thread or entropy seeded one.
pub fn sample_redundant_joint<R: Rng>(
    method: DiscretizationMethod,
    spec: &JointSpec,
    seed_value: f64,
    step: f64,
    rng: &mut R,
) -> Result<Vec<f64>, KinematicError> {
    // For continuous joints the spec carries the +/- PI search bounds.
    let joint_min = spec.min;
    let joint_max = spec.max;

    match method {
        DiscretizationMethod::NoDiscretization => Ok(vec![seed_value]),

        DiscretizationMethod::AllDiscretized => {
            let steps = ((joint_max - joint_min) / step).ceil() as i64;
            let mut sampled = Vec::with_capacity((steps.max(0) + 1) as usize);
            for i in 0..steps {
                sampled.push(joint_min + step * i as f64);
            }
            // The last sample is forced to the bound, so it is always
            // included even when the range is not a multiple of the step.
            sampled.push(joint_max);
            Ok(sampled)
        }

        DiscretizationMethod::AllRandomSampled => {
            if joint_max <= joint_min {
                return Ok(vec![joint_min]);
            }
            let steps = (((joint_max - joint_min) / step).ceil() as i64).max(1);
            let sampled = (0..steps)
                .map(|_| rng.gen_range(joint_min..joint_max))
                .collect();
            Ok(sampled)
        }

        other => {
            log::error!("Discretization method {:?} is not supported", other);
            Err(KinematicError::UnsupportedDiscretization(other))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(97)
    }

    #[test]
    fn test_no_discretization_returns_seed() {
        let spec = JointSpec::limited("j", -1.0, 1.0);
        let sampled = sample_redundant_joint(
            DiscretizationMethod::NoDiscretization, &spec, 0.42, 0.1, &mut rng()).unwrap();
        assert_eq!(sampled, vec![0.42]);
    }

    #[test]
    fn test_uniform_includes_both_bounds_exact_multiple() {
        let spec = JointSpec::limited("j", -1.0, 1.0);
        let sampled = sample_redundant_joint(
            DiscretizationMethod::AllDiscretized, &spec, 0.0, 0.5, &mut rng()).unwrap();
        assert_eq!(sampled, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(sampled.iter().filter(|v| **v == -1.0).count(), 1);
        assert_eq!(sampled.iter().filter(|v| **v == 1.0).count(), 1);
    }

    #[test]
    fn test_uniform_includes_both_bounds_inexact_multiple() {
        let spec = JointSpec::limited("j", 0.0, 1.0);
        let sampled = sample_redundant_joint(
            DiscretizationMethod::AllDiscretized, &spec, 0.0, 0.3, &mut rng()).unwrap();
        // ceil(1.0 / 0.3) = 4 uniform samples, then the bound itself
        assert_eq!(sampled.len(), 5);
        assert_eq!(sampled[0], 0.0);
        assert_eq!(*sampled.last().unwrap(), 1.0);
        assert!(sampled.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_uniform_step_larger_than_range() {
        let spec = JointSpec::limited("j", 0.0, 1.0);
        let sampled = sample_redundant_joint(
            DiscretizationMethod::AllDiscretized, &spec, 0.0, 10.0, &mut rng()).unwrap();
        assert_eq!(sampled, vec![0.0, 1.0]);
    }

    #[test]
    fn test_uniform_continuous_joint_covers_pi_range() {
        let spec = JointSpec::continuous("j");
        let sampled = sample_redundant_joint(
            DiscretizationMethod::AllDiscretized, &spec, 0.0, PI, &mut rng()).unwrap();
        assert_eq!(sampled, vec![-PI, 0.0, PI]);
    }

    #[test]
    fn test_random_count_and_range() {
        let spec = JointSpec::limited("j", -1.0, 1.0);
        let sampled = sample_redundant_joint(
            DiscretizationMethod::AllRandomSampled, &spec, 0.0, 0.25, &mut rng()).unwrap();
        assert_eq!(sampled.len(), 8); // ceil(2.0 / 0.25)
        assert!(sampled.iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn test_random_at_least_one_sample() {
        let spec = JointSpec::limited("j", -0.1, 0.1);
        let sampled = sample_redundant_joint(
            DiscretizationMethod::AllRandomSampled, &spec, 0.0, 10.0, &mut rng()).unwrap();
        assert_eq!(sampled.len(), 1);
    }

    #[test]
    fn test_random_reproducible_with_seeded_rng() {
        let spec = JointSpec::limited("j", -1.0, 1.0);
        let a = sample_redundant_joint(
            DiscretizationMethod::AllRandomSampled, &spec, 0.0, 0.5, &mut rng()).unwrap();
        let b = sample_redundant_joint(
            DiscretizationMethod::AllRandomSampled, &spec, 0.0, 0.5, &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unsupported_methods_rejected() {
        let spec = JointSpec::limited("j", -1.0, 1.0);
        for method in [
            DiscretizationMethod::SomeDiscretized,
            DiscretizationMethod::SomeRandomSampled,
        ] {
            let result = sample_redundant_joint(method, &spec, 0.0, 0.1, &mut rng());
            assert_eq!(result, Err(KinematicError::UnsupportedDiscretization(method)));
        }
    }
}

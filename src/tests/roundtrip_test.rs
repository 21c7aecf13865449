//! End to end checks with the bundled planar arms: solutions produced by IK
//! must map back to the requested pose under FK.

use std::time::Duration;

use crate::kinematic_traits::{DiscretizationMethod, Kinematics, Pose};
use crate::kinematics_impl::IkFastKinematics;
use crate::planar::{PlanarArm3, PlanarArm4};
use crate::tests::mock_oracle::simple_chain;

const TIMEOUT: Duration = Duration::from_secs(5);

fn arm3_plugin() -> IkFastKinematics<PlanarArm3> {
    let oracle = PlanarArm3::new(0.5, 0.4, 0.2);
    IkFastKinematics::initialized(oracle, simple_chain(3, -3.0, 3.0), 0.1).unwrap()
}

fn arm4_plugin() -> IkFastKinematics<PlanarArm4> {
    let oracle = PlanarArm4::new(0.4, 0.4, 0.3, 0.15);
    IkFastKinematics::initialized(oracle, simple_chain(4, -3.0, 3.0), 0.1).unwrap()
}

fn tip_pose<O: crate::kinematic_traits::SolverOracle>(
    plugin: &IkFastKinematics<O>,
    joints: &[f64],
) -> Pose {
    let tip = plugin.chain().unwrap().tip_link().to_string();
    plugin.position_fk(&[tip], joints).unwrap().remove(0)
}

fn assert_same_pose(a: &Pose, b: &Pose) {
    assert!((a.translation.vector - b.translation.vector).norm() < 1e-9,
            "{} vs {}", a, b);
    assert!(a.rotation.angle_to(&b.rotation) < 1e-9, "{} vs {}", a, b);
}

#[test]
fn test_position_ik_round_trip() {
    let plugin = arm3_plugin();
    let joints = [0.3, -0.7, 0.5];
    let pose = tip_pose(&plugin, &joints);

    // Seed near the original configuration, not exactly on it
    let seed = [0.2, -0.6, 0.4];
    let solution = plugin.position_ik(&pose, &seed).unwrap();
    assert_same_pose(&pose, &tip_pose(&plugin, &solution));
}

#[test]
fn test_position_ik_follows_the_seed_branch() {
    // The elbow-up and elbow-down branches both reach the pose; the seed
    // decides which one comes back.
    let plugin = arm3_plugin();
    let joints = [0.3, -0.7, 0.5];
    let pose = tip_pose(&plugin, &joints);

    let down = plugin.position_ik(&pose, &[0.3, -0.7, 0.5]).unwrap();
    assert!(down[1] < 0.0, "{:?}", down);

    let up = plugin.position_ik(&pose, &[0.9, 0.7, -0.8]).unwrap();
    assert!(up[1] > 0.0, "{:?}", up);

    assert_same_pose(&pose, &tip_pose(&plugin, &up));
    assert_same_pose(&pose, &tip_pose(&plugin, &down));
}

#[test]
fn test_position_ik_takes_free_value_from_the_seed() {
    let plugin = arm4_plugin();
    let joints = [0.4, 0.3, -0.8, 0.6];
    let pose = tip_pose(&plugin, &joints);

    let solution = plugin.position_ik(&pose, &joints).unwrap();
    assert!((solution[0] - joints[0]).abs() < 1e-9, "{:?}", solution);
    assert_same_pose(&pose, &tip_pose(&plugin, &solution));
}

#[test]
fn test_search_ik_round_trip() {
    let plugin = arm4_plugin();
    let joints = [0.4, 0.3, -0.8, 0.6];
    let pose = tip_pose(&plugin, &joints);

    // A seed whose free joint value does not reach the pose directly; the
    // search has to move away from it.
    let seed = [1.8, 0.0, 0.0, 0.0];
    let solution = plugin.search_ik(&pose, &seed, TIMEOUT).unwrap();
    assert_eq!(solution.len(), 4);
    assert_same_pose(&pose, &tip_pose(&plugin, &solution));
}

#[test]
fn test_search_ik_unreachable_pose() {
    let plugin = arm4_plugin();
    let pose = Pose::translation(5.0, 0.0, 0.0);
    let result = plugin.search_ik(&pose, &[0.0, 0.0, 0.0, 0.0], TIMEOUT);
    assert!(result.is_err());
}

#[test]
fn test_batch_solutions_all_verify() {
    let plugin = arm4_plugin();
    let joints = [0.4, 0.3, -0.8, 0.6];
    let pose = tip_pose(&plugin, &joints);

    let solutions = plugin
        .position_ik_multi(&[pose], &joints, DiscretizationMethod::AllDiscretized)
        .unwrap();
    assert!(solutions.len() > 1, "expected solutions from multiple samples");
    for solution in &solutions {
        assert_same_pose(&pose, &tip_pose(&plugin, solution));
    }
}

#[test]
fn test_batch_random_solutions_all_verify() {
    let plugin = IkFastKinematics::initialized(
        PlanarArm4::new(0.4, 0.4, 0.3, 0.15),
        simple_chain(4, -3.0, 3.0),
        0.1,
    )
    .unwrap()
    .with_rng_seed(7);

    // A folded configuration, so that a wide band of base joint values can
    // still reach the pose and random sampling reliably lands inside it.
    let joints = [0.2, 1.2, -1.0, 0.8];
    let pose = tip_pose(&plugin, &joints);

    let solutions = plugin
        .position_ik_multi(&[pose], &joints, DiscretizationMethod::AllRandomSampled)
        .unwrap();
    for solution in &solutions {
        assert_same_pose(&pose, &tip_pose(&plugin, solution));
    }
}

#[test]
fn test_fk_of_ik_of_fk_is_stable() {
    let plugin = arm3_plugin();
    let joints = [0.1, 0.9, -0.4];
    let pose = tip_pose(&plugin, &joints);
    let solution = plugin.position_ik(&pose, &joints).unwrap();
    let pose_again = tip_pose(&plugin, &solution);
    let solution_again = plugin.position_ik(&pose_again, &solution).unwrap();
    for (a, b) in solution.iter().zip(solution_again.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

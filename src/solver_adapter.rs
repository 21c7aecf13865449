//! Adapter between the pose oriented API and the closed form oracle:
//! dispatches on the declared parameterization type and flattens the pose
//! into the translation / orientation arrays the oracle expects.

use nalgebra::Vector3;

use crate::kinematic_traits::{
    IkParameterizationType, KinematicError, Pose, SolutionSet, SolverOracle,
};

/// Calls the oracle for the given pose and free joint values. Only the
/// transform family (full rotation matrix) and the direction family (tip +Z
/// axis in the pose frame) are implemented; other declared parameterization
/// types report an explicit unimplemented status rather than an empty set.
pub fn solve<O: SolverOracle>(
    oracle: &O,
    pose: &Pose,
    free_values: &[f64],
) -> Result<SolutionSet, KinematicError> {
    let translation = [
        pose.translation.vector.x,
        pose.translation.vector.y,
        pose.translation.vector.z,
    ];

    let kind = oracle.parameterization();
    match kind {
        IkParameterizationType::Transform6D | IkParameterizationType::Translation3D => {
            // For Transform6D the orientation is the 3x3 rotation matrix in
            // row major order; for Translation3D the oracle ignores it.
            let m = pose.rotation.to_rotation_matrix().into_inner();
            let orientation = [
                m[(0, 0)], m[(0, 1)], m[(0, 2)],
                m[(1, 0)], m[(1, 1)], m[(1, 2)],
                m[(2, 0)], m[(2, 1)], m[(2, 2)],
            ];
            Ok(oracle.compute_ik(&translation, &orientation, free_values))
        }

        IkParameterizationType::Direction3D
        | IkParameterizationType::Ray4D
        | IkParameterizationType::TranslationDirection5D => {
            // Only the target direction matters: the tip local +Z axis
            // transformed into the pose's rotation frame.
            let direction: Vector3<f64> = pose.rotation * Vector3::z();
            let orientation = [direction.x, direction.y, direction.z];
            Ok(oracle.compute_ik(&translation, &orientation, free_values))
        }

        other => {
            log::error!("IK for parameterization type {:?} not implemented", other);
            Err(KinematicError::UnimplementedParameterization(other))
        }
    }
}

//! Closed form planar arm solvers bundled with the crate, in the role the
//! generated per-robot solver plays in production. `PlanarArm3` is fully
//! determined (no free joints); `PlanarArm4` has one redundant joint (the
//! base joint) and exercises the search and discretization machinery. Both
//! are used by the usage example and the test suite.
//!
//! The arms live in the XY plane, all joints rotate about Z. The target Z
//! coordinate and any out of plane rotation are ignored.

use crate::kinematic_traits::{IkParameterizationType, SolutionSet, SolverOracle};

/// Wraps an angle into (-PI, PI].
fn wrap(angle: f64) -> f64 {
    f64::atan2(angle.sin(), angle.cos())
}

/// In-plane orientation encoded in a row major rotation matrix about Z.
fn planar_angle(orientation: &[f64]) -> f64 {
    f64::atan2(orientation[3], orientation[0])
}

fn rotation_about_z(phi: f64) -> [f64; 9] {
    let (s, c) = phi.sin_cos();
    [
        c, -s, 0.0,
        s, c, 0.0,
        0.0, 0.0, 1.0,
    ]
}

/// Closed form IK of a 3R planar arm: given the target position `(x, y)` and
/// in-plane orientation `phi`, returns the elbow-up and elbow-down branches
/// (or one or none when the target is at the workspace boundary or outside).
fn three_r_ik(l1: f64, l2: f64, l3: f64, x: f64, y: f64, phi: f64) -> Vec<[f64; 3]> {
    // Wrist position: pull the tool link back along the approach direction
    let xw = x - l3 * phi.cos();
    let yw = y - l3 * phi.sin();

    let r2 = xw * xw + yw * yw;
    let cos_q2 = (r2 - l1 * l1 - l2 * l2) / (2.0 * l1 * l2);
    if cos_q2.abs() > 1.0 {
        return vec![];
    }

    let elbow = cos_q2.clamp(-1.0, 1.0).acos();
    let branches = if elbow == 0.0 { vec![0.0] } else { vec![elbow, -elbow] };

    branches
        .into_iter()
        .map(|q2| {
            let q1 = f64::atan2(yw, xw) - f64::atan2(l2 * q2.sin(), l1 + l2 * q2.cos());
            let q3 = phi - q1 - q2;
            [wrap(q1), wrap(q2), wrap(q3)]
        })
        .collect()
}

fn three_r_fk(l1: f64, l2: f64, l3: f64, q: &[f64]) -> ([f64; 3], f64) {
    let a1 = q[0];
    let a2 = q[0] + q[1];
    let a3 = q[0] + q[1] + q[2];
    let x = l1 * a1.cos() + l2 * a2.cos() + l3 * a3.cos();
    let y = l1 * a1.sin() + l2 * a2.sin() + l3 * a3.sin();
    ([x, y, 0.0], a3)
}

/// 3-DOF planar arm, `Transform6D` parameterization, no free joints. The
/// pose fully determines the joints up to the elbow branch.
pub struct PlanarArm3 {
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
}

impl PlanarArm3 {
    pub fn new(l1: f64, l2: f64, l3: f64) -> Self {
        PlanarArm3 { l1, l2, l3 }
    }
}

impl SolverOracle for PlanarArm3 {
    fn parameterization(&self) -> IkParameterizationType {
        IkParameterizationType::Transform6D
    }

    fn free_parameters(&self) -> Vec<usize> {
        vec![]
    }

    fn joint_count(&self) -> usize {
        3
    }

    fn compute_ik(&self, translation: &[f64; 3], orientation: &[f64], _free_values: &[f64])
        -> SolutionSet {
        let phi = planar_angle(orientation);
        let mut solutions = SolutionSet::new();
        for q in three_r_ik(self.l1, self.l2, self.l3, translation[0], translation[1], phi) {
            solutions.push(q.to_vec(), vec![]);
        }
        solutions
    }

    fn compute_fk(&self, joints: &[f64]) -> ([f64; 3], [f64; 9]) {
        let (translation, phi) = three_r_fk(self.l1, self.l2, self.l3, joints);
        (translation, rotation_about_z(phi))
    }
}

/// 4-DOF planar arm, `Transform6D` parameterization, joint 0 free. For a
/// fixed base joint value the remaining 3R chain is solved in closed form;
/// the base joint itself must be supplied (seed value or search/discretization).
pub struct PlanarArm4 {
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    pub l4: f64,
}

impl PlanarArm4 {
    pub fn new(l1: f64, l2: f64, l3: f64, l4: f64) -> Self {
        PlanarArm4 { l1, l2, l3, l4 }
    }
}

impl SolverOracle for PlanarArm4 {
    fn parameterization(&self) -> IkParameterizationType {
        IkParameterizationType::Transform6D
    }

    fn free_parameters(&self) -> Vec<usize> {
        vec![0]
    }

    fn joint_count(&self) -> usize {
        4
    }

    fn compute_ik(&self, translation: &[f64; 3], orientation: &[f64], free_values: &[f64])
        -> SolutionSet {
        let q1 = free_values.first().copied().unwrap_or(0.0);
        let phi = planar_angle(orientation);

        // Target in the frame attached to the end of link 1
        let (s1, c1) = q1.sin_cos();
        let dx = translation[0] - self.l1 * c1;
        let dy = translation[1] - self.l1 * s1;
        let x = c1 * dx + s1 * dy;
        let y = -s1 * dx + c1 * dy;
        let psi = phi - q1;

        let mut solutions = SolutionSet::new();
        for q in three_r_ik(self.l2, self.l3, self.l4, x, y, psi) {
            solutions.push(vec![wrap(q1), q[0], q[1], q[2]], vec![q1]);
        }
        solutions
    }

    fn compute_fk(&self, joints: &[f64]) -> ([f64; 3], [f64; 9]) {
        let a1 = joints[0];
        let a2 = a1 + joints[1];
        let a3 = a2 + joints[2];
        let a4 = a3 + joints[3];
        let x = self.l1 * a1.cos() + self.l2 * a2.cos() + self.l3 * a3.cos() + self.l4 * a4.cos();
        let y = self.l1 * a1.sin() + self.l2 * a2.sin() + self.l3 * a3.sin() + self.l4 * a4.sin();
        ([x, y, 0.0], rotation_about_z(a4))
    }
}

//! Helper functions

use crate::kinematic_traits::JointVector;

/// Print joint values, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_joints(joints: &[f64]) {
    let mut row_str = String::new();
    for value in joints {
        row_str.push_str(&format!("{:7.2} ", value.to_degrees()));
    }
    println!("[{}]", row_str.trim_end());
}

/// Print joint values for all solutions, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_solutions(solutions: &[JointVector]) {
    if solutions.is_empty() {
        println!("No solutions");
    }
    for solution in solutions {
        dump_joints(solution);
    }
}

/// Allows to specify joint values in degrees (converts to radians)
#[allow(dead_code)]
pub fn as_radians<const N: usize>(degrees: [i32; N]) -> JointVector {
    degrees.iter().map(|d| (*d as f64).to_radians()).collect()
}

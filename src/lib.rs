//! Numerical search and solution selection for robot manipulators around
//! externally generated closed form (IKFast style) solvers.
//!
//! The closed form solver is robot specific algebra produced by a separate
//! generator; this crate treats it as an opaque oracle behind the
//! [`kinematic_traits::SolverOracle`] trait and owns everything around it:
//!
//! - Filtering of raw solutions against joint limits, with a fixed tolerance
//!   so that a seed sitting exactly at a limit is not rejected by floating
//!   point noise.
//! - Selection of the single best solution by harmonized distance from the
//!   seed configuration.
//! - For manipulators with one redundant ("free") joint, a bounded
//!   discretized search over that joint: a bidirectional zig-zag around the
//!   seed value, subject to a wall clock timeout, an optional consistency
//!   window and an externally injected validity (collision) check.
//! - Batch queries that sample the redundant joint with a configurable
//!   discretization method (seed only, uniform, random) and aggregate all
//!   limit obeying solutions.
//!
//! The capability set `{forward kinematics, single pose inverse kinematics,
//! batch inverse kinematics, discretization configuration}` is exposed through
//! the [`kinematic_traits::Kinematics`] trait; all failures are returned as
//! status values, nothing panics across the boundary.
//!
//! # Examples
//!
//! The crate bundles two planar demo solvers in [`planar`] that play the role
//! of the generated solver: `PlanarArm3` (fully determined) and `PlanarArm4`
//! (one redundant joint). See `main.rs` for a walk through FK, closest
//! solution IK, redundancy search and batch discretization.

pub mod kinematic_traits;

pub mod chain;
pub mod chain_error;

pub mod solver_adapter;

pub mod limits;
pub mod selector;
pub mod search;
pub mod sampler;

pub mod kinematics_impl;

pub mod planar;
pub mod utils;

#[cfg(feature = "allow_filesystem")]
pub mod urdf;

#[cfg(test)]
mod tests;

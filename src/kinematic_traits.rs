//! Core types and traits: the solver oracle contract, the kinematics capability
//! set exposed to the motion planning framework, and the status taxonomy.

use nalgebra::Isometry3;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Pose of the robot tcp. It contains both Cartesian position and rotation quaternion
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Joint angles in radians, ordered base to tip. Always of length DOF of the
/// loaded chain; a vector of any other length never leaves this crate.
pub type JointVector = Vec<f64>;

/// Floating point tolerance when checking joint limits, in case the seed
/// sits exactly at a limit.
pub const LIMIT_TOLERANCE: f64 = 1e-7;

/// The IK parameterization types an IKFast-style generator can declare.
/// Only `Transform6D`/`Translation3D` (full rotation matrix) and the
/// direction family (`Direction3D`, `Ray4D`, `TranslationDirection5D`)
/// are handled by this crate; the rest report
/// [`KinematicError::UnimplementedParameterization`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IkParameterizationType {
    None,
    /// End effector reaches the desired 6D transformation.
    Transform6D,
    /// End effector reaches the desired 3D rotation.
    Rotation3D,
    /// End effector origin reaches the desired 3D translation.
    Translation3D,
    /// Direction on the end effector coordinate system reaches the desired direction.
    Direction3D,
    /// Ray on the end effector coordinate system reaches the desired global ray.
    Ray4D,
    /// Direction on the end effector points at the desired 3D position.
    Lookat3D,
    /// End effector origin and direction reach the desired translation and direction.
    TranslationDirection5D,
    TranslationXy2D,
    TranslationXyOrientation3D,
    TranslationLocalGlobal6D,
    TranslationXAxisAngle4D,
    TranslationYAxisAngle4D,
    TranslationZAxisAngle4D,
    TranslationXAxisAngleZNorm4D,
    TranslationYAxisAngleXNorm4D,
    TranslationZAxisAngleYNorm4D,
}

/// One raw solution as produced by the oracle: the joint values plus the echo
/// of the free parameter values this solution was computed for.
#[derive(Debug, Clone)]
pub struct RawSolution {
    joints: JointVector,
    free_values: Vec<f64>,
}

impl RawSolution {
    pub fn joints(&self) -> &[f64] {
        &self.joints
    }

    pub fn free_values(&self) -> &[f64] {
        &self.free_values
    }
}

/// Set of raw solutions returned by one oracle call. May be empty; the order
/// is the oracle's enumeration order and is used as the selection tie-break.
#[derive(Debug, Clone, Default)]
pub struct SolutionSet {
    solutions: Vec<RawSolution>,
}

impl SolutionSet {
    pub fn new() -> Self {
        SolutionSet { solutions: Vec::new() }
    }

    pub fn push(&mut self, joints: JointVector, free_values: Vec<f64>) {
        self.solutions.push(RawSolution { joints, free_values });
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RawSolution> {
        self.solutions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawSolution> {
        self.solutions.iter()
    }

    /// Appends all solutions of the other set, keeping enumeration order.
    pub fn merge(&mut self, other: SolutionSet) {
        self.solutions.extend(other.solutions);
    }
}

/// The closed form solver, generated externally per robot. This crate treats
/// it as an opaque oracle: given a target and values for any free joints it
/// returns zero or more algebraic solutions.
pub trait SolverOracle {
    /// The parameterization type this solver was generated for.
    fn parameterization(&self) -> IkParameterizationType;

    /// Indices of the free (redundant) joints. This crate supports at most one;
    /// more is a configuration error detected at initialization.
    fn free_parameters(&self) -> Vec<usize>;

    /// Number of joints the solver was generated for. Must match the DOF of
    /// the loaded chain.
    fn joint_count(&self) -> usize;

    /// Computes all algebraic IK solutions. `orientation` carries 9 values
    /// (row major rotation matrix) for the transform family and 3 values
    /// (direction) for the direction family, matching [`Self::parameterization`].
    /// `free_values` carries one value per free joint (0 or 1 entries here).
    fn compute_ik(&self, translation: &[f64; 3], orientation: &[f64], free_values: &[f64])
        -> SolutionSet;

    /// Forward kinematics: translation plus row major 3x3 rotation matrix.
    fn compute_fk(&self, joints: &[f64]) -> ([f64; 3], [f64; 9]);
}

/// Externally injected validity check (collision checking in the host
/// framework). Invoked synchronously after limit filtering; its cost is part
/// of the caller's timeout budget. A rejection reason is passed through to
/// the caller unmodified.
pub type ValidityCheck<'a> = dyn Fn(&Pose, &[f64]) -> Result<(), String> + 'a;

/// Search modes for [`Kinematics::search_ik_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Return the first candidate that passes limits and the validity check.
    OptimizeFreeJoint,
    /// Enumerate the whole range and keep the candidate whose largest
    /// per-joint displacement from the seed is smallest.
    OptimizeMaxJoint,
}

/// Strategy for sampling candidate values of the redundant joint in the
/// batch (multi solution) path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscretizationMethod {
    /// Use the seed value of the redundant joint only.
    NoDiscretization,
    /// Uniform steps from the lower to the upper bound, both bounds included.
    AllDiscretized,
    /// Uniformly distributed random values within the bounds.
    AllRandomSampled,
    /// Not supported by this solver, kept for interface compatibility.
    SomeDiscretized,
    /// Not supported by this solver, kept for interface compatibility.
    SomeRandomSampled,
}

/// Failure statuses of the kinematics services. These are returned as values,
/// nothing panics across the public boundary. `NoSolution` is the expected,
/// recoverable outcome; the rest distinguish misconfiguration and rejected
/// preconditions from a genuinely unreachable pose.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicError {
    /// The plugin was not (successfully) initialized; every call fails fast.
    SolverNotActive,
    SeedLengthMismatch { expected: usize, found: usize },
    ConsistencyLengthMismatch { expected: usize, found: usize },
    EmptyTipPoses,
    MultipleTipsNotSupported,
    SeedOutsideLimits { joint: usize, value: f64 },
    UnsupportedDiscretization(DiscretizationMethod),
    UnimplementedParameterization(IkParameterizationType),
    UnsupportedLink(String),
    /// The validity check vetoed the solution; carries its reason unmodified.
    Rejected(String),
    NoSolution,
}

impl fmt::Display for KinematicError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            KinematicError::SolverNotActive =>
                write!(f, "Kinematics not active"),
            KinematicError::SeedLengthMismatch { expected, found } =>
                write!(f, "Seed state must have size {} instead of size {}", expected, found),
            KinematicError::ConsistencyLengthMismatch { expected, found } =>
                write!(f, "Consistency limits must be empty or have size {} instead of size {}",
                       expected, found),
            KinematicError::EmptyTipPoses =>
                write!(f, "No tip poses or links given"),
            KinematicError::MultipleTipsNotSupported =>
                write!(f, "Multiple tip poses given, only one is allowed"),
            KinematicError::SeedOutsideLimits { joint, value } =>
                write!(f, "Seed value {} of joint {} is out of bounds", value, joint),
            KinematicError::UnsupportedDiscretization(method) =>
                write!(f, "Discretization method {:?} is not supported", method),
            KinematicError::UnimplementedParameterization(kind) =>
                write!(f, "IK for parameterization type {:?} not implemented", kind),
            KinematicError::UnsupportedLink(ref link) =>
                write!(f, "Can compute FK for the tip link only, not for {}", link),
            KinematicError::Rejected(ref reason) =>
                write!(f, "Solution rejected by the validity check: {}", reason),
            KinematicError::NoSolution =>
                write!(f, "No IK solution"),
        }
    }
}

impl std::error::Error for KinematicError {}

/// Rejection reasons of [`Kinematics::set_search_discretization`] and
/// [`Kinematics::set_redundant_joints`]. A rejected request leaves the
/// existing configuration unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscretizationError {
    EmptyMap,
    NoRedundantJoint,
    NotRedundant { requested: usize, redundant: usize },
    NonPositiveStep(f64),
    RedundantJointsFixed,
}

impl fmt::Display for DiscretizationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DiscretizationError::EmptyMap =>
                write!(f, "The discretization map is empty"),
            DiscretizationError::NoRedundantJoint =>
                write!(f, "This solver does not support redundant joints"),
            DiscretizationError::NotRedundant { requested, redundant } =>
                write!(f, "Attempted to discretize the non-redundant joint {}, only joint {} is redundant",
                       requested, redundant),
            DiscretizationError::NonPositiveStep(step) =>
                write!(f, "Discretization can not take values that are <= 0, got {}", step),
            DiscretizationError::RedundantJointsFixed =>
                write!(f, "Changing the redundant joints is not permitted by this solver"),
        }
    }
}

impl std::error::Error for DiscretizationError {}

/// The capability set this crate exposes to the host framework: forward
/// kinematics, single pose inverse kinematics (with and without redundancy
/// search), batch inverse kinematics, and discretization configuration.
pub trait Kinematics {
    /// Returns the IK solution that is within joint limits and closest
    /// to the seed state. No redundancy search is performed; the free joint,
    /// if any, keeps its seed value.
    fn position_ik(&self, pose: &Pose, seed: &[f64]) -> Result<JointVector, KinematicError>;

    /// Searches for a solution by stepping the redundant joint through its
    /// range around the seed value, within the wall clock timeout. For chains
    /// without a redundant joint this degrades to a single `position_ik` call.
    fn search_ik(&self, pose: &Pose, seed: &[f64], timeout: Duration)
        -> Result<JointVector, KinematicError> {
        self.search_ik_with(pose, seed, timeout, None, None)
    }

    /// Like [`Self::search_ik`], with an optional consistency window (per
    /// joint, how far the redundancy may deviate from the seed) and an
    /// optional validity check interposed before acceptance.
    fn search_ik_with(&self, pose: &Pose, seed: &[f64], timeout: Duration,
                      consistency_limits: Option<&[f64]>, check: Option<&ValidityCheck>)
        -> Result<JointVector, KinematicError>;

    /// Computes all limit obeying solutions for a single pose, sampling the
    /// redundant joint with the requested discretization method. `poses` must
    /// contain exactly one entry (multiple tips are not supported).
    fn position_ik_multi(&self, poses: &[Pose], seed: &[f64], method: DiscretizationMethod)
        -> Result<Vec<JointVector>, KinematicError>;

    /// Computes the pose of the tip link. Only available for the
    /// `Transform6D` parameterization and only for the declared tip link.
    fn position_fk(&self, link_names: &[String], joints: &[f64])
        -> Result<Vec<Pose>, KinematicError>;

    /// Replaces the discretization setting of the redundant joint. The map
    /// must contain exactly the redundant joint index with a positive step.
    fn set_search_discretization(&self, discretization: &BTreeMap<usize, f64>)
        -> Result<(), DiscretizationError>;

    /// The redundant joint of this chain is fixed at load time; any attempt
    /// to change it is rejected.
    fn set_redundant_joints(&self, indices: &[usize]) -> Result<(), DiscretizationError>;
}

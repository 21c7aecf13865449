//! The kinematics plugin: wires the solver adapter, limit filter, selector,
//! search engine and sampler into the capability set the motion planning
//! framework consumes.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use nalgebra::{Matrix3, Rotation3, Translation3, UnitQuaternion};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::chain::ChainDescriptor;
use crate::chain_error::ChainError;
use crate::kinematic_traits::{
    DiscretizationError, DiscretizationMethod, IkParameterizationType, JointVector, Kinematics,
    KinematicError, Pose, SearchMode, SolutionSet, SolverOracle, ValidityCheck,
};
use crate::limits::{max_joint_motion, obeys_limits, within_limits};
use crate::sampler::sample_redundant_joint;
use crate::search::{StepEnumerator, increment_counts};
use crate::selector::closest_to_seed;
use crate::solver_adapter;

/// Default step of the redundant joint search, radians.
pub const DEFAULT_SEARCH_DISCRETIZATION: f64 = 0.1;

/// State that only exists after a successful initialization. A plugin whose
/// initialization failed stays without it and reports `SolverNotActive` on
/// every call.
struct ActiveState {
    chain: ChainDescriptor,
    /// Index of the single redundant joint, fixed for the lifetime of the
    /// plugin. `None` for fully determined chains.
    free_joint: Option<usize>,
    /// Step of the redundant joint search, fixed at initialization.
    search_discretization: f64,
    /// Discretization of the batch path. Externally replaceable, so guarded;
    /// at most one entry (the redundant joint).
    discretization: Mutex<BTreeMap<usize, f64>>,
}

/// Kinematics services for one robot chain on top of one generated closed
/// form solver.
pub struct IkFastKinematics<O: SolverOracle> {
    oracle: O,
    state: Option<ActiveState>,
    search_mode: SearchMode,
    rng: Mutex<StdRng>,
}

impl<O: SolverOracle> IkFastKinematics<O> {
    /// Creates an inactive plugin around the oracle. Call
    /// [`Self::initialize`] before use.
    pub fn new(oracle: O) -> Self {
        IkFastKinematics {
            oracle,
            state: None,
            search_mode: SearchMode::OptimizeMaxJoint,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Convenience constructor that also initializes.
    pub fn initialized(
        oracle: O,
        chain: ChainDescriptor,
        search_discretization: f64,
    ) -> Result<Self, ChainError> {
        let mut plugin = Self::new(oracle);
        plugin.initialize(chain, search_discretization)?;
        Ok(plugin)
    }

    /// Sets the search mode for [`Kinematics::search_ik_with`]. The default
    /// is [`SearchMode::OptimizeMaxJoint`].
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Seeds the random source of `AllRandomSampled` discretization, making
    /// repeated batch queries reproducible.
    pub fn with_rng_seed(self, seed: u64) -> Self {
        *self.rng.lock().unwrap() = StdRng::seed_from_u64(seed);
        self
    }

    /// Validates the chain against the oracle and activates the plugin.
    /// Failures here are fatal configuration errors: the plugin stays
    /// inactive and every subsequent call fails fast.
    pub fn initialize(
        &mut self,
        chain: ChainDescriptor,
        search_discretization: f64,
    ) -> Result<(), ChainError> {
        let free_parameters = self.oracle.free_parameters();
        if free_parameters.len() > 1 {
            log::error!("Only one free joint parameter supported!");
            return Err(ChainError::TooManyFreeJoints(free_parameters.len()));
        }

        if self.oracle.joint_count() != chain.dof() {
            log::error!(
                "Joint numbers mismatch: URDF has {} and the solver has {}",
                chain.dof(),
                self.oracle.joint_count()
            );
            return Err(ChainError::DofMismatch {
                chain: chain.dof(),
                solver: self.oracle.joint_count(),
            });
        }

        let free_joint = free_parameters.first().copied();
        if let Some(index) = free_joint {
            if index >= chain.dof() {
                return Err(ChainError::KinematicsConfigurationError(format!(
                    "Free joint index {} exceeds the chain DOF {}",
                    index,
                    chain.dof()
                )));
            }
        }

        for (i, joint) in chain.joints().iter().enumerate() {
            log::debug!(
                "Joint {} {} {} {} limited: {}",
                i, joint.name, joint.min, joint.max, joint.has_limits
            );
        }

        let mut discretization = BTreeMap::new();
        if let Some(index) = free_joint {
            discretization.insert(index, search_discretization);
        }

        self.state = Some(ActiveState {
            chain,
            free_joint,
            search_discretization,
            discretization: Mutex::new(discretization),
        });
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// The wrapped closed form solver.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The chain this plugin was initialized with, if any.
    pub fn chain(&self) -> Option<&ChainDescriptor> {
        self.state.as_ref().map(|s| &s.chain)
    }

    /// Index of the redundant joint, fixed at initialization.
    pub fn redundant_joint(&self) -> Option<usize> {
        self.state.as_ref().and_then(|s| s.free_joint)
    }

    /// Snapshot of the current batch discretization configuration.
    pub fn discretization(&self) -> BTreeMap<usize, f64> {
        match &self.state {
            Some(state) => state.discretization.lock().unwrap().clone(),
            None => BTreeMap::new(),
        }
    }

    fn active(&self) -> Result<&ActiveState, KinematicError> {
        match &self.state {
            Some(state) => Ok(state),
            None => {
                log::error!("Kinematics not active");
                Err(KinematicError::SolverNotActive)
            }
        }
    }

    /// Seed must cover all chain joints and, where limits exist, sit within
    /// them (with tolerance, in case it starts exactly at a limit).
    fn check_seed(state: &ActiveState, seed: &[f64]) -> Result<(), KinematicError> {
        let dof = state.chain.dof();
        if seed.len() < dof {
            log::error!(
                "Seed state only has {} entries, this solver requires {}",
                seed.len(),
                dof
            );
            return Err(KinematicError::SeedLengthMismatch {
                expected: dof,
                found: seed.len(),
            });
        }
        for (i, joint) in state.chain.joints().iter().enumerate() {
            if !within_limits(joint, seed[i]) {
                log::debug!(
                    "Seed not in limits! joint {} value {} being {} to {}",
                    i, seed[i], joint.min, joint.max
                );
                return Err(KinematicError::SeedOutsideLimits {
                    joint: i,
                    value: seed[i],
                });
            }
        }
        Ok(())
    }
}

impl<O: SolverOracle> Kinematics for IkFastKinematics<O> {
    fn position_ik(&self, pose: &Pose, seed: &[f64]) -> Result<JointVector, KinematicError> {
        let state = self.active()?;
        Self::check_seed(state, seed)?;

        let dof = state.chain.dof();
        let free_values: Vec<f64> = state.free_joint.iter().map(|&p| seed[p]).collect();

        let solutions = solver_adapter::solve(&self.oracle, pose, &free_values)?;
        log::debug!("Found {} raw solutions", solutions.len());

        closest_to_seed(&solutions, state.chain.joints(), &seed[..dof])
            .ok_or(KinematicError::NoSolution)
    }

    fn search_ik_with(
        &self,
        pose: &Pose,
        seed: &[f64],
        timeout: Duration,
        consistency_limits: Option<&[f64]>,
        check: Option<&ValidityCheck>,
    ) -> Result<JointVector, KinematicError> {
        let state = self.active()?;

        // No free joints: nothing to search, a single oracle call decides.
        // This is the designed fast path, not an error.
        let Some(free_index) = state.free_joint else {
            log::debug!("No need to search since no free params/redundant joints");
            let solution = self.position_ik(pose, seed)?;
            if let Some(check) = check {
                if let Err(reason) = check(pose, &solution) {
                    log::debug!("Solution rejected by callback: {}", reason);
                    return Err(KinematicError::Rejected(reason));
                }
                log::debug!("Solution passes callback");
            }
            return Ok(solution);
        };

        let dof = state.chain.dof();
        if seed.len() < dof {
            log::error!(
                "Seed state only has {} entries, this solver requires {}",
                seed.len(),
                dof
            );
            return Err(KinematicError::SeedLengthMismatch {
                expected: dof,
                found: seed.len(),
            });
        }
        if let Some(limits) = consistency_limits {
            if !limits.is_empty() && limits.len() != dof {
                return Err(KinematicError::ConsistencyLengthMismatch {
                    expected: dof,
                    found: limits.len(),
                });
            }
        }

        let seed = &seed[..dof];
        let initial_guess = seed[free_index];
        let mut free_values = vec![initial_guess];

        let window = consistency_limits
            .filter(|limits| !limits.is_empty())
            .map(|limits| limits[free_index]);
        let (num_positive, num_negative) = increment_counts(
            state.chain.joint(free_index),
            initial_guess,
            state.search_discretization,
            window,
        );

        log::debug!(
            "Free param is {} initial guess is {}, # positive increments: {}, # negative increments: {}",
            free_index, initial_guess, num_positive, num_negative
        );
        if self.search_mode == SearchMode::OptimizeMaxJoint
            && num_positive + num_negative > 1000
        {
            log::warn!("Large search space, consider increasing the search discretization");
        }

        // A timeout too large to represent as an instant means no deadline.
        let deadline = Instant::now().checked_add(timeout);
        let mut stepper = StepEnumerator::new(num_positive, num_negative);
        let mut best: Option<(f64, JointVector)> = None;
        let mut attempts = 0usize;
        let mut valid = 0usize;

        loop {
            // The deadline is advisory: checked at iteration boundaries only,
            // a long running oracle call is never interrupted.
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                log::debug!("IK timed out before exhausting the search space");
                break;
            }

            let solutions = solver_adapter::solve(&self.oracle, pose, &free_values)?;
            log::debug!("Found {} raw solutions", solutions.len());

            for raw in solutions.iter() {
                attempts += 1;
                let candidate = raw.joints();
                if !obeys_limits(state.chain.joints(), candidate) {
                    continue;
                }

                // Within joint limits, now ask the external check if provided
                if let Some(check) = check {
                    if let Err(reason) = check(pose, candidate) {
                        log::debug!("Solution rejected by callback: {}", reason);
                        continue;
                    }
                }

                valid += 1;
                match self.search_mode {
                    SearchMode::OptimizeFreeJoint => {
                        return Ok(candidate.to_vec());
                    }
                    SearchMode::OptimizeMaxJoint => {
                        let cost = max_joint_motion(seed, candidate);
                        let improves = match &best {
                            Some((best_cost, _)) => cost < *best_cost,
                            None => true,
                        };
                        if improves {
                            best = Some((cost, candidate.to_vec()));
                        }
                    }
                }
            }

            if !stepper.advance() {
                // Everything searched
                break;
            }
            free_values[0] =
                initial_guess + state.search_discretization * stepper.counter() as f64;
        }

        log::debug!("Valid solutions: {}/{}", valid, attempts);

        if self.search_mode == SearchMode::OptimizeMaxJoint {
            if let Some((_, solution)) = best {
                return Ok(solution);
            }
        }
        Err(KinematicError::NoSolution)
    }

    fn position_ik_multi(
        &self,
        poses: &[Pose],
        seed: &[f64],
        method: DiscretizationMethod,
    ) -> Result<Vec<JointVector>, KinematicError> {
        let state = self.active()?;

        if poses.is_empty() {
            log::error!("No tip poses given");
            return Err(KinematicError::EmptyTipPoses);
        }
        if poses.len() > 1 {
            log::error!("Multiple tip poses given, only one is allowed");
            return Err(KinematicError::MultipleTipsNotSupported);
        }

        let dof = state.chain.dof();
        if seed.len() < dof {
            return Err(KinematicError::SeedLengthMismatch {
                expected: dof,
                found: seed.len(),
            });
        }

        let pose = &poses[0];
        let mut aggregate = SolutionSet::new();

        if let Some(free_index) = state.free_joint {
            let spec = state.chain.joint(free_index);
            let seed_value = seed[free_index];

            // The batch path validates the seed of the redundant joint before
            // use when it is taken verbatim.
            if method == DiscretizationMethod::NoDiscretization
                && spec.has_limits
                && !within_limits(spec, seed_value)
            {
                log::error!("IK seed is out of bounds");
                return Err(KinematicError::SeedOutsideLimits {
                    joint: free_index,
                    value: seed_value,
                });
            }

            let step = state
                .discretization
                .lock()
                .unwrap()
                .get(&free_index)
                .copied()
                .unwrap_or(state.search_discretization);

            let sampled = {
                let mut rng = self.rng.lock().unwrap();
                sample_redundant_joint(method, spec, seed_value, step, &mut *rng)?
            };

            for value in sampled {
                let solutions = solver_adapter::solve(&self.oracle, pose, &[value])?;
                aggregate.merge(solutions);
            }
        } else {
            let solutions = solver_adapter::solve(&self.oracle, pose, &[])?;
            aggregate.merge(solutions);
        }

        log::debug!("Found {} raw solutions over all samples", aggregate.len());

        let results: Vec<JointVector> = aggregate
            .iter()
            .filter(|raw| obeys_limits(state.chain.joints(), raw.joints()))
            .map(|raw| raw.joints().to_vec())
            .collect();

        if results.is_empty() {
            return Err(KinematicError::NoSolution);
        }
        Ok(results)
    }

    fn position_fk(
        &self,
        link_names: &[String],
        joints: &[f64],
    ) -> Result<Vec<Pose>, KinematicError> {
        let state = self.active()?;

        // ComputeFk is the inverse of ComputeIk, so the orientation layout
        // depends on the IK type; only Transform6D yields the full rotation
        // matrix we can turn into a pose.
        let kind = self.oracle.parameterization();
        if kind != IkParameterizationType::Transform6D {
            log::error!("Can only compute FK for the Transform6D IK type!");
            return Err(KinematicError::UnimplementedParameterization(kind));
        }

        if link_names.is_empty() {
            log::warn!("No link names given");
            return Err(KinematicError::EmptyTipPoses);
        }
        if link_names.len() > 1 {
            return Err(KinematicError::MultipleTipsNotSupported);
        }
        if link_names[0] != state.chain.tip_link() {
            log::error!("Can compute FK for {} only", state.chain.tip_link());
            return Err(KinematicError::UnsupportedLink(link_names[0].clone()));
        }

        let dof = state.chain.dof();
        if joints.len() < dof {
            return Err(KinematicError::SeedLengthMismatch {
                expected: dof,
                found: joints.len(),
            });
        }

        let (translation, rotation) = self.oracle.compute_fk(&joints[..dof]);
        let matrix = Matrix3::new(
            rotation[0], rotation[1], rotation[2],
            rotation[3], rotation[4], rotation[5],
            rotation[6], rotation[7], rotation[8],
        );
        let pose = Pose::from_parts(
            Translation3::new(translation[0], translation[1], translation[2]),
            UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(matrix)),
        );
        Ok(vec![pose])
    }

    fn set_search_discretization(
        &self,
        discretization: &BTreeMap<usize, f64>,
    ) -> Result<(), DiscretizationError> {
        if discretization.is_empty() {
            log::error!("The discretization map is empty");
            return Err(DiscretizationError::EmptyMap);
        }

        let free_joint = self.state.as_ref().and_then(|s| s.free_joint);
        let Some(redundant) = free_joint else {
            log::error!("This solver doesn't support redundant joints");
            return Err(DiscretizationError::NoRedundantJoint);
        };

        // As in the upstream interface, only the first entry is considered.
        let (&requested, &step) = discretization.iter().next().unwrap();
        if requested != redundant {
            log::error!(
                "Attempted to discretize a non-redundant joint {}, only joint {} is redundant",
                requested, redundant
            );
            return Err(DiscretizationError::NotRedundant { requested, redundant });
        }
        if step <= 0.0 {
            log::error!("Discretization can not take values that are <= 0");
            return Err(DiscretizationError::NonPositiveStep(step));
        }

        if let Some(state) = &self.state {
            let mut map = state.discretization.lock().unwrap();
            map.clear();
            map.insert(redundant, step);
        }
        Ok(())
    }

    fn set_redundant_joints(&self, _indices: &[usize]) -> Result<(), DiscretizationError> {
        log::error!("Changing the redundant joints isn't permitted by this solver");
        Err(DiscretizationError::RedundantJointsFixed)
    }
}

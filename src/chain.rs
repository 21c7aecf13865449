//! The kinematic chain descriptor: ordered joint names, limits and flags for
//! the chain from base to tip. Built once at initialization, read only after.

use std::f64::consts::PI;

use crate::chain_error::ChainError;

/// One joint of the chain. For continuous joints `has_limits` is false and the
/// bounds are fixed at +/- PI; they are used for the search range only, never
/// for limit filtering.
#[derive(Debug, Clone)]
pub struct JointSpec {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub has_limits: bool,
}

impl JointSpec {
    pub fn limited(name: &str, min: f64, max: f64) -> Self {
        JointSpec {
            name: name.to_string(),
            min,
            max,
            has_limits: true,
        }
    }

    pub fn continuous(name: &str) -> Self {
        JointSpec {
            name: name.to_string(),
            min: -PI,
            max: PI,
            has_limits: false,
        }
    }
}

/// Joints and links of the chain, ordered base to tip. The URDF loader walks
/// from the tip towards the base and reverses; constructing the descriptor
/// directly expects base to tip order already.
#[derive(Debug, Clone)]
pub struct ChainDescriptor {
    joints: Vec<JointSpec>,
    link_names: Vec<String>,
}

impl ChainDescriptor {
    pub fn new(joints: Vec<JointSpec>, link_names: Vec<String>) -> Result<Self, ChainError> {
        if joints.is_empty() {
            return Err(ChainError::KinematicsConfigurationError(
                "The chain has no movable joints".to_string(),
            ));
        }
        Ok(ChainDescriptor { joints, link_names })
    }

    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    pub fn joints(&self) -> &[JointSpec] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> &JointSpec {
        &self.joints[index]
    }

    pub fn joint_names(&self) -> Vec<String> {
        self.joints.iter().map(|j| j.name.clone()).collect()
    }

    pub fn link_names(&self) -> &[String] {
        &self.link_names
    }

    /// The link the oracle solves for; FK is only offered for this link.
    pub fn tip_link(&self) -> &str {
        self.link_names.last().map(String::as_str).unwrap_or("")
    }
}

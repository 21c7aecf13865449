//! Error handling for chain loading and solver configuration

use std::io;

/// Unified error to report failures during URDF parsing and plugin
/// initialization. These are fatal: the plugin stays inactive and every
/// subsequent call reports `SolverNotActive`.
#[derive(Debug)]
pub enum ChainError {
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    XmlProcessingError(String),
    UnknownLink(String),
    /// The URDF chain and the generated solver disagree on the joint count.
    DofMismatch { chain: usize, solver: usize },
    /// This plugin supports at most one free joint parameter.
    TooManyFreeJoints(usize),
    KinematicsConfigurationError(String),
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ChainError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ChainError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ChainError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            ChainError::XmlProcessingError(ref err) =>
                write!(f, "XML Processing Error: {}", err),
            ChainError::UnknownLink(ref link) =>
                write!(f, "Link not found in the robot model: {}", link),
            ChainError::DofMismatch { chain, solver } =>
                write!(f, "Joint numbers mismatch: URDF has {} and the solver has {}", chain, solver),
            ChainError::TooManyFreeJoints(count) =>
                write!(f, "Only one free joint parameter supported, the solver declares {}", count),
            ChainError::KinematicsConfigurationError(ref err) =>
                write!(f, "Kinematics Configuration Error: {}", err),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<io::Error> for ChainError {
    fn from(err: io::Error) -> Self {
        ChainError::IoError(err)
    }
}

use std::fmt;

use crate::{body::BodyId, vector::Vec3};

/// Errors returned by the simulation and its building blocks.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A body was given a mass that is not strictly positive and finite.
    InvalidMass {
        /// The rejected mass.
        mass: f64,
    },
    /// A body was given a radius that is not strictly positive and finite.
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },
    /// A scalar division by zero, or a division by a vector with a zero component.
    DivisionByZero,
    /// Point masses whose total mass is zero were combined.
    ZeroTotalMass,
    /// A body was inserted into a tree whose root region does not contain it.
    OutOfRegion {
        /// Identifier of the rejected body.
        id: BodyId,
        /// Position of the rejected body.
        position: Vec3,
    },
    /// A body position is NaN or infinite and cannot be located in space.
    NonFinitePosition {
        /// Identifier of the body.
        id: BodyId,
    },
    /// The Barnes-Hut threshold is negative or NaN.
    InvalidTheta {
        /// The rejected threshold.
        theta: f64,
    },
    /// The gravitational constant is NaN or infinite.
    InvalidGravitationalConstant {
        /// The rejected constant.
        g: f64,
    },
    /// The softening is negative, NaN or infinite.
    InvalidSoftening {
        /// The rejected softening.
        softening: f64,
    },
    /// The time step is NaN or infinite.
    InvalidTimeStep {
        /// The rejected time step.
        dt: f64,
    },
    /// No body with this identifier is part of the simulation.
    UnknownBody(BodyId),
    /// A body with this identifier is already part of the simulation.
    DuplicateBody(BodyId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMass { mass } => write!(f, "mass must be positive and finite, got {mass}"),
            Self::InvalidRadius { radius } => {
                write!(f, "radius must be positive and finite, got {radius}")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ZeroTotalMass => write!(f, "cannot combine point masses with zero total mass"),
            Self::OutOfRegion { id, position } => {
                write!(f, "body {id} at {position} lies outside the root region")
            }
            Self::NonFinitePosition { id } => write!(f, "body {id} has a non-finite position"),
            Self::InvalidTheta { theta } => {
                write!(f, "theta must be a non-negative number, got {theta}")
            }
            Self::InvalidGravitationalConstant { g } => {
                write!(f, "gravitational constant must be finite, got {g}")
            }
            Self::InvalidSoftening { softening } => {
                write!(f, "softening must be non-negative and finite, got {softening}")
            }
            Self::InvalidTimeStep { dt } => write!(f, "time step must be finite, got {dt}"),
            Self::UnknownBody(id) => write!(f, "no body with id {id}"),
            Self::DuplicateBody(id) => write!(f, "a body with id {id} is already simulated"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

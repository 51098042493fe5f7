#[cfg(feature = "parallel")]
/// Compute methods that use multiple CPU threads.
pub mod parallel;

/// Compute methods that use one CPU thread.
pub mod sequential;

use crate::{body::Body, gravity::Newtonian, vector::Vec3, Result};

/// Trait for algorithms computing the gravitational forces between [`Bodies`](Body).
///
/// # Example
///
/// ```
/// # use gravitree::prelude::*;
/// struct Weightless;
///
/// impl ComputeMethod for Weightless {
///     fn compute(&mut self, bodies: &[Body], _law: &Newtonian) -> Result<Vec<Vec3>> {
///         Ok(vec![Vec3::ZERO; bodies.len()])
///     }
/// }
/// ```
pub trait ComputeMethod {
    /// Computes the force the bodies exert on each other.
    ///
    /// The returned vector contains the total force on each body, in the same order they were
    /// input. Bodies are left untouched.
    fn compute(&mut self, bodies: &[Body], law: &Newtonian) -> Result<Vec<Vec3>>;
}

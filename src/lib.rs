//! # Gravitree
//!
//! Gravitree is a crate simulating the gravitational interaction of massive bodies in Rust, using
//! a [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) octree.
//!
//! ## Goals
//!
//! Computing the exact force between every pair of N bodies costs `O(N²)` per step. The octree
//! groups distant bodies into a single point mass at their center of mass, trading a bounded
//! accuracy loss for an `O(N log N)` step. The accuracy is ruled by a single threshold `theta`:
//! a region of size `s` at distance `d` is approximated when `s / d <= theta`. Exact direct
//! summation stays available as an alternative [`ComputeMethod`](compute_method::ComputeMethod).
//!
//! Force computation can run on multiple threads thanks to [rayon](https://github.com/rayon-rs/rayon).
//! Enable the "parallel" feature to access the available compute methods.
//!
//! # Using Gravitree
//!
//! ## Setting up the simulation
//!
//! A [`Simulation`](simulation::Simulation) owns its bodies and hands out their identifiers.
//! Bodies are created from a mass, a radius, a position and a velocity, all in SI units.
//!
//! ```
//! # use gravitree::prelude::*;
//! use gravitree::constants::*;
//!
//! let mut simulation = Simulation::new();
//!
//! let sun = simulation.add_body(SUN_MASS, 6.957e8, Vec3::ZERO, Vec3::ZERO)?;
//! let earth = simulation.add_body(
//!     EARTH_MASS,
//!     6.371e6,
//!     [SUN_EARTH_DISTANCE, 0.0, 0.0],
//!     [0.0, 29_780.0, 0.0],
//! )?;
//!
//! assert_eq!(simulation.len(), 2);
//! # Ok::<(), gravitree::Error>(())
//! ```
//!
//! ## Advancing the simulation
//!
//! Each call to [`advance`](simulation::Simulation::advance) rebuilds the octree, computes the
//! force on every body and integrates their motion. Accelerations, velocities and positions can
//! then be read back.
//!
//! ```
//! # use gravitree::prelude::*;
//! # use gravitree::constants::*;
//! # let mut simulation = Simulation::new();
//! # let sun = simulation.add_body(SUN_MASS, 6.957e8, Vec3::ZERO, Vec3::ZERO)?;
//! # let earth = simulation.add_body(EARTH_MASS, 6.371e6, [SUN_EARTH_DISTANCE, 0.0, 0.0], [0.0, 29_780.0, 0.0])?;
//! const HOUR: f64 = 3600.0;
//!
//! for _ in 0..24 {
//!     simulation.advance(HOUR)?;
//! }
//!
//! let earth = simulation.find(earth).unwrap();
//! assert!(earth.acceleration().x < 0.0);
//! assert!(earth.position().y > 0.0);
//! # Ok::<(), gravitree::Error>(())
//! ```

#![warn(missing_docs)]

/// Bodies of a simulation and their identifiers.
pub mod body;

/// Trait for computing forces and types implementing it for the user to choose from.
pub mod compute_method;

pub mod constants;

/// Error type of the crate.
pub mod error;

/// Point masses and the Newtonian force law.
pub mod gravity;

/// Step driver owning the bodies.
pub mod simulation;

/// Barnes-Hut octree.
pub mod tree;

/// Vector type used for positions, velocities and forces.
pub mod vector;

pub use error::{Error, Result};

/// Everything needed to use the crate.
pub mod prelude {
    pub use crate::body::{Body, BodyFactory, BodyId};
    pub use crate::compute_method::*;
    pub use crate::error::{Error, Result};
    pub use crate::gravity::{CenterOfMass, Newtonian, PointMass};
    pub use crate::simulation::{Method, Simulation, SimulationConfig};
    pub use crate::tree::{Octant, Octree, Region};
    pub use crate::vector::{CheckedDiv, Vec3};
}

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{body::Body, gravity::Newtonian, tree::Octree, vector::Vec3, Result};

use super::sequential::direct_force;

/// A brute-force [`ComputeMethod`](super::ComputeMethod) using the CPU with [rayon](https://github.com/rayon-rs/rayon).
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl super::ComputeMethod for BruteForce {
    #[inline]
    fn compute(&mut self, bodies: &[Body], law: &Newtonian) -> Result<Vec<Vec3>> {
        Ok(bodies
            .par_iter()
            .map(|target| direct_force(target, bodies, law))
            .collect())
    }
}

/// [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) [`ComputeMethod`](super::ComputeMethod) using the CPU with [rayon](https://github.com/rayon-rs/rayon) for the force computation.
///
/// The tree itself is built on the calling thread.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BarnesHut(pub super::sequential::BarnesHut);

impl super::ComputeMethod for BarnesHut {
    fn compute(&mut self, bodies: &[Body], law: &Newtonian) -> Result<Vec<Vec3>> {
        let tree = Octree::build(bodies, self.0.theta, self.0.max_depth)?;

        Ok(bodies.par_iter().map(|body| tree.compute_force(body, law)).collect())
    }
}

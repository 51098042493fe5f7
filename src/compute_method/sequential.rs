use crate::{
    body::Body,
    gravity::Newtonian,
    tree::{Octree, DEFAULT_MAX_DEPTH, DEFAULT_THETA},
    vector::Vec3,
    Result,
};

/// A brute-force [`ComputeMethod`](super::ComputeMethod) using the CPU.
///
/// Sums the exact pairwise force on every body in `O(N²)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl super::ComputeMethod for BruteForce {
    #[inline]
    fn compute(&mut self, bodies: &[Body], law: &Newtonian) -> Result<Vec<Vec3>> {
        Ok(bodies
            .iter()
            .map(|target| direct_force(target, bodies, law))
            .collect())
    }
}

/// Exact force exerted on `target` by every other body.
#[inline]
pub(crate) fn direct_force(target: &Body, bodies: &[Body], law: &Newtonian) -> Vec3 {
    let affected = target.point_mass();

    bodies
        .iter()
        .filter(|body| body.id() != target.id())
        .fold(Vec3::ZERO, |force, body| {
            force + law.force(affected, body.point_mass())
        })
}

/// [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) [`ComputeMethod`](super::ComputeMethod) using the CPU.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarnesHut {
    /// Parameter ruling the accuracy and speed of the algorithm. If 0, behaves the same as [`BruteForce`].
    pub theta: f64,
    /// Depth below which the [`Octree`] stops subdividing.
    pub max_depth: usize,
}

impl Default for BarnesHut {
    #[inline]
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl super::ComputeMethod for BarnesHut {
    fn compute(&mut self, bodies: &[Body], law: &Newtonian) -> Result<Vec<Vec3>> {
        let tree = Octree::build(bodies, self.theta, self.max_depth)?;

        Ok(bodies.iter().map(|body| tree.compute_force(body, law)).collect())
    }
}

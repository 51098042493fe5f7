/// Regions of space and their subdivision into octants.
pub mod region;

pub use region::{Octant, Region};

use crate::{
    body::Body,
    gravity::{CenterOfMass, Newtonian, PointMass},
    vector::Vec3,
    Error, Result,
};

/// Default value of the Barnes-Hut threshold.
pub const DEFAULT_THETA: f64 = 0.5;

/// Default bound on the depth of an [`Octree`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Returns `theta` if it is a valid Barnes-Hut threshold, that is non-negative and not NaN.
#[inline]
pub(crate) fn validate_theta(theta: f64) -> Result<f64> {
    if theta >= 0.0 {
        Ok(theta)
    } else {
        Err(Error::InvalidTheta { theta })
    }
}

/// What a [`Node`] of an [`Octree`] holds.
#[derive(Clone, Debug)]
pub enum Content<'a> {
    /// No body and no children.
    Empty,
    /// Exactly one body and no children.
    Body(&'a Body),
    /// Several bodies that could not be separated before reaching the depth bound of the tree,
    /// typically because they share the same position.
    Bucket(Vec<&'a Body>),
    /// Exactly 8 children, in [`Octant::ALL`] order, and no body.
    Children(Box<[Node<'a>; 8]>),
}

/// A node of an [`Octree`], covering a [`Region`] of space.
///
/// A node starts empty, holds a body after its first insertion and is subdivided into 8 children
/// on its second insertion, moving its body down into the matching child. A subdivided node never
/// merges back.
#[derive(Clone, Debug)]
pub struct Node<'a> {
    region: Region,
    center_of_mass: CenterOfMass,
    depth: usize,
    content: Content<'a>,
}

impl<'a> Node<'a> {
    #[inline]
    fn new(region: Region, depth: usize) -> Self {
        Self {
            region,
            center_of_mass: PointMass::new(region.center(), 0.0),
            depth,
            content: Content::Empty,
        }
    }

    /// Region covered by the node.
    #[inline]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Aggregated mass and position of everything contained in the node.
    #[inline]
    pub const fn center_of_mass(&self) -> CenterOfMass {
        self.center_of_mass
    }

    /// Depth of the node, the root being at depth 0.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// What the node holds.
    #[inline]
    pub const fn content(&self) -> &Content<'a> {
        &self.content
    }

    /// Returns `true` if the node holds neither a body nor children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self.content, Content::Empty)
    }

    /// Returns the body held by the node, if it holds exactly one.
    #[inline]
    pub fn body(&self) -> Option<&'a Body> {
        match self.content {
            Content::Body(body) => Some(body),
            _ => None,
        }
    }

    /// Returns the children of the node, if it is subdivided.
    #[inline]
    pub fn children(&self) -> Option<&[Node<'a>; 8]> {
        match &self.content {
            Content::Children(children) => Some(&**children),
            _ => None,
        }
    }

    fn insert(&mut self, body: &'a Body, max_depth: usize) -> Result<()> {
        match self.content {
            Content::Empty => {
                self.content = Content::Body(body);
                self.center_of_mass = body.point_mass();
                return Ok(());
            }
            Content::Body(held) if self.depth >= max_depth => {
                tracing::debug!(
                    depth = self.depth,
                    held = %held.id(),
                    inserted = %body.id(),
                    "depth bound reached, keeping bodies together"
                );
                self.content = Content::Bucket(vec![held, body]);
            }
            Content::Body(held) => {
                self.subdivide();
                self.insert_into_child(held, max_depth)?;
            }
            Content::Bucket(ref mut bodies) => bodies.push(body),
            Content::Children(_) => {}
        }

        self.center_of_mass = self.center_of_mass.combine(body.point_mass())?;

        if let Content::Children(_) = self.content {
            self.insert_into_child(body, max_depth)?;
        }

        Ok(())
    }

    fn subdivide(&mut self) {
        let depth = self.depth + 1;
        let children = self.region.split().map(|region| Node::new(region, depth));

        self.content = Content::Children(Box::new(children));
    }

    fn insert_into_child(&mut self, body: &'a Body, max_depth: usize) -> Result<()> {
        let octant = self.region.octant_of(body.position());

        match &mut self.content {
            Content::Children(children) => children[octant.index()].insert(body, max_depth),
            _ => Ok(()),
        }
    }

    fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&Self),
    {
        f(self);
        if let Content::Children(children) = &self.content {
            for child in children.iter() {
                child.visit(f);
            }
        }
    }
}

/// [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) octree over a set
/// of bodies.
///
/// The tree borrows the bodies it is built from and is meant to be rebuilt every simulation step.
/// Once built, it is only read to compute the [force](Octree::compute_force) exerted on each body.
///
/// # Example
///
/// ```
/// # use gravitree::prelude::*;
/// let mut factory = BodyFactory::new();
/// let bodies = vec![
///     factory.create(1.0, 1.0, [-1.0, 0.0, 0.0], [0.0; 3]).unwrap(),
///     factory.create(3.0, 1.0, [1.0, 0.0, 0.0], [0.0; 3]).unwrap(),
/// ];
///
/// let tree = Octree::build(&bodies, 0.5, 64).unwrap();
/// assert_eq!(tree.root().center_of_mass().mass, 4.0);
/// assert_eq!(tree.root().center_of_mass().position, Vec3::new(0.5, 0.0, 0.0));
///
/// let force = tree.compute_force(&bodies[0], &Newtonian::new(1.0));
/// assert_eq!(force, Vec3::new(0.75, 0.0, 0.0));
/// ```
#[derive(Clone, Debug)]
pub struct Octree<'a> {
    root: Node<'a>,
    theta: f64,
    max_depth: usize,
}

impl<'a> Octree<'a> {
    /// Creates a new empty [`Octree`] covering the given region, with the default threshold and
    /// depth bound.
    #[inline]
    pub fn new(region: Region) -> Self {
        Self {
            root: Node::new(region, 0),
            theta: DEFAULT_THETA,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the Barnes-Hut threshold of the tree.
    ///
    /// Returns [`Error::InvalidTheta`] if `theta` is negative or NaN.
    #[inline]
    pub fn with_theta(mut self, theta: f64) -> Result<Self> {
        self.set_theta(theta)?;
        Ok(self)
    }

    /// Sets the depth bound of the tree. Nodes at this depth keep every body inserted into them
    /// instead of subdividing.
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builds an [`Octree`] containing all the given bodies, over a cube enclosing them.
    ///
    /// Returns [`Error::NonFinitePosition`] if a body cannot be located in space and
    /// [`Error::InvalidTheta`] if `theta` is invalid.
    pub fn build(bodies: &'a [Body], theta: f64, max_depth: usize) -> Result<Self> {
        if let Some(body) = bodies.iter().find(|b| !b.position().is_finite()) {
            return Err(Error::NonFinitePosition { id: body.id() });
        }

        let region = Region::containing(bodies.iter().map(Body::position))
            .unwrap_or_else(|| Region::cube(Vec3::ZERO, 1.0));

        let mut tree = Self::new(region)
            .with_theta(theta)?
            .with_max_depth(max_depth);

        for body in bodies {
            tree.insert(body)?;
        }

        tracing::trace!(
            bodies = bodies.len(),
            nodes = tree.node_count(),
            depth = tree.depth(),
            "built octree"
        );

        Ok(tree)
    }

    /// Barnes-Hut threshold of the tree.
    #[inline]
    pub const fn theta(&self) -> f64 {
        self.theta
    }

    /// Sets the Barnes-Hut threshold of the tree.
    ///
    /// Returns [`Error::InvalidTheta`] and leaves the threshold unchanged if `theta` is negative
    /// or NaN.
    #[inline]
    pub fn set_theta(&mut self, theta: f64) -> Result<()> {
        self.theta = validate_theta(theta)?;
        Ok(())
    }

    /// Depth bound of the tree.
    #[inline]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Root node of the tree.
    #[inline]
    pub const fn root(&self) -> &Node<'a> {
        &self.root
    }

    /// Inserts a body in the tree.
    ///
    /// Returns [`Error::NonFinitePosition`] or [`Error::OutOfRegion`] if the body is not
    /// contained in the root region, in which case the tree is left unchanged.
    pub fn insert(&mut self, body: &'a Body) -> Result<()> {
        let position = body.position();

        if !position.is_finite() {
            return Err(Error::NonFinitePosition { id: body.id() });
        }

        if !self.root.region.contains(position) {
            return Err(Error::OutOfRegion {
                id: body.id(),
                position,
            });
        }

        self.root.insert(body, self.max_depth)
    }

    /// Returns the approximate force the bodies of the tree exert on `target`.
    ///
    /// A subdivided node whose size `s` and distance `d` from `target` to its center of mass
    /// satisfy `s / d <= theta` is treated as a single point mass. Otherwise its children are
    /// visited. A node whose region contains `target` is always visited, so a body never exerts a
    /// force on itself whatever the threshold.
    pub fn compute_force(&self, target: &Body, law: &Newtonian) -> Vec3 {
        let affected = target.point_mass();
        let mut force = Vec3::ZERO;

        let mut stack = Vec::with_capacity(8 * (self.max_depth.min(16) + 1));
        stack.push(&self.root);

        while let Some(node) = stack.pop() {
            match &node.content {
                Content::Empty => {}
                Content::Body(body) => {
                    if body.id() != target.id() {
                        force += law.force(affected, body.point_mass());
                    }
                }
                Content::Bucket(bodies) => {
                    for body in bodies.iter().filter(|b| b.id() != target.id()) {
                        force += law.force(affected, body.point_mass());
                    }
                }
                Content::Children(children) => {
                    let distance = affected.position.distance(node.center_of_mass.position);

                    if !node.region.contains(affected.position)
                        && node.region.size() <= self.theta * distance
                    {
                        force += law.force(affected, node.center_of_mass);
                    } else {
                        stack.extend(children.iter().rev());
                    }
                }
            }
        }

        force
    }

    /// Number of bodies in the tree.
    pub fn len(&self) -> usize {
        let mut len = 0;
        self.root.visit(&mut |node| {
            len += match &node.content {
                Content::Body(_) => 1,
                Content::Bucket(bodies) => bodies.len(),
                _ => 0,
            }
        });
        len
    }

    /// Returns `true` if the tree contains no body.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of nodes in the tree, including empty ones.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(&mut |_| count += 1);
        count
    }

    /// Depth of the deepest node of the tree.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        self.root.visit(&mut |node| depth = depth.max(node.depth));
        depth
    }
}

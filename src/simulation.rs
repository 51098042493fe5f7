use crate::{
    body::{Body, BodyFactory, BodyId},
    compute_method::{sequential, ComputeMethod},
    constants,
    gravity::Newtonian,
    tree::{validate_theta, DEFAULT_MAX_DEPTH, DEFAULT_THETA},
    vector::Vec3,
    Error, Result,
};

/// Algorithm used to compute the forces during a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    /// Approximate `O(N log N)` forces from an [`Octree`](crate::tree::Octree).
    #[default]
    BarnesHut,
    /// Exact `O(N²)` forces from every pair of bodies.
    BruteForce,
}

impl Method {
    /// Returns the other method.
    #[inline]
    pub const fn toggled(self) -> Self {
        match self {
            Self::BarnesHut => Self::BruteForce,
            Self::BruteForce => Self::BarnesHut,
        }
    }
}

/// Parameters of a [`Simulation`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Barnes-Hut threshold. 0 visits every body, larger values approximate more.
    pub theta: f64,
    /// Time step used by [`Simulation::step`].
    pub delta_time: f64,
    /// Gravitational constant of the force law.
    pub gravitational_constant: f64,
    /// Softening `ε²` added to squared distances by the force law.
    pub softening: f64,
    /// Depth bound of the octree.
    pub max_depth: usize,
    /// Algorithm used to compute the forces.
    pub method: Method,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
            delta_time: 1.0,
            gravitational_constant: constants::G,
            softening: 0.0,
            max_depth: DEFAULT_MAX_DEPTH,
            method: Method::BarnesHut,
        }
    }
}

impl SimulationConfig {
    /// Force law described by the configuration.
    #[inline]
    pub fn law(&self) -> Newtonian {
        Newtonian::softened(self.gravitational_constant, self.softening)
    }

    fn validate(&self) -> Result<()> {
        validate_theta(self.theta)?;
        validate_time_step(self.delta_time)?;
        Newtonian::checked(self.gravitational_constant, self.softening)?;
        Ok(())
    }
}

#[inline]
fn validate_time_step(dt: f64) -> Result<f64> {
    if dt.is_finite() {
        Ok(dt)
    } else {
        Err(Error::InvalidTimeStep { dt })
    }
}

/// A set of bodies evolving under their mutual gravity.
///
/// Every [step](Simulation::advance) builds a fresh octree over all bodies, computes the force on
/// each of them and integrates their motion with semi-implicit Euler.
///
/// # Example
///
/// ```
/// # use gravitree::prelude::*;
/// let mut simulation = Simulation::with_config(SimulationConfig {
///     gravitational_constant: 1.0,
///     ..Default::default()
/// })
/// .unwrap();
///
/// let a = simulation.add_body(1.0, 1.0, [-1.0, 0.0, 0.0], [0.0; 3]).unwrap();
/// let b = simulation.add_body(1.0, 1.0, [1.0, 0.0, 0.0], [0.0; 3]).unwrap();
///
/// simulation.advance(0.1).unwrap();
///
/// let (a, b) = (simulation.find(a).unwrap(), simulation.find(b).unwrap());
/// assert!(a.position().x > -1.0 && b.position().x < 1.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Simulation {
    // Sorted by identifier.
    bodies: Vec<Body>,
    factory: BodyFactory,
    config: SimulationConfig,
    elapsed: f64,
}

impl Simulation {
    /// Creates a new empty [`Simulation`] with the default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty [`Simulation`] with the given configuration.
    ///
    /// Returns [`Error::InvalidTheta`], [`Error::InvalidTimeStep`],
    /// [`Error::InvalidGravitationalConstant`] or [`Error::InvalidSoftening`] if the configuration
    /// is invalid.
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Configuration of the simulation.
    #[inline]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Creates a body and adds it to the simulation, returning its identifier.
    ///
    /// Returns [`Error::InvalidMass`] or [`Error::InvalidRadius`] if either is not strictly
    /// positive and finite.
    pub fn add_body(
        &mut self,
        mass: f64,
        radius: f64,
        position: impl Into<Vec3>,
        velocity: impl Into<Vec3>,
    ) -> Result<BodyId> {
        let body = self.factory.create(mass, radius, position, velocity)?;
        let id = body.id();

        self.bodies.push(body);
        Ok(id)
    }

    /// Creates and adds several bodies given as `(mass, radius, position, velocity)`.
    ///
    /// Either every body is added or, on the first invalid one, none is and no identifier is
    /// consumed.
    pub fn add_bodies<I, P, V>(&mut self, bodies: I) -> Result<Vec<BodyId>>
    where
        I: IntoIterator<Item = (f64, f64, P, V)>,
        P: Into<Vec3>,
        V: Into<Vec3>,
    {
        let mut factory = self.factory.clone();

        let created = bodies
            .into_iter()
            .map(|(mass, radius, position, velocity)| {
                factory.create(mass, radius, position, velocity)
            })
            .collect::<Result<Vec<_>>>()?;

        let ids = created.iter().map(Body::id).collect();

        self.factory = factory;
        self.bodies.extend(created);

        Ok(ids)
    }

    /// Adds an existing body to the simulation, such as one returned by
    /// [`remove_body`](Self::remove_body) or created by another [`BodyFactory`].
    ///
    /// Returns [`Error::DuplicateBody`] if a body with the same identifier is already simulated.
    /// Bodies created by the simulation afterwards get greater identifiers.
    pub fn insert_body(&mut self, body: Body) -> Result<()> {
        let index = match self.bodies.binary_search_by_key(&body.id(), Body::id) {
            Ok(_) => return Err(Error::DuplicateBody(body.id())),
            Err(index) => index,
        };

        self.factory.skip_past(body.id());
        self.bodies.insert(index, body);

        Ok(())
    }

    /// Removes a body from the simulation and returns it.
    ///
    /// Returns [`Error::UnknownBody`] if no body has this identifier.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body> {
        let index = self.index_of(id).ok_or(Error::UnknownBody(id))?;

        Ok(self.bodies.remove(index))
    }

    /// Returns the body with the given identifier.
    #[inline]
    pub fn find(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|index| &self.bodies[index])
    }

    /// Returns the body with the given identifier, to edit it between steps.
    #[inline]
    pub fn find_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(|index| &mut self.bodies[index])
    }

    /// Returns the first body with the given name.
    #[inline]
    pub fn find_by_name(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|body| body.name() == Some(name))
    }

    /// Same as [`find_mut`](Self::find_mut), but returns [`Error::UnknownBody`] if no body has this
    /// identifier.
    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> Result<&mut Body> {
        self.find_mut(id).ok_or(Error::UnknownBody(id))
    }

    #[inline]
    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, Body::id).ok()
    }

    /// Bodies of the simulation, in identifier order.
    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Number of bodies in the simulation.
    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if the simulation contains no body.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Sum of the masses of all the bodies.
    #[inline]
    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(Body::mass).sum()
    }

    /// Barnes-Hut threshold.
    #[inline]
    pub const fn theta(&self) -> f64 {
        self.config.theta
    }

    /// Sets the Barnes-Hut threshold.
    ///
    /// Returns [`Error::InvalidTheta`] and leaves the threshold unchanged if `theta` is negative
    /// or NaN.
    pub fn set_theta(&mut self, theta: f64) -> Result<()> {
        self.config.theta = validate_theta(theta)?;
        Ok(())
    }

    /// Algorithm used to compute the forces.
    #[inline]
    pub const fn method(&self) -> Method {
        self.config.method
    }

    /// Sets the algorithm used to compute the forces.
    #[inline]
    pub fn set_method(&mut self, method: Method) {
        self.config.method = method;
    }

    /// Switches between [`Method::BarnesHut`] and [`Method::BruteForce`], returning the new method.
    #[inline]
    pub fn toggle_method(&mut self) -> Method {
        self.config.method = self.config.method.toggled();
        self.config.method
    }

    /// Time step used by [`step`](Self::step).
    #[inline]
    pub const fn delta_time(&self) -> f64 {
        self.config.delta_time
    }

    /// Sets the time step used by [`step`](Self::step).
    ///
    /// Returns [`Error::InvalidTimeStep`] and leaves the time step unchanged if `dt` is not
    /// finite.
    pub fn set_delta_time(&mut self, dt: f64) -> Result<()> {
        self.config.delta_time = validate_time_step(dt)?;
        Ok(())
    }

    /// Simulated time elapsed over all the steps so far.
    #[inline]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advances the simulation by the configured [time step](Self::delta_time).
    #[inline]
    pub fn step(&mut self) -> Result<()> {
        self.advance(self.config.delta_time)
    }

    /// Advances the simulation by `dt`.
    ///
    /// Forces are recomputed from scratch, then each body's velocity is updated from its
    /// acceleration and its position from the updated velocity.
    ///
    /// On error no body is modified. Errors are [`Error::InvalidTimeStep`] if `dt` is not finite,
    /// [`Error::NonFinitePosition`] if a body has been moved to a NaN or infinite position and
    /// [`Error::InvalidTheta`] if the configured threshold is invalid.
    pub fn advance(&mut self, dt: f64) -> Result<()> {
        let dt = validate_time_step(dt)?;

        if let Some(body) = self.bodies.iter().find(|b| !b.position().is_finite()) {
            return Err(Error::NonFinitePosition { id: body.id() });
        }

        let _span = tracing::debug_span!(
            "advance",
            dt,
            bodies = self.bodies.len(),
            method = ?self.config.method
        )
        .entered();

        let forces = self.compute_forces()?;
        let accelerations = self
            .bodies
            .iter()
            .zip(&forces)
            .map(|(body, &force)| body.acceleration_under(force))
            .collect::<Result<Vec<_>>>()?;

        for ((body, force), acceleration) in self.bodies.iter_mut().zip(forces).zip(accelerations)
        {
            body.reset_force();
            body.add_force(force);
            body.integrate(acceleration, dt);
        }

        self.elapsed += dt;

        Ok(())
    }

    #[inline]
    fn barnes_hut(&self) -> sequential::BarnesHut {
        sequential::BarnesHut {
            theta: self.config.theta,
            max_depth: self.config.max_depth,
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_forces(&self) -> Result<Vec<Vec3>> {
        let law = self.config.law();

        match self.config.method {
            Method::BarnesHut => self.barnes_hut().compute(&self.bodies, &law),
            Method::BruteForce => sequential::BruteForce.compute(&self.bodies, &law),
        }
    }

    #[cfg(feature = "parallel")]
    fn compute_forces(&self) -> Result<Vec<Vec3>> {
        use crate::compute_method::parallel;

        let law = self.config.law();

        match self.config.method {
            Method::BarnesHut => parallel::BarnesHut(self.barnes_hut()).compute(&self.bodies, &law),
            Method::BruteForce => parallel::BruteForce.compute(&self.bodies, &law),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_gravity() -> Simulation {
        Simulation::with_config(SimulationConfig {
            gravitational_constant: 1.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn default_config() {
        let config = SimulationConfig::default();

        assert_eq!(config.theta, 0.5);
        assert_eq!(config.delta_time, 1.0);
        assert_eq!(config.gravitational_constant, constants::G);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.method, Method::BarnesHut);
        assert_eq!(config.law(), Newtonian::default());
    }

    #[test]
    fn invalid_config() {
        assert_eq!(
            Simulation::with_config(SimulationConfig {
                theta: -1.0,
                ..Default::default()
            })
            .map(|s| s.len()),
            Err(Error::InvalidTheta { theta: -1.0 })
        );
        assert!(matches!(
            Simulation::with_config(SimulationConfig {
                delta_time: f64::NAN,
                ..Default::default()
            }),
            Err(Error::InvalidTimeStep { .. })
        ));
        assert_eq!(
            Simulation::with_config(SimulationConfig {
                softening: -1.0,
                ..Default::default()
            })
            .map(|s| s.len()),
            Err(Error::InvalidSoftening { softening: -1.0 })
        );
        assert!(matches!(
            Simulation::with_config(SimulationConfig {
                gravitational_constant: f64::INFINITY,
                ..Default::default()
            }),
            Err(Error::InvalidGravitationalConstant { .. })
        ));
    }

    #[test]
    fn softened_close_bodies_stay_finite() {
        let mut simulation = Simulation::with_config(SimulationConfig {
            gravitational_constant: 1.0,
            softening: 0.25,
            ..Default::default()
        })
        .unwrap();
        simulation.add_body(1.0, 1.0, [0.0, 0.0, 0.0], Vec3::ZERO).unwrap();
        simulation.add_body(1.0, 1.0, [0.5, 0.0, 0.0], Vec3::ZERO).unwrap();

        simulation.advance(0.1).unwrap();
        simulation.advance(0.1).unwrap();

        assert!(simulation
            .bodies()
            .iter()
            .all(|body| body.position().is_finite() && body.velocity().is_finite()));
    }

    #[test]
    fn reinsertion() {
        let mut simulation = Simulation::new();
        let a = simulation.add_body(1.0, 1.0, Vec3::ZERO, Vec3::ZERO).unwrap();
        let b = simulation.add_body(2.0, 1.0, Vec3::X, Vec3::ZERO).unwrap();
        let c = simulation.add_body(3.0, 1.0, Vec3::Y, Vec3::ZERO).unwrap();

        let removed = simulation.remove_body(b).unwrap();
        simulation.insert_body(removed.clone()).unwrap();
        assert_eq!(
            simulation.bodies().iter().map(Body::id).collect::<Vec<_>>(),
            vec![a, b, c]
        );
        assert_eq!(simulation.insert_body(removed), Err(Error::DuplicateBody(b)));
        assert_eq!(simulation.len(), 3);

        let mut factory = BodyFactory::new();
        let foreign: Vec<_> = (0..10)
            .map(|_| factory.create(1.0, 1.0, Vec3::Z, Vec3::ZERO).unwrap())
            .collect();
        let last = foreign[9].clone();
        simulation.insert_body(last.clone()).unwrap();

        let d = simulation.add_body(1.0, 1.0, Vec3::ONE, Vec3::ZERO).unwrap();
        assert!(d > last.id());
        assert_eq!(
            simulation.bodies().iter().map(Body::id).collect::<Vec<_>>(),
            vec![a, b, c, last.id(), d]
        );
    }

    #[test]
    fn lookup_by_name() {
        let mut simulation = Simulation::new();
        let sun = simulation.add_body(10.0, 1.0, Vec3::ZERO, Vec3::ZERO).unwrap();
        simulation.add_body(1.0, 1.0, Vec3::X, Vec3::ZERO).unwrap();

        simulation.body_mut(sun).unwrap().set_name("Sun");
        let earth = BodyFactory::new()
            .create(0.5, 1.0, Vec3::Y, Vec3::ZERO)
            .unwrap()
            .with_name("Earth");
        let earth_id = earth.id();
        assert_eq!(simulation.insert_body(earth), Err(Error::DuplicateBody(earth_id)));

        assert_eq!(simulation.find_by_name("Sun").map(Body::id), Some(sun));
        assert_eq!(simulation.find_by_name("Earth"), None);
    }

    #[test]
    fn bookkeeping() {
        let mut simulation = Simulation::new();
        assert!(simulation.is_empty());

        let a = simulation.add_body(2.0, 1.0, Vec3::ZERO, Vec3::ZERO).unwrap();
        let b = simulation.add_body(3.0, 1.0, Vec3::X, Vec3::ZERO).unwrap();
        let c = simulation.add_body(5.0, 1.0, Vec3::Y, Vec3::ZERO).unwrap();

        assert_eq!(simulation.len(), 3);
        assert_eq!(simulation.total_mass(), 10.0);
        assert_eq!(simulation.find(b).map(Body::mass), Some(3.0));

        let removed = simulation.remove_body(b).unwrap();
        assert_eq!(removed.id(), b);
        assert_eq!(simulation.find(b), None);
        assert_eq!(simulation.remove_body(b), Err(Error::UnknownBody(b)));
        assert_eq!(
            simulation.bodies().iter().map(Body::id).collect::<Vec<_>>(),
            vec![a, c]
        );

        // Identifiers are never reused.
        let d = simulation.add_body(1.0, 1.0, Vec3::Z, Vec3::ZERO).unwrap();
        assert!(d > c);

        simulation.find_mut(a).unwrap().set_mass(4.0).unwrap();
        assert_eq!(
            simulation.body_mut(a).and_then(|body| body.set_radius(-1.0)),
            Err(Error::InvalidRadius { radius: -1.0 })
        );
        assert!(matches!(
            simulation.body_mut(b),
            Err(Error::UnknownBody(id)) if id == b
        ));
        assert_eq!(simulation.total_mass(), 10.0);
    }

    #[test]
    fn batch_insertion_is_all_or_nothing() {
        let mut simulation = Simulation::new();

        let rejected = simulation.add_bodies([
            (1.0, 1.0, Vec3::ZERO, Vec3::ZERO),
            (-1.0, 1.0, Vec3::ONE, Vec3::ZERO),
        ]);
        assert_eq!(rejected, Err(Error::InvalidMass { mass: -1.0 }));
        assert!(simulation.is_empty());

        let ids = simulation
            .add_bodies([
                (1.0, 1.0, [0.0, 0.0, 0.0], [0.0; 3]),
                (2.0, 1.0, [1.0, 0.0, 0.0], [0.0; 3]),
            ])
            .unwrap();
        assert_eq!(ids.iter().map(|id| id.get()).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(simulation.len(), 2);
    }

    #[test]
    fn settings() {
        let mut simulation = Simulation::new();

        assert_eq!(simulation.toggle_method(), Method::BruteForce);
        assert_eq!(simulation.method(), Method::BruteForce);
        simulation.set_method(Method::BarnesHut);
        assert_eq!(simulation.method(), Method::BarnesHut);

        simulation.set_theta(0.8).unwrap();
        assert_eq!(
            simulation.set_theta(f64::NAN).map_err(|e| e.to_string()),
            Err("theta must be a non-negative number, got NaN".to_owned())
        );
        assert_eq!(simulation.theta(), 0.8);

        simulation.set_delta_time(0.25).unwrap();
        assert!(simulation.set_delta_time(f64::INFINITY).is_err());
        assert_eq!(simulation.delta_time(), 0.25);
    }

    #[test]
    fn single_body_stasis() {
        let mut simulation = unit_gravity();
        let id = simulation
            .add_body(5.0, 1.0, [3.0, -2.0, 1.0], Vec3::ZERO)
            .unwrap();

        simulation.step().unwrap();

        let body = simulation.find(id).unwrap();
        assert_eq!(body.acceleration(), Vec3::ZERO);
        assert_eq!(body.force(), Vec3::ZERO);
        assert_eq!(body.position(), Vec3::new(3.0, -2.0, 1.0));
        assert_eq!(simulation.elapsed(), 1.0);
    }

    #[test]
    fn empty_simulation_advances() {
        let mut simulation = Simulation::new();

        simulation.advance(2.0).unwrap();
        assert_eq!(simulation.elapsed(), 2.0);
    }

    #[test]
    fn two_body_attraction() {
        for method in [Method::BarnesHut, Method::BruteForce] {
            let mut simulation = unit_gravity();
            simulation.set_method(method);

            let a = simulation.add_body(1.0, 1.0, [-1.0, 0.0, 0.0], Vec3::ZERO).unwrap();
            let b = simulation.add_body(1.0, 1.0, [1.0, 0.0, 0.0], Vec3::ZERO).unwrap();

            simulation.advance(0.1).unwrap();

            let (a, b) = (simulation.find(a).unwrap(), simulation.find(b).unwrap());

            // F = 1 / 2² = 0.25, so v = 0.025 and x moves by 0.0025.
            assert!(a.acceleration().abs_diff_eq(Vec3::new(0.25, 0.0, 0.0), 1e-15));
            assert!(b.acceleration().abs_diff_eq(Vec3::new(-0.25, 0.0, 0.0), 1e-15));
            assert!(a.force().abs_diff_eq(-b.force(), 1e-15));
            assert!((a.position().x + 0.9975).abs() < 1e-15);
            assert!((b.position().x - 0.9975).abs() < 1e-15);
            assert!(b.position().x - a.position().x < 2.0);
        }
    }

    #[test]
    fn barnes_hut_tracks_brute_force() {
        let bodies = (0..6 * 6 * 6).map(|i| {
            let (x, y, z) = ((i % 6) as f64, ((i / 6) % 6) as f64, (i / 36) as f64);
            let position = Vec3::new(x, y, z) * 10.0 + Vec3::new(z, x, y) * 0.37;
            (1.0 + (i % 5) as f64, 1.0, position, Vec3::ZERO)
        });

        let mut exact = unit_gravity();
        exact.set_method(Method::BruteForce);
        exact.add_bodies(bodies.clone()).unwrap();

        let mut approximate = unit_gravity();
        approximate.set_theta(0.0).unwrap();
        approximate.add_bodies(bodies).unwrap();

        for _ in 0..3 {
            exact.advance(0.5).unwrap();
            approximate.advance(0.5).unwrap();
        }

        for (exact, approximate) in exact.bodies().iter().zip(approximate.bodies()) {
            assert_eq!(exact.id(), approximate.id());
            assert!(exact.position().abs_diff_eq(approximate.position(), 1e-9));
            assert!(exact.velocity().abs_diff_eq(approximate.velocity(), 1e-9));
        }
    }

    #[test]
    fn failed_step_changes_nothing() {
        let mut simulation = unit_gravity();
        simulation.add_body(1.0, 1.0, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]).unwrap();
        let lost = simulation.add_body(1.0, 1.0, [1.0, 0.0, 0.0], Vec3::ZERO).unwrap();

        simulation.step().unwrap();
        simulation
            .find_mut(lost)
            .unwrap()
            .set_position([f64::INFINITY, 0.0, 0.0]);

        let before = simulation.bodies().to_vec();

        assert_eq!(
            simulation.advance(1.0),
            Err(Error::NonFinitePosition { id: lost })
        );
        assert!(matches!(
            simulation.advance(f64::NAN),
            Err(Error::InvalidTimeStep { .. })
        ));

        simulation.set_method(Method::BruteForce);
        assert_eq!(
            simulation.advance(1.0),
            Err(Error::NonFinitePosition { id: lost })
        );

        assert_eq!(simulation.bodies(), &before[..]);
        assert_eq!(simulation.elapsed(), 1.0);

        simulation.find_mut(lost).unwrap().set_position(Vec3::X);
        simulation.advance(1.0).unwrap();
        assert_eq!(simulation.elapsed(), 2.0);
    }
}

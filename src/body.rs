use std::fmt;

use crate::{
    gravity::PointMass,
    vector::{CheckedDiv, Vec3},
    Error, Result,
};

/// Unique identifier of a [`Body`].
///
/// Identifiers are handed out in increasing order by a [`BodyFactory`] and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyId(u64);

impl BodyId {
    /// Returns the raw value of the identifier.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Creates [`Body`] values with monotonically increasing identifiers.
#[derive(Clone, Debug)]
pub struct BodyFactory {
    next: u64,
}

impl Default for BodyFactory {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl BodyFactory {
    /// Creates a new [`BodyFactory`] whose first identifier is 1.
    #[inline]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Makes sure identifiers handed out from now on are greater than `id`.
    #[inline]
    pub(crate) fn skip_past(&mut self, id: BodyId) {
        self.next = self.next.max(id.0 + 1);
    }

    /// Creates a new [`Body`] at rest with respect to forces.
    ///
    /// Returns [`Error::InvalidMass`] or [`Error::InvalidRadius`] if either is not strictly
    /// positive and finite, in which case no identifier is consumed.
    pub fn create(
        &mut self,
        mass: f64,
        radius: f64,
        position: impl Into<Vec3>,
        velocity: impl Into<Vec3>,
    ) -> Result<Body> {
        validate_mass(mass)?;
        validate_radius(radius)?;

        let id = BodyId(self.next);
        self.next += 1;

        Ok(Body {
            id,
            name: None,
            mass,
            radius,
            position: position.into(),
            velocity: velocity.into(),
            acceleration: Vec3::ZERO,
            force: Vec3::ZERO,
        })
    }
}

#[inline]
fn validate_mass(mass: f64) -> Result<()> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidMass { mass })
    }
}

#[inline]
fn validate_radius(radius: f64) -> Result<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidRadius { radius })
    }
}

/// A simulated spherical mass.
///
/// The force and acceleration are outputs of the last simulation step; they are recomputed from
/// scratch every step.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    id: BodyId,
    name: Option<String>,
    mass: f64,
    radius: f64,
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    force: Vec3,
}

impl Body {
    /// Returns the identifier of the body.
    #[inline]
    pub const fn id(&self) -> BodyId {
        self.id
    }

    /// Returns the name of the body, if it was given one.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Gives a name to the body.
    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Returns the mass of the body.
    #[inline]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// Returns the radius of the body.
    #[inline]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the position of the body.
    #[inline]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Returns the velocity of the body.
    #[inline]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Returns the acceleration computed during the last step.
    #[inline]
    pub const fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Returns the force accumulated during the last step.
    #[inline]
    pub const fn force(&self) -> Vec3 {
        self.force
    }

    /// Returns the body as a [`PointMass`].
    #[inline]
    pub fn point_mass(&self) -> PointMass {
        PointMass::new(self.position, self.mass)
    }

    /// Sets the mass of the body.
    ///
    /// Returns [`Error::InvalidMass`] and leaves the body unchanged if the mass is not strictly
    /// positive and finite.
    #[inline]
    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        validate_mass(mass)?;
        self.mass = mass;
        Ok(())
    }

    /// Sets the radius of the body.
    ///
    /// Returns [`Error::InvalidRadius`] and leaves the body unchanged if the radius is not
    /// strictly positive and finite.
    #[inline]
    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        validate_radius(radius)?;
        self.radius = radius;
        Ok(())
    }

    /// Sets the name of the body.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Sets the position of the body.
    #[inline]
    pub fn set_position(&mut self, position: impl Into<Vec3>) {
        self.position = position.into();
    }

    /// Sets the velocity of the body.
    #[inline]
    pub fn set_velocity(&mut self, velocity: impl Into<Vec3>) {
        self.velocity = velocity.into();
    }

    #[inline]
    pub(crate) fn reset_force(&mut self) {
        self.force = Vec3::ZERO;
    }

    #[inline]
    pub(crate) fn add_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Acceleration the body would undergo under `force`, that is `force / mass`.
    #[inline]
    pub(crate) fn acceleration_under(&self, force: Vec3) -> Result<Vec3> {
        force.checked_div(self.mass)
    }

    /// Advances the body by one semi-implicit Euler step.
    ///
    /// The velocity is updated first from `acceleration`, then the position from the updated
    /// velocity.
    #[inline]
    pub(crate) fn integrate(&mut self, acceleration: Vec3, dt: f64) {
        self.acceleration = acceleration;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }
}

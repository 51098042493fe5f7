use crate::{
    body::Body,
    constants,
    vector::{CheckedDiv, Vec3},
    Error, Result,
};

/// A mass located at a single point in space.
///
/// Used both for individual bodies and for the aggregate of everything contained in a region of
/// an [`Octree`](crate::tree::Octree), in which case it is the region's center of mass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointMass {
    /// Position of the point.
    pub position: Vec3,
    /// Mass of the point.
    pub mass: f64,
}

/// The aggregate of several point masses.
pub type CenterOfMass = PointMass;

impl PointMass {
    /// Creates a new [`PointMass`] with the given position and mass.
    #[inline]
    pub const fn new(position: Vec3, mass: f64) -> Self {
        Self { position, mass }
    }

    /// Combines two point masses into their center of mass.
    ///
    /// The resulting mass is `m1 + m2` and its position `(p1·m1 + p2·m2) / (m1 + m2)`.
    ///
    /// Returns [`Error::ZeroTotalMass`] if the masses sum to zero.
    ///
    /// # Example
    ///
    /// ```
    /// # use gravitree::prelude::*;
    /// let a = PointMass::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
    /// let b = PointMass::new(Vec3::new(4.0, 0.0, 0.0), 3.0);
    ///
    /// let com = a.combine(b).unwrap();
    /// assert_eq!(com, PointMass::new(Vec3::new(3.0, 0.0, 0.0), 4.0));
    /// ```
    #[inline]
    pub fn combine(self, other: Self) -> Result<Self> {
        let mass = self.mass + other.mass;
        let weighted = self.position * self.mass + other.position * other.mass;

        let position = weighted
            .checked_div(mass)
            .map_err(|_| Error::ZeroTotalMass)?;

        Ok(Self { position, mass })
    }

    /// Computes the center of mass of all the given point masses in a single pass.
    ///
    /// Returns [`Error::ZeroTotalMass`] if the iterator is empty or the masses sum to zero.
    pub fn of<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let (weighted, mass) = points
            .into_iter()
            .fold((Vec3::ZERO, 0.0), |(weighted, mass), p| {
                (weighted + p.position * p.mass, mass + p.mass)
            });

        let position = weighted
            .checked_div(mass)
            .map_err(|_| Error::ZeroTotalMass)?;

        Ok(Self { position, mass })
    }
}

impl From<&Body> for PointMass {
    #[inline]
    fn from(body: &Body) -> Self {
        Self::new(body.position(), body.mass())
    }
}

/// Newtonian gravitational force law.
///
/// An optional softening length `ε²` is added to every squared distance, which bounds the force
/// between very close bodies. With no softening this is the exact inverse-square law.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Newtonian {
    /// Gravitational constant.
    pub g: f64,
    /// Softening parameter `ε²` added to the squared distance.
    pub softening: f64,
}

impl Default for Newtonian {
    #[inline]
    fn default() -> Self {
        Self::new(constants::G)
    }
}

impl Newtonian {
    /// Creates a new [`Newtonian`] law with the given gravitational constant and no softening.
    #[inline]
    pub const fn new(g: f64) -> Self {
        Self { g, softening: 0.0 }
    }

    /// Creates a new [`Newtonian`] law with the given gravitational constant and softening.
    #[inline]
    pub const fn softened(g: f64, softening: f64) -> Self {
        Self { g, softening }
    }

    /// Creates a new [`Newtonian`] law, checking its parameters.
    ///
    /// Returns [`Error::InvalidGravitationalConstant`] if `g` is not finite and
    /// [`Error::InvalidSoftening`] if `softening` is negative or not finite, as the force would
    /// then turn into NaN for close bodies.
    pub fn checked(g: f64, softening: f64) -> Result<Self> {
        if !g.is_finite() {
            return Err(Error::InvalidGravitationalConstant { g });
        }
        if !(softening.is_finite() && softening >= 0.0) {
            return Err(Error::InvalidSoftening { softening });
        }

        Ok(Self::softened(g, softening))
    }

    /// Magnitude of the gravitational force between two masses separated by distance `d`:
    /// `G · m_a · m_b / d²`.
    #[inline]
    pub fn magnitude(&self, mass_a: f64, mass_b: f64, d: f64) -> f64 {
        self.g * mass_a * mass_b / (d * d + self.softening)
    }

    /// Force exerted on `affected` by `affecting`.
    ///
    /// The returned vector points from `affected` toward `affecting` and has magnitude
    /// [`magnitude`](Self::magnitude). Two points at the same position exert no force on each
    /// other unless softening is enabled, in which case the direction is zero anyway.
    ///
    /// # Example
    ///
    /// ```
    /// # use gravitree::prelude::*;
    /// let law = Newtonian::new(1.0);
    /// let a = PointMass::new(Vec3::ZERO, 2.0);
    /// let b = PointMass::new(Vec3::new(2.0, 0.0, 0.0), 3.0);
    ///
    /// assert_eq!(law.force(a, b), Vec3::new(1.5, 0.0, 0.0));
    /// assert_eq!(law.force(b, a), Vec3::new(-1.5, 0.0, 0.0));
    /// ```
    #[inline]
    pub fn force(&self, affected: PointMass, affecting: PointMass) -> Vec3 {
        let dir = affecting.position - affected.position;
        let mag_2 = dir.length_squared() + self.softening;

        if mag_2 == 0.0 {
            return Vec3::ZERO;
        }

        dir * (self.g * affected.mass * affecting.mass / (mag_2 * mag_2.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_two_points() {
        let a = PointMass::new(Vec3::new(1.0, 2.0, 3.0), 2.0);
        let b = PointMass::new(Vec3::new(-3.0, 0.0, 1.0), 6.0);

        let com = a.combine(b).unwrap();
        assert_eq!(com.mass, 8.0);
        assert!(com
            .position
            .abs_diff_eq(Vec3::new(-2.0, 0.5, 1.5), 1e-12));
    }

    #[test]
    fn combine_zero_total_mass() {
        let a = PointMass::new(Vec3::ONE, 0.0);
        let b = PointMass::new(Vec3::NEG_ONE, 0.0);

        assert_eq!(a.combine(b), Err(Error::ZeroTotalMass));
        assert_eq!(PointMass::of([]), Err(Error::ZeroTotalMass));
    }

    #[test]
    fn incremental_matches_single_pass() {
        let points = [
            PointMass::new(Vec3::new(0.0, 1.0, 0.0), 5.0),
            PointMass::new(Vec3::new(2.0, -1.0, 4.0), 1.5),
            PointMass::new(Vec3::new(-7.0, 3.0, 1.0), 0.25),
            PointMass::new(Vec3::new(1.0, 1.0, 1.0), 10.0),
        ];

        let incremental = points[1..]
            .iter()
            .try_fold(points[0], |com, &p| com.combine(p))
            .unwrap();
        let single = PointMass::of(points).unwrap();

        assert!((incremental.mass - single.mass).abs() < 1e-12);
        assert!(incremental.position.abs_diff_eq(single.position, 1e-12));
    }

    #[test]
    fn scalar_and_vector_forms_agree() {
        let law = Newtonian::new(constants::G);
        let a = PointMass::new(Vec3::new(1.0, -2.0, 0.5), 3.0e10);
        let b = PointMass::new(Vec3::new(-4.0, 6.0, 2.0), 7.0e8);

        let d = a.position.distance(b.position);
        let force = law.force(a, b);

        let magnitude = law.magnitude(a.mass, b.mass, d);
        assert!(((force.length() - magnitude) / magnitude).abs() < 1e-12);
        assert!(force
            .normalize()
            .abs_diff_eq((b.position - a.position).normalize(), 1e-12));
    }

    #[test]
    fn forces_are_opposite() {
        let law = Newtonian::new(1.0);
        let a = PointMass::new(Vec3::new(0.0, 0.0, 1.0), 2.0);
        let b = PointMass::new(Vec3::new(3.0, 4.0, 1.0), 5.0);

        assert!(law.force(a, b).abs_diff_eq(-law.force(b, a), 1e-15));
        assert!((law.force(a, b).length() - 0.4).abs() < 1e-15);
    }

    #[test]
    fn coincident_points() {
        let a = PointMass::new(Vec3::ONE, 1.0);

        assert_eq!(Newtonian::new(1.0).force(a, a), Vec3::ZERO);
        assert_eq!(Newtonian::softened(1.0, 0.01).force(a, a), Vec3::ZERO);
    }

    #[test]
    fn checked_parameters() {
        assert_eq!(
            Newtonian::checked(1.0, 0.25),
            Ok(Newtonian::softened(1.0, 0.25))
        );
        assert_eq!(
            Newtonian::checked(1.0, -1.0),
            Err(Error::InvalidSoftening { softening: -1.0 })
        );
        assert!(matches!(
            Newtonian::checked(1.0, f64::INFINITY),
            Err(Error::InvalidSoftening { .. })
        ));
        assert!(matches!(
            Newtonian::checked(f64::NAN, 0.0),
            Err(Error::InvalidGravitationalConstant { .. })
        ));
    }

    #[test]
    fn softening_bounds_force() {
        let a = PointMass::new(Vec3::ZERO, 1.0);
        let b = PointMass::new(Vec3::new(1e-6, 0.0, 0.0), 1.0);

        let hard = Newtonian::new(1.0).force(a, b).length();
        let soft = Newtonian::softened(1.0, 1e-2).force(a, b).length();

        assert!(soft < hard);
        assert!(soft < 1.0);
    }
}

use crate::vector::Vec3;

/// Relative enlargement applied to the bounding cube of a set of positions.
const MARGIN: f64 = 1e-3;

/// Enlargement relative to the magnitude of the coordinates, so that the cube stays strictly
/// larger than its contents even when they are tightly packed far from the origin.
const COORDINATE_MARGIN: f64 = 1e-9;

/// One of the 8 sub-regions obtained by bisecting a [`Region`] along each axis.
///
/// Bit `i` of the index is set when the octant lies on the positive side of axis `i` (x, y, z).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Octant(u8);

impl Octant {
    /// All 8 octants, in index order.
    pub const ALL: [Self; 8] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
    ];

    /// Creates the octant on the given side of each axis.
    #[inline]
    pub const fn new(x_positive: bool, y_positive: bool, z_positive: bool) -> Self {
        Self(x_positive as u8 | (y_positive as u8) << 1 | (z_positive as u8) << 2)
    }

    /// Index of the octant, between 0 and 7.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if the octant lies on the positive side of the given axis.
    #[inline]
    pub const fn is_positive(self, axis: usize) -> bool {
        self.0 & (1 << axis) != 0
    }

    /// Vector of `+1`/`-1` giving the side of each axis the octant lies on.
    #[inline]
    pub fn signs(self) -> Vec3 {
        let sign = |axis| if self.is_positive(axis) { 1.0 } else { -1.0 };
        Vec3::new(sign(0), sign(1), sign(2))
    }
}

/// An axis-aligned cuboid described by its center and full dimensions.
///
/// Containment is half-open: a point belongs to the region if, on every axis,
/// `center - half < coordinate <= center + half`. Adjacent regions therefore never share a
/// point, and the 8 [octants](Region::octant) of a region partition it exactly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    center: Vec3,
    dimensions: Vec3,
    half: Vec3,
    quarter: Vec3,
}

impl Region {
    /// Creates a new [`Region`] with the given center and full dimensions.
    #[inline]
    pub fn new(center: Vec3, dimensions: Vec3) -> Self {
        Self {
            center,
            dimensions,
            half: dimensions / 2.0,
            quarter: dimensions / 4.0,
        }
    }

    /// Creates a new [`Region`] with the given center, width (x), height (y) and depth (z).
    #[inline]
    pub fn with_size(center: Vec3, width: f64, height: f64, depth: f64) -> Self {
        Self::new(center, Vec3::new(width, height, depth))
    }

    /// Creates a new cubic [`Region`] with the given center and side length.
    #[inline]
    pub fn cube(center: Vec3, side: f64) -> Self {
        Self::new(center, Vec3::splat(side))
    }

    /// Creates the smallest cube, slightly enlarged, that contains all the given positions.
    ///
    /// Returns `None` if there are no positions. Positions are expected to be finite.
    pub fn containing<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut positions = positions.into_iter();
        let first = positions.next()?;

        let (min, max) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));

        let center = (min + max) / 2.0;
        let scale = min.abs().max(max.abs()).max_element().max(1.0);
        let side = (max - min).max_element() * (1.0 + MARGIN) + scale * COORDINATE_MARGIN;

        Some(Self::cube(center, side))
    }

    /// Center of the region.
    #[inline]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Full dimensions of the region.
    #[inline]
    pub const fn dimensions(&self) -> Vec3 {
        self.dimensions
    }

    /// Half of the dimensions of the region.
    #[inline]
    pub const fn half_extent(&self) -> Vec3 {
        self.half
    }

    /// Quarter of the dimensions of the region.
    #[inline]
    pub const fn quarter_extent(&self) -> Vec3 {
        self.quarter
    }

    /// Dimension along the x axis.
    #[inline]
    pub fn width(&self) -> f64 {
        self.dimensions.x
    }

    /// Dimension along the y axis.
    #[inline]
    pub fn height(&self) -> f64 {
        self.dimensions.y
    }

    /// Dimension along the z axis.
    #[inline]
    pub fn depth(&self) -> f64 {
        self.dimensions.z
    }

    /// Largest dimension of the region, used as its size in the Barnes-Hut criterion.
    #[inline]
    pub fn size(&self) -> f64 {
        self.dimensions.max_element()
    }

    /// Returns the given octant of this region: centered at `center ± quarter` on each axis
    /// with dimensions equal to this region's half extent.
    #[inline]
    pub fn octant(&self, octant: Octant) -> Self {
        Self::new(self.center + self.quarter * octant.signs(), self.half)
    }

    /// Returns the 8 octants of this region, in [`Octant::ALL`] order.
    #[inline]
    pub fn split(&self) -> [Self; 8] {
        Octant::ALL.map(|octant| self.octant(octant))
    }

    /// Returns `true` if the point lies in this region.
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        let lower = self.center - self.half;
        let upper = self.center + self.half;

        point.cmpgt(lower).all() && point.cmple(upper).all()
    }

    /// Returns the octant of this region a point belongs to, assuming the region contains it.
    ///
    /// Coordinates strictly greater than the center go to the positive side, which agrees with
    /// the half-open rule of [`contains`](Self::contains).
    #[inline]
    pub fn octant_of(&self, point: Vec3) -> Octant {
        let positive = point.cmpgt(self.center);
        Octant::new(positive.test(0), positive.test(1), positive.test(2))
    }
}

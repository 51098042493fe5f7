//! Physical constants in SI units.

/// Gravitational constant in m³·kg⁻¹·s⁻² (CODATA 2018).
pub const G: f64 = 6.67430e-11;

/// Astronomical unit in meters.
pub const AU: f64 = 1.496e11;

/// Mass of the Sun in kilograms.
pub const SUN_MASS: f64 = 1.989e30;

/// Mass of the Earth in kilograms.
pub const EARTH_MASS: f64 = 5.972e24;

/// Mass of Mars in kilograms.
pub const MARS_MASS: f64 = 6.39e23;

/// Mass of Jupiter in kilograms.
pub const JUPITER_MASS: f64 = 1.898e27;

/// Mean distance between the Sun and the Earth in meters.
pub const SUN_EARTH_DISTANCE: f64 = 1.496e11;

/// Mean distance between the Sun and Mars in meters.
pub const SUN_MARS_DISTANCE: f64 = 2.27937e11;

/// Mean distance between the Sun and Jupiter in meters.
pub const SUN_JUPITER_DISTANCE: f64 = 7.783e11;

/// Three-component double-precision vector used for positions, velocities, accelerations and
/// forces.
///
/// Every arithmetic operation returns a new value; equality is component-wise.
pub type Vec3 = glam::DVec3;

/// Division that reports a zero divisor instead of producing infinities or NaNs.
///
/// # Example
///
/// ```
/// # use gravitree::prelude::*;
/// let v = Vec3::new(2.0, 4.0, 6.0);
///
/// assert_eq!(v.checked_div(2.0), Ok(Vec3::new(1.0, 2.0, 3.0)));
/// assert_eq!(v.checked_div(Vec3::new(1.0, 0.0, 1.0)), Err(Error::DivisionByZero));
/// ```
pub trait CheckedDiv<Rhs = Self> {
    /// The resulting type after dividing.
    type Output;

    /// Divides `self` by `rhs`, or returns [`Error::DivisionByZero`](crate::Error::DivisionByZero)
    /// if any divisor is zero.
    fn checked_div(self, rhs: Rhs) -> crate::Result<Self::Output>;
}

macro_rules! impl_checked_div {
    ($v: ty, $s: ty) => {
        impl CheckedDiv<$s> for $v {
            type Output = $v;

            #[inline]
            fn checked_div(self, rhs: $s) -> crate::Result<$v> {
                if rhs == 0.0 {
                    return Err(crate::Error::DivisionByZero);
                }

                Ok(self / rhs)
            }
        }

        impl CheckedDiv<$v> for $v {
            type Output = $v;

            #[inline]
            fn checked_div(self, rhs: $v) -> crate::Result<$v> {
                if rhs.cmpeq(<$v>::ZERO).any() {
                    return Err(crate::Error::DivisionByZero);
                }

                Ok(self / rhs)
            }
        }
    };
}

impl_checked_div!(glam::DVec3, f64);

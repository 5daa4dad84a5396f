use core::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Unsigned microseconds.
///
/// Used for the wall-clock timestamps sampled by the caller and for the
/// derived tick duration.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default)]
pub struct Micros(u64);

impl Micros {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates a new instance of microseconds
    #[inline]
    pub const fn new(microseconds: u64) -> Self {
        Self(microseconds)
    }

    /// Returns the microseconds as a u64
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// ms -> us
    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms * 1_000)
    }

    /// Returns seconds
    #[inline]
    pub const fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.
    }

    /// Returns no time if I am less than other.
    pub const fn saturating_sub(&self, other: Self) -> Micros {
        if self.0 < other.0 {
            Micros(0)
        } else {
            Micros(self.0 - other.0)
        }
    }
}

impl Add for Micros {
    type Output = Micros;
    fn add(self, rhs: Self) -> Self::Output {
        Micros(self.0 + rhs.0)
    }
}

impl AddAssign for Micros {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Micros {
    type Output = Micros;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Micros {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<u64> for Micros {
    type Output = Micros;
    fn mul(self, rhs: u64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl From<u64> for Micros {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

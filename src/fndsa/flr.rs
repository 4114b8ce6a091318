//! Floating-point shim for no_std targets
//!
//! All double-precision operations used by the FFT and the Gaussian
//! sampler go through [`Flr`], which routes transcendental and rounding
//! functions to `libm` when the `std` intrinsics are unavailable.

/// Double-precision value as used by the sampling pipeline
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Flr(pub f64);

impl Flr {
    /// FLR zero
    pub const ZERO: Flr = Flr(0.0);

    /// FLR one
    pub const ONE: Flr = Flr(1.0);

    /// One half
    pub const HALF: Flr = Flr(0.5);

    /// Create from an f64 value
    pub const fn new(value: f64) -> Self {
        Flr(value)
    }

    /// Get the raw f64 value
    pub const fn raw(self) -> f64 {
        self.0
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        Flr(if self.0 < 0.0 { -self.0 } else { self.0 })
    }

    /// Square root
    pub fn sqrt(self) -> Self {
        #[cfg(feature = "std")]
        let result = self.0.sqrt();

        #[cfg(not(feature = "std"))]
        let result = libm::sqrt(self.0);

        Flr(result)
    }

    /// Largest integer less than or equal to the value
    pub fn floor(self) -> Self {
        #[cfg(feature = "std")]
        let result = self.0.floor();

        #[cfg(not(feature = "std"))]
        let result = libm::floor(self.0);

        Flr(result)
    }

    /// Cosine
    pub fn cos(self) -> Self {
        #[cfg(feature = "std")]
        let result = self.0.cos();

        #[cfg(not(feature = "std"))]
        let result = libm::cos(self.0);

        Flr(result)
    }

    /// Sine
    pub fn sin(self) -> Self {
        #[cfg(feature = "std")]
        let result = self.0.sin();

        #[cfg(not(feature = "std"))]
        let result = libm::sin(self.0);

        Flr(result)
    }

    /// Round to nearest integer with ties to even
    ///
    /// This is the rounding used when mapping sampled reals back to
    /// lattice coordinates; ties-to-even matches the reference.
    pub fn round_ties_to_even(self) -> i64 {
        let value = self.0;
        let truncated = {
            #[cfg(feature = "std")]
            {
                value.trunc()
            }
            #[cfg(not(feature = "std"))]
            {
                libm::trunc(value)
            }
        };
        let fraction = value - truncated;

        if fraction.abs() < 0.5 {
            truncated as i64
        } else if fraction.abs() > 0.5 {
            if value > 0.0 {
                (truncated + 1.0) as i64
            } else {
                (truncated - 1.0) as i64
            }
        } else {
            // Tie case - round to even
            let truncated_int = truncated as i64;
            if truncated_int % 2 == 0 {
                truncated_int
            } else if value > 0.0 {
                truncated_int + 1
            } else {
                truncated_int - 1
            }
        }
    }
}

impl core::ops::Add for Flr {
    type Output = Flr;

    fn add(self, rhs: Flr) -> Flr {
        Flr(self.0 + rhs.0)
    }
}

impl core::ops::Sub for Flr {
    type Output = Flr;

    fn sub(self, rhs: Flr) -> Flr {
        Flr(self.0 - rhs.0)
    }
}

impl core::ops::Mul for Flr {
    type Output = Flr;

    fn mul(self, rhs: Flr) -> Flr {
        Flr(self.0 * rhs.0)
    }
}

impl core::ops::Div for Flr {
    type Output = Flr;

    fn div(self, rhs: Flr) -> Flr {
        Flr(self.0 / rhs.0)
    }
}

impl core::ops::Neg for Flr {
    type Output = Flr;

    fn neg(self) -> Flr {
        Flr(-self.0)
    }
}

impl From<f64> for Flr {
    fn from(value: f64) -> Self {
        Flr(value)
    }
}

impl From<i32> for Flr {
    fn from(value: i32) -> Self {
        Flr(value as f64)
    }
}

impl From<Flr> for f64 {
    fn from(flr: Flr) -> Self {
        flr.0
    }
}

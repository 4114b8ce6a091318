//! Complex polynomial arithmetic in R[x]/(x^n + 1)
//!
//! The sampling pipeline works on floating-point approximations of ring
//! elements in FFT representation. The transform is the radix-2
//! split/merge decomposition: `fft` evaluates a polynomial at the
//! complex roots of x^n + 1, `split_fft`/`merge_fft` move between a ring
//! of size n and its two half-size subrings, and `ifft` inverts the
//! whole transform. The root ordering follows the recursive square-root
//! rule, so every table is generated by angle halving from (i, -i).

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use super::flr::Flr;

/// Complex number over [`Flr`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    /// Real part
    pub re: Flr,
    /// Imaginary part
    pub im: Flr,
}

impl Complex {
    /// Complex zero
    pub const ZERO: Complex = Complex {
        re: Flr::ZERO,
        im: Flr::ZERO,
    };

    /// Create a new complex number
    pub const fn new(re: f64, im: f64) -> Self {
        Complex {
            re: Flr::new(re),
            im: Flr::new(im),
        }
    }

    /// Create a purely real complex number
    pub const fn from_real(re: f64) -> Self {
        Complex::new(re, 0.0)
    }

    /// Complex conjugate
    pub fn conj(self) -> Self {
        Complex {
            re: self.re,
            im: -self.im,
        }
    }

    /// Squared magnitude
    pub fn norm_squared(self) -> Flr {
        self.re * self.re + self.im * self.im
    }

    /// Scale by a real factor
    pub fn scale(self, factor: Flr) -> Self {
        Complex {
            re: self.re * factor,
            im: self.im * factor,
        }
    }
}

impl core::ops::Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl core::ops::Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl core::ops::Mul for Complex {
    type Output = Complex;

    fn mul(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl core::ops::Div for Complex {
    type Output = Complex;

    fn div(self, rhs: Complex) -> Complex {
        let d = rhs.norm_squared();
        Complex {
            re: (self.re * rhs.re + self.im * rhs.im) / d,
            im: (self.im * rhs.re - self.re * rhs.im) / d,
        }
    }
}

impl core::ops::Neg for Complex {
    type Output = Complex;

    fn neg(self) -> Complex {
        Complex {
            re: -self.re,
            im: -self.im,
        }
    }
}

/// The n complex roots of x^n + 1, in FFT evaluation order.
///
/// The order is fixed by the recursion: the two square roots of the
/// parent root w land at positions 2i and 2i+1, so w[2i+1] = -w[2i] and
/// w[2i] squared is entry i of the half-size table.
pub fn roots_of_unity(n: usize) -> Vec<Complex> {
    debug_assert!(n.is_power_of_two() && n >= 2);
    let mut angles = vec![core::f64::consts::FRAC_PI_2, -core::f64::consts::FRAC_PI_2];
    while angles.len() < n {
        let mut next = Vec::with_capacity(2 * angles.len());
        for &a in &angles {
            next.push(a / 2.0);
            next.push(a / 2.0 - core::f64::consts::PI);
        }
        angles = next;
    }
    angles
        .into_iter()
        .map(|a| Complex {
            re: Flr::new(a).cos(),
            im: Flr::new(a).sin(),
        })
        .collect()
}

/// A polynomial over the complex numbers, in either coefficient or FFT
/// representation depending on context.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexPoly(pub Vec<Complex>);

impl ComplexPoly {
    /// Build a coefficient-domain polynomial from small integers
    pub fn from_int_slice(coeffs: &[i16]) -> Self {
        ComplexPoly(
            coeffs
                .iter()
                .map(|&c| Complex::from_real(c as f64))
                .collect(),
        )
    }

    /// All-zero polynomial of the given length
    pub fn zero(n: usize) -> Self {
        ComplexPoly(vec![Complex::ZERO; n])
    }

    /// Polynomial length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the polynomial has no coefficients
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Forward transform: evaluate at the roots of x^n + 1
    pub fn fft(&self) -> Self {
        ComplexPoly(fft_inner(&self.0))
    }

    /// Inverse transform back to coefficient representation
    pub fn ifft(&self) -> Self {
        ComplexPoly(ifft_inner(&self.0))
    }

    /// Real parts of the coefficients (meaningful after `ifft`)
    pub fn real_coefficients(&self) -> Vec<Flr> {
        self.0.iter().map(|c| c.re).collect()
    }

    /// Hermitian adjoint in FFT representation
    pub fn adjoint_fft(&self) -> Self {
        ComplexPoly(self.0.iter().map(|c| c.conj()).collect())
    }

    /// Pointwise product (FFT representation)
    pub fn hadamard_mul(&self, rhs: &Self) -> Self {
        debug_assert_eq!(self.len(), rhs.len());
        ComplexPoly(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(&a, &b)| a * b)
                .collect(),
        )
    }

    /// Pointwise quotient (FFT representation)
    pub fn hadamard_div(&self, rhs: &Self) -> Self {
        debug_assert_eq!(self.len(), rhs.len());
        ComplexPoly(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(&a, &b)| a / b)
                .collect(),
        )
    }

    /// Pointwise sum
    pub fn add(&self, rhs: &Self) -> Self {
        debug_assert_eq!(self.len(), rhs.len());
        ComplexPoly(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(&a, &b)| a + b)
                .collect(),
        )
    }

    /// Pointwise difference
    pub fn sub(&self, rhs: &Self) -> Self {
        debug_assert_eq!(self.len(), rhs.len());
        ComplexPoly(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(&a, &b)| a - b)
                .collect(),
        )
    }

    /// Negation
    pub fn neg(&self) -> Self {
        ComplexPoly(self.0.iter().map(|&a| -a).collect())
    }

    /// Scale every entry by a real factor
    pub fn scale(&self, factor: Flr) -> Self {
        ComplexPoly(self.0.iter().map(|&a| a.scale(factor)).collect())
    }
}

fn fft_inner(f: &[Complex]) -> Vec<Complex> {
    let n = f.len();
    if n == 1 {
        return f.to_vec();
    }
    let mut f0 = Vec::with_capacity(n / 2);
    let mut f1 = Vec::with_capacity(n / 2);
    for i in 0..n / 2 {
        f0.push(f[2 * i]);
        f1.push(f[2 * i + 1]);
    }
    let f0_fft = fft_inner(&f0);
    let f1_fft = fft_inner(&f1);
    merge_fft(&f0_fft, &f1_fft)
}

fn ifft_inner(f_fft: &[Complex]) -> Vec<Complex> {
    let n = f_fft.len();
    if n == 1 {
        return f_fft.to_vec();
    }
    let (f0_fft, f1_fft) = split_fft(f_fft);
    let f0 = ifft_inner(&f0_fft);
    let f1 = ifft_inner(&f1_fft);
    let mut f = Vec::with_capacity(n);
    for i in 0..n / 2 {
        f.push(f0[i]);
        f.push(f1[i]);
    }
    f
}

/// Split a size-n FFT vector into the FFT vectors of its two half-size
/// subring components: f(x) = f0(x^2) + x f1(x^2).
pub fn split_fft(f: &[Complex]) -> (Vec<Complex>, Vec<Complex>) {
    let n = f.len();
    let w = roots_of_unity(n);
    let half = Flr::HALF;

    let mut f0 = Vec::with_capacity(n / 2);
    let mut f1 = Vec::with_capacity(n / 2);
    for i in 0..n / 2 {
        f0.push((f[2 * i] + f[2 * i + 1]).scale(half));
        f1.push(((f[2 * i] - f[2 * i + 1]) * w[2 * i].conj()).scale(half));
    }
    (f0, f1)
}

/// Merge the FFT vectors of the two half-size components back into the
/// FFT vector of the full-size ring element.
pub fn merge_fft(f0: &[Complex], f1: &[Complex]) -> Vec<Complex> {
    let n = 2 * f0.len();
    debug_assert_eq!(f0.len(), f1.len());
    let w = roots_of_unity(n);

    let mut f = vec![Complex::ZERO; n];
    for i in 0..n / 2 {
        let t = w[2 * i] * f1[i];
        f[2 * i] = f0[i] + t;
        f[2 * i + 1] = f0[i] - t;
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_complex_vec_eq(result: &[Complex], expected: &[(f64, f64)], epsilon: f64) {
        assert_eq!(result.len(), expected.len(), "vector lengths differ");
        for (i, (r, e)) in result.iter().zip(expected.iter()).enumerate() {
            assert!(
                (r.re.raw() - e.0).abs() < epsilon && (r.im.raw() - e.1).abs() < epsilon,
                "mismatch at index {}: expected {:?}, got {:?}",
                i,
                e,
                r
            );
        }
    }

    #[test]
    fn test_roots_relations() {
        for logn in 1..=9 {
            let n = 1usize << logn;
            let w = roots_of_unity(n);
            for i in 0..n / 2 {
                // w[2i+1] = -w[2i]
                assert!((w[2 * i].re + w[2 * i + 1].re).raw().abs() < 1e-12);
                assert!((w[2 * i].im + w[2 * i + 1].im).raw().abs() < 1e-12);
                // every entry is a root of x^n + 1
                let mut acc = Complex::from_real(1.0);
                for _ in 0..n {
                    acc = acc * w[2 * i];
                }
                assert!((acc.re.raw() + 1.0).abs() < 1e-9);
                assert!(acc.im.raw().abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_fft_known_values() {
        let f = ComplexPoly(vec![
            Complex::from_real(1.0),
            Complex::from_real(2.0),
            Complex::from_real(3.0),
            Complex::from_real(4.0),
        ]);
        let f_fft = f.fft();
        let expected = [
            (-0.41421356237309204, 7.242640687119286),
            (2.4142135623730923, -1.2426406871192857),
            (-0.41421356237309204, -7.242640687119286),
            (2.4142135623730923, 1.2426406871192857),
        ];
        assert_complex_vec_eq(&f_fft.0, &expected, 1e-9);
    }

    #[test]
    fn test_fft_all_ones() {
        let f = ComplexPoly(vec![Complex::from_real(1.0); 4]);
        let expected = [
            (1.0, 2.414213562373095),
            (1.0, -0.4142135623730949),
            (1.0, -2.414213562373095),
            (1.0, 0.4142135623730949),
        ];
        assert_complex_vec_eq(&f.fft().0, &expected, 1e-9);
    }

    #[test]
    fn test_fft_ifft_roundtrip() {
        let coeffs: Vec<i16> = (0..512).map(|i| ((i * 37 + 11) % 19) as i16 - 9).collect();
        let f = ComplexPoly::from_int_slice(&coeffs);
        let back = f.fft().ifft();
        for (orig, got) in coeffs.iter().zip(back.0.iter()) {
            assert!((got.re.raw() - *orig as f64).abs() < 1e-8);
            assert!(got.im.raw().abs() < 1e-8);
        }
    }

    #[test]
    fn test_split_merge_roundtrip() {
        let coeffs: Vec<i16> = (0..64).map(|i| (i % 23) as i16 - 11).collect();
        let f_fft = ComplexPoly::from_int_slice(&coeffs).fft();
        let (f0, f1) = split_fft(&f_fft.0);
        let merged = merge_fft(&f0, &f1);
        assert_complex_vec_eq(
            &merged,
            &f_fft
                .0
                .iter()
                .map(|c| (c.re.raw(), c.im.raw()))
                .collect::<Vec<_>>(),
            1e-9,
        );
    }

    #[test]
    fn test_fft_multiplication_is_negacyclic() {
        // x^31 * x^33 = x^64 = -1 in R[x]/(x^64 + 1)
        let mut a = vec![0i16; 64];
        let mut b = vec![0i16; 64];
        a[31] = 1;
        b[33] = 1;
        let prod = ComplexPoly::from_int_slice(&a)
            .fft()
            .hadamard_mul(&ComplexPoly::from_int_slice(&b).fft())
            .ifft();
        assert!((prod.0[0].re.raw() + 1.0).abs() < 1e-9);
        for c in prod.0.iter().skip(1) {
            assert!(c.re.raw().abs() < 1e-9);
        }
    }
}

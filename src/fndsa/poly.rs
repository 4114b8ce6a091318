//! Polynomial arithmetic over Z_q[x]/(x^n + 1)
//!
//! Exact integer-domain ring operations: the negacyclic Number-Theoretic
//! Transform used for public key derivation and verification, pointwise
//! NTT-domain operations including inversion, balanced lifts, and an
//! exact wide-integer schoolbook product for checking the NTRU equation.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use super::params::Q;

/// Modular exponentiation: base^exp mod modulus
pub fn mod_pow(base: u32, mut exp: u32, modulus: u32) -> u32 {
    let mut result: u64 = 1;
    let mut b = (base % modulus) as u64;
    let m = modulus as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        exp >>= 1;
    }
    result as u32
}

fn add_mod(a: u16, b: u16) -> u16 {
    let s = a as u32 + b as u32;
    if s >= Q {
        (s - Q) as u16
    } else {
        s as u16
    }
}

fn sub_mod(a: u16, b: u16) -> u16 {
    let d = a as i32 - b as i32;
    if d < 0 {
        (d + Q as i32) as u16
    } else {
        d as u16
    }
}

fn mul_mod(a: u16, b: u16) -> u16 {
    ((a as u32 * b as u32) % Q) as u16
}

fn bit_reverse(value: usize, bits: usize) -> usize {
    let mut v = value;
    let mut result = 0;
    for _ in 0..bits {
        result = (result << 1) | (v & 1);
        v >>= 1;
    }
    result
}

/// Precomputed twiddle factors for the negacyclic NTT of size n = 2^logn.
///
/// The generator psi is a primitive 2n-th root of unity mod q, found by
/// searching for an element with psi^n = -1 and verified at build time,
/// so no precomputed root constant can silently go stale.
#[derive(Debug, Clone)]
pub struct NttTables {
    logn: usize,
    n: usize,
    psi_rev: Vec<u16>,
    inv_psi_rev: Vec<u16>,
    inv_n: u16,
}

impl NttTables {
    /// Build the twiddle tables for degree 2^logn
    pub fn new(logn: usize) -> Self {
        let n = 1usize << logn;
        debug_assert!(n >= 2 && 2 * n as u32 <= 4096);

        // psi^n = -1 forces the order to be exactly 2n (a power of two).
        let mut psi = 0u32;
        for candidate in 2..Q {
            if mod_pow(candidate, n as u32, Q) == Q - 1 {
                psi = candidate;
                break;
            }
        }
        debug_assert!(psi != 0);
        let inv_psi = mod_pow(psi, 2 * n as u32 - 1, Q);

        let mut psi_rev = vec![0u16; n];
        let mut inv_psi_rev = vec![0u16; n];
        for i in 0..n {
            let r = bit_reverse(i, logn);
            psi_rev[i] = mod_pow(psi, r as u32, Q) as u16;
            inv_psi_rev[i] = mod_pow(inv_psi, r as u32, Q) as u16;
        }

        let inv_n = mod_pow(n as u32, Q - 2, Q) as u16;

        NttTables {
            logn,
            n,
            psi_rev,
            inv_psi_rev,
            inv_n,
        }
    }

    /// Degree covered by these tables
    pub fn n(&self) -> usize {
        self.n
    }

    /// Logarithmic degree covered by these tables
    pub fn logn(&self) -> usize {
        self.logn
    }

    /// In-place forward negacyclic NTT (Cooley-Tukey butterflies)
    fn forward(&self, a: &mut [u16]) {
        debug_assert_eq!(a.len(), self.n);
        let mut t = self.n;
        let mut m = 1;
        while m < self.n {
            t >>= 1;
            for i in 0..m {
                let s = self.psi_rev[m + i];
                let j1 = 2 * i * t;
                for j in j1..j1 + t {
                    let u = a[j];
                    let v = mul_mod(a[j + t], s);
                    a[j] = add_mod(u, v);
                    a[j + t] = sub_mod(u, v);
                }
            }
            m <<= 1;
        }
    }

    /// In-place inverse negacyclic NTT (Gentleman-Sande butterflies)
    fn inverse(&self, a: &mut [u16]) {
        debug_assert_eq!(a.len(), self.n);
        let mut t = 1;
        let mut m = self.n;
        while m > 1 {
            let h = m >> 1;
            let mut j1 = 0;
            for i in 0..h {
                let s = self.inv_psi_rev[h + i];
                for j in j1..j1 + t {
                    let u = a[j];
                    let v = a[j + t];
                    a[j] = add_mod(u, v);
                    a[j + t] = mul_mod(sub_mod(u, v), s);
                }
                j1 += 2 * t;
            }
            t <<= 1;
            m = h;
        }
        for x in a.iter_mut() {
            *x = mul_mod(*x, self.inv_n);
        }
    }
}

/// Polynomial with coefficients in Z_q, in either coefficient or NTT
/// representation depending on context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModqPoly(pub Vec<u16>);

impl ModqPoly {
    /// Lift signed coefficients into Z_q
    pub fn from_signed(coeffs: &[i16]) -> Self {
        ModqPoly(
            coeffs
                .iter()
                .map(|&c| {
                    let mut v = c as i32 % Q as i32;
                    if v < 0 {
                        v += Q as i32;
                    }
                    v as u16
                })
                .collect(),
        )
    }

    /// Polynomial length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the polynomial has no coefficients
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Forward NTT
    pub fn ntt(&self, tables: &NttTables) -> Self {
        let mut a = self.0.clone();
        tables.forward(&mut a);
        ModqPoly(a)
    }

    /// Inverse NTT
    pub fn intt(&self, tables: &NttTables) -> Self {
        let mut a = self.0.clone();
        tables.inverse(&mut a);
        ModqPoly(a)
    }

    /// Pointwise product (NTT representation)
    pub fn pointwise_mul(&self, rhs: &Self) -> Self {
        debug_assert_eq!(self.len(), rhs.len());
        ModqPoly(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(&a, &b)| mul_mod(a, b))
                .collect(),
        )
    }

    /// Pointwise quotient (NTT representation).
    ///
    /// Returns `None` if any divisor coefficient is zero, i.e. the
    /// divisor is not invertible in the ring; key generation treats this
    /// as a signal to regenerate the candidate basis.
    pub fn pointwise_div(&self, rhs: &Self) -> Option<Self> {
        debug_assert_eq!(self.len(), rhs.len());
        let mut out = Vec::with_capacity(self.len());
        for (&a, &b) in self.0.iter().zip(rhs.0.iter()) {
            if b == 0 {
                return None;
            }
            let inv = mod_pow(b as u32, Q - 2, Q) as u16;
            out.push(mul_mod(a, inv));
        }
        Some(ModqPoly(out))
    }

    /// Coefficient-wise sum
    pub fn add(&self, rhs: &Self) -> Self {
        debug_assert_eq!(self.len(), rhs.len());
        ModqPoly(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(&a, &b)| add_mod(a, b))
                .collect(),
        )
    }

    /// Coefficient-wise difference
    pub fn sub(&self, rhs: &Self) -> Self {
        debug_assert_eq!(self.len(), rhs.len());
        ModqPoly(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(&a, &b)| sub_mod(a, b))
                .collect(),
        )
    }

    /// Centered representatives in (-q/2, q/2]
    pub fn balanced(&self) -> Vec<i16> {
        self.0
            .iter()
            .map(|&v| {
                if v as u32 > Q / 2 {
                    v as i16 - Q as i16
                } else {
                    v as i16
                }
            })
            .collect()
    }
}

/// Exact negacyclic product of two small polynomials, with i64
/// accumulation. Used to check f*G - g*F = q over the integers.
pub fn negacyclic_mul_i64(a: &[i16], b: &[i16]) -> Vec<i64> {
    let n = a.len();
    debug_assert_eq!(n, b.len());
    let mut out = vec![0i64; n];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            let prod = ai as i64 * bj as i64;
            let k = i + j;
            if k < n {
                out[k] += prod;
            } else {
                out[k - n] -= prod;
            }
        }
    }
    out
}

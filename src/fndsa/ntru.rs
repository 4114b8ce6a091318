//! NTRU lattice key generation
//!
//! Key generation draws the small polynomials f and g from a discrete
//! Gaussian, rejects candidates with a weak Gram-Schmidt norm or a
//! non-invertible f, and completes the secret basis by solving the NTRU
//! equation f*G - g*F = q over the integers. The solver works down a
//! tower of subfields with exact `BigInt` arithmetic, and reduces the
//! lifted solution at every level with Babai's round-off against an
//! approximate FFT of the top bits.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::fft::ComplexPoly;
use super::flr::Flr;
use super::gaussian::sampler_z;
use super::params::{
    FALCON_512, GS_NORM_BOUND, LOGN, MAX_KEYGEN_ATTEMPTS, N, Q, SIGMA_FG,
};
use super::poly::{negacyclic_mul_i64, ModqPoly, NttTables};
use crate::{Error, Result};

/// Total Gaussian draws aggregated over one polynomial
const KEYGEN_SAMPLES: usize = 4096;

/// Coefficient bound implied by the 6-bit secret key encoding of f and g
const FG_BOUND: i16 = 31;

/// Coefficient bound implied by the 8-bit secret key encoding of F and G
const CAP_FG_BOUND: i16 = 127;

/// Bound on Babai reduction passes per recursion level
const MAX_REDUCE_PASSES: usize = 1000;

/// NTRU secret basis (f, g, F, G) with f*G - g*F = q.
///
/// The contents are wiped on drop; [`NtruPrivateKey::wipe`] wipes them
/// eagerly.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct NtruPrivateKey {
    /// Secret polynomial f
    pub f: Vec<i16>,
    /// Secret polynomial g
    pub g: Vec<i16>,
    /// Completion polynomial F
    pub big_f: Vec<i16>,
    /// Completion polynomial G
    pub big_g: Vec<i16>,
}

// Comparing secret keys must not leak where they differ.
impl PartialEq for NtruPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        (self.f.ct_eq(&other.f)
            & self.g.ct_eq(&other.g)
            & self.big_f.ct_eq(&other.big_f)
            & self.big_g.ct_eq(&other.big_g))
        .into()
    }
}

impl Eq for NtruPrivateKey {}

/// NTRU public key h = g/f mod q, in coefficient representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtruPublicKey {
    /// Public polynomial coefficients in [0, q)
    pub h: Vec<u16>,
}

impl NtruPrivateKey {
    /// The four basis polynomials [g, -f, G, -F] in FFT representation,
    /// as used by the sampling tree and the signing transform.
    pub fn basis_fft(&self) -> [ComplexPoly; 4] {
        let neg = |p: &[i16]| p.iter().map(|&c| -c).collect::<Vec<i16>>();
        [
            ComplexPoly::from_int_slice(&self.g).fft(),
            ComplexPoly::from_int_slice(&neg(&self.f)).fft(),
            ComplexPoly::from_int_slice(&self.big_g).fft(),
            ComplexPoly::from_int_slice(&neg(&self.big_f)).fft(),
        ]
    }

    /// Overwrite all secret material with zeros
    pub fn wipe(&mut self) {
        self.zeroize();
    }

    /// Serialize to the fixed 1281-byte format: a header byte, then f
    /// and g as 6-bit two's-complement fields and F as 8-bit fields.
    /// G is not stored; it is recomputed from the other three on decode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(FALCON_512.secret_key_len);
        bytes.push(0x50 | LOGN as u8);

        let mut acc = 0u32;
        let mut acc_len = 0u32;
        let mut push = |bytes: &mut Vec<u8>, v: i16, width: u32| -> Result<()> {
            let bound = (1i16 << (width - 1)) - 1;
            if v < -bound || v > bound {
                return Err(Error::InvalidSecretKey);
            }
            acc = (acc << width) | (v as u32 & ((1 << width) - 1));
            acc_len += width;
            while acc_len >= 8 {
                acc_len -= 8;
                bytes.push((acc >> acc_len) as u8);
            }
            Ok(())
        };

        for &c in &self.f {
            push(&mut bytes, c, 6)?;
        }
        for &c in &self.g {
            push(&mut bytes, c, 6)?;
        }
        for &c in &self.big_f {
            push(&mut bytes, c, 8)?;
        }
        debug_assert_eq!(bytes.len(), FALCON_512.secret_key_len);
        Ok(bytes)
    }

    /// Deserialize from the 1281-byte format and rebuild G = g*F/f.
    ///
    /// Rejects a wrong length or header, the non-canonical field value
    /// -2^(w-1), a stored f that is not invertible mod q, and any triple
    /// that does not satisfy the NTRU equation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FALCON_512.secret_key_len {
            return Err(Error::InvalidSecretKey);
        }
        if bytes[0] != (0x50 | LOGN as u8) {
            return Err(Error::InvalidSecretKey);
        }

        let mut acc = 0u32;
        let mut acc_len = 0u32;
        let mut pos = 1usize;
        let mut pull = |width: u32| -> Result<i16> {
            while acc_len < width {
                acc = (acc << 8) | bytes[pos] as u32;
                pos += 1;
                acc_len += 8;
            }
            acc_len -= width;
            let raw = (acc >> acc_len) & ((1 << width) - 1);
            acc &= (1 << acc_len) - 1;
            // the sign bit alone encodes -2^(w-1), which the canonical
            // range excludes
            if raw == 1 << (width - 1) {
                return Err(Error::InvalidSecretKey);
            }
            let mut v = raw as i16;
            if raw >= 1 << (width - 1) {
                v -= 1 << width;
            }
            Ok(v)
        };

        let mut f = Vec::with_capacity(N);
        let mut g = Vec::with_capacity(N);
        let mut big_f = Vec::with_capacity(N);
        for _ in 0..N {
            f.push(pull(6)?);
        }
        for _ in 0..N {
            g.push(pull(6)?);
        }
        for _ in 0..N {
            big_f.push(pull(8)?);
        }

        let tables = NttTables::new(LOGN);
        let f_ntt = ModqPoly::from_signed(&f).ntt(&tables);
        let gf_ntt = ModqPoly::from_signed(&g)
            .ntt(&tables)
            .pointwise_mul(&ModqPoly::from_signed(&big_f).ntt(&tables));
        let big_g = gf_ntt
            .pointwise_div(&f_ntt)
            .ok_or(Error::InvalidSecretKey)?
            .intt(&tables)
            .balanced();

        let key = NtruPrivateKey { f, g, big_f, big_g };
        if !key.satisfies_ntru_equation() {
            return Err(Error::InvalidSecretKey);
        }
        Ok(key)
    }

    /// Exact integer check of f*G - g*F = q
    fn satisfies_ntru_equation(&self) -> bool {
        let fg = negacyclic_mul_i64(&self.f, &self.big_g);
        let gf = negacyclic_mul_i64(&self.g, &self.big_f);
        if fg[0] - gf[0] != Q as i64 {
            return false;
        }
        fg.iter().zip(gf.iter()).skip(1).all(|(a, b)| a == b)
    }
}

impl NtruPublicKey {
    /// Serialize to the fixed 897-byte format: a header byte, then the
    /// coefficients of h as 14-bit big-endian fields.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(FALCON_512.public_key_len);
        bytes.push(LOGN as u8);

        let mut acc = 0u32;
        let mut acc_len = 0u32;
        for &c in &self.h {
            debug_assert!((c as u32) < Q);
            acc = (acc << 14) | c as u32;
            acc_len += 14;
            while acc_len >= 8 {
                acc_len -= 8;
                bytes.push((acc >> acc_len) as u8);
            }
        }
        debug_assert_eq!(bytes.len(), FALCON_512.public_key_len);
        bytes
    }

    /// Deserialize from the 897-byte format; rejects a wrong length or
    /// header and any coefficient not below q.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FALCON_512.public_key_len {
            return Err(Error::InvalidPublicKey);
        }
        if bytes[0] != LOGN as u8 {
            return Err(Error::InvalidPublicKey);
        }

        let mut h = Vec::with_capacity(N);
        let mut acc = 0u32;
        let mut acc_len = 0u32;
        for &byte in &bytes[1..] {
            acc = (acc << 8) | byte as u32;
            acc_len += 8;
            if acc_len >= 14 {
                acc_len -= 14;
                let v = (acc >> acc_len) & 0x3fff;
                acc &= (1 << acc_len) - 1;
                if v >= Q {
                    return Err(Error::InvalidPublicKey);
                }
                h.push(v as u16);
            }
        }
        debug_assert_eq!(h.len(), N);
        Ok(NtruPublicKey { h })
    }
}

/// Draw one secret polynomial: each coefficient aggregates 4096/n
/// Gaussian samples of standard deviation sigma_fg.
fn gen_poly<R: RngCore + CryptoRng>(rng: &mut R) -> Vec<i16> {
    let sigma = Flr::new(SIGMA_FG);
    let sigmin = Flr::new(SIGMA_FG - 0.001);
    (0..N)
        .map(|_| {
            let mut acc = 0i64;
            for _ in 0..KEYGEN_SAMPLES / N {
                acc += sampler_z(Flr::ZERO, sigma, sigmin, rng);
            }
            acc as i16
        })
        .collect()
}

/// Squared Gram-Schmidt norm of the NTRU basis generated by (f, g).
///
/// The two candidate row norms are ||(g, -f)||^2 and, via Parseval,
/// ||(q f*/(f f* + g g*), q g*/(f f* + g g*))||^2; the larger one is
/// returned.
fn gram_schmidt_norm(f: &[i16], g: &[i16]) -> f64 {
    let first: f64 = f
        .iter()
        .zip(g.iter())
        .map(|(&a, &b)| (a as f64) * (a as f64) + (b as f64) * (b as f64))
        .sum();

    let f_fft = ComplexPoly::from_int_slice(f).fft();
    let g_fft = ComplexPoly::from_int_slice(g).fft();
    let mut inv_sum = 0.0f64;
    for (a, b) in f_fft.0.iter().zip(g_fft.0.iter()) {
        let denom = (a.norm_squared() + b.norm_squared()).raw();
        if denom == 0.0 {
            return f64::INFINITY;
        }
        inv_sum += 1.0 / denom;
    }
    let q = Q as f64;
    let second = q * q * inv_sum / N as f64;

    if first > second {
        first
    } else {
        second
    }
}

fn to_bigint(coeffs: &[i16]) -> Vec<BigInt> {
    coeffs.iter().map(|&c| BigInt::from(c)).collect()
}

/// Linear product of two equal-length polynomials, Karatsuba recursion
/// with a schoolbook base. Output has length 2n.
fn karatsuba(a: &[BigInt], b: &[BigInt]) -> Vec<BigInt> {
    let n = a.len();
    if n <= 16 {
        let mut out = vec![BigInt::zero(); 2 * n];
        for (i, ai) in a.iter().enumerate() {
            for (j, bj) in b.iter().enumerate() {
                out[i + j] += ai * bj;
            }
        }
        return out;
    }

    let m = n / 2;
    let lo = karatsuba(&a[..m], &b[..m]);
    let hi = karatsuba(&a[m..], &b[m..]);
    let a_sum: Vec<BigInt> = (0..m).map(|i| &a[i] + &a[m + i]).collect();
    let b_sum: Vec<BigInt> = (0..m).map(|i| &b[i] + &b[m + i]).collect();
    let mut mid = karatsuba(&a_sum, &b_sum);
    for i in 0..2 * m {
        mid[i] -= &lo[i];
        mid[i] -= &hi[i];
    }

    let mut out = vec![BigInt::zero(); 2 * n];
    for i in 0..2 * m {
        out[i] += &lo[i];
        out[i + m] += &mid[i];
        out[i + 2 * m] += &hi[i];
    }
    out
}

/// Exact negacyclic product in Z[x]/(x^n + 1)
fn negacyclic_mul_big(a: &[BigInt], b: &[BigInt]) -> Vec<BigInt> {
    let n = a.len();
    let ab = karatsuba(a, b);
    (0..n).map(|i| &ab[i] - &ab[i + n]).collect()
}

/// Field norm down to the subring Z[x]/(x^(n/2) + 1):
/// N(f) = f_e^2 - x f_o^2 where f(x) = f_e(x^2) + x f_o(x^2).
fn field_norm(f: &[BigInt]) -> Vec<BigInt> {
    let half = f.len() / 2;
    let even: Vec<BigInt> = f.iter().step_by(2).cloned().collect();
    let odd: Vec<BigInt> = f.iter().skip(1).step_by(2).cloned().collect();
    let even_sq = negacyclic_mul_big(&even, &even);
    let odd_sq = negacyclic_mul_big(&odd, &odd);

    let mut out = even_sq;
    out[0] += &odd_sq[half - 1];
    for i in 1..half {
        out[i] -= &odd_sq[i - 1];
    }
    out
}

/// Galois conjugate f(-x)
fn galois_conjugate(f: &[BigInt]) -> Vec<BigInt> {
    f.iter()
        .enumerate()
        .map(|(i, c)| if i % 2 == 0 { c.clone() } else { -c })
        .collect()
}

/// Embed a subring element: f(x) -> f(x^2)
fn lift(f: &[BigInt]) -> Vec<BigInt> {
    let mut out = vec![BigInt::zero(); 2 * f.len()];
    for (i, c) in f.iter().enumerate() {
        out[2 * i] = c.clone();
    }
    out
}

/// Extended GCD: returns (d, u, v) with u*b + v*n = d = gcd(b, n)
fn xgcd(mut b: BigInt, mut n: BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut x0, mut x1) = (BigInt::from(1), BigInt::from(0));
    let (mut y0, mut y1) = (BigInt::from(0), BigInt::from(1));

    while !n.is_zero() {
        let q = &b / &n;
        let r = &b % &n;
        b = core::mem::replace(&mut n, r);

        let x = &x0 - &q * &x1;
        x0 = core::mem::replace(&mut x1, x);

        let y = &y0 - &q * &y1;
        y0 = core::mem::replace(&mut y1, y);
    }

    (b, x0, y0)
}

/// Magnitude bitsize, rounded up to a multiple of 8
fn bitsize(a: &BigInt) -> u64 {
    (a.bits() + 7) & !7
}

fn max_bitsize(polys: &[&[BigInt]]) -> u64 {
    let mut best = 0;
    for poly in polys {
        for c in poly.iter() {
            let b = bitsize(c);
            if b > best {
                best = b;
            }
        }
    }
    best.max(53)
}

/// FFT of a polynomial after dropping `shift` low bits of every
/// coefficient, so the retained top bits fit an f64 exactly.
fn top_bits_fft(f: &[BigInt], shift: u64) -> ComplexPoly {
    ComplexPoly(
        f.iter()
            .map(|c| {
                let top = c >> (shift as usize);
                super::fft::Complex::from_real(top.to_f64().unwrap_or(0.0))
            })
            .collect(),
    )
    .fft()
}

/// Babai round-off: repeatedly subtract k*(f, g) from (F, G), with k
/// computed from the top bits of the operands in FFT representation,
/// until the candidates are no larger than the inputs or k vanishes.
fn babai_reduce(
    f: &[BigInt],
    g: &[BigInt],
    big_f: &mut [BigInt],
    big_g: &mut [BigInt],
) -> Result<()> {
    let size = max_bitsize(&[f, g]);
    let f_hat = top_bits_fft(f, size - 53);
    let g_hat = top_bits_fft(g, size - 53);
    let f_star = f_hat.adjoint_fft();
    let g_star = g_hat.adjoint_fft();
    let denom = f_hat
        .hadamard_mul(&f_star)
        .add(&g_hat.hadamard_mul(&g_star));

    for _ in 0..MAX_REDUCE_PASSES {
        let cap_size = max_bitsize(&[big_f, big_g]);
        if cap_size < size {
            return Ok(());
        }
        let shift = cap_size - 53;
        let big_f_hat = top_bits_fft(big_f, shift);
        let big_g_hat = top_bits_fft(big_g, shift);

        let num = big_f_hat
            .hadamard_mul(&f_star)
            .add(&big_g_hat.hadamard_mul(&g_star));
        let k_poly = num.hadamard_div(&denom).ifft();
        let k: Vec<i64> = k_poly
            .0
            .iter()
            .map(|c| c.re.round_ties_to_even())
            .collect();
        if k.iter().all(|&v| v == 0) {
            return Ok(());
        }

        let k_big: Vec<BigInt> = k.iter().map(|&v| BigInt::from(v)).collect();
        let fk = negacyclic_mul_big(f, &k_big);
        let gk = negacyclic_mul_big(g, &k_big);
        let back = (cap_size - size) as usize;
        for i in 0..big_f.len() {
            big_f[i] -= &fk[i] << back;
            big_g[i] -= &gk[i] << back;
        }
    }
    Err(Error::KeyGenerationFailed)
}

/// Solve f*G - g*F = q down the subfield tower
fn solve_tower(f: &[BigInt], g: &[BigInt]) -> Result<(Vec<BigInt>, Vec<BigInt>)> {
    if f.len() == 1 {
        let (d, u, v) = xgcd(f[0].clone(), g[0].clone());
        if d != BigInt::from(1) {
            return Err(Error::KeyGenerationFailed);
        }
        // f*(q*u) - g*(-q*v) = q*(u*f + v*g) = q
        return Ok((vec![-v * Q], vec![u * Q]));
    }

    let f_prime = field_norm(f);
    let g_prime = field_norm(g);
    let (big_f_prime, big_g_prime) = solve_tower(&f_prime, &g_prime)?;

    let mut big_f = negacyclic_mul_big(&lift(&big_f_prime), &galois_conjugate(g));
    let mut big_g = negacyclic_mul_big(&lift(&big_g_prime), &galois_conjugate(f));
    babai_reduce(f, g, &mut big_f, &mut big_g)?;
    Ok((big_f, big_g))
}

/// Solve the NTRU equation for small integer polynomials and verify the
/// result exactly over the integers.
pub(crate) fn ntru_solve(f: &[i16], g: &[i16]) -> Result<(Vec<i16>, Vec<i16>)> {
    let (big_f, big_g) = solve_tower(&to_bigint(f), &to_bigint(g))?;

    let narrow = |p: Vec<BigInt>| -> Result<Vec<i16>> {
        p.into_iter()
            .map(|c| c.to_i16().ok_or(Error::KeyGenerationFailed))
            .collect()
    };
    let big_f = narrow(big_f)?;
    let big_g = narrow(big_g)?;

    let fg = negacyclic_mul_i64(f, &big_g);
    let gf = negacyclic_mul_i64(g, &big_f);
    if fg[0] - gf[0] != Q as i64 || fg.iter().zip(gf.iter()).skip(1).any(|(a, b)| a != b) {
        return Err(Error::KeyGenerationFailed);
    }
    Ok((big_f, big_g))
}

fn within(p: &[i16], bound: i16) -> bool {
    p.iter().all(|&c| c >= -bound && c <= bound)
}

/// Generate a Falcon-512 key pair from the given RNG.
///
/// Candidate (f, g) pairs are rejected until one yields a well-formed
/// basis: acceptable Gram-Schmidt norm, invertible f, a solvable NTRU
/// equation and coefficients that fit the secret key encoding.
pub fn generate_keypair_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<(NtruPrivateKey, NtruPublicKey)> {
    let tables = NttTables::new(LOGN);

    for _ in 0..MAX_KEYGEN_ATTEMPTS {
        let f = gen_poly(rng);
        let g = gen_poly(rng);

        if gram_schmidt_norm(&f, &g) > GS_NORM_BOUND {
            continue;
        }
        if !within(&f, FG_BOUND) || !within(&g, FG_BOUND) {
            continue;
        }

        let f_ntt = ModqPoly::from_signed(&f).ntt(&tables);
        if f_ntt.0.iter().any(|&v| v == 0) {
            continue;
        }

        let (big_f, big_g) = match ntru_solve(&f, &g) {
            Ok(pair) => pair,
            Err(_) => continue,
        };
        if !within(&big_f, CAP_FG_BOUND) || !within(&big_g, CAP_FG_BOUND) {
            continue;
        }

        let h = match ModqPoly::from_signed(&g).ntt(&tables).pointwise_div(&f_ntt) {
            Some(h_ntt) => h_ntt.intt(&tables),
            None => continue,
        };

        let sk = NtruPrivateKey { f, g, big_f, big_g };
        let pk = NtruPublicKey { h: h.0 };
        return Ok((sk, pk));
    }
    Err(Error::KeyGenerationFailed)
}

/// Generate a Falcon-512 key pair deterministically from a seed.
///
/// The seed is expanded with SHAKE256; equal seeds give equal key pairs.
pub fn generate_keypair_from_seed(seed: &[u8]) -> Result<(NtruPrivateKey, NtruPublicKey)> {
    let mut rng = super::gaussian::ShakeRng::from_seed(seed);
    generate_keypair_with_rng(&mut rng)
}

/// Generate a Falcon-512 key pair from system entropy
#[cfg(feature = "getrandom")]
pub fn generate_keypair() -> Result<(NtruPrivateKey, NtruPublicKey)> {
    let mut rng = super::gaussian::ShakeRng::from_system_entropy()?;
    generate_keypair_with_rng(&mut rng)
}

//! Discrete Gaussian sampling over the integers
//!
//! Implements SamplerZ: a reverse-CDT base sampler for a fixed
//! half-Gaussian, combined with Bernoulli rejection driven by a
//! fixed-point polynomial approximation of exp(-x). The sampler is a
//! pure function of its arguments and the supplied randomness source,
//! so concurrent signing operations never share state.

use rand_core::{CryptoRng, RngCore};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use super::flr::Flr;
#[cfg(feature = "getrandom")]
use crate::{Error, Result};

/// Precision of the reverse cumulative distribution table, in bits
const RCDT_PREC: usize = 72;

/// 1 / (2 * MAX_SIGMA^2), with MAX_SIGMA^2 = 3.31422025
const INV_2SIGMA2: f64 = 1.0 / (2.0 * 3.31422025);

/// ln(2) and 1 / ln(2)
const LN2: f64 = 0.69314718056;
const ILN2: f64 = 1.44269504089;

/// Reverse cumulative distribution table of a distribution very close to
/// a half-Gaussian of parameter MAX_SIGMA, at 72-bit precision.
const RCDT: [u128; 18] = [
    3024686241123004913666,
    1564742784480091954050,
    636254429462080897535,
    199560484645026482916,
    47667343854657281903,
    8595902006365044063,
    1163297957344668388,
    117656387352093658,
    8867391802663976,
    496969357462633,
    20680885154299,
    638331848991,
    14602316184,
    247426747,
    3104126,
    28824,
    198,
    1,
];

/// Coefficients of a polynomial approximating exp(-x) on [0, ln 2]:
/// 2^-63 * sum(C[12 - i] * x^i) is very close to exp(-x).
/// The polynomial is lifted from FACCT.
const C: [u64; 13] = [
    0x00000004741183A3,
    0x00000036548CFC06,
    0x0000024FDCBF140A,
    0x0000171D939DE045,
    0x0000D00CF58F6F84,
    0x000680681CF796E3,
    0x002D82D8305B0FEA,
    0x011111110E066FD0,
    0x0555555555070F00,
    0x155555555581FF00,
    0x400000000002B400,
    0x7FFFFFFFFFFF4800,
    0x8000000000000000,
];

fn next_byte<R: RngCore>(rng: &mut R) -> u8 {
    let mut buf = [0u8; 1];
    rng.fill_bytes(&mut buf);
    buf[0]
}

/// Sample z0 in {0, 1, ..., 18} from a distribution very close to the
/// half-Gaussian D_{Z+, 0, MAX_SIGMA}, consuming 9 random bytes.
fn base_sampler<R: RngCore>(rng: &mut R) -> i64 {
    let mut buf = [0u8; RCDT_PREC / 8];
    rng.fill_bytes(&mut buf);
    // 72-bit big-endian value
    let u = buf.iter().fold(0u128, |acc, &b| (acc << 8) | b as u128);

    let mut z0: i64 = 0;
    for &elt in RCDT.iter() {
        if u < elt {
            z0 += 1;
        }
    }
    z0
}

/// Integral approximation of 2^64 * ccs * exp(-x), for x in [0, ln 2)
/// and 0 < ccs < 1. Fixed-point Horner evaluation of the FACCT
/// polynomial.
fn approxexp(x: Flr, ccs: Flr) -> u128 {
    let z = (x.raw() * (1u64 << 63) as f64) as u64;
    let mut y: u128 = C[0] as u128;
    for &elt in &C[1..] {
        y = elt as u128 - ((z as u128 * y) >> 63);
    }
    let scale = ((ccs.raw() * (1u64 << 63) as f64) as u128) << 1;
    (scale * y) >> 63
}

/// Return a single bit, equal to 1 with probability ~ ccs * exp(-x).
///
/// The comparison against the random stream proceeds one byte at a time
/// from the most significant end, consuming bytes lazily.
fn berexp<R: RngCore>(x: Flr, ccs: Flr, rng: &mut R) -> bool {
    let mut s = (x * Flr::new(ILN2)).floor().raw() as i64;
    let r = x - Flr::new(s as f64) * Flr::new(LN2);
    if s > 63 {
        s = 63;
    }
    let z = (approxexp(r, ccs) - 1) >> s;

    let mut w: i64 = 0;
    let mut i = 56i64;
    while i >= 0 {
        let p = next_byte(rng) as i64;
        w = p - ((z >> i) & 0xFF) as i64;
        if w != 0 {
            break;
        }
        i -= 8;
    }
    w < 0
}

/// Sample an integer from the discrete Gaussian D_{Z, mu, sigma}.
///
/// The inputs must satisfy sigmin <= sigma <= MAX_SIGMA; sigmin scales
/// the acceptance probability so that the rejection rate does not leak
/// which sigma is in use.
pub fn sampler_z<R: RngCore>(mu: Flr, sigma: Flr, sigmin: Flr, rng: &mut R) -> i64 {
    debug_assert!(sigma.raw() <= super::params::MAX_SIGMA);
    let s = mu.floor();
    let r = mu - s;
    let dss = Flr::HALF / (sigma * sigma);
    let ccs = sigmin / sigma;

    loop {
        let z0 = base_sampler(rng);
        let b = (next_byte(rng) & 1) as i64;
        let z = b + (2 * b - 1) * z0;

        let zr = Flr::new(z as f64) - r;
        let x = zr * zr * dss - Flr::new((z0 * z0) as f64) * Flr::new(INV_2SIGMA2);

        if berexp(x, ccs, rng) {
            return z + s.raw() as i64;
        }
    }
}

/// Deterministic random byte stream backed by SHAKE256.
///
/// Mirrors the reference implementation's inner PRNG: a seed is absorbed
/// once and the XOF output is consumed as the random stream. Used for
/// seeded key generation and deterministic tests; with the `getrandom`
/// feature it can be seeded from the system entropy source.
pub struct ShakeRng {
    reader: sha3::Shake256Reader,
}

impl ShakeRng {
    /// Create a stream from an explicit seed
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut xof = Shake256::default();
        xof.update(seed);
        ShakeRng {
            reader: xof.finalize_xof(),
        }
    }

    /// Create a stream seeded from the system entropy source
    #[cfg(feature = "getrandom")]
    pub fn from_system_entropy() -> Result<Self> {
        let mut seed = [0u8; 56];
        getrandom::getrandom(&mut seed).map_err(|_| Error::RngError)?;
        Ok(Self::from_seed(&seed))
    }
}

impl RngCore for ShakeRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.reader.read(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for ShakeRng {}

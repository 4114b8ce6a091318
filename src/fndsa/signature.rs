//! Signature generation
//!
//! Signing hashes the salted message to a ring element c, maps it to a
//! target in the secret-basis coordinate system, draws a nearby lattice
//! point with fast Fourier sampling, and keeps the short difference
//! vector. Candidates are redrawn until the squared norm is within the
//! scheme bound and the second component compresses into the fixed
//! payload.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use rand_core::{CryptoRng, RngCore};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

use super::compression;
use super::falcon_tree::FalconTree;
use super::fft::{Complex, ComplexPoly};
use super::ntru::NtruPrivateKey;
use super::params::{FALCON_512, LOGN, MAX_SIGN_ATTEMPTS, N, Q, SALT_LEN};
use super::poly::ModqPoly;
use crate::{Error, Result};

/// Rejection threshold for 16-bit draws: the largest multiple of q
/// below 2^16, so accepted draws are uniform mod q.
const HASH_DRAW_BOUND: u32 = 61445;

/// Hash a salted message to a uniform ring element mod q.
///
/// Draws 16-bit big-endian values from SHAKE256(salt || message) and
/// keeps those below the rejection threshold.
pub fn hash_to_point(salt: &[u8], message: &[u8]) -> ModqPoly {
    let mut xof = Shake256::default();
    xof.update(salt);
    xof.update(message);
    let mut reader = xof.finalize_xof();

    let mut coeffs = Vec::with_capacity(N);
    let mut buf = [0u8; 2];
    while coeffs.len() < N {
        reader.read(&mut buf);
        let t = ((buf[0] as u32) << 8) | buf[1] as u32;
        if t < HASH_DRAW_BOUND {
            coeffs.push((t % Q) as u16);
        }
    }
    ModqPoly(coeffs)
}

/// Detached Falcon-512 signature: the hash salt and the compressed
/// second component s2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FalconSignature {
    /// Salt fed to hash-to-point
    pub salt: [u8; SALT_LEN],
    /// Golomb-Rice compressed s2, fixed payload size
    pub payload: Vec<u8>,
}

impl FalconSignature {
    /// Serialize to the fixed 666-byte format
    pub fn to_bytes(&self) -> Vec<u8> {
        debug_assert_eq!(self.payload.len(), FALCON_512.sig_payload_len());
        let header = (2 << 5) | (1 << 4) | LOGN as u8;
        let mut bytes = Vec::with_capacity(FALCON_512.signature_len);
        bytes.push(header);
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Deserialize from the 666-byte format; rejects a wrong length and
    /// any header that does not declare a compressed Falcon-512
    /// signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FALCON_512.signature_len {
            return Err(Error::InvalidSignature);
        }
        let header = bytes[0];
        if header >> 7 != 0
            || (header >> 5) & 3 != 2
            || (header >> 4) & 1 != 1
            || (header & 15) as usize != LOGN
        {
            return Err(Error::InvalidSignature);
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[1..1 + SALT_LEN]);
        Ok(FalconSignature {
            salt,
            payload: bytes[1 + SALT_LEN..].to_vec(),
        })
    }

    /// Decode the s2 coefficient vector
    pub fn s2(&self) -> Result<Vec<i16>> {
        compression::decompress(&self.payload, N)
    }
}

/// Sign a message with the secret basis and its sampling tree.
///
/// The salt is drawn once; sampling is repeated until a candidate both
/// satisfies the norm bound and fits the compressed payload, up to the
/// attempt limit.
pub fn sign_with_rng<R: RngCore + CryptoRng>(
    key: &NtruPrivateKey,
    tree: &FalconTree,
    message: &[u8],
    rng: &mut R,
) -> Result<FalconSignature> {
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);

    let c = hash_to_point(&salt, message);
    let c_over_q_fft = ComplexPoly(
        c.0.iter()
            .map(|&v| Complex::from_real(v as f64 / Q as f64))
            .collect(),
    )
    .fft();

    // b0 = [g, -f, G, -F] in FFT representation
    let [g_fft, neg_f_fft, big_g_fft, neg_big_f_fft] = key.basis_fft();
    let f_fft = neg_f_fft.neg();
    let big_f_fft = neg_big_f_fft.neg();

    // target (t0, t1) = (c/q, 0) * B^-1
    let t0 = c_over_q_fft.hadamard_mul(&big_f_fft);
    let t1 = c_over_q_fft.hadamard_mul(&f_fft).neg();

    for _ in 0..MAX_SIGN_ATTEMPTS {
        let (z0, z1) = tree.ff_sampling(&t0, &t1, rng);
        let d0 = t0.sub(&z0);
        let d1 = t1.sub(&z1);

        // s = (t - z) * B
        let s0 = d0.hadamard_mul(&g_fft).add(&d1.hadamard_mul(&big_g_fft));
        let s1 = d0.hadamard_mul(&f_fft).add(&d1.hadamard_mul(&big_f_fft));

        let norm_squared = (s0
            .0
            .iter()
            .chain(s1.0.iter())
            .map(|a| a.norm_squared().raw())
            .sum::<f64>())
            / N as f64;
        if norm_squared > FALCON_512.beta_squared as f64 {
            continue;
        }

        let s2: Vec<i16> = s1
            .ifft()
            .0
            .iter()
            .map(|a| a.re.round_ties_to_even() as i16)
            .collect();
        match compression::compress(&s2, FALCON_512.sig_payload_len()) {
            Ok(payload) => return Ok(FalconSignature { salt, payload }),
            Err(_) => continue,
        }
    }
    Err(Error::SigningFailed)
}

/// Sign a message using system entropy
#[cfg(feature = "getrandom")]
pub fn sign(key: &NtruPrivateKey, tree: &FalconTree, message: &[u8]) -> Result<FalconSignature> {
    let mut rng = super::gaussian::ShakeRng::from_system_entropy()?;
    sign_with_rng(key, tree, message, &mut rng)
}

//! Fast Fourier LDL tree for lattice Gaussian sampling
//!
//! The Gram matrix of the secret basis is factored recursively: each
//! node stores the off-diagonal factor l10 of its 2x2 LDL decomposition,
//! and the diagonal blocks are split into half-size subrings for the two
//! children. At the bottom the diagonal entries become per-leaf standard
//! deviations for the integer Gaussian sampler.
//!
//! The whole tree lives in two flat arenas rather than a node graph:
//! level d holds 2^d nodes of length n >> d, packed at offset d*n, so
//! every level occupies exactly n complex slots.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use rand_core::{CryptoRng, RngCore};

use super::fft::{merge_fft, split_fft, Complex, ComplexPoly};
use super::flr::Flr;
use super::gaussian::sampler_z;
use super::ntru::NtruPrivateKey;
use super::params::{SIGMA, SIGMA_MIN};
use crate::{Error, Result};

/// LDL tree of the secret basis, ready for fast Fourier sampling
#[derive(Debug, Clone)]
pub struct FalconTree {
    logn: usize,
    n: usize,
    /// Off-diagonal LDL factors, all levels flattened
    l10: Vec<Complex>,
    /// Per-leaf standard deviations sigma / sqrt(d)
    leaf_sigmas: Vec<Flr>,
}

impl FalconTree {
    /// Build the tree from a secret basis.
    ///
    /// Fails with [`Error::KeyGenerationFailed`] if any diagonal entry is
    /// not strictly positive, which means the basis is numerically
    /// degenerate.
    pub fn new(key: &NtruPrivateKey) -> Result<Self> {
        let [b00, b01, b10, b11] = key.basis_fft();
        let n = b00.len();
        debug_assert!(n.is_power_of_two());
        let logn = n.trailing_zeros() as usize;

        // Gram matrix of B = [[g, -f], [G, -F]]; g10 is implied as
        // adj(g01) throughout.
        let g00 = b00
            .hadamard_mul(&b00.adjoint_fft())
            .add(&b01.hadamard_mul(&b01.adjoint_fft()));
        let g01 = b00
            .hadamard_mul(&b10.adjoint_fft())
            .add(&b01.hadamard_mul(&b11.adjoint_fft()));
        let g11 = b10
            .hadamard_mul(&b10.adjoint_fft())
            .add(&b11.hadamard_mul(&b11.adjoint_fft()));

        let mut tree = FalconTree {
            logn,
            n,
            l10: vec![Complex::ZERO; logn * n],
            leaf_sigmas: vec![Flr::ZERO; n],
        };
        tree.build_node(&g00.0, &g01.0, &g11.0, 0, 0)?;
        Ok(tree)
    }

    /// Tree degree
    pub fn n(&self) -> usize {
        self.n
    }

    /// Overwrite the secret-derived contents with zeros
    pub fn wipe(&mut self) {
        for c in self.l10.iter_mut() {
            *c = Complex::ZERO;
        }
        for s in self.leaf_sigmas.iter_mut() {
            *s = Flr::ZERO;
        }
    }

    fn node_slice(&self, level: usize, j: usize) -> &[Complex] {
        let m = self.n >> level;
        let offset = level * self.n + j * m;
        &self.l10[offset..offset + m]
    }

    fn node_slice_mut(&mut self, level: usize, j: usize) -> &mut [Complex] {
        let m = self.n >> level;
        let offset = level * self.n + j * m;
        &mut self.l10[offset..offset + m]
    }

    /// LDL-factor the node Gram matrix, record l10 and recurse into the
    /// split diagonal blocks.
    fn build_node(
        &mut self,
        g00: &[Complex],
        g01: &[Complex],
        g11: &[Complex],
        level: usize,
        j: usize,
    ) -> Result<()> {
        let m = g00.len();

        // L = [[1, 0], [l10, 1]], D = diag(g00, g11 - l10 adj(l10) g00)
        let mut l10 = Vec::with_capacity(m);
        let mut d11 = Vec::with_capacity(m);
        for i in 0..m {
            let l = g01[i].conj() / g00[i];
            d11.push(g11[i] - l * l.conj() * g00[i]);
            l10.push(l);
        }
        self.node_slice_mut(level, j).copy_from_slice(&l10);

        if m == 2 {
            self.leaf_sigmas[2 * j] = leaf_sigma(g00[0])?;
            self.leaf_sigmas[2 * j + 1] = leaf_sigma(d11[0])?;
            return Ok(());
        }

        let (d00_0, d00_1) = split_fft(g00);
        self.build_node(&d00_0, &d00_1, &d00_0, level + 1, 2 * j)?;
        let (d11_0, d11_1) = split_fft(&d11);
        self.build_node(&d11_0, &d11_1, &d11_0, level + 1, 2 * j + 1)?;
        Ok(())
    }

    /// Fast Fourier nearest-plane sampling.
    ///
    /// Given the target (t0, t1) in FFT representation, returns a lattice
    /// point (z0, z1) with integer coefficients distributed around the
    /// target according to the per-leaf Gaussians.
    pub fn ff_sampling<R: RngCore + CryptoRng>(
        &self,
        t0: &ComplexPoly,
        t1: &ComplexPoly,
        rng: &mut R,
    ) -> (ComplexPoly, ComplexPoly) {
        debug_assert_eq!(t0.len(), self.n);
        debug_assert_eq!(t1.len(), self.n);
        let (z0, z1) = self.sample_node(&t0.0, &t1.0, 0, 0, rng);
        (ComplexPoly(z0), ComplexPoly(z1))
    }

    fn sample_node<R: RngCore + CryptoRng>(
        &self,
        t0: &[Complex],
        t1: &[Complex],
        level: usize,
        j: usize,
        rng: &mut R,
    ) -> (Vec<Complex>, Vec<Complex>) {
        if t0.len() == 1 {
            let sigma = self.leaf_sigmas[j];
            let sigmin = Flr::new(SIGMA_MIN);
            let z0 = sampler_z(t0[0].re, sigma, sigmin, rng);
            let z1 = sampler_z(t1[0].re, sigma, sigmin, rng);
            return (
                vec![Complex::from_real(z0 as f64)],
                vec![Complex::from_real(z1 as f64)],
            );
        }

        let (t1_0, t1_1) = split_fft(t1);
        let (z1_0, z1_1) = self.sample_node(&t1_0, &t1_1, level + 1, 2 * j + 1, rng);
        let z1 = merge_fft(&z1_0, &z1_1);

        // shift t0 by the residual of the second half through l10
        let l10 = self.node_slice(level, j);
        let t0b: Vec<Complex> = t0
            .iter()
            .zip(t1.iter().zip(z1.iter()))
            .zip(l10.iter())
            .map(|((&a, (&b, &z)), &l)| a + (b - z) * l)
            .collect();

        let (t0_0, t0_1) = split_fft(&t0b);
        let (z0_0, z0_1) = self.sample_node(&t0_0, &t0_1, level + 1, 2 * j, rng);
        let z0 = merge_fft(&z0_0, &z0_1);

        (z0, z1)
    }
}

fn leaf_sigma(d: Complex) -> Result<Flr> {
    let value = d.re.raw();
    if !(value > 0.0) {
        return Err(Error::KeyGenerationFailed);
    }
    Ok(Flr::new(SIGMA) / Flr::new(value).sqrt())
}

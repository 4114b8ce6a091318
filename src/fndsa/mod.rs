//! Falcon-512 (FN-DSA) implementation
//!
//! This module provides the complete Falcon-512 signature scheme: NTRU
//! lattice key generation, fast Fourier sampling, signing, verification
//! and the interoperable byte codecs.

pub mod params;
pub mod flr;
pub mod fft;
pub mod poly;
pub mod gaussian;
pub mod ntru;
pub mod falcon_tree;
pub mod compression;
pub mod signature;
pub mod verification;
pub mod api;

// Re-export key types and functions
pub use params::{FalconParams, FALCON_512};
pub use ntru::{NtruPrivateKey, NtruPublicKey, generate_keypair_from_seed, generate_keypair_with_rng};
pub use falcon_tree::FalconTree;
pub use gaussian::ShakeRng;
pub use signature::{FalconSignature, sign_with_rng};
pub use verification::verify_signature;

#[cfg(feature = "getrandom")]
pub use ntru::generate_keypair;
#[cfg(feature = "getrandom")]
pub use signature::sign;

#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Falcon512: a no_std implementation of the Falcon-512 signature scheme
//!
//! This library implements the complete Falcon-512 (FN-DSA) primitive:
//! key generation over NTRU lattices, fast-Fourier-sampled signatures and
//! verification, together with the exact interoperable byte encodings.

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod fndsa;

// Re-export main types and functions
pub use fndsa::{
    FalconParams, FALCON_512,
    NtruPrivateKey, NtruPublicKey, generate_keypair_from_seed, generate_keypair_with_rng,
    FalconSignature, sign_with_rng, verify_signature,
    FalconTree, ShakeRng,
};

#[cfg(feature = "getrandom")]
pub use fndsa::{generate_keypair, sign};

/// Common error types for the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Key generation failed
    KeyGenerationFailed,
    /// Signature generation failed
    SigningFailed,
    /// Invalid signature format
    InvalidSignature,
    /// Compressed signature exceeds the fixed capacity
    SignatureTooLarge,
    /// Invalid public key format
    InvalidPublicKey,
    /// Invalid secret key format
    InvalidSecretKey,
    /// Random number generation failed
    RngError,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::KeyGenerationFailed => write!(f, "Key generation failed"),
            Error::SigningFailed => write!(f, "Signing failed"),
            Error::InvalidSignature => write!(f, "Invalid signature"),
            Error::SignatureTooLarge => write!(f, "Signature exceeds maximum encoded size"),
            Error::InvalidPublicKey => write!(f, "Invalid public key"),
            Error::InvalidSecretKey => write!(f, "Invalid secret key"),
            Error::RngError => write!(f, "Random number generation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias for operations that may fail
pub type Result<T> = core::result::Result<T, Error>;

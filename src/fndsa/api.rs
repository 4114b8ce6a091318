//! Byte-oriented signing interface
//!
//! Keys and signatures cross this boundary as plain byte strings of the
//! scheme-mandated lengths, so callers can store and transport them
//! without touching the internal types. Both detached signatures and
//! combined signed-message objects (signature followed by the message)
//! are supported.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use rand_core::{CryptoRng, RngCore};

use super::falcon_tree::FalconTree;
use super::ntru::{generate_keypair_with_rng, NtruPrivateKey, NtruPublicKey};
use super::signature::{sign_with_rng, FalconSignature};
use super::verification::verify_signature;
use crate::{Error, Result};

/// Encoded public key length in bytes
pub const PUBLIC_KEY_BYTES: usize = 897;

/// Encoded secret key length in bytes
pub const SECRET_KEY_BYTES: usize = 1281;

/// Encoded signature length in bytes
pub const SIGNATURE_BYTES: usize = 666;

/// Generate an encoded key pair, returned as (public key, secret key)
pub fn keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<(Vec<u8>, Vec<u8>)> {
    let (sk, pk) = generate_keypair_with_rng(rng)?;
    Ok((pk.to_bytes(), sk.to_bytes()?))
}

/// Sign a message with an encoded secret key, producing a detached
/// 666-byte signature.
///
/// The sampling tree is rebuilt from the decoded key on every call;
/// callers signing many messages under one key should keep a decoded
/// [`NtruPrivateKey`] and [`FalconTree`] instead.
pub fn sign_detached_with_rng<R: RngCore + CryptoRng>(
    secret_key: &[u8],
    message: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>> {
    let sk = NtruPrivateKey::from_bytes(secret_key)?;
    let tree = FalconTree::new(&sk)?;
    let sig = sign_with_rng(&sk, &tree, message, rng)?;
    Ok(sig.to_bytes())
}

/// Verify a detached signature against a message and an encoded public
/// key. Any malformed input verifies as false.
pub fn verify_detached(signature: &[u8], message: &[u8], public_key: &[u8]) -> bool {
    let pk = match NtruPublicKey::from_bytes(public_key) {
        Ok(pk) => pk,
        Err(_) => return false,
    };
    let sig = match FalconSignature::from_bytes(signature) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    verify_signature(&pk, message, &sig)
}

/// Sign a message and pack signature and message into one object
pub fn sign_combined_with_rng<R: RngCore + CryptoRng>(
    secret_key: &[u8],
    message: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>> {
    let mut signed = sign_detached_with_rng(secret_key, message, rng)?;
    signed.extend_from_slice(message);
    Ok(signed)
}

/// Open a combined signed-message object, returning the embedded
/// message when the signature verifies.
pub fn open_combined(signed_message: &[u8], public_key: &[u8]) -> Result<Vec<u8>> {
    if signed_message.len() < SIGNATURE_BYTES {
        return Err(Error::InvalidSignature);
    }
    let (signature, message) = signed_message.split_at(SIGNATURE_BYTES);
    if !verify_detached(signature, message, public_key) {
        return Err(Error::InvalidSignature);
    }
    Ok(message.to_vec())
}

/// Generate an encoded key pair using system entropy
#[cfg(feature = "getrandom")]
pub fn keypair() -> Result<(Vec<u8>, Vec<u8>)> {
    let mut rng = super::gaussian::ShakeRng::from_system_entropy()?;
    keypair_with_rng(&mut rng)
}

/// Sign a message with an encoded secret key using system entropy
#[cfg(feature = "getrandom")]
pub fn sign_detached(secret_key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut rng = super::gaussian::ShakeRng::from_system_entropy()?;
    sign_detached_with_rng(secret_key, message, &mut rng)
}

/// Sign and pack a message using system entropy
#[cfg(feature = "getrandom")]
pub fn sign_combined(secret_key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut rng = super::gaussian::ShakeRng::from_system_entropy()?;
    sign_combined_with_rng(secret_key, message, &mut rng)
}

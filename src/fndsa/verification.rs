//! Signature verification
//!
//! Verification is purely integer arithmetic: the compressed second
//! component is decoded, the first component is reconstructed from the
//! verification equation s1 = c - s2*h mod q, and the pair is accepted
//! when its squared norm stays within the scheme bound.

use super::ntru::NtruPublicKey;
use super::params::{FALCON_512, LOGN};
use super::poly::{ModqPoly, NttTables};
use super::signature::{hash_to_point, FalconSignature};

/// Verify a detached Falcon-512 signature over a message.
///
/// Returns `false` for any failure: an undecodable payload, a norm above
/// the acceptance bound, or a signature bound to different data.
pub fn verify_signature(
    public_key: &NtruPublicKey,
    message: &[u8],
    signature: &FalconSignature,
) -> bool {
    let s2 = match signature.s2() {
        Ok(s2) => s2,
        Err(_) => return false,
    };
    if public_key.h.len() != s2.len() {
        return false;
    }

    let c = hash_to_point(&signature.salt, message);

    // s1 = c - s2*h mod q, taken with centered representatives
    let tables = NttTables::new(LOGN);
    let s2_h = ModqPoly::from_signed(&s2)
        .ntt(&tables)
        .pointwise_mul(&ModqPoly(public_key.h.clone()).ntt(&tables))
        .intt(&tables);
    let s1 = c.sub(&s2_h).balanced();

    signature_norm_is_valid(&s1, &s2)
}

/// Squared norm check over both signature halves, exact in i64
fn signature_norm_is_valid(s1: &[i16], s2: &[i16]) -> bool {
    let norm_squared: i64 = s1
        .iter()
        .chain(s2.iter())
        .map(|&x| x as i64 * x as i64)
        .sum();
    norm_squared <= FALCON_512.beta_squared as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fndsa::falcon_tree::FalconTree;
    use crate::fndsa::gaussian::ShakeRng;
    use crate::fndsa::ntru::generate_keypair_with_rng;
    use crate::fndsa::params::{N, SALT_LEN};
    use crate::fndsa::signature::sign_with_rng;

    #[test]
    fn test_norm_bound() {
        // 1024 coefficients of 182: 1024 * 182^2 = 33918976 < 34034726
        assert!(signature_norm_is_valid(&[182; N], &[182; N]));
        // 1024 coefficients of 183: 1024 * 183^2 = 34292736 > 34034726
        assert!(!signature_norm_is_valid(&[183; N], &[183; N]));
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let mut rng = ShakeRng::from_seed(b"verify-roundtrip-seed");
        let (sk, pk) = generate_keypair_with_rng(&mut rng).unwrap();
        let tree = FalconTree::new(&sk).unwrap();

        let message = b"attack at dawn";
        let sig = sign_with_rng(&sk, &tree, message, &mut rng).unwrap();
        assert!(verify_signature(&pk, message, &sig));

        // serialized form survives a decode and still verifies
        let decoded = FalconSignature::from_bytes(&sig.to_bytes()).unwrap();
        assert!(verify_signature(&pk, message, &decoded));
    }

    #[test]
    fn test_rejects_wrong_message() {
        let mut rng = ShakeRng::from_seed(b"verify-wrong-message");
        let (sk, pk) = generate_keypair_with_rng(&mut rng).unwrap();
        let tree = FalconTree::new(&sk).unwrap();

        let sig = sign_with_rng(&sk, &tree, b"attack at dawn", &mut rng).unwrap();
        assert!(!verify_signature(&pk, b"attack at dusk", &sig));
    }

    #[test]
    fn test_rejects_tampered_salt_and_payload() {
        let mut rng = ShakeRng::from_seed(b"verify-tamper-seed");
        let (sk, pk) = generate_keypair_with_rng(&mut rng).unwrap();
        let tree = FalconTree::new(&sk).unwrap();

        let message = b"attack at dawn";
        let sig = sign_with_rng(&sk, &tree, message, &mut rng).unwrap();

        let mut bad_salt = sig.clone();
        bad_salt.salt[0] ^= 1;
        assert!(!verify_signature(&pk, message, &bad_salt));

        let mut bad_payload = sig.clone();
        bad_payload.payload[0] ^= 0x80;
        assert!(!verify_signature(&pk, message, &bad_payload));
    }

    #[test]
    fn test_rejects_wrong_key() {
        let mut rng = ShakeRng::from_seed(b"verify-wrong-key-seed");
        let (sk, _pk) = generate_keypair_with_rng(&mut rng).unwrap();
        let (_sk2, pk2) = generate_keypair_with_rng(&mut rng).unwrap();
        let tree = FalconTree::new(&sk).unwrap();

        let message = b"attack at dawn";
        let sig = sign_with_rng(&sk, &tree, message, &mut rng).unwrap();
        assert!(!verify_signature(&pk2, message, &sig));
    }

    #[test]
    fn test_rejects_oversized_decoded_norm() {
        let mut rng = ShakeRng::from_seed(b"verify-norm-seed");
        let (_sk, pk) = generate_keypair_with_rng(&mut rng).unwrap();

        // a sparse vector of large coefficients fits the payload but
        // blows the norm bound on its own
        let coeffs: Vec<i16> = (0..N).map(|i| if i < 10 { 2000 } else { 0 }).collect();
        let payload =
            crate::fndsa::compression::compress(&coeffs, FALCON_512.sig_payload_len()).unwrap();
        let sig = FalconSignature {
            salt: [3u8; SALT_LEN],
            payload,
        };
        assert!(!verify_signature(&pk, b"msg", &sig));
    }
}

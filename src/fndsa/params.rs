//! Falcon-512 parameter set and scheme constants
//!
//! All numeric constants are the scheme-mandated values from the public
//! Falcon specification; they are carried verbatim, never re-derived.

/// Logarithmic degree for Falcon-512
pub const LOGN: usize = 9;

/// Polynomial degree (n = 2^logn)
pub const N: usize = 1 << LOGN;

/// Prime modulus q
pub const Q: u32 = 12289;

/// Falcon parameter set specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FalconParams {
    /// Logarithmic degree (logn)
    pub logn: usize,
    /// Polynomial degree (n = 2^logn)
    pub n: usize,
    /// Prime modulus
    pub q: u32,
    /// Signature bound squared (β²)
    pub beta_squared: u64,
    /// NIST security level in bits
    pub security_level: usize,
    /// Public key size in bytes
    pub public_key_len: usize,
    /// Secret key size in bytes
    pub secret_key_len: usize,
    /// Encoded signature size in bytes
    pub signature_len: usize,
}

/// Falcon-512 parameter set (NIST security level 1)
pub const FALCON_512: FalconParams = FalconParams {
    logn: LOGN,
    n: N,
    q: Q,
    beta_squared: 34034726,
    security_level: 128,
    public_key_len: 897,
    secret_key_len: 1281,
    signature_len: 666,
};

/// Salt size for hash-to-point in bytes
pub const SALT_LEN: usize = 40;

/// Upper bound on the absolute value of a compressed signature coefficient
pub const COEFF_BOUND: i16 = 2047;

/// Standard deviation of the signing Gaussian for Falcon-512
pub const SIGMA: f64 = 165.7366171829776;

/// Lower scaling bound fed to the integer Gaussian sampler
pub const SIGMA_MIN: f64 = 1.2778336969128337;

/// Upper bound on all per-draw standard deviations (base sampler parameter)
pub const MAX_SIGMA: f64 = 1.8205;

/// Standard deviation for the key generation polynomials f and g,
/// before aggregation: 1.17 * sqrt(q / 8192)
pub const SIGMA_FG: f64 = 1.43300980528773;

/// Squared Gram-Schmidt norm acceptance threshold: (1.17)^2 * q
pub const GS_NORM_BOUND: f64 = 1.17 * 1.17 * (Q as f64);

/// Maximum attempts for key generation before giving up
pub const MAX_KEYGEN_ATTEMPTS: usize = 1000;

/// Maximum sampling attempts per signature before giving up
pub const MAX_SIGN_ATTEMPTS: usize = 1000;

impl FalconParams {
    /// Length in bytes of the compressed coefficient payload of a signature
    /// (total length minus the header byte and the salt).
    pub const fn sig_payload_len(self) -> usize {
        self.signature_len - SALT_LEN - 1
    }

    /// Check if a given squared norm is within the signature bound
    pub fn norm_is_valid(self, norm_squared: u64) -> bool {
        norm_squared <= self.beta_squared
    }
}

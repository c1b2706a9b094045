//! Signature algorithm policy, ICAO Doc 9303 Part 12 Appendix A.
//!
//! SHA-2 with RSA or ECDSA is approved; SHA-1 parses but is deprecated
//! per the ICAO NTWG recommendations; RSA keys below 2048 bits are
//! flagged regardless of digest.

use crate::{cert::Certificate, crypto};

/// ICAO minimum RSA modulus size.
pub const MIN_RSA_KEY_BITS: usize = 2048;

#[derive(Clone, Debug, Default)]
pub struct AlgorithmCompliance {
    pub compliant: bool,
    /// Display name of the signature algorithm, e.g. `SHA256withRSA`.
    pub algorithm: String,
    pub warning:   Option<String>,
    /// Public key size in bits, when the key family is recognized.
    pub key_bits:  Option<usize>,
}

/// Check a certificate's signature algorithm and key size against the
/// Appendix A approved set.
pub fn check(cert: &Certificate) -> AlgorithmCompliance {
    use crypto::oids;

    let oid = cert.signature_algorithm_oid();
    let mut result = AlgorithmCompliance {
        algorithm: crypto::signature_algorithm_name(oid),
        ..AlgorithmCompliance::default()
    };

    match oid {
        oids::SHA256_WITH_RSA
        | oids::SHA384_WITH_RSA
        | oids::SHA512_WITH_RSA
        | oids::ECDSA_WITH_SHA256
        | oids::ECDSA_WITH_SHA384
        | oids::ECDSA_WITH_SHA512
        | oids::RSASSA_PSS => {
            result.compliant = true;
        }
        oids::SHA1_WITH_RSA | oids::ECDSA_WITH_SHA1 => {
            result.compliant = true;
            result.warning =
                Some("SHA-1 algorithm is deprecated per ICAO NTWG recommendations".into());
        }
        _ => {
            result.compliant = false;
            result.warning = Some(format!(
                "unknown or non-ICAO-approved signature algorithm: {}",
                result.algorithm
            ));
        }
    }

    if let Some(bits) = crypto::rsa_key_bits(cert.public_key_info()) {
        result.key_bits = Some(bits);
        if bits < MIN_RSA_KEY_BITS {
            result.warning = Some(format!(
                "RSA key size {bits} bits is below ICAO minimum of {MIN_RSA_KEY_BITS} bits"
            ));
        }
    }

    result
}

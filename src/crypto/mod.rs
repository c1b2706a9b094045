//! Signature verification for the Doc 9303 algorithm set.
//!
//! Verifying only, by design: a PKD consumes signatures, it never creates
//! them. All failures surface as [`VerifyError`] values; there is no
//! ambient error state to clear between calls.

mod ecdsa;
mod rsa;

use {
    crate::asn1::RsaPssParameters,
    cms::cert::x509::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned},
    der::asn1::ObjectIdentifier as Oid,
    sha1::Sha1,
    sha2::{Digest, Sha256, Sha384, Sha512},
    thiserror::Error,
};

pub mod oids {
    //! Signature and digest algorithm OIDs referenced by Doc 9303
    //! Appendix A and RFC 5652 SignerInfos.

    use der::asn1::ObjectIdentifier as Oid;

    pub const RSA_ENCRYPTION: Oid = Oid::new_unwrap("1.2.840.113549.1.1.1");
    pub const SHA1_WITH_RSA: Oid = Oid::new_unwrap("1.2.840.113549.1.1.5");
    pub const RSASSA_PSS: Oid = Oid::new_unwrap("1.2.840.113549.1.1.10");
    pub const SHA256_WITH_RSA: Oid = Oid::new_unwrap("1.2.840.113549.1.1.11");
    pub const SHA384_WITH_RSA: Oid = Oid::new_unwrap("1.2.840.113549.1.1.12");
    pub const SHA512_WITH_RSA: Oid = Oid::new_unwrap("1.2.840.113549.1.1.13");

    pub const ECDSA_WITH_SHA1: Oid = Oid::new_unwrap("1.2.840.10045.4.1");
    pub const ECDSA_WITH_SHA256: Oid = Oid::new_unwrap("1.2.840.10045.4.3.2");
    pub const ECDSA_WITH_SHA384: Oid = Oid::new_unwrap("1.2.840.10045.4.3.3");
    pub const ECDSA_WITH_SHA512: Oid = Oid::new_unwrap("1.2.840.10045.4.3.4");

    pub const EC_PUBLIC_KEY: Oid = Oid::new_unwrap("1.2.840.10045.2.1");
    pub const SECP256R1: Oid = Oid::new_unwrap("1.2.840.10045.3.1.7");
    pub const SECP384R1: Oid = Oid::new_unwrap("1.3.132.0.34");

    pub const SHA1: Oid = Oid::new_unwrap("1.3.14.3.2.26");
    pub const SHA256: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.1");
    pub const SHA384: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.2");
    pub const SHA512: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.3");
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("unsupported signature algorithm {0}")]
    UnsupportedAlgorithm(Oid),

    #[error("unsupported digest algorithm {0}")]
    UnsupportedDigest(Oid),

    #[error("unsupported curve {0}")]
    UnsupportedCurve(Oid),

    #[error("malformed public key: {0}")]
    MalformedKey(String),

    #[error("malformed signature")]
    MalformedSignature,

    #[error("signature mismatch")]
    Mismatch,
}

/// Digest half of a signature algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    fn from_oid(oid: Oid) -> Result<Self, VerifyError> {
        Ok(match oid {
            oids::SHA1 => Self::Sha1,
            oids::SHA256 => Self::Sha256,
            oids::SHA384 => Self::Sha384,
            oids::SHA512 => Self::Sha512,
            other => return Err(VerifyError::UnsupportedDigest(other)),
        })
    }
}

/// A signature algorithm resolved to verification family and digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    RsaPkcs1(HashAlgorithm),
    RsaPss(HashAlgorithm),
    Ecdsa(HashAlgorithm),
}

/// Resolve an X.509 `AlgorithmIdentifier` (certificate and CRL signature
/// fields) into a verification family.
pub fn identify(alg: &AlgorithmIdentifierOwned) -> Result<SignatureAlgorithm, VerifyError> {
    Ok(match alg.oid {
        oids::SHA1_WITH_RSA => SignatureAlgorithm::RsaPkcs1(HashAlgorithm::Sha1),
        oids::SHA256_WITH_RSA => SignatureAlgorithm::RsaPkcs1(HashAlgorithm::Sha256),
        oids::SHA384_WITH_RSA => SignatureAlgorithm::RsaPkcs1(HashAlgorithm::Sha384),
        oids::SHA512_WITH_RSA => SignatureAlgorithm::RsaPkcs1(HashAlgorithm::Sha512),
        oids::ECDSA_WITH_SHA1 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha1),
        oids::ECDSA_WITH_SHA256 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha256),
        oids::ECDSA_WITH_SHA384 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha384),
        oids::ECDSA_WITH_SHA512 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha512),
        oids::RSASSA_PSS => SignatureAlgorithm::RsaPss(pss_hash(alg)?),
        other => return Err(VerifyError::UnsupportedAlgorithm(other)),
    })
}

/// Resolve a CMS SignerInfo's algorithm pair. RFC 5652 permits a bare key
/// algorithm (`rsaEncryption`, `id-ecPublicKey`) as the signature
/// algorithm, with the digest carried separately.
pub fn identify_cms(
    signature_alg: &AlgorithmIdentifierOwned,
    digest_alg: &AlgorithmIdentifierOwned,
) -> Result<SignatureAlgorithm, VerifyError> {
    match signature_alg.oid {
        oids::RSA_ENCRYPTION => Ok(SignatureAlgorithm::RsaPkcs1(HashAlgorithm::from_oid(
            digest_alg.oid,
        )?)),
        oids::EC_PUBLIC_KEY => Ok(SignatureAlgorithm::Ecdsa(HashAlgorithm::from_oid(
            digest_alg.oid,
        )?)),
        _ => identify(signature_alg),
    }
}

/// Digest algorithm of a CMS SignerInfo, for the message-digest attribute
/// cross-check.
pub fn digest_hash(digest_alg: &AlgorithmIdentifierOwned) -> Result<HashAlgorithm, VerifyError> {
    HashAlgorithm::from_oid(digest_alg.oid)
}

fn pss_hash(alg: &AlgorithmIdentifierOwned) -> Result<HashAlgorithm, VerifyError> {
    use der::{Decode, Encode};
    let Some(params) = alg.parameters.as_ref() else {
        // RFC 4055: absent parameters default the hash to SHA-1.
        return Ok(HashAlgorithm::Sha1);
    };
    let der = params
        .to_der()
        .map_err(|_| VerifyError::UnsupportedAlgorithm(oids::RSASSA_PSS))?;
    let params = RsaPssParameters::from_der(&der)
        .map_err(|_| VerifyError::UnsupportedAlgorithm(oids::RSASSA_PSS))?;
    HashAlgorithm::from_oid(params.hash_algorithm.algorithm)
}

/// Verify `signature` over `message` with the given public key and
/// algorithm. Dispatches to the RSA or ECDSA backend.
pub fn verify_with_spki(
    spki: &SubjectPublicKeyInfoOwned,
    alg: &AlgorithmIdentifierOwned,
    message: &[u8],
    signature: &[u8],
) -> Result<(), VerifyError> {
    verify_resolved(spki, identify(alg)?, message, signature)
}

/// Like [`verify_with_spki`] for an already-resolved algorithm (CMS path).
pub fn verify_resolved(
    spki: &SubjectPublicKeyInfoOwned,
    alg: SignatureAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> Result<(), VerifyError> {
    match alg {
        SignatureAlgorithm::RsaPkcs1(hash) => rsa::verify_pkcs1v15(spki, hash, message, signature),
        SignatureAlgorithm::RsaPss(hash) => rsa::verify_pss(spki, hash, message, signature),
        SignatureAlgorithm::Ecdsa(hash) => ecdsa::verify(spki, hash, message, signature),
    }
}

/// RSA modulus size in bits, when the key is an RSA key.
pub fn rsa_key_bits(spki: &SubjectPublicKeyInfoOwned) -> Option<usize> {
    rsa::key_bits(spki)
}

/// Display name for a signature algorithm OID, Doc 9303 result
/// conventions: `SHA256withRSA`, `SHA384withECDSA`, …; unknown OIDs are
/// reported as `UNKNOWN(<oid>)`.
pub fn signature_algorithm_name(oid: Oid) -> String {
    match oid {
        oids::SHA1_WITH_RSA => "SHA1withRSA".into(),
        oids::SHA256_WITH_RSA => "SHA256withRSA".into(),
        oids::SHA384_WITH_RSA => "SHA384withRSA".into(),
        oids::SHA512_WITH_RSA => "SHA512withRSA".into(),
        oids::RSASSA_PSS => "RSASSA-PSS".into(),
        oids::ECDSA_WITH_SHA1 => "SHA1withECDSA".into(),
        oids::ECDSA_WITH_SHA256 => "SHA256withECDSA".into(),
        oids::ECDSA_WITH_SHA384 => "SHA384withECDSA".into(),
        oids::ECDSA_WITH_SHA512 => "SHA512withECDSA".into(),
        other => format!("UNKNOWN({other})"),
    }
}

/// Display name for a digest algorithm OID: `SHA-256` etc.
pub fn digest_algorithm_name(oid: Oid) -> String {
    match HashAlgorithm::from_oid(oid) {
        Ok(hash) => hash.name().into(),
        Err(_) => format!("UNKNOWN({oid})"),
    }
}

//! ECDSA signature verification over the Doc 9303 curves.
//!
//! P-256 and P-384 cover the deployed CSCA/DSC population; other curves
//! surface as [`VerifyError::UnsupportedCurve`]. X.509 ECDSA signatures
//! are DER `SEQUENCE { r, s }`, verified against the externally computed
//! digest so mixed hash/curve pairings (e.g. SHA-512 with P-256) work.

use {
    super::{oids, HashAlgorithm, VerifyError},
    cms::cert::x509::spki::SubjectPublicKeyInfoOwned,
    der::asn1::ObjectIdentifier as Oid,
    p256::ecdsa::signature::hazmat::PrehashVerifier,
};

enum Curve {
    P256,
    P384,
}

pub(super) fn verify(
    spki: &SubjectPublicKeyInfoOwned,
    hash: HashAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> Result<(), VerifyError> {
    let key_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| VerifyError::MalformedKey("public key has unused bits".into()))?;
    let digest = hash.digest(message);

    match named_curve(spki)? {
        Curve::P256 => {
            let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                .map_err(|e| VerifyError::MalformedKey(e.to_string()))?;
            let sig = p256::ecdsa::Signature::from_der(signature)
                .map_err(|_| VerifyError::MalformedSignature)?;
            key.verify_prehash(&digest, &sig)
                .map_err(|_| VerifyError::Mismatch)
        }
        Curve::P384 => {
            let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                .map_err(|e| VerifyError::MalformedKey(e.to_string()))?;
            let sig = p384::ecdsa::Signature::from_der(signature)
                .map_err(|_| VerifyError::MalformedSignature)?;
            key.verify_prehash(&digest, &sig)
                .map_err(|_| VerifyError::Mismatch)
        }
    }
}

fn named_curve(spki: &SubjectPublicKeyInfoOwned) -> Result<Curve, VerifyError> {
    if spki.algorithm.oid != oids::EC_PUBLIC_KEY {
        return Err(VerifyError::MalformedKey(format!(
            "not an EC key: {}",
            spki.algorithm.oid
        )));
    }
    let curve_oid: Oid = spki
        .algorithm
        .parameters
        .as_ref()
        .and_then(|params| params.decode_as().ok())
        .ok_or_else(|| VerifyError::MalformedKey("missing named-curve parameters".into()))?;
    match curve_oid {
        oids::SECP256R1 => Ok(Curve::P256),
        oids::SECP384R1 => Ok(Curve::P384),
        other => Err(VerifyError::UnsupportedCurve(other)),
    }
}

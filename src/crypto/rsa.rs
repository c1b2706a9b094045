//! RSA signature verification.
//!
//! To *not* do: signing. This stays verifying only; a directory has no
//! business holding signing keys.

use {
    super::{HashAlgorithm, VerifyError},
    cms::cert::x509::spki::SubjectPublicKeyInfoOwned,
    der::Encode,
    rsa::{
        pkcs1v15, pkcs8::DecodePublicKey, pss, signature::Verifier, traits::PublicKeyParts,
        RsaPublicKey,
    },
    sha1::Sha1,
    sha2::{Sha256, Sha384, Sha512},
};

pub(super) fn verify_pkcs1v15(
    spki: &SubjectPublicKeyInfoOwned,
    hash: HashAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> Result<(), VerifyError> {
    let key = public_key(spki)?;
    let signature = pkcs1v15::Signature::try_from(signature)
        .map_err(|_| VerifyError::MalformedSignature)?;
    let verified = match hash {
        HashAlgorithm::Sha1 => pkcs1v15::VerifyingKey::<Sha1>::new(key).verify(message, &signature),
        HashAlgorithm::Sha256 => {
            pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(message, &signature)
        }
        HashAlgorithm::Sha384 => {
            pkcs1v15::VerifyingKey::<Sha384>::new(key).verify(message, &signature)
        }
        HashAlgorithm::Sha512 => {
            pkcs1v15::VerifyingKey::<Sha512>::new(key).verify(message, &signature)
        }
    };
    verified.map_err(|_| VerifyError::Mismatch)
}

/// RSASSA-PSS per RFC 8017. The salt length is recovered from the encoded
/// message during verification, so only the hash matters here.
pub(super) fn verify_pss(
    spki: &SubjectPublicKeyInfoOwned,
    hash: HashAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> Result<(), VerifyError> {
    let key = public_key(spki)?;
    let signature =
        pss::Signature::try_from(signature).map_err(|_| VerifyError::MalformedSignature)?;
    let verified = match hash {
        HashAlgorithm::Sha1 => pss::VerifyingKey::<Sha1>::new(key).verify(message, &signature),
        HashAlgorithm::Sha256 => pss::VerifyingKey::<Sha256>::new(key).verify(message, &signature),
        HashAlgorithm::Sha384 => pss::VerifyingKey::<Sha384>::new(key).verify(message, &signature),
        HashAlgorithm::Sha512 => pss::VerifyingKey::<Sha512>::new(key).verify(message, &signature),
    };
    verified.map_err(|_| VerifyError::Mismatch)
}

pub(super) fn key_bits(spki: &SubjectPublicKeyInfoOwned) -> Option<usize> {
    public_key(spki).ok().map(|key| key.n().bits())
}

fn public_key(spki: &SubjectPublicKeyInfoOwned) -> Result<RsaPublicKey, VerifyError> {
    let der = spki
        .to_der()
        .map_err(|e| VerifyError::MalformedKey(e.to_string()))?;
    RsaPublicKey::from_public_key_der(&der).map_err(|e| VerifyError::MalformedKey(e.to_string()))
}

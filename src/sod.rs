//! Security Object Document (EF.SOD) handling.
//!
//! A SOD arrives either as raw CMS SignedData (leading byte 0x30) or
//! wrapped in the ICAO `[APPLICATION 23]` TLV (leading byte 0x77,
//! ICAO-9303-10 4.7.14). [`Sod::from_bytes`] unwraps transparently; the
//! verification entry points follow RFC 5652 5.4 with the structure
//! checks ICAO-9303-10 4.6.2.2 adds on top.

use {
    crate::{
        asn1::lds::{self, LdsSecurityObject},
        cert::Certificate,
        codec, crypto,
        error::ParseError,
    },
    cms::{
        cert::CertificateChoices,
        content_info::CmsVersion,
        signed_data::{SignedData, SignerInfo},
    },
    der::{
        asn1::{ObjectIdentifier as Oid, OctetString},
        Decode, Encode,
    },
    thiserror::Error,
};

/// Leading byte of the ICAO application wrapper, `[APPLICATION 23]`.
pub const ICAO_TAG: u8 = 0x77;

/// RFC 5652 11.2: id-messageDigest signed attribute.
const ID_MESSAGE_DIGEST: Oid = Oid::new_unwrap("1.2.840.113549.1.9.4");

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SodError {
    #[error("SOD contains no SignerInfo")]
    MissingSignerInfo,

    #[error("SOD certificates set is absent or empty")]
    MissingCertificate,

    #[error("SOD has no encapsulated content")]
    MissingContent,

    #[error("message-digest attribute does not match encapsulated content")]
    DigestMismatch,

    #[error(transparent)]
    Signature(#[from] crypto::VerifyError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<der::Error> for SodError {
    fn from(err: der::Error) -> Self {
        Self::Parse(err.into())
    }
}

/// A parsed Security Object Document.
#[derive(Clone, Debug)]
pub struct Sod {
    signed_data: SignedData,
}

/// Strip the ICAO `[APPLICATION 23]` wrapper when present, returning the
/// enclosed CMS bytes.
pub fn unwrap_icao(bytes: &[u8]) -> Result<&[u8], ParseError> {
    if bytes.first() != Some(&ICAO_TAG) {
        return Ok(bytes);
    }
    tracing::debug!("unwrapping ICAO 0x77 application tag");
    let header = codec::header_len(bytes)?;
    let inner = &bytes[header..];
    if inner.first() != Some(&0x30) {
        return Err(ParseError::UnexpectedTag(format!(
            "{:#04x} inside ICAO wrapper",
            inner.first().copied().unwrap_or(0)
        )));
    }
    Ok(inner)
}

impl Sod {
    /// Parse SOD bytes, transparently unwrapping the ICAO TLV.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let cms = unwrap_icao(bytes)?;
        let cms = codec::trim_to_declared(cms)?;
        let content_info = cms::content_info::ContentInfo::from_der(cms)?;
        if content_info.content_type != <SignedData as crate::asn1::ContentType>::CONTENT_TYPE {
            return Err(ParseError::Unsupported(format!(
                "content type {}",
                content_info.content_type
            )));
        }
        let signed_data = content_info.content.decode_as::<SignedData>()?;
        Ok(Self { signed_data })
    }

    pub const fn signed_data(&self) -> &SignedData {
        &self.signed_data
    }

    pub fn signer_info(&self) -> Result<&SignerInfo, SodError> {
        self.signed_data
            .signer_infos
            .0
            .as_slice()
            .first()
            .ok_or(SodError::MissingSignerInfo)
    }

    /// Bytes of the encapsulated content OCTET STRING, the payload the
    /// message-digest attribute covers.
    pub fn content_bytes(&self) -> Result<Vec<u8>, SodError> {
        let econtent = self
            .signed_data
            .encap_content_info
            .econtent
            .as_ref()
            .ok_or(SodError::MissingContent)?;
        Ok(econtent.decode_as::<OctetString>()?.as_bytes().to_vec())
    }

    pub fn lds_security_object(&self) -> Result<LdsSecurityObject, SodError> {
        Ok(lds::lds_security_object(
            &self.signed_data.encap_content_info,
        )?)
    }

    /// The Document Signer Certificate embedded in the CMS certificates
    /// set. A conformant SOD carries exactly one; the first is taken.
    pub fn embedded_dsc(&self) -> Result<Certificate, SodError> {
        let certificates = self
            .signed_data
            .certificates
            .as_ref()
            .ok_or(SodError::MissingCertificate)?;
        let cert = certificates
            .0
            .iter()
            .find_map(|choice| match choice {
                CertificateChoices::Certificate(cert) => Some(cert),
                _ => None,
            })
            .ok_or(SodError::MissingCertificate)?;
        Ok(Certificate::from_x509(cert.clone())?)
    }

    /// Verify the SignerInfo signature against the supplied DSC.
    ///
    /// RFC 5652 5.4: with signed attributes present, the message-digest
    /// attribute must match the digest of the encapsulated content and the
    /// signature covers the DER `SET OF` encoding of the attributes;
    /// without them it covers the content directly.
    pub fn verify_signature(&self, dsc: &Certificate) -> Result<(), SodError> {
        // ICAO 9303-10 4.6.2.2: SignedData must be version 3
        if self.signed_data.version != CmsVersion::V3 {
            tracing::warn!(version = ?self.signed_data.version, "SOD SignedData is not v3");
        }

        let signer = self.signer_info()?;
        let algorithm = crypto::identify_cms(&signer.signature_algorithm, &signer.digest_alg)?;
        let content = self.content_bytes()?;

        let message = match signer.signed_attrs.as_ref() {
            Some(attrs) => {
                let digest_alg = crypto::digest_hash(&signer.digest_alg)?;
                let expected = digest_alg.digest(&content);
                let stored = attrs
                    .iter()
                    .find(|attr| attr.oid == ID_MESSAGE_DIGEST)
                    .and_then(|attr| attr.values.as_slice().first())
                    .and_then(|value| value.decode_as::<OctetString>().ok())
                    .ok_or(SodError::DigestMismatch)?;
                if stored.as_bytes() != expected.as_slice() {
                    return Err(SodError::DigestMismatch);
                }
                // RFC 5652 5.4: the signature covers the universal SET
                // encoding, not the IMPLICIT [0] framing used inside
                // SignerInfo. Normalize in case the encoder kept the
                // context tag.
                let mut attrs_der = attrs.to_der()?;
                if attrs_der.first() == Some(&0xA0) {
                    attrs_der[0] = 0x31;
                }
                attrs_der
            }
            None => content,
        };

        crypto::verify_resolved(
            dsc.public_key_info(),
            algorithm,
            &message,
            signer.signature.as_bytes(),
        )?;
        Ok(())
    }

    /// Signature algorithm of the first signer, Doc 9303 display form.
    pub fn signature_algorithm_name(&self) -> Result<String, SodError> {
        let signer = self.signer_info()?;
        Ok(match signer.signature_algorithm.oid {
            // A bare key algorithm takes its digest from digestAlgorithm.
            crypto::oids::RSA_ENCRYPTION | crypto::oids::EC_PUBLIC_KEY => {
                composed_name(&signer.signature_algorithm.oid, &signer.digest_alg.oid)
            }
            oid => crypto::signature_algorithm_name(oid),
        })
    }

    /// Digest algorithm of the first signer, e.g. `SHA-256`.
    pub fn digest_algorithm_name(&self) -> Result<String, SodError> {
        Ok(crypto::digest_algorithm_name(self.signer_info()?.digest_alg.oid))
    }
}

fn composed_name(signature_oid: &Oid, digest_oid: &Oid) -> String {
    let digest = crypto::digest_algorithm_name(*digest_oid).replace('-', "");
    let family = if *signature_oid == crypto::oids::EC_PUBLIC_KEY {
        "ECDSA"
    } else {
        "RSA"
    };
    format!("{digest}with{family}")
}

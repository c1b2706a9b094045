//! Parsed certificate and revocation-list models.
//!
//! The DER bytes are authoritative: models keep the exact input encoding
//! (trimmed of trailing padding) alongside the decoded structure, so
//! fingerprints and re-encoding are stable. Instances are immutable after
//! construction.

pub mod dn;
pub mod ops;

pub use ops::CertificateRole;
use {
    crate::{codec, error::ParseError},
    cms::cert::x509::{
        self,
        crl::CertificateList,
        ext::pkix::{
            AuthorityKeyIdentifier, BasicConstraints, CrlDistributionPoints, KeyUsage,
            SubjectKeyIdentifier,
        },
        spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned},
        time::Time,
    },
    const_oid::db::rfc5280,
    der::{asn1::ObjectIdentifier as Oid, Decode, DateTime, Encode},
    std::{fmt, time::SystemTime},
};

/// A parsed X.509 certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    der:   Vec<u8>,
    inner: x509::Certificate,
}

impl Certificate {
    /// Parse a DER-encoded certificate.
    ///
    /// Trailing bytes past the declared length are tolerated (and logged);
    /// truncated input is rejected.
    pub fn from_der(bytes: &[u8]) -> Result<Self, ParseError> {
        let der = codec::trim_to_declared(bytes)?;
        let inner = x509::Certificate::from_der(der)?;
        Ok(Self {
            der: der.to_vec(),
            inner,
        })
    }

    /// Parse a PEM-armored certificate.
    pub fn from_pem(text: &str) -> Result<Self, ParseError> {
        let (_, der) = codec::decode_pem(text)?;
        Self::from_der(&der)
    }

    /// Parse either encoding, sniffing for PEM armor first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        if codec::is_pem(bytes) {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| ParseError::Malformed("PEM armor is not UTF-8".into()))?;
            Self::from_pem(text)
        } else {
            Self::from_der(bytes)
        }
    }

    /// Construct from an already-decoded structure, re-encoding to obtain
    /// the authoritative bytes.
    pub fn from_x509(inner: x509::Certificate) -> Result<Self, ParseError> {
        let der = inner.to_der()?;
        Ok(Self { der, inner })
    }

    /// The authoritative DER encoding.
    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    pub fn x509(&self) -> &x509::Certificate {
        &self.inner
    }

    /// Subject distinguished name, RFC 4514 string form.
    pub fn subject_dn(&self) -> String {
        self.inner.tbs_certificate.subject.to_string()
    }

    /// Issuer distinguished name, RFC 4514 string form.
    pub fn issuer_dn(&self) -> String {
        self.inner.tbs_certificate.issuer.to_string()
    }

    /// Serial number as uppercase hex with leading zero octets stripped,
    /// the form directories and audit trails index on.
    pub fn serial_hex(&self) -> String {
        serial_to_hex(self.inner.tbs_certificate.serial_number.as_bytes())
    }

    pub fn serial_bytes(&self) -> &[u8] {
        self.inner.tbs_certificate.serial_number.as_bytes()
    }

    pub fn not_before(&self) -> SystemTime {
        time_to_system(&self.inner.tbs_certificate.validity.not_before)
    }

    pub fn not_after(&self) -> SystemTime {
        time_to_system(&self.inner.tbs_certificate.validity.not_after)
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifierOwned {
        &self.inner.signature_algorithm
    }

    pub fn signature_algorithm_oid(&self) -> Oid {
        self.inner.signature_algorithm.oid
    }

    /// Raw signature bits. `None` when the BIT STRING has unused bits,
    /// which no conformant signature does.
    pub fn signature_bytes(&self) -> Option<&[u8]> {
        self.inner.signature.as_bytes()
    }

    /// Re-encoded `TBSCertificate`, the exact bytes the issuer signed.
    pub fn tbs_der(&self) -> Result<Vec<u8>, ParseError> {
        Ok(self.inner.tbs_certificate.to_der()?)
    }

    pub fn public_key_info(&self) -> &SubjectPublicKeyInfoOwned {
        &self.inner.tbs_certificate.subject_public_key_info
    }

    /// SHA-256 over the DER, as 64 lowercase hex characters.
    pub fn fingerprint_sha256(&self) -> String {
        codec::sha256_hex(&self.der)
    }

    /// `C=` attribute of the subject DN, uppercased (ISO 3166-1 alpha-2).
    pub fn country_code(&self) -> Option<String> {
        dn::extract_dn_attribute(&self.subject_dn(), "C").map(|c| c.to_ascii_uppercase())
    }

    pub fn basic_constraints(&self) -> Option<BasicConstraints> {
        self.decode_extension(rfc5280::ID_CE_BASIC_CONSTRAINTS)
    }

    pub fn key_usage(&self) -> Option<KeyUsage> {
        self.decode_extension(rfc5280::ID_CE_KEY_USAGE)
    }

    pub fn subject_key_identifier(&self) -> Option<SubjectKeyIdentifier> {
        self.decode_extension(rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER)
    }

    pub fn authority_key_identifier(&self) -> Option<AuthorityKeyIdentifier> {
        self.decode_extension(rfc5280::ID_CE_AUTHORITY_KEY_IDENTIFIER)
    }

    pub fn crl_distribution_points(&self) -> Option<CrlDistributionPoints> {
        self.decode_extension(rfc5280::ID_CE_CRL_DISTRIBUTION_POINTS)
    }

    pub fn extensions(&self) -> &[x509::ext::Extension] {
        self.inner
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or(&[])
    }

    fn decode_extension<'a, T: Decode<'a>>(&'a self, oid: Oid) -> Option<T> {
        let ext = self.extensions().iter().find(|ext| ext.extn_id == oid)?;
        match T::from_der(ext.extn_value.as_bytes()) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(%oid, %err, "undecodable extension value");
                None
            }
        }
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (serial {})", self.subject_dn(), self.serial_hex())
    }
}

/// Reason for a CRL entry, RFC 5280 5.3.1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
    Unknown(u32),
}

impl From<u32> for RevocationReason {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unspecified,
            1 => Self::KeyCompromise,
            2 => Self::CaCompromise,
            3 => Self::AffiliationChanged,
            4 => Self::Superseded,
            5 => Self::CessationOfOperation,
            6 => Self::CertificateHold,
            8 => Self::RemoveFromCrl,
            9 => Self::PrivilegeWithdrawn,
            10 => Self::AaCompromise,
            n => Self::Unknown(n),
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => f.write_str("unspecified"),
            Self::KeyCompromise => f.write_str("keyCompromise"),
            Self::CaCompromise => f.write_str("cACompromise"),
            Self::AffiliationChanged => f.write_str("affiliationChanged"),
            Self::Superseded => f.write_str("superseded"),
            Self::CessationOfOperation => f.write_str("cessationOfOperation"),
            Self::CertificateHold => f.write_str("certificateHold"),
            Self::RemoveFromCrl => f.write_str("removeFromCRL"),
            Self::PrivilegeWithdrawn => f.write_str("privilegeWithdrawn"),
            Self::AaCompromise => f.write_str("aACompromise"),
            Self::Unknown(n) => write!(f, "unknown({n})"),
        }
    }
}

/// One revoked serial from a CRL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevokedEntry {
    pub serial_hex:      String,
    pub revocation_date: String,
    pub reason:          RevocationReason,
}

/// A parsed X.509 certificate revocation list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateRevocationList {
    der:   Vec<u8>,
    inner: CertificateList,
}

impl CertificateRevocationList {
    pub fn from_der(bytes: &[u8]) -> Result<Self, ParseError> {
        let der = codec::trim_to_declared(bytes)?;
        let inner = CertificateList::from_der(der)?;
        Ok(Self {
            der: der.to_vec(),
            inner,
        })
    }

    /// Parse a PEM-armored CRL.
    pub fn from_pem(text: &str) -> Result<Self, ParseError> {
        let (_, der) = codec::decode_pem(text)?;
        Self::from_der(&der)
    }

    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    pub fn issuer_dn(&self) -> String {
        self.inner.tbs_cert_list.issuer.to_string()
    }

    pub fn this_update(&self) -> SystemTime {
        time_to_system(&self.inner.tbs_cert_list.this_update)
    }

    pub fn next_update(&self) -> Option<SystemTime> {
        self.inner
            .tbs_cert_list
            .next_update
            .as_ref()
            .map(time_to_system)
    }

    pub fn this_update_iso8601(&self) -> String {
        time_to_iso8601(&self.inner.tbs_cert_list.this_update)
    }

    pub fn next_update_iso8601(&self) -> Option<String> {
        self.inner
            .tbs_cert_list
            .next_update
            .as_ref()
            .map(time_to_iso8601)
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifierOwned {
        &self.inner.signature_algorithm
    }

    pub fn signature_bytes(&self) -> Option<&[u8]> {
        self.inner.signature.as_bytes()
    }

    /// Re-encoded `TBSCertList`, the bytes the CRL issuer signed.
    pub fn tbs_der(&self) -> Result<Vec<u8>, ParseError> {
        Ok(self.inner.tbs_cert_list.to_der()?)
    }

    pub fn revoked_count(&self) -> usize {
        self.inner
            .tbs_cert_list
            .revoked_certificates
            .as_ref()
            .map_or(0, Vec::len)
    }

    /// Look up a serial number in the revoked set.
    pub fn find_revoked(&self, serial: &[u8]) -> Option<RevokedEntry> {
        let revoked = self.inner.tbs_cert_list.revoked_certificates.as_ref()?;
        let needle = strip_leading_zeros(serial);
        revoked
            .iter()
            .find(|entry| strip_leading_zeros(entry.serial_number.as_bytes()) == needle)
            .map(|entry| RevokedEntry {
                serial_hex:      serial_to_hex(entry.serial_number.as_bytes()),
                revocation_date: time_to_iso8601(&entry.revocation_date),
                reason:          entry_reason(entry),
            })
    }
}

/// CRLEntryExtensions reasonCode, RFC 5280 5.3.1. Missing or undecodable
/// extensions read as `unspecified`.
fn entry_reason(entry: &x509::crl::RevokedCert) -> RevocationReason {
    let Some(exts) = entry.crl_entry_extensions.as_ref() else {
        return RevocationReason::Unspecified;
    };
    let Some(ext) = exts.iter().find(|e| e.extn_id == rfc5280::ID_CE_CRL_REASONS) else {
        return RevocationReason::Unspecified;
    };
    match decode_enumerated(ext.extn_value.as_bytes()) {
        Some(code) => RevocationReason::from(code),
        None => {
            tracing::debug!("malformed reasonCode CRL entry extension");
            RevocationReason::Unspecified
        }
    }
}

/// Decode a DER ENUMERATED into its numeric value without bounding it to a
/// known set; unknown codes surface as `unknown(n)`.
fn decode_enumerated(bytes: &[u8]) -> Option<u32> {
    // ENUMERATED TLV: tag 0x0A, short length, big-endian content.
    let [0x0A, len, rest @ ..] = bytes else {
        return None;
    };
    if *len as usize != rest.len() || rest.is_empty() || rest.len() > 4 {
        return None;
    }
    let mut value = 0u32;
    for byte in rest {
        value = (value << 8) | u32::from(*byte);
    }
    Some(value)
}

fn serial_to_hex(bytes: &[u8]) -> String {
    let trimmed = strip_leading_zeros(bytes);
    if trimmed.is_empty() {
        return "00".into();
    }
    hex::encode_upper(trimmed)
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().take_while(|&&b| b == 0).count();
    &bytes[start..]
}

fn time_to_datetime(time: &Time) -> DateTime {
    match time {
        Time::UtcTime(t) => t.to_date_time(),
        Time::GeneralTime(t) => t.to_date_time(),
    }
}

fn time_to_system(time: &Time) -> SystemTime {
    SystemTime::UNIX_EPOCH + time_to_datetime(time).unix_duration()
}

/// ISO-8601 / RFC 3339 form, `YYYY-MM-DDTHH:MM:SSZ`.
fn time_to_iso8601(time: &Time) -> String {
    time_to_datetime(time).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_hex_strips_sign_padding() {
        assert_eq!(serial_to_hex(&[0x00, 0xA3, 0x01]), "A301");
        assert_eq!(serial_to_hex(&[0x00]), "00");
        assert_eq!(serial_to_hex(&[0x7F]), "7F");
    }

    #[test]
    fn enumerated_decodes_reason_codes() {
        assert_eq!(decode_enumerated(&[0x0A, 0x01, 0x01]), Some(1));
        assert_eq!(decode_enumerated(&[0x0A, 0x01, 0x0B]), Some(11));
        assert_eq!(decode_enumerated(&[0x04, 0x01, 0x01]), None);
        assert_eq!(decode_enumerated(&[0x0A, 0x02, 0x01]), None);
    }

    #[test]
    fn unknown_reason_codes_display_numerically() {
        assert_eq!(RevocationReason::from(1).to_string(), "keyCompromise");
        assert_eq!(RevocationReason::from(7).to_string(), "unknown(7)");
        assert_eq!(RevocationReason::from(10).to_string(), "aACompromise");
    }
}

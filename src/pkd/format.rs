//! Input format detection for uploaded PKD material.
//!
//! The directory accepts whatever a national authority exports: LDIF
//! dumps, binary Master Lists, single certificates or CRLs, DER or
//! PEM-armored. Routing is structural; nothing is inferred from file
//! names.

use crate::{
    cert::{Certificate, CertificateRevocationList},
    codec,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    /// RFC 2849 text with `dn:` records.
    Ldif,
    /// CMS SignedData carrying a `CscaMasterList`.
    MasterList,
    /// A single X.509 certificate, DER or PEM.
    Certificate,
    /// A single X.509 CRL, DER or PEM.
    Crl,
    Unknown,
}

impl InputFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ldif => "LDIF",
            Self::MasterList => "MASTER_LIST",
            Self::Certificate => "CERTIFICATE",
            Self::Crl => "CRL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Classify an uploaded byte buffer.
///
/// Text with LDIF structure wins first; PEM armor is unwrapped and the
/// enclosed DER classified; remaining DER is tried as Master List, then
/// certificate, then CRL. The trial order matters: a Master List is
/// itself a SEQUENCE and would satisfy the weaker sniffs.
pub fn detect(bytes: &[u8]) -> InputFormat {
    if let Ok(text) = std::str::from_utf8(bytes) {
        if looks_like_ldif(text) {
            return InputFormat::Ldif;
        }
        if codec::is_pem(bytes) {
            return match codec::decode_pem(text) {
                Ok((_, der)) => detect_der(&der),
                Err(_) => InputFormat::Unknown,
            };
        }
    }
    detect_der(bytes)
}

fn detect_der(bytes: &[u8]) -> InputFormat {
    if !codec::is_der(bytes) {
        return InputFormat::Unknown;
    }
    if crate::pkd::master_list::parse(bytes).is_ok() {
        return InputFormat::MasterList;
    }
    if Certificate::from_der(bytes).is_ok() {
        return InputFormat::Certificate;
    }
    if CertificateRevocationList::from_der(bytes).is_ok() {
        return InputFormat::Crl;
    }
    InputFormat::Unknown
}

fn looks_like_ldif(text: &str) -> bool {
    text.lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(10)
        .any(|line| {
            let lower = line.to_ascii_lowercase();
            lower.starts_with("dn:") || lower.starts_with("version:")
        })
}

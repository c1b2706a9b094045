//! Pure certificate predicates.
//!
//! All functions are total over their inputs: verification failures and
//! malformed fields read as `false`, never as a panic or a propagated
//! error, so the chain builder can probe candidates freely.

use {
    super::{dn, Certificate},
    crate::crypto,
    cms::cert::x509::ext::pkix::KeyUsages,
    std::time::SystemTime,
};

/// Verify `child`'s signature with `parent`'s public key, using the
/// algorithm `child` declares.
pub fn verify_signature(child: &Certificate, parent: &Certificate) -> bool {
    let Ok(tbs) = child.tbs_der() else {
        return false;
    };
    let Some(signature) = child.signature_bytes() else {
        return false;
    };
    match crypto::verify_with_spki(
        parent.public_key_info(),
        child.signature_algorithm(),
        &tbs,
        signature,
    ) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(%err, subject = %child.subject_dn(), "signature verification failed");
            false
        }
    }
}

pub fn is_expired(cert: &Certificate, now: SystemTime) -> bool {
    cert.not_after() < now
}

pub fn is_not_yet_valid(cert: &Certificate, now: SystemTime) -> bool {
    cert.not_before() > now
}

/// Subject equals issuer, case-insensitively (RFC 4517 4.2.15).
pub fn is_self_signed(cert: &Certificate) -> bool {
    dn::dn_eq(&cert.subject_dn(), &cert.issuer_dn())
}

/// Link certificates bridge two generations of a country's CSCA keys
/// during rollover: not self-signed, CA per BasicConstraints, and
/// authorized to sign certificates.
pub fn is_link_certificate(cert: &Certificate) -> bool {
    if is_self_signed(cert) {
        return false;
    }
    let Some(bc) = cert.basic_constraints() else {
        return false;
    };
    if !bc.ca {
        return false;
    }
    cert.key_usage()
        .is_some_and(|ku| ku.0.contains(KeyUsages::KeyCertSign))
}

/// Role of a certificate in the ICAO hierarchy. Derived from structure,
/// never stored: CSCA ⇔ self-signed or Link; everything else is a leaf
/// Document Signer. Master List Signers are assigned [`Mlsc`] by the
/// Master List parser, where the context is known.
///
/// [`Mlsc`]: CertificateRole::Mlsc
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CertificateRole {
    Csca,
    Dsc,
    Mlsc,
}

impl CertificateRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csca => "CSCA",
            Self::Dsc => "DSC",
            Self::Mlsc => "MLSC",
        }
    }
}

pub fn role(cert: &Certificate) -> CertificateRole {
    if is_self_signed(cert) || is_link_certificate(cert) {
        CertificateRole::Csca
    } else {
        CertificateRole::Dsc
    }
}

//! X.509 extension validation, RFC 5280 4.2 and ICAO Doc 9303 Part 12 4.6.
//!
//! Two rule sets: unrecognized *critical* extensions are flagged (RFC 5280
//! obliges a relying party to reject what it cannot process; this engine
//! surfaces them as warnings and leaves the decision to policy), and the
//! role-specific Key Usage requirements of Part 12.

use {
    crate::cert::{Certificate, CertificateRole},
    cms::cert::x509::ext::pkix::KeyUsages,
    const_oid::db::rfc5280,
    der::asn1::ObjectIdentifier as Oid,
};

/// Critical extensions this engine knows how to process, per RFC 5280 4.2
/// and the Doc 9303 certificate profiles.
const KNOWN_CRITICAL: &[Oid] = &[
    rfc5280::ID_CE_BASIC_CONSTRAINTS,
    rfc5280::ID_CE_KEY_USAGE,
    rfc5280::ID_CE_CERTIFICATE_POLICIES,
    rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER,
    rfc5280::ID_CE_AUTHORITY_KEY_IDENTIFIER,
    rfc5280::ID_CE_NAME_CONSTRAINTS,
    rfc5280::ID_CE_POLICY_CONSTRAINTS,
    rfc5280::ID_CE_INHIBIT_ANY_POLICY,
    rfc5280::ID_CE_SUBJECT_ALT_NAME,
    rfc5280::ID_CE_ISSUER_ALT_NAME,
    rfc5280::ID_CE_CRL_DISTRIBUTION_POINTS,
    rfc5280::ID_CE_EXT_KEY_USAGE,
];

#[derive(Clone, Debug, Default)]
pub struct ExtensionValidation {
    pub valid:    bool,
    pub warnings: Vec<String>,
}

impl ExtensionValidation {
    pub fn warnings_joined(&self) -> String {
        self.warnings.join("; ")
    }
}

/// Validate a certificate's extensions for its role in the hierarchy.
pub fn validate(cert: &Certificate, role: CertificateRole) -> ExtensionValidation {
    let mut warnings = Vec::new();

    for ext in cert.extensions() {
        if ext.critical && !KNOWN_CRITICAL.contains(&ext.extn_id) {
            warnings.push(format!("unknown critical extension: {}", ext.extn_id));
        }
    }

    // Doc 9303 Part 12 4.6: DSCs sign with digitalSignature, CSCAs
    // certify with keyCertSign (cRLSign is recommended, not required).
    match (role, cert.key_usage()) {
        (CertificateRole::Dsc, Some(ku)) => {
            if !ku.0.contains(KeyUsages::DigitalSignature) {
                warnings.push("DSC missing required digitalSignature key usage".into());
            }
        }
        (CertificateRole::Csca, Some(ku)) => {
            if !ku.0.contains(KeyUsages::KeyCertSign) {
                warnings.push("CSCA missing required keyCertSign key usage".into());
            }
        }
        // A DSC without a Key Usage extension is unusual but not
        // prohibited.
        (_, None) => {}
        (CertificateRole::Mlsc, Some(_)) => {}
    }

    ExtensionValidation {
        valid: warnings.is_empty(),
        warnings,
    }
}

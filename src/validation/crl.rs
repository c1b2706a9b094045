//! CRL revocation checking, RFC 5280 5.3.
//!
//! The checker states revocation facts: freshness, serial membership,
//! reason codes. Trust in the CRL itself (its signature against the
//! issuing CSCA) is layered above, where the CSCA is known — see
//! [`crate::validation::certificate`].

use {
    super::CrlProvider,
    crate::cert::{Certificate, CertificateRevocationList, RevocationReason},
    std::{fmt, time::SystemTime},
    tracing::{debug, warn},
};

/// RFC 5280 5.3.1 check outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CrlCheckStatus {
    /// Certificate not revoked, CRL present and fresh.
    Valid,
    Revoked,
    /// No CRL available for the country.
    CrlUnavailable,
    /// `nextUpdate` is in the past.
    CrlExpired,
    /// The CRL's own signature failed verification (set by the
    /// orchestration layer, which holds the issuing CSCA).
    CrlInvalid,
    #[default]
    NotChecked,
}

impl fmt::Display for CrlCheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "VALID",
            Self::Revoked => "REVOKED",
            Self::CrlUnavailable => "CRL_UNAVAILABLE",
            Self::CrlExpired => "CRL_EXPIRED",
            Self::CrlInvalid => "CRL_INVALID",
            Self::NotChecked => "NOT_CHECKED",
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct CrlCheckResult {
    pub status:            CrlCheckStatus,
    /// CRL issued date, ISO 8601.
    pub this_update:       Option<String>,
    /// CRL next update date, ISO 8601.
    pub next_update:       Option<String>,
    pub revocation_reason: Option<RevocationReason>,
    pub message:           String,
}

impl CrlCheckResult {
    fn with(status: CrlCheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            ..Self::default()
        }
    }

    pub const fn is_revoked(&self) -> bool {
        matches!(self.status, CrlCheckStatus::Revoked)
    }

    /// True when no usable CRL backed the check.
    pub const fn is_unverified(&self) -> bool {
        matches!(
            self.status,
            CrlCheckStatus::CrlUnavailable
                | CrlCheckStatus::CrlExpired
                | CrlCheckStatus::CrlInvalid
                | CrlCheckStatus::NotChecked
        )
    }

    pub fn reason_text(&self) -> String {
        self.revocation_reason
            .map_or_else(|| "unspecified".to_string(), |reason| reason.to_string())
    }
}

/// Fetches the country's CRL through a [`CrlProvider`] and answers
/// revocation queries against it.
pub struct CrlChecker<'a> {
    provider: &'a dyn CrlProvider,
}

impl<'a> CrlChecker<'a> {
    pub fn new(provider: &'a dyn CrlProvider) -> Self {
        Self { provider }
    }

    /// Check `cert` against the CRL for `country_code` at `now`.
    pub fn check(&self, cert: &Certificate, country_code: &str, now: SystemTime) -> CrlCheckResult {
        if country_code.is_empty() {
            return CrlCheckResult::with(CrlCheckStatus::NotChecked, "country code is empty");
        }

        let country = country_code.to_ascii_uppercase();
        let Some(crl) = self.provider.find_crl_by_country(&country) else {
            debug!(%country, "no CRL available");
            return CrlCheckResult::with(
                CrlCheckStatus::CrlUnavailable,
                format!("no CRL found for country {country}"),
            );
        };

        check_against(&crl, cert, &country, now)
    }
}

/// Verify a CRL's signature against the certificate of its issuing CSCA.
/// Used by the orchestration layers once the chain has resolved the CSCA;
/// the checker itself never trusts or distrusts a CRL.
pub fn verify_crl_signature(crl: &CertificateRevocationList, issuer: &Certificate) -> bool {
    let Ok(tbs) = crl.tbs_der() else {
        return false;
    };
    let Some(signature) = crl.signature_bytes() else {
        return false;
    };
    crate::crypto::verify_with_spki(
        issuer.public_key_info(),
        crl.signature_algorithm(),
        &tbs,
        signature,
    )
    .is_ok()
}

/// Check `cert` against an already-fetched CRL. Pure function of its
/// inputs; [`CrlChecker::check`] and the orchestration layer both route
/// through here.
pub fn check_against(
    crl: &CertificateRevocationList,
    cert: &Certificate,
    country_code: &str,
    now: SystemTime,
) -> CrlCheckResult {
    let mut result = CrlCheckResult {
        this_update: Some(crl.this_update_iso8601()),
        next_update: crl.next_update_iso8601(),
        ..CrlCheckResult::default()
    };

    if let Some(next_update) = crl.next_update() {
        if next_update < now {
            result.status = CrlCheckStatus::CrlExpired;
            result.message = format!("CRL expired for country {country_code}");
            return result;
        }
    }

    match crl.find_revoked(cert.serial_bytes()) {
        Some(entry) => {
            warn!(
                serial = %entry.serial_hex,
                reason = %entry.reason,
                "certificate is revoked"
            );
            result.status = CrlCheckStatus::Revoked;
            result.revocation_reason = Some(entry.reason);
            result.message = format!("certificate is revoked (country: {country_code})");
        }
        None => {
            result.status = CrlCheckStatus::Valid;
            result.message = format!("certificate not revoked (country: {country_code})");
        }
    }
    result
}

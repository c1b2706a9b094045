//! Full-certificate validation: trust chain, revocation, algorithm policy
//! and extension rules composed into one report.
//!
//! This is the directory-side workflow (validate a stored DSC or CSCA);
//! Passive Authentication reuses the same pieces around a SOD in
//! [`crate::pa`].

use {
    super::{
        chain::{ChainConfig, ChainFailure, TrustChainBuilder, TrustChainResult},
        compliance::{self, AlgorithmCompliance},
        crl::{self, CrlCheckResult, CrlCheckStatus},
        extensions::{self, ExtensionValidation},
        CrlProvider, CscaProvider,
    },
    crate::{
        cert::{ops, Certificate},
        error::{ErrorCode, ValidationError},
    },
    std::{
        fmt,
        time::{Instant, SystemTime},
    },
    tracing::{debug, info},
};

/// Overall certificate status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CertificateStatus {
    /// Trust chain valid, not expired.
    Valid,
    /// Trust chain valid but the certificate is expired — still usable
    /// for verifying historical signatures under the ICAO hybrid model.
    ExpiredValid,
    /// Chain or signature verification failed, or the certificate is
    /// revoked.
    Invalid,
    /// Validation could not complete: the issuing CSCA is not in the
    /// directory yet.
    Pending,
    /// Internal failure during validation.
    Error,
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "VALID",
            Self::ExpiredValid => "EXPIRED_VALID",
            Self::Invalid => "INVALID",
            Self::Pending => "PENDING",
            Self::Error => "ERROR",
        })
    }
}

#[derive(Clone, Debug)]
pub struct CertificateValidation {
    pub status:      CertificateStatus,
    pub chain:       TrustChainResult,
    pub crl:         CrlCheckResult,
    pub compliance:  AlgorithmCompliance,
    pub extensions:  ExtensionValidation,
    pub errors:      Vec<ValidationError>,
    pub duration_ms: u64,
}

/// Composes [`TrustChainBuilder`], [`crate::validation::CrlChecker`],
/// algorithm compliance and extension validation.
pub struct CertificateValidator<'a> {
    cscas:  &'a dyn CscaProvider,
    crls:   &'a dyn CrlProvider,
    config: ChainConfig,
}

impl<'a> CertificateValidator<'a> {
    pub fn new(cscas: &'a dyn CscaProvider, crls: &'a dyn CrlProvider) -> Self {
        Self {
            cscas,
            crls,
            config: ChainConfig::default(),
        }
    }

    pub fn with_chain_config(
        cscas: &'a dyn CscaProvider,
        crls: &'a dyn CrlProvider,
        config: ChainConfig,
    ) -> Self {
        Self {
            cscas,
            crls,
            config,
        }
    }

    pub fn validate(&self, cert: &Certificate) -> CertificateValidation {
        self.validate_at(cert, SystemTime::now())
    }

    /// Validate with a pinned clock; `validate` delegates here with the
    /// current time.
    pub fn validate_at(&self, cert: &Certificate, now: SystemTime) -> CertificateValidation {
        let started = Instant::now();
        let mut errors = Vec::new();

        info!(subject = %cert.subject_dn(), "validating certificate");

        let chain = TrustChainBuilder::with_config(self.cscas, self.config).build(cert, now);
        if let Some(failure) = chain.failure.as_ref() {
            errors.push(ValidationError::critical(
                chain_error_code(failure),
                chain.message.clone(),
            ));
        }

        let crl = self.check_revocation(cert, &chain, now, &mut errors);

        let compliance = compliance::check(cert);
        if let Some(warning) = compliance.warning.as_ref() {
            errors.push(ValidationError::warning(
                ErrorCode::AlgorithmDeprecated,
                warning.clone(),
            ));
        }

        let extensions = extensions::validate(cert, ops::role(cert));
        for warning in &extensions.warnings {
            errors.push(ValidationError::warning(
                ErrorCode::UnknownCriticalExtension,
                warning.clone(),
            ));
        }

        let status = overall_status(cert, &chain, &crl, now);
        let duration_ms = started.elapsed().as_millis() as u64;
        debug!(%status, duration_ms, "certificate validation finished");

        CertificateValidation {
            status,
            chain,
            crl,
            compliance,
            extensions,
            errors,
            duration_ms,
        }
    }

    fn check_revocation(
        &self,
        cert: &Certificate,
        chain: &TrustChainResult,
        now: SystemTime,
        errors: &mut Vec<ValidationError>,
    ) -> CrlCheckResult {
        let country = chain
            .root()
            .and_then(Certificate::country_code)
            .or_else(|| cert.country_code());
        let Some(country) = country else {
            return CrlCheckResult {
                status: CrlCheckStatus::NotChecked,
                message: "no country code available for CRL lookup".into(),
                ..CrlCheckResult::default()
            };
        };

        let Some(crl) = self.crls.find_crl_by_country(&country) else {
            errors.push(ValidationError::warning(
                ErrorCode::CrlUnavailable,
                format!("no CRL found for country {country}"),
            ));
            return CrlCheckResult {
                status: CrlCheckStatus::CrlUnavailable,
                message: format!("no CRL found for country {country}"),
                ..CrlCheckResult::default()
            };
        };

        // The checker states facts about the CRL contents; trusting the
        // CRL is this layer's job, possible only once the chain resolved
        // the issuing CSCA.
        if let Some(root) = chain.root() {
            if !crl::verify_crl_signature(&crl, root) {
                errors.push(ValidationError::warning(
                    ErrorCode::CrlUnavailable,
                    format!("CRL signature verification failed for country {country}"),
                ));
                return CrlCheckResult {
                    status: CrlCheckStatus::CrlInvalid,
                    this_update: Some(crl.this_update_iso8601()),
                    next_update: crl.next_update_iso8601(),
                    message: format!("CRL signature invalid for country {country}"),
                    ..CrlCheckResult::default()
                };
            }
        }

        let result = crl::check_against(&crl, cert, &country, now);
        match result.status {
            CrlCheckStatus::Revoked => errors.push(ValidationError::critical(
                ErrorCode::CertificateRevoked,
                format!("certificate is revoked: {}", result.reason_text()),
            )),
            CrlCheckStatus::CrlExpired => errors.push(ValidationError::warning(
                ErrorCode::CrlExpired,
                result.message.clone(),
            )),
            _ => {}
        }
        result
    }
}

pub(crate) fn chain_error_code(failure: &ChainFailure) -> ErrorCode {
    match failure {
        ChainFailure::CycleDetected { .. } => ErrorCode::ChainCycleDetected,
        ChainFailure::MaxDepthExceeded { .. } => ErrorCode::ChainMaxDepthExceeded,
        _ => ErrorCode::ChainValidationFailed,
    }
}

fn overall_status(
    cert: &Certificate,
    chain: &TrustChainResult,
    crl: &CrlCheckResult,
    now: SystemTime,
) -> CertificateStatus {
    if crl.is_revoked() {
        return CertificateStatus::Invalid;
    }
    if !chain.valid {
        // A missing issuer is transient state in a growing directory.
        return match chain.failure {
            Some(ChainFailure::IssuerNotFound { .. }) => CertificateStatus::Pending,
            _ => CertificateStatus::Invalid,
        };
    }
    if ops::is_expired(cert, now) {
        return CertificateStatus::ExpiredValid;
    }
    CertificateStatus::Valid
}

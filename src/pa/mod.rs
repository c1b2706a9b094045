//! Passive Authentication, ICAO Doc 9303 Part 11.
//!
//! Proves that chip contents were signed by an authentic DSC chained to a
//! trusted CSCA: extract the DSC from the SOD, resolve and validate the
//! trust chain, check revocation, verify the SOD signature, and recompute
//! every supplied Data Group hash against the `LDSSecurityObject`.
//!
//! The overall status is `Valid` only when every mandatory step passed
//! and no error of critical severity was recorded; no partial success is
//! ever reported as `Valid`.

use {
    crate::{
        cert::{ops, Certificate},
        codec,
        error::{ErrorCode, ValidationError},
        sod::Sod,
        validation::{
            certificate::chain_error_code,
            chain::{ChainConfig, TrustChainBuilder},
            compliance, crl,
            crl::{CrlChecker, CrlCheckResult, CrlCheckStatus},
            extensions, CrlProvider, CscaProvider,
        },
    },
    std::{
        collections::BTreeMap,
        fmt,
        time::{Instant, SystemTime},
    },
    tracing::{debug, info, warn},
};

/// Input to one Passive Authentication run.
#[derive(Clone, Debug)]
pub struct PaRequest {
    /// EF.SOD bytes, raw CMS or ICAO-wrapped.
    pub sod:             Vec<u8>,
    /// Data Group contents by DG number (1..=16).
    pub data_groups:     BTreeMap<u8, Vec<u8>>,
    /// ISO 3166-1 alpha-2 issuing country, CRL fallback when the chain
    /// does not resolve.
    pub issuing_country: String,
    /// Informational, echoed in logs only.
    pub document_number: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaStatus {
    Valid,
    Invalid,
    Error,
}

impl fmt::Display for PaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Error => "ERROR",
        })
    }
}

/// Chain sub-result with the identities a relying party records.
#[derive(Clone, Debug, Default)]
pub struct ChainSummary {
    pub valid:            bool,
    pub path:             String,
    pub depth:            usize,
    pub dsc_subject_dn:   String,
    pub dsc_serial:       String,
    pub dsc_expired:      bool,
    pub csca_expired:     bool,
    pub root_subject_dn:  Option<String>,
    pub root_fingerprint: Option<String>,
}

/// SOD signature sub-result.
#[derive(Clone, Debug, Default)]
pub struct SodSummary {
    pub valid:               bool,
    pub signature_algorithm: Option<String>,
    pub hash_algorithm:      Option<String>,
}

/// Per-DG hash comparison.
#[derive(Clone, Debug)]
pub struct DataGroupDetail {
    pub valid:    bool,
    /// Hash stored in the SOD, lowercase hex. Empty when absent.
    pub expected: String,
    /// Recomputed hash, lowercase hex.
    pub actual:   String,
}

#[derive(Clone, Debug, Default)]
pub struct DataGroupSummary {
    pub total:   usize,
    pub valid:   usize,
    pub invalid: usize,
    pub details: BTreeMap<u8, DataGroupDetail>,
}

#[derive(Clone, Debug)]
pub struct PaResult {
    pub status:      PaStatus,
    pub chain:       ChainSummary,
    pub sod:         SodSummary,
    pub crl:         CrlCheckResult,
    pub data_groups: DataGroupSummary,
    pub errors:      Vec<ValidationError>,
    pub duration_ms: u64,
}

impl PaResult {
    fn error(errors: Vec<ValidationError>, started: Instant) -> Self {
        Self {
            status: PaStatus::Error,
            chain: ChainSummary::default(),
            sod: SodSummary::default(),
            crl: CrlCheckResult::default(),
            data_groups: DataGroupSummary::default(),
            errors,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Orchestrates one Passive Authentication run over the supplied
/// providers. Holds no state between runs; concurrent authentications
/// share nothing but the providers.
pub struct PassiveAuthenticator<'a> {
    cscas:        &'a dyn CscaProvider,
    crls:         &'a dyn CrlProvider,
    chain_config: ChainConfig,
}

impl<'a> PassiveAuthenticator<'a> {
    pub fn new(cscas: &'a dyn CscaProvider, crls: &'a dyn CrlProvider) -> Self {
        Self {
            cscas,
            crls,
            chain_config: ChainConfig::default(),
        }
    }

    pub fn with_chain_config(
        cscas: &'a dyn CscaProvider,
        crls: &'a dyn CrlProvider,
        chain_config: ChainConfig,
    ) -> Self {
        Self {
            cscas,
            crls,
            chain_config,
        }
    }

    pub fn verify(&self, request: &PaRequest) -> PaResult {
        self.verify_at(request, SystemTime::now())
    }

    /// Run the authentication with a pinned validation clock. Pure
    /// function of `(request, now, provider state)` apart from the
    /// duration field.
    pub fn verify_at(&self, request: &PaRequest, now: SystemTime) -> PaResult {
        let started = Instant::now();
        let mut errors: Vec<ValidationError> = Vec::new();

        info!(
            country = %request.issuing_country,
            document = %request.document_number,
            data_groups = request.data_groups.len(),
            "starting Passive Authentication"
        );

        // Step 1: parse the SOD and extract the embedded DSC.
        let sod = match Sod::from_bytes(&request.sod) {
            Ok(sod) => sod,
            Err(err) => {
                warn!(%err, "SOD parse failed");
                errors.push(ValidationError::critical(
                    ErrorCode::SodParseError,
                    format!("failed to parse SOD: {err}"),
                ));
                return PaResult::error(errors, started);
            }
        };
        let dsc = match sod.embedded_dsc() {
            Ok(dsc) => dsc,
            Err(err) => {
                warn!(%err, "DSC extraction failed");
                errors.push(ValidationError::critical(
                    ErrorCode::DscExtractionFailed,
                    format!("failed to extract DSC certificate from SOD: {err}"),
                ));
                return PaResult::error(errors, started);
            }
        };
        debug!(dsc = %dsc, "extracted DSC from SOD");

        // Step 2: the issuing CSCA must exist in the directory before
        // anything else is worth checking.
        let issuer_dn = dsc.issuer_dn();
        if self.cscas.find_all_cscas_by_issuer_dn(&issuer_dn).is_empty() {
            errors.push(ValidationError::critical(
                ErrorCode::CscaNotFound,
                format!("CSCA not found for issuer DN: {issuer_dn}"),
            ));
            return PaResult::error(errors, started);
        }

        // Step 3: trust chain DSC -> (Link) -> Root CSCA.
        let chain_result =
            TrustChainBuilder::with_config(self.cscas, self.chain_config).build(&dsc, now);
        if let Some(failure) = chain_result.failure.as_ref() {
            errors.push(ValidationError::critical(
                chain_error_code(failure),
                chain_result.message.clone(),
            ));
        }
        let chain = ChainSummary {
            valid:            chain_result.valid,
            path:             chain_result.path.clone(),
            depth:            chain_result.depth,
            dsc_subject_dn:   dsc.subject_dn(),
            dsc_serial:       dsc.serial_hex(),
            dsc_expired:      chain_result.dsc_expired,
            csca_expired:     chain_result.csca_expired,
            root_subject_dn:  chain_result.root_subject_dn.clone(),
            root_fingerprint: chain_result.root_fingerprint.clone(),
        };

        // Step 4: revocation, against the resolved CSCA's country with
        // the request country as fallback. Unavailable or stale CRLs
        // degrade to warnings under the hybrid policy; the chain is
        // validated above either way.
        let country = chain_result
            .root()
            .and_then(Certificate::country_code)
            .unwrap_or_else(|| request.issuing_country.to_ascii_uppercase());
        let crl_result = self.check_revocation(&dsc, &chain_result, &country, now, &mut errors);

        // Advisory checks on the DSC: algorithm policy and extensions.
        let compliance = compliance::check(&dsc);
        if let Some(warning) = compliance.warning {
            errors.push(ValidationError::warning(
                ErrorCode::AlgorithmDeprecated,
                warning,
            ));
        }
        for warning in extensions::validate(&dsc, ops::role(&dsc)).warnings {
            errors.push(ValidationError::warning(
                ErrorCode::UnknownCriticalExtension,
                warning,
            ));
        }

        // Step 5: SOD signature against the extracted DSC.
        let mut sod_summary = SodSummary {
            signature_algorithm: sod.signature_algorithm_name().ok(),
            hash_algorithm:      sod.digest_algorithm_name().ok(),
            ..SodSummary::default()
        };
        match sod.verify_signature(&dsc) {
            Ok(()) => {
                debug!("SOD signature verified");
                sod_summary.valid = true;
            }
            Err(err) => {
                warn!(%err, "SOD signature invalid");
                errors.push(ValidationError::critical(
                    ErrorCode::SodSignatureInvalid,
                    format!("SOD signature verification failed: {err}"),
                ));
            }
        }

        // Step 6: Data Group hashes.
        let data_groups = self.check_data_groups(&sod, &request.data_groups, &mut errors);

        let status = if errors.iter().any(ValidationError::is_critical) {
            PaStatus::Invalid
        } else {
            PaStatus::Valid
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(%status, duration_ms, "Passive Authentication finished");

        PaResult {
            status,
            chain,
            sod: sod_summary,
            crl: crl_result,
            data_groups,
            errors,
            duration_ms,
        }
    }

    fn check_revocation(
        &self,
        dsc: &Certificate,
        chain: &crate::validation::chain::TrustChainResult,
        country: &str,
        now: SystemTime,
        errors: &mut Vec<ValidationError>,
    ) -> CrlCheckResult {
        let result = match (self.crls.find_crl_by_country(country), chain.root()) {
            (Some(crl), root) => {
                // Trust the CRL only if its signature checks out against
                // the resolved root; without a root the facts are still
                // reported but flagged below.
                if let Some(root) = root {
                    if !crl::verify_crl_signature(&crl, root) {
                        errors.push(ValidationError::warning(
                            ErrorCode::CrlUnavailable,
                            format!("CRL signature verification failed for country {country}"),
                        ));
                        return CrlCheckResult {
                            status: CrlCheckStatus::CrlInvalid,
                            message: format!("CRL signature invalid for country {country}"),
                            ..CrlCheckResult::default()
                        };
                    }
                }
                crl::check_against(&crl, dsc, country, now)
            }
            (None, _) => CrlChecker::new(self.crls).check(dsc, country, now),
        };

        match result.status {
            CrlCheckStatus::Revoked => {
                errors.push(ValidationError::critical(
                    ErrorCode::CertificateRevoked,
                    format!("DSC certificate is revoked: {}", result.reason_text()),
                ));
            }
            CrlCheckStatus::CrlUnavailable => {
                errors.push(ValidationError::warning(
                    ErrorCode::CrlUnavailable,
                    result.message.clone(),
                ));
            }
            CrlCheckStatus::CrlExpired => {
                errors.push(ValidationError::warning(
                    ErrorCode::CrlExpired,
                    result.message.clone(),
                ));
            }
            _ => {}
        }
        result
    }

    fn check_data_groups(
        &self,
        sod: &Sod,
        supplied: &BTreeMap<u8, Vec<u8>>,
        errors: &mut Vec<ValidationError>,
    ) -> DataGroupSummary {
        let mut summary = DataGroupSummary {
            total: supplied.len(),
            ..DataGroupSummary::default()
        };

        let lds = match sod.lds_security_object() {
            Ok(lds) => lds,
            Err(err) => {
                errors.push(ValidationError::critical(
                    ErrorCode::SodParseError,
                    format!("failed to parse data group hashes from SOD: {err}"),
                ));
                return summary;
            }
        };
        let expected = lds.expected_hashes();

        for (&dg_number, content) in supplied {
            let Some(expected_hash) = expected.get(&dg_number) else {
                warn!(dg_number, "no expected hash in SOD");
                errors.push(ValidationError::warning(
                    ErrorCode::DgHashMissing,
                    format!("no expected hash in SOD for DG{dg_number}"),
                ));
                continue;
            };

            let Some(actual_hash) = lds.hash_algorithm.hash_bytes(content) else {
                errors.push(ValidationError::critical(
                    ErrorCode::SodParseError,
                    format!(
                        "unsupported hash algorithm {} in SOD",
                        lds.hash_algorithm.name()
                    ),
                ));
                return summary;
            };

            let valid = actual_hash == *expected_hash;
            if valid {
                summary.valid += 1;
                debug!(dg_number, "data group hash verified");
            } else {
                summary.invalid += 1;
                warn!(dg_number, "data group hash mismatch");
                errors.push(ValidationError::critical(
                    ErrorCode::DgHashMismatch,
                    format!("DG{dg_number} hash mismatch"),
                ));
            }
            summary.details.insert(
                dg_number,
                DataGroupDetail {
                    valid,
                    expected: codec::to_hex(expected_hash),
                    actual: codec::to_hex(&actual_hash),
                },
            );
        }

        summary
    }
}

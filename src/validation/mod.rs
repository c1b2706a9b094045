//! Trust-chain construction, revocation checking and Doc 9303 policy
//! validation.
//!
//! The providers declared here are the engine's only window onto stored
//! PKI material. Hosts bind them to a database, an LDAP directory or an
//! in-memory set; the engine never performs I/O itself, so provider
//! implementations own their timeouts and report absence as `None` /
//! empty rather than panicking.

pub mod certificate;
pub mod chain;
pub mod compliance;
pub mod crl;
pub mod extensions;

pub use self::{
    certificate::{CertificateStatus, CertificateValidation, CertificateValidator},
    chain::{ChainConfig, ChainFailure, RolloverFallback, TrustChainBuilder, TrustChainResult},
    compliance::AlgorithmCompliance,
    crl::{CrlChecker, CrlCheckResult, CrlCheckStatus},
    extensions::ExtensionValidation,
};
use crate::cert::{Certificate, CertificateRevocationList};

/// CSCA lookup, bound by the host to its directory.
///
/// ICAO Doc 9303 Part 12: countries reuse a subject DN across key
/// rollover, so `find_all_cscas_by_issuer_dn` must return every match;
/// the chain builder disambiguates by signature. DN matching is
/// case-insensitive (RFC 4517 4.2.15). Returned certificates are owned by
/// the caller.
pub trait CscaProvider {
    fn find_all_cscas_by_issuer_dn(&self, dn: &str) -> Vec<Certificate>;

    /// Single-best-match convenience, optionally filtered by country.
    fn find_csca_by_issuer_dn(&self, dn: &str, country_code: Option<&str>) -> Option<Certificate> {
        self.find_all_cscas_by_issuer_dn(dn)
            .into_iter()
            .find(|cert| match country_code {
                Some(cc) => cert
                    .country_code()
                    .is_some_and(|found| found.eq_ignore_ascii_case(cc)),
                None => true,
            })
    }
}

/// CRL lookup by ISO 3166-1 alpha-2 country code.
pub trait CrlProvider {
    fn find_crl_by_country(&self, country_code: &str) -> Option<CertificateRevocationList>;
}

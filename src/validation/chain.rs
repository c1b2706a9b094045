//! Trust chain construction under the ICAO Doc 9303 Part 12 hybrid model.
//!
//! Signature verification is a hard requirement; certificate expiry is
//! informational only and never fails a chain. Key rollover (several
//! CSCAs sharing one subject DN) is resolved by trying signatures, with a
//! configurable fallback when none verifies but a DN does match.

use {
    super::CscaProvider,
    crate::cert::{dn, ops, Certificate},
    std::{collections::HashSet, time::SystemTime},
    tracing::{debug, warn},
};

/// Default maximum number of issuer hops, matching the deepest Link-chain
/// rollover cascades seen in PKD data with room to spare.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Policy for the key-rollover edge case where no candidate CSCA passes
/// signature verification but at least one matches the issuer DN.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RolloverFallback {
    /// Adopt the DN-matched candidate silently.
    Accept,
    /// Adopt it and record a warning on the result.
    #[default]
    AcceptWithWarning,
    /// Treat the chain as broken.
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainConfig {
    pub max_depth:         usize,
    pub rollover_fallback: RolloverFallback,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_depth:         DEFAULT_MAX_DEPTH,
            rollover_fallback: RolloverFallback::default(),
        }
    }
}

/// Why a chain failed to validate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainFailure {
    RootSelfSignatureInvalid { depth: usize },
    MissingIssuerDn { depth: usize },
    CycleDetected { depth: usize },
    IssuerNotFound { issuer_dn: String, depth: usize },
    MaxDepthExceeded { max_depth: usize },
    SignatureInvalid { depth: usize },
}

impl ChainFailure {
    fn message(&self) -> String {
        match self {
            Self::RootSelfSignatureInvalid { depth } => {
                format!("root CSCA self-signature verification failed at depth {depth}")
            }
            Self::MissingIssuerDn { depth } => {
                format!("failed to extract issuer DN at depth {depth}")
            }
            Self::CycleDetected { depth } => {
                format!("circular reference detected at depth {depth}")
            }
            Self::IssuerNotFound { issuer_dn, depth } => {
                let truncated: String = issuer_dn.chars().take(80).collect();
                format!("chain broken: issuer not found at depth {depth} (issuer: {truncated})")
            }
            Self::MaxDepthExceeded { max_depth } => {
                format!("maximum chain depth exceeded ({max_depth})")
            }
            Self::SignatureInvalid { depth } => {
                format!("signature verification failed at depth {depth}")
            }
        }
    }
}

/// Trust chain build and validation result.
#[derive(Clone, Debug, Default)]
pub struct TrustChainResult {
    /// True when every signature in the chain verified, root included.
    pub valid:            bool,
    /// Human-readable path, e.g. `DSC -> Link -> Root`.
    pub path:             String,
    /// Number of certificates in the chain.
    pub depth:            usize,
    /// Any CSCA in the chain is expired (informational, hybrid model).
    pub csca_expired:     bool,
    /// The leaf is expired (informational).
    pub dsc_expired:      bool,
    pub message:          String,
    pub root_subject_dn:  Option<String>,
    pub root_fingerprint: Option<String>,
    pub failure:          Option<ChainFailure>,
    pub warnings:         Vec<String>,
    /// The chain itself, leaf first, root last. Empty on failure paths
    /// that never adopted a parent.
    pub chain:            Vec<Certificate>,
}

impl TrustChainResult {
    fn fail(mut self, failure: ChainFailure, chain: Vec<Certificate>) -> Self {
        self.message = failure.message();
        self.failure = Some(failure);
        self.depth = chain.len();
        self.path = annotate_path(&chain);
        self.chain = chain;
        self
    }

    /// The resolved root CSCA, when the chain reached one.
    pub fn root(&self) -> Option<&Certificate> {
        self.valid.then(|| self.chain.last()).flatten()
    }
}

/// Builds and validates a chain from a leaf certificate to a self-signed
/// root CSCA via a [`CscaProvider`].
pub struct TrustChainBuilder<'a> {
    provider: &'a dyn CscaProvider,
    config:   ChainConfig,
}

impl<'a> TrustChainBuilder<'a> {
    pub fn new(provider: &'a dyn CscaProvider) -> Self {
        Self {
            provider,
            config: ChainConfig::default(),
        }
    }

    pub fn with_config(provider: &'a dyn CscaProvider, config: ChainConfig) -> Self {
        Self { provider, config }
    }

    /// Build the chain for `leaf` and validate it at `now`.
    ///
    /// Terminates within `max_depth + 1` iterations regardless of
    /// provider behavior: every hop either reaches a self-signed root,
    /// fails, or consumes one unit of depth, and revisiting an issuer DN
    /// is a failure.
    pub fn build(&self, leaf: &Certificate, now: SystemTime) -> TrustChainResult {
        let mut result = TrustChainResult {
            dsc_expired: ops::is_expired(leaf, now),
            ..TrustChainResult::default()
        };

        let mut chain: Vec<Certificate> = vec![leaf.clone()];
        let mut visited: HashSet<String> = HashSet::new();
        let mut depth = 0usize;

        loop {
            let current = chain.last().expect("chain starts non-empty");

            if ops::is_self_signed(current) {
                if !ops::verify_signature(current, current) {
                    let failure = ChainFailure::RootSelfSignatureInvalid { depth };
                    return result.fail(failure, chain);
                }
                result.valid = true;
                result.root_subject_dn = Some(current.subject_dn());
                result.root_fingerprint = Some(current.fingerprint_sha256());
                break;
            }

            if depth >= self.config.max_depth {
                let failure = ChainFailure::MaxDepthExceeded {
                    max_depth: self.config.max_depth,
                };
                return result.fail(failure, chain);
            }

            let issuer_dn = current.issuer_dn();
            if issuer_dn.is_empty() {
                return result.fail(ChainFailure::MissingIssuerDn { depth }, chain);
            }
            if !visited.insert(issuer_dn.to_ascii_lowercase()) {
                return result.fail(ChainFailure::CycleDetected { depth: depth + 1 }, chain);
            }
            depth += 1;

            let candidates = self.provider.find_all_cscas_by_issuer_dn(&issuer_dn);
            if candidates.is_empty() {
                let failure = ChainFailure::IssuerNotFound { issuer_dn, depth };
                return result.fail(failure, chain);
            }
            debug!(
                issuer = %issuer_dn,
                candidates = candidates.len(),
                depth,
                "selecting issuer among CSCA candidates"
            );

            // Key rollover: the correct generation is whichever key
            // actually verifies the child.
            let verified = candidates
                .iter()
                .position(|c| ops::verify_signature(current, c));

            let chosen = match verified {
                Some(index) => index,
                None => {
                    let dn_match = candidates
                        .iter()
                        .position(|c| dn::dn_eq(&c.subject_dn(), &issuer_dn));
                    match (dn_match, self.config.rollover_fallback) {
                        (Some(index), RolloverFallback::Accept) => index,
                        (Some(index), RolloverFallback::AcceptWithWarning) => {
                            warn!(issuer = %issuer_dn, "issuer adopted by DN match only");
                            result.warnings.push(format!(
                                "issuer adopted by DN match only (no candidate key verified): {issuer_dn}"
                            ));
                            index
                        }
                        _ => {
                            let failure = ChainFailure::IssuerNotFound { issuer_dn, depth };
                            return result.fail(failure, chain);
                        }
                    }
                }
            };

            let mut candidates = candidates;
            chain.push(candidates.swap_remove(chosen));
        }

        // Re-validation pass: every adjacent pair must verify, whatever
        // path the selection above took.
        for index in 0..chain.len().saturating_sub(1) {
            if !ops::verify_signature(&chain[index], &chain[index + 1]) {
                result.valid = false;
                let failure = ChainFailure::SignatureInvalid { depth: index };
                return result.fail(failure, chain);
            }
        }

        // Expiry pass, informational per the hybrid model.
        result.csca_expired = chain
            .iter()
            .skip(1)
            .any(|cert| ops::is_expired(cert, now));

        result.depth = chain.len();
        result.path = annotate_path(&chain);
        result.chain = chain;
        result
    }
}

fn annotate_path(chain: &[Certificate]) -> String {
    let mut path = String::from("DSC");
    for cert in chain.iter().skip(1) {
        if ops::is_self_signed(cert) {
            path.push_str(" -> Root");
        } else if ops::is_link_certificate(cert) {
            path.push_str(" -> Link");
        } else {
            path.push_str(" -> CSCA");
        }
    }
    path
}


use {
    anyhow::Result,
    fixtures::{MemoryCscaProvider, CSCA_DN, CSCA_DN_GEN2, DSC_DN},
    icao_pkd::{
        cert::ops,
        validation::{ChainConfig, ChainFailure, RolloverFallback, TrustChainBuilder},
    },
};

#[test]
fn two_level_chain_validates() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let provider = MemoryCscaProvider::with([csca.cert.clone()]);

    let result = TrustChainBuilder::new(&provider).build(&dsc.cert, fixtures::test_now());

    assert!(result.valid);
    assert_eq!(result.depth, 2);
    assert_eq!(result.path, "DSC -> Root");
    assert!(!result.dsc_expired);
    assert!(!result.csca_expired);
    assert_eq!(result.root_subject_dn.as_deref(), Some(&*csca.cert.subject_dn()));
    assert_eq!(
        result.root_fingerprint.as_deref(),
        Some(&*csca.cert.fingerprint_sha256())
    );
    Ok(())
}

/// Chain soundness: every adjacent pair in a valid chain verifies, and
/// the last element is self-signed.
#[test]
fn valid_chain_is_sound() -> Result<()> {
    let old = fixtures::new_csca(CSCA_DN)?;
    let gen2 = fixtures::new_csca(CSCA_DN_GEN2)?;
    let link = fixtures::new_link(CSCA_DN_GEN2, &gen2.key, CSCA_DN, &old.key)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN_GEN2, &gen2)?;

    // DSC chains through the link certificate to the old root: the
    // provider has no self-signed gen2 root, only the bridge.
    let provider = MemoryCscaProvider::with([old.cert.clone(), link.clone()]);
    let result = TrustChainBuilder::new(&provider).build(&dsc.cert, fixtures::test_now());

    assert!(result.valid);
    assert_eq!(result.depth, 3);
    assert_eq!(result.path, "DSC -> Link -> Root");
    for pair in result.chain.windows(2) {
        assert!(ops::verify_signature(&pair[0], &pair[1]));
    }
    assert!(ops::is_self_signed(result.chain.last().unwrap()));
    Ok(())
}

#[test]
fn key_rollover_selects_by_signature() -> Result<()> {
    // Two CSCAs with the identical subject DN, different keys. The DSC
    // was signed by the newer one.
    let csca_old = fixtures::new_csca(CSCA_DN)?;
    let csca_new = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca_new)?;

    let provider = MemoryCscaProvider::with([csca_old.cert.clone(), csca_new.cert.clone()]);
    let result = TrustChainBuilder::new(&provider).build(&dsc.cert, fixtures::test_now());

    assert!(result.valid);
    assert_eq!(
        result.root_fingerprint.as_deref(),
        Some(&*csca_new.cert.fingerprint_sha256())
    );
    assert!(result.warnings.is_empty());
    Ok(())
}

#[test]
fn dn_fallback_is_policy_controlled() -> Result<()> {
    // The only candidate matches by DN but its key never signed the DSC.
    let csca_real = fixtures::new_csca(CSCA_DN)?;
    let csca_wrong_key = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca_real)?;
    let provider = MemoryCscaProvider::with([csca_wrong_key.cert.clone()]);

    // Default policy adopts the DN match, warns, and the re-validation
    // pass then fails the chain on the bad signature.
    let result = TrustChainBuilder::new(&provider).build(&dsc.cert, fixtures::test_now());
    assert!(!result.valid);
    assert!(!result.warnings.is_empty());
    assert!(matches!(
        result.failure,
        Some(ChainFailure::SignatureInvalid { depth: 0 })
    ));

    // Reject policy refuses the candidate outright.
    let config = ChainConfig {
        rollover_fallback: RolloverFallback::Reject,
        ..ChainConfig::default()
    };
    let result = TrustChainBuilder::with_config(&provider, config)
        .build(&dsc.cert, fixtures::test_now());
    assert!(!result.valid);
    assert!(matches!(
        result.failure,
        Some(ChainFailure::IssuerNotFound { .. })
    ));
    Ok(())
}

#[test]
fn missing_issuer_breaks_chain() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let provider = MemoryCscaProvider::default();

    let result = TrustChainBuilder::new(&provider).build(&dsc.cert, fixtures::test_now());

    assert!(!result.valid);
    assert!(matches!(
        result.failure,
        Some(ChainFailure::IssuerNotFound { .. })
    ));
    Ok(())
}

#[test]
fn cycle_is_detected() -> Result<()> {
    // Two CA certificates endorsing each other: A's issuer is B, B's
    // issuer is A, neither self-signed.
    let key_a = fixtures::generate_key();
    let key_b = fixtures::generate_key();
    let dn_a = "CN=CSCA Cycle A,O=Utopian Government,C=UT";
    let dn_b = "CN=CSCA Cycle B,O=Utopian Government,C=UT";
    let cert_a = fixtures::new_link(dn_a, &key_a, dn_b, &key_b)?;
    let cert_b = fixtures::new_link(dn_b, &key_b, dn_a, &key_a)?;

    let csca_holder = fixtures::Identity {
        key:  key_a.clone(),
        cert: cert_a.clone(),
    };
    let dsc = fixtures::new_dsc(DSC_DN, dn_a, &csca_holder)?;

    let provider = MemoryCscaProvider::with([cert_a, cert_b]);
    let result = TrustChainBuilder::new(&provider).build(&dsc.cert, fixtures::test_now());

    assert!(!result.valid);
    assert!(matches!(
        result.failure,
        Some(ChainFailure::CycleDetected { .. })
    ));
    Ok(())
}

/// Chain termination: the builder returns within `max_depth + 1` hops no
/// matter how deep the provider's supply of intermediates is.
#[test]
fn depth_limit_is_enforced() -> Result<()> {
    let root = fixtures::new_csca(CSCA_DN)?;

    // A ladder of link certificates five deep, each issued by the next.
    let mut links = Vec::new();
    let mut issuer_dn = CSCA_DN.to_string();
    let mut issuer_key = root.key.clone();
    for step in 0..5 {
        let subject_dn = format!("CN=CSCA Step {step},O=Utopian Government,C=UT");
        let key = fixtures::generate_key();
        links.push(fixtures::new_link(&subject_dn, &key, &issuer_dn, &issuer_key)?);
        issuer_dn = subject_dn;
        issuer_key = key;
    }

    let leaf_issuer = fixtures::Identity {
        key:  issuer_key,
        cert: links.last().unwrap().clone(),
    };
    let dsc = fixtures::new_dsc(DSC_DN, &issuer_dn, &leaf_issuer)?;

    let mut cscas = links.clone();
    cscas.push(root.cert.clone());
    let provider = MemoryCscaProvider::with(cscas);

    let config = ChainConfig {
        max_depth: 3,
        ..ChainConfig::default()
    };
    let result =
        TrustChainBuilder::with_config(&provider, config).build(&dsc.cert, fixtures::test_now());

    assert!(!result.valid);
    assert!(matches!(
        result.failure,
        Some(ChainFailure::MaxDepthExceeded { max_depth: 3 })
    ));
    // With enough depth the same ladder resolves to the root.
    let result = TrustChainBuilder::new(&provider).build(&dsc.cert, fixtures::test_now());
    assert!(result.valid);
    assert_eq!(result.depth, 7);
    Ok(())
}

#[test]
fn expiry_is_informational() -> Result<()> {
    let csca = fixtures::new_expired_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let provider = MemoryCscaProvider::with([csca.cert.clone()]);

    let result = TrustChainBuilder::new(&provider).build(&dsc.cert, fixtures::test_now());

    // ICAO hybrid model: the chain stays valid, expiry is reported.
    assert!(result.valid);
    assert!(result.csca_expired);
    assert!(!result.dsc_expired);
    Ok(())
}

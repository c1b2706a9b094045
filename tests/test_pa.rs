
use {
    anyhow::Result,
    fixtures::{MemoryCrlProvider, MemoryCscaProvider, CSCA_DN, DSC_DN},
    icao_pkd::{
        error::{ErrorCode, Severity},
        pa::{PaRequest, PaStatus, PassiveAuthenticator},
        validation::CrlCheckStatus,
    },
    sha2::{Digest, Sha256},
    std::collections::BTreeMap,
};

const DG1: &[u8] = b"P<UTODOE<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";
const DG2: &[u8] = b"\xFF\xD8\xFF\xE0 face image payload";

fn request(sod: Vec<u8>, dgs: &[(u8, &[u8])]) -> PaRequest {
    PaRequest {
        sod,
        data_groups: dgs
            .iter()
            .map(|(n, content)| (*n, content.to_vec()))
            .collect::<BTreeMap<_, _>>(),
        issuing_country: "UT".into(),
        document_number: "X1234567".into(),
    }
}

/// Scenario: valid chain, valid SOD, matching data groups.
#[test]
fn valid_passport_authenticates() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1), (2, DG2)])?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let result = pa.verify_at(&request(sod, &[(1, DG1), (2, DG2)]), fixtures::test_now());

    assert_eq!(result.status, PaStatus::Valid);
    assert!(result.chain.valid);
    assert_eq!(result.chain.depth, 2);
    assert_eq!(result.chain.path, "DSC -> Root");
    assert!(result.sod.valid);
    assert_eq!(result.sod.signature_algorithm.as_deref(), Some("SHA256withRSA"));
    assert_eq!(result.sod.hash_algorithm.as_deref(), Some("SHA-256"));
    assert_eq!(result.crl.status, CrlCheckStatus::Valid);
    assert_eq!(result.data_groups.total, 2);
    assert_eq!(result.data_groups.valid, 2);
    assert_eq!(result.data_groups.invalid, 0);
    assert!(result.errors.iter().all(|e| e.severity != Severity::Critical));
    Ok(())
}

/// Scenario: key rollover — two CSCAs share the DN, the DSC was signed by
/// the newer generation.
#[test]
fn key_rollover_resolves_to_signing_generation() -> Result<()> {
    let csca_old = fixtures::new_csca(CSCA_DN)?;
    let csca_new = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca_new)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1)])?;

    let cscas = MemoryCscaProvider::with([csca_old.cert.clone(), csca_new.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca_new)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let result = pa.verify_at(&request(sod, &[(1, DG1)]), fixtures::test_now());

    assert_eq!(result.status, PaStatus::Valid);
    assert_eq!(
        result.chain.root_fingerprint.as_deref(),
        Some(&*csca_new.cert.fingerprint_sha256())
    );
    Ok(())
}

/// Scenario: revoked DSC.
#[test]
fn revoked_dsc_invalidates_the_passport() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1)])?;
    let crl = fixtures::build_crl(
        &csca,
        &[(&dsc.cert, 1)], // keyCompromise
        fixtures::build_time(2025, 1, 1),
        Some(fixtures::build_time(2026, 1, 1)),
    )?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", crl);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let result = pa.verify_at(&request(sod, &[(1, DG1)]), fixtures::test_now());

    assert_eq!(result.status, PaStatus::Invalid);
    assert_eq!(result.crl.status, CrlCheckStatus::Revoked);
    let revoked_error = result
        .errors
        .iter()
        .find(|e| e.code == ErrorCode::CertificateRevoked)
        .expect("CERTIFICATE_REVOKED error");
    assert_eq!(revoked_error.severity, Severity::Critical);
    assert!(revoked_error.message.contains("keyCompromise"));
    Ok(())
}

/// Scenario: data group hash mismatch.
#[test]
fn tampered_data_group_invalidates_the_passport() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1), (2, DG2)])?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let tampered: &[u8] = b"\xFF\xD8\xFF\xE0 a different face";
    let result = pa.verify_at(
        &request(sod, &[(1, DG1), (2, tampered)]),
        fixtures::test_now(),
    );

    assert_eq!(result.status, PaStatus::Invalid);
    assert_eq!(result.data_groups.valid, 1);
    assert_eq!(result.data_groups.invalid, 1);
    let detail = &result.data_groups.details[&2];
    assert!(!detail.valid);
    assert_ne!(detail.expected, detail.actual);
    assert!(result
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::DgHashMismatch && e.is_critical()));
    Ok(())
}

/// Scenario: ICAO-wrapped SOD behaves exactly like the raw CMS form.
#[test]
fn icao_wrapped_sod_is_transparent() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let raw = fixtures::build_sod(&dsc, &[(1, DG1)])?;
    let wrapped = fixtures::wrap_icao(&raw)?;
    assert_eq!(wrapped[0], 0x77);

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let from_raw = pa.verify_at(&request(raw, &[(1, DG1)]), fixtures::test_now());
    let from_wrapped = pa.verify_at(&request(wrapped, &[(1, DG1)]), fixtures::test_now());

    assert_eq!(from_raw.status, PaStatus::Valid);
    assert_eq!(from_wrapped.status, from_raw.status);
    assert_eq!(from_wrapped.chain.depth, from_raw.chain.depth);
    assert_eq!(from_wrapped.data_groups.valid, from_raw.data_groups.valid);
    assert_eq!(
        from_wrapped.data_groups.details[&1].actual,
        from_raw.data_groups.details[&1].actual
    );
    Ok(())
}

/// Scenario: the issuing CSCA is not in the directory — nothing past the
/// lookup runs.
#[test]
fn missing_csca_aborts_early() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1)])?;

    let cscas = MemoryCscaProvider::default();
    let crls = MemoryCrlProvider::default();
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let result = pa.verify_at(&request(sod, &[(1, DG1)]), fixtures::test_now());

    assert_eq!(result.status, PaStatus::Error);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorCode::CscaNotFound);
    assert!(!result.chain.valid);
    assert!(!result.sod.valid);
    assert_eq!(result.data_groups.total, 0);
    Ok(())
}

#[test]
fn unavailable_crl_degrades_to_warning() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1)])?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::default();
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let result = pa.verify_at(&request(sod, &[(1, DG1)]), fixtures::test_now());

    // Hybrid policy: no CRL is a warning, the passport still validates.
    assert_eq!(result.status, PaStatus::Valid);
    assert_eq!(result.crl.status, CrlCheckStatus::CrlUnavailable);
    assert!(result
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::CrlUnavailable && e.severity == Severity::Warning));
    Ok(())
}

#[test]
fn data_group_without_sod_entry_is_a_warning() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1)])?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    // DG3 was never hashed into the SOD.
    let result = pa.verify_at(
        &request(sod, &[(1, DG1), (3, b"fingerprints")]),
        fixtures::test_now(),
    );

    assert_eq!(result.status, PaStatus::Valid);
    assert_eq!(result.data_groups.total, 2);
    assert_eq!(result.data_groups.valid, 1);
    assert_eq!(result.data_groups.invalid, 0);
    assert!(result
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::DgHashMissing && e.severity == Severity::Warning));
    Ok(())
}

#[test]
fn sod_signed_by_foreign_key_is_invalid() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    // The SOD is signed with a key that does not belong to the embedded
    // DSC certificate.
    let rogue = fixtures::Identity {
        key:  fixtures::generate_key(),
        cert: dsc.cert.clone(),
    };
    let sod = fixtures::build_sod(&rogue, &[(1, DG1)])?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let result = pa.verify_at(&request(sod, &[(1, DG1)]), fixtures::test_now());

    assert_eq!(result.status, PaStatus::Invalid);
    assert!(!result.sod.valid);
    assert!(result
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::SodSignatureInvalid));
    Ok(())
}

/// Hash correctness: the reported actual hash is the SOD-declared digest
/// of the supplied content.
#[test]
fn reported_hashes_match_recomputation() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1)])?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let result = pa.verify_at(&request(sod, &[(1, DG1)]), fixtures::test_now());

    let expected_hex = hex::encode(Sha256::digest(DG1));
    let detail = &result.data_groups.details[&1];
    assert_eq!(detail.actual, expected_hex);
    assert_eq!(detail.expected, expected_hex);
    Ok(())
}

/// Determinism: identical inputs produce identical result payloads apart
/// from the timing field.
#[test]
fn authentication_is_deterministic() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1), (2, DG2)])?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let req = request(sod, &[(1, DG1), (2, DG2)]);
    let first = pa.verify_at(&req, fixtures::test_now());
    let second = pa.verify_at(&req, fixtures::test_now());

    assert_eq!(first.status, second.status);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.chain.path, second.chain.path);
    assert_eq!(
        first.chain.root_fingerprint,
        second.chain.root_fingerprint
    );
    assert_eq!(first.data_groups.valid, second.data_groups.valid);
    for (dg, detail) in &first.data_groups.details {
        let other = &second.data_groups.details[dg];
        assert_eq!(detail.expected, other.expected);
        assert_eq!(detail.actual, other.actual);
    }
    Ok(())
}

#[test]
fn expired_csca_still_validates_with_flag() -> Result<()> {
    let csca = fixtures::new_expired_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let sod = fixtures::build_sod(&dsc, &[(1, DG1)])?;

    let cscas = MemoryCscaProvider::with([csca.cert.clone()]);
    let crls = MemoryCrlProvider::with("UT", fixtures::fresh_crl(&csca)?);
    let pa = PassiveAuthenticator::new(&cscas, &crls);

    let result = pa.verify_at(&request(sod, &[(1, DG1)]), fixtures::test_now());

    // Hybrid model: expiry of the CSCA is informational.
    assert_eq!(result.status, PaStatus::Valid);
    assert!(result.chain.csca_expired);
    Ok(())
}

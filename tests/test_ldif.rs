
use {
    anyhow::Result,
    base64::{engine::general_purpose::STANDARD as BASE64, Engine as _},
    fixtures::{CSCA_DN, DSC_DN},
    icao_pkd::pkd::{ldif, master_list},
};

/// Fold a base64 blob the way PKD exports do: first line after the
/// attribute marker, continuations indented by one space.
fn fold_base64(attr: &str, der: &[u8]) -> String {
    let encoded = BASE64.encode(der);
    let mut out = format!("{attr}:: ");
    for (i, chunk) in encoded.as_bytes().chunks(60).enumerate() {
        if i > 0 {
            out.push_str("\n ");
        }
        out.push_str(std::str::from_utf8(chunk).unwrap());
    }
    out.push('\n');
    out
}

#[test]
fn extracts_certificates_crls_and_master_lists() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let dsc = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let crl = fixtures::fresh_crl(&csca)?;
    let mlsc = fixtures::new_dsc(
        "CN=ML Signer Utopia,O=Utopian Government,C=UT",
        CSCA_DN,
        &csca,
    )?;
    let ml = fixtures::build_master_list(&[&csca.cert], &mlsc)?;

    let mut content = String::from("version: 1\n\n");
    content.push_str("dn: o=csca,c=UT,dc=data,dc=pkd\n");
    content.push_str(&fold_base64("cACertificate;binary", csca.cert.to_der()));
    content.push('\n');
    content.push_str("dn: o=dsc,c=UT,dc=data,dc=pkd\n");
    content.push_str(&fold_base64("userCertificate;binary", dsc.cert.to_der()));
    content.push('\n');
    content.push_str("dn: o=crl,c=UT,dc=data,dc=pkd\n");
    content.push_str(&fold_base64("certificateRevocationList;binary", crl.to_der()));
    content.push('\n');
    content.push_str("dn: o=ml,c=UT,dc=data,dc=pkd\n");
    content.push_str(&fold_base64("pkdMasterListContent", &ml));
    content.push('\n');

    let extract = ldif::extract_pkd(&content);

    assert_eq!(extract.total_entries, 4);
    assert!(extract.errors.is_empty());
    assert_eq!(extract.certificates.len(), 2);
    assert_eq!(extract.crls.len(), 1);
    assert_eq!(extract.master_lists.len(), 1);

    assert_eq!(extract.certificates[0], csca.cert);
    assert_eq!(extract.certificates[1], dsc.cert);
    assert_eq!(extract.crls[0].issuer_dn(), csca.cert.subject_dn());
    Ok(())
}

#[test]
fn entry_errors_do_not_abort_the_run() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;

    let mut content = String::new();
    content.push_str("dn: o=broken,c=UT\n");
    content.push_str("userCertificate;binary:: AAAA\n"); // valid base64, not a certificate
    content.push('\n');
    content.push_str("dn: o=good,c=UT\n");
    content.push_str(&fold_base64("cACertificate;binary", csca.cert.to_der()));

    let extract = ldif::extract_pkd(&content);

    assert_eq!(extract.total_entries, 2);
    assert_eq!(extract.errors.len(), 1);
    assert_eq!(extract.errors[0].dn, "o=broken,c=UT");
    assert_eq!(extract.certificates.len(), 1);
    Ok(())
}

#[test]
fn master_list_from_ldif_yields_cscas() -> Result<()> {
    let csca_a = fixtures::new_csca(CSCA_DN)?;
    let csca_b = fixtures::new_csca("CN=CSCA Utopia Gen2,O=Utopian Government,C=UT")?;
    let mlsc = fixtures::new_dsc(
        "CN=ML Signer Utopia,O=Utopian Government,C=UT",
        CSCA_DN,
        &csca_a,
    )?;
    let ml = fixtures::build_master_list(&[&csca_a.cert, &csca_b.cert], &mlsc)?;

    let content = format!(
        "dn: o=ml,c=UT,dc=data,dc=pkd\n{}",
        fold_base64("pkdMasterListContent", &ml)
    );
    let extract = ldif::extract_pkd(&content);
    assert_eq!(extract.master_lists.len(), 1);

    let report = master_list::parse(&extract.master_lists[0])?;
    assert_eq!(report.cscas.len(), 2);
    assert!(report.cscas.contains(&csca_a.cert));
    assert!(report.cscas.contains(&csca_b.cert));
    assert_eq!(report.signer_dn.as_deref(), Some(&*mlsc.cert.subject_dn()));
    assert_eq!(report.signer_country.as_deref(), Some("UT"));
    assert!(report.warnings.is_empty());
    Ok(())
}

#[test]
fn master_list_flags_non_ca_entries() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    // A leaf certificate smuggled into the CSCA list: surfaced as a
    // warning, not emitted and not fatal.
    let leaf = fixtures::new_dsc(DSC_DN, CSCA_DN, &csca)?;
    let mlsc = fixtures::new_dsc(
        "CN=ML Signer Utopia,O=Utopian Government,C=UT",
        CSCA_DN,
        &csca,
    )?;
    let ml = fixtures::build_master_list(&[&csca.cert, &leaf.cert], &mlsc)?;

    let report = master_list::parse(&ml)?;
    assert_eq!(report.cscas.len(), 1);
    assert_eq!(report.cscas[0], csca.cert);
    assert_eq!(report.warnings.len(), 1);
    Ok(())
}

#[test]
fn input_formats_are_detected() -> Result<()> {
    use icao_pkd::pkd::{format, InputFormat};

    let csca = fixtures::new_csca(CSCA_DN)?;
    let crl = fixtures::fresh_crl(&csca)?;
    let mlsc = fixtures::new_dsc(
        "CN=ML Signer Utopia,O=Utopian Government,C=UT",
        CSCA_DN,
        &csca,
    )?;
    let ml = fixtures::build_master_list(&[&csca.cert], &mlsc)?;

    assert_eq!(format::detect(csca.cert.to_der()), InputFormat::Certificate);
    assert_eq!(format::detect(crl.to_der()), InputFormat::Crl);
    assert_eq!(format::detect(&ml), InputFormat::MasterList);
    assert_eq!(
        format::detect(b"dn: o=ml,c=UT\ncn: ml\n"),
        InputFormat::Ldif
    );

    // PEM armor unwraps to the enclosed DER's format.
    let pem = format!(
        "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----\n",
        BASE64.encode(csca.cert.to_der())
    );
    assert_eq!(format::detect(pem.as_bytes()), InputFormat::Certificate);

    let reparsed = icao_pkd::cert::Certificate::from_pem(&pem)?;
    assert_eq!(reparsed, csca.cert);
    Ok(())
}

#[test]
fn master_list_fingerprint_is_stable() -> Result<()> {
    let csca = fixtures::new_csca(CSCA_DN)?;
    let mlsc = fixtures::new_dsc(
        "CN=ML Signer Utopia,O=Utopian Government,C=UT",
        CSCA_DN,
        &csca,
    )?;
    let ml = fixtures::build_master_list(&[&csca.cert], &mlsc)?;

    let first = master_list::parse(&ml)?;
    let second = master_list::parse(&ml)?;
    assert_eq!(first.fingerprint_sha256, second.fingerprint_sha256);
    assert_eq!(first.fingerprint_sha256.len(), 64);
    Ok(())
}

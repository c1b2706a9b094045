//! ICAO Master List parsing (ICAO 9303-12 9).
//!
//! A Master List is CMS SignedData whose encapsulated content is the
//! `CscaMasterList` SET of trust-anchor certificates. The certificates in
//! the *CMS* set belong to the Master List Signer; the CSCAs live inside
//! the encapsulated content and are emitted one by one.

use {
    crate::{
        asn1::master_list::MasterList,
        cert::{ops, Certificate},
        codec,
        error::ParseError,
    },
    cms::cert::CertificateChoices,
    der::Decode,
    tracing::{debug, info, warn},
};

/// Everything extracted from one Master List.
#[derive(Debug, Default)]
pub struct MasterListReport {
    /// Subject DN of the Master List Signer certificate, when one is
    /// present in the CMS certificates set.
    pub signer_dn:          Option<String>,
    /// `C=` of the signer DN, uppercased.
    pub signer_country:     Option<String>,
    /// SHA-256 over the full CMS input, for directory deduplication.
    pub fingerprint_sha256: String,
    pub cscas:              Vec<Certificate>,
    pub warnings:           Vec<String>,
}

/// Parse a binary Master List and emit its CSCAs.
pub fn parse(bytes: &[u8]) -> Result<MasterListReport, ParseError> {
    let mut report = MasterListReport {
        fingerprint_sha256: codec::sha256_hex(bytes),
        ..MasterListReport::default()
    };

    let der = codec::trim_to_declared(bytes)?;
    let ml = MasterList::from_der(der)?;

    // The CMS certificates set carries the Master List Signer (and
    // whatever chain the publisher included). The first non-CA entry is
    // the signer; CA entries here are ignored in favor of the enclosed
    // list.
    if let Some(certificates) = ml.signed_data().certificates.as_ref() {
        for choice in certificates.0.iter() {
            let CertificateChoices::Certificate(cert) = choice else {
                continue;
            };
            let Ok(cert) = Certificate::from_x509(cert.clone()) else {
                continue;
            };
            let is_ca = cert
                .basic_constraints()
                .map_or_else(|| ops::is_self_signed(&cert), |bc| bc.ca);
            if !is_ca && report.signer_dn.is_none() {
                report.signer_country = cert.country_code();
                report.signer_dn = Some(cert.subject_dn());
            }
        }
    }

    let list = ml.csca_ml()?;
    debug!(
        version = list.version,
        certificates = list.cert_list.len(),
        "decoded CscaMasterList"
    );

    for (index, entry) in list.cert_list.iter().enumerate() {
        let cert = match Certificate::from_x509(entry.clone()) {
            Ok(cert) => cert,
            Err(err) => {
                warn!(index, %err, "skipping undecodable Master List certificate");
                report
                    .warnings
                    .push(format!("certificate {index}: {err}"));
                continue;
            }
        };

        // Discrimination per Doc 9303: BasicConstraints cA marks a CSCA;
        // entries without the extension count as CSCA only when
        // self-signed (old-format roots). Everything else is surfaced,
        // not silently dropped.
        match cert.basic_constraints() {
            Some(bc) if bc.ca => report.cscas.push(cert),
            Some(_) => {
                warn!(subject = %cert.subject_dn(), "non-CA certificate in Master List");
                report.warnings.push(format!(
                    "non-CA certificate in cert list: {}",
                    cert.subject_dn()
                ));
            }
            None if ops::is_self_signed(&cert) => report.cscas.push(cert),
            None => {
                warn!(subject = %cert.subject_dn(), "certificate without BasicConstraints in Master List");
                report.warnings.push(format!(
                    "certificate without BasicConstraints and not self-signed: {}",
                    cert.subject_dn()
                ));
            }
        }
    }

    info!(
        cscas = report.cscas.len(),
        warnings = report.warnings.len(),
        signer = report.signer_dn.as_deref().unwrap_or("<none>"),
        "parsed Master List"
    );

    Ok(report)
}

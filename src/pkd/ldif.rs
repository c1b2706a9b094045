//! RFC 2849 LDIF parsing for ICAO PKD bulk dumps.
//!
//! The PKD distributes national PKI material as LDIF archives whose
//! entries carry DER blobs in base64-valued attributes. This parser
//! handles the textual layer (folding, comments, `::` base64 markers,
//! CRLF) and hands decoded bytes to the certificate and CRL parsers.
//! A malformed entry never aborts the run; errors are collected per DN.

use {
    crate::{
        cert::{Certificate, CertificateRevocationList},
        codec,
        error::ParseError,
    },
    std::collections::BTreeMap,
    tracing::{debug, info, warn},
};

pub const ATTR_USER_CERTIFICATE: &str = "userCertificate";
pub const ATTR_CA_CERTIFICATE: &str = "cACertificate";
pub const ATTR_CRL: &str = "certificateRevocationList";
pub const ATTR_MASTER_LIST: &str = "pkdMasterListContent";

/// One attribute value, with its transfer encoding preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LdifValue {
    /// `name: value`
    Text(String),
    /// `name:: base64`
    Base64(String),
}

impl LdifValue {
    /// Decode to raw bytes: base64 values are decoded, text values are
    /// taken verbatim.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ParseError> {
        match self {
            Self::Text(s) => Ok(s.as_bytes().to_vec()),
            Self::Base64(s) => codec::decode_base64(s),
        }
    }
}

/// One LDIF record: a DN and its attributes. Attribute names are stored
/// as written (including options such as `;binary`); lookups match on the
/// base name with options ignored.
#[derive(Clone, Debug, Default)]
pub struct LdifEntry {
    pub dn:     String,
    attributes: BTreeMap<String, Vec<LdifValue>>,
}

impl LdifEntry {
    /// Values of an attribute, matching `name` and `name;option…`.
    pub fn attribute(&self, name: &str) -> Vec<&LdifValue> {
        self.attributes
            .iter()
            .filter(|(key, _)| attr_base(key).eq_ignore_ascii_case(name))
            .flat_map(|(_, values)| values.iter())
            .collect()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        !self.attribute(name).is_empty()
    }

    /// First value of the attribute, decoded to bytes.
    pub fn first_binary(&self, name: &str) -> Option<Result<Vec<u8>, ParseError>> {
        self.attribute(name).first().map(|value| value.to_bytes())
    }
}

fn attr_base(name: &str) -> &str {
    name.split(';').next().unwrap_or(name)
}

/// A parse failure scoped to one entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LdifEntryError {
    pub dn:      String,
    pub message: String,
}

/// Result of extracting PKD material from an LDIF dump.
#[derive(Debug, Default)]
pub struct PkdExtract {
    pub certificates:  Vec<Certificate>,
    pub crls:          Vec<CertificateRevocationList>,
    /// Raw CMS bytes of `pkdMasterListContent` values, for
    /// [`crate::pkd::master_list::parse`].
    pub master_lists:  Vec<Vec<u8>>,
    pub errors:        Vec<LdifEntryError>,
    pub total_entries: usize,
}

/// Parse LDIF text into its record stream.
///
/// RFC 2849: records are separated by blank lines, lines beginning with a
/// single space continue the previous logical line, `#` begins a comment,
/// and the `dn:` line opens a record. A `version:` line before the first
/// record is ignored. Trailing CR (Windows line endings) is stripped.
pub fn parse_entries(content: &str) -> Vec<LdifEntry> {
    let mut entries = Vec::new();
    let mut current: Option<LdifEntry> = None;

    for line in logical_lines(content) {
        if line.is_empty() {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            continue;
        }

        let Some((name, value)) = split_attribute(&line) else {
            debug!(line = %line, "skipping LDIF line without separator");
            continue;
        };

        if name.eq_ignore_ascii_case("dn") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = Some(LdifEntry {
                dn: match value {
                    LdifValue::Text(ref s) => s.clone(),
                    // dn:: base64 DNs appear for non-ASCII RDNs.
                    LdifValue::Base64(_) => match value.to_bytes() {
                        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                        Err(_) => String::new(),
                    },
                },
                attributes: BTreeMap::new(),
            });
            continue;
        }

        if let Some(entry) = current.as_mut() {
            entry.attributes.entry(name).or_default().push(value);
        }
    }

    if let Some(entry) = current.take() {
        entries.push(entry);
    }

    entries
}

/// Fold continuation lines, drop comments, normalize line endings. Blank
/// lines are preserved as empty strings; they delimit records.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut skipping_comment = false;

    for raw in content.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if line.is_empty() {
            skipping_comment = false;
            lines.push(String::new());
            continue;
        }

        if let Some(rest) = line.strip_prefix(' ') {
            // Continuations extend whatever opened them, comments included.
            if !skipping_comment {
                if let Some(last) = lines.last_mut() {
                    last.push_str(rest);
                }
            }
            continue;
        }

        if line.starts_with('#') {
            skipping_comment = true;
            continue;
        }

        skipping_comment = false;
        lines.push(line.to_string());
    }

    lines
}

fn split_attribute(line: &str) -> Option<(String, LdifValue)> {
    let colon = line.find(':')?;
    let name = line[..colon].to_string();
    let rest = &line[colon + 1..];
    Some(if let Some(b64) = rest.strip_prefix(':') {
        (name, LdifValue::Base64(b64.trim_start().to_string()))
    } else {
        (name, LdifValue::Text(rest.trim_start().to_string()))
    })
}

/// Walk an LDIF dump and extract the PKD binary attributes.
pub fn extract_pkd(content: &str) -> PkdExtract {
    let entries = parse_entries(content);
    let mut result = PkdExtract {
        total_entries: entries.len(),
        ..PkdExtract::default()
    };

    info!(entries = entries.len(), "parsing LDIF entries");

    for entry in &entries {
        if let Err(message) = extract_entry(entry, &mut result) {
            warn!(dn = %entry.dn, %message, "failed to parse LDIF entry");
            result.errors.push(LdifEntryError {
                dn: entry.dn.clone(),
                message,
            });
        }
    }

    info!(
        certificates = result.certificates.len(),
        crls = result.crls.len(),
        master_lists = result.master_lists.len(),
        errors = result.errors.len(),
        "LDIF extraction finished"
    );

    result
}

fn extract_entry(entry: &LdifEntry, result: &mut PkdExtract) -> Result<(), String> {
    for attr in [ATTR_USER_CERTIFICATE, ATTR_CA_CERTIFICATE] {
        if let Some(decoded) = entry.first_binary(attr) {
            let der = decoded.map_err(|e| format!("{attr}: {e}"))?;
            let cert = Certificate::from_der(&der).map_err(|e| format!("{attr}: {e}"))?;
            result.certificates.push(cert);
        }
    }

    if let Some(decoded) = entry.first_binary(ATTR_CRL) {
        let der = decoded.map_err(|e| format!("{ATTR_CRL}: {e}"))?;
        let crl =
            CertificateRevocationList::from_der(&der).map_err(|e| format!("{ATTR_CRL}: {e}"))?;
        result.crls.push(crl);
    }

    if let Some(decoded) = entry.first_binary(ATTR_MASTER_LIST) {
        let bytes = decoded.map_err(|e| format!("{ATTR_MASTER_LIST}: {e}"))?;
        debug!(dn = %entry.dn, "found Master List entry");
        result.master_lists.push(bytes);
    }

    Ok(())
}

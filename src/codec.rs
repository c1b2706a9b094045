//! Byte-level codecs shared by the parsers: DER framing, base64 and hex.

use {
    crate::error::ParseError,
    base64::{engine::general_purpose::STANDARD as BASE64, Engine as _},
    sha2::{Digest, Sha256},
};

/// Structural sniff for DER-encoded material.
///
/// True when the buffer opens with a SEQUENCE tag (`0x30`) followed by a
/// short-form length (≤ `0x7F`) or a long-form prefix in `0x81..=0x84`, and
/// the buffer is at least as large as the declared encoding.
pub fn is_der(bytes: &[u8]) -> bool {
    if bytes.len() < 4 || bytes[0] != 0x30 {
        return false;
    }
    matches!(declared_len(bytes), Ok(total) if bytes.len() >= total)
}

/// Total declared size (header plus content) of the leading DER TLV.
///
/// Length decoding per X.690: short form for lengths ≤ 127, long form
/// `0x8N` with N ∈ 1..=4 big-endian length bytes. Anything else is a parse
/// error. Trailing bytes past the declared length are *not* rejected here;
/// callers that tolerate them (some CAs pad, CMS wrappers append) should
/// slice to the returned size.
pub fn declared_len(bytes: &[u8]) -> Result<usize, ParseError> {
    let (header, content) = header_and_content_len(bytes)?;
    let total = header + content;
    ensure_fits(total, bytes.len())?;
    Ok(total)
}

/// Header size (tag plus length field) of the leading TLV, any tag.
pub fn header_len(bytes: &[u8]) -> Result<usize, ParseError> {
    header_and_content_len(bytes).map(|(header, _)| header)
}

fn header_and_content_len(bytes: &[u8]) -> Result<(usize, usize), ParseError> {
    let [_, first_len, ..] = bytes else {
        return Err(ParseError::NotDer);
    };
    match first_len {
        0x00..=0x7F => Ok((2, *first_len as usize)),
        0x81..=0x84 => {
            let count = (first_len & 0x7F) as usize;
            if bytes.len() < 2 + count {
                return Err(ParseError::Truncated {
                    declared: 2 + count,
                    actual:   bytes.len(),
                });
            }
            let mut len = 0usize;
            for byte in &bytes[2..2 + count] {
                len = (len << 8) | *byte as usize;
            }
            Ok((2 + count, len))
        }
        _ => Err(ParseError::NotDer),
    }
}

fn ensure_fits(declared: usize, actual: usize) -> Result<(), ParseError> {
    if actual < declared {
        return Err(ParseError::Truncated { declared, actual });
    }
    Ok(())
}

/// Slice the buffer down to the declared DER encoding, logging when the
/// input carries trailing bytes. Accept-with-warning: real-world CA output
/// occasionally pads past the declared length.
pub fn trim_to_declared(bytes: &[u8]) -> Result<&[u8], ParseError> {
    let total = declared_len(bytes)?;
    if bytes.len() > total {
        tracing::warn!(
            declared = total,
            actual = bytes.len(),
            "input carries trailing bytes past the declared DER length"
        );
    }
    Ok(&bytes[..total])
}

/// Decode base64, rejecting malformed input. Whitespace is stripped first;
/// LDIF folding can leave stray spaces inside re-joined values.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, ParseError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| ParseError::Malformed(format!("invalid base64: {e}")))
}

/// Decode the first PEM block in `text` to DER.
///
/// Any `-----BEGIN <label>-----` armor is accepted; national CAs publish
/// CSCA material under CERTIFICATE, X509 CRL and PKCS7 labels alike. The
/// label of the block is returned alongside the bytes.
pub fn decode_pem(text: &str) -> Result<(String, Vec<u8>), ParseError> {
    let mut label = None;
    let mut body = String::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("-----BEGIN ") {
            label = Some(
                rest.strip_suffix("-----")
                    .ok_or_else(|| ParseError::Malformed("unterminated PEM header".into()))?
                    .to_string(),
            );
            continue;
        }
        if line.starts_with("-----END ") {
            let label =
                label.ok_or_else(|| ParseError::Malformed("PEM footer without header".into()))?;
            return Ok((label, decode_base64(&body)?));
        }
        if label.is_some() {
            body.push_str(line);
        }
    }
    Err(ParseError::Malformed("no PEM block found".into()))
}

/// True when the buffer looks like PEM-armored text.
pub fn is_pem(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes)
        .map(|text| text.contains("-----BEGIN "))
        .unwrap_or(false)
}

/// Lowercase hex, the display form used for fingerprints and hashes.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// SHA-256 over the input, as 64 lowercase hex characters.
pub fn sha256_hex(bytes: &[u8]) -> String {
    to_hex(&Sha256::digest(bytes))
}

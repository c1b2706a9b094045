//! Distinguished-name string handling.
//!
//! PKD material surfaces DNs in two textual forms: the OpenSSL one-line
//! slash form (`/C=UT/O=Gov/CN=CSCA`) and the RFC 2253 comma form
//! (`CN=CSCA,O=Gov,C=UT`). Primary comparison is case-insensitive direct
//! equality per RFC 4517 4.2.15; [`normalize_dn`] produces a canonical
//! form for tolerant matching across the two syntaxes.

/// Case-insensitive DN equality, RFC 4517 4.2.15.
pub fn dn_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Canonical form for cross-syntax DN matching: tokenize on the syntax's
/// separator (honoring RFC 2253 `\`-escapes and quoted regions), lowercase
/// and trim each component, sort, and join with `|`.
///
/// Idempotent: the output contains no separator of either syntax, so a
/// second pass returns it unchanged.
pub fn normalize_dn(dn: &str) -> String {
    let mut parts: Vec<String> = if dn.starts_with('/') {
        split_slash_form(dn)
    } else {
        split_rfc2253(dn)
    };
    parts.sort();
    parts.join("|")
}

/// Value of a DN attribute (e.g. `C`, `CN`, `O`), matched at component
/// boundaries, case-insensitively, in either syntax.
pub fn extract_dn_attribute(dn: &str, attr: &str) -> Option<String> {
    let components = if dn.starts_with('/') {
        split_slash_form(dn)
    } else {
        split_rfc2253(dn)
    };
    let key = format!("{}=", attr.to_ascii_lowercase());
    components.into_iter().find_map(|component| {
        component
            .strip_prefix(&key)
            .map(|value| value.trim().to_string())
    })
}

fn split_slash_form(dn: &str) -> Vec<String> {
    dn.split('/')
        .filter(|segment| !segment.is_empty())
        .map(normalize_component)
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn split_rfc2253(dn: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = dn.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                push_component(&mut parts, &current);
                current.clear();
            }
            '\\' => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            _ => current.push(c),
        }
    }
    push_component(&mut parts, &current);
    parts
}

fn push_component(parts: &mut Vec<String>, raw: &str) {
    let component = normalize_component(raw);
    if !component.is_empty() {
        parts.push(component);
    }
}

fn normalize_component(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

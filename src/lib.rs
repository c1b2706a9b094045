//! ICAO Doc 9303 Public Key Directory (PKD) validation engine.
//!
//! This crate ingests bulk national PKI material (LDIF archives, ICAO
//! Master Lists, CRLs), normalizes it into certificates and revocation
//! lists, and performs the two Doc 9303 verification workflows:
//!
//! * certificate trust-chain validation from a Document Signer Certificate
//!   (DSC) up to a self-signed Country Signing CA (CSCA), with CRL-based
//!   revocation checks ([`validation`]), and
//! * Passive Authentication of ePassport chip data: verifying the Security
//!   Object Document against its DSC and confirming each Data Group hash
//!   against the `LDSSecurityObject` ([`pa`]).
//!
//! Storage and transport are out of scope. The engine consumes bytes,
//! certificates and the provider traits in [`validation`]; hosts bind those
//! to their own directory (database, LDAP, in-memory sets).

pub mod asn1;
pub mod cert;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod pa;
pub mod pkd;
pub mod sod;
pub mod validation;

/// Return the given error when the condition does not hold.
#[macro_export]
macro_rules! ensure_err {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

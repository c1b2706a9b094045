//! Pure ASN1 types, no application logic.
//!
//! Parsing is done as deeply as the standards allow, so rich types are
//! available to the validation layers while all valid inputs still parse:
//! a digest algorithm decodes into an enum of the known OIDs with a
//! catch-all for everything else.
//!
//! A second goal is for the parsing to be exactly reversible. DER
//! guarantees this in principle, but real world data is not always DER
//! compliant, or the standard is ambiguous. Where that happens we store the
//! details of the input so the output can be exactly reconstructed; see the
//! [`DigestAlgorithmIdentifier`] parameters (which have two ways of
//! encoding 'no parameters').

mod application_tagged;
mod content_info;
mod digest_algorithm_identifier;
pub mod lds;
pub mod master_list;
mod rsa_pss;

pub use self::{
    application_tagged::ApplicationTagged,
    content_info::{ContentInfo, ContentType},
    digest_algorithm_identifier::{
        DigestAlgorithmIdentifier, Parameters as DigestAlgorithmParameters,
    },
    rsa_pss::RsaPssParameters,
};
use der::{asn1::ObjectIdentifier as Oid, Any, Sequence, ValueOrd};

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct AnyAlgorithmIdentifier {
    pub algorithm:  Oid,
    pub parameters: Option<Any>,
}

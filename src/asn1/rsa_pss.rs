use {
    super::AnyAlgorithmIdentifier,
    der::{asn1::ObjectIdentifier as Oid, Sequence},
};

pub const ID_MGF1: Oid = Oid::new_unwrap("1.2.840.113549.1.1.8");

const ID_SHA1: Oid = Oid::new_unwrap("1.3.14.3.2.26");

/// RFC 4055 3.1 `RSASSA-PSS-params`.
///
/// All four fields are context-tagged with SHA-1 era defaults; PKD
/// material in practice always spells out SHA-2 parameters.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct RsaPssParameters {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", default = "sha1_identifier")]
    pub hash_algorithm: AnyAlgorithmIdentifier,

    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", default = "mgf1_sha1_identifier")]
    pub mask_gen_algorithm: AnyAlgorithmIdentifier,

    #[asn1(context_specific = "2", tag_mode = "EXPLICIT", default = "default_salt_length")]
    pub salt_length: u8,

    #[asn1(context_specific = "3", tag_mode = "EXPLICIT", default = "default_trailer_field")]
    pub trailer_field: u8,
}

fn sha1_identifier() -> AnyAlgorithmIdentifier {
    AnyAlgorithmIdentifier {
        algorithm:  ID_SHA1,
        parameters: None,
    }
}

fn mgf1_sha1_identifier() -> AnyAlgorithmIdentifier {
    AnyAlgorithmIdentifier {
        algorithm:  ID_MGF1,
        parameters: None,
    }
}

const fn default_salt_length() -> u8 {
    20
}

const fn default_trailer_field() -> u8 {
    1
}

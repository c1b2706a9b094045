use {
    super::{ApplicationTagged, ContentInfo, ContentType, DigestAlgorithmIdentifier},
    crate::ensure_err,
    cms::signed_data::{EncapsulatedContentInfo, SignedData, SignerInfo},
    der::{
        asn1::{ObjectIdentifier as Oid, OctetString, PrintableString},
        Decode, Error, ErrorKind, Length, Result, Sequence, Tag,
    },
    std::collections::BTreeMap,
};

/// Data Groups are numbered 1 through 16 on the chip.
pub const MAX_DATA_GROUP: u64 = 16;

/// EF_SOD is a wrapped [`SignedData`] structure.
///
/// See ICAO-9303-10 4.7.14. The 0x77 leading byte is an ASN1 constructed
/// application tag with the value 23.
pub type EfSod = ApplicationTagged<23, ContentInfo<SignedData>>;

/// ICAO-9303-10 4.6.2.3
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub struct LdsSecurityObject {
    pub version:                u64,
    pub hash_algorithm:         DigestAlgorithmIdentifier,
    pub data_group_hash_values: Vec<DataGroupHash>,
    pub lds_version_info:       Option<LdsVersionInfo>,
}

/// ICAO-9303-10 4.6.2.3
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub struct LdsVersionInfo {
    pub lds_version:     PrintableString,
    pub unicode_version: PrintableString,
}

/// ICAO-9303-10 4.6.2.3
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub struct DataGroupHash {
    pub data_group_number: u64,
    pub hash_value:        OctetString,
}

impl ContentType for LdsSecurityObject {
    /// ICAO-9303-10 4.6.2.3
    const CONTENT_TYPE: Oid = Oid::new_unwrap("2.23.136.1.1.1");
}

impl EfSod {
    pub fn signed_data(&self) -> &SignedData {
        &self.0 .0
    }

    pub fn signer_info(&self) -> Option<&SignerInfo> {
        self.signed_data().signer_infos.0.as_slice().first()
    }

    pub fn encapsulated_content(&self) -> &EncapsulatedContentInfo {
        &self.signed_data().encap_content_info
    }

    pub fn lds_security_object(&self) -> Result<LdsSecurityObject> {
        lds_security_object(self.encapsulated_content())
    }
}

/// Decode the [`LdsSecurityObject`] enclosed in a SOD's encapsulated
/// content, checking the content-type OID first.
pub fn lds_security_object(econ: &EncapsulatedContentInfo) -> Result<LdsSecurityObject> {
    ensure_err!(
        econ.econtent_type == LdsSecurityObject::CONTENT_TYPE,
        Error::new(
            ErrorKind::OidUnknown {
                oid: econ.econtent_type,
            },
            Length::ZERO,
        )
    );
    let octet_string = econ
        .econtent
        .as_ref()
        .ok_or(Error::new(
            ErrorKind::TagUnexpected {
                expected: Some(Tag::OctetString),
                actual:   Tag::Null, // Actually None
            },
            Length::ZERO,
        ))?
        .decode_as::<OctetString>()?;
    LdsSecurityObject::from_der(octet_string.as_bytes())
}

impl LdsSecurityObject {
    pub fn hash_for_dg(&self, dg_number: usize) -> Option<&[u8]> {
        for entry in &self.data_group_hash_values {
            if entry.data_group_number == dg_number as u64 {
                return Some(entry.hash_value.as_bytes());
            }
        }
        None
    }

    /// The stored hashes keyed by Data Group number, restricted to the
    /// valid 1..=16 range. Entries outside the range are dropped; a
    /// conformant SOD never carries them but the parse tolerates it.
    pub fn expected_hashes(&self) -> BTreeMap<u8, Vec<u8>> {
        self.data_group_hash_values
            .iter()
            .filter(|entry| (1..=MAX_DATA_GROUP).contains(&entry.data_group_number))
            .map(|entry| {
                (
                    entry.data_group_number as u8,
                    entry.hash_value.as_bytes().to_vec(),
                )
            })
            .collect()
    }
}

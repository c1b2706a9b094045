use {
    super::AnyAlgorithmIdentifier,
    der::{
        asn1::{Null, ObjectIdentifier as Oid},
        Any, Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Result, Sequence,
        ValueOrd, Writer,
    },
    sha1::Sha1,
    sha2::{Digest, Sha256, Sha384, Sha512},
    std::cmp::Ordering,
};

pub const ID_SHA1: Oid = Oid::new_unwrap("1.3.14.3.2.26");
pub const ID_SHA256: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.1");
pub const ID_SHA384: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.2");
pub const ID_SHA512: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.3");

/// Digest AlgorithmIdentifier covering the ICAO 9303 hash set.
///
/// SHA-1 is parsed for legacy material only; Doc 9303 deprecates it.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum DigestAlgorithmIdentifier {
    Sha1(Parameters),
    Sha256(Parameters),
    Sha384(Parameters),
    Sha512(Parameters),
    Unknown(AnyAlgorithmIdentifier),
}

/// RFC 5754 2 allows the parameters field to be absent or an explicit
/// NULL. Which encoding the input used is kept so re-encoding is exact.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord)]
pub enum Parameters {
    #[default]
    Absent,
    Null,
}

impl Parameters {
    fn encoded_len(self) -> Result<Length> {
        match self {
            Self::Absent => Ok(Length::ZERO),
            Self::Null => Null.encoded_len(),
        }
    }

    fn encode(self, writer: &mut impl Writer) -> Result<()> {
        match self {
            Self::Absent => Ok(()),
            Self::Null => Null.encode(writer),
        }
    }
}

impl DigestAlgorithmIdentifier {
    /// Display name matching the Doc 9303 result conventions.
    pub fn name(&self) -> String {
        match self {
            Self::Sha1(_) => "SHA-1".into(),
            Self::Sha256(_) => "SHA-256".into(),
            Self::Sha384(_) => "SHA-384".into(),
            Self::Sha512(_) => "SHA-512".into(),
            Self::Unknown(any) => format!("UNKNOWN({})", any.algorithm),
        }
    }

    pub const fn oid(&self) -> Oid {
        match self {
            Self::Sha1(_) => ID_SHA1,
            Self::Sha256(_) => ID_SHA256,
            Self::Sha384(_) => ID_SHA384,
            Self::Sha512(_) => ID_SHA512,
            Self::Unknown(any) => any.algorithm,
        }
    }

    /// Digest `data` with the identified algorithm, or `None` when the
    /// algorithm is outside the recognized set.
    pub fn hash_bytes(&self, data: &[u8]) -> Option<Vec<u8>> {
        Some(match self {
            Self::Sha1(_) => Sha1::digest(data).to_vec(),
            Self::Sha256(_) => Sha256::digest(data).to_vec(),
            Self::Sha384(_) => Sha384::digest(data).to_vec(),
            Self::Sha512(_) => Sha512::digest(data).to_vec(),
            Self::Unknown(_) => return None,
        })
    }
}

impl Sequence<'_> for DigestAlgorithmIdentifier {}

impl ValueOrd for DigestAlgorithmIdentifier {
    fn value_cmp(&self, other: &Self) -> Result<Ordering> {
        let lhs = self.to_der()?;
        let rhs = other.to_der()?;
        Ok(lhs.as_slice().cmp(rhs.as_slice()))
    }
}

impl EncodeValue for DigestAlgorithmIdentifier {
    fn value_len(&self) -> Result<Length> {
        match self {
            Self::Sha1(p) | Self::Sha256(p) | Self::Sha384(p) | Self::Sha512(p) => {
                self.oid().encoded_len()? + p.encoded_len()?
            }
            Self::Unknown(any) => any.value_len(),
        }
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        match self {
            Self::Sha1(p) | Self::Sha256(p) | Self::Sha384(p) | Self::Sha512(p) => {
                self.oid().encode(writer)?;
                p.encode(writer)
            }
            Self::Unknown(any) => any.encode_value(writer),
        }
    }
}

impl<'a> DecodeValue<'a> for DigestAlgorithmIdentifier {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> Result<Self> {
        let oid = Oid::decode(reader)?;
        if matches!(oid, ID_SHA1 | ID_SHA256 | ID_SHA384 | ID_SHA512) {
            let params = if reader.is_finished() {
                Parameters::Absent
            } else {
                Null::decode(reader)?;
                Parameters::Null
            };
            Ok(match oid {
                ID_SHA1 => Self::Sha1(params),
                ID_SHA256 => Self::Sha256(params),
                ID_SHA384 => Self::Sha384(params),
                _ => Self::Sha512(params),
            })
        } else {
            Ok(Self::Unknown(AnyAlgorithmIdentifier {
                algorithm:  oid,
                parameters: Option::<Any>::decode(reader)?,
            }))
        }
    }
}

use {
    crate::ensure_err,
    cms::signed_data::SignedData,
    der::{
        asn1::{ContextSpecific, ContextSpecificRef, ObjectIdentifier as Oid},
        Decode, DecodeValue, Encode, EncodeValue, Error, ErrorKind, Header, Length, Reader,
        Result, Sequence, TagMode, TagNumber, Tagged, Writer,
    },
};

/// Pins the [RFC 5652] `ContentInfo.contentType` OID of an enclosed
/// content type, so mismatched wrappers fail at decode time.
pub trait ContentType {
    const CONTENT_TYPE: Oid;
}

impl ContentType for SignedData {
    /// RFC 5652 5.1: id-signedData
    const CONTENT_TYPE: Oid = Oid::new_unwrap("1.2.840.113549.1.7.2");
}

/// RFC 5652 3: `ContentInfo ::= SEQUENCE { contentType ContentType,
/// content [0] EXPLICIT ANY DEFINED BY contentType }`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentInfo<T>(pub T);

impl<T: EncodeValue + Tagged> ContentInfo<T> {
    fn content_field(&self) -> ContextSpecificRef<'_, T> {
        ContextSpecificRef {
            tag_number: TagNumber::N0,
            tag_mode:   TagMode::Explicit,
            value:      &self.0,
        }
    }
}

impl<'a, T: Decode<'a> + ContentType> DecodeValue<'a> for ContentInfo<T> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> Result<Self> {
        let oid = Oid::decode(reader)?;
        ensure_err!(
            oid == T::CONTENT_TYPE,
            Error::new(ErrorKind::OidUnknown { oid }, Length::ZERO)
        );
        let content = ContextSpecific::<T>::decode_explicit(reader, TagNumber::N0)?.ok_or_else(
            || {
                Error::new(
                    ErrorKind::TagNumberInvalid, // content [0] is mandatory
                    Length::ZERO,
                )
            },
        )?;
        Ok(Self(content.value))
    }
}

impl<T: Encode + EncodeValue + Tagged + ContentType> EncodeValue for ContentInfo<T> {
    fn value_len(&self) -> Result<Length> {
        T::CONTENT_TYPE.encoded_len()? + self.content_field().encoded_len()?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        T::CONTENT_TYPE.encode(writer)?;
        self.content_field().encode(writer)
    }
}

impl<'a, T: Decode<'a> + Encode + ContentType + Sequence<'a>> Sequence<'a> for ContentInfo<T> {}

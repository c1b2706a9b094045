use der::{
    Decode, DecodeValue, Encode, EncodeValue, FixedTag, Header, Length, Reader, Result, Tag,
    TagNumber, Writer,
};

/// Constructed ASN1 application-tagged wrapper.
///
/// ICAO-9303-10 wraps elementary files in application tags; EF_SOD is
/// `[APPLICATION 23]` (leading byte 0x77). The wrapper is transparent: the
/// inner value encodes and decodes unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationTagged<const TAG: u8, T>(pub T);

impl<const TAG: u8, T> FixedTag for ApplicationTagged<TAG, T> {
    const TAG: Tag = Tag::Application {
        constructed: true,
        number:      TagNumber::new(TAG),
    };
}

impl<'a, const TAG: u8, T: Decode<'a>> DecodeValue<'a> for ApplicationTagged<TAG, T> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> Result<Self> {
        Ok(Self(T::decode(reader)?))
    }
}

impl<const TAG: u8, T: Encode> EncodeValue for ApplicationTagged<TAG, T> {
    fn value_len(&self) -> Result<Length> {
        self.0.encoded_len()
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        self.0.encode(writer)
    }
}

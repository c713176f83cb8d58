//! Record frame headers.

use either::Either::{self, Left, Right};
use zerocopy::FromBytes;

use super::{field::ByteOrder, registry::dispatch_key};

/// Size of a record header in bytes.
pub const SIZE: usize = 4;

/// The header preceding every record payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordHeader {
    /// Bytes of payload following the header.
    pub payload_length: u16,
    pub type_code: u8,
    pub subtype_code: u8,
}

/// Fewer than [`SIZE`] bytes remained where a header was expected.
///
/// This is the normal end of a record stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EndOfStream {
    /// Bytes found after the last complete record.
    pub trailing: usize,
}

impl EndOfStream {
    /// The all-zero header standing in for a header that could not be read.
    pub fn header(&self) -> RecordHeader {
        RecordHeader::END
    }
}

impl RecordHeader {
    /// Sentinel reported at the end of the stream. Its dispatch key matches no
    /// record kind.
    pub const END: Self = Self {
        payload_length: 0,
        type_code: 0,
        subtype_code: 0,
    };

    /// Decode a header from the first [`SIZE`] bytes of `r`.
    ///
    /// Returns the header, or the end of the stream if `r` is too short.
    pub fn advance(r: &[u8], order: ByteOrder) -> Either<Self, EndOfStream> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct Header {
            rec_len: [u8; 2],
            rec_typ: u8,
            rec_sub: u8,
        }

        let Some(r) = r.get(..SIZE).and_then(|r| <[u8; SIZE]>::try_from(r).ok()) else {
            return Right(EndOfStream { trailing: r.len() });
        };

        let Header {
            rec_len,
            rec_typ,
            rec_sub,
        } = zerocopy::transmute!(r);

        Left(Self {
            payload_length: order.u16(rec_len),
            type_code: rec_typ,
            subtype_code: rec_sub,
        })
    }

    /// The registry key for this header's type and subtype.
    pub fn key(&self) -> String {
        dispatch_key(self.type_code, self.subtype_code)
    }
}

//! Primitive field readers and the delimited text bundle decoder.

use std::io::{self, ErrorKind, Read};

use thiserror::Error;

/// Delimiter substituted for every byte below 33 in a text bundle.
pub const BUNDLE_DELIMITER: u8 = b',';

/// Byte order applied to the record length and every multi-byte field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// The byte order of the decoding machine.
    #[default]
    Native,
    Little,
    Big,
}

impl ByteOrder {
    /// Decode a `u16` in this byte order.
    pub fn u16(self, r: [u8; 2]) -> u16 {
        match self {
            Self::Native => u16::from_ne_bytes(r),
            Self::Little => u16::from_le_bytes(r),
            Self::Big => u16::from_be_bytes(r),
        }
    }
}

/// An error decoding a single record.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream ended inside the payload.
    #[error("{kind} payload truncated near offset {offset} ({found} of {expected} bytes).")]
    TruncatedPayload {
        kind: &'static str,
        offset: u64,
        expected: u16,
        found: usize,
    },
    /// A field could not be produced from the payload bytes.
    #[error("{kind} field {field} malformed at offset {offset}: {reason}.")]
    MalformedField {
        kind: &'static str,
        offset: u64,
        field: &'static str,
        reason: String,
    },
    /// The stream failed for a reason other than running out of bytes.
    #[error("{kind} read failed at offset {offset}: {source}")]
    Io {
        kind: &'static str,
        offset: u64,
        #[source]
        source: io::Error,
    },
}

/// A bundle split into fewer sub-fields than its layout names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("bundle holds {found} of {expected} fields")]
pub struct ShortBundle {
    pub expected: usize,
    pub found: usize,
}

/// Decode a delimited text bundle into exactly `count` text fields.
///
/// Every byte below 33 (the sub-field length bytes, spaces, and control
/// characters) becomes [`BUNDLE_DELIMITER`] and the span is split on it. The
/// leading element is always empty and is dropped; the next `count` elements
/// are returned in order and any further elements are ignored.
///
/// Text containing a byte below 33, or a literal delimiter, splits into extra
/// elements and shifts every later field. Nothing attempts to recover from
/// this.
pub fn decode_bundle(span: &[u8], count: usize) -> Result<Vec<String>, ShortBundle> {
    let mapped: Vec<u8> = span
        .iter()
        .map(|&b| if b < 33 { BUNDLE_DELIMITER } else { b })
        .collect();

    let fields: Vec<String> = mapped
        .split(|&b| b == BUNDLE_DELIMITER)
        .skip(1)
        .take(count)
        .map(text)
        .collect();

    if fields.len() != count {
        Err(ShortBundle {
            expected: count,
            found: fields.len(),
        })?;
    }

    Ok(fields)
}

/// Decode text, dropping any bytes that are not valid UTF-8.
pub fn text(r: &[u8]) -> String {
    r.utf8_chunks().map(|c| c.valid()).collect()
}

/// Cursor over the payload of one record.
///
/// Reads never extend past the declared payload length, so a decoder can
/// consume at most `length` bytes of the underlying stream.
pub struct Payload<'a> {
    r: &'a mut dyn Read,
    kind: &'static str,
    length: u16,
    consumed: usize,
    offset: u64,
    order: ByteOrder,
}

macro_rules! primitive {
    ($name:ident, $t:ty, $(#[$attr:meta])*) => {
        $(#[$attr])*
        pub fn $name(&mut self, field: &'static str) -> Result<$t, DecodeError> {
            let r = self.take::<{ size_of::<$t>() }>(field)?;

            Ok(match self.order {
                ByteOrder::Native => <$t>::from_ne_bytes(r),
                ByteOrder::Little => <$t>::from_le_bytes(r),
                ByteOrder::Big => <$t>::from_be_bytes(r),
            })
        }
    };
}

impl<'a> Payload<'a> {
    /// Wrap a reader positioned at the first payload byte, found at `offset`
    /// in the stream.
    pub fn new(
        r: &'a mut dyn Read,
        kind: &'static str,
        length: u16,
        offset: u64,
        order: ByteOrder,
    ) -> Self {
        Self {
            r,
            kind,
            length,
            consumed: 0,
            offset,
            order,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    /// Bytes consumed from the stream so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes of the payload not yet consumed.
    pub fn remaining(&self) -> usize {
        usize::from(self.length).saturating_sub(self.consumed)
    }

    /// Stream offset of the next payload byte.
    pub fn position(&self) -> u64 {
        self.offset + self.consumed as u64
    }

    /// Build a [`DecodeError::MalformedField`] at the current position.
    pub fn malformed(&self, field: &'static str, reason: impl Into<String>) -> DecodeError {
        DecodeError::MalformedField {
            kind: self.kind,
            offset: self.position(),
            field,
            reason: reason.into(),
        }
    }

    /// Check that the decoder consumed the whole payload.
    pub fn ensure_consumed(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(self.malformed("<payload>", format!("{n} trailing bytes not decoded"))),
        }
    }

    /// Take `n` bytes for a field.
    pub fn bytes(&mut self, field: &'static str, n: usize) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0; n];
        self.fill(field, &mut buf)?;
        Ok(buf)
    }

    /// Take every remaining byte of the payload.
    pub fn rest(&mut self, field: &'static str) -> Result<Vec<u8>, DecodeError> {
        self.bytes(field, self.remaining())
    }

    /// Take every remaining byte except the last `keep`, which belong to
    /// fields following this one.
    pub fn rest_but(&mut self, field: &'static str, keep: usize) -> Result<Vec<u8>, DecodeError> {
        let n = self.remaining().checked_sub(keep).ok_or_else(|| {
            let reason = format!("{} bytes left, {keep} needed after it", self.remaining());
            self.malformed(field, reason)
        })?;

        self.bytes(field, n)
    }

    primitive!(u8, u8, /** `U*1` */);
    primitive!(u16, u16, /** `U*2` */);
    primitive!(u32, u32, /** `U*4` */);
    primitive!(i16, i16, /** `I*2` */);
    primitive!(f32, f32, /** `R*4` */);

    /// `C*1`, a single character byte.
    pub fn char(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        let [c] = self.take(field)?;
        Ok(c)
    }

    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let mut buf = [0; N];
        self.fill(field, &mut buf)?;
        Ok(buf)
    }

    fn fill(&mut self, field: &'static str, buf: &mut [u8]) -> Result<(), DecodeError> {
        if buf.len() > self.remaining() {
            let reason = format!("needs {} bytes, {} left", buf.len(), self.remaining());
            Err(self.malformed(field, reason))?;
        }

        match self.r.read_exact(buf) {
            Ok(()) => {
                self.consumed += buf.len();
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                Err(DecodeError::TruncatedPayload {
                    kind: self.kind,
                    offset: self.position(),
                    expected: self.length,
                    found: self.consumed,
                })
            }
            Err(source) => Err(DecodeError::Io {
                kind: self.kind,
                offset: self.position(),
                source,
            }),
        }
    }
}

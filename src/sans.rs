//! I/O-free building blocks of the decoder.
//!
//! A record stream is a sequence of frames, each a four-byte
//! [`header::RecordHeader`] followed by `payload_length` bytes of payload. The
//! header's type and subtype codes select a decoder from a
//! [`registry::Registry`], and the decoder reads the payload through a
//! [`field::Payload`] cursor into a [`record::DecodedRecord`].
//!
//! Nothing in this module decides how bytes are fetched or what happens to
//! decoded records. The drivers in [`crate::avec`] do both, and are the
//! recommended starting point for a custom loop.
//!
//! Some areas of a custom loop must be carefully written:
//!
//! - Treating a short header read as the end of the stream rather than an
//! error.
//!
//! - Stopping at a header whose codes resolve to no decoder. The stream may
//! continue past it, but its payload layout is unknown.
//!
//! - Checking [`field::Payload::ensure_consumed`] after a decoder returns, and
//! deciding where the next header starts when a decoder fails part way.

pub mod field;
pub mod header;
pub mod record;
pub mod records;
pub mod registry;

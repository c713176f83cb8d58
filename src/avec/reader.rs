//! Reader-based decoder implementation.

use std::io::{self, ErrorKind, Read};

use either::Either::{Left, Right};
use log::{info, trace, warn};
use thiserror::Error;

use crate::sans::{
    field::{DecodeError, Payload},
    header::{self, RecordHeader},
    registry::{Registry, unsupported_name},
};

use super::{
    DecodeOptions, Exporter, SinkError, Summary, TableSink, Termination, UnknownPolicy, dispatch,
    fail,
};

/// Errors ending a decode from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error from the supplied sink.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Decode records from a reader with the built-in registry, publishing to a
/// sink.
///
/// This method is also re-exported as `stdfrec::avec::decode_reader`.
pub fn decode(
    r: &mut impl Read,
    o: &mut impl TableSink,
    options: &DecodeOptions,
) -> Result<Summary, Error> {
    decode_with(r, o, options, &Registry::builtin())
}

/// Decode records from a reader with a custom registry, publishing to a sink.
pub fn decode_with(
    r: &mut impl Read,
    o: &mut impl TableSink,
    options: &DecodeOptions,
    registry: &Registry,
) -> Result<Summary, Error> {
    let i = &mut 0; // Offset of the stream cursor.

    let mut o = Exporter::new(o);
    let mut summary = Summary::default();

    loop {
        let (buf, n) = take_header(r)?;
        *i += n as u64;

        let header = match RecordHeader::advance(&buf[..n], options.byte_order) {
            Left(header) => header,
            Right(end) => {
                info!("End of stream after {} bytes ({} trailing).", *i, end.trailing);
                summary.termination = Termination::EndOfStream {
                    trailing: end.trailing,
                };
                break;
            }
        };

        let offset = *i - header::SIZE as u64;
        trace!("{header:?} at offset {offset}");

        let Some(entry) = registry.resolve(&header) else {
            if options.on_unknown == UnknownPolicy::Skip {
                let name = describe(&header);
                warn!("Skipping {name}({}) at offset {offset}.", header.key());

                let mut payload = r.by_ref().take(header.payload_length.into());
                *i += io::copy(&mut payload, &mut io::sink())?;
                summary.skipped += 1;
                continue;
            }

            let name = describe(&header);
            info!("Stopping at {name}({}) at offset {offset}.", header.key());
            summary.termination = Termination::UnknownRecord { header, offset };
            break;
        };

        let length = usize::from(header.payload_length);

        if options.resynchronize {
            let mut data = Vec::with_capacity(length);
            r.by_ref().take(length as u64).read_to_end(&mut data)?;
            *i += data.len() as u64;

            if data.len() < length {
                let err = DecodeError::TruncatedPayload {
                    kind: entry.tag,
                    offset: *i,
                    expected: header.payload_length,
                    found: data.len(),
                };
                fail(&mut summary, entry, &header, &err);
                continue;
            }

            let start = *i - length as u64;
            let d = &mut data.as_slice();
            let mut p = Payload::new(d, entry.tag, header.payload_length, start, options.byte_order);
            dispatch(entry, &header, &mut p, &mut o, &mut summary)?;
        } else {
            let r: &mut dyn Read = &mut *r;
            let mut p = Payload::new(r, entry.tag, header.payload_length, *i, options.byte_order);
            dispatch(entry, &header, &mut p, &mut o, &mut summary)?;
            *i += p.consumed() as u64;
        }
    }

    summary.counts = o.counts().clone();
    summary.bytes = *i;
    o.finish()?;

    Ok(summary)
}

/// Name an unregistered header for logging.
fn describe(header: &RecordHeader) -> &'static str {
    unsupported_name(header.type_code, header.subtype_code).unwrap_or("unsupported")
}

/// Read up to a header's worth of bytes, stopping early only at the end of
/// the reader.
fn take_header(r: &mut impl Read) -> io::Result<([u8; header::SIZE], usize)> {
    let mut buf = [0; header::SIZE];
    let mut n = 0;

    while n < header::SIZE {
        match r.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok((buf, n))
}

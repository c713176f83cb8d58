//! Slice-based decoder implementation.
//!
//! Each payload is cut from the slice before decoding, so a failing decoder
//! never disturbs the position of the next header.

use std::io;

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

/// Errors ending a decode from a slice.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied sink.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// An error finishing the supplied sink.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Decode records from a slice with the built-in registry, publishing to a
/// sink.
///
/// This method is also re-exported as `stdfrec::avec::decode_slice`.
pub fn decode(
    r: &[u8],
    o: &mut impl TableSink,
    options: &DecodeOptions,
) -> Result<Summary, Error> {
    decode_with(r, o, options, &Registry::builtin())
}

/// Decode records from a slice with a custom registry, publishing to a sink.
pub fn decode_with(
    r: &[u8],
    o: &mut impl TableSink,
    options: &DecodeOptions,
    registry: &Registry,
) -> Result<Summary, Error> {
    let i = &mut 0; // Offset of the next unread byte.

    let mut o = Exporter::new(o);
    let mut summary = Summary::default();

    loop {
        let header = match RecordHeader::advance(&r[*i..], options.byte_order) {
            Left(header) => header,
            Right(end) => {
                info!("End of stream after {} bytes ({} trailing).", r.len(), end.trailing);
                summary.termination = Termination::EndOfStream {
                    trailing: end.trailing,
                };
                *i = r.len();
                break;
            }
        };

        let offset = *i as u64;
        trace!("{header:?} at offset {offset}");

        *i += header::SIZE;
        let end = *i + usize::from(header.payload_length);

        let Some(entry) = registry.resolve(&header) else {
            let name = unsupported_name(header.type_code, header.subtype_code)
                .unwrap_or("unsupported");

            if options.on_unknown == UnknownPolicy::Skip {
                warn!("Skipping {name}({}) at offset {offset}.", header.key());
                *i = end.min(r.len());
                summary.skipped += 1;
                continue;
            }

            info!("Stopping at {name}({}) at offset {offset}.", header.key());
            summary.termination = Termination::UnknownRecord { header, offset };
            break;
        };

        let Some(mut d) = r.get(*i..end) else {
            let err = DecodeError::TruncatedPayload {
                kind: entry.tag,
                offset: r.len() as u64,
                expected: header.payload_length,
                found: r.len() - *i,
            };
            fail(&mut summary, entry, &header, &err);
            *i = r.len();
            continue;
        };

        let mut p = Payload::new(
            &mut d,
            entry.tag,
            header.payload_length,
            *i as u64,
            options.byte_order,
        );
        dispatch(entry, &header, &mut p, &mut o, &mut summary)?;

        *i = end;
    }

    summary.counts = o.counts().clone();
    summary.bytes = *i as u64;
    o.finish()?;

    Ok(summary)
}

//! Decode loops and the tables they export to.
//!
//! The functions in this module decode records from readers and byte slices,
//! publishing each record as a row of a [`TableSink`]. One table exists per
//! record kind, named by its tag (`"PRR"`, `"WIR"`, ...). Its header is written
//! on the first occurrence of the kind and row `n` holds the `n`th occurrence.
//!
//! ```
//! let mut file = std::fs::File::open("lot.stdf")?;
//! let mut tables = MemorySink::new();
//! let summary = stdfrec::avec::decode_reader(&mut file, &mut tables, &DecodeOptions::default())?;
//!
//! for (tag, count) in &summary.counts {
//!     println!("{tag}: {count} rows");
//! }
//! ```
//!
//! Per-record failures are logged and counted in the returned [`Summary`];
//! they never end the loop. Only I/O failures outside a payload and sink
//! failures are returned as errors.

#[cfg(feature = "csv")]
pub mod csv;
pub mod export;
pub mod memory;
pub mod reader;
pub mod slice;

use core::fmt;
use std::{collections::BTreeMap, io};

use log::{info, warn};
use thiserror::Error;

use crate::sans::{
    field::{ByteOrder, DecodeError, Payload},
    header::RecordHeader,
    registry::Entry,
};

pub use export::Exporter;
pub use memory::MemorySink;
pub use reader::{decode as decode_reader, decode_with as decode_reader_with};
pub use slice::{decode as decode_slice, decode_with as decode_slice_with};

/// Receive tables of decoded records.
pub trait TableSink {
    /// Create the table for `tag` with the given column names.
    ///
    /// Called again for an existing table, this must do nothing.
    fn ensure_table(&mut self, tag: &str, header: &[&str]) -> io::Result<()>;

    /// Write row `row` (from 1) of the table for `tag`.
    fn append_row(&mut self, tag: &str, row: usize, values: &[CellValue]) -> io::Result<()>;

    /// Called once after the last record of a run.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: TableSink + ?Sized> TableSink for &mut S {
    fn ensure_table(&mut self, tag: &str, header: &[&str]) -> io::Result<()> {
        (**self).ensure_table(tag, header)
    }

    fn append_row(&mut self, tag: &str, row: usize, values: &[CellValue]) -> io::Result<()> {
        (**self).append_row(tag, row, values)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// A cell of an exported table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellValue {
    Integer(i64),
    Text(String),
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// What to do with a header whose codes match no registered decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownPolicy {
    /// End the run, as at the end of the stream.
    #[default]
    Stop,
    /// Discard the payload and carry on with the next header.
    ///
    /// This departs from the usual behaviour, which cannot tell an unknown
    /// record from trailing garbage.
    Skip,
}

/// Options for a decode run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    pub byte_order: ByteOrder,
    /// Read each payload in full before decoding it, so a failing decoder
    /// leaves the stream at the next header.
    ///
    /// When disabled, decoders read straight from the stream and a failure
    /// leaves it wherever the decoder stopped. Slices are always decoded one
    /// whole payload at a time.
    pub resynchronize: bool,
    pub on_unknown: UnknownPolicy,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Native,
            resynchronize: true,
            on_unknown: UnknownPolicy::Stop,
        }
    }
}

impl DecodeOptions {
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn resynchronize(mut self, resynchronize: bool) -> Self {
        self.resynchronize = resynchronize;
        self
    }

    pub fn on_unknown(mut self, on_unknown: UnknownPolicy) -> Self {
        self.on_unknown = on_unknown;
        self
    }
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Fewer than four bytes remained where a header was expected.
    EndOfStream { trailing: usize },
    /// A header named a record type with no decoder.
    UnknownRecord { header: RecordHeader, offset: u64 },
}

impl Default for Termination {
    fn default() -> Self {
        Self::EndOfStream { trailing: 0 }
    }
}

/// The outcome of a decode run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records decoded and exported.
    pub records: usize,
    /// Records whose decoding failed.
    pub failures: usize,
    /// Unknown records passed over under [`UnknownPolicy::Skip`].
    pub skipped: usize,
    /// Rows exported per tag.
    pub counts: BTreeMap<&'static str, usize>,
    /// Stream bytes consumed.
    pub bytes: u64,
    pub termination: Termination,
}

/// A sink refused a table or row.
#[derive(Debug, Error)]
#[error("Sink rejected {tag} output: {source}")]
pub struct SinkError {
    pub tag: &'static str,
    #[source]
    pub source: io::Error,
}

/// Decode one payload with a registered decoder and export the result.
///
/// Returns an error only if the sink fails; decode failures are logged and
/// counted.
fn dispatch<S: TableSink>(
    entry: &Entry,
    header: &RecordHeader,
    p: &mut Payload<'_>,
    o: &mut Exporter<S>,
    summary: &mut Summary,
) -> Result<(), SinkError> {
    let decoded = (entry.decode)(p).and_then(|record| {
        p.ensure_consumed()?;
        Ok(record)
    });

    match decoded {
        Ok(record) => {
            let row = o.emit(entry.tag, &record).map_err(|source| SinkError {
                tag: entry.tag,
                source,
            })?;

            summary.records += 1;
            info!(
                "{}({}{}) #{row} [REC_LEN]:{} {record}",
                entry.tag, header.type_code, header.subtype_code, header.payload_length,
            );
        }
        Err(err) => fail(summary, entry, header, &err),
    }

    Ok(())
}

fn fail(summary: &mut Summary, entry: &Entry, header: &RecordHeader, err: &DecodeError) {
    summary.failures += 1;
    warn!(
        "{}({}{}) [REC_LEN]:{} not decoded: {err}",
        entry.tag, header.type_code, header.subtype_code, header.payload_length,
    );
}

//! A decoder for Standard Test Data Format (STDF) record streams, exporting
//! one table per record kind.
//!
//! Automated test equipment writes STDF as a sequence of self-describing
//! records: a four-byte header giving the payload length and a type/subtype
//! pair, then the payload. This crate decodes the record kinds a wafer sort
//! run produces (FAR, ATR, MIR, SDR, PMR, WCR, WIR, PIR, PRR, WRR, HBR, SBR,
//! PCR, MRR) into ordered, named fields, and writes them as rows of per-kind
//! tables.
//!
//! Most users should begin with the functions in the [`avec`] module, pairing
//! a decode loop with a [`avec::TableSink`] such as [`avec::MemorySink`]. If
//! these prove insufficient, the pieces of the loop are exposed in the
//! [`sans`] module, including the [`sans::registry::Registry`] used to add
//! decoders for further record kinds.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `csv`: enable the CSV table sink (default).
//! - `cli`: build the `stdf2csv` command-line tool (default).

pub mod avec;
pub mod sans;

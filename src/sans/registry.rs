//! Mapping from record type codes to decoders.

use core::fmt;
use std::collections::HashMap;

use thiserror::Error;

use super::{
    field::{DecodeError, Payload},
    header::RecordHeader,
    record::DecodedRecord,
    records,
};

/// A decoder consuming one payload.
pub type DecodeFn = fn(&mut Payload<'_>) -> Result<DecodedRecord, DecodeError>;

/// Build the lookup key for a type and subtype pair.
///
/// The key is the decimal text of the type followed by that of the subtype,
/// so `(1, 10)` and `(11, 0)` share the key `"110"`. [`Registry::register`]
/// rejects such collisions.
pub fn dispatch_key(type_code: u8, subtype_code: u8) -> String {
    format!("{type_code}{subtype_code}")
}

/// The record kinds decoded by the built-in registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    /// File Attributes Record
    Far,
    /// Audit Trail Record
    Atr,
    /// Master Information Record
    Mir,
    /// Master Results Record
    Mrr,
    /// Part Count Record
    Pcr,
    /// Hardware Bin Record
    Hbr,
    /// Software Bin Record
    Sbr,
    /// Pin Map Record
    Pmr,
    /// Site Description Record
    Sdr,
    /// Wafer Information Record
    Wir,
    /// Wafer Results Record
    Wrr,
    /// Wafer Configuration Record
    Wcr,
    /// Part Information Record
    Pir,
    /// Part Results Record
    Prr,
}

impl RecordKind {
    pub const ALL: [Self; 14] = [
        Self::Far,
        Self::Atr,
        Self::Mir,
        Self::Mrr,
        Self::Pcr,
        Self::Hbr,
        Self::Sbr,
        Self::Pmr,
        Self::Sdr,
        Self::Wir,
        Self::Wrr,
        Self::Wcr,
        Self::Pir,
        Self::Prr,
    ];

    /// The name of this kind's output table.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Far => "FAR",
            Self::Atr => "ATR",
            Self::Mir => "MIR",
            Self::Mrr => "MRR",
            Self::Pcr => "PCR",
            Self::Hbr => "HBR",
            Self::Sbr => "SBR",
            Self::Pmr => "PMR",
            Self::Sdr => "SDR",
            Self::Wir => "WIR",
            Self::Wrr => "WRR",
            Self::Wcr => "WCR",
            Self::Pir => "PIR",
            Self::Prr => "PRR",
        }
    }

    /// The `(type, subtype)` codes of this kind.
    pub const fn codes(self) -> (u8, u8) {
        match self {
            Self::Far => (0, 10),
            Self::Atr => (0, 20),
            Self::Mir => (1, 10),
            Self::Mrr => (1, 20),
            Self::Pcr => (1, 30),
            Self::Hbr => (1, 40),
            Self::Sbr => (1, 50),
            Self::Pmr => (1, 60),
            Self::Sdr => (1, 80),
            Self::Wir => (2, 10),
            Self::Wrr => (2, 20),
            Self::Wcr => (2, 30),
            Self::Pir => (5, 10),
            Self::Prr => (5, 20),
        }
    }

    pub fn decoder(self) -> DecodeFn {
        match self {
            Self::Far => records::decode_far,
            Self::Atr => records::decode_atr,
            Self::Mir => records::decode_mir,
            Self::Mrr => records::decode_mrr,
            Self::Pcr => records::decode_pcr,
            Self::Hbr => records::decode_hbr,
            Self::Sbr => records::decode_sbr,
            Self::Pmr => records::decode_pmr,
            Self::Sdr => records::decode_sdr,
            Self::Wir => records::decode_wir,
            Self::Wrr => records::decode_wrr,
            Self::Wcr => records::decode_wcr,
            Self::Pir => records::decode_pir,
            Self::Prr => records::decode_prr,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Name of a record type STDF defines but no built-in decoder handles.
pub fn unsupported_name(type_code: u8, subtype_code: u8) -> Option<&'static str> {
    Some(match dispatch_key(type_code, subtype_code).as_str() {
        "162" => "PGR",
        "163" => "PLR",
        "170" => "RDR",
        "1030" => "TSR",
        "1510" => "PTR",
        "1515" => "MPR",
        "1520" => "FTR",
        "2010" => "BPS",
        "2020" => "EPS",
        "5010" => "GDR",
        "5030" => "DTR",
        _ => None?,
    })
}

/// A registered decoder.
#[derive(Clone, Copy, Debug)]
pub struct Entry {
    /// Name of the output table.
    pub tag: &'static str,
    pub type_code: u8,
    pub subtype_code: u8,
    pub decode: DecodeFn,
}

/// An error registering a decoder.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The dispatch key is already taken.
    #[error("{tag} ({type_code}, {subtype_code}) has key \"{key}\", already used by {existing}.")]
    KeyCollision {
        key: String,
        tag: &'static str,
        type_code: u8,
        subtype_code: u8,
        existing: &'static str,
    },
}

/// Decoders keyed by [`dispatch_key`].
#[derive(Clone, Debug)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// A registry with no decoders.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry holding every [`RecordKind`].
    pub fn builtin() -> Self {
        let entries = RecordKind::ALL
            .into_iter()
            .map(|kind| {
                let (type_code, subtype_code) = kind.codes();
                let entry = Entry {
                    tag: kind.tag(),
                    type_code,
                    subtype_code,
                    decode: kind.decoder(),
                };
                (dispatch_key(type_code, subtype_code), entry)
            })
            .collect();

        Self { entries }
    }

    /// Add a decoder for another record type.
    ///
    /// Fails if the type's dispatch key is already registered, including when
    /// a different type and subtype pair produces the same key.
    pub fn register(
        &mut self,
        type_code: u8,
        subtype_code: u8,
        tag: &'static str,
        decode: DecodeFn,
    ) -> Result<(), RegistryError> {
        let key = dispatch_key(type_code, subtype_code);

        if let Some(existing) = self.entries.get(&key) {
            Err(RegistryError::KeyCollision {
                key: key.clone(),
                tag,
                type_code,
                subtype_code,
                existing: existing.tag,
            })?;
        }

        let entry = Entry {
            tag,
            type_code,
            subtype_code,
            decode,
        };
        self.entries.insert(key, entry);

        Ok(())
    }

    pub fn lookup(&self, type_code: u8, subtype_code: u8) -> Option<&Entry> {
        self.entries.get(&dispatch_key(type_code, subtype_code))
    }

    /// Find the decoder for a header. The end-of-stream sentinel resolves to
    /// nothing.
    pub fn resolve(&self, header: &RecordHeader) -> Option<&Entry> {
        self.lookup(header.type_code, header.subtype_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }
}

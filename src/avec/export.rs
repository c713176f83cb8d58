//! Adapter turning decoded records into table rows.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    io,
};

use crate::sans::record::{DecodedRecord, FieldValue};

use super::{CellValue, TableSink};

impl CellValue {
    /// Coerce a field value to a cell, preferring an integer.
    ///
    /// Floats truncate toward zero. Characters and text become integers when
    /// their trimmed text parses as one. A single-element array becomes its
    /// element and a longer one comma-joined text.
    pub fn coerce(value: &FieldValue) -> Self {
        match value {
            FieldValue::Unsigned(v) => match i64::try_from(*v) {
                Ok(v) => Self::Integer(v),
                Err(_) => Self::Text(v.to_string()),
            },
            FieldValue::Signed(v) => Self::Integer(*v),
            FieldValue::Float(v) if v.is_finite() => Self::Integer(v.trunc() as i64),
            FieldValue::Float(v) => Self::Text(v.to_string()),
            FieldValue::Char(c) => Self::parse(char::from(*c).to_string()),
            FieldValue::Text(s) => Self::parse(s.clone()),
            FieldValue::Array(v) => match v.as_slice() {
                [single] => Self::Integer((*single).into()),
                v => Self::Text(
                    v.iter()
                        .map(u8::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                ),
            },
        }
    }

    fn parse(s: String) -> Self {
        match s.trim().parse() {
            Ok(v) => Self::Integer(v),
            Err(_) => Self::Text(s),
        }
    }
}

/// Writes decoded records to a [`TableSink`], one table per tag.
///
/// The first record of a tag fixes the table's header; each record is written
/// to the row numbered by its occurrence count.
#[derive(Debug)]
pub struct Exporter<S> {
    sink: S,
    headers: BTreeMap<&'static str, Vec<&'static str>>,
    counts: BTreeMap<&'static str, usize>,
}

impl<S: TableSink> Exporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            headers: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Export a record, returning the row it was written to.
    ///
    /// The occurrence count of `tag` advances only if the sink accepts the
    /// row.
    pub fn emit(&mut self, tag: &'static str, record: &DecodedRecord) -> io::Result<usize> {
        let header = match self.headers.entry(tag) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let names: Vec<_> = record.names().collect();
                self.sink.ensure_table(tag, &names)?;
                e.insert(names)
            }
        };

        let mut values = vec![CellValue::default(); header.len()];
        for (name, value) in record.iter() {
            if let Some(i) = header.iter().position(|h| *h == name) {
                values[i] = CellValue::coerce(value);
            }
        }

        let row = self.counts.get(tag).copied().unwrap_or(0) + 1;
        self.sink.append_row(tag, row, &values)?;
        self.counts.insert(tag, row);

        Ok(row)
    }

    /// Occurrences of `tag` exported so far.
    pub fn count(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<&'static str, usize> {
        &self.counts
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Finish the sink and return it.
    pub fn finish(mut self) -> io::Result<S> {
        self.sink.finish()?;
        Ok(self.sink)
    }
}

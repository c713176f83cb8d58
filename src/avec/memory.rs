//! In-memory table sink.

use std::{
    collections::BTreeMap,
    io::{self, ErrorKind},
};

use super::{CellValue, TableSink};

/// One exported table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    /// Rows keyed by their index, starting from 1.
    pub rows: BTreeMap<usize, Vec<CellValue>>,
}

impl Table {
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(&index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The value in column `name` of row `index`.
    pub fn cell(&self, index: usize, name: &str) -> Option<&CellValue> {
        let column = self.header.iter().position(|h| h == name)?;
        self.row(index)?.get(column)
    }
}

/// Collects tables in memory, keyed by tag.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    tables: BTreeMap<String, Table>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, tag: &str) -> Option<&Table> {
        self.tables.get(tag)
    }

    pub fn tables(&self) -> &BTreeMap<String, Table> {
        &self.tables
    }

    pub fn into_tables(self) -> BTreeMap<String, Table> {
        self.tables
    }
}

impl TableSink for MemorySink {
    fn ensure_table(&mut self, tag: &str, header: &[&str]) -> io::Result<()> {
        self.tables.entry(tag.to_string()).or_insert_with(|| Table {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: BTreeMap::new(),
        });

        Ok(())
    }

    fn append_row(&mut self, tag: &str, row: usize, values: &[CellValue]) -> io::Result<()> {
        let table = self.tables.get_mut(tag).ok_or_else(|| {
            io::Error::new(ErrorKind::NotFound, format!("no table named {tag}"))
        })?;

        table.rows.insert(row, values.to_vec());

        Ok(())
    }
}

//! CSV table sink.
//!
//! _Requires Cargo feature `csv`._

use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use ::csv::Writer;
use log::debug;

use super::{CellValue, TableSink};

/// Writes each table to `<stem>_<tag>.csv` in a directory.
///
/// Files are created when their table is first seen, starting with the
/// header line. Rows are appended in the order they arrive.
#[derive(Debug)]
pub struct CsvSink {
    dir: PathBuf,
    stem: String,
    writers: BTreeMap<String, Writer<File>>,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            writers: BTreeMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file written for `tag`.
    pub fn path(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{}_{tag}.csv", self.stem))
    }

    /// Tags with a file written so far.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.writers.keys().map(String::as_str)
    }
}

impl TableSink for CsvSink {
    fn ensure_table(&mut self, tag: &str, header: &[&str]) -> io::Result<()> {
        if self.writers.contains_key(tag) {
            return Ok(());
        }

        let path = self.path(tag);
        debug!("Creating {}", path.display());

        let mut w = Writer::from_path(&path)?;
        w.write_record(header)?;
        self.writers.insert(tag.to_string(), w);

        Ok(())
    }

    fn append_row(&mut self, tag: &str, _row: usize, values: &[CellValue]) -> io::Result<()> {
        let w = self.writers.get_mut(tag).ok_or_else(|| {
            io::Error::new(ErrorKind::NotFound, format!("no table named {tag}"))
        })?;

        w.write_record(values.iter().map(CellValue::to_string))?;

        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        for w in self.writers.values_mut() {
            w.flush()?;
        }

        Ok(())
    }
}

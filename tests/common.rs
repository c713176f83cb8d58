use std::{collections::HashMap, io, path::Path};

use csv::ReaderBuilder;
use stdfrec::{
    avec::{CellValue, DecodeOptions, TableSink, Termination},
    sans::field::ByteOrder,
};

const PATH: &str = "fixtures/lot.stdf";

fn options() -> DecodeOptions {
    DecodeOptions::default().byte_order(ByteOrder::Little)
}

#[test]
fn decode_slice_lot() {
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    let summary = stdfrec::avec::decode_slice(&data, &mut validator, &options()).unwrap();
    validator.finish_check();

    assert_eq!(summary.records, 16);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.bytes, data.len() as u64);
    assert_eq!(summary.termination, Termination::EndOfStream { trailing: 0 });
}

#[test]
fn decode_reader_lot() {
    let mut file = std::fs::File::open(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    let summary = stdfrec::avec::decode_reader(&mut file, &mut validator, &options()).unwrap();
    validator.finish_check();

    assert_eq!(summary.records, 16);
    assert_eq!(summary.counts["PRR"], 2);
    assert_eq!(summary.counts["PIR"], 2);
    assert_eq!(summary.counts["MRR"], 1);
}

#[test]
fn decode_reader_lot_without_resynchronizing() {
    let mut file = std::fs::File::open(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    let options = options().resynchronize(false);
    let summary = stdfrec::avec::decode_reader(&mut file, &mut validator, &options).unwrap();
    validator.finish_check();

    assert_eq!(summary.records, 16);
}

/// Checks tables against `<fixture>.csv`, whose lines are a tag, a row index
/// (0 for the header), and the cells.
struct Validator {
    headers: HashMap<String, Vec<String>>,
    rows: HashMap<(String, usize), Vec<String>>,
}

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("csv");

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let mut headers = HashMap::new();
        let mut rows = HashMap::new();

        for r in reader.records() {
            let mut r: Vec<String> = r.unwrap().iter().map(|f| f.to_string()).collect();
            let tag = r.remove(0);
            let row: usize = r.remove(0).parse().unwrap();

            if row == 0 {
                headers.insert(tag, r);
            } else {
                rows.insert((tag, row), r);
            }
        }

        Self { headers, rows }
    }

    fn finish_check(&self) {
        assert!(self.rows.is_empty(), "rows never written: {:?}", self.rows.keys());
    }
}

impl TableSink for Validator {
    fn ensure_table(&mut self, tag: &str, header: &[&str]) -> io::Result<()> {
        let expected = self.headers.remove(tag).unwrap();
        assert_eq!(expected, header);
        Ok(())
    }

    fn append_row(&mut self, tag: &str, row: usize, values: &[CellValue]) -> io::Result<()> {
        let expected = self.rows.remove(&(tag.to_string(), row)).unwrap();
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        assert_eq!(expected, values, "{tag} row {row}");
        Ok(())
    }
}

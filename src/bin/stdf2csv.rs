//! Decode an STDF file into one CSV file per record kind.

use std::{fs::File, io::BufReader, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, ValueEnum};
use log::{LevelFilter, Log, Metadata, Record};

use stdfrec::{
    avec::{DecodeOptions, UnknownPolicy, csv::CsvSink, decode_reader},
    sans::field::ByteOrder,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to read.
    file: PathBuf,
    /// Directory receiving the CSV files.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Byte order of the record lengths and fields.
    #[arg(long, value_enum, default_value_t = Order::Native)]
    byte_order: Order,
    /// Decode straight from the file, without realigning after a bad record.
    #[arg(long)]
    no_resync: bool,
    /// Skip records of unknown type instead of stopping at them.
    #[arg(long)]
    skip_unknown: bool,
    /// Log more (repeat for per-frame detail).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Log errors only.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Order {
    Native,
    Little,
    Big,
}

impl From<Order> for ByteOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Native => Self::Native,
            Order::Little => Self::Little,
            Order::Big => Self::Big,
        }
    }
}

/// Writes log lines to standard error.
struct Stderr;

impl Log for Stderr {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: Stderr = Stderr;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }

    let file = match File::open(&args.file) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Error opening file {:?}: {error}", &args.file);
            return ExitCode::FAILURE;
        }
    };

    let stem = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdf".to_string());

    let options = DecodeOptions::default()
        .byte_order(args.byte_order.into())
        .resynchronize(!args.no_resync)
        .on_unknown(if args.skip_unknown {
            UnknownPolicy::Skip
        } else {
            UnknownPolicy::Stop
        });

    let mut sink = CsvSink::new(&args.out_dir, stem);

    let summary = match decode_reader(&mut BufReader::new(file), &mut sink, &options) {
        Ok(summary) => summary,
        Err(error) => {
            eprintln!("Error decoding file {:?}: {error}", &args.file);
            return ExitCode::FAILURE;
        }
    };

    for (tag, count) in &summary.counts {
        println!("{tag}\t{count}\t{}", sink.path(tag).display());
    }

    if summary.failures != 0 {
        eprintln!("{} records could not be decoded.", summary.failures);
    }

    ExitCode::SUCCESS
}

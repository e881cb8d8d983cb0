//! Decode an RDES stream and print its rows or codes.

use clap::Parser;
use log::debug;
use rowdelta::{codes, resignify, ColumnCode, Decoder, Variant};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rdes-dump")]
#[command(about = "Decode an RDES stream")]
struct Args {
    /// Encoded stream file
    input: PathBuf,

    /// Columns per row, as used when encoding
    #[arg(short, long)]
    columns: u8,

    /// Delta layout the stream was written with (rdes1, rdes2, rdes3)
    #[arg(long, default_value_t = Variant::Rdes2)]
    variant: Variant,

    /// Zero-based columns to print as signed readings, comma-separated
    #[arg(long, value_delimiter = ',')]
    signed: Vec<usize>,

    /// Print each column code with its offset instead of decoded rows
    #[arg(long)]
    codes: bool,
}

fn describe(code: ColumnCode) -> String {
    match code {
        ColumnCode::Raw(v) => format!("raw    {v}"),
        ColumnCode::Delta1 { add, magnitude } => format!("delta1 {}{magnitude}", if add { '+' } else { '-' }),
        ColumnCode::Delta2 { add, magnitude } => format!("delta2 {}{magnitude}", if add { '+' } else { '-' }),
        ColumnCode::Delta3 { add, magnitude } => format!("delta3 {}{magnitude}", if add { '+' } else { '-' }),
    }
}

fn dump_codes(bytes: &[u8], columns: usize, variant: Variant) -> Result<(), String> {
    for (i, item) in codes(bytes, variant).enumerate() {
        let (offset, code) = item.map_err(|e| e.to_string())?;
        println!("{offset:>8}  row {:<6} col {:<3} {}", i / columns, i % columns, describe(code));
    }
    Ok(())
}

fn dump_rows(bytes: &[u8], args: &Args) -> Result<(), String> {
    let mut decoder = Decoder::new(args.columns, args.variant).map_err(|e| e.to_string())?;
    let mut offset = 0;
    let mut rows = 0usize;
    while offset < bytes.len() {
        let (row, used) = decoder
            .decode_row(&bytes[offset..])
            .map_err(|e| format!("row {rows} at byte {offset}: {e}"))?;
        let fields: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, &v)| if args.signed.contains(&col) { resignify(v).to_string() } else { v.to_string() })
            .collect();
        println!("{}", fields.join(","));
        offset += used;
        rows += 1;
    }
    debug!("decoded {rows} rows from {} bytes", bytes.len());
    eprintln!(
        "{rows} rows, {} bytes in, {} bytes out",
        bytes.len(),
        rows * usize::from(args.columns) * 4
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let bytes = match fs::read(&args.input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: Failed to read {}: {e}", args.input.display());
            std::process::exit(1);
        }
    };

    let result = if args.codes {
        dump_codes(&bytes, usize::from(args.columns).max(1), args.variant)
    } else {
        dump_rows(&bytes, &args)
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

//! Compress tabular sensor data into an RDES stream.

use clap::Parser;
use log::{debug, warn};
use rand::Rng;
use rowdelta::{unsignify, Encoder, EncoderConfig, RangeCheck, Variant, WriteError};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rdes-pack")]
#[command(about = "Compress rows of sensor readings into an RDES stream")]
#[command(after_help = "CSV FORMAT:\n  \
    One row per line, one integer per column, separated by commas\n  \
    - Lines starting with # are comments\n  \
    - Empty lines are skipped\n  \
    - A first line that does not start with a digit or '-' is treated as a header\n  \
    - Columns listed in --signed hold i32 readings, all others u32\n\n\
CONFIG FILE:\n  \
    JSON with num_columns, refresh_interval, range_check (\"truncate\" or \"strict\")\n  \
    and variant (\"rdes1\", \"rdes2\" or \"rdes3\")")]
struct Args {
    /// Output file path
    output: PathBuf,

    /// Input CSV file (random drifting data is generated when omitted)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// JSON encoder config; overrides --refresh, --strict and --variant
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows to generate when no CSV is given
    #[arg(short, long, default_value = "288")]
    rows: usize,

    /// Columns to generate when no CSV is given
    #[arg(short, long, default_value = "4")]
    columns: u8,

    /// Delta rows between forced keyframes (0 = only the first row)
    #[arg(long, default_value = "0")]
    refresh: u16,

    /// Destination buffer size in bytes, as on the device
    #[arg(long, default_value = "65536")]
    capacity: usize,

    /// Zero-based columns holding signed readings, comma-separated
    #[arg(long, value_delimiter = ',')]
    signed: Vec<usize>,

    /// Reject values above 2^31-1 instead of truncating them
    #[arg(long)]
    strict: bool,

    /// Delta layout (rdes1, rdes2, rdes3)
    #[arg(long, default_value_t = Variant::Rdes2)]
    variant: Variant,
}

/// Read comma-separated rows, biasing signed columns into the unsigned domain
fn read_csv(path: &Path, signed: &[usize]) -> Result<Vec<Vec<u32>>, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open CSV: {e}"))?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Skip header line
        if rows.is_empty() && !trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            continue;
        }

        let row = trimmed
            .split(',')
            .enumerate()
            .map(|(col, field)| {
                let field = field.trim();
                let parsed = if signed.contains(&col) {
                    field.parse::<i32>().map(unsignify).map_err(|e| e.to_string())
                } else {
                    field.parse::<u32>().map_err(|e| e.to_string())
                };
                parsed.map_err(|e| format!("Line {}, column {col}: invalid value '{field}': {e}", line_num + 1))
            })
            .collect::<Result<Vec<u32>, String>>()?;
        rows.push(row);
    }

    Ok(rows)
}

/// Generate channels that drift slowly with occasional spikes
fn generate_rows(rows: usize, columns: u8) -> Vec<Vec<u32>> {
    let mut rng = rand::rng();
    let mut cur: Vec<u32> = (0..columns).map(|_| rng.random_range(0..1_000_000_000)).collect();
    let mut out = Vec::with_capacity(rows);

    for _ in 0..rows {
        for v in &mut cur {
            // roughly 2% of samples jump far enough to need a raw value
            let step: i64 = if rng.random_range(0..100) < 2 {
                rng.random_range(-10_000_000..=10_000_000)
            } else {
                rng.random_range(-200..=200)
            };
            *v = (i64::from(*v) + step).clamp(0, 0x7FFF_FFFF) as u32;
        }
        out.push(cur.clone());
    }

    out
}

fn load_config(args: &Args, num_columns: u8) -> Result<EncoderConfig, String> {
    let Some(path) = &args.config else {
        let range_check = if args.strict { RangeCheck::Strict } else { RangeCheck::Truncate };
        return Ok(EncoderConfig::new(num_columns)
            .with_refresh_interval(args.refresh)
            .with_range_check(range_check)
            .with_variant(args.variant));
    };
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read config: {e}"))?;
    let config: EncoderConfig = serde_json::from_str(&text).map_err(|e| format!("Invalid config: {e}"))?;
    if config.num_columns != num_columns {
        return Err(format!("Config has {} columns, data has {num_columns}", config.num_columns));
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), String> {
    let rows = match &args.csv {
        Some(path) => {
            let rows = read_csv(path, &args.signed)?;
            println!("Reading {} rows from CSV...", rows.len());
            rows
        }
        None => generate_rows(args.rows, args.columns),
    };

    let Some(first) = rows.first() else {
        return Err("No rows to encode".to_string());
    };
    let num_columns = u8::try_from(first.len())
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| format!("Rows must have 1-255 columns, got {}", first.len()))?;

    let config = load_config(args, num_columns)?;
    debug!("config: {config:?}");
    let mut enc = Encoder::new(config, vec![0u8; args.capacity]).map_err(|e| e.to_string())?;

    for (i, row) in rows.iter().enumerate() {
        match enc.write_row(row) {
            Ok(_) => {}
            Err(WriteError::BufferExhausted { needed, remaining }) => {
                warn!("buffer full at row {i}: needed {needed} bytes, {remaining} remaining");
                eprintln!("Warning: buffer full after {i} rows, remaining rows dropped");
                break;
            }
            Err(e) => eprintln!("Warning: Failed to write row {i}: {e}"),
        }
    }

    let mut file = File::create(&args.output).map_err(|e| format!("Failed to create output file: {e}"))?;
    file.write_all(enc.as_bytes()).map_err(|e| format!("Failed to write data: {e}"))?;

    println!("Encoded {} rows x {} columns ({})", enc.rows_written(), num_columns, enc.config().variant);
    println!("Keyframes: {}", enc.keyframes_written());
    println!("Output: {} ({} bytes)", args.output.display(), enc.size());
    if let Some(ratio) = enc.compression_ratio() {
        println!("Compression: {ratio:.2}x ({} bytes uncompressed)", enc.uncompressed_size());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

//! `rowdelta` - Row-oriented delta compression for fixed-width telemetry
//!
//! An RDES encoder for small devices that sample several channels together
//! and need to store them densely. Each row is a fixed number of `u32`
//! readings. Every column is written either as a short signed delta from the
//! column's previous value or, when the change is too large or a keyframe is
//! due, as a 4 byte raw value. RDES2, with 2 and 3 byte deltas, is the default;
//! RDES1 and RDES3 trade delta sizes differently (see [`Variant`]).
//!
//! # Features
//! - **Bounded output**: writes into a caller-owned buffer and never past its end
//! - **Row-atomic writes**: a row that does not fit is rejected whole
//! - **Keyframes**: periodic raw rows give a decoder recovery points
//! - **Self-describing codes**: one leading byte tells a reader what follows
//!
//! # Example
//! ```
//! use rowdelta::{decode, Encoder, RowKind, Variant};
//!
//! let mut storage = [0u8; 256];
//! let mut encoder = Encoder::with_columns(2, 0, &mut storage[..]).unwrap();
//!
//! assert_eq!(encoder.write_row(&[100, 100_000]).unwrap(), RowKind::Keyframe);
//! assert_eq!(encoder.size(), 8);
//!
//! assert_eq!(encoder.write_row(&[105, 99_995]).unwrap(), RowKind::Delta);
//! assert_eq!(encoder.size(), 12);
//!
//! encoder.write_row(&[50_000, 100_000]).unwrap();
//! assert_eq!(encoder.size(), 17);
//!
//! let rows = decode(encoder.as_bytes(), 2, Variant::Rdes2).unwrap();
//! assert_eq!(rows[2], vec![50_000, 100_000]);
//! ```
//!
//! # Wire Format
//!
//! The stream is a flat sequence of column codes, `num_columns` per row, with
//! no header, row delimiter, length prefix or checksum. The column count must
//! be known to the reader, as must the variant. RDES2 codes:
//!
//! | Code | Size | Byte 0 | Remaining bytes |
//! |------|------|--------|-----------------|
//! | Raw | 4 | `0` + value bits 30-24 | value bits 23-16, 15-8, 7-0 |
//! | Delta2 | 2 | `1`, sign, `0`, magnitude bits 12-8 | magnitude bits 7-0 |
//! | Delta3 | 3 | `1`, sign, `1`, magnitude bits 20-16 | magnitude bits 15-8, 7-0 |
//!
//! The sign bit is 1 when the magnitude is added to the previous value.
//!
//! ## Level selection
//!
//! | Variant | Delta1 | Delta2 | Delta3 | Raw |
//! |---------|--------|--------|--------|-----|
//! | RDES1 | - | - | 0 - 4,194,303 | larger |
//! | RDES2 | - | 0 - 8,191 | 8,192 - 2,097,151 | larger |
//! | RDES3 | 0 - 31 | 32 - 4,095 | 4,096 - 1,048,575 | larger |
//!
//! RDES1 and RDES3 keep the raw code and bit 6 sign, and lay out deltas as:
//!
//! | Variant | Code | Byte 0 | Magnitude bits |
//! |---------|------|--------|----------------|
//! | RDES1 | Delta3 | `1`, sign, 6 magnitude bits | 22 |
//! | RDES3 | Delta1 | `1`, sign, `0`, 5 magnitude bits | 5 |
//! | RDES3 | Delta2 | `1`, sign, `10`, 4 magnitude bits | 12 |
//! | RDES3 | Delta3 | `1`, sign, `11`, 4 magnitude bits | 20 |
//!
//! ## Supported Ranges
//! - Values: 0 to 2^31-1. Bit 31 is cleared before encoding; enable
//!   `RangeCheck::Strict` to reject such rows instead.
//! - Signed readings: ±1,073,741,823 after `unsignify`
//! - Columns: 1-255
//! - Refresh interval: 0 (off) to 65,535 delta rows

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

mod bias;
mod code;
mod config;
mod constants;
mod decoder;
mod encoder;
mod error;

#[cfg(test)]
mod tests;

// Re-export public API
pub use bias::{resignify, unsignify};
pub use code::{ColumnCode, Variant};
pub use config::{EncoderConfig, RangeCheck};
pub use decoder::{codes, decode, Codes, Decoder};
pub use encoder::{Encoder, EncoderState, RowKind};
pub use error::{ConfigError, DecodeError, StateMismatch, WriteError};

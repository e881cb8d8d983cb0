//! Stateful row encoder.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::bias;
use crate::code::ColumnCode;
use crate::config::{EncoderConfig, RangeCheck};
use crate::constants::{RAW_SIZE, VALUE_MASK};
use crate::error::{ConfigError, StateMismatch, WriteError};

/// How a row was stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Every column written as a raw value
    Keyframe,
    /// Columns written relative to the previous row
    Delta,
}

/// Encoder for RDES row streams
///
/// Writes into a caller-supplied buffer `B`, which may be a borrowed
/// `&mut [u8]`, a fixed `[u8; N]` arena or a `Vec<u8>`. The capacity is the
/// buffer's length at construction and is never exceeded: a row that does not
/// fit is rejected whole, leaving both the buffer and the encoder unchanged.
#[derive(Debug, Clone)]
pub struct Encoder<B> {
    config: EncoderConfig,
    buf: B,
    cursor: usize,
    /// Previous value per column, the base for the next delta
    last_values: Vec<u32>,
    initialized: bool,
    rows_since_keyframe: u16,
    rows_written: u64,
    keyframes_written: u64,
}

/// Resumable encoder state
///
/// Persist this next to the bytes written so far to continue the same stream
/// later with `Encoder::from_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderState {
    /// Bytes already written; the next row starts here
    pub cursor: usize,
    /// Previous value per column, already reduced to 31 bits
    pub last_values: Vec<u32>,
    /// Whether the first keyframe has been written
    pub initialized: bool,
    /// Delta rows since the last keyframe
    pub rows_since_keyframe: u16,
    /// Statistics carried over, see `Encoder::rows_written`
    pub rows_written: u64,
    /// See `Encoder::keyframes_written`
    pub keyframes_written: u64,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Encoder<B> {
    /// Create an encoder writing into `buf` from offset 0
    ///
    /// Nothing is written until the first row.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroColumns` if the config has no columns.
    pub fn new(config: EncoderConfig, buf: B) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            "encoder created: variant={} columns={} refresh_interval={} capacity={}",
            config.variant,
            config.num_columns,
            config.refresh_interval,
            buf.as_ref().len()
        );
        Ok(Self {
            config,
            buf,
            cursor: 0,
            last_values: vec![0; usize::from(config.num_columns)],
            initialized: false,
            rows_since_keyframe: 0,
            rows_written: 0,
            keyframes_written: 0,
        })
    }

    /// Shorthand for `Encoder::new(EncoderConfig::new(..).with_refresh_interval(..), buf)`
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroColumns` if `num_columns` is 0.
    pub fn with_columns(num_columns: u8, refresh_interval: u16, buf: B) -> Result<Self, ConfigError> {
        Self::new(EncoderConfig::new(num_columns).with_refresh_interval(refresh_interval), buf)
    }

    /// Continue a stream from a saved state
    ///
    /// `buf` must hold the bytes written before the state was taken and
    /// `config` must be the one they were written with; the next row is
    /// written at `state.cursor`.
    ///
    /// # Errors
    /// Returns an error if the config is invalid, the state has the wrong
    /// number of columns, or its cursor lies beyond the buffer.
    pub fn from_state(config: EncoderConfig, buf: B, state: EncoderState) -> Result<Self, ConfigError> {
        config.validate()?;
        let expected = usize::from(config.num_columns);
        if state.last_values.len() != expected {
            return Err(ConfigError::StateMismatch(StateMismatch::ColumnCount {
                expected,
                actual: state.last_values.len(),
            }));
        }
        let capacity = buf.as_ref().len();
        if state.cursor > capacity {
            return Err(ConfigError::StateMismatch(StateMismatch::Cursor { cursor: state.cursor, capacity }));
        }
        debug!("encoder resumed at byte {} after {} rows", state.cursor, state.rows_written);
        Ok(Self {
            config,
            buf,
            cursor: state.cursor,
            last_values: state.last_values,
            initialized: state.initialized,
            rows_since_keyframe: state.rows_since_keyframe,
            rows_written: state.rows_written,
            keyframes_written: state.keyframes_written,
        })
    }

    /// Compress one row and append it to the buffer
    ///
    /// The first row, and the row after every `refresh_interval` delta rows,
    /// is a keyframe. Other rows store each column as the smallest delta the
    /// variant has that fits, or as a raw value when none does.
    ///
    /// Under `RangeCheck::Truncate` bit 31 is cleared from every value before
    /// it is encoded or kept as the next base, so the decoder sees exactly the
    /// truncated value and later deltas stay correct.
    ///
    /// # Errors
    /// - `InvalidRowLength` if `row.len()` differs from the column count
    /// - `ValueOutOfRange` if strict range checking is on and a value uses bit 31
    /// - `BufferExhausted` if the encoded row does not fit
    ///
    /// On error nothing is written and the encoder state is unchanged.
    pub fn write_row(&mut self, row: &[u32]) -> Result<RowKind, WriteError> {
        let columns = self.last_values.len();
        if row.len() != columns {
            return Err(WriteError::InvalidRowLength { expected: columns, actual: row.len() });
        }
        if self.config.range_check == RangeCheck::Strict {
            if let Some((column, &value)) = row.iter().enumerate().find(|&(_, &v)| v > VALUE_MASK) {
                return Err(WriteError::ValueOutOfRange { column, value });
            }
        }

        let variant = self.config.variant;
        let keyframe = self.needs_keyframe();
        let needed = if keyframe {
            RAW_SIZE * columns
        } else {
            row.iter()
                .zip(&self.last_values)
                .map(|(&cur, &last)| ColumnCode::select(variant, last, cur & VALUE_MASK).len())
                .sum()
        };
        let remaining = self.remaining();
        if needed > remaining {
            return Err(WriteError::BufferExhausted { needed, remaining });
        }

        let out = self.buf.as_mut();
        for (column, (&input, last)) in row.iter().zip(self.last_values.iter_mut()).enumerate() {
            if input > VALUE_MASK {
                warn!("column {column}: value {input:#010x} truncated to 31 bits");
            }
            let cur = input & VALUE_MASK;
            let code = if keyframe { ColumnCode::Raw(cur) } else { ColumnCode::select(variant, *last, cur) };
            let (bytes, len) = code.pack(variant);
            out[self.cursor..self.cursor + len].copy_from_slice(&bytes[..len]);
            self.cursor += len;
            *last = cur;
        }
        self.rows_written += 1;

        if keyframe {
            if self.initialized {
                debug!("origin refresh after {} delta rows", self.rows_since_keyframe);
            }
            self.rows_since_keyframe = 0;
            self.initialized = true;
            self.keyframes_written += 1;
            trace!("row {}: keyframe, {needed} bytes", self.rows_written);
            Ok(RowKind::Keyframe)
        } else {
            self.rows_since_keyframe = self.rows_since_keyframe.saturating_add(1);
            trace!("row {}: delta, {needed} bytes", self.rows_written);
            Ok(RowKind::Delta)
        }
    }

    #[inline]
    fn needs_keyframe(&self) -> bool {
        let refresh = self.config.refresh_interval;
        !self.initialized || (refresh > 0 && self.rows_since_keyframe >= refresh)
    }

    /// Bytes written so far
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.cursor
    }

    /// Total buffer capacity in bytes
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Bytes still available
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.cursor
    }

    /// The encoded stream written so far
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[..self.cursor]
    }

    /// Give the buffer back to the caller
    #[must_use]
    pub fn into_inner(self) -> B {
        self.buf
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.last_values.len()
    }

    /// Rows accepted since creation or the last reset
    #[inline]
    #[must_use]
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Keyframe rows among `rows_written`
    #[inline]
    #[must_use]
    pub fn keyframes_written(&self) -> u64 {
        self.keyframes_written
    }

    /// Size the accepted rows would take as plain `u32` values
    #[inline]
    #[must_use]
    pub fn uncompressed_size(&self) -> u64 {
        self.rows_written * self.last_values.len() as u64 * RAW_SIZE as u64
    }

    /// Uncompressed over compressed size, or `None` before the first row
    #[must_use]
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.cursor == 0 {
            return None;
        }
        Some(self.uncompressed_size() as f64 / self.cursor as f64)
    }

    /// Snapshot the state needed to resume this stream
    #[must_use]
    pub fn state(&self) -> EncoderState {
        EncoderState {
            cursor: self.cursor,
            last_values: self.last_values.clone(),
            initialized: self.initialized,
            rows_since_keyframe: self.rows_since_keyframe,
            rows_written: self.rows_written,
            keyframes_written: self.keyframes_written,
        }
    }

    /// Discard everything written and start a new stream at offset 0
    ///
    /// The next row is a keyframe. Buffer contents are not cleared.
    pub fn reset(&mut self) {
        debug!("encoder reset after {} rows, {} bytes", self.rows_written, self.cursor);
        self.cursor = 0;
        self.last_values.fill(0);
        self.initialized = false;
        self.rows_since_keyframe = 0;
        self.rows_written = 0;
        self.keyframes_written = 0;
    }

    /// See `bias::unsignify`
    #[inline]
    #[must_use]
    pub const fn unsignify(value: i32) -> u32 {
        bias::unsignify(value)
    }
}

//! Decoding functionality for RDES row streams.

use crate::code::{ColumnCode, Variant};
use crate::error::DecodeError;

/// Decode a complete stream into rows
///
/// `num_columns` and `variant` must match the encoder's; the stream records
/// neither.
///
/// # Example
/// ```
/// use rowdelta::{decode, Encoder, Variant};
///
/// let mut enc = Encoder::with_columns(2, 0, vec![0u8; 64]).unwrap();
/// enc.write_row(&[100, 100_000]).unwrap();
/// enc.write_row(&[105, 99_995]).unwrap();
///
/// let rows = decode(enc.as_bytes(), 2, Variant::Rdes2).unwrap();
/// assert_eq!(rows, vec![vec![100, 100_000], vec![105, 99_995]]);
/// ```
///
/// # Errors
/// Returns an error if the stream is truncated, ends mid-row, or contains a
/// delta for a column with no preceding raw value.
#[must_use = "decoding returns rows that should be used"]
pub fn decode(buf: &[u8], num_columns: u8, variant: Variant) -> Result<Vec<Vec<u32>>, DecodeError> {
    let mut decoder = Decoder::new(num_columns, variant)?;
    let mut rows = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let (row, used) = decoder.decode_row_at(&buf[offset..], offset)?;
        rows.push(row);
        offset += used;
    }
    Ok(rows)
}

/// Iterate over the raw column codes of a `variant` stream
///
/// Yields `(offset, code)` pairs without tracking rows or columns.
#[must_use]
pub fn codes(buf: &[u8], variant: Variant) -> Codes<'_> {
    Codes { buf, variant, offset: 0 }
}

/// Iterator returned by `codes`
pub struct Codes<'a> {
    buf: &'a [u8],
    variant: Variant,
    offset: usize,
}

impl Iterator for Codes<'_> {
    type Item = Result<(usize, ColumnCode), DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.buf.len() {
            return None;
        }
        let offset = self.offset;
        match ColumnCode::parse(self.variant, &self.buf[offset..], offset) {
            Ok((code, len)) => {
                self.offset += len;
                Some(Ok((offset, code)))
            }
            Err(e) => {
                self.offset = self.buf.len();
                Some(Err(e))
            }
        }
    }
}

/// Incremental decoder holding the per-column bases
///
/// Use this when the stream arrives in pieces: feed it one row at a time and
/// it keeps the previous values between calls.
#[derive(Debug, Clone)]
pub struct Decoder {
    variant: Variant,
    bases: Vec<Option<u32>>,
}

impl Decoder {
    /// # Errors
    /// Returns `DecodeError::ZeroColumns` when `num_columns` is 0.
    pub fn new(num_columns: u8, variant: Variant) -> Result<Self, DecodeError> {
        if num_columns == 0 {
            return Err(DecodeError::ZeroColumns);
        }
        Ok(Self { variant, bases: vec![None; usize::from(num_columns)] })
    }

    #[inline]
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.bases.len()
    }

    #[inline]
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Decode one row from the front of `buf`
    ///
    /// Returns the row and the number of bytes it occupied. On error the
    /// decoder state is unchanged, so a caller that ran out of input can retry
    /// with more bytes.
    ///
    /// # Errors
    /// - `Truncated` if `buf` ends inside the row's first code
    /// - `PartialRow` if `buf` ends after some but not all columns
    /// - `DeltaWithoutBase` if a column's first code is a delta
    pub fn decode_row(&mut self, buf: &[u8]) -> Result<(Vec<u32>, usize), DecodeError> {
        self.decode_row_at(buf, 0)
    }

    fn decode_row_at(&mut self, buf: &[u8], stream_offset: usize) -> Result<(Vec<u32>, usize), DecodeError> {
        let mut row = Vec::with_capacity(self.bases.len());
        let mut pos = 0;
        for (column, base) in self.bases.iter().enumerate() {
            // parse only fails when the input runs out
            let (code, len) = ColumnCode::parse(self.variant, &buf[pos..], stream_offset + pos)
                .map_err(|e| if column > 0 { DecodeError::PartialRow { columns: column } } else { e })?;
            let value = match (code, base) {
                (ColumnCode::Raw(_), _) => code.apply(0),
                (_, Some(prev)) => code.apply(*prev),
                (_, None) => return Err(DecodeError::DeltaWithoutBase { column }),
            };
            row.push(value);
            pos += len;
        }
        for (base, &value) in self.bases.iter_mut().zip(&row) {
            *base = Some(value);
        }
        Ok((row, pos))
    }

    /// Forget all bases, as at the start of a new stream
    pub fn reset(&mut self) {
        self.bases.fill(None);
    }
}

//! Error types for rowdelta encoding and decoding operations.

use thiserror::Error;

/// Error returned when writing a row fails
///
/// A failed write leaves the destination buffer and the encoder state exactly
/// as they were before the call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// The encoded row does not fit in the remaining buffer capacity
    #[error("buffer exhausted: row needs {needed} bytes, {remaining} remaining")]
    BufferExhausted { needed: usize, remaining: usize },
    /// Row length differs from the configured column count
    #[error("row has {actual} columns, encoder expects {expected}")]
    InvalidRowLength { expected: usize, actual: usize },
    /// Value uses bit 31, which raw encoding cannot represent (strict mode only)
    #[error("value {value:#010x} in column {column} exceeds 31 bits")]
    ValueOutOfRange { column: usize, value: u32 },
}

/// Error returned when an encoder configuration is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one column is required
    #[error("column count must be between 1 and 255")]
    ZeroColumns,
    /// A restored state does not match the configuration or buffer
    #[error("encoder state does not match configuration: {0}")]
    StateMismatch(StateMismatch),
    /// Variant name not one of `rdes1`, `rdes2`, `rdes3`
    #[error("unknown variant, expected rdes1, rdes2 or rdes3")]
    UnknownVariant,
}

/// Which part of a restored state was inconsistent
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMismatch {
    /// `last_values` length differs from `num_columns`
    #[error("{actual} stored values for {expected} columns")]
    ColumnCount { expected: usize, actual: usize },
    /// Cursor lies beyond the buffer capacity
    #[error("cursor {cursor} beyond buffer capacity {capacity}")]
    Cursor { cursor: usize, capacity: usize },
}

/// Error returned when decoding fails
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A code's leading byte promises more bytes than remain
    #[error("truncated code at offset {offset}: needs {needed} bytes, {available} available")]
    Truncated { offset: usize, needed: usize, available: usize },
    /// A delta arrived for a column that has no base value yet
    #[error("delta code for column {column} before any raw value")]
    DeltaWithoutBase { column: usize },
    /// Stream ended in the middle of a row
    #[error("stream ends after {columns} columns of an incomplete row")]
    PartialRow { columns: usize },
    /// Decoder configured with no columns
    #[error("column count must be between 1 and 255")]
    ZeroColumns,
}

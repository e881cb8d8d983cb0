//! Per-column codes and their byte layout.
//!
//! Every column of every row is stored as exactly one code. Given the stream's
//! variant, the leading byte alone tells a reader which code follows. Raw
//! values are shared by all variants:
//!
//! | Code | Size | Byte 0 | Remaining |
//! |------|------|--------|-----------|
//! | `Raw` | 4 | `0vvvvvvv` (value bits 30-24) | value bits 23-16, 15-8, 7-0 |
//!
//! Deltas differ per variant (`s` is 1 when the magnitude is added to the
//! previous value, 0 when it is subtracted):
//!
//! | Variant | Code | Size | Byte 0 | Magnitude bits |
//! |---------|------|------|--------|----------------|
//! | RDES1 | `Delta3` | 3 | `1smmmmmm` | 22 |
//! | RDES2 | `Delta2` | 2 | `1s0mmmmm` | 13 |
//! | RDES2 | `Delta3` | 3 | `1s1mmmmm` | 21 |
//! | RDES3 | `Delta1` | 1 | `1s0mmmmm` | 5 |
//! | RDES3 | `Delta2` | 2 | `1s10mmmm` | 12 |
//! | RDES3 | `Delta3` | 3 | `1s11mmmm` | 20 |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DELTA_HEAD_MASK, FLAG_ADD, FLAG_DELTA, FLAG_LONG, FLAG_WIDE, LVL_2_MAX, LVL_3_MAX, RAW_HEAD_MASK, RAW_SIZE,
    RDES1_HEAD_MASK, RDES1_LVL_3_MAX, RDES3_LVL_1_MAX, RDES3_LVL_2_MAX, RDES3_LVL_3_MAX, RDES3_WIDE_HEAD_MASK,
    VALUE_MASK,
};
use crate::error::{ConfigError, DecodeError};

/// Delta layout family
///
/// The variant is not recorded in the stream; encoder and decoder must agree
/// on it, as they must on the column count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// A single 3-byte delta level carrying 22 bits
    Rdes1,
    /// 2 and 3-byte deltas carrying 13 and 21 bits
    #[default]
    Rdes2,
    /// 1, 2 and 3-byte deltas carrying 5, 12 and 20 bits
    Rdes3,
}

impl Variant {
    /// Largest delta magnitude the variant stores without a raw fallback
    #[inline]
    #[must_use]
    pub const fn max_delta(self) -> u32 {
        match self {
            Self::Rdes1 => RDES1_LVL_3_MAX,
            Self::Rdes2 => LVL_3_MAX,
            Self::Rdes3 => RDES3_LVL_3_MAX,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rdes1 => "rdes1",
            Self::Rdes2 => "rdes2",
            Self::Rdes3 => "rdes3",
        })
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    /// Accepts `rdes1`..`rdes3` in any case, or the bare digit
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rdes1" | "1" => Ok(Self::Rdes1),
            "rdes2" | "2" => Ok(Self::Rdes2),
            "rdes3" | "3" => Ok(Self::Rdes3),
            _ => Err(ConfigError::UnknownVariant),
        }
    }
}

/// A single encoded column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCode {
    /// Full value; bit 31 is dropped on the wire
    Raw(u32),
    /// 1-byte delta (RDES3 only)
    Delta1 { add: bool, magnitude: u32 },
    /// 2-byte delta (RDES2 and RDES3)
    Delta2 { add: bool, magnitude: u32 },
    /// 3-byte delta (all variants)
    Delta3 { add: bool, magnitude: u32 },
}

impl ColumnCode {
    /// Pick the smallest code `variant` has that carries `cur` relative to `last`
    ///
    /// Falls back to `Raw(cur)` when the magnitude exceeds `variant.max_delta()`.
    #[inline]
    #[must_use]
    pub const fn select(variant: Variant, last: u32, cur: u32) -> Self {
        let add = cur >= last;
        let magnitude = if add { cur - last } else { last - cur };
        match variant {
            Variant::Rdes1 => {
                if magnitude <= RDES1_LVL_3_MAX {
                    Self::Delta3 { add, magnitude }
                } else {
                    Self::Raw(cur)
                }
            }
            Variant::Rdes2 => {
                if magnitude <= LVL_2_MAX {
                    Self::Delta2 { add, magnitude }
                } else if magnitude <= LVL_3_MAX {
                    Self::Delta3 { add, magnitude }
                } else {
                    Self::Raw(cur)
                }
            }
            Variant::Rdes3 => {
                if magnitude <= RDES3_LVL_1_MAX {
                    Self::Delta1 { add, magnitude }
                } else if magnitude <= RDES3_LVL_2_MAX {
                    Self::Delta2 { add, magnitude }
                } else if magnitude <= RDES3_LVL_3_MAX {
                    Self::Delta3 { add, magnitude }
                } else {
                    Self::Raw(cur)
                }
            }
        }
    }

    /// Encoded size in bytes
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Raw(_) => RAW_SIZE,
            Self::Delta1 { .. } => 1,
            Self::Delta2 { .. } => 2,
            Self::Delta3 { .. } => 3,
        }
    }

    /// Size of the code introduced by `head` in a `variant` stream
    #[inline]
    #[must_use]
    pub const fn len_from_head(variant: Variant, head: u8) -> usize {
        if head & FLAG_DELTA == 0 {
            return RAW_SIZE;
        }
        match variant {
            Variant::Rdes1 => 3,
            Variant::Rdes2 => {
                if head & FLAG_WIDE == 0 {
                    2
                } else {
                    3
                }
            }
            Variant::Rdes3 => {
                if head & FLAG_WIDE == 0 {
                    1
                } else if head & FLAG_LONG == 0 {
                    2
                } else {
                    3
                }
            }
        }
    }

    /// Pack into bytes for a `variant` stream
    ///
    /// Only the first `len` returned bytes are meaningful. A delta shorter
    /// than any level `variant` has is widened to its smallest level, so `len`
    /// can exceed `self.len()` for codes not produced by `select` with the
    /// same variant. Magnitude bits beyond the level's width are dropped.
    #[inline]
    #[must_use]
    pub const fn pack(self, variant: Variant) -> ([u8; 4], usize) {
        let (add, magnitude, len) = match self {
            Self::Raw(value) => {
                return (
                    [
                        (value >> 24) as u8 & RAW_HEAD_MASK,
                        (value >> 16) as u8,
                        (value >> 8) as u8,
                        value as u8,
                    ],
                    RAW_SIZE,
                );
            }
            Self::Delta1 { add, magnitude } => (add, magnitude, 1),
            Self::Delta2 { add, magnitude } => (add, magnitude, 2),
            Self::Delta3 { add, magnitude } => (add, magnitude, 3),
        };
        let sign = if add { FLAG_DELTA | FLAG_ADD } else { FLAG_DELTA };
        match (variant, len) {
            (Variant::Rdes1, _) => {
                let head = sign | ((magnitude >> 16) as u8 & RDES1_HEAD_MASK);
                ([head, (magnitude >> 8) as u8, magnitude as u8, 0], 3)
            }
            (Variant::Rdes2, 1 | 2) => {
                let head = sign | ((magnitude >> 8) as u8 & DELTA_HEAD_MASK);
                ([head, magnitude as u8, 0, 0], 2)
            }
            (Variant::Rdes2, _) => {
                let head = sign | FLAG_WIDE | ((magnitude >> 16) as u8 & DELTA_HEAD_MASK);
                ([head, (magnitude >> 8) as u8, magnitude as u8, 0], 3)
            }
            (Variant::Rdes3, 1) => ([sign | (magnitude as u8 & DELTA_HEAD_MASK), 0, 0, 0], 1),
            (Variant::Rdes3, 2) => {
                let head = sign | FLAG_WIDE | ((magnitude >> 8) as u8 & RDES3_WIDE_HEAD_MASK);
                ([head, magnitude as u8, 0, 0], 2)
            }
            (Variant::Rdes3, _) => {
                let head = sign | FLAG_WIDE | FLAG_LONG | ((magnitude >> 16) as u8 & RDES3_WIDE_HEAD_MASK);
                ([head, (magnitude >> 8) as u8, magnitude as u8, 0], 3)
            }
        }
    }

    /// Parse one code from the front of `buf`
    ///
    /// `offset` is the position of `buf` within the whole stream and is only
    /// used for error reporting.
    ///
    /// # Errors
    /// Returns `DecodeError::Truncated` if `buf` ends inside the code.
    pub fn parse(variant: Variant, buf: &[u8], offset: usize) -> Result<(Self, usize), DecodeError> {
        let Some(&head) = buf.first() else {
            return Err(DecodeError::Truncated { offset, needed: 1, available: 0 });
        };
        let len = Self::len_from_head(variant, head);
        if buf.len() < len {
            return Err(DecodeError::Truncated { offset, needed: len, available: buf.len() });
        }

        if head & FLAG_DELTA == 0 {
            return Ok((Self::Raw(u32::from_be_bytes([head, buf[1], buf[2], buf[3]])), len));
        }
        let add = head & FLAG_ADD != 0;
        let top_mask = match (variant, len) {
            (Variant::Rdes1, _) => RDES1_HEAD_MASK,
            (Variant::Rdes3, 2 | 3) => RDES3_WIDE_HEAD_MASK,
            _ => DELTA_HEAD_MASK,
        };
        let top = u32::from(head & top_mask);
        let code = match len {
            1 => Self::Delta1 { add, magnitude: top },
            2 => Self::Delta2 { add, magnitude: (top << 8) | u32::from(buf[1]) },
            _ => Self::Delta3 { add, magnitude: (top << 16) | (u32::from(buf[1]) << 8) | u32::from(buf[2]) },
        };
        Ok((code, len))
    }

    /// Reconstruct a value from the column's previous value
    ///
    /// Raw codes ignore `base` and yield the 31 bits that reach the wire.
    #[inline]
    #[must_use]
    pub const fn apply(self, base: u32) -> u32 {
        match self {
            Self::Raw(value) => value & VALUE_MASK,
            Self::Delta1 { add, magnitude } | Self::Delta2 { add, magnitude } | Self::Delta3 { add, magnitude } => {
                if add {
                    base.wrapping_add(magnitude)
                } else {
                    base.wrapping_sub(magnitude)
                }
            }
        }
    }

    /// Whether this is a raw value rather than a delta
    #[inline]
    #[must_use]
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

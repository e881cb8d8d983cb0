//! Encoder configuration.

use serde::{Deserialize, Serialize};

use crate::code::Variant;
use crate::error::ConfigError;

/// How values that use bit 31 are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeCheck {
    /// Drop bit 31 silently, as the wire format has always done
    #[default]
    Truncate,
    /// Reject the row with `WriteError::ValueOutOfRange`
    Strict,
}

/// Construction parameters for an `Encoder`
///
/// The decoder must be told the same `num_columns` and `variant`; neither is
/// stored in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Values per row (1-255)
    pub num_columns: u8,
    /// Delta rows between forced keyframes; 0 disables periodic keyframes
    #[serde(default)]
    pub refresh_interval: u16,
    #[serde(default)]
    pub range_check: RangeCheck,
    /// Delta layout; RDES2 unless set
    #[serde(default)]
    pub variant: Variant,
}

impl EncoderConfig {
    /// RDES2 config with no periodic refresh and truncating range check
    #[inline]
    #[must_use]
    pub const fn new(num_columns: u8) -> Self {
        Self { num_columns, refresh_interval: 0, range_check: RangeCheck::Truncate, variant: Variant::Rdes2 }
    }

    #[inline]
    #[must_use]
    pub const fn with_refresh_interval(mut self, refresh_interval: u16) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_range_check(mut self, range_check: RangeCheck) -> Self {
        self.range_check = range_check;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Check the parameters
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroColumns` when `num_columns` is 0.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.num_columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        Ok(())
    }
}

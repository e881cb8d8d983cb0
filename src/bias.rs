//! Bias transform between signed readings and the unsigned encoder domain.
//!
//! Readings within ±1,073,741,823 stay inside the 31-bit raw range after
//! biasing. Anything outside wraps with 32-bit arithmetic and no check is made.

use crate::constants::SIGN_BIAS;

/// Shift a signed reading into the unsigned domain expected by `Encoder::write_row`
#[inline]
#[must_use]
pub const fn unsignify(value: i32) -> u32 {
    (value as u32).wrapping_add(SIGN_BIAS)
}

/// Undo `unsignify`
#[inline]
#[must_use]
pub const fn resignify(value: u32) -> i32 {
    value.wrapping_sub(SIGN_BIAS) as i32
}

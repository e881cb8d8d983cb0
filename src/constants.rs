//! Wire format constants shared by the encoder and decoder.

/// RDES2: largest magnitude stored in a 2-byte delta (13 bits)
pub(crate) const LVL_2_MAX: u32 = 8_191;

/// RDES2: largest magnitude stored in a 3-byte delta (21 bits)
pub(crate) const LVL_3_MAX: u32 = 2_097_151;

/// RDES1: largest magnitude stored in its only, 3-byte, delta (22 bits)
pub(crate) const RDES1_LVL_3_MAX: u32 = 4_194_303;

/// RDES3: largest magnitude stored in a 1-byte delta (5 bits)
pub(crate) const RDES3_LVL_1_MAX: u32 = 31;

/// RDES3: largest magnitude stored in a 2-byte delta (12 bits)
pub(crate) const RDES3_LVL_2_MAX: u32 = 4_095;

/// RDES3: largest magnitude stored in a 3-byte delta (20 bits)
pub(crate) const RDES3_LVL_3_MAX: u32 = 1_048_575;

/// Bytes used by a raw value
pub(crate) const RAW_SIZE: usize = 4;

/// Byte 0, bit 7: set for delta codes, clear for raw values
pub(crate) const FLAG_DELTA: u8 = 0b1000_0000;

/// Byte 0, bit 6: set when the delta is added to the previous value
pub(crate) const FLAG_ADD: u8 = 0b0100_0000;

/// Byte 0, bit 5: RDES2 3-byte delta, or RDES3 multi-byte delta
pub(crate) const FLAG_WIDE: u8 = 0b0010_0000;

/// Byte 0, bit 4: RDES3 3-byte delta (only meaningful with `FLAG_WIDE`)
pub(crate) const FLAG_LONG: u8 = 0b0001_0000;

/// Magnitude bits carried in byte 0 of an RDES2 delta or an RDES3 1-byte delta
pub(crate) const DELTA_HEAD_MASK: u8 = 0b0001_1111;

/// Magnitude bits carried in byte 0 of an RDES1 delta
pub(crate) const RDES1_HEAD_MASK: u8 = 0b0011_1111;

/// Magnitude bits carried in byte 0 of an RDES3 2 or 3-byte delta
pub(crate) const RDES3_WIDE_HEAD_MASK: u8 = 0b0000_1111;

/// Value bits carried in byte 0 of a raw code
pub(crate) const RAW_HEAD_MASK: u8 = 0b0111_1111;

/// Bits that survive raw encoding
pub(crate) const VALUE_MASK: u32 = 0x7FFF_FFFF;

/// Offset applied by `unsignify`: ((2^30) - 1) / 2
pub(crate) const SIGN_BIAS: u32 = 536_870_911;

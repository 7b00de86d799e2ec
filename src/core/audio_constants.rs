/// Fractional bits carried by subband samples on top of the 16-bit pcm scale
pub const SUBBAND_FRAC_BITS: u32 = 10;

/// Fractional bits of the prototype window coefficients (Q16)
pub const WINDOW_FRAC_BITS: u32 = 16;

/// Fractional bits of the cosine modulation matrices (Q14)
pub const COSINE_FRAC_BITS: u32 = 14;

/// Largest scale factor that fits the 4-bit field
pub const MAX_SCALE_FACTOR: u8 = 15;

/// Widest code a subband can be given
pub const MAX_SUBBAND_BITS: u8 = 16;

/// Maximum positive value for 16-bit signed integer (2^15 - 1)
pub const I16_MAX: i64 = i16::MAX as i64;

/// Minimum value for 16-bit signed integer (-2^15)
pub const I16_MIN: i64 = i16::MIN as i64;

/// Clamp a wide accumulator to a pcm sample
#[inline]
pub fn saturate_i16(value: i64) -> i16 {
    value.clamp(I16_MIN, I16_MAX) as i16
}

/// Arithmetic shift right, rounding half up
#[inline]
pub fn round_shift(value: i64, shift: u32) -> i64 {
    if shift == 0 {
        value
    } else {
        (value + (1i64 << (shift - 1))) >> shift
    }
}

/// Saturate a wide value into the 32-bit sample domain
#[inline]
pub fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

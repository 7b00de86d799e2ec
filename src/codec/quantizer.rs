//! Scale factors and uniform quantization of subband samples
//!
//! Samples are in pcm units with `SUBBAND_FRAC_BITS` fractional bits. A scale factor `sf`
//! bounds a subband to `(-2^(sf+1), 2^(sf+1))` and a subband given `bits` bits is split into
//! `2^bits - 1` equal cells over that range. Decoding returns the cell midpoint.

use crate::core::audio_constants::{MAX_SCALE_FACTOR, MAX_SUBBAND_BITS, SUBBAND_FRAC_BITS};

/// Smallest scale factor whose range holds `max_abs`, saturating at 15
pub fn scale_factor(max_abs: u32) -> u8 {
    let mut sf = 0u8;
    while sf < MAX_SCALE_FACTOR && max_abs as u64 >= 1u64 << (sf as u32 + 1 + SUBBAND_FRAC_BITS) {
        sf += 1;
    }
    sf
}

/// Scale factor for a run of samples
pub fn scale_factor_of(samples: impl IntoIterator<Item = i32>) -> u8 {
    let max_abs = samples
        .into_iter()
        .map(|s| s.unsigned_abs())
        .max()
        .unwrap_or(0);
    scale_factor(max_abs)
}

/// Number of quantization levels for a bit width
#[inline]
pub fn levels(bits: u8) -> u32 {
    (1u32 << bits.min(MAX_SUBBAND_BITS)) - 1
}

/// Quantize one sample.
///
/// Picks the nearest level. With an odd level count no sample inside the scale factor range
/// sits exactly between two levels, so the mapping is symmetric about zero:
/// `quantize(-x) == levels - 1 - quantize(x)`. Samples outside the range saturate to the
/// outermost level. Zero bits yields code 0.
pub fn quantize(sample: i32, scale_factor: u8, bits: u8) -> u16 {
    if bits == 0 {
        return 0;
    }

    let levels = levels(bits) as i64;
    let shift = scale_factor.min(MAX_SCALE_FACTOR) as u32 + 1 + SUBBAND_FRAC_BITS;

    let code = (((sample as i64 * levels) >> shift) + levels) >> 1;
    code.clamp(0, levels - 1) as u16
}

/// Reconstruct the midpoint of a code's cell. Zero bits reconstructs silence.
pub fn dequantize(code: u16, scale_factor: u8, bits: u8) -> i32 {
    if bits == 0 {
        return 0;
    }

    let levels = levels(bits) as i64;
    let shift = scale_factor.min(MAX_SCALE_FACTOR) as u32 + 1 + SUBBAND_FRAC_BITS;
    let code = (code as i64).min(levels - 1);

    let scaled = ((2 * code + 1) << shift) + (levels >> 1);
    (scaled / levels - (1i64 << shift)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor_bounds() {
        let one = 1u32 << SUBBAND_FRAC_BITS;
        assert_eq!(scale_factor(0), 0);
        assert_eq!(scale_factor(one), 0);
        assert_eq!(scale_factor(2 * one - 1), 0);
        assert_eq!(scale_factor(2 * one), 1);
        assert_eq!(scale_factor(u32::MAX), MAX_SCALE_FACTOR);
    }

    #[test]
    fn test_zero_is_a_level() {
        for bits in 1..=16 {
            for sf in 0..=15 {
                let code = quantize(0, sf, bits);
                assert_eq!(dequantize(code, sf, bits), 0, "bits {bits} sf {sf}");
            }
        }
    }
}

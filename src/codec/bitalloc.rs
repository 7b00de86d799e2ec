//! Bit allocation
//!
//! Both sides derive the allocation from the header and the scale factors alone, so the encoder
//! and decoder always agree without any allocation data on the wire. A per-subband bit need is
//! computed first, then bits are handed out in slices from the neediest subbands down until the
//! bitpool is spent.

use super::quantizer::scale_factor_of;
use super::tables::loudness_offsets;
use crate::core::audio_constants::MAX_SUBBAND_BITS;
use crate::core::{
    AllocationMethod, BitAllocation, Config, ScaleFactors, SubbandMatrix, MAX_BLOCKS,
    MAX_CHANNELS, MAX_SUBBANDS,
};

/// lowest bit need any subband can have (loudness, silent subband)
const MIN_BITNEED: i32 = -5;

/// Allocate bits for one frame.
///
/// Stereo and joint stereo share a single bitpool across both channels; mono and dual channel
/// give every channel its own. The per-block total never exceeds the bitpool (per channel for
/// dual channel).
pub fn allocate(config: &Config, scale_factors: &ScaleFactors) -> BitAllocation {
    let channels = config.channels();
    let subbands = config.subbands;
    let bitpool = config.bitpool as i32;

    let mut need = [[0i32; MAX_SUBBANDS]; MAX_CHANNELS];
    for (ch, row) in need.iter_mut().enumerate().take(channels) {
        *row = bitneed(config, &scale_factors[ch]);
    }

    let mut bits = [[0u8; MAX_SUBBANDS]; MAX_CHANNELS];
    if config.mode.shares_bitpool() {
        distribute(&need[..channels], subbands, bitpool, &mut bits[..channels]);
    } else {
        for ch in 0..channels {
            distribute(
                &need[ch..ch + 1],
                subbands,
                bitpool,
                &mut bits[ch..ch + 1],
            );
        }
    }

    bits
}

/// Bit need of every subband of one channel
pub fn bitneed(config: &Config, scale_factors: &[u8; MAX_SUBBANDS]) -> [i32; MAX_SUBBANDS] {
    let mut need = [0i32; MAX_SUBBANDS];
    let subbands = config.subbands;

    match config.allocation {
        AllocationMethod::Snr => {
            for (n, &sf) in need.iter_mut().zip(scale_factors.iter()).take(subbands) {
                *n = sf as i32;
            }
        }
        AllocationMethod::Loudness => {
            let offsets = loudness_offsets(subbands, config.frequency);
            for sb in 0..subbands {
                let sf = scale_factors[sb] as i32;
                need[sb] = if sf == 0 {
                    MIN_BITNEED
                } else {
                    let loudness = sf - offsets[sb];
                    if loudness > 0 {
                        loudness / 2
                    } else {
                        loudness
                    }
                };
            }
        }
    }

    need
}

/// Spend `bitpool` over the channels in `need`, writing into `bits`
fn distribute(
    need: &[[i32; MAX_SUBBANDS]],
    subbands: usize,
    bitpool: i32,
    bits: &mut [[u8; MAX_SUBBANDS]],
) {
    let channels = need.len();
    let needs = || need.iter().flat_map(move |row| row[..subbands].iter().copied());

    let max_need = needs().max().unwrap_or(0);
    let min_need = needs().min().unwrap_or(0);

    // walk the slice level down until the next slice would overshoot
    let mut bitcount = 0;
    let mut slicecount = 0;
    let mut bitslice = max_need + 1;
    loop {
        bitslice -= 1;
        bitcount += slicecount;
        slicecount = 0;
        for n in needs() {
            if n > bitslice + 1 && n < bitslice + 16 {
                slicecount += 1;
            } else if n == bitslice + 1 {
                slicecount += 2;
            }
        }

        if bitcount + slicecount >= bitpool || bitslice + 16 <= min_need {
            break;
        }
    }

    if bitcount + slicecount == bitpool {
        bitcount += slicecount;
        bitslice -= 1;
    }

    for (row, need_row) in bits.iter_mut().zip(need.iter()) {
        for sb in 0..subbands {
            let n = need_row[sb];
            row[sb] = if n < bitslice + 2 {
                0
            } else {
                (n - bitslice).min(MAX_SUBBAND_BITS as i32) as u8
            };
        }
    }

    // leftovers: widen the subbands that already have bits, or open the ones right at the edge
    let mut sb = 0;
    let mut ch = 0;
    while bitcount < bitpool && sb < subbands {
        let b = &mut bits[ch][sb];
        if *b >= 2 && *b < MAX_SUBBAND_BITS {
            *b += 1;
            bitcount += 1;
        } else if need[ch][sb] == bitslice + 1 && bitpool > bitcount + 1 {
            *b = 2;
            bitcount += 2;
        }

        ch += 1;
        if ch == channels {
            ch = 0;
            sb += 1;
        }
    }

    // then one more bit anywhere there is room
    let mut sb = 0;
    let mut ch = 0;
    while bitcount < bitpool && sb < subbands {
        let b = &mut bits[ch][sb];
        if *b < MAX_SUBBAND_BITS {
            *b += 1;
            bitcount += 1;
        }

        ch += 1;
        if ch == channels {
            ch = 0;
            sb += 1;
        }
    }
}

/// Choose the joint stereo subbands for one frame and rewrite them as mid/side in place.
///
/// A subband switches to mid/side when that lowers the sum of its two scale factors. The last
/// subband always stays left/right. `scale_factors` must hold the left/right factors on entry
/// and is updated for the subbands that switch.
pub fn select_joint_subbands(
    samples: &mut SubbandMatrix<i32>,
    blocks: usize,
    subbands: usize,
    scale_factors: &mut ScaleFactors,
) -> [bool; MAX_SUBBANDS] {
    let mut join = [false; MAX_SUBBANDS];

    for sb in 0..subbands.saturating_sub(1) {
        let mut mid_side = [(0i32, 0i32); MAX_BLOCKS];
        for (ms, block) in mid_side.iter_mut().zip(samples.iter()).take(blocks) {
            let l = block[0][sb] as i64;
            let r = block[1][sb] as i64;
            *ms = (((l + r) >> 1) as i32, ((l - r) >> 1) as i32);
        }

        let sf_mid = scale_factor_of(mid_side[..blocks].iter().map(|ms| ms.0));
        let sf_side = scale_factor_of(mid_side[..blocks].iter().map(|ms| ms.1));

        let lr_cost = scale_factors[0][sb] as u32 + scale_factors[1][sb] as u32;
        if (sf_mid as u32 + sf_side as u32) < lr_cost {
            join[sb] = true;
            scale_factors[0][sb] = sf_mid;
            scale_factors[1][sb] = sf_side;
            for (block, &(m, s)) in samples.iter_mut().zip(mid_side.iter()).take(blocks) {
                block[0][sb] = m;
                block[1][sb] = s;
            }
        }
    }

    join
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChannelMode, Frequency};

    #[test]
    fn test_msbc_silence_allocation() {
        let config = Config::msbc();
        let bits = allocate(&config, &[[0; MAX_SUBBANDS]; MAX_CHANNELS]);
        assert_eq!(bits[0], [4, 4, 3, 3, 3, 3, 3, 3]);
    }

    #[test]
    fn test_snr_need_is_scale_factor() {
        let config = Config::new(4, 16, Frequency::Freq44k1).with_allocation(AllocationMethod::Snr);
        let need = bitneed(&config, &[3, 1, 4, 1, 0, 0, 0, 0]);
        assert_eq!(&need[..4], &[3, 1, 4, 1]);
    }

    #[test]
    fn test_joint_keeps_last_subband() {
        let mut samples = [[[0i32; MAX_SUBBANDS]; MAX_CHANNELS]; MAX_BLOCKS];
        for blk in samples.iter_mut() {
            for ch in blk.iter_mut() {
                ch[..4].copy_from_slice(&[5000, 5000, 5000, 5000]);
            }
        }
        let mut sf = [[0u8; MAX_SUBBANDS]; MAX_CHANNELS];
        for ch in sf.iter_mut() {
            ch[..4].fill(scale_factor_of([5000]));
        }

        let config = Config::new(4, 8, Frequency::Freq44k1).with_mode(ChannelMode::JointStereo);
        let join = select_joint_subbands(&mut samples, config.blocks, config.subbands, &mut sf);
        assert_eq!(&join[..4], &[true, true, true, false]);
        assert_eq!(samples[0][1][0], 0);
        assert_eq!(samples[0][0][3], 5000);
    }

    #[test]
    fn test_joint_rewrites_mid_side() {
        let mut samples = [[[0i32; MAX_SUBBANDS]; MAX_CHANNELS]; MAX_BLOCKS];
        for (blk, block) in samples.iter_mut().enumerate().take(8) {
            let sign = if blk % 2 == 0 { 1 } else { -1 };
            block[0][..4].fill(sign * 6000);
            block[1][..4].fill(sign * 5000);
        }
        let mut sf = [[0u8; MAX_SUBBANDS]; MAX_CHANNELS];
        sf[0][..4].fill(scale_factor_of([6000]));
        sf[1][..4].fill(scale_factor_of([5000]));

        let join = select_joint_subbands(&mut samples, 8, 4, &mut sf);
        assert_eq!(&join[..4], &[true, true, true, false]);

        // mid and side for every block of a joined subband
        assert_eq!((samples[0][0][0], samples[0][1][0]), (5500, 500));
        assert_eq!((samples[1][0][2], samples[1][1][2]), (-5500, -500));
        assert_eq!(sf[0][0], scale_factor_of([5500]));
        assert_eq!(sf[1][0], scale_factor_of([500]));

        // the last subband and the blocks past the frame are untouched
        assert_eq!((samples[0][0][3], samples[0][1][3]), (6000, 5000));
        assert_eq!(samples[8][0][0], 0);
    }
}

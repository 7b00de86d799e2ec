//! Polyphase cosine-modulated filter banks, fixed point.
//!
//! Analysis turns `subbands` new pcm samples into one sample per subband; synthesis does the
//! reverse. Both keep their history in a fixed ring per channel, indexed by an offset that
//! walks backwards so that logical index 0 is always the newest entry.

use super::tables::{
    ANALYSIS_MATRIX_4, ANALYSIS_MATRIX_8, ANALYSIS_WINDOW_4, ANALYSIS_WINDOW_8,
    SYNTHESIS_MATRIX_4, SYNTHESIS_MATRIX_8, SYNTHESIS_WINDOW_4, SYNTHESIS_WINDOW_8,
};
use crate::core::audio_constants::{
    round_shift, saturate_i16, saturate_i32, COSINE_FRAC_BITS, SUBBAND_FRAC_BITS,
    WINDOW_FRAC_BITS,
};
use crate::core::{MAX_CHANNELS, MAX_SUBBANDS};

/// Analysis history: 10 blocks of input
const ANALYSIS_LEN: usize = 10 * MAX_SUBBANDS;

/// Synthesis history: 10 blocks of twice-upsampled matrix output
const SYNTHESIS_LEN: usize = 20 * MAX_SUBBANDS;

/// Encoder side filter bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFilterBank {
    /// Number of subbands (4 or 8)
    subbands: usize,
    /// Past input samples per channel
    history: [[i32; ANALYSIS_LEN]; MAX_CHANNELS],
    /// Ring position of the newest sample per channel
    offsets: [usize; MAX_CHANNELS],
}

impl AnalysisFilterBank {
    /// Create a filter bank with zeroed history
    pub fn new(subbands: usize) -> Self {
        Self {
            subbands,
            history: [[0; ANALYSIS_LEN]; MAX_CHANNELS],
            offsets: [0; MAX_CHANNELS],
        }
    }

    pub fn subbands(&self) -> usize {
        self.subbands
    }

    /// Push `subbands` samples of one channel (oldest first) and produce one subband sample
    /// per subband, in pcm units with `SUBBAND_FRAC_BITS` fractional bits.
    pub fn analyze(&mut self, channel: usize, input: &[i16], output: &mut [i32]) {
        let m = self.subbands;
        let len = 10 * m;

        let offset = (self.offsets[channel] + len - m) % len;
        self.offsets[channel] = offset;

        let history = &mut self.history[channel];
        for (i, &s) in input.iter().take(m).enumerate() {
            history[offset + m - 1 - i] = s as i32;
        }

        if m == 4 {
            analysis_kernel::<4, 8>(
                history,
                offset,
                &ANALYSIS_WINDOW_4,
                &ANALYSIS_MATRIX_4,
                output,
            );
        } else {
            analysis_kernel::<8, 16>(
                history,
                offset,
                &ANALYSIS_WINDOW_8,
                &ANALYSIS_MATRIX_8,
                output,
            );
        }
    }

    /// Back to the initial zero state
    pub fn reset(&mut self) {
        self.history = [[0; ANALYSIS_LEN]; MAX_CHANNELS];
        self.offsets = [0; MAX_CHANNELS];
    }
}

fn analysis_kernel<const M: usize, const M2: usize>(
    history: &[i32],
    offset: usize,
    window: &[i32],
    matrix: &[[i32; M2]; M],
    output: &mut [i32],
) {
    let len = 10 * M;

    // window, then fold the five 2M-long segments
    let mut y = [0i64; M2];
    for (i, yi) in y.iter_mut().enumerate() {
        let mut acc = 0i64;
        for j in 0..5 {
            let n = i + j * M2;
            acc += history[(offset + n) % len] as i64 * window[n] as i64;
        }
        *yi = acc;
    }

    let shift = WINDOW_FRAC_BITS + COSINE_FRAC_BITS - SUBBAND_FRAC_BITS;
    for (row, out) in matrix.iter().zip(output.iter_mut()) {
        let acc: i64 = row.iter().zip(y.iter()).map(|(&c, &v)| c as i64 * v).sum();
        *out = saturate_i32(round_shift(acc, shift));
    }
}

/// Decoder side filter bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisFilterBank {
    /// Number of subbands (4 or 8)
    subbands: usize,
    /// Past matrixed subband vectors per channel
    history: [[i32; SYNTHESIS_LEN]; MAX_CHANNELS],
    /// Ring position of the newest vector per channel
    offsets: [usize; MAX_CHANNELS],
}

impl SynthesisFilterBank {
    /// Create a filter bank with zeroed history
    pub fn new(subbands: usize) -> Self {
        Self {
            subbands,
            history: [[0; SYNTHESIS_LEN]; MAX_CHANNELS],
            offsets: [0; MAX_CHANNELS],
        }
    }

    pub fn subbands(&self) -> usize {
        self.subbands
    }

    /// Turn one subband sample per subband of one channel into `subbands` pcm samples
    pub fn synthesize(&mut self, channel: usize, input: &[i32], output: &mut [i16]) {
        let m = self.subbands;
        let len = 20 * m;

        let offset = (self.offsets[channel] + len - 2 * m) % len;
        self.offsets[channel] = offset;

        let history = &mut self.history[channel];
        if m == 4 {
            synthesis_kernel::<4, 8>(
                history,
                offset,
                input,
                &SYNTHESIS_MATRIX_4,
                &SYNTHESIS_WINDOW_4,
                output,
            );
        } else {
            synthesis_kernel::<8, 16>(
                history,
                offset,
                input,
                &SYNTHESIS_MATRIX_8,
                &SYNTHESIS_WINDOW_8,
                output,
            );
        }
    }

    /// Back to the initial zero state
    pub fn reset(&mut self) {
        self.history = [[0; SYNTHESIS_LEN]; MAX_CHANNELS];
        self.offsets = [0; MAX_CHANNELS];
    }
}

fn synthesis_kernel<const M: usize, const M2: usize>(
    history: &mut [i32],
    offset: usize,
    input: &[i32],
    matrix: &[[i32; M]; M2],
    window: &[i32],
    output: &mut [i16],
) {
    let len = 20 * M;

    // matrixing into the newest 2M slots
    for (k, row) in matrix.iter().enumerate() {
        let acc: i64 = row
            .iter()
            .zip(input.iter())
            .map(|(&c, &s)| c as i64 * s as i64)
            .sum();
        history[offset + k] = saturate_i32(round_shift(acc, COSINE_FRAC_BITS));
    }

    // U takes the first and last quarter of every 4M stretch of V
    let shift = WINDOW_FRAC_BITS + SUBBAND_FRAC_BITS;
    for (j, out) in output.iter_mut().take(M).enumerate() {
        let mut acc = 0i64;
        for i in 0..10 {
            let skip = if i % 2 == 1 { 3 * M } else { 0 };
            let v = (i / 2) * 4 * M + j + skip;
            acc += history[(offset + v) % len] as i64 * window[j + M * i] as i64;
        }
        *out = saturate_i16(round_shift(acc, shift));
    }
}

use super::bitalloc::{allocate, select_joint_subbands};
use super::filterbank::AnalysisFilterBank;
use super::quantizer::{quantize, scale_factor_of};
use crate::core::{
    ChannelMode, Config, FrameData, SbcError, SbcResult, SubbandMatrix, MAX_BLOCKS,
    MAX_CHANNELS, MAX_SUBBANDS,
};
use crate::writer::Writer;

/// SBC / mSBC frame encoder
///
/// Owns the analysis history of every channel, so one instance serves one stream and frames
/// must be fed in order.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// validated configuration
    config: Config,
    /// analysis filter history
    analysis: AnalysisFilterBank,
}

impl Encoder {
    /// Create an encoder, rejecting unsupported configurations
    pub fn new(config: Config) -> SbcResult<Self> {
        config.validate()?;

        log::debug!(
            "sbc encoder: {} Hz, {:?}, {} subbands, {} blocks, bitpool {}, {} bytes/frame{}",
            config.sample_rate_hz(),
            config.mode,
            config.subbands,
            config.blocks,
            config.bitpool,
            config.frame_size(),
            if config.msbc { " (msbc)" } else { "" }
        );

        Ok(Encoder {
            config,
            analysis: AnalysisFilterBank::new(config.subbands),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// bytes per encoded frame
    pub fn frame_size(&self) -> usize {
        self.config.frame_size()
    }

    /// bits per second
    pub fn frame_bitrate(&self) -> u32 {
        self.config.frame_bitrate()
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.config.sample_rate_hz()
    }

    /// pcm samples per channel in one frame
    pub fn frame_samples(&self) -> usize {
        self.config.frame_samples()
    }

    /// interleaved samples expected by `encode`
    pub fn pcm_block_len(&self) -> usize {
        self.config.pcm_block_len()
    }

    /// Encode one block of interleaved pcm into a new frame
    pub fn encode(&mut self, pcm: &[i16]) -> SbcResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.frame_size());
        self.encode_into(pcm, &mut out)?;
        Ok(out)
    }

    /// Encode one block of interleaved pcm, appending the frame to `out`.
    ///
    /// Returns the number of bytes appended. A block of the wrong length is rejected before the
    /// filter history is touched.
    pub fn encode_into(&mut self, pcm: &[i16], out: &mut Vec<u8>) -> SbcResult<usize> {
        let expected = self.config.pcm_block_len();
        if pcm.len() != expected {
            return Err(SbcError::InputLength {
                expected,
                actual: pcm.len(),
            });
        }

        let config = self.config;
        let channels = config.channels();
        let subbands = config.subbands;
        let blocks = config.blocks;

        // analysis, one block per channel at a time
        let mut samples: SubbandMatrix<i32> = [[[0; MAX_SUBBANDS]; MAX_CHANNELS]; MAX_BLOCKS];
        let mut input = [0i16; MAX_SUBBANDS];
        for blk in 0..blocks {
            for ch in 0..channels {
                for (i, s) in input.iter_mut().take(subbands).enumerate() {
                    *s = pcm[(blk * subbands + i) * channels + ch];
                }
                self.analysis
                    .analyze(ch, &input[..subbands], &mut samples[blk][ch][..subbands]);
            }
        }

        let mut frame = FrameData::new(config);

        for ch in 0..channels {
            for sb in 0..subbands {
                frame.scale_factors[ch][sb] =
                    scale_factor_of(samples[..blocks].iter().map(|b| b[ch][sb]));
            }
        }

        if config.mode == ChannelMode::JointStereo {
            frame.join =
                select_joint_subbands(&mut samples, blocks, subbands, &mut frame.scale_factors);
        }

        frame.bits = allocate(&config, &frame.scale_factors);

        for blk in 0..blocks {
            for ch in 0..channels {
                for sb in 0..subbands {
                    frame.codes[blk][ch][sb] = quantize(
                        samples[blk][ch][sb],
                        frame.scale_factors[ch][sb],
                        frame.bits[ch][sb],
                    );
                }
            }
        }

        let bytes = Writer::new().write_frame(&frame)?;
        out.extend_from_slice(&bytes);
        Ok(bytes.len())
    }

    /// Back to the state right after construction
    pub fn reset(&mut self) {
        log::debug!("sbc encoder reset");
        self.analysis.reset();
    }

    /// copy of the analysis history
    pub fn filter_state(&self) -> AnalysisFilterBank {
        self.analysis.clone()
    }

    /// Replace the analysis history with a snapshot taken from an encoder of the same shape
    pub fn restore_filter_state(&mut self, state: &AnalysisFilterBank) -> SbcResult<()> {
        if state.subbands() != self.config.subbands {
            return Err(SbcError::ConfigMismatch);
        }
        self.analysis = state.clone();
        Ok(())
    }
}

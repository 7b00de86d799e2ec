use super::filterbank::SynthesisFilterBank;
use super::quantizer::dequantize;
use crate::core::audio_constants::saturate_i32;
use crate::core::{
    Config, FrameData, SbcError, SbcResult, SubbandMatrix, MAX_BLOCKS, MAX_CHANNELS,
    MAX_SUBBANDS,
};
use crate::reader::Reader;

/// SBC / mSBC frame decoder
///
/// Owns the synthesis history of every channel; frames of one stream must be decoded in order.
#[derive(Debug, Clone)]
pub struct Decoder {
    /// validated configuration
    config: Config,
    /// synthesis filter history
    synthesis: SynthesisFilterBank,
}

impl Decoder {
    /// Create a decoder, rejecting unsupported configurations
    pub fn new(config: Config) -> SbcResult<Self> {
        config.validate()?;

        log::debug!(
            "sbc decoder: {} Hz, {:?}, {} subbands, {} blocks{}",
            config.sample_rate_hz(),
            config.mode,
            config.subbands,
            config.blocks,
            if config.msbc { " (msbc)" } else { "" }
        );

        Ok(Decoder {
            config,
            synthesis: SynthesisFilterBank::new(config.subbands),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// bytes per frame at the configured bitpool
    pub fn frame_size(&self) -> usize {
        self.config.frame_size()
    }

    /// bits per second at the configured bitpool
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

    /// interleaved samples produced by `decode`
    pub fn pcm_block_len(&self) -> usize {
        self.config.pcm_block_len()
    }

    /// Decode one frame into a new block of interleaved pcm
    pub fn decode(&mut self, data: &[u8]) -> SbcResult<Vec<i16>> {
        let mut pcm = vec![0i16; self.pcm_block_len()];
        self.decode_into(data, &mut pcm)?;
        Ok(pcm)
    }

    /// Decode one frame into `pcm`, which must hold at least `pcm_block_len()` samples.
    ///
    /// Returns the number of samples written. Frames that fail to parse leave the filter
    /// history untouched, so the caller can drop them and carry on with the next one.
    pub fn decode_into(&mut self, data: &[u8], pcm: &mut [i16]) -> SbcResult<usize> {
        let expected = self.config.pcm_block_len();
        if pcm.len() < expected {
            return Err(SbcError::InputLength {
                expected,
                actual: pcm.len(),
            });
        }

        let frame = Reader::new().read_frame(data)?;
        self.check_compatible(&frame.config)?;

        let samples = dequantize_frame(&frame);

        let channels = self.config.channels();
        let subbands = self.config.subbands;
        let mut out = [0i16; MAX_SUBBANDS];
        for blk in 0..self.config.blocks {
            for ch in 0..channels {
                self.synthesis
                    .synthesize(ch, &samples[blk][ch][..subbands], &mut out[..subbands]);
                for (i, &s) in out[..subbands].iter().enumerate() {
                    pcm[(blk * subbands + i) * channels + ch] = s;
                }
            }
        }

        Ok(expected)
    }

    /// Back to the state right after construction
    pub fn reset(&mut self) {
        log::debug!("sbc decoder reset");
        self.synthesis.reset();
    }

    /// copy of the synthesis history
    pub fn filter_state(&self) -> SynthesisFilterBank {
        self.synthesis.clone()
    }

    /// Replace the synthesis history with a snapshot taken from a decoder of the same shape
    pub fn restore_filter_state(&mut self, state: &SynthesisFilterBank) -> SbcResult<()> {
        if state.subbands() != self.config.subbands {
            return Err(SbcError::ConfigMismatch);
        }
        self.synthesis = state.clone();
        Ok(())
    }

    // bitpool and allocation are self-described per frame, the block shape is not
    fn check_compatible(&self, frame: &Config) -> SbcResult<()> {
        let own = &self.config;
        let same_shape = frame.frequency == own.frequency
            && frame.mode == own.mode
            && frame.subbands == own.subbands
            && frame.blocks == own.blocks
            && frame.msbc == own.msbc;

        if same_shape {
            Ok(())
        } else {
            Err(SbcError::ConfigMismatch)
        }
    }
}

/// Reconstruct the subband samples of a parsed frame, undoing joint stereo.
///
/// Subbands given no bits come back as silence.
pub fn dequantize_frame(frame: &FrameData) -> SubbandMatrix<i32> {
    let config = &frame.config;
    let channels = config.channels();
    let subbands = config.subbands;

    let mut samples: SubbandMatrix<i32> = [[[0; MAX_SUBBANDS]; MAX_CHANNELS]; MAX_BLOCKS];

    for (blk, block) in samples.iter_mut().enumerate().take(config.blocks) {
        for ch in 0..channels {
            for sb in 0..subbands {
                block[ch][sb] = dequantize(
                    frame.codes[blk][ch][sb],
                    frame.scale_factors[ch][sb],
                    frame.bits[ch][sb],
                );
            }
        }

        for sb in 0..subbands {
            if frame.join[sb] {
                let mid = block[0][sb] as i64;
                let side = block[1][sb] as i64;
                block[0][sb] = saturate_i32(mid + side);
                block[1][sb] = saturate_i32(mid - side);
            }
        }
    }

    samples
}

//! common types for the sbc codec

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, SbcResult};

// constants

/// sync word opening every sbc frame
pub const SYNCWORD: u8 = 0x9c;

/// sync word opening every msbc frame
pub const MSBC_SYNCWORD: u8 = 0xad;

/// header size in bytes (sync, parameters, bitpool, crc)
pub const HEADER_SIZE: usize = 4;

/// upper bounds used to size per-frame buffers
pub const MAX_SUBBANDS: usize = 8;
pub const MAX_BLOCKS: usize = 16;
pub const MAX_CHANNELS: usize = 2;

/// smallest bitpool accepted
pub const MIN_BITPOOL: u8 = 2;

/// bitpool used when none is given
pub const DEFAULT_BITPOOL: u8 = 32;

/// the fixed msbc profile
pub const MSBC_SUBBANDS: usize = 8;
pub const MSBC_BLOCKS: usize = 15;
pub const MSBC_BITPOOL: u8 = 26;

// types

/// sampling frequency
///
/// | Bits | Rate     |
/// |------|----------|
/// | 00   | 16 kHz   |
/// | 01   | 32 kHz   |
/// | 10   | 44.1 kHz |
/// | 11   | 48 kHz   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Frequency {
    Freq16k = 0,
    Freq32k = 1,
    Freq44k1 = 2,
    Freq48k = 3,
}

impl Frequency {
    /// sample rate in Hz
    pub fn hz(self) -> u32 {
        match self {
            Frequency::Freq16k => 16_000,
            Frequency::Freq32k => 32_000,
            Frequency::Freq44k1 => 44_100,
            Frequency::Freq48k => 48_000,
        }
    }

    /// from the 2-bit header field
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Frequency::Freq16k,
            1 => Frequency::Freq32k,
            2 => Frequency::Freq44k1,
            _ => Frequency::Freq48k,
        }
    }

    /// rate in Hz back to the enum
    pub fn from_hz(hz: u32) -> Option<Self> {
        match hz {
            16_000 => Some(Frequency::Freq16k),
            32_000 => Some(Frequency::Freq32k),
            44_100 => Some(Frequency::Freq44k1),
            48_000 => Some(Frequency::Freq48k),
            _ => None,
        }
    }
}

/// channel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ChannelMode {
    #[default]
    Mono = 0,
    DualChannel = 1,
    Stereo = 2,
    JointStereo = 3,
}

impl ChannelMode {
    /// number of coded channels
    pub fn channels(self) -> usize {
        match self {
            ChannelMode::Mono => 1,
            _ => 2,
        }
    }

    /// from the 2-bit header field
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ChannelMode::Mono,
            1 => ChannelMode::DualChannel,
            2 => ChannelMode::Stereo,
            _ => ChannelMode::JointStereo,
        }
    }

    /// stereo and joint stereo share one bitpool between both channels
    pub fn shares_bitpool(self) -> bool {
        matches!(self, ChannelMode::Stereo | ChannelMode::JointStereo)
    }
}

/// bit allocation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AllocationMethod {
    #[default]
    Loudness = 0,
    Snr = 1,
}

impl AllocationMethod {
    /// from the 1-bit header field
    pub fn from_bits(bits: u8) -> Self {
        if bits & 0x01 == 0 {
            AllocationMethod::Loudness
        } else {
            AllocationMethod::Snr
        }
    }
}

// data structures

fn default_bitpool() -> u8 {
    DEFAULT_BITPOOL
}

/// Codec configuration, identical to the parameter set carried by each frame header.
///
/// Immutable once an encoder or decoder has been built from it. Every derived size below is
/// recomputed from the fields on each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Config {
    pub frequency: Frequency,
    #[serde(default)]
    pub mode: ChannelMode,
    #[serde(default)]
    pub allocation: AllocationMethod,
    pub subbands: usize,
    pub blocks: usize,
    #[serde(default = "default_bitpool")]
    pub bitpool: u8,
    #[serde(default)]
    pub msbc: bool,
}

impl Config {
    /// new mono loudness config with the default bitpool
    pub fn new(subbands: usize, blocks: usize, frequency: Frequency) -> Self {
        Config {
            frequency,
            mode: ChannelMode::Mono,
            allocation: AllocationMethod::Loudness,
            subbands,
            blocks,
            bitpool: DEFAULT_BITPOOL,
            msbc: false,
        }
    }

    /// the narrowband voice profile
    pub fn msbc() -> Self {
        Config {
            frequency: Frequency::Freq16k,
            mode: ChannelMode::Mono,
            allocation: AllocationMethod::Loudness,
            subbands: MSBC_SUBBANDS,
            blocks: MSBC_BLOCKS,
            bitpool: MSBC_BITPOOL,
            msbc: true,
        }
    }

    pub fn with_mode(mut self, mode: ChannelMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_allocation(mut self, allocation: AllocationMethod) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_bitpool(mut self, bitpool: u8) -> Self {
        self.bitpool = bitpool;
        self
    }

    pub fn with_msbc(mut self, msbc: bool) -> Self {
        self.msbc = msbc;
        self
    }

    /// check this is one of the supported profiles
    pub fn validate(&self) -> SbcResult<()> {
        if self.msbc {
            let profile = Config::msbc();
            if *self != profile {
                return Err(ConfigError::Msbc.into());
            }
            return Ok(());
        }

        if self.subbands != 4 && self.subbands != 8 {
            return Err(ConfigError::Subbands(self.subbands).into());
        }

        if !matches!(self.blocks, 4 | 8 | 12 | 16) {
            return Err(ConfigError::Blocks(self.blocks).into());
        }

        let max = self.max_bitpool();
        if self.bitpool < MIN_BITPOOL || self.bitpool > max {
            return Err(ConfigError::Bitpool {
                bitpool: self.bitpool,
                min: MIN_BITPOOL,
                max,
            }
            .into());
        }

        Ok(())
    }

    /// Largest bitpool for this shape.
    ///
    /// Bounded by the per-mode limit and by the raw pcm size of the frame, so an encoded frame
    /// never grows past the audio it carries.
    pub fn max_bitpool(&self) -> u8 {
        let channels = self.channels();
        let raw_bits = 16 * self.subbands * self.blocks * channels;
        let overhead = HEADER_SIZE * 8 + 4 * self.subbands * channels + self.join_bits();
        let per_block = if self.mode == ChannelMode::DualChannel {
            2 * self.blocks
        } else {
            self.blocks
        };
        let mode_limit = if self.mode.shares_bitpool() {
            32 * self.subbands
        } else {
            16 * self.subbands
        };

        let capacity = raw_bits.saturating_sub(overhead) / per_block.max(1);
        capacity.min(mode_limit).min(u8::MAX as usize) as u8
    }

    /// number of coded channels
    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    /// pcm samples per channel in one frame
    pub fn frame_samples(&self) -> usize {
        self.blocks * self.subbands
    }

    /// interleaved pcm samples in one frame
    pub fn pcm_block_len(&self) -> usize {
        self.frame_samples() * self.channels()
    }

    /// sample rate in Hz
    pub fn sample_rate_hz(&self) -> u32 {
        self.frequency.hz()
    }

    /// join flags written ahead of the scale factors
    pub(crate) fn join_bits(&self) -> usize {
        if self.mode == ChannelMode::JointStereo {
            self.subbands
        } else {
            0
        }
    }

    /// bits covered by the crc after the two header bytes
    pub(crate) fn side_info_bits(&self) -> usize {
        self.join_bits() + 4 * self.subbands * self.channels()
    }

    /// encoded frame size in bytes
    pub fn frame_size(&self) -> usize {
        let channels = self.channels();
        let scale_factor_bytes = (4 * self.subbands * channels) / 8;

        let payload_bits = if self.mode.shares_bitpool() {
            self.join_bits() + self.blocks * self.bitpool as usize
        } else {
            self.blocks * channels * self.bitpool as usize
        };

        HEADER_SIZE + scale_factor_bytes + payload_bits.div_ceil(8)
    }

    /// bitrate in bits per second
    pub fn frame_bitrate(&self) -> u32 {
        let bits = 8 * self.frame_size() as u64 * self.sample_rate_hz() as u64;
        (bits / self.frame_samples().max(1) as u64) as u32
    }
}

/// one scale factor per (channel, subband)
pub type ScaleFactors = [[u8; MAX_SUBBANDS]; MAX_CHANNELS];

/// bits per (channel, subband)
pub type BitAllocation = [[u8; MAX_SUBBANDS]; MAX_CHANNELS];

/// per-frame samples indexed `[block][channel][subband]`
pub type SubbandMatrix<T> = [[[T; MAX_SUBBANDS]; MAX_CHANNELS]; MAX_BLOCKS];

/// Everything one frame carries, between the quantizer and the bitstream.
///
/// Entries past the configured channel, subband and block counts are unused and zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameData {
    /// header parameters
    pub config: Config,
    /// subbands coded as mid/side (joint stereo only)
    pub join: [bool; MAX_SUBBANDS],
    pub scale_factors: ScaleFactors,
    pub bits: BitAllocation,
    /// quantized codes, `bits[ch][sb]` wide
    pub codes: SubbandMatrix<u16>,
}

impl FrameData {
    /// empty frame for a configuration
    pub fn new(config: Config) -> Self {
        FrameData {
            config,
            join: [false; MAX_SUBBANDS],
            scale_factors: [[0; MAX_SUBBANDS]; MAX_CHANNELS],
            bits: [[0; MAX_SUBBANDS]; MAX_CHANNELS],
            codes: [[[0; MAX_SUBBANDS]; MAX_CHANNELS]; MAX_BLOCKS],
        }
    }

    /// bits taken by the quantized codes of one block
    pub fn block_bits(&self) -> usize {
        self.bits[..self.config.channels()]
            .iter()
            .flat_map(|ch| ch[..self.config.subbands].iter())
            .map(|&b| b as usize)
            .sum()
    }
}

//! resbc - Audio converter library for SBC and mSBC
//!
//! Turns any audio file symphonia can read into a stream of back-to-back SBC frames and
//! decodes such streams back to pcm or WAV.
//!

pub mod audio;

use anyhow::{bail, Context, Result};
use libsbc_audio::{AllocationMethod, ChannelMode, Config, Decoder, Encoder, Frequency};

/// Re-export libsbc types
pub use libsbc_audio::{FrameInfo, SbcError};

/// Information about an sbc stream
#[derive(Debug, Clone, serde::Serialize)]
pub struct SbcInfo {
    /// parameters of the first frame
    pub config: Config,
    pub sample_rate: u32,
    pub channels: u8,
    pub frames: usize,
    pub duration_secs: f64,
    /// bitrate of the first frame
    pub bitrate: u32,
    pub file_size: usize,
    /// every frame parsed and its crc verified
    pub crc_valid: bool,
}

/// Split a stream into frames, using each frame's own header for its size
pub fn split_frames(data: &[u8]) -> Result<Vec<&[u8]>> {
    let mut frames = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let config = libsbc_audio::probe(&data[offset..])
            .with_context(|| format!("Bad frame header at byte {offset}"))?;
        let size = config.frame_size();
        if offset + size > data.len() {
            bail!(
                "Truncated frame at byte {}: need {} bytes, {} left",
                offset,
                size,
                data.len() - offset
            );
        }
        frames.push(&data[offset..offset + size]);
        offset += size;
    }

    Ok(frames)
}

/// Get information about an sbc stream
pub fn get_sbc_info(data: &[u8]) -> Result<SbcInfo> {
    let frames = split_frames(data)?;
    let first = frames.first().context("Empty sbc stream")?;
    let frame_info = libsbc_audio::info(first)?;

    let crc_valid = frames.iter().all(|f| libsbc_audio::validate(f));
    let duration_secs = frames.len() as f64 * frame_info.duration_secs;

    Ok(SbcInfo {
        config: frame_info.config,
        sample_rate: frame_info.sample_rate,
        channels: frame_info.channels,
        frames: frames.len(),
        duration_secs,
        bitrate: frame_info.bitrate,
        file_size: data.len(),
        crc_valid,
    })
}

/// Validate an sbc stream
pub fn validate_sbc(data: &[u8]) -> Result<bool> {
    let info = get_sbc_info(data)?;
    Ok(info.crc_valid)
}

/// Encoding options for converting audio to sbc
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// 4 or 8
    pub subbands: usize,
    /// 4, 8, 12 or 16
    pub blocks: usize,
    /// Channel mode, picked from the source channel count when unset
    pub mode: Option<ChannelMode>,
    pub allocation: AllocationMethod,
    pub bitpool: u8,
    /// Produce mSBC (16 kHz mono voice); overrides every other field
    pub msbc: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            subbands: 8,
            blocks: 16,
            mode: None,
            allocation: AllocationMethod::Loudness,
            bitpool: 32,
            msbc: false,
        }
    }
}

impl EncodeOptions {
    /// Standard sbc with the usual 8 subbands and 16 blocks
    pub fn sbc() -> Self {
        Self::default()
    }

    /// The mSBC voice profile
    pub fn msbc() -> Self {
        Self {
            msbc: true,
            ..Default::default()
        }
    }

    pub fn with_bitpool(mut self, bitpool: u8) -> Self {
        self.bitpool = bitpool;
        self
    }

    pub fn with_mode(mut self, mode: ChannelMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_allocation(mut self, allocation: AllocationMethod) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_shape(mut self, subbands: usize, blocks: usize) -> Self {
        self.subbands = subbands;
        self.blocks = blocks;
        self
    }

    /// Codec configuration for a source of this rate and channel count
    pub fn config_for(&self, sample_rate: u32, channels: usize) -> Result<Config> {
        if self.msbc {
            if sample_rate != 16_000 {
                bail!("mSBC needs 16 kHz input, got {} Hz", sample_rate);
            }
            return Ok(Config::msbc());
        }

        let frequency = Frequency::from_hz(sample_rate).with_context(|| {
            format!("Unsupported sample rate {sample_rate} Hz, use 16000, 32000, 44100 or 48000")
        })?;

        let mode = match (self.mode, channels) {
            (Some(mode), _) => mode,
            (None, 1) => ChannelMode::Mono,
            (None, 2) => ChannelMode::JointStereo,
            (None, n) => bail!("Unsupported channel count {}", n),
        };

        let config = Config::new(self.subbands, self.blocks, frequency)
            .with_mode(mode)
            .with_allocation(self.allocation)
            .with_bitpool(self.bitpool);
        config.validate()?;
        Ok(config)
    }
}

/// Encode audio file bytes to an sbc stream
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (MP3, WAV, FLAC, OGG, etc.)
/// * `options` - Encoding options
///
/// # Returns
/// Back-to-back sbc frames
pub fn encode_from_audio(audio_bytes: &[u8], options: EncodeOptions) -> Result<Vec<u8>> {
    let source = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;
    encode_from_samples(&source.samples, source.sample_rate, source.channels, options)
}

/// Encode raw audio samples to an sbc stream
///
/// # Arguments
/// * `samples` - Interleaved f32 samples in range [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `channels` - Number of channels
/// * `options` - Encoding options
///
/// # Returns
/// Back-to-back sbc frames; the last block is padded with silence
pub fn encode_from_samples(
    samples: &[f32],
    sample_rate: u32,
    channels: usize,
    options: EncodeOptions,
) -> Result<Vec<u8>> {
    if channels == 0 {
        bail!("No channels");
    }
    let config = options.config_for(sample_rate, channels)?;
    let coded = config.channels();

    // pcm laid out for the coded channel count
    let pcm: Vec<i16> = match (channels, coded) {
        (a, b) if a == b => samples.iter().map(|&s| audio::f32_to_i16(s)).collect(),
        // downmix
        (_, 1) => samples
            .chunks_exact(channels)
            .map(|f| audio::f32_to_i16(f.iter().sum::<f32>() / channels as f32))
            .collect(),
        // duplicate mono
        (1, 2) => samples
            .iter()
            .flat_map(|&s| {
                let v = audio::f32_to_i16(s);
                [v, v]
            })
            .collect(),
        (a, b) => bail!("Cannot map {} source channels onto {}", a, b),
    };

    let mut encoder = Encoder::new(config)?;
    let block = config.pcm_block_len();
    let frames = pcm.len().div_ceil(block);
    let mut out = Vec::with_capacity(frames * config.frame_size());

    let mut padded = vec![0i16; block];
    for chunk in pcm.chunks(block) {
        if chunk.len() == block {
            encoder.encode_into(chunk, &mut out)?;
        } else {
            padded[..chunk.len()].copy_from_slice(chunk);
            padded[chunk.len()..].fill(0);
            encoder.encode_into(&padded, &mut out)?;
        }
    }

    Ok(out)
}

/// Decode an sbc stream to raw samples
///
/// # Returns
/// Tuple of (samples, sample_rate, channels) where samples are interleaved 16-bit pcm
pub fn decode_to_samples(sbc_bytes: &[u8]) -> Result<(Vec<i16>, u32, usize)> {
    let frames = split_frames(sbc_bytes)?;
    let first = frames.first().context("Empty sbc stream")?;
    let config = libsbc_audio::probe(first)?;

    let mut decoder = Decoder::new(config)?;
    let mut samples = Vec::with_capacity(frames.len() * config.pcm_block_len());
    let mut block = vec![0i16; config.pcm_block_len()];

    for (i, frame) in frames.iter().enumerate() {
        decoder
            .decode_into(frame, &mut block)
            .with_context(|| format!("Failed to decode frame {i}"))?;
        samples.extend_from_slice(&block);
    }

    Ok((samples, config.sample_rate_hz(), config.channels()))
}

/// Decode an sbc stream to WAV format
pub fn decode_to_wav(sbc_bytes: &[u8]) -> Result<Vec<u8>> {
    let (samples, sample_rate, channels) = decode_to_samples(sbc_bytes)?;

    audio::write_wav_to_bytes(&samples, sample_rate, channels).context("Failed to write WAV data")
}

/// Information about a source audio file
#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f32,
    pub source_format: String,
}

/// Get information about an audio file
pub fn get_audio_info(audio_bytes: &[u8]) -> Result<AudioInfo> {
    let source = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;

    Ok(AudioInfo {
        sample_rate: source.sample_rate,
        channels: source.channels,
        duration_secs: source.samples.len() as f32
            / source.channels.max(1) as f32
            / source.sample_rate as f32,
        source_format: source.source_format,
    })
}

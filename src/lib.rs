#![allow(clippy::needless_range_loop)]

pub mod codec;
pub mod core;

mod reader;
mod writer;

pub use codec::{Decoder, Encoder};
pub use core::{
    AllocationMethod, BitAllocation, ChannelMode, Config, ConfigError, FrameData, Frequency,
    SbcError, SbcResult, ScaleFactors, HEADER_SIZE, MSBC_SYNCWORD, SYNCWORD,
};
pub use reader::Reader;
pub use writer::Writer;

/// info about one sbc frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    /// parameters from the header
    pub config: Config,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u8,
    /// Encoded frame size in bytes
    pub frame_size: usize,
    /// Bits per second
    pub bitrate: u32,
    /// pcm samples per channel
    pub samples_per_frame: usize,
    /// Duration in seconds
    pub duration_secs: f64,
    /// narrowband frame?
    pub msbc: bool,
    /// Is CRC valid?
    pub crc_valid: bool,
}

/// Parse the header of the frame at the start of `data`
///
/// # Arguments
/// * `data` - frame bytes, at least the 4-byte header
///
/// # Returns
/// the frame's configuration
pub fn probe(data: &[u8]) -> SbcResult<Config> {
    Reader::new().probe(data)
}

/// Check that `data` starts with one complete frame whose crc verifies
pub fn validate(data: &[u8]) -> bool {
    Reader::new().read_frame(data).is_ok()
}

/// Get information about an sbc frame
///
/// # Arguments
/// * `data` - frame bytes
///
/// # Returns
/// FrameInfo with the header details; `crc_valid` is false when the frame is too short to check
pub fn info(data: &[u8]) -> SbcResult<FrameInfo> {
    let config = probe(data)?;

    let side_bits = config.side_info_bits();
    let crc_valid = data.len() >= HEADER_SIZE + side_bits.div_ceil(8)
        && core::frame_crc(data, side_bits) == data[3];

    let samples_per_frame = config.frame_samples();

    Ok(FrameInfo {
        config,
        sample_rate: config.sample_rate_hz(),
        channels: config.channels() as u8,
        frame_size: config.frame_size(),
        bitrate: config.frame_bitrate(),
        samples_per_frame,
        duration_secs: samples_per_frame as f64 / config.sample_rate_hz() as f64,
        msbc: config.msbc,
        crc_valid,
    })
}

/// sample rate in Hz for a frequency code
pub fn sample_rate_hz(frequency: Frequency) -> u32 {
    frequency.hz()
}

//! error types for the sbc codec

use thiserror::Error;

/// why a configuration was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unsupported subband count {0}, must be 4 or 8")]
    Subbands(usize),
    #[error("unsupported block count {0}, must be 4, 8, 12 or 16")]
    Blocks(usize),
    #[error("bitpool {bitpool} out of range {min}..={max}")]
    Bitpool { bitpool: u8, min: u8, max: u8 },
    #[error("msbc requires 8 subbands, 15 blocks, 16 kHz, mono, loudness and bitpool 26")]
    Msbc,
}

/// Everything that can go wrong while encoding or decoding.
///
/// Frame format errors are reported separately so a caller can decide whether to drop the
/// frame, scan for the next sync byte or give up on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SbcError {
    /// unsupported or inconsistent configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// pcm block length does not match the configuration
    #[error("pcm block has {actual} samples, expected {expected}")]
    InputLength { expected: usize, actual: usize },
    /// first byte is not a sync word
    #[error("bad sync byte {0:#04x}")]
    BadSync(u8),
    /// header fields describe no supported configuration
    #[error("invalid frame header: {0}")]
    InvalidHeader(&'static str),
    /// crc carried by the frame does not match its contents
    #[error("crc mismatch: frame carries {expected:#04x}, computed {computed:#04x}")]
    CrcMismatch { expected: u8, computed: u8 },
    /// fewer bytes than the header declares
    #[error("frame truncated: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    /// well formed frame with a block shape the decoder was not built for
    #[error("frame parameters do not match the decoder configuration")]
    ConfigMismatch,
}

impl SbcError {
    /// true for errors raised while parsing a frame
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            SbcError::BadSync(_)
                | SbcError::InvalidHeader(_)
                | SbcError::CrcMismatch { .. }
                | SbcError::Truncated { .. }
                | SbcError::ConfigMismatch
        )
    }
}

/// result type for sbc stuff
pub type SbcResult<T> = Result<T, SbcError>;

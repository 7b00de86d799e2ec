pub mod audio_constants;
pub mod bits;
pub mod crc8;
pub mod error;
pub mod types;

pub use audio_constants::*;
pub use bits::{BitReader, BitWriter};
pub use crc8::{compute as compute_crc8, frame_crc, Crc8};
pub use error::{ConfigError, SbcError, SbcResult};

pub use types::*;

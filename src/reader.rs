use crate::codec::bitalloc::allocate;
use crate::core::{
    frame_crc, AllocationMethod, BitReader, ChannelMode, Config, FrameData, Frequency, SbcError,
    SbcResult, HEADER_SIZE, MSBC_SYNCWORD, SYNCWORD,
};

/// binary reader for sbc frames
pub struct Reader;

impl Reader {
    /// new reader
    pub fn new() -> Self {
        Reader
    }

    /// Parse and check the header of the frame at the start of `data`.
    ///
    /// Only the four header bytes are needed; the crc is not checked.
    pub fn probe(&self, data: &[u8]) -> SbcResult<Config> {
        let config = self.read_header(data)?;
        self.check_bitpool(&config)?;
        Ok(config)
    }

    /// Parse one complete frame.
    ///
    /// The crc is checked before the bitpool is trusted, so damage anywhere in the covered bytes
    /// reports as `CrcMismatch`. Bytes past `frame_size()` are ignored.
    pub fn read_frame(&self, data: &[u8]) -> SbcResult<FrameData> {
        let config = self.read_header(data)?;

        // header and side info must be present before the crc can be checked
        let side_bits = config.side_info_bits();
        let side_len = HEADER_SIZE + side_bits.div_ceil(8);
        if data.len() < side_len {
            return Err(SbcError::Truncated {
                expected: side_len,
                actual: data.len(),
            });
        }

        let computed = frame_crc(data, side_bits);
        if computed != data[3] {
            return Err(SbcError::CrcMismatch {
                expected: data[3],
                computed,
            });
        }

        self.check_bitpool(&config)?;

        let size = config.frame_size();
        if data.len() < size {
            return Err(SbcError::Truncated {
                expected: size,
                actual: data.len(),
            });
        }

        let mut frame = FrameData::new(config);
        let channels = config.channels();
        let subbands = config.subbands;

        let mut r = BitReader::new(&data[..size]);
        r.skip(HEADER_SIZE * 8);

        if config.mode == ChannelMode::JointStereo {
            for sb in 0..subbands {
                let bit = r.read_bit();
                frame.join[sb] = bit != 0 && sb + 1 < subbands;
            }
        }

        for ch in 0..channels {
            for sb in 0..subbands {
                frame.scale_factors[ch][sb] = r.read_bits(4) as u8;
            }
        }

        frame.bits = allocate(&config, &frame.scale_factors);

        for blk in 0..config.blocks {
            for ch in 0..channels {
                for sb in 0..subbands {
                    let bits = frame.bits[ch][sb];
                    if bits > 0 {
                        frame.codes[blk][ch][sb] = r.read_bits(bits as u32) as u16;
                    }
                }
            }
        }

        Ok(frame)
    }

    fn read_header(&self, data: &[u8]) -> SbcResult<Config> {
        if data.len() < HEADER_SIZE {
            return Err(SbcError::Truncated {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        match data[0] {
            SYNCWORD => {}
            // reserved bytes are covered by the crc but carry nothing
            MSBC_SYNCWORD => return Ok(Config::msbc()),
            other => return Err(SbcError::BadSync(other)),
        }

        let b = data[1];
        let frequency = Frequency::from_bits(b >> 6);
        let blocks = 4 * (((b >> 4) & 0x03) as usize + 1);
        let mode = ChannelMode::from_bits(b >> 2);
        let allocation = AllocationMethod::from_bits(b >> 1);
        let subbands = if b & 0x01 == 0 { 4 } else { 8 };

        Ok(Config::new(subbands, blocks, frequency)
            .with_mode(mode)
            .with_allocation(allocation)
            .with_bitpool(data[2]))
    }

    fn check_bitpool(&self, config: &Config) -> SbcResult<()> {
        config
            .validate()
            .map_err(|_| SbcError::InvalidHeader("bitpool out of range"))
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

use crate::core::{
    frame_crc, BitWriter, ChannelMode, Config, FrameData, SbcError, SbcResult, MSBC_SYNCWORD,
    SYNCWORD,
};

/// binary writer for sbc frames
pub struct Writer;

impl Writer {
    /// new writer
    pub fn new() -> Self {
        Writer
    }

    /// Serialize one frame.
    ///
    /// The allocation in `frame.bits` is written as given; the caller derives it from the scale
    /// factors with the same rule the reader uses. The output is exactly `frame_size()` bytes.
    pub fn write_frame(&self, frame: &FrameData) -> SbcResult<Vec<u8>> {
        let config = &frame.config;
        config.validate()?;
        self.check_allocation(frame)?;

        let size = config.frame_size();
        let channels = config.channels();
        let subbands = config.subbands;

        let mut w = BitWriter::with_capacity(size);

        // header
        if config.msbc {
            w.write_byte(MSBC_SYNCWORD);
            w.write_byte(0);
            w.write_byte(0);
        } else {
            w.write_byte(SYNCWORD);
            w.write_byte(header_byte(config));
            w.write_byte(config.bitpool);
        }
        w.write_byte(0); // crc, patched below

        // join flags, the last one is always clear
        if config.mode == ChannelMode::JointStereo {
            for sb in 0..subbands {
                let joined = frame.join[sb] && sb + 1 < subbands;
                w.write_bit(joined as u32);
            }
        }

        // scale factors
        for ch in 0..channels {
            for sb in 0..subbands {
                w.write_bits(frame.scale_factors[ch][sb] as u32 & 0x0f, 4);
            }
        }

        // audio samples
        for blk in 0..config.blocks {
            for ch in 0..channels {
                for sb in 0..subbands {
                    let bits = frame.bits[ch][sb];
                    if bits > 0 {
                        w.write_bits(frame.codes[blk][ch][sb] as u32, bits as u32);
                    }
                }
            }
        }

        w.pad_to(size);

        let crc = frame_crc(w.as_bytes(), config.side_info_bits());
        w.patch_byte(3, crc);

        Ok(w.into_bytes())
    }

    fn check_allocation(&self, frame: &FrameData) -> SbcResult<()> {
        let config = &frame.config;
        let bitpool = config.bitpool as usize;

        let fits = if config.mode.shares_bitpool() {
            frame.block_bits() <= bitpool
        } else {
            frame.bits[..config.channels()].iter().all(|ch| {
                ch[..config.subbands].iter().map(|&b| b as usize).sum::<usize>() <= bitpool
            })
        };

        if fits {
            Ok(())
        } else {
            Err(SbcError::InvalidHeader("bit allocation exceeds the bitpool"))
        }
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// second header byte: frequency, blocks, mode, allocation, subbands
pub(crate) fn header_byte(config: &Config) -> u8 {
    let blocks = ((config.blocks / 4).saturating_sub(1) & 0x03) as u8;
    let subbands = (config.subbands == 8) as u8;

    (config.frequency as u8) << 6
        | blocks << 4
        | (config.mode as u8) << 2
        | (config.allocation as u8) << 1
        | subbands
}

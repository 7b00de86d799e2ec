//! Bit cursor shared by the frame writer and reader.
//!
//! Fields in an sbc frame are packed most significant bit first with no byte alignment
//! between them, so both sides track their position in bits rather than bytes.

/// Bit-level writer
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            bit_len: 0,
        }
    }

    /// writer with room for `bytes` bytes
    pub fn with_capacity(bytes: usize) -> Self {
        BitWriter {
            bytes: Vec::with_capacity(bytes),
            bit_len: 0,
        }
    }

    pub fn write_bit(&mut self, bit: u32) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }

        if bit != 0 {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (7 - offset);
        }

        self.bit_len += 1;
    }

    /// write the low `num_bits` bits of `value`, msb first
    pub fn write_bits(&mut self, value: u32, num_bits: u32) {
        debug_assert!(num_bits <= 32);

        let mut remaining = num_bits;
        while remaining > 0 {
            let offset = (self.bit_len % 8) as u32;
            if offset == 0 {
                self.bytes.push(0);
            }

            // as many bits as fit in the current byte
            let take = remaining.min(8 - offset);
            let shift = remaining - take;
            let chunk = ((value >> shift) & ((1u32 << take) - 1)) as u8;

            let last = self.bytes.len() - 1;
            self.bytes[last] |= chunk << (8 - offset - take);

            self.bit_len += take as usize;
            remaining -= take;
        }
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.write_bits(byte as u32, 8);
    }

    /// zero bits up to the next byte boundary
    pub fn align(&mut self) {
        self.bit_len = self.bytes.len() * 8;
    }

    /// bits written so far
    pub fn bit_position(&self) -> usize {
        self.bit_len
    }

    /// bytes touched so far, including a partial last byte
    pub fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    /// the bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// overwrite an already written whole byte
    pub fn patch_byte(&mut self, index: usize, byte: u8) {
        if let Some(b) = self.bytes.get_mut(index) {
            *b = byte;
        }
    }

    /// pad with zero bytes up to `len`
    pub fn pad_to(&mut self, len: usize) {
        self.align();
        if self.bytes.len() < len {
            self.bytes.resize(len, 0);
            self.bit_len = len * 8;
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Bit-level reader
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, bit_pos: 0 }
    }

    /// Reads past the end return zero bits; callers check `remaining_bits` first.
    pub fn read_bit(&mut self) -> u32 {
        let byte_pos = self.bit_pos / 8;
        if byte_pos >= self.bytes.len() {
            self.bit_pos += 1;
            return 0;
        }

        let bit = (self.bytes[byte_pos] >> (7 - self.bit_pos % 8)) & 1;
        self.bit_pos += 1;

        bit as u32
    }

    /// read `num_bits` bits msb first
    pub fn read_bits(&mut self, num_bits: u32) -> u32 {
        debug_assert!(num_bits <= 32);

        let mut value = 0u32;
        let mut remaining = num_bits;
        while remaining > 0 {
            let byte_pos = self.bit_pos / 8;
            let offset = (self.bit_pos % 8) as u32;
            let take = remaining.min(8 - offset);

            let byte = self.bytes.get(byte_pos).copied().unwrap_or(0) as u32;
            let chunk = (byte >> (8 - offset - take)) & ((1u32 << take) - 1);

            // u64 keeps the shift defined for 32-bit reads
            value = (((value as u64) << take) | chunk as u64) as u32;
            self.bit_pos += take as usize;
            remaining -= take;
        }

        value
    }

    pub fn read_byte(&mut self) -> u8 {
        self.read_bits(8) as u8
    }

    /// skip `num_bits` bits
    pub fn skip(&mut self, num_bits: usize) {
        self.bit_pos += num_bits;
    }

    /// current position in bits
    pub fn bit_position(&self) -> usize {
        self.bit_pos
    }

    pub fn remaining_bits(&self) -> usize {
        (self.bytes.len() * 8).saturating_sub(self.bit_pos)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0
    }
}

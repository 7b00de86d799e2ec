//! CRC-8 frame check sequence
//!
//! Generator x^8 + x^4 + x^3 + x^2 + 1, initial value 0x0f, msb first, no final xor.
//! The covered region ends on an arbitrary bit, so whole bytes go through the table and the
//! tail is clocked in one bit at a time.

/// generator polynomial without the x^8 term
pub const POLYNOMIAL: u8 = 0x1d;

/// register value before the first bit
pub const INITIAL: u8 = 0x0f;

const TABLE: [u8; 256] = make_table();

const fn make_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// running crc over a bit stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc8 {
    state: u8,
}

impl Crc8 {
    pub fn new() -> Self {
        Crc8 { state: INITIAL }
    }

    /// feed whole bytes
    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = TABLE[(self.state ^ b) as usize];
        }
    }

    /// feed a single bit
    pub fn update_bit(&mut self, bit: u8) {
        let feedback = ((self.state >> 7) ^ bit) & 1;
        self.state <<= 1;
        if feedback != 0 {
            self.state ^= POLYNOMIAL;
        }
    }

    /// feed the first `num_bits` bits of `bytes`
    pub fn update_bits(&mut self, bytes: &[u8], num_bits: usize) {
        let whole = (num_bits / 8).min(bytes.len());
        self.update(&bytes[..whole]);

        let tail = num_bits - whole * 8;
        if tail > 0 {
            let last = bytes.get(whole).copied().unwrap_or(0);
            for i in 0..tail.min(8) {
                self.update_bit(last >> (7 - i));
            }
        }
    }

    pub fn finish(&self) -> u8 {
        self.state
    }
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::new()
    }
}

/// crc of whole bytes
pub fn compute(data: &[u8]) -> u8 {
    let mut crc = Crc8::new();
    crc.update(data);
    crc.finish()
}

/// Crc of a frame: header bytes 1 and 2, then `side_bits` bits starting at byte 4.
///
/// The sync byte and the crc byte itself are not covered.
pub fn frame_crc(frame: &[u8], side_bits: usize) -> u8 {
    let mut crc = Crc8::new();
    crc.update(frame.get(1..3).unwrap_or(&[]));
    crc.update_bits(frame.get(4..).unwrap_or(&[]), side_bits);
    crc.finish()
}

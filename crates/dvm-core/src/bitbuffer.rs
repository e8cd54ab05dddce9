use std::fmt;

use crate::frame_parse_error::FrameParseErr;

/// MSB-first bit cursor over a byte vector.
///
/// DMR bursts and the DFSI records are laid out in bit fields that straddle byte
/// boundaries; this is the one place in the bridge that does the shifting.
pub struct BitBuffer {
    buffer: Vec<u8>,
    pos: usize, // next bit offset for read/write
    end: usize, // bits at or after this are out of range
}

impl BitBuffer {
    /// Create a zeroed buffer capable of holding exactly `len_bits` bits.
    pub fn new(len_bits: usize) -> Self {
        BitBuffer {
            buffer: vec![0; len_bits.div_ceil(8)],
            pos: 0,
            end: len_bits,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        BitBuffer {
            buffer: data.to_vec(),
            pos: 0,
            end: data.len() * 8,
        }
    }

    /// Construct from a slice holding one bit per byte (values 0 or 1).
    pub fn from_bitarr(data: &[u8]) -> Self {
        let mut buf = BitBuffer::new(data.len());
        for &bit in data {
            buf.write_bit(bit & 1);
        }
        buf.pos = 0;
        buf
    }

    /// Construct from a string of '0'/'1' characters. Other characters are skipped,
    /// so test vectors may be grouped with spaces or underscores.
    pub fn from_bitstr(bitstr: &str) -> Self {
        let bits: Vec<u8> = bitstr
            .chars()
            .filter_map(|c| match c {
                '0' => Some(0),
                '1' => Some(1),
                _ => None,
            })
            .collect();
        Self::from_bitarr(&bits)
    }

    /// Reads `buf.len()` bits from pos into `buf`, one bit per byte.
    /// Returns None without advancing if not enough bits remain.
    pub fn to_bitarr(&mut self, buf: &mut [u8]) -> Option<()> {
        if buf.len() > self.get_len_remaining() {
            return None;
        }
        for slot in buf.iter_mut() {
            *slot = self.read_bit_at_unchecked(self.pos);
            self.pos += 1;
        }
        Some(())
    }

    /// Peek `num_bits` at absolute bit `offset`, without moving pos.
    /// Returns None on overflow or if `num_bits>64`.
    pub fn peek_bits_at(&self, offset: usize, num_bits: usize) -> Option<u64> {
        if num_bits > 64 || offset + num_bits > self.end {
            return None;
        }
        Some(self.read_bits_at_unchecked(offset, num_bits))
    }

    /// Peek `num_bits` at the current pos, without advancing.
    pub fn peek_bits(&self, num_bits: usize) -> Option<u64> {
        self.peek_bits_at(self.pos, num_bits)
    }

    /// Read `num_bits` at the current pos, advancing on success.
    pub fn read_bits(&mut self, num_bits: usize) -> Option<u64> {
        let v = self.peek_bits_at(self.pos, num_bits)?;
        self.pos += num_bits;
        Some(v)
    }

    /// Like read_bits, but returns FrameParseErr::BufferEnded naming the field.
    pub fn read_field(&mut self, num_bits: usize, field: &'static str) -> Result<u64, FrameParseErr> {
        self.read_bits(num_bits).ok_or(FrameParseErr::BufferEnded { field: Some(field) })
    }

    pub fn read_bit(&mut self) -> Option<u8> {
        self.read_bits(1).map(|v| v as u8)
    }

    /// Write a single bit to pos
    pub fn write_bit(&mut self, value: u8) {
        assert!(value == 0 || value == 1, "write_bit: value must be 0 or 1");
        assert!(self.pos < self.end, "write would exceed buffer end");

        let index = self.pos / 8;
        let shift = 7 - (self.pos % 8);
        self.buffer[index] = (self.buffer[index] & !(1 << shift)) | (value << shift);
        self.pos += 1;
    }

    /// Write up to 64 bits, advancing pos. Panics if the write exceeds the end.
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        assert!(num_bits <= 64, "can only write up to 64 bits");
        assert!(num_bits == 64 || value >> num_bits == 0, "value exceeds num_bits {} {}", value, num_bits);
        assert!(self.pos + num_bits <= self.end, "write would exceed buffer end");

        let mut remaining = num_bits;
        let mut cur = self.pos;

        // Unaligned head, one bit at a time up to the next byte boundary
        while remaining > 0 && cur % 8 != 0 {
            let bit = ((value >> (remaining - 1)) & 1) as u8;
            let shift = 7 - (cur % 8);
            self.buffer[cur / 8] = (self.buffer[cur / 8] & !(1 << shift)) | (bit << shift);
            cur += 1;
            remaining -= 1;
        }

        while remaining >= 8 {
            self.buffer[cur / 8] = ((value >> (remaining - 8)) & 0xFF) as u8;
            cur += 8;
            remaining -= 8;
        }

        if remaining > 0 {
            let bits = (value as u8) & ((1 << remaining) - 1);
            let shift = 8 - remaining;
            let mask = ((1u16 << remaining) - 1) as u8;
            self.buffer[cur / 8] = (self.buffer[cur / 8] & !(mask << shift)) | (bits << shift);
        }

        self.pos += num_bits;
    }

    /// Writes whole bytes starting at pos.
    pub fn write_bytes(&mut self, data: &[u8]) {
        for &b in data {
            self.write_bits(b as u64, 8);
        }
    }

    /// Reads `out.len()` whole bytes starting at pos.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Option<()> {
        if out.len() * 8 > self.get_len_remaining() {
            return None;
        }
        for b in out.iter_mut() {
            *b = self.read_bits_at_unchecked(self.pos, 8) as u8;
            self.pos += 8;
        }
        Some(())
    }

    /// Underlying bytes. Trailing bits past the end are zero unless written directly.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// One byte per bit, covering the whole buffer.
    pub fn into_bitvec(self) -> Vec<u8> {
        (0..self.end).map(|i| self.read_bit_at_unchecked(i)).collect()
    }

    pub fn get_len(&self) -> usize {
        self.end
    }

    pub fn get_len_remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn get_pos(&self) -> usize {
        self.pos
    }

    /// Seek `pos` to absolute bit `offset`.
    pub fn seek(&mut self, offset: usize) {
        assert!(offset <= self.end, "seek out of range: got {}, end {}", offset, self.end);
        self.pos = offset;
    }

    /// Dump all bits as an uppercase hex string, no separators. A trailing partial
    /// nibble is padded on the right with zeros.
    pub fn dump_hex(&self) -> String {
        let n_nibbles = self.end.div_ceil(4);
        let mut s = String::with_capacity(n_nibbles);
        for i in 0..n_nibbles {
            let take = usize::min(4, self.end - i * 4);
            let v = self.read_bits_at_unchecked(i * 4, take) as u8;
            let digit = if take < 4 { v << (4 - take) } else { v };
            s.push_str(&format!("{:X}", digit));
        }
        s
    }

    /// Dump all bits as '0'/'1', with a ^ marker before the current pos.
    pub fn dump_bin(&self) -> String {
        let mut s = String::with_capacity(self.end + 1);
        for i in 0..self.end {
            if i == self.pos {
                s.push('^');
            }
            s.push(if self.read_bit_at_unchecked(i) == 1 { '1' } else { '0' });
        }
        if self.pos == self.end {
            s.push('^');
        }
        s
    }

    /// Reads `num_bits` at absolute `bit_pos` without bounds checks.
    /// Caller must ensure `num_bits <= 64` and `bit_pos + num_bits <= end`.
    fn read_bits_at_unchecked(&self, bit_pos: usize, num_bits: usize) -> u64 {
        let mut result = 0u64;
        let mut cur = bit_pos;
        let mut remaining = num_bits;

        while remaining > 0 && cur % 8 != 0 {
            result = (result << 1) | self.read_bit_at_unchecked(cur) as u64;
            cur += 1;
            remaining -= 1;
        }
        while remaining >= 8 {
            result = (result << 8) | self.buffer[cur / 8] as u64;
            cur += 8;
            remaining -= 8;
        }
        if remaining > 0 {
            let bits = (self.buffer[cur / 8] >> (8 - remaining)) as u64;
            result = (result << remaining) | bits;
        }
        result
    }

    fn read_bit_at_unchecked(&self, bit_pos: usize) -> u8 {
        (self.buffer[bit_pos / 8] >> (7 - (bit_pos % 8))) & 1
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBuffer {{ ^{} >{} {} }}", self.pos, self.end, self.dump_hex())
    }
}

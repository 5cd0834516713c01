use std::io::{self, ErrorKind, Read, Write};

/// Reads a single byte, returning `None` at end of input.
pub fn read_byte(reader: &mut impl Read) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Packs bits MSB-first into bytes and hands each full byte to the sink.
///
/// A partially filled last byte is padded with zero bits by [`BitWriter::finish`],
/// or on drop if `finish` was never reached. No padding length is recorded.
pub struct BitWriter<W: Write> {
    inner: W,
    /// Byte being assembled
    accumulator: u8,
    /// Bits placed in the accumulator (0-7)
    filled: u8,
    bits_written: u64,
    finished: bool,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, accumulator: 0, filled: 0, bits_written: 0, finished: false }
    }

    /// Write the low `n` bits (0-32) of `value`, most significant first
    pub fn write_bits(&mut self, value: u32, n: u8) -> io::Result<()> {
        debug_assert!(n <= 32);
        for shift in (0..n).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.accumulator |= 1 << (7 - self.filled);
        }
        self.filled += 1;
        self.bits_written += 1;
        if self.filled == 8 {
            self.inner.write_all(&[self.accumulator])?;
            self.accumulator = 0;
            self.filled = 0;
        }
        Ok(())
    }

    /// Total bits written so far, excluding padding
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Pad the trailing byte with zeros and flush the sink.
    pub fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        self.flush_partial()?;
        self.inner.flush()
    }

    fn flush_partial(&mut self) -> io::Result<()> {
        if self.filled > 0 {
            self.inner.write_all(&[self.accumulator])?;
            self.accumulator = 0;
            self.filled = 0;
        }
        Ok(())
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        if !self.finished {
            // Errors cannot be reported from drop; the caller already has one.
            let _ = self.flush_partial();
            let _ = self.inner.flush();
        }
    }
}

/// Reads bits MSB-first, fetching a source byte whenever the current one runs out.
///
/// Each fetch records whether it produced a byte. Once the source is empty the
/// reader keeps returning zero bits and [`BitReader::exhausted`] reports `true`.
pub struct BitReader<R: Read> {
    inner: R,
    accumulator: u8,
    /// Unread bits left in the accumulator
    remaining: u8,
    exhausted: bool,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, accumulator: 0, remaining: 0, exhausted: false, bytes_read: 0 }
    }

    /// Read `n` bits (0-32) and return them right-aligned
    pub fn read_bits(&mut self, n: u8) -> io::Result<u32> {
        debug_assert!(n <= 32);
        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    pub fn read_bit(&mut self) -> io::Result<bool> {
        if self.remaining == 0 {
            match read_byte(&mut self.inner)? {
                Some(byte) => {
                    self.accumulator = byte;
                    self.exhausted = false;
                    self.bytes_read += 1;
                }
                None => {
                    self.accumulator = 0;
                    self.exhausted = true;
                }
            }
            self.remaining = 8;
        }
        self.remaining -= 1;
        Ok((self.accumulator >> self.remaining) & 1 == 1)
    }

    /// True if the most recent byte fetch found the source empty
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// Source bytes consumed so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_write_bits_msb_first() -> io::Result<()> {
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.write_bits(0b1, 1)?;
        writer.write_bits(0b0110_1001, 8)?;
        writer.write_bits(0b101, 3)?;
        assert_eq!(writer.bits_written(), 12);
        writer.finish()?;
        drop(writer);

        assert_eq!(out, vec![0b1011_0100, 0b1101_0000]);
        Ok(())
    }

    #[test]
    fn test_finish_without_partial_byte_adds_nothing() -> io::Result<()> {
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.write_bits(0xAB, 8)?;
        writer.finish()?;
        drop(writer);
        assert_eq!(out, vec![0xAB]);

        let mut empty = Vec::new();
        BitWriter::new(&mut empty).finish()?;
        assert!(empty.is_empty());
        Ok(())
    }

    #[test]
    fn test_drop_flushes_partial_byte() -> io::Result<()> {
        let mut out = Vec::new();
        {
            let mut writer = BitWriter::new(&mut out);
            writer.write_bits(0b111, 3)?;
        }
        assert_eq!(out, vec![0b1110_0000]);
        Ok(())
    }

    #[test]
    fn test_read_bits_across_bytes() -> io::Result<()> {
        let mut reader = BitReader::new(Cursor::new(vec![0b1011_0100, 0b1101_0000]));
        assert_eq!(reader.read_bits(1)?, 1);
        assert_eq!(reader.read_bits(8)?, 0b0110_1001);
        assert_eq!(reader.read_bits(3)?, 0b101);
        assert!(!reader.exhausted());
        assert_eq!(reader.bytes_read(), 2);
        Ok(())
    }

    #[test]
    fn test_exhaustion_yields_zero_bits() -> io::Result<()> {
        let mut reader = BitReader::new(Cursor::new(vec![0xFF]));
        assert_eq!(reader.read_bits(8)?, 0xFF);
        // The last fetch succeeded, so no exhaustion until a new byte is needed
        assert!(!reader.exhausted());
        assert_eq!(reader.read_bits(4)?, 0);
        assert!(reader.exhausted());
        assert_eq!(reader.read_bits(12)?, 0);
        assert!(reader.exhausted());
        assert_eq!(reader.bytes_read(), 1);
        Ok(())
    }

    #[test]
    fn test_read_byte_helper() -> io::Result<()> {
        let mut source = Cursor::new(vec![7u8]);
        assert_eq!(read_byte(&mut source)?, Some(7));
        assert_eq!(read_byte(&mut source)?, None);
        Ok(())
    }
}

use thiserror::Error;

pub const MAX_PACKET_SIZE: usize = 512;
const MAX_LABEL_LENGTH: usize = 63;
const MAX_JUMPS: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BufferError {
    #[error("End of buffer")]
    EndOfBuffer,
    #[error("Position {0} out of bounds")]
    OutOfBounds(usize),
    #[error("Data too large: {0} bytes")]
    TooLarge(usize),
    #[error("Limit of 5 compression jumps exceeded")]
    TooManyJumps,
    #[error("Label '{0}' exceeds 63 bytes")]
    LabelTooLong(String),
    #[error("Empty label in name '{0}'")]
    EmptyLabel(String),
}

/// Fixed-size buffer for a single UDP DNS message.
///
/// Reads past `len` (the amount of data loaded) fail, so a short reply cannot
/// be decoded from stale zero bytes.
pub struct PacketBuffer {
    buf: [u8; MAX_PACKET_SIZE],
    pos: usize,
    len: usize,
}

impl PacketBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_PACKET_SIZE],
            pos: 0,
            len: MAX_PACKET_SIZE,
        }
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, BufferError> {
        let mut buffer = Self::new();
        buffer.set_data(data)?;
        Ok(buffer)
    }

    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    pub fn set_data(&mut self, data: &[u8]) -> Result<(), BufferError> {
        if data.len() > self.buf.len() {
            return Err(BufferError::TooLarge(data.len()));
        }

        self.buf[..data.len()].copy_from_slice(data);
        self.pos = 0;
        self.len = data.len();

        Ok(())
    }

    pub const fn pos(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) -> Result<(), BufferError> {
        if pos > self.len {
            return Err(BufferError::OutOfBounds(pos));
        }
        self.pos = pos;
        Ok(())
    }

    fn get_byte(&self, pos: usize) -> Result<u8, BufferError> {
        if pos >= self.len {
            return Err(BufferError::EndOfBuffer);
        }
        Ok(self.buf[pos])
    }

    fn get_range(&self, start: usize, len: usize) -> Result<&[u8], BufferError> {
        let end = start.checked_add(len).ok_or(BufferError::EndOfBuffer)?;
        if end > self.len {
            return Err(BufferError::EndOfBuffer);
        }
        Ok(&self.buf[start..end])
    }

    pub fn read_u8(&mut self) -> Result<u8, BufferError> {
        let byte = self.get_byte(self.pos)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> Result<u16, BufferError> {
        let bytes = self.get_range(self.pos, 2)?;
        let value = u16::from_be_bytes([bytes[0], bytes[1]]);
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32, BufferError> {
        let bytes = self.get_range(self.pos, 4)?;
        let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        self.pos += 4;
        Ok(value)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, BufferError> {
        let bytes = self.get_range(self.pos, len)?.to_vec();
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a possibly compressed domain name, lowercased and without a
    /// trailing dot. The root name reads as an empty string.
    pub fn read_qname(&mut self) -> Result<String, BufferError> {
        let mut name = String::new();
        let mut pos = self.pos;
        let mut jumped = false;
        let mut jumps = 0;

        loop {
            let len = self.get_byte(pos)?;

            // Compression pointer: two high bits set, 14-bit offset follows
            if (len & 0xC0) == 0xC0 {
                if jumps >= MAX_JUMPS {
                    return Err(BufferError::TooManyJumps);
                }
                let low = self.get_byte(pos + 1)?;
                if !jumped {
                    self.seek(pos + 2)?;
                }
                pos = (usize::from(len & 0x3F) << 8) | usize::from(low);
                jumped = true;
                jumps += 1;
                continue;
            }

            pos += 1;
            if len == 0 {
                break;
            }

            if !name.is_empty() {
                name.push('.');
            }
            let label = self.get_range(pos, usize::from(len))?;
            name.extend(label.iter().map(|&b| (b as char).to_ascii_lowercase()));
            pos += usize::from(len);
        }

        if !jumped {
            self.seek(pos)?;
        }

        Ok(name)
    }

    pub fn write_u8(&mut self, val: u8) -> Result<(), BufferError> {
        if self.pos >= self.buf.len() {
            return Err(BufferError::EndOfBuffer);
        }
        self.buf[self.pos] = val;
        self.pos += 1;
        Ok(())
    }

    pub fn write_u16(&mut self, val: u16) -> Result<(), BufferError> {
        val.to_be_bytes().iter().try_for_each(|&b| self.write_u8(b))
    }

    pub fn write_u32(&mut self, val: u32) -> Result<(), BufferError> {
        val.to_be_bytes().iter().try_for_each(|&b| self.write_u8(b))
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), BufferError> {
        data.iter().try_for_each(|&b| self.write_u8(b))
    }

    /// Overwrites two bytes at an already written position, used to
    /// back-patch RDATA lengths.
    pub fn set_u16(&mut self, pos: usize, val: u16) -> Result<(), BufferError> {
        if pos + 1 >= self.buf.len() {
            return Err(BufferError::OutOfBounds(pos));
        }
        self.buf[pos..pos + 2].copy_from_slice(&val.to_be_bytes());
        Ok(())
    }

    /// Writes an uncompressed domain name. A single trailing dot is accepted
    /// and the empty string encodes the root.
    pub fn write_qname(&mut self, domain: &str) -> Result<(), BufferError> {
        let domain = domain.strip_suffix('.').unwrap_or(domain);

        if !domain.is_empty() {
            for label in domain.split('.') {
                if label.is_empty() {
                    return Err(BufferError::EmptyLabel(domain.to_owned()));
                }
                let len = u8::try_from(label.len())
                    .ok()
                    .filter(|&len| usize::from(len) <= MAX_LABEL_LENGTH)
                    .ok_or_else(|| BufferError::LabelTooLong(label.to_owned()))?;
                self.write_u8(len)?;
                self.write_bytes(label.as_bytes())?;
            }
        }

        self.write_u8(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_data() {
        let mut buffer = PacketBuffer::new();
        let data = [1, 2, 3, 4, 5];
        buffer.set_data(&data).unwrap();
        assert_eq!(&buffer.buf[0..5], &data);
        assert_eq!(buffer.pos(), 0);
    }

    #[test]
    fn test_set_data_too_large() {
        let mut buffer = PacketBuffer::new();
        let data = [0u8; 513];
        assert_eq!(buffer.set_data(&data), Err(BufferError::TooLarge(513)));
    }

    #[test]
    fn test_read_integers() {
        let mut buffer = PacketBuffer::from_slice(&[0x01, 0x12, 0x34, 0x12, 0x34, 0x56, 0x78]).unwrap();
        assert_eq!(buffer.read_u8().unwrap(), 0x01);
        assert_eq!(buffer.read_u16().unwrap(), 0x1234);
        assert_eq!(buffer.read_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_read_past_loaded_data() {
        let mut buffer = PacketBuffer::from_slice(&[0x12, 0x34, 0x56]).unwrap();
        assert_eq!(buffer.read_u16().unwrap(), 0x1234);
        assert_eq!(buffer.read_u16(), Err(BufferError::EndOfBuffer));
        assert_eq!(buffer.read_u32(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn test_write_u16_out_of_bounds() {
        let mut buffer = PacketBuffer::new();
        buffer.seek(511).unwrap();
        assert!(buffer.write_u16(0x1234).is_err());
    }

    #[test]
    fn test_write_qname() {
        let mut buffer = PacketBuffer::new();
        buffer.write_qname("example.com").unwrap();
        assert_eq!(buffer.written(), b"\x07example\x03com\x00");
    }

    #[test]
    fn test_write_qname_trailing_dot_and_root() {
        let mut buffer = PacketBuffer::new();
        buffer.write_qname("arpa.").unwrap();
        buffer.write_qname("").unwrap();
        assert_eq!(buffer.written(), b"\x04arpa\x00\x00");
    }

    #[test]
    fn test_write_qname_rejects_bad_labels() {
        let mut buffer = PacketBuffer::new();
        let long_label = "a".repeat(64);
        assert!(matches!(
            buffer.write_qname(&long_label),
            Err(BufferError::LabelTooLong(_))
        ));
        assert!(matches!(
            buffer.write_qname("example..com"),
            Err(BufferError::EmptyLabel(_))
        ));
    }

    #[test]
    fn test_read_qname_lowercases() {
        let mut buffer = PacketBuffer::from_slice(b"\x07EXAMPLE\x03Com\x00").unwrap();
        assert_eq!(buffer.read_qname().unwrap(), "example.com");
        assert_eq!(buffer.pos(), 13);
    }

    #[test]
    fn test_read_qname_follows_pointer() {
        // "com" at 0, then "example" + pointer to offset 0 at 5
        let data = b"\x03com\x00\x07example\xC0\x00\xFF";
        let mut buffer = PacketBuffer::from_slice(data).unwrap();
        buffer.seek(5).unwrap();
        assert_eq!(buffer.read_qname().unwrap(), "example.com");
        // Position continues right after the pointer
        assert_eq!(buffer.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn test_read_qname_pointer_loop() {
        let mut buffer = PacketBuffer::from_slice(&[0xC0, 0x00]).unwrap();
        assert_eq!(buffer.read_qname(), Err(BufferError::TooManyJumps));
    }

    #[test]
    fn test_read_qname_truncated() {
        let mut buffer = PacketBuffer::from_slice(b"\x07exam").unwrap();
        assert_eq!(buffer.read_qname(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn test_seek_bounds() {
        let mut buffer = PacketBuffer::from_slice(&[0; 10]).unwrap();
        buffer.seek(5).unwrap();
        assert_eq!(buffer.pos(), 5);
        buffer.seek(10).unwrap();
        assert!(buffer.seek(11).is_err());
    }

    #[test]
    fn test_set_u16_back_patch() {
        let mut buffer = PacketBuffer::new();
        buffer.write_u16(0).unwrap();
        buffer.write_u8(0xAA).unwrap();
        buffer.set_u16(0, 0xBEEF).unwrap();
        assert_eq!(buffer.written(), &[0xBE, 0xEF, 0xAA]);
    }
}

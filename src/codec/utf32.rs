use super::{validate, ByteOrder, Decoded, DecodeError};


pub struct Utf32 {
    order: ByteOrder,
    buffer: [u8; 4],
    len: usize,
}

impl Utf32 {
    pub fn new(order: ByteOrder) -> Utf32 {
        Utf32 {
            order,
            buffer: [0; 4],
            len: 0,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn advance(&mut self, byte: u8) -> Decoded {
        self.buffer[self.len] = byte;
        self.len += 1;

        if self.len < 4 {
            return Decoded::Incomplete;
        }

        self.len = 0;

        match validate(self.order.read_u32(self.buffer)) {
            Ok(codepoint) => Decoded::Codepoint(codepoint),
            Err(err) => Decoded::Malformed(err),
        }
    }

    pub fn finish(&mut self) -> Decoded {
        let pending = self.len;

        self.len = 0;

        match pending {
            0 => Decoded::Incomplete,
            pending => Decoded::Malformed(DecodeError::TruncatedSequence(pending)),
        }
    }
}

pub fn encode_utf32(codepoint: u32, order: ByteOrder) -> [u8; 4] {
    order.write_u32(codepoint)
}

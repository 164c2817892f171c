use super::{ByteOrder, Decoded, DecodeError};

const LEAD_SURROGATES: std::ops::RangeInclusive<u16> = 0xd800..=0xdbff;
const TRAIL_SURROGATES: std::ops::RangeInclusive<u16> = 0xdc00..=0xdfff;


/// Two bytes per code unit, four while a lead surrogate waits for its trail.
pub struct Utf16 {
    order: ByteOrder,
    buffer: [u8; 4],
    len: usize,
}

impl Utf16 {
    pub fn new(order: ByteOrder) -> Utf16 {
        Utf16 {
            order,
            buffer: [0; 4],
            len: 0,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    fn unit(&self, at: usize) -> u16 {
        self.order.read_u16([self.buffer[at], self.buffer[at + 1]])
    }

    pub fn advance(&mut self, byte: u8) -> Decoded {
        self.buffer[self.len] = byte;
        self.len += 1;

        match self.len {
            2 => {
                let unit = self.unit(0);

                if LEAD_SURROGATES.contains(&unit) {
                    return Decoded::Incomplete;
                }

                self.len = 0;

                match TRAIL_SURROGATES.contains(&unit) {
                    true => Decoded::Malformed(DecodeError::UnpairedTrailingSurrogate(unit)),
                    false => Decoded::Codepoint(unit as u32),
                }
            },
            4 => {
                let lead = self.unit(0);
                let unit = self.unit(2);

                if TRAIL_SURROGATES.contains(&unit) {
                    self.len = 0;

                    return Decoded::Codepoint(0x10000 + (((lead - 0xd800) as u32) << 10) + (unit - 0xdc00) as u32);
                }

                let err = DecodeError::UnpairedLeadingSurrogate { lead, unit };

                if LEAD_SURROGATES.contains(&unit) {
                    self.buffer.copy_within(2..4, 0);
                    self.len = 2;

                    Decoded::Malformed(err)
                } else {
                    self.len = 0;

                    Decoded::Interrupted(err, unit as u32)
                }
            },
            _ => Decoded::Incomplete,
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

/// Writes one unit, or a lead and trail surrogate for code points above the BMP.
pub fn encode_utf16(codepoint: u32, order: ByteOrder, buffer: &mut [u8; 4]) -> usize {
    if codepoint <= 0xffff {
        buffer[..2].copy_from_slice(&order.write_u16(codepoint as u16));

        return 2;
    }

    let offset = codepoint - 0x10000;
    let lead = (offset >> 10) as u16 + 0xd800;
    let trail = (offset & 0b11_1111_1111) as u16 + 0xdc00;

    buffer[..2].copy_from_slice(&order.write_u16(lead));
    buffer[2..].copy_from_slice(&order.write_u16(trail));

    4
}

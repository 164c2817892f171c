use super::{validate, Decoded, DecodeError, InternalInvariantViolation, MAX_CODEPOINT};

use tracing::trace;


#[derive(Debug)]
enum Action {
    Emit(u8),
    Lead(u8),
    Continue(u8),
    Interrupt(u8),
    Discard(u8, u8),
    Invalid(DecodeError),
}

/// Continuation bytes still expected by the pending sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Tail1,
    Tail2,
    Tail3,
}

impl State {
    fn remaining(&self) -> u8 {
        match self {
            State::Ground => 0,
            State::Tail1 => 1,
            State::Tail2 => 2,
            State::Tail3 => 3,
        }
    }

    fn expecting(following: u8) -> State {
        match following {
            1 => State::Tail1,
            2 => State::Tail2,
            _ => State::Tail3,
        }
    }

    fn advance(&mut self, byte: u8) -> Action {
        match (byte, *self) {
            // 1 byte
            (0x00..=0x7f, State::Ground) => Action::Emit(byte),
            (0x00..=0x7f, _) => {
                *self = State::Ground;

                Action::Interrupt(byte)
            },
            // 0b10xxxxxx
            (0x80..=0xbf, State::Ground) => Action::Invalid(DecodeError::UnexpectedContinuation(byte)),
            (0x80..=0xbf, State::Tail3) => {
                *self = State::Tail2;

                Action::Continue(byte)
            },
            (0x80..=0xbf, State::Tail2) => {
                *self = State::Tail1;

                Action::Continue(byte)
            },
            (0x80..=0xbf, State::Tail1) => {
                *self = State::Ground;

                Action::Continue(byte)
            },
            // 0b110xxxxx, 0b1110xxxx, 0b11110xxx
            (0xc0..=0xf7, State::Ground) => {
                let following = match byte {
                    0xc0..=0xdf => 1,
                    0xe0..=0xef => 2,
                    _ => 3,
                };

                *self = State::expecting(following);

                Action::Lead(byte)
            },
            // a leader cutting a sequence short is dropped with it
            (0xc0..=0xf7, state) => {
                *self = State::Ground;

                Action::Discard(byte, state.remaining())
            },
            _ => {
                *self = State::Ground;

                Action::Invalid(DecodeError::InvalidLeadingByte(byte))
            },
        }
    }
}

pub struct Utf8 {
    state: State,
    buffer: [u8; 4],
    len: usize,
}

impl Utf8 {
    pub fn new() -> Utf8 {
        Utf8 {
            state: State::Ground,
            buffer: [0; 4],
            len: 0,
        }
    }

    pub fn advance(&mut self, byte: u8) -> Result<Decoded, InternalInvariantViolation> {
        let remaining = self.state.remaining();
        let action = self.state.advance(byte);

        trace!(byte, ?action, state = ?self.state, "utf8");

        match action {
            Action::Emit(byte) => Ok(Decoded::Codepoint(byte as u32)),
            Action::Lead(byte) => {
                self.buffer[0] = byte;
                self.len = 1;

                Ok(Decoded::Incomplete)
            },
            Action::Continue(byte) => {
                self.buffer[self.len] = byte;
                self.len += 1;

                if self.state != State::Ground {
                    return Ok(Decoded::Incomplete);
                }

                let len = self.len;
                self.len = 0;

                let codepoint = sequence_to_codepoint(&self.buffer[..len])?;

                match validate(codepoint) {
                    Ok(codepoint) if minimal_length(codepoint) < len => {
                        Ok(Decoded::Malformed(DecodeError::OverlongEncoding { codepoint, len }))
                    },
                    Ok(codepoint) => Ok(Decoded::Codepoint(codepoint)),
                    Err(err) => Ok(Decoded::Malformed(err)),
                }
            },
            Action::Interrupt(byte) => {
                self.len = 0;

                Ok(Decoded::Interrupted(DecodeError::UnexpectedLeadingByte { remaining, byte }, byte as u32))
            },
            Action::Discard(byte, remaining) => {
                self.len = 0;

                Ok(Decoded::Malformed(DecodeError::UnexpectedLeadingByte { remaining, byte }))
            },
            Action::Invalid(err) => {
                self.len = 0;

                Ok(Decoded::Malformed(err))
            },
        }
    }

    pub fn finish(&mut self) -> Decoded {
        let pending = self.len;

        self.state = State::Ground;
        self.len = 0;

        match pending {
            0 => Decoded::Incomplete,
            pending => Decoded::Malformed(DecodeError::TruncatedSequence(pending)),
        }
    }
}

/// Assembles an already classified sequence; overlong forms are left to the caller.
fn sequence_to_codepoint(sequence: &[u8]) -> Result<u32, InternalInvariantViolation> {
    let mask = match sequence.len() {
        2 => 0x1f,
        3 => 0x0f,
        4 => 0x07,
        len => return Err(InternalInvariantViolation(format!("utf8 sequence of length {}", len))),
    };

    Ok(sequence[1..].iter().fold((sequence[0] & mask) as u32, |point, byte| (point << 6) | (*byte as u32 & 0b0011_1111)))
}

fn minimal_length(codepoint: u32) -> usize {
    match codepoint {
        0..=0x7f => 1,
        0x80..=0x7ff => 2,
        0x800..=0xffff => 3,
        _ => 4,
    }
}

pub fn encode_utf8(codepoint: u32, buffer: &mut [u8; 4]) -> Result<usize, InternalInvariantViolation> {
    match codepoint {
        0..=0x7f => {
            buffer[0] = codepoint as u8;

            Ok(1)
        },
        0x80..=0x7ff => {
            buffer[0] = 0b1100_0000 | (codepoint >> 6) as u8;
            buffer[1] = 0b1000_0000 | (codepoint & 0b0011_1111) as u8;

            Ok(2)
        },
        0x800..=0xffff => {
            buffer[0] = 0b1110_0000 | (codepoint >> 12) as u8;
            buffer[1] = 0b1000_0000 | ((codepoint >> 6) & 0b0011_1111) as u8;
            buffer[2] = 0b1000_0000 | (codepoint & 0b0011_1111) as u8;

            Ok(3)
        },
        0x10000..=MAX_CODEPOINT => {
            buffer[0] = 0b1111_0000 | (codepoint >> 18) as u8;
            buffer[1] = 0b1000_0000 | ((codepoint >> 12) & 0b0011_1111) as u8;
            buffer[2] = 0b1000_0000 | ((codepoint >> 6) & 0b0011_1111) as u8;
            buffer[3] = 0b1000_0000 | (codepoint & 0b0011_1111) as u8;

            Ok(4)
        },
        _ => Err(InternalInvariantViolation(format!("cannot encode {:#x} as utf8", codepoint))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Vec<Decoded> {
        let mut utf8 = Utf8::new();

        bytes.iter()
            .map(|byte| utf8.advance(*byte).unwrap())
            .filter(|decoded| *decoded != Decoded::Incomplete)
            .collect()
    }

    struct Receiver {
        points: Vec<u32>,
        invalid: usize,
    }

    impl utf8parse::Receiver for Receiver {
        fn codepoint(&mut self, c: char) {
            self.points.push(c as u32);
        }

        fn invalid_sequence(&mut self) {
            self.invalid += 1;
        }
    }

    #[test]
    fn decode_test() {
        let text = "hello Ж ✳ 𝄞 ─";

        let points = decode(text.as_bytes());

        assert_eq!(points, text.chars().map(|c| Decoded::Codepoint(c as u32)).collect::<Vec<_>>());
    }

    #[test]
    fn agrees_with_utf8parse() {
        let text = "ascii, ÅÄÖ åäö, ∮ E⋅da = Q, 𝔘𝔫𝔦𝔠𝔬𝔡𝔢 🦀, ﬀ ᄀ가";

        let mut receiver = Receiver { points: Vec::new(), invalid: 0 };
        let mut parser = utf8parse::Parser::new();

        for byte in text.as_bytes() {
            parser.advance(&mut receiver, *byte);
        }

        let ours = decode(text.as_bytes())
            .into_iter()
            .map(|decoded| match decoded {
                Decoded::Codepoint(point) => point,
                other => panic!("unexpected {:?}", other),
            })
            .collect::<Vec<u32>>();

        assert_eq!(receiver.invalid, 0);
        assert_eq!(ours, receiver.points);
    }

    #[test]
    fn overlong() {
        assert_eq!(
            decode(&[0xc1, 0x81]),
            vec![Decoded::Malformed(DecodeError::OverlongEncoding { codepoint: 0x41, len: 2 })],
        );

        assert_eq!(
            decode(&[0xe0, 0x80, 0xaf]),
            vec![Decoded::Malformed(DecodeError::OverlongEncoding { codepoint: 0x2f, len: 3 })],
        );

        assert_eq!(
            decode(&[0xf0, 0x8f, 0xbf, 0xbf]),
            vec![Decoded::Malformed(DecodeError::OverlongEncoding { codepoint: 0xffff, len: 4 })],
        );

        assert_eq!(decode(&[0xc2, 0x80]), vec![Decoded::Codepoint(0x80)]);
    }

    #[test]
    fn surrogate() {
        assert_eq!(decode(&[0xed, 0xa0, 0x80]), vec![Decoded::Malformed(DecodeError::UnexpectedSurrogate(0xd800))]);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(
            decode(&[0xf4, 0x90, 0x80, 0x80]),
            vec![Decoded::Malformed(DecodeError::CodePointOutOfRange(0x110000))],
        );

        assert_eq!(decode(&[0xf4, 0x8f, 0xbf, 0xbf]), vec![Decoded::Codepoint(0x10ffff)]);
    }

    #[test]
    fn truncated_then_resync() {
        let decoded = decode(&[0xe2, 0x28, 0xa1]);

        assert_eq!(
            decoded,
            vec![
                Decoded::Interrupted(DecodeError::UnexpectedLeadingByte { remaining: 2, byte: 0x28 }, 0x28),
                Decoded::Malformed(DecodeError::UnexpectedContinuation(0xa1)),
            ],
        );
    }

    #[test]
    fn leading_byte_is_discarded_with_pending_sequence() {
        assert_eq!(
            decode(&[0xc3, 0xe2, 0x82, 0xac]),
            vec![
                Decoded::Malformed(DecodeError::UnexpectedLeadingByte { remaining: 1, byte: 0xe2 }),
                Decoded::Malformed(DecodeError::UnexpectedContinuation(0x82)),
                Decoded::Malformed(DecodeError::UnexpectedContinuation(0xac)),
            ],
        );

        // decoding is back in step at the next leader
        assert_eq!(
            decode(&[0xe2, 0x82, 0xc3, 0xc3, 0xb6]),
            vec![
                Decoded::Malformed(DecodeError::UnexpectedLeadingByte { remaining: 1, byte: 0xc3 }),
                Decoded::Codepoint(0xf6),
            ],
        );
    }

    #[test]
    fn invalid_byte_discards_pending() {
        assert_eq!(
            decode(&[0xe2, 0x82, 0xf8, 0xac, 0x41]),
            vec![
                Decoded::Malformed(DecodeError::InvalidLeadingByte(0xf8)),
                Decoded::Malformed(DecodeError::UnexpectedContinuation(0xac)),
                Decoded::Codepoint(0x41),
            ],
        );

        assert_eq!(decode(&[0xff]), vec![Decoded::Malformed(DecodeError::InvalidLeadingByte(0xff))]);
    }

    #[test]
    fn encode() {
        let mut buf = [0; 4];

        for c in ['A', 'ö', '€', '🦀'] {
            let len = encode_utf8(c as u32, &mut buf).unwrap();

            assert_eq!(&buf[..len], c.to_string().as_bytes());
        }

        assert!(encode_utf8(0x110000, &mut buf).is_err());
    }

    #[test]
    fn length_checked_before_assembly() {
        assert!(sequence_to_codepoint(&[0x41]).is_err());
        assert_eq!(sequence_to_codepoint(&[0xc3, 0xb6]), Ok(0xf6));
    }
}

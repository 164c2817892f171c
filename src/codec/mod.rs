mod textual;
mod utf16;
mod utf32;
mod utf8;

pub use textual::Textual;
pub use utf16::{encode_utf16, Utf16};
pub use utf32::{encode_utf32, Utf32};
pub use utf8::{encode_utf8, Utf8};

use thiserror::Error;

use std::fmt;
use std::str::FromStr;

pub const MAX_CODEPOINT: u32 = 0x10ffff;
pub const REPLACEMENT_CHARACTER: u32 = 0xfffd;

const SURROGATES: std::ops::RangeInclusive<u32> = 0xd800..=0xdfff;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    pub fn write_u16(self, unit: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => unit.to_le_bytes(),
            ByteOrder::Big => unit.to_be_bytes(),
        }
    }

    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }

    pub fn write_u32(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}

/// How the input byte stream is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Utf8,
    Utf16(ByteOrder),
    Utf32(ByteOrder),
    Codepoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid {1}")]
pub struct ParseFormatError(pub String, pub &'static str);

impl FromStr for InputFormat {
    type Err = ParseFormatError;

    fn from_str(name: &str) -> Result<InputFormat, ParseFormatError> {
        match name {
            "utf8" => Ok(InputFormat::Utf8),
            "utf16le" | "utf16-le" | "utf16" | "utf-16" => Ok(InputFormat::Utf16(ByteOrder::Little)),
            "utf16be" | "utf16-be" => Ok(InputFormat::Utf16(ByteOrder::Big)),
            "utf32le" | "utf32-le" | "utf32" | "utf-32" => Ok(InputFormat::Utf32(ByteOrder::Little)),
            "utf32be" | "utf32-be" => Ok(InputFormat::Utf32(ByteOrder::Big)),
            "codepoint" => Ok(InputFormat::Codepoint),
            _ => Err(ParseFormatError(name.to_string(), "decode format")),
        }
    }
}

/// Malformed input, reported per decode attempt and handled by the stream policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected continuation byte {0:#04X}")]
    UnexpectedContinuation(u8),
    #[error("expected {remaining} continuation byte(s), received {byte:#04X}")]
    UnexpectedLeadingByte { remaining: u8, byte: u8 },
    #[error("invalid byte {0:#04X}")]
    InvalidLeadingByte(u8),
    #[error("code point out of range: {0:#X}")]
    CodePointOutOfRange(u32),
    #[error("unexpected surrogate U+{0:04X}")]
    UnexpectedSurrogate(u32),
    #[error("overlong encoding of U+{codepoint:04X} using {len} bytes")]
    OverlongEncoding { codepoint: u32, len: usize },
    #[error("unpaired trailing surrogate {0:#06X}")]
    UnpairedTrailingSurrogate(u16),
    #[error("leading surrogate {lead:#06X} followed by {unit:#06X}")]
    UnpairedLeadingSurrogate { lead: u16, unit: u16 },
    #[error("cannot parse into code point: '{0}'")]
    UnparsableToken(String),
    #[error("token longer than {0} bytes")]
    TokenTooLong(usize),
    #[error("input ended inside a sequence, {0} byte(s) pending")]
    TruncatedSequence(usize),
}

/// A state that well-formed or malformed input can never reach.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InternalInvariantViolation(pub String);

/// Outcome of feeding one byte to a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Incomplete,
    Codepoint(u32),
    Malformed(DecodeError),
    /// A pending sequence was cut short by a unit that decoded on its own.
    Interrupted(DecodeError, u32),
}

/// Shared range check for every decoded value.
pub fn validate(codepoint: u32) -> Result<u32, DecodeError> {
    if codepoint > MAX_CODEPOINT {
        Err(DecodeError::CodePointOutOfRange(codepoint))
    } else if SURROGATES.contains(&codepoint) {
        Err(DecodeError::UnexpectedSurrogate(codepoint))
    } else {
        Ok(codepoint)
    }
}

pub enum Decoder {
    Utf8(Utf8),
    Utf16(Utf16),
    Utf32(Utf32),
    Textual(Textual),
}

impl fmt::Debug for Decoder {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decoder::Utf8(_) => fmt.write_str("Decoder::Utf8"),
            Decoder::Utf16(utf16) => write!(fmt, "Decoder::Utf16({:?})", utf16.order()),
            Decoder::Utf32(utf32) => write!(fmt, "Decoder::Utf32({:?})", utf32.order()),
            Decoder::Textual(_) => fmt.write_str("Decoder::Textual"),
        }
    }
}

impl Decoder {
    pub fn new(format: InputFormat) -> Decoder {
        match format {
            InputFormat::Utf8 => Decoder::Utf8(Utf8::new()),
            InputFormat::Utf16(order) => Decoder::Utf16(Utf16::new(order)),
            InputFormat::Utf32(order) => Decoder::Utf32(Utf32::new(order)),
            InputFormat::Codepoint => Decoder::Textual(Textual::new()),
        }
    }

    pub fn advance(&mut self, byte: u8) -> Result<Decoded, InternalInvariantViolation> {
        match self {
            Decoder::Utf8(utf8) => utf8.advance(byte),
            Decoder::Utf16(utf16) => Ok(utf16.advance(byte)),
            Decoder::Utf32(utf32) => Ok(utf32.advance(byte)),
            Decoder::Textual(textual) => Ok(textual.advance(byte)),
        }
    }

    /// Signals end of input, reporting whatever was left pending.
    pub fn finish(&mut self) -> Decoded {
        match self {
            Decoder::Utf8(utf8) => utf8.finish(),
            Decoder::Utf16(utf16) => utf16.finish(),
            Decoder::Utf32(utf32) => utf32.finish(),
            Decoder::Textual(textual) => textual.finish(),
        }
    }
}

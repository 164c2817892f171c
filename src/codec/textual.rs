use super::{validate, Decoded, DecodeError};

pub const MAX_TOKEN: usize = 16;


/// Whitespace separated `U+XXXX`, `0x..`, octal or decimal tokens.
pub struct Textual {
    buffer: [u8; MAX_TOKEN],
    len: usize,
    overflowed: bool,
}

impl Textual {
    pub fn new() -> Textual {
        Textual {
            buffer: [0; MAX_TOKEN],
            len: 0,
            overflowed: false,
        }
    }

    pub fn advance(&mut self, byte: u8) -> Decoded {
        if matches!(byte, b' ' | b'\t' | b'\r' | b'\n') {
            return self.end_token();
        }

        // the rest of an oversized token is dropped up to the next delimiter
        if self.overflowed {
            return Decoded::Incomplete;
        }

        if self.len == MAX_TOKEN {
            self.len = 0;
            self.overflowed = true;

            return Decoded::Malformed(DecodeError::TokenTooLong(MAX_TOKEN));
        }

        self.buffer[self.len] = byte;
        self.len += 1;

        Decoded::Incomplete
    }

    pub fn finish(&mut self) -> Decoded {
        self.end_token()
    }

    fn end_token(&mut self) -> Decoded {
        let len = self.len;

        self.len = 0;
        self.overflowed = false;

        if len == 0 {
            return Decoded::Incomplete;
        }

        let token = String::from_utf8_lossy(&self.buffer[..len]);

        match parse_token(&token).map(validate) {
            Some(Ok(codepoint)) => Decoded::Codepoint(codepoint),
            Some(Err(err)) => Decoded::Malformed(err),
            None => Decoded::Malformed(DecodeError::UnparsableToken(token.into_owned())),
        }
    }
}

/// C style integer literal with `U+` read as `0x`. Zero is indistinguishable from a failed parse.
fn parse_token(token: &str) -> Option<u32> {
    let literal = match token.strip_prefix("U+") {
        Some(hex) => format!("0x{}", hex),
        None => token.to_string(),
    };

    let (digits, radix) = if let Some(hex) = literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X")) {
        (hex, 16)
    } else if literal.len() > 1 && literal.starts_with('0') {
        (&literal[1..], 8)
    } else {
        (literal.as_str(), 10)
    };

    if digits.starts_with(['+', '-']) {
        return None;
    }

    match u64::from_str_radix(digits, radix) {
        Ok(0) | Err(_) => None,
        Ok(value) => Some(value.min(u32::MAX as u64) as u32),
    }
}

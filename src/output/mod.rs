use crate::codec::{self, ByteOrder, InternalInvariantViolation, ParseFormatError};
use crate::ucd::{self, Ucd};

use thiserror::Error;
use unicode_width::UnicodeWidthChar;

use std::fmt::Write as _;
use std::io::{self, Write};
use std::str::FromStr;

const DOTTED_CIRCLE: char = '\u{25cc}';


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Utf8,
    Utf16(ByteOrder),
    Utf32(ByteOrder),
    Codepoint,
    Decoding,
    Silent,
}

impl FromStr for OutputFormat {
    type Err = ParseFormatError;

    fn from_str(name: &str) -> Result<OutputFormat, ParseFormatError> {
        match name {
            "utf8" => Ok(OutputFormat::Utf8),
            "utf16le" | "utf16-le" | "utf16" | "utf-16" => Ok(OutputFormat::Utf16(ByteOrder::Little)),
            "utf16be" | "utf16-be" => Ok(OutputFormat::Utf16(ByteOrder::Big)),
            "utf32le" | "utf32-le" | "utf32" | "utf-32" => Ok(OutputFormat::Utf32(ByteOrder::Little)),
            "utf32be" | "utf32-be" => Ok(OutputFormat::Utf32(ByteOrder::Big)),
            "codepoint" => Ok(OutputFormat::Codepoint),
            "decoding" => Ok(OutputFormat::Decoding),
            "silent" => Ok(OutputFormat::Silent),
            _ => Err(ParseFormatError(name.to_string(), "encode format")),
        }
    }
}

impl OutputFormat {
    pub fn is_binary(&self) -> bool {
        matches!(self, OutputFormat::Utf8 | OutputFormat::Utf16(_) | OutputFormat::Utf32(_))
    }
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Internal(#[from] InternalInvariantViolation),
}

/// Extra columns of the `decoding` format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Details {
    pub block_info: bool,
    pub wcwidth: bool,
}

pub struct Formatter<'a> {
    format: OutputFormat,
    ucd: &'a Ucd,
    details: Details,
}

impl<'a> Formatter<'a> {
    pub fn new(format: OutputFormat, ucd: &'a Ucd, details: Details) -> Formatter<'a> {
        Formatter {
            format,
            ucd,
            details,
        }
    }

    pub fn write<W: Write>(&self, codepoint: u32, out: &mut W) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Utf8 => {
                let mut buf = [0; 4];
                let len = codec::encode_utf8(codepoint, &mut buf)?;

                out.write_all(&buf[..len])?;
            },
            OutputFormat::Utf16(order) => {
                let mut buf = [0; 4];
                let len = codec::encode_utf16(codepoint, order, &mut buf);

                out.write_all(&buf[..len])?;
            },
            OutputFormat::Utf32(order) => out.write_all(&codec::encode_utf32(codepoint, order))?,
            OutputFormat::Codepoint => writeln!(out, "U+{:04X}", codepoint)?,
            OutputFormat::Decoding => writeln!(out, "{}", self.describe(codepoint)?)?,
            OutputFormat::Silent => {},
        }

        Ok(())
    }

    pub fn describe(&self, codepoint: u32) -> Result<String, InternalInvariantViolation> {
        let c = char::from_u32(codepoint)
            .ok_or_else(|| InternalInvariantViolation(format!("U+{:04X} reached the formatter", codepoint)))?;

        let category = self.ucd.category(codepoint);
        let name = self.ucd.name(codepoint);

        let display = match codepoint {
            0x00..=0x1f => format!("^{}", (codepoint as u8 + 0x40) as char),
            0x7f => String::from("^?"),
            _ if category.is_combining() => format!("{}{}", DOTTED_CIRCLE, c),
            _ => c.to_string(),
        };

        let mut line = format!("'{}' = U+{:04X} ({})", display, codepoint, name.as_deref().unwrap_or("<unknown>"));

        if self.details.block_info {
            let plane = ucd::plane(codepoint)
                .ok_or_else(|| InternalInvariantViolation(format!("U+{:04X} lies outside every plane", codepoint)))?;

            let _ = write!(
                line,
                "  block: {}, plane: {}, category: {} ({})",
                self.ucd.block(codepoint).unwrap_or("No_Block"),
                plane,
                category.abbreviation(),
                category.description(),
            );

            let case = self.ucd.case_mapping(codepoint);

            for (label, mapping) in [("uppercase", case.uppercase), ("lowercase", case.lowercase), ("titlecase", case.titlecase)] {
                if let Some(mapping) = mapping {
                    let _ = write!(line, ", {}: U+{:04X}", label, mapping);
                }
            }
        }

        if self.details.wcwidth {
            match c.width() {
                Some(width) => {
                    let _ = write!(line, "  width: {}", width);
                },
                None => line.push_str("  width: none"),
            }
        }

        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ucd::tests::excerpt;

    fn render(format: OutputFormat, details: Details, codepoints: &[u32]) -> Vec<u8> {
        let ucd = excerpt();
        let formatter = Formatter::new(format, &ucd, details);
        let mut out = Vec::new();

        for codepoint in codepoints {
            formatter.write(*codepoint, &mut out).unwrap();
        }

        out
    }

    #[test]
    fn format_names() {
        assert_eq!("decoding".parse(), Ok(OutputFormat::Decoding));
        assert_eq!("utf16-be".parse(), Ok(OutputFormat::Utf16(ByteOrder::Big)));
        assert_eq!("silent".parse(), Ok(OutputFormat::Silent));
        assert!("utf7".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::Utf8.is_binary());
        assert!(!OutputFormat::Codepoint.is_binary());
    }

    #[test]
    fn binary_encodings() {
        let details = Details::default();

        assert_eq!(render(OutputFormat::Utf8, details, &[0x61, 0xf6, 0x1f980]), "aö🦀".as_bytes());
        assert_eq!(render(OutputFormat::Utf16(ByteOrder::Little), details, &[0x61, 0x1f4a9]), vec![0x61, 0x00, 0x3d, 0xd8, 0xa9, 0xdc]);
        assert_eq!(render(OutputFormat::Utf32(ByteOrder::Big), details, &[0x61]), vec![0x00, 0x00, 0x00, 0x61]);
        assert!(render(OutputFormat::Silent, details, &[0x61]).is_empty());
    }

    #[test]
    fn codepoint_lines() {
        assert_eq!(render(OutputFormat::Codepoint, Details::default(), &[0x61, 0x1f980]), b"U+0061\nU+1F980\n");
    }

    #[test]
    fn decoding_lines() {
        let output = render(OutputFormat::Decoding, Details::default(), &[0x61, 0x0a, 0x30a, 0x1234]);

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "'a' = U+0061 (LATIN SMALL LETTER A)\n\
             '^J' = U+000A (LINE FEED (LF))\n\
             '\u{25cc}\u{30a}' = U+030A (COMBINING RING ABOVE)\n\
             '\u{1234}' = U+1234 (<unknown>)\n",
        );
    }

    #[test]
    fn decoding_details() {
        let ucd = excerpt();
        let formatter = Formatter::new(OutputFormat::Decoding, &ucd, Details { block_info: true, wcwidth: true });

        assert_eq!(
            formatter.describe(0x61).unwrap(),
            "'a' = U+0061 (LATIN SMALL LETTER A)  block: Basic Latin, plane: 0 Basic Multilingual Plane (BMP), \
             category: Ll (a lowercase letter), uppercase: U+0041, titlecase: U+0041  width: 1",
        );

        assert_eq!(
            formatter.describe(0x4e2d).unwrap(),
            "'中' = U+4E2D (CJK UNIFIED IDEOGRAPH-4E2D)  block: CJK Unified Ideographs, \
             plane: 0 Basic Multilingual Plane (BMP), category: Lo (other letters, including syllables and ideographs)  width: 2",
        );

        assert!(formatter.describe(0x07).unwrap().ends_with("width: none"));
        assert!(formatter.describe(0xd800).is_err());
    }
}

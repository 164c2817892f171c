mod category;
mod hangul;

pub use category::GeneralCategory;

use thiserror::Error;
use tracing::{info, warn};

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const UNICODE_DATA: &str = "UnicodeData.txt";
pub const BLOCKS: &str = "Blocks.txt";


#[derive(Debug, Error)]
pub enum UcdError {
    #[error("{}: no such file", .0.display())]
    Missing(PathBuf),
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{file}:{line}: {reason}")]
    Parse { file: &'static str, line: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    /// tagged mappings such as `<compat>` or `<font>` only apply to NFKD
    pub compatibility: bool,
    pub mapping: Vec<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseMapping {
    pub uppercase: Option<u32>,
    pub lowercase: Option<u32>,
    pub titlecase: Option<u32>,
}

#[derive(Debug)]
struct Entry {
    codepoint: u32,
    name: Option<String>,
    category: GeneralCategory,
    combining_class: u8,
    decomposition: Option<Decomposition>,
    case: CaseMapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeName {
    CjkIdeograph,
    TangutIdeograph,
    HangulSyllable,
    Unnamed,
}

#[derive(Debug)]
struct Range {
    first: u32,
    last: u32,
    name: RangeName,
    category: GeneralCategory,
    combining_class: u8,
}

#[derive(Debug)]
struct Block {
    first: u32,
    last: u32,
    name: String,
}

/// Read-only view of `UnicodeData.txt` and `Blocks.txt`.
#[derive(Debug, Default)]
pub struct Ucd {
    entries: Vec<Entry>,
    ranges: Vec<Range>,
    blocks: Vec<Block>,
}

fn parse_hex(file: &'static str, line: usize, field: &str) -> Result<u32, UcdError> {
    u32::from_str_radix(field.trim(), 16).map_err(|err| UcdError::Parse {
        file,
        line,
        reason: format!("'{}' is not a code point: {}", field, err),
    })
}

fn parse_optional_hex(line: usize, field: &str) -> Result<Option<u32>, UcdError> {
    match field.trim() {
        "" => Ok(None),
        field => parse_hex(UNICODE_DATA, line, field).map(Some),
    }
}

impl Ucd {
    /// Without data every code point is an unnamed, unassigned starter.
    pub fn empty() -> Ucd {
        Ucd::default()
    }

    pub fn load(dir: &Path) -> Result<Ucd, UcdError> {
        let unicode_data = Self::read(&dir.join(UNICODE_DATA))?;

        let blocks = match Self::read(&dir.join(BLOCKS)) {
            Ok(blocks) => Some(blocks),
            Err(UcdError::Missing(path)) => {
                warn!(path = %path.display(), "no block names available");

                None
            },
            Err(err) => return Err(err),
        };

        let ucd = Ucd::parse(&unicode_data, blocks.as_deref())?;

        info!(
            dir = %dir.display(),
            entries = ucd.entries.len(),
            ranges = ucd.ranges.len(),
            blocks = ucd.blocks.len(),
            "loaded unicode character database"
        );

        Ok(ucd)
    }

    fn read(path: &Path) -> Result<String, UcdError> {
        fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => UcdError::Missing(path.to_path_buf()),
            _ => UcdError::Io { path: path.to_path_buf(), source },
        })
    }

    pub fn parse(unicode_data: &str, blocks: Option<&str>) -> Result<Ucd, UcdError> {
        let mut ucd = Ucd::default();
        let mut range_start: Option<(u32, RangeName)> = None;

        for (index, line) in unicode_data.lines().enumerate() {
            let line_number = index + 1;

            if line.trim().is_empty() {
                continue;
            }

            let fields = line.split(';').collect::<Vec<&str>>();

            if fields.len() < 15 {
                return Err(UcdError::Parse {
                    file: UNICODE_DATA,
                    line: line_number,
                    reason: format!("expected 15 fields, found {}", fields.len()),
                });
            }

            let codepoint = parse_hex(UNICODE_DATA, line_number, fields[0])?;

            let category = GeneralCategory::from_abbreviation(fields[2]).ok_or_else(|| UcdError::Parse {
                file: UNICODE_DATA,
                line: line_number,
                reason: format!("unknown general category '{}'", fields[2]),
            })?;

            let combining_class = fields[3].parse::<u8>().map_err(|err| UcdError::Parse {
                file: UNICODE_DATA,
                line: line_number,
                reason: format!("bad combining class '{}': {}", fields[3], err),
            })?;

            let name = fields[1];

            // <CJK Ideograph, First> ... <CJK Ideograph, Last>
            if let Some(label) = name.strip_prefix('<').and_then(|name| name.strip_suffix(", First>")) {
                range_start = Some((codepoint, Self::range_name(label)));

                continue;
            }

            if name.ends_with(", Last>") {
                let (first, name) = range_start.take().ok_or_else(|| UcdError::Parse {
                    file: UNICODE_DATA,
                    line: line_number,
                    reason: String::from("range end without a start"),
                })?;

                ucd.ranges.push(Range { first, last: codepoint, name, category, combining_class });

                continue;
            }

            let name = match name {
                "<control>" if !fields[10].is_empty() => Some(fields[10].to_string()),
                "<control>" => None,
                name => Some(name.to_string()),
            };

            let decomposition = Self::parse_decomposition(line_number, fields[5])?;

            let case = CaseMapping {
                uppercase: parse_optional_hex(line_number, fields[12])?,
                lowercase: parse_optional_hex(line_number, fields[13])?,
                titlecase: parse_optional_hex(line_number, fields[14])?,
            };

            ucd.entries.push(Entry { codepoint, name, category, combining_class, decomposition, case });
        }

        ucd.entries.sort_by_key(|entry| entry.codepoint);

        if let Some(blocks) = blocks {
            ucd.blocks = Self::parse_blocks(blocks)?;
        }

        Ok(ucd)
    }

    fn range_name(label: &str) -> RangeName {
        if label.starts_with("CJK Ideograph") {
            RangeName::CjkIdeograph
        } else if label.starts_with("Tangut Ideograph") {
            RangeName::TangutIdeograph
        } else if label.starts_with("Hangul Syllable") {
            RangeName::HangulSyllable
        } else {
            RangeName::Unnamed
        }
    }

    fn parse_decomposition(line: usize, field: &str) -> Result<Option<Decomposition>, UcdError> {
        let mut parts = field.split_whitespace().peekable();

        let compatibility = match parts.peek() {
            None => return Ok(None),
            Some(part) => part.starts_with('<'),
        };

        let mapping = parts
            .skip(compatibility as usize)
            .map(|part| parse_hex(UNICODE_DATA, line, part))
            .collect::<Result<Vec<u32>, UcdError>>()?;

        Ok(Some(Decomposition { compatibility, mapping }))
    }

    fn parse_blocks(blocks: &str) -> Result<Vec<Block>, UcdError> {
        let mut parsed = Vec::new();

        for (index, line) in blocks.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();

            if line.is_empty() {
                continue;
            }

            let malformed = || UcdError::Parse {
                file: BLOCKS,
                line: index + 1,
                reason: format!("expected 'XXXX..YYYY; Name', found '{}'", line),
            };

            let (range, name) = line.split_once(';').ok_or_else(malformed)?;
            let (first, last) = range.split_once("..").ok_or_else(malformed)?;

            parsed.push(Block {
                first: parse_hex(BLOCKS, index + 1, first)?,
                last: parse_hex(BLOCKS, index + 1, last)?,
                name: name.trim().to_string(),
            });
        }

        parsed.sort_by_key(|block| block.first);

        Ok(parsed)
    }

    fn entry(&self, codepoint: u32) -> Option<&Entry> {
        self.entries
            .binary_search_by_key(&codepoint, |entry| entry.codepoint)
            .ok()
            .map(|index| &self.entries[index])
    }

    fn range(&self, codepoint: u32) -> Option<&Range> {
        self.ranges.iter().find(|range| (range.first..=range.last).contains(&codepoint))
    }

    pub fn name(&self, codepoint: u32) -> Option<Cow<'_, str>> {
        if let Some(entry) = self.entry(codepoint) {
            return entry.name.as_deref().map(Cow::Borrowed);
        }

        match self.range(codepoint)?.name {
            RangeName::CjkIdeograph => Some(Cow::Owned(format!("CJK UNIFIED IDEOGRAPH-{:04X}", codepoint))),
            RangeName::TangutIdeograph => Some(Cow::Owned(format!("TANGUT IDEOGRAPH-{:04X}", codepoint))),
            RangeName::HangulSyllable => Some(Cow::Owned(hangul::name(codepoint))),
            RangeName::Unnamed => None,
        }
    }

    pub fn category(&self, codepoint: u32) -> GeneralCategory {
        self.entry(codepoint)
            .map(|entry| entry.category)
            .or_else(|| self.range(codepoint).map(|range| range.category))
            .unwrap_or(GeneralCategory::Unassigned)
    }

    pub fn combining_class(&self, codepoint: u32) -> u8 {
        self.entry(codepoint)
            .map(|entry| entry.combining_class)
            .or_else(|| self.range(codepoint).map(|range| range.combining_class))
            .unwrap_or(0)
    }

    /// One level of mapping as listed in the data; hangul syllables are expanded to jamo.
    pub fn decomposition(&self, codepoint: u32, compatibility: bool) -> Cow<'_, [u32]> {
        if hangul::is_syllable(codepoint) {
            return Cow::Owned(hangul::decompose(codepoint));
        }

        match self.entry(codepoint).and_then(|entry| entry.decomposition.as_ref()) {
            Some(decomposition) if compatibility || !decomposition.compatibility => {
                Cow::Borrowed(decomposition.mapping.as_slice())
            },
            _ => Cow::Borrowed(&[]),
        }
    }

    pub fn case_mapping(&self, codepoint: u32) -> CaseMapping {
        self.entry(codepoint).map(|entry| entry.case).unwrap_or_default()
    }

    pub fn block(&self, codepoint: u32) -> Option<&str> {
        let index = self.blocks.partition_point(|block| block.first <= codepoint).checked_sub(1)?;
        let block = &self.blocks[index];

        (codepoint <= block.last).then_some(block.name.as_str())
    }
}

pub fn plane(codepoint: u32) -> Option<&'static str> {
    match codepoint >> 16 {
        0 => Some("0 Basic Multilingual Plane (BMP)"),
        1 => Some("1 Supplementary Multilingual Plane (SMP)"),
        2 => Some("2 Supplementary Ideographic Plane (SIP)"),
        3 => Some("3 Tertiary Ideographic Plane (TIP)"),
        4..=13 => Some("Unassigned"),
        14 => Some("14 Supplementary Special-purpose Plane (SSP)"),
        15 => Some("15 Supplementary Private Use Area-A (SPUA-A)"),
        16 => Some("16 Supplementary Private Use Area-B (SPUA-B)"),
        _ => None,
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const UNICODE_DATA_EXCERPT: &str = "\
0000;<control>;Cc;0;BN;;;;;N;NULL;;;;
000A;<control>;Cc;0;B;;;;;N;LINE FEED (LF);;;;
0020;SPACE;Zs;0;WS;;;;;N;;;;;
0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;
0061;LATIN SMALL LETTER A;Ll;0;L;;;;;N;;;0041;;0041
00C5;LATIN CAPITAL LETTER A WITH RING ABOVE;Lu;0;L;0041 030A;;;;N;LATIN CAPITAL LETTER A RING;;;00E5;
00E5;LATIN SMALL LETTER A WITH RING ABOVE;Ll;0;L;0061 030A;;;;N;LATIN SMALL LETTER A RING;;00C5;;00C5
01D5;LATIN CAPITAL LETTER U WITH DIAERESIS AND MACRON;Lu;0;L;00DC 0304;;;;N;LATIN CAPITAL LETTER U DIAERESIS MACRON;;;01D6;
00DC;LATIN CAPITAL LETTER U WITH DIAERESIS;Lu;0;L;0055 0308;;;;N;LATIN CAPITAL LETTER U DIAERESIS;;;00FC;
0055;LATIN CAPITAL LETTER U;Lu;0;L;;;;;N;;;;0075;
0300;COMBINING GRAVE ACCENT;Mn;230;NSM;;;;;N;NON-SPACING GRAVE;;;;
0304;COMBINING MACRON;Mn;230;NSM;;;;;N;NON-SPACING MACRON;;;;
0308;COMBINING DIAERESIS;Mn;230;NSM;;;;;N;NON-SPACING DIAERESIS;;;;
030A;COMBINING RING ABOVE;Mn;230;NSM;;;;;N;NON-SPACING RING ABOVE;;;;
0316;COMBINING GRAVE ACCENT BELOW;Mn;220;NSM;;;;;N;NON-SPACING GRAVE BELOW;;;;
0323;COMBINING DOT BELOW;Mn;220;NSM;;;;;N;NON-SPACING DOT BELOW;;;;
1E0B;LATIN SMALL LETTER D WITH DOT ABOVE;Ll;0;L;0064 0307;;;;N;;;1E0A;;1E0A
0064;LATIN SMALL LETTER D;Ll;0;L;;;;;N;;;0044;;0044
0066;LATIN SMALL LETTER F;Ll;0;L;;;;;N;;;0046;;0046
0307;COMBINING DOT ABOVE;Mn;230;NSM;;;;;N;NON-SPACING DOT ABOVE;;;;
212B;ANGSTROM SIGN;Lu;0;L;00C5;;;;N;ANGSTROM UNIT;;;00E5;
4E00;<CJK Ideograph, First>;Lo;0;L;;;;;N;;;;;
9FFF;<CJK Ideograph, Last>;Lo;0;L;;;;;N;;;;;
AC00;<Hangul Syllable, First>;Lo;0;L;;;;;N;;;;;
D7A3;<Hangul Syllable, Last>;Lo;0;L;;;;;N;;;;;
E000;<Private Use, First>;Co;0;L;;;;;N;;;;;
F8FF;<Private Use, Last>;Co;0;L;;;;;N;;;;;
FB00;LATIN SMALL LIGATURE FF;Ll;0;L;<compat> 0066 0066;;;;N;;;;;
FFFD;REPLACEMENT CHARACTER;So;0;ON;;;;;N;;;;;
1F980;CRAB;So;0;ON;;;;;N;;;;;
";

    pub const BLOCKS_EXCERPT: &str = "\
# Blocks-15.1.0.txt

0000..007F; Basic Latin
0080..00FF; Latin-1 Supplement
0100..017F; Latin Extended-A
0300..036F; Combining Diacritical Marks
4E00..9FFF; CJK Unified Ideographs
AC00..D7AF; Hangul Syllables
1F900..1F9FF; Supplemental Symbols and Pictographs
";

    pub fn excerpt() -> Ucd {
        Ucd::parse(UNICODE_DATA_EXCERPT, Some(BLOCKS_EXCERPT)).unwrap()
    }

    #[test]
    fn names() {
        let ucd = excerpt();

        assert_eq!(ucd.name(0x41).as_deref(), Some("LATIN CAPITAL LETTER A"));
        assert_eq!(ucd.name(0x0a).as_deref(), Some("LINE FEED (LF)"));
        assert_eq!(ucd.name(0x4e2d).as_deref(), Some("CJK UNIFIED IDEOGRAPH-4E2D"));
        assert_eq!(ucd.name(0xac00).as_deref(), Some("HANGUL SYLLABLE GA"));
        assert_eq!(ucd.name(0xe000), None);
        assert_eq!(ucd.name(0x1234), None);
    }

    #[test]
    fn properties() {
        let ucd = excerpt();

        assert_eq!(ucd.category(0x61), GeneralCategory::LowercaseLetter);
        assert_eq!(ucd.category(0x300), GeneralCategory::NonspacingMark);
        assert_eq!(ucd.category(0xe123), GeneralCategory::PrivateUse);
        assert_eq!(ucd.category(0x378), GeneralCategory::Unassigned);
        assert_eq!(ucd.combining_class(0x316), 220);
        assert_eq!(ucd.combining_class(0x41), 0);
        assert_eq!(ucd.combining_class(0x1234), 0);

        assert_eq!(
            ucd.case_mapping(0x61),
            CaseMapping { uppercase: Some(0x41), lowercase: None, titlecase: Some(0x41) },
        );
    }

    #[test]
    fn decompositions() {
        let ucd = excerpt();

        assert_eq!(ucd.decomposition(0xc5, false).as_ref(), &[0x41, 0x30a]);
        assert_eq!(ucd.decomposition(0xfb00, false).as_ref(), &[] as &[u32]);
        assert_eq!(ucd.decomposition(0xfb00, true).as_ref(), &[0x66, 0x66]);
        assert_eq!(ucd.decomposition(0x212b, false).as_ref(), &[0xc5]);
        assert_eq!(ucd.decomposition(0xd7a3, false).as_ref(), &[0x1112, 0x1175, 0x11c2]);
        assert_eq!(ucd.decomposition(0x41, true).as_ref(), &[] as &[u32]);
    }

    #[test]
    fn blocks_and_planes() {
        let ucd = excerpt();

        assert_eq!(ucd.block(0x41), Some("Basic Latin"));
        assert_eq!(ucd.block(0xff), Some("Latin-1 Supplement"));
        assert_eq!(ucd.block(0x1f980), Some("Supplemental Symbols and Pictographs"));
        assert_eq!(ucd.block(0x200), None);

        assert_eq!(plane(0x41), Some("0 Basic Multilingual Plane (BMP)"));
        assert_eq!(plane(0x1f980), Some("1 Supplementary Multilingual Plane (SMP)"));
        assert_eq!(plane(0x10fffd), Some("16 Supplementary Private Use Area-B (SPUA-B)"));
        assert_eq!(plane(0x110000), None);
    }

    #[test]
    fn empty_database() {
        let ucd = Ucd::empty();

        assert_eq!(ucd.name(0x41), None);
        assert_eq!(ucd.category(0x41), GeneralCategory::Unassigned);
        assert_eq!(ucd.block(0x41), None);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            Ucd::parse("0041;LATIN CAPITAL LETTER A;Lu;0;L", None),
            Err(UcdError::Parse { line: 1, .. }),
        ));

        assert!(matches!(
            Ucd::parse("0041;LATIN CAPITAL LETTER A;Xx;0;L;;;;;N;;;;0061;", None),
            Err(UcdError::Parse { line: 1, .. }),
        ));

        assert!(matches!(
            Ucd::parse("", Some("0000..ZZZZ; Basic Latin")),
            Err(UcdError::Parse { file: BLOCKS, line: 1, .. }),
        ));
    }

    #[test]
    fn missing_directory() {
        assert!(matches!(Ucd::load(Path::new("/nonexistent/utfdecode")), Err(UcdError::Missing(_))));
    }
}

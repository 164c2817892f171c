/// General_Category values, including the grouping values such as `L` or `LC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralCategory {
    UppercaseLetter,
    LowercaseLetter,
    TitlecaseLetter,
    CasedLetter,
    ModifierLetter,
    OtherLetter,
    Letter,
    NonspacingMark,
    SpacingMark,
    EnclosingMark,
    Mark,
    DecimalNumber,
    LetterNumber,
    OtherNumber,
    Number,
    ConnectorPunctuation,
    DashPunctuation,
    OpenPunctuation,
    ClosePunctuation,
    InitialPunctuation,
    FinalPunctuation,
    OtherPunctuation,
    Punctuation,
    MathSymbol,
    CurrencySymbol,
    ModifierSymbol,
    OtherSymbol,
    Symbol,
    SpaceSeparator,
    LineSeparator,
    ParagraphSeparator,
    Separator,
    Control,
    Format,
    Surrogate,
    PrivateUse,
    Unassigned,
    Other,
}

use GeneralCategory::*;

static CATEGORIES: [(GeneralCategory, &str, &str); 38] = [
    (UppercaseLetter, "Lu", "an uppercase letter"),
    (LowercaseLetter, "Ll", "a lowercase letter"),
    (TitlecaseLetter, "Lt", "a digraphic character, with first part uppercase"),
    (CasedLetter, "LC", "Lu | Ll | Lt"),
    (ModifierLetter, "Lm", "a modifier letter"),
    (OtherLetter, "Lo", "other letters, including syllables and ideographs"),
    (Letter, "L", "Lu | Ll | Lt | Lm | Lo"),
    (NonspacingMark, "Mn", "a nonspacing combining mark (zero advance width)"),
    (SpacingMark, "Mc", "a spacing combining mark (positive advance width)"),
    (EnclosingMark, "Me", "an enclosing combining mark"),
    (Mark, "M", "Mn | Mc | Me"),
    (DecimalNumber, "Nd", "a decimal digit"),
    (LetterNumber, "Nl", "a letterlike numeric character"),
    (OtherNumber, "No", "a numeric character of other type"),
    (Number, "N", "Nd | Nl | No"),
    (ConnectorPunctuation, "Pc", "a connecting punctuation mark, like a tie"),
    (DashPunctuation, "Pd", "a dash or hyphen punctuation mark"),
    (OpenPunctuation, "Ps", "an opening punctuation mark (of a pair)"),
    (ClosePunctuation, "Pe", "a closing punctuation mark (of a pair)"),
    (InitialPunctuation, "Pi", "an initial quotation mark"),
    (FinalPunctuation, "Pf", "a final quotation mark"),
    (OtherPunctuation, "Po", "a punctuation mark of other type"),
    (Punctuation, "P", "Pc | Pd | Ps | Pe | Pi | Pf | Po"),
    (MathSymbol, "Sm", "a symbol of mathematical use"),
    (CurrencySymbol, "Sc", "a currency sign"),
    (ModifierSymbol, "Sk", "a non-letterlike modifier symbol"),
    (OtherSymbol, "So", "a symbol of other type"),
    (Symbol, "S", "Sm | Sc | Sk | So"),
    (SpaceSeparator, "Zs", "a space character (of various non-zero widths)"),
    (LineSeparator, "Zl", "U+2028 LINE SEPARATOR only"),
    (ParagraphSeparator, "Zp", "U+2029 PARAGRAPH SEPARATOR only"),
    (Separator, "Z", "Zs | Zl | Zp"),
    (Control, "Cc", "a C0 or C1 control code"),
    (Format, "Cf", "a format control character"),
    (Surrogate, "Cs", "a surrogate code point"),
    (PrivateUse, "Co", "a private-use character"),
    (Unassigned, "Cn", "a reserved unassigned code point or a noncharacter"),
    (Other, "C", "Cc | Cf | Cs | Co | Cn"),
];

impl GeneralCategory {
    pub fn from_abbreviation(abbreviation: &str) -> Option<GeneralCategory> {
        CATEGORIES.iter()
            .find(|(_, abbr, _)| *abbr == abbreviation)
            .map(|(category, _, _)| *category)
    }

    fn entry(&self) -> &'static (GeneralCategory, &'static str, &'static str) {
        // the table is ordered like the enum
        &CATEGORIES[*self as usize]
    }

    pub fn abbreviation(&self) -> &'static str {
        self.entry().1
    }

    pub fn description(&self) -> &'static str {
        self.entry().2
    }

    pub fn is_combining(&self) -> bool {
        matches!(self, NonspacingMark | SpacingMark | EnclosingMark)
    }
}

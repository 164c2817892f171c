use crate::codec::InternalInvariantViolation;
use crate::ucd::Ucd;

use thiserror::Error;

use std::str::FromStr;

/// Deeper than any chain of mappings in the character database.
const MAX_DECOMPOSITION_DEPTH: usize = 32;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Nfd,
    Nfc,
    Nfkd,
    Nfkc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid normalization form")]
pub struct ParseFormError(pub String);

impl FromStr for Form {
    type Err = ParseFormError;

    fn from_str(name: &str) -> Result<Form, ParseFormError> {
        match name.to_ascii_uppercase().as_str() {
            "NFD" => Ok(Form::Nfd),
            "NFC" => Ok(Form::Nfc),
            "NFKD" => Ok(Form::Nfkd),
            "NFKC" => Ok(Form::Nfkc),
            _ => Err(ParseFormError(name.to_string())),
        }
    }
}

impl Form {
    pub fn is_compatibility(&self) -> bool {
        matches!(self, Form::Nfkd | Form::Nfkc)
    }

    /// NFC and NFKC name a composition step that is not performed.
    pub fn is_composing(&self) -> bool {
        matches!(self, Form::Nfc | Form::Nfkc)
    }
}

/// Decomposes code points and holds back non-starters until the next starter,
/// releasing them ordered by canonical combining class. Code points produced by
/// a decomposition are already ordered and are never held back.
pub struct Normalizer<'a> {
    ucd: &'a Ucd,
    form: Option<Form>,
    pending: Vec<u32>,
}

impl<'a> Normalizer<'a> {
    pub fn new(ucd: &'a Ucd, form: Option<Form>) -> Normalizer<'a> {
        Normalizer {
            ucd,
            form,
            pending: Vec::new(),
        }
    }

    /// Appends whatever became final to `out`.
    pub fn push(&mut self, codepoint: u32, out: &mut Vec<u32>) -> Result<(), InternalInvariantViolation> {
        match self.form {
            Some(form) => self.feed(codepoint, form, false, 0, out),
            None => {
                out.push(codepoint);

                Ok(())
            },
        }
    }

    fn feed(
        &mut self,
        codepoint: u32,
        form: Form,
        forced: bool,
        depth: usize,
        out: &mut Vec<u32>,
    ) -> Result<(), InternalInvariantViolation> {
        if depth > MAX_DECOMPOSITION_DEPTH {
            return Err(InternalInvariantViolation(format!("decomposition of U+{:04X} does not terminate", codepoint)));
        }

        let ucd = self.ucd;
        let mapping = ucd.decomposition(codepoint, form.is_compatibility());

        if !mapping.is_empty() {
            for decomposed in mapping.iter() {
                self.feed(*decomposed, form, true, depth + 1, out)?;
            }

            return Ok(());
        }

        // marks queued before this decomposition arrived go out first
        if forced || ucd.combining_class(codepoint) == 0 {
            self.flush(out);

            out.push(codepoint);
        } else {
            self.pending.push(codepoint);
        }

        Ok(())
    }

    /// Releases held non-starters, stable sorted by combining class.
    pub fn flush(&mut self, out: &mut Vec<u32>) {
        let ucd = self.ucd;

        self.pending.sort_by_key(|codepoint| ucd.combining_class(*codepoint));

        out.append(&mut self.pending);
    }
}

use crate::codec::{Decoded, Decoder, DecodeError, InternalInvariantViolation, ParseFormatError, REPLACEMENT_CHARACTER};
use crate::normalize::Normalizer;
use crate::output::{Formatter, OutputError};

use thiserror::Error;
use tracing::{debug, error, info};

use std::io::{self, ErrorKind, Read, Write};
use std::str::FromStr;
use std::time::Instant;

const CHUNK_SIZE: usize = 4096;

/// End of text and end of transmission, typed as ^C and ^D on a raw terminal.
const INTERRUPT_BYTES: [u8; 2] = [0x03, 0x04];

const RED: &str = "\x1b[31m";
const MAGENTA: &str = "\x1b[35m";
const RESET: &str = "\x1b[m";


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Malformed {
    Ignore,
    #[default]
    Replace,
    Abort,
}

impl FromStr for Malformed {
    type Err = ParseFormatError;

    fn from_str(name: &str) -> Result<Malformed, ParseFormatError> {
        match name {
            "ignore" => Ok(Malformed::Ignore),
            "replace" => Ok(Malformed::Replace),
            "abort" => Ok(Malformed::Abort),
            _ => Err(ParseFormatError(name.to_string(), "malformed input policy")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub malformed: Malformed,
    /// bytes consumed before decoding starts
    pub offset: u64,
    /// bytes decoded after the offset
    pub limit: Option<u64>,
    pub quiet: bool,
    pub timestamps: bool,
    pub interactive: bool,
    pub color: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub bytes: u64,
    pub skipped: u64,
    pub codepoints: u64,
    pub errors: u64,
}

impl Counters {
    pub fn window_bytes(&self) -> u64 {
        self.bytes - self.skipped
    }
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("aborted on malformed input: {0}")]
    Aborted(DecodeError),
    #[error("internal error: {0}")]
    Internal(#[from] InternalInvariantViolation),
    #[error("write failed: {0}")]
    Output(#[from] io::Error),
}

impl From<OutputError> for StreamError {
    fn from(err: OutputError) -> StreamError {
        match err {
            OutputError::Io(err) => StreamError::Output(err),
            OutputError::Internal(err) => StreamError::Internal(err),
        }
    }
}

pub fn summary_line(counters: &Counters, color: bool) -> String {
    let (prefix, suffix) = if color { (MAGENTA, RESET) } else { ("", "") };

    format!(
        "{}{} code points from {} bytes with {} errors{}",
        prefix,
        counters.codepoints,
        counters.window_bytes(),
        counters.errors,
        suffix,
    )
}

/// Owns the decode, normalize and format pipeline for one input.
pub struct Stream<'a, W: Write, E: Write> {
    options: Options,
    decoder: Decoder,
    normalizer: Normalizer<'a>,
    formatter: Formatter<'a>,
    out: W,
    err: E,
    counters: Counters,
    released: Vec<u32>,
    started: Instant,
}

impl<'a, W: Write, E: Write> Stream<'a, W, E> {
    pub fn new(
        options: Options,
        decoder: Decoder,
        normalizer: Normalizer<'a>,
        formatter: Formatter<'a>,
        out: W,
        err: E,
    ) -> Stream<'a, W, E> {
        Stream {
            options,
            decoder,
            normalizer,
            formatter,
            out,
            err,
            counters: Counters::default(),
            released: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn into_writers(self) -> (W, E) {
        (self.out, self.err)
    }

    pub fn run<R: Read>(&mut self, mut input: R) -> Result<Counters, StreamError> {
        let mut chunk = [0; CHUNK_SIZE];

        debug!(decoder = ?self.decoder, options = ?self.options, "stream started");

        'read: loop {
            if self.limit_reached() {
                break;
            }

            let read = match input.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    error!(%err, bytes = self.counters.bytes, "read failed, ending stream");

                    break;
                },
            };

            let mut bytes = &chunk[..read];

            if self.counters.skipped < self.options.offset {
                let skip = (self.options.offset - self.counters.skipped).min(read as u64) as usize;

                self.counters.bytes += skip as u64;
                self.counters.skipped += skip as u64;

                bytes = &bytes[skip..];

                if bytes.is_empty() {
                    continue;
                }
            }

            if self.options.timestamps {
                writeln!(self.out, "{} ms", self.started.elapsed().as_millis())?;
            }

            for byte in bytes {
                if self.options.interactive && INTERRUPT_BYTES.contains(byte) {
                    debug!(byte, "interrupted from the terminal");

                    break 'read;
                }

                let decoded = self.decoder.advance(*byte)?;

                self.dispatch(decoded)?;
                self.counters.bytes += 1;

                if self.limit_reached() {
                    break 'read;
                }
            }

            self.out.flush()?;
        }

        self.finish()
    }

    fn limit_reached(&self) -> bool {
        self.options.limit.is_some_and(|limit| self.counters.window_bytes() >= limit)
    }

    fn finish(&mut self) -> Result<Counters, StreamError> {
        let decoded = self.decoder.finish();

        self.dispatch(decoded)?;

        self.normalizer.flush(&mut self.released);
        self.release()?;

        self.out.flush()?;

        info!(
            bytes = self.counters.window_bytes(),
            codepoints = self.counters.codepoints,
            errors = self.counters.errors,
            "stream finished"
        );

        Ok(self.counters)
    }

    fn dispatch(&mut self, decoded: Decoded) -> Result<(), StreamError> {
        match decoded {
            Decoded::Incomplete => Ok(()),
            Decoded::Codepoint(codepoint) => self.emit(codepoint),
            Decoded::Malformed(err) => self.malformed(err),
            Decoded::Interrupted(err, codepoint) => {
                self.malformed(err)?;
                self.emit(codepoint)
            },
        }
    }

    fn malformed(&mut self, cause: DecodeError) -> Result<(), StreamError> {
        self.counters.errors += 1;

        debug!(%cause, bytes = self.counters.bytes, "malformed input");

        if !self.options.quiet {
            self.report(&cause)?;
        }

        match self.options.malformed {
            Malformed::Ignore => Ok(()),
            Malformed::Replace => self.emit(REPLACEMENT_CHARACTER),
            Malformed::Abort => Err(StreamError::Aborted(cause)),
        }
    }

    fn report(&mut self, cause: &DecodeError) -> io::Result<()> {
        let (prefix, suffix) = if self.options.color { (RED, RESET) } else { ("", "") };

        // keep diagnostics in order with output on a shared terminal
        self.out.flush()?;

        writeln!(
            self.err,
            "{}utfdecode: decoding error after {} bytes and {} code points - {}{}",
            prefix,
            self.counters.bytes,
            self.counters.codepoints,
            cause,
            suffix,
        )?;

        self.err.flush()
    }

    fn emit(&mut self, codepoint: u32) -> Result<(), StreamError> {
        self.normalizer.push(codepoint, &mut self.released)?;
        self.release()
    }

    fn release(&mut self) -> Result<(), StreamError> {
        for codepoint in self.released.drain(..) {
            self.counters.codepoints += 1;
            self.formatter.write(codepoint, &mut self.out)?;
        }

        Ok(())
    }
}

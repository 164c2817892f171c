mod codec;
mod config;
mod normalize;
mod output;
mod stream;
mod tty;
mod ucd;

use codec::{Decoder, InputFormat};
use config::{Args, Config, ConfigError};
use normalize::Normalizer;
use output::Formatter;
use stream::{Counters, Stream, StreamError};
use ucd::{Ucd, UcdError};

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process;

const EX_OK: i32 = 0;
const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_NOINPUT: i32 = 66;
const EX_SOFTWARE: i32 = 70;
const EX_OSFILE: i32 = 72;
const EX_IOERR: i32 = 74;


fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let status = if err.use_stderr() { EX_USAGE } else { EX_OK };
            let _ = err.print();

            process::exit(status);
        },
    };

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_env("UTFDECODE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    process::exit(run(args));
}

fn run(args: Args) -> i32 {
    let config = match Config::load(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("utfdecode: {}", err);

            return config_status(&err);
        },
    };

    let ucd = match Ucd::load(&config.data_dir) {
        Ok(ucd) => ucd,
        Err(err) => match database_status(&err, config.normalization.is_some()) {
            Some(status) => {
                match &err {
                    UcdError::Missing(path) => {
                        eprintln!("utfdecode: normalization needs the character database, {} not found", path.display());
                    },
                    err => eprintln!("utfdecode: {}", err),
                }

                return status;
            },
            None => {
                warn!(%err, "no character database, names and properties are unavailable");

                Ucd::empty()
            },
        },
    };

    if let Some(form) = config.normalization.filter(|form| form.is_composing()) {
        warn!(?form, "composition is not supported, output stays decomposed");
    }

    let input: Box<dyn Read> = match &config.file {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(err) => {
                eprintln!("{} - {}", path.display(), err);

                return EX_NOINPUT;
            },
        },
        None => Box::new(io::stdin()),
    };

    let stdout_is_terminal = tty::is_terminal(&io::stdout());
    let stderr_is_terminal = tty::is_terminal(&io::stderr());

    // textual code points are typed line by line
    let interactive = config.file.is_none()
        && config.decode_format != InputFormat::Codepoint
        && tty::is_terminal(&io::stdin());

    let raw_mode = if interactive {
        tty::RawMode::enter()
            .map_err(|err| warn!(%err, "failed to switch terminal to raw mode"))
            .ok()
    } else {
        None
    };

    let mut stream = Stream::new(
        config.stream_options(interactive, stderr_is_terminal),
        Decoder::new(config.decode_format),
        Normalizer::new(&ucd, config.normalization),
        Formatter::new(config.encode_format, &ucd, config.details()),
        BufWriter::new(io::stdout().lock()),
        io::stderr(),
    );

    let result = stream.run(input);

    drop(raw_mode);

    let status = stream_status(&result);

    let counters = match result {
        Ok(counters) => counters,
        // already reported by the stream
        Err(StreamError::Aborted(_)) => return status,
        Err(StreamError::Internal(err)) => {
            eprintln!("utfdecode fatal internal error - {}", err);

            return status;
        },
        Err(StreamError::Output(err)) => {
            eprintln!("utfdecode: {}", err);

            return status;
        },
    };

    let (mut out, _) = stream.into_writers();

    if config.summary {
        eprintln!("{}", stream::summary_line(&counters, stderr_is_terminal));
    } else if stdout_is_terminal && config.encode_format.is_binary() {
        if let Err(err) = writeln!(out).and_then(|_| out.flush()) {
            eprintln!("utfdecode: {}", err);

            return EX_IOERR;
        }
    }

    status
}

fn config_status(err: &ConfigError) -> i32 {
    match err {
        ConfigError::Io { .. } => EX_IOERR,
        _ => EX_USAGE,
    }
}

/// `None` when the run goes on with an empty database.
fn database_status(err: &UcdError, normalizing: bool) -> Option<i32> {
    match err {
        UcdError::Missing(_) if normalizing => Some(EX_OSFILE),
        UcdError::Missing(_) => None,
        UcdError::Io { .. } | UcdError::Parse { .. } => Some(EX_IOERR),
    }
}

fn stream_status(result: &Result<Counters, StreamError>) -> i32 {
    match result {
        Ok(counters) if counters.errors == 0 => EX_OK,
        Ok(_) | Err(StreamError::Aborted(_)) => EX_DATAERR,
        Err(StreamError::Internal(_)) => EX_SOFTWARE,
        Err(StreamError::Output(_)) => EX_IOERR,
    }
}

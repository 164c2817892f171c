use crate::codec::InputFormat;
use crate::normalize::Form;
use crate::output::{Details, OutputFormat};
use crate::stream::{self, Malformed};

use clap::Parser;
use thiserror::Error;
use toml::Table;
use tracing::debug;

use std::env;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_DATA_DIR: &str = "/usr/share/unicode";


#[derive(Clone, Debug, Parser)]
#[clap(name = "utfdecode", version, about = "Decode, normalize and re-encode a stream of unicode text")]
pub struct Args {
    #[clap(long, short, help = "Show block, plane, category and case mappings of decoded code points")]
    pub block_info: bool,

    #[clap(
        long,
        short,
        value_name = "FORMAT",
        help = "How input is decoded: utf8, utf16le, utf16be, utf32le, utf32be or codepoint [default: utf8]"
    )]
    pub decode_format: Option<InputFormat>,

    #[clap(
        long,
        short,
        value_name = "FORMAT",
        help = "How output is encoded: utf8, utf16le, utf16be, utf32le, utf32be, codepoint, decoding or silent [default: decoding]"
    )]
    pub encode_format: Option<OutputFormat>,

    #[clap(
        long,
        short,
        value_name = "BYTES",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Only decode up to this many bytes after the offset"
    )]
    pub limit: Option<u64>,

    #[clap(long, short, value_name = "POLICY", help = "What to do with malformed input: ignore, replace or abort [default: replace]")]
    pub malformed: Option<Malformed>,

    #[clap(long, short, value_name = "FORM", help = "Normalize decoded code points: NFD, NFC, NFKD or NFKC")]
    pub normalization: Option<Form>,

    #[clap(long, short, value_name = "BYTES", default_value = "0", help = "Skip this many bytes before decoding")]
    pub offset: u64,

    #[clap(long, short, help = "Do not log decoding errors to stderr")]
    pub quiet_errors: bool,

    #[clap(long, short, help = "Show a summary at end of input")]
    pub summary: bool,

    #[clap(long, short, help = "Show elapsed milliseconds before each input read")]
    pub timestamps: bool,

    #[clap(long, short, help = "Show the display width of decoded code points")]
    pub wcwidth: bool,

    #[clap(long, env = "UTFDECODE_DATA", value_name = "DIR", help = "Directory holding UnicodeData.txt and Blocks.txt")]
    pub data_dir: Option<PathBuf>,

    #[clap(value_name = "FILE", help = "File to decode, standard input when absent or '-'")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{}: {source}", path.display())]
    Syntax { path: PathBuf, source: toml::de::Error },
    #[error("config key '{key}': expected {expected}")]
    Type { key: String, expected: &'static str },
    #[error("config key '{key}': {reason}")]
    Value { key: String, reason: String },
}

/// Command line merged over the config file, command line first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub decode_format: InputFormat,
    pub encode_format: OutputFormat,
    pub malformed: Malformed,
    pub normalization: Option<Form>,
    pub offset: u64,
    pub limit: Option<u64>,
    pub quiet_errors: bool,
    pub summary: bool,
    pub block_info: bool,
    pub wcwidth: bool,
    pub timestamps: bool,
    pub data_dir: PathBuf,
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn load(args: Args) -> Result<Config, ConfigError> {
        let table = match Self::path() {
            Some(path) => Self::read(&path)?,
            None => Table::new(),
        };

        Self::merge(args, &table)
    }

    /// `$XDG_CONFIG_HOME/utfdecode/config.toml`, falling back to `~/.config`.
    fn path() -> Option<PathBuf> {
        let base = env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        Some(base.join("utfdecode").join("config.toml"))
    }

    fn read(path: &Path) -> Result<Table, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "reading config");

                content.parse::<Table>().map_err(|source| ConfigError::Syntax { path: path.to_path_buf(), source })
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Table::new()),
            Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
        }
    }

    pub fn merge(args: Args, table: &Table) -> Result<Config, ConfigError> {
        Ok(Config {
            decode_format: Self::pick(args.decode_format, table, "decode_format")?.unwrap_or(InputFormat::Utf8),
            encode_format: Self::pick(args.encode_format, table, "encode_format")?.unwrap_or(OutputFormat::Decoding),
            malformed: Self::pick(args.malformed, table, "malformed")?.unwrap_or_default(),
            normalization: Self::pick(args.normalization, table, "normalization")?,
            offset: args.offset,
            limit: args.limit,
            quiet_errors: args.quiet_errors || Self::get_bool(table, "quiet_errors")?,
            summary: args.summary || Self::get_bool(table, "summary")?,
            block_info: args.block_info || Self::get_bool(table, "block_info")?,
            wcwidth: args.wcwidth || Self::get_bool(table, "wcwidth")?,
            timestamps: args.timestamps || Self::get_bool(table, "timestamps")?,
            data_dir: match args.data_dir {
                Some(dir) => dir,
                None => PathBuf::from(Self::get_str(table, "data_dir")?.unwrap_or(DEFAULT_DATA_DIR)),
            },
            file: args.file.filter(|file| file.as_os_str() != "-"),
        })
    }

    pub fn details(&self) -> Details {
        Details {
            block_info: self.block_info,
            wcwidth: self.wcwidth,
        }
    }

    pub fn stream_options(&self, interactive: bool, color: bool) -> stream::Options {
        stream::Options {
            malformed: self.malformed,
            offset: self.offset,
            limit: self.limit,
            quiet: self.quiet_errors,
            timestamps: self.timestamps,
            interactive,
            color,
        }
    }

    fn pick<T>(arg: Option<T>, table: &Table, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match arg {
            Some(arg) => Ok(Some(arg)),
            None => Self::get_parsed(table, key),
        }
    }

    fn get_str<'t>(table: &'t Table, key: &str) -> Result<Option<&'t str>, ConfigError> {
        match table.get(key) {
            Some(value) => value.as_str().map(Some).ok_or_else(|| ConfigError::Type { key: key.to_string(), expected: "a string" }),
            None => Ok(None),
        }
    }

    fn get_bool(table: &Table, key: &str) -> Result<bool, ConfigError> {
        match table.get(key) {
            Some(value) => value.as_bool().ok_or_else(|| ConfigError::Type { key: key.to_string(), expected: "a boolean" }),
            None => Ok(false),
        }
    }

    fn get_parsed<T>(table: &Table, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        Self::get_str(table, key)?
            .map(|value| value.parse::<T>().map_err(|err| ConfigError::Value { key: key.to_string(), reason: err.to_string() }))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ByteOrder;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("utfdecode").chain(argv.iter().copied())).unwrap()
    }

    fn table(content: &str) -> Table {
        content.parse::<Table>().unwrap()
    }

    #[test]
    fn defaults() {
        let config = Config::merge(Args { data_dir: None, ..args(&[]) }, &Table::new()).unwrap();

        assert_eq!(config.decode_format, InputFormat::Utf8);
        assert_eq!(config.encode_format, OutputFormat::Decoding);
        assert_eq!(config.malformed, Malformed::Replace);
        assert_eq!(config.normalization, None);
        assert_eq!(config.offset, 0);
        assert_eq!(config.limit, None);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.file, None);
        assert!(!config.summary);
    }

    #[test]
    fn short_and_long_flags() {
        let args = args(&["-d", "utf-16", "--encode-format", "codepoint", "-m", "abort", "-n", "nfkd", "-o", "2", "-l", "9", "-qsw", "input.txt"]);

        assert_eq!(args.decode_format, Some(InputFormat::Utf16(ByteOrder::Little)));
        assert_eq!(args.encode_format, Some(OutputFormat::Codepoint));
        assert_eq!(args.malformed, Some(Malformed::Abort));
        assert_eq!(args.normalization, Some(Form::Nfkd));
        assert_eq!(args.offset, 2);
        assert_eq!(args.limit, Some(9));
        assert!(args.quiet_errors && args.summary && args.wcwidth);
        assert!(!args.timestamps);
        assert_eq!(args.file, Some(PathBuf::from("input.txt")));
    }

    #[test]
    fn rejects_bad_arguments() {
        let parse = |argv: &[&str]| Args::try_parse_from(std::iter::once("utfdecode").chain(argv.iter().copied()));

        assert!(parse(&["-d", "utf7"]).is_err());
        assert!(parse(&["-l", "0"]).is_err());
        assert!(parse(&["-m", "skip"]).is_err());
        assert!(parse(&["a", "b"]).is_err());
    }

    #[test]
    fn config_file_fills_gaps() {
        let table = table(
            r#"
            encode_format = "utf32-be"
            malformed = "ignore"
            normalization = "NFD"
            summary = true
            data_dir = "/opt/ucd"
            unknown = 3
            "#,
        );

        let config = Config::merge(Args { data_dir: None, ..args(&["-e", "utf8"]) }, &table).unwrap();

        assert_eq!(config.encode_format, OutputFormat::Utf8);
        assert_eq!(config.malformed, Malformed::Ignore);
        assert_eq!(config.normalization, Some(Form::Nfd));
        assert!(config.summary);
        assert_eq!(config.data_dir, PathBuf::from("/opt/ucd"));
    }

    #[test]
    fn command_line_data_dir_wins() {
        let table = table(r#"data_dir = "/opt/ucd""#);
        let args = Args { data_dir: Some(PathBuf::from("/srv/ucd")), ..args(&[]) };

        assert_eq!(Config::merge(args, &table).unwrap().data_dir, PathBuf::from("/srv/ucd"));
    }

    #[test]
    fn dash_means_stdin() {
        let config = Config::merge(Args { data_dir: None, ..args(&["-"]) }, &Table::new()).unwrap();

        assert_eq!(config.file, None);
    }

    #[test]
    fn wrong_types() {
        let merge = |content: &str| Config::merge(Args { data_dir: None, ..args(&[]) }, &table(content));

        assert!(matches!(merge("summary = \"yes\""), Err(ConfigError::Type { .. })));
        assert!(matches!(merge("malformed = 1"), Err(ConfigError::Type { .. })));
        assert!(matches!(merge("decode_format = \"latin1\""), Err(ConfigError::Value { .. })));
    }

    #[test]
    fn stream_options() {
        let config = Config::merge(Args { data_dir: None, ..args(&["-q", "-o", "4"]) }, &Table::new()).unwrap();
        let options = config.stream_options(true, false);

        assert!(options.quiet);
        assert!(options.interactive);
        assert_eq!(options.offset, 4);
        assert_eq!(options.malformed, Malformed::Replace);
    }
}

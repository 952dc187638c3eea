use std::fmt::{Display, Error as FmtError, Formatter};

use log::LevelFilter;

#[derive(Clone, Debug, PartialEq)]
pub struct LogLevel(LevelFilter);

#[derive(Clone)]
pub struct LogLevelValueParser;

impl clap::builder::TypedValueParser for LogLevelValueParser {
    type Value = LogLevel;
    fn parse_ref(&self, _cmd: &clap::Command, _arg: Option<&clap::Arg>, value: &std::ffi::OsStr) -> Result<Self::Value, clap::Error> {
        use clap::error::{Error, ErrorKind};
        match LogLevel::try_parse(value.to_string_lossy().as_ref()) {
            Some(level) => Ok(level),
            None => Err(Error::raw(ErrorKind::InvalidValue, "Invalid log level, use off, error, warn, info, debug or trace")),
        }
    }
}

impl LogLevel {
    pub fn try_parse(input: &str) -> Option<LogLevel> {
        let filter = match input.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => return None,
        };
        Some(LogLevel(filter))
    }

    pub fn to_filter(&self) -> LevelFilter {
        self.0
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter) -> Result<(), FmtError> {
        let &LogLevel(ref filter) = self;
        write!(f, "{}", filter)
    }
}

impl Default for LogLevel {
    fn default() -> LogLevel {
        LogLevel(LevelFilter::Info)
    }
}

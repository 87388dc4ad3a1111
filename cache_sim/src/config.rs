use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    address::ADDRESS_SPACE,
    signal::{Control, Operation},
};

pub const DEFAULT_NUM_LINES: usize = 1024usize;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cache must have at least one line")]
    NoLines,
    #[error("{lines} lines exceed the {} addressable words", ADDRESS_SPACE)]
    TooManyLines { lines: usize },
    #[error("unknown precedence `{0}` (expected `write-wins` or `read-wins`)")]
    UnknownPrecedence(String),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// which enable is served when both are asserted in the same step
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    #[default]
    WriteWins,
    ReadWins,
}

impl Precedence {
    /// operation carried out for `control`, ignoring reset.
    pub fn resolve(self, control: Control) -> Operation {
        let write = control.contains(Control::Write);
        let read = control.contains(Control::Read);
        match (write, read, self) {
            (true, true, Precedence::WriteWins) | (true, false, _) => Operation::Write,
            (true, true, Precedence::ReadWins) | (false, true, _) => Operation::Read,
            (false, false, _) => Operation::Idle,
        }
    }
}

impl FromStr for Precedence {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "write-wins" => Ok(Self::WriteWins),
            "read-wins" => Ok(Self::ReadWins),
            _ => Err(ConfigError::UnknownPrecedence(s.to_string())),
        }
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precedence::WriteWins => write!(f, "write-wins"),
            Precedence::ReadWins => write!(f, "read-wins"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// number of cache lines. any count works; a power of two makes the
    /// index the low bits of the address.
    pub lines: usize,
    pub precedence: Precedence,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            lines: DEFAULT_NUM_LINES,
            precedence: Default::default(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lines == 0 {
            return Err(ConfigError::NoLines);
        }
        if self.lines > ADDRESS_SPACE {
            return Err(ConfigError::TooManyLines { lines: self.lines });
        }
        Ok(())
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = CacheConfig::default();
        assert_eq!(DEFAULT_NUM_LINES, c.lines);
        assert_eq!(Precedence::WriteWins, c.precedence);
        assert!(c.validate().is_ok());
    }
    #[test]
    fn test_from_reader() {
        let c = CacheConfig::from_reader(r#"{ "lines": 64, "precedence": "read-wins" }"#.as_bytes())
            .unwrap();
        assert_eq!(64, c.lines);
        assert_eq!(Precedence::ReadWins, c.precedence);

        let c = CacheConfig::from_reader("{}".as_bytes()).unwrap();
        assert_eq!(DEFAULT_NUM_LINES, c.lines);
    }
    #[test]
    fn test_from_reader_rejects() {
        assert!(matches!(
            CacheConfig::from_reader(r#"{ "lines": 0 }"#.as_bytes()),
            Err(ConfigError::NoLines)
        ));
        assert!(matches!(
            CacheConfig::from_reader(r#"{ "lines": 4194305 }"#.as_bytes()),
            Err(ConfigError::TooManyLines { lines: 4194305 })
        ));
        assert!(matches!(
            CacheConfig::from_reader(r#"{ "ways": 2 }"#.as_bytes()),
            Err(ConfigError::Parse(_))
        ));
    }
    #[test]
    fn test_precedence() {
        let both = Control::Write | Control::Read;
        assert_eq!(Operation::Write, Precedence::WriteWins.resolve(both));
        assert_eq!(Operation::Read, Precedence::ReadWins.resolve(both));
        assert_eq!(Operation::Read, Precedence::WriteWins.resolve(Control::Read));
        assert_eq!(Operation::Write, Precedence::ReadWins.resolve(Control::Write));
        assert_eq!(Operation::Idle, Precedence::WriteWins.resolve(Control::none()));
        assert_eq!(Ok(Precedence::ReadWins), "read-wins".parse().map_err(|_| ()));
        assert!("both".parse::<Precedence>().is_err());
    }
}

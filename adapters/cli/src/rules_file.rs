//! Rule overrides read from TOML.

use std::{fs, io, path::Path};

use ember_rescue_core::Rules;
use thiserror::Error;

/// Failures raised while loading a rules file.
#[derive(Debug, Error)]
pub(crate) enum RulesFileError {
    /// The file could not be read.
    #[error("failed to read rules file: {0}")]
    Io(#[from] io::Error),
    /// The file is not a valid rules document.
    #[error("failed to parse rules TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Reads rule overrides from `path`; omitted fields keep their defaults.
pub(crate) fn load(path: &Path) -> Result<Rules, RulesFileError> {
    let contents = fs::read_to_string(path)?;
    parse(&contents)
}

/// Parses a TOML rules document.
pub(crate) fn parse(contents: &str) -> Result<Rules, RulesFileError> {
    Ok(toml::from_str(contents)?)
}

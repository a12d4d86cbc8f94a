//! Where the ABI and the data to decode come from.

use std::{fs, path::PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// Environment variable naming an ABI file, used when no flag is given.
pub const ABI_FILE_ENV: &str = "ABI_FILE";

/// Source of the JSON ABI text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiSource {
    Inline(String),
    File(PathBuf),
}

impl AbiSource {
    /// Picks the ABI source: inline JSON, then the `--abi-file` path, then
    /// the path from [`ABI_FILE_ENV`]. Empty values count as missing, so an
    /// empty flag falls through to the next source.
    pub fn resolve(
        abi_json: Option<String>,
        abi_file: Option<PathBuf>,
        env_file: Option<PathBuf>,
    ) -> Result<AbiSource, ConfigError> {
        if let Some(json) = abi_json.filter(|json| !json.trim().is_empty()) {
            return Ok(AbiSource::Inline(json));
        }

        abi_file
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| env_file.filter(|path| !path.as_os_str().is_empty()))
            .map(AbiSource::File)
            .ok_or(ConfigError::MissingAbi)
    }

    /// Returns the ABI text.
    pub fn load(&self) -> Result<String, ConfigError> {
        match self {
            AbiSource::Inline(json) => Ok(json.clone()),
            AbiSource::File(path) => {
                debug!(path = %path.display(), "reading ABI file");

                fs::read_to_string(path).map_err(|source| ConfigError::ReadAbiFile {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

/// Turns the command line data argument into bytes.
///
/// `0x` prefixed input must be valid hex. Anything else is hex decoded when
/// possible and otherwise taken literally, which is how JSON logs get in.
pub fn parse_input(input: &str) -> Result<Vec<u8>, ConfigError> {
    let trimmed = input.trim();

    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return Ok(hex::decode(digits)?);
    }

    Ok(hex::decode(trimmed).unwrap_or_else(|_| input.as_bytes().to_vec()))
}

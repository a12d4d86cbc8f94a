//! Error types for schema parsing, decoding and CLI configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building an [`Abi`](crate::Abi) from its JSON description.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid ABI JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unknown ABI type: {ty}")]
    UnknownType { ty: String },

    #[error("selector 0x{selector} is shared by {first} and {second}")]
    DuplicateSelector {
        selector: String,
        first: String,
        second: String,
    },

    #[error("missing {kind} name")]
    MissingName { kind: String },
}

/// Errors raised by a single decode attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("data is {len} bytes, need at least 4 for a selector")]
    TooShort { len: usize },

    #[error("data length {len} is not a multiple of 32")]
    Misaligned { len: usize },

    #[error("read of {needed} bytes at offset {at} exceeds data length {len}")]
    Truncated { at: usize, needed: usize, len: usize },

    #[error("offset {offset} read at {at} points outside of data length {len}")]
    InvalidOffset { at: usize, offset: String, len: usize },

    #[error("invalid value at offset {at}: {reason}")]
    InvalidValue { at: usize, reason: String },

    #[error("cannot encode {found} as {expected}")]
    TypeMismatch { expected: String, found: String },

    #[error("value {value} does not fit in {ty}")]
    Overflow { ty: String, value: String },

    #[error("no method with selector 0x{selector}")]
    UnknownSelector { selector: String },

    #[error("supplied data is stuffed with extra data for method {signature}\nwant {want}\nhave {have}")]
    StuffedData {
        signature: String,
        want: String,
        have: String,
    },

    #[error("data is not a JSON list of logs: {reason}")]
    InvalidLogs { reason: String },

    #[error("no registered event matches any log topic")]
    NoEventMatch,

    #[error("failed to decode data\n  as call data: {call}\n  as logs: {logs}")]
    NoMatch {
        call: Box<CodecError>,
        logs: Box<CodecError>,
    },
}

/// Errors raised while resolving CLI inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--abi-file, --abi-json or ABI_FILE is required")]
    MissingAbi,

    #[error("failed to read ABI file {path}: {source}")]
    ReadAbiFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid hex data: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

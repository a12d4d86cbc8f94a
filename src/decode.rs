use std::fmt;

use tracing::debug;

use crate::{abi::Abi, error::CodecError, params::DecodedParams};

/// A function call or event recovered from raw data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// Canonical signature of the called function, `None` for events.
    pub signature: Option<String>,
    /// Function or event name.
    pub name: String,
    /// Decoded arguments, in declaration order.
    pub params: DecodedParams,
}

impl DecodedRecord {
    pub fn is_event(&self) -> bool {
        self.signature.is_none()
    }
}

impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_event() { "event" } else { "method" };

        write!(f, "{} {}({})", kind, self.name, self.params)
    }
}

impl Abi {
    /// Decodes `bs` as call data, or failing that, as a JSON list of logs.
    ///
    /// When both fail the error carries the reason of each attempt.
    pub fn decode(&self, bs: &[u8]) -> Result<Vec<DecodedRecord>, CodecError> {
        let call = match self.decode_call(bs) {
            Ok(record) => return Ok(vec![record]),
            Err(e) => e,
        };

        debug!(error = %call, "not call data, trying logs");

        let logs = match self.decode_logs_from_json(bs) {
            Ok(records) => return Ok(records),
            Err(e) => e,
        };

        debug!(error = %logs, "not logs either");

        Err(CodecError::NoMatch {
            call: Box::new(call),
            logs: Box::new(logs),
        })
    }
}

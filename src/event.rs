use ethereum_types::{H160, H256};
use serde::Deserialize;
use tracing::trace;

use crate::{
    abi::Abi,
    decode::DecodedRecord,
    error::CodecError,
    params::{DecodedParams, Param},
    types::Type,
    values::Value,
};

/// Contract event definition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Event {
    /// Event name.
    pub name: String,
    /// Event inputs.
    pub inputs: Vec<Param>,
    /// Whether the event is anonymous or not.
    pub anonymous: bool,
}

impl Event {
    /// Returns the event's signature.
    pub fn signature(&self) -> String {
        format!(
            "{}({})",
            self.name,
            self.inputs
                .iter()
                .map(|param| param.type_.to_string())
                .collect::<Vec<_>>()
                .join(",")
        )
    }

    /// Compute the event's topic hash
    pub fn topic(&self) -> H256 {
        use tiny_keccak::{Hasher, Keccak};

        let mut keccak_out = [0u8; 32];
        let mut hasher = Keccak::v256();
        hasher.update(self.signature().as_bytes());
        hasher.finalize(&mut keccak_out);

        H256::from_slice(&keccak_out)
    }

    /// Decode the non-indexed params from a log's data. Indexed params live
    /// in the topics and are not part of the result.
    pub fn decode_data_from_slice(&self, data: &[u8]) -> Result<DecodedParams, CodecError> {
        let inputs: Vec<&Param> = self
            .inputs
            .iter()
            .filter(|input| !input.is_indexed())
            .collect();

        let tys: Vec<Type> = inputs.iter().map(|input| input.type_.clone()).collect();
        let values = Value::decode_from_slice(data, &tys)?;

        Ok(DecodedParams::from(
            inputs
                .into_iter()
                .cloned()
                .zip(values)
                .collect::<Vec<_>>(),
        ))
    }
}

/// A log emitted by a contract.
///
/// Deserializes from the JSON returned by Ethereum nodes, where every field
/// is `0x` prefixed hex. Fields other than `address`, `topics` and `data`
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LogEntry")]
pub struct LogRecord {
    pub address: H160,
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct LogEntry {
    address: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    data: Option<String>,
}

impl TryFrom<LogEntry> for LogRecord {
    type Error = String;

    fn try_from(entry: LogEntry) -> Result<Self, Self::Error> {
        let address = match entry.address {
            Some(address) => {
                let bytes = decode_hex(&address)?;
                if bytes.len() != 20 {
                    return Err(format!("address {} is not 20 bytes", address));
                }
                H160::from_slice(&bytes)
            }
            None => H160::zero(),
        };

        let topics = entry
            .topics
            .iter()
            .map(|topic| {
                let bytes = decode_hex(topic)?;
                if bytes.len() != 32 {
                    return Err(format!("topic {} is not 32 bytes", topic));
                }
                Ok(H256::from_slice(&bytes))
            })
            .collect::<Result<Vec<_>, String>>()?;

        let data = match entry.data {
            Some(data) => decode_hex(&data)?,
            None => vec![],
        };

        Ok(LogRecord {
            address,
            topics,
            data,
        })
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    hex::decode(digits).map_err(|e| format!("invalid hex {:?}: {}", s, e))
}

impl Abi {
    /// Decodes every log against every event whose topic hash appears in the
    /// log's topic list.
    ///
    /// The topic hash may sit at any position of the topic list, not only
    /// the first one, and a log produces one record per matching
    /// (event, topic) pair. This is looser than the usual convention of
    /// reserving `topics[0]` for the event signature, and it is intended:
    /// logs are accepted whatever the position of their signature topic.
    pub fn decode_logs(&self, logs: &[LogRecord]) -> Result<Vec<DecodedRecord>, CodecError> {
        let mut records = vec![];
        for log in logs {
            // (event, topic position) pairs, looked up through the topic
            // index and visited in declaration order.
            let mut matches: Vec<(usize, usize)> = log
                .topics
                .iter()
                .enumerate()
                .flat_map(|(position, topic)| {
                    self.event_indices(topic)
                        .iter()
                        .map(move |&event| (event, position))
                })
                .collect();
            matches.sort_unstable();

            for (event, position) in matches {
                let event = &self.events()[event];

                trace!(event = %event.name, position, "log topic matched");

                records.push(DecodedRecord {
                    signature: None,
                    name: event.name.clone(),
                    params: event.decode_data_from_slice(&log.data)?,
                });
            }
        }

        if records.is_empty() {
            return Err(CodecError::NoEventMatch);
        }

        Ok(records)
    }

    /// Parses `bs` as a JSON list of logs and decodes them.
    pub fn decode_logs_from_json(&self, bs: &[u8]) -> Result<Vec<DecodedRecord>, CodecError> {
        let logs: Vec<LogRecord> =
            serde_json::from_slice(bs).map_err(|e| CodecError::InvalidLogs {
                reason: e.to_string(),
            })?;

        self.decode_logs(&logs)
    }
}

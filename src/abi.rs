use std::{
    collections::{hash_map::Entry, HashMap},
    str::FromStr,
};

use ethereum_types::H256;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::{
    decode::DecodedRecord,
    error::{CodecError, SchemaError},
    event::Event,
    params::{DecodedParams, Param, ParamEntry},
    types::Type,
    values::Value,
};

/// Contract interface, indexed for decoding.
///
/// Functions are looked up by their 4 byte selector and events by their
/// topic hash. An `Abi` is never mutated once built.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Abi {
    pub constructor: Option<Constructor>,
    pub has_receive: bool,
    pub has_fallback: bool,
    functions: Vec<Function>,
    events: Vec<Event>,
    selectors: HashMap<[u8; 4], usize>,
    topics: HashMap<H256, Vec<usize>>,
}

impl FromStr for Abi {
    type Err = SchemaError;

    /// Parses a JSON ABI document.
    ///
    /// Only function inputs and event inputs have to use supported types.
    /// A constructor or function outputs that don't are left out, since
    /// nothing is ever decoded against them.
    fn from_str(s: &str) -> Result<Abi, SchemaError> {
        let entries: Vec<AbiEntry> = serde_json::from_str(s)?;

        let mut abi = Abi {
            constructor: None,
            has_receive: false,
            has_fallback: false,
            functions: vec![],
            events: vec![],
            selectors: HashMap::new(),
            topics: HashMap::new(),
        };

        for entry in entries {
            match entry.type_.as_deref().unwrap_or("function") {
                "receive" => abi.has_receive = true,

                "fallback" => abi.has_fallback = true,

                "constructor" => {
                    let state_mutability = entry.state_mutability();

                    abi.constructor = match Param::from_entries(entry.inputs) {
                        Ok(inputs) => Some(Constructor {
                            inputs,
                            state_mutability,
                        }),
                        Err(err) => {
                            trace!(%err, "skipping constructor");
                            None
                        }
                    };
                }

                "function" => {
                    let state_mutability = entry.state_mutability();

                    let name = entry.name.ok_or_else(|| SchemaError::MissingName {
                        kind: "function".to_string(),
                    })?;

                    let outputs = Param::from_entries(entry.outputs).unwrap_or_else(|err| {
                        trace!(function = %name, %err, "skipping function outputs");
                        vec![]
                    });

                    abi.add_function(Function {
                        name,
                        inputs: Param::from_entries(entry.inputs)?,
                        outputs,
                        state_mutability,
                    })?;
                }

                "event" => {
                    let name = entry.name.ok_or_else(|| SchemaError::MissingName {
                        kind: "event".to_string(),
                    })?;

                    abi.add_event(Event {
                        name,
                        inputs: Param::from_entries(entry.inputs)?,
                        anonymous: entry.anonymous.unwrap_or(false),
                    });
                }

                other => trace!(entry = other, "skipping ABI entry"),
            }
        }

        debug!(
            functions = abi.functions.len(),
            events = abi.events.len(),
            "parsed ABI"
        );

        Ok(abi)
    }
}

impl Abi {
    fn add_function(&mut self, function: Function) -> Result<(), SchemaError> {
        let selector = function.method_id();

        match self.selectors.entry(selector) {
            Entry::Occupied(entry) => Err(SchemaError::DuplicateSelector {
                selector: hex::encode(selector),
                first: self.functions[*entry.get()].signature(),
                second: function.signature(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(self.functions.len());
                self.functions.push(function);

                Ok(())
            }
        }
    }

    fn add_event(&mut self, event: Event) {
        self.topics
            .entry(event.topic())
            .or_default()
            .push(self.events.len());
        self.events.push(event);
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Events in declaration order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn function_by_selector(&self, selector: [u8; 4]) -> Option<&Function> {
        self.selectors.get(&selector).map(|&i| &self.functions[i])
    }

    /// Events whose topic hash equals `topic`. Several events may share
    /// a topic when the ABI declares the same signature more than once.
    pub fn events_by_topic<'a>(&'a self, topic: &H256) -> impl Iterator<Item = &'a Event> + 'a {
        self.event_indices(topic)
            .iter()
            .map(move |&i| &self.events[i])
    }

    // Positions in `events` of the events hashing to `topic`, in
    // declaration order.
    pub(crate) fn event_indices(&self, topic: &H256) -> &[usize] {
        self.topics.get(topic).map(Vec::as_slice).unwrap_or_default()
    }

    /// Decodes contract call data: a 4 byte selector followed by the ABI
    /// encoded arguments.
    ///
    /// The decoded arguments are encoded again and must reproduce the input
    /// exactly, otherwise the data carries bytes that no argument accounts
    /// for and decoding fails with [`CodecError::StuffedData`].
    pub fn decode_input_from_slice(
        &self,
        input: &[u8],
    ) -> Result<(&Function, DecodedParams), CodecError> {
        if input.len() < 4 {
            return Err(CodecError::TooShort { len: input.len() });
        }

        let (selector, data) = input.split_at(4);
        if data.len() % 32 != 0 {
            return Err(CodecError::Misaligned { len: data.len() });
        }

        let mut sel = [0u8; 4];
        sel.copy_from_slice(selector);

        let func = self
            .function_by_selector(sel)
            .ok_or_else(|| CodecError::UnknownSelector {
                selector: hex::encode(selector),
            })?;

        let tys: Vec<Type> = func.inputs.iter().map(|p| p.type_.clone()).collect();
        let values = Value::decode_from_slice(data, &tys)?;

        let decoded = DecodedParams::from(
            func.inputs
                .iter()
                .cloned()
                .zip(values)
                .collect::<Vec<(Param, Value)>>(),
        );

        let encoded = decoded.encode()?;
        if encoded != data {
            return Err(CodecError::StuffedData {
                signature: func.signature(),
                want: hex::encode(data),
                have: hex::encode(encoded),
            });
        }

        Ok((func, decoded))
    }

    /// Same as [`Abi::decode_input_from_slice`] for hex input, with or
    /// without a `0x` prefix.
    pub fn decode_input_from_hex(&self, input: &str) -> Result<(&Function, DecodedParams), CodecError> {
        let input = input.trim();
        let input = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);

        let bytes = hex::decode(input).map_err(|e| CodecError::InvalidValue {
            at: 0,
            reason: e.to_string(),
        })?;

        self.decode_input_from_slice(&bytes)
    }

    /// Decodes call data into a record named after the matched function.
    pub fn decode_call(&self, input: &[u8]) -> Result<DecodedRecord, CodecError> {
        let (func, params) = self.decode_input_from_slice(input)?;

        Ok(DecodedRecord {
            signature: Some(func.signature()),
            name: func.name.clone(),
            params,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbiEntry {
    #[serde(rename = "type")]
    type_: Option<String>,
    name: Option<String>,
    inputs: Option<Vec<ParamEntry>>,
    outputs: Option<Vec<ParamEntry>>,
    state_mutability: Option<StateMutability>,
    anonymous: Option<bool>,
    constant: Option<bool>,
    payable: Option<bool>,
}

impl AbiEntry {
    // ABIs emitted before `stateMutability` existed only carry the
    // `constant` and `payable` flags.
    fn state_mutability(&self) -> StateMutability {
        match (self.state_mutability, self.constant, self.payable) {
            (Some(state_mutability), _, _) => state_mutability,
            (None, Some(true), _) => StateMutability::View,
            (None, _, Some(true)) => StateMutability::Payable,
            _ => StateMutability::NonPayable,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Constructor {
    pub inputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

/// Contract function definition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    /// Empty when the declared outputs use types that can't be decoded.
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Function {
    /// First 4 bytes of the Keccak-256 hash of the function's signature.
    pub fn method_id(&self) -> [u8; 4] {
        use tiny_keccak::{Hasher, Keccak};

        let mut keccak_out = [0u8; 32];
        let mut hasher = Keccak::v256();
        hasher.update(self.signature().as_bytes());
        hasher.finalize(&mut keccak_out);

        let mut mid = [0u8; 4];
        mid.copy_from_slice(&keccak_out[0..4]);

        mid
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`.
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
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Payable,
    NonPayable,
    View,
    Pure,
}

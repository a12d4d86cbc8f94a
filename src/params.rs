use std::{fmt, ops::Deref};

use serde::Deserialize;

use crate::{error::CodecError, error::SchemaError, types::Type, values::Value};

/// A function or event parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name, empty when the ABI leaves it out.
    pub name: String,
    /// Parameter type.
    pub type_: Type,
    /// Whether the parameter is stored in a log topic. Only set for events.
    pub indexed: Option<bool>,
}

impl Param {
    pub fn is_indexed(&self) -> bool {
        self.indexed.unwrap_or(false)
    }

    pub(crate) fn from_entry(entry: ParamEntry) -> Result<Param, SchemaError> {
        let components = entry
            .components
            .map(|components| {
                components
                    .into_iter()
                    .map(|c| Param::from_entry(c).map(|p| (p.name, p.type_)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let type_ = Type::from_abi_type(&entry.type_, components)?;

        Ok(Param {
            name: entry.name.unwrap_or_default(),
            type_,
            indexed: entry.indexed,
        })
    }

    pub(crate) fn from_entries(entries: Option<Vec<ParamEntry>>) -> Result<Vec<Param>, SchemaError> {
        entries
            .unwrap_or_default()
            .into_iter()
            .map(Param::from_entry)
            .collect()
    }
}

/// Raw parameter as found in the JSON ABI.
#[derive(Debug, Deserialize)]
pub(crate) struct ParamEntry {
    name: Option<String>,
    #[serde(rename = "type")]
    type_: String,
    components: Option<Vec<ParamEntry>>,
    indexed: Option<bool>,
}

/// A parameter together with its decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedParam {
    pub param: Param,
    pub value: Value,
}

impl From<(Param, Value)> for DecodedParam {
    fn from((param, value): (Param, Value)) -> Self {
        Self { param, value }
    }
}

impl fmt::Display for DecodedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.param.name.is_empty() {
            write!(f, "{} = {}", self.param.type_, self.value)
        } else {
            write!(
                f,
                "{}: {} = {}",
                self.param.name, self.param.type_, self.value
            )
        }
    }
}

/// Ordered list of decoded parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedParams(Vec<DecodedParam>);

impl DecodedParams {
    /// ABI encodes the values back, in parameter order.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let tys: Vec<Type> = self.0.iter().map(|p| p.param.type_.clone()).collect();
        let values: Vec<Value> = self.0.iter().map(|p| p.value.clone()).collect();

        Value::encode(&values, &tys)
    }
}

impl From<Vec<(Param, Value)>> for DecodedParams {
    fn from(v: Vec<(Param, Value)>) -> Self {
        Self(v.into_iter().map(DecodedParam::from).collect())
    }
}

impl Deref for DecodedParams {
    type Target = [DecodedParam];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for DecodedParams {
    type Item = DecodedParam;
    type IntoIter = std::vec::IntoIter<DecodedParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for DecodedParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }

        Ok(())
    }
}

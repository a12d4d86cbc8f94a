use std::{fmt, iter};

use ethereum_types::{H160, U256};

use crate::{error::CodecError, types::Type};

/// A decoded ABI value.
///
/// `Int` holds the 256 bit two's complement form of the number, sign
/// extended from its declared width.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Value {
    Uint(U256, usize),
    Int(U256, usize),
    Address(H160),
    Bool(bool),
    String(String),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    /// Decodes a list of values laid out with the ABI head/tail encoding.
    ///
    /// Bytes beyond what the types account for are ignored; callers that
    /// care compare the re-encoded values against the input.
    ///
    /// Every byte read counts against a budget of the input length, so
    /// offsets that point several values at the same payload cannot make
    /// the decoded values larger than the input.
    pub fn decode_from_slice(bs: &[u8], tys: &[Type]) -> Result<Vec<Value>, CodecError> {
        if bs.len() % 32 != 0 {
            return Err(CodecError::Misaligned { len: bs.len() });
        }

        Decoder::new(bs).decode_sequence(0, tys.iter())
    }

    /// ABI encodes `values` as a list of `tys`. This is the inverse of
    /// [`Value::decode_from_slice`].
    pub fn encode(values: &[Value], tys: &[Type]) -> Result<Vec<u8>, CodecError> {
        if values.len() != tys.len() {
            return Err(CodecError::TypeMismatch {
                expected: format!("{} values", tys.len()),
                found: format!("{} values", values.len()),
            });
        }

        Self::encode_sequence(tys.iter().zip(values))
    }

    fn encode_sequence<'a, I>(items: I) -> Result<Vec<u8>, CodecError>
    where
        I: IntoIterator<Item = (&'a Type, &'a Value)>,
    {
        let items: Vec<_> = items.into_iter().collect();
        let heads_len: usize = items.iter().map(|(ty, _)| ty.head_size()).sum();

        let mut head = Vec::with_capacity(heads_len);
        let mut tail = vec![];

        for (ty, value) in items {
            let encoded = Self::encode_value(ty, value)?;

            if ty.is_dynamic() {
                head.extend_from_slice(&Self::word(U256::from(heads_len + tail.len())));
                tail.extend(encoded);
            } else {
                head.extend(encoded);
            }
        }

        head.extend(tail);

        Ok(head)
    }

    fn encode_value(ty: &Type, value: &Value) -> Result<Vec<u8>, CodecError> {
        match (ty, value) {
            (Type::Uint(size), Value::Uint(uint, value_size)) if size == value_size => {
                if !(*uint & !Self::mask(*size)).is_zero() {
                    return Err(CodecError::Overflow {
                        ty: ty.to_string(),
                        value: value.to_string(),
                    });
                }

                Ok(Self::word(*uint).to_vec())
            }

            (Type::Int(size), Value::Int(uint, value_size)) if size == value_size => {
                if Self::sign_extend(*uint, *size) != *uint {
                    return Err(CodecError::Overflow {
                        ty: ty.to_string(),
                        value: value.to_string(),
                    });
                }

                Ok(Self::word(*uint).to_vec())
            }

            (Type::Address, Value::Address(addr)) => {
                let mut word = vec![0u8; 12];
                word.extend_from_slice(addr.as_bytes());

                Ok(word)
            }

            (Type::Bool, Value::Bool(b)) => Ok(Self::word(U256::from(*b as u8)).to_vec()),

            (Type::FixedBytes(size), Value::FixedBytes(bytes))
                if bytes.len() == *size && *size <= 32 =>
            {
                let mut word = bytes.clone();
                word.resize(32, 0);

                Ok(word)
            }

            (Type::Bytes, Value::Bytes(bytes)) => Ok(Self::encode_bytes(bytes)),

            (Type::String, Value::String(s)) => Ok(Self::encode_bytes(s.as_bytes())),

            (Type::FixedArray(ty, size), Value::Array(values)) if values.len() == *size => {
                Self::encode_sequence(iter::repeat(ty.as_ref()).zip(values))
            }

            (Type::Array(ty), Value::Array(values)) => {
                let mut encoded = Self::word(U256::from(values.len())).to_vec();
                encoded.extend(Self::encode_sequence(
                    iter::repeat(ty.as_ref()).zip(values),
                )?);

                Ok(encoded)
            }

            (Type::Tuple(components), Value::Tuple(values)) if components.len() == values.len() => {
                Self::encode_sequence(components.iter().map(|(_, ty)| ty).zip(values))
            }

            (ty, value) => Err(CodecError::TypeMismatch {
                expected: ty.to_string(),
                found: value.kind(),
            }),
        }
    }

    fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
        let mut encoded = Self::word(U256::from(bytes.len())).to_vec();
        encoded.extend_from_slice(bytes);
        encoded.resize(32 + Self::padded32_size(bytes.len()), 0);

        encoded
    }

    /// Short description of the value's shape, for error messages.
    pub fn kind(&self) -> String {
        match self {
            Value::Uint(_, size) => format!("uint{} value", size),
            Value::Int(_, size) => format!("int{} value", size),
            Value::Address(_) => "address value".to_string(),
            Value::Bool(_) => "bool value".to_string(),
            Value::String(_) => "string value".to_string(),
            Value::FixedBytes(bytes) => format!("bytes{} value", bytes.len()),
            Value::Bytes(_) => "bytes value".to_string(),
            Value::Array(values) => format!("array of {} values", values.len()),
            Value::Tuple(values) => format!("tuple of {} values", values.len()),
        }
    }

    fn word(uint: U256) -> [u8; 32] {
        let mut word = [0u8; 32];
        uint.to_big_endian(&mut word);

        word
    }

    // Lengths and offsets larger than any buffer are clamped, they fail
    // bounds checks either way.
    fn saturating_usize(uint: U256) -> usize {
        if uint.bits() > 64 {
            usize::MAX
        } else {
            usize::try_from(uint.low_u64()).unwrap_or(usize::MAX)
        }
    }

    fn mask(size: usize) -> U256 {
        if size >= 256 {
            U256::max_value()
        } else {
            (U256::one() << size) - U256::one()
        }
    }

    fn sign_extend(uint: U256, size: usize) -> U256 {
        if size >= 256 {
            return uint;
        }

        let mask = Self::mask(size);
        let low = uint & mask;

        if low.bit(size - 1) {
            low | !mask
        } else {
            low
        }
    }

    // Computes the padded size for a given size, e.g.:
    // padded32_size(20) == 32
    // padded32_size(32) == 32
    // padded32_size(40) == 64
    fn padded32_size(size: usize) -> usize {
        let r = size % 32;

        if r == 0 {
            size
        } else {
            size + 32 - r
        }
    }
}

struct Decoder<'a> {
    bs: &'a [u8],
    budget: usize,
}

impl<'a> Decoder<'a> {
    fn new(bs: &'a [u8]) -> Self {
        Self {
            bs,
            budget: bs.len(),
        }
    }

    // Decodes consecutive head slots starting at `base`. Offsets of dynamic
    // values are relative to `base`.
    fn decode_sequence<'t, I>(&mut self, base: usize, tys: I) -> Result<Vec<Value>, CodecError>
    where
        I: IntoIterator<Item = &'t Type>,
    {
        let mut at = base;
        let mut values = vec![];

        for ty in tys {
            let value = if ty.is_dynamic() {
                let offset = U256::from_big_endian(self.read_word(at)?);

                let target = base
                    .checked_add(Value::saturating_usize(offset))
                    .filter(|target| *target < self.bs.len())
                    .ok_or_else(|| CodecError::InvalidOffset {
                        at,
                        offset: offset.to_string(),
                        len: self.bs.len(),
                    })?;

                self.decode_value(target, ty)?
            } else {
                self.decode_value(at, ty)?
            };

            values.push(value);
            at += ty.head_size();
        }

        Ok(values)
    }

    // Decodes a single value whose encoding starts at `at`.
    fn decode_value(&mut self, at: usize, ty: &Type) -> Result<Value, CodecError> {
        match ty {
            Type::Uint(size) => {
                let uint = U256::from_big_endian(self.read_word(at)?);

                Ok(Value::Uint(uint & Value::mask(*size), *size))
            }

            Type::Int(size) => {
                let uint = U256::from_big_endian(self.read_word(at)?);

                Ok(Value::Int(Value::sign_extend(uint, *size), *size))
            }

            Type::Address => {
                let word = self.read_word(at)?;

                Ok(Value::Address(H160::from_slice(&word[12..])))
            }

            Type::Bool => {
                let uint = U256::from_big_endian(self.read_word(at)?);

                if uint.is_zero() {
                    Ok(Value::Bool(false))
                } else if uint == U256::one() {
                    Ok(Value::Bool(true))
                } else {
                    Err(CodecError::InvalidValue {
                        at,
                        reason: format!("boolean word is {}", uint),
                    })
                }
            }

            Type::FixedBytes(size) => {
                let word = self.read_word(at)?;
                let bytes = word.get(..*size).ok_or_else(|| CodecError::InvalidValue {
                    at,
                    reason: format!("bytes{} is wider than a word", size),
                })?;

                Ok(Value::FixedBytes(bytes.to_vec()))
            }

            Type::Bytes => Ok(Value::Bytes(self.read_bytes(at)?.to_vec())),

            Type::String => {
                let bytes = self.read_bytes(at)?.to_vec();

                String::from_utf8(bytes)
                    .map(Value::String)
                    .map_err(|e| CodecError::InvalidValue {
                        at,
                        reason: e.to_string(),
                    })
            }

            Type::FixedArray(ty, size) => self
                .decode_sequence(at, iter::repeat(ty.as_ref()).take(*size))
                .map(Value::Array),

            Type::Array(ty) => {
                let len = Value::saturating_usize(U256::from_big_endian(self.read_word(at)?));
                let base = at + 32;

                let head_size = ty.head_size();
                if head_size == 0 {
                    return Err(CodecError::InvalidValue {
                        at,
                        reason: format!("array element {} has no encoding", ty),
                    });
                }

                // Check the declared length against the data before
                // allocating.
                let needed = len.saturating_mul(head_size);
                if base.saturating_add(needed) > self.bs.len() {
                    return Err(CodecError::Truncated {
                        at: base,
                        needed,
                        len: self.bs.len(),
                    });
                }

                self.decode_sequence(base, iter::repeat(ty.as_ref()).take(len))
                    .map(Value::Array)
            }

            Type::Tuple(components) => self
                .decode_sequence(at, components.iter().map(|(_, ty)| ty))
                .map(Value::Tuple),
        }
    }

    fn charge(&mut self, at: usize, needed: usize) -> Result<(), CodecError> {
        self.budget = self
            .budget
            .checked_sub(needed)
            .ok_or(CodecError::Truncated {
                at,
                needed,
                len: self.bs.len(),
            })?;

        Ok(())
    }

    fn read_word(&mut self, at: usize) -> Result<&'a [u8], CodecError> {
        let bs = self.bs;
        let word = at
            .checked_add(32)
            .and_then(|end| bs.get(at..end))
            .ok_or(CodecError::Truncated {
                at,
                needed: 32,
                len: bs.len(),
            })?;

        self.charge(at, 32)?;

        Ok(word)
    }

    // Reads a length-prefixed byte string. Padding after the payload is not
    // inspected.
    fn read_bytes(&mut self, at: usize) -> Result<&'a [u8], CodecError> {
        let len = Value::saturating_usize(U256::from_big_endian(self.read_word(at)?));
        let start = at + 32;

        let bs = self.bs;
        let bytes = start
            .checked_add(len)
            .and_then(|end| bs.get(start..end))
            .ok_or(CodecError::Truncated {
                at: start,
                needed: len,
                len: bs.len(),
            })?;

        self.charge(start, len)?;

        Ok(bytes)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint(uint, _) => write!(f, "{}", uint),
            Value::Int(uint, _) => {
                if uint.bit(255) {
                    let (magnitude, _) = (!*uint).overflowing_add(U256::one());
                    write!(f, "-{}", magnitude)
                } else {
                    write!(f, "{}", uint)
                }
            }
            Value::Address(addr) => write!(f, "0x{}", hex::encode(addr.as_bytes())),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{:?}", s),
            Value::FixedBytes(bytes) | Value::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Value::Array(values) => {
                write!(f, "[")?;
                write_list(f, values)?;
                write!(f, "]")
            }
            Value::Tuple(values) => {
                write!(f, "(")?;
                write_list(f, values)?;
                write!(f, ")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", value)?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn word(n: u64) -> String {
        format!("{:064x}", n)
    }

    fn neg(n: u64) -> U256 {
        U256::max_value() - U256::from(n - 1)
    }

    #[test]
    fn decode_uint() {
        let uint: U256 = U256::exp10(18) + 1;

        let mut bs = [0u8; 32];
        uint.to_big_endian(&mut bs[..]);

        let v = Value::decode_from_slice(&bs, &[Type::Uint(256)]);

        assert_eq!(v, Ok(vec![Value::Uint(uint, 256)]));
    }

    #[test]
    fn decode_int() {
        let uint: U256 = U256::exp10(18) + 1;

        let mut bs = [0u8; 32];
        uint.to_big_endian(&mut bs[..]);

        let v = Value::decode_from_slice(&bs, &[Type::Int(256)]);

        assert_eq!(v, Ok(vec![Value::Int(uint, 256)]));
    }

    #[test]
    fn decode_negative_int() {
        let bs = [0xffu8; 32];

        let v = Value::decode_from_slice(&bs, &[Type::Int(8)]).unwrap();

        assert_eq!(v, vec![Value::Int(neg(1), 8)]);
        assert_eq!(v[0].to_string(), "-1");

        // int8 -128
        let mut bs = [0xffu8; 32];
        bs[31] = 0x80;

        let v = Value::decode_from_slice(&bs, &[Type::Int(8)]).unwrap();

        assert_eq!(v[0].to_string(), "-128");
    }

    #[test]
    fn decode_address() {
        let addr = H160::from(rand::random::<[u8; 20]>());

        let mut bs = [0u8; 32];
        bs[12..].copy_from_slice(addr.as_bytes());

        let v = Value::decode_from_slice(&bs, &[Type::Address]);

        assert_eq!(v, Ok(vec![Value::Address(addr)]));
    }

    #[test]
    fn decode_bool() {
        let mut bs = [0u8; 32];
        bs[31] = 1;

        let v = Value::decode_from_slice(&bs, &[Type::Bool]);

        assert_eq!(v, Ok(vec![Value::Bool(true)]));

        bs[31] = 2;

        let v = Value::decode_from_slice(&bs, &[Type::Bool]);

        assert!(matches!(v, Err(CodecError::InvalidValue { at: 0, .. })));
    }

    #[test]
    fn decode_fixed_bytes() {
        let mut bs = [0u8; 32];
        for (i, b) in bs.iter_mut().enumerate().take(16).skip(1) {
            *b = i as u8;
        }

        let v = Value::decode_from_slice(&bs, &[Type::FixedBytes(16)]);

        assert_eq!(v, Ok(vec![Value::FixedBytes(bs[0..16].to_vec())]));
    }

    #[test]
    fn decode_fixed_array() {
        let mut bs = [0u8; 128];

        // encode some data
        let uint1 = U256::from(5);
        let uint2 = U256::from(6);
        let uint3 = U256::from(7);
        let uint4 = U256::from(8);

        uint1.to_big_endian(&mut bs[0..32]);
        uint2.to_big_endian(&mut bs[32..64]);
        uint3.to_big_endian(&mut bs[64..96]);
        uint4.to_big_endian(&mut bs[96..128]);

        let uint_arr2 = Type::FixedArray(Box::new(Type::Uint(256)), 2);

        let v = Value::decode_from_slice(&bs, &[Type::FixedArray(Box::new(uint_arr2), 2)]);

        assert_eq!(
            v,
            Ok(vec![Value::Array(vec![
                Value::Array(vec![Value::Uint(uint1, 256), Value::Uint(uint2, 256)]),
                Value::Array(vec![Value::Uint(uint3, 256), Value::Uint(uint4, 256)])
            ])])
        );
    }

    #[test]
    fn decode_string() {
        let mut rng = rand::thread_rng();

        let mut bs = [0u8; 128];

        bs[31] = 0x20; // big-endian string offset

        let str_len: usize = rng.gen_range(0..64);
        bs[63] = str_len as u8; // big-endian string size

        let chars = "abcdef0123456789".as_bytes();

        for i in 0..str_len {
            bs[64 + i] = chars[rng.gen_range(0..chars.len())];
        }

        let v = Value::decode_from_slice(&bs, &[Type::String]);

        let expected_str = String::from_utf8(bs[64..(64 + str_len)].to_vec()).unwrap();
        assert_eq!(v, Ok(vec![Value::String(expected_str)]));
    }

    #[test]
    fn decode_invalid_utf8_string() {
        let input = [word(0x20), word(2), format!("{:0<64}", "fffe")].concat();
        let bs = hex::decode(input).unwrap();

        let v = Value::decode_from_slice(&bs, &[Type::String]);

        assert!(matches!(v, Err(CodecError::InvalidValue { at: 32, .. })));
    }

    #[test]
    fn decode_bytes() {
        let mut rng = rand::thread_rng();

        let mut bs = [0u8; 128];
        bs[31] = 0x20; // big-endian bytes offset

        let bytes_len: usize = rng.gen_range(0..64);
        bs[63] = bytes_len as u8; // big-endian bytes length

        for b in bs.iter_mut().skip(64).take(bytes_len) {
            *b = rng.gen();
        }

        let v = Value::decode_from_slice(&bs, &[Type::Bytes]);

        assert_eq!(v, Ok(vec![Value::Bytes(bs[64..(64 + bytes_len)].to_vec())]));
    }

    #[test]
    fn decode_array() {
        let mut bs = [0u8; 192];
        bs[31] = 0x20; // big-endian array offset
        bs[63] = 2; // big-endian array length

        // encode some data
        let uint1 = U256::from(5);
        let uint2 = U256::from(6);
        let uint3 = U256::from(7);
        let uint4 = U256::from(8);

        uint1.to_big_endian(&mut bs[64..96]);
        uint2.to_big_endian(&mut bs[96..128]);
        uint3.to_big_endian(&mut bs[128..160]);
        uint4.to_big_endian(&mut bs[160..192]);

        let uint_arr2 = Type::FixedArray(Box::new(Type::Uint(256)), 2);

        let v = Value::decode_from_slice(&bs, &[Type::Array(Box::new(uint_arr2))]);

        assert_eq!(
            v,
            Ok(vec![Value::Array(vec![
                Value::Array(vec![Value::Uint(uint1, 256), Value::Uint(uint2, 256)]),
                Value::Array(vec![Value::Uint(uint3, 256), Value::Uint(uint4, 256)])
            ])])
        );
    }

    #[test]
    fn decode_many() {
        // function f(string memory x, uint32 y, uint32[][2] memory z)
        let tys = vec![
            Type::String,
            Type::Uint(32),
            Type::FixedArray(Box::new(Type::Array(Box::new(Type::Uint(32)))), 2),
        ];

        // f("abc", 5, [[1, 2], [3]])
        let input = "0000000000000000000000000000000000000000000000000000000000000060000000000000000000000000000000000000000000000000000000000000000500000000000000000000000000000000000000000000000000000000000000a000000000000000000000000000000000000000000000000000000000000000036162630000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000004000000000000000000000000000000000000000000000000000000000000000a000000000000000000000000000000000000000000000000000000000000000020000000000000000000000000000000000000000000000000000000000000001000000000000000000000000000000000000000000000000000000000000000200000000000000000000000000000000000000000000000000000000000000010000000000000000000000000000000000000000000000000000000000000003";
        let mut bs = [0u8; 384];
        hex::decode_to_slice(input, &mut bs).unwrap();

        let v = Value::decode_from_slice(&bs, &tys).unwrap();

        assert_eq!(
            v,
            vec![
                Value::String("abc".to_string()),
                Value::Uint(U256::from(5), 32),
                Value::Array(vec![
                    Value::Array(vec![
                        Value::Uint(U256::from(1), 32),
                        Value::Uint(U256::from(2), 32),
                    ]),
                    Value::Array(vec![Value::Uint(U256::from(3), 32)]),
                ]),
            ],
        );

        assert_eq!(Value::encode(&v, &tys), Ok(bs.to_vec()));
    }

    #[test]
    fn decode_dynamic_tuple() {
        // f((uint256,string) t, bool b) with f((7, "hi"), true)
        let tys = vec![
            Type::Tuple(vec![
                ("x".to_string(), Type::Uint(256)),
                ("s".to_string(), Type::String),
            ]),
            Type::Bool,
        ];

        let input = [
            word(0x40),
            word(1),
            word(7),
            word(0x40),
            word(2),
            format!("{:0<64}", "6869"),
        ]
        .concat();
        let bs = hex::decode(input).unwrap();

        let v = Value::decode_from_slice(&bs, &tys).unwrap();

        assert_eq!(
            v,
            vec![
                Value::Tuple(vec![
                    Value::Uint(U256::from(7), 256),
                    Value::String("hi".to_string())
                ]),
                Value::Bool(true),
            ]
        );
        assert_eq!(v[0].to_string(), "(7, \"hi\")");

        assert_eq!(Value::encode(&v, &tys), Ok(bs));
    }

    #[test]
    fn decode_static_tuple_inline() {
        let tys = vec![
            Type::Tuple(vec![
                ("a".to_string(), Type::Uint(8)),
                ("b".to_string(), Type::Bool),
            ]),
            Type::Uint(8),
        ];

        let bs = hex::decode([word(1), word(1), word(2)].concat()).unwrap();

        let v = Value::decode_from_slice(&bs, &tys).unwrap();

        assert_eq!(
            v,
            vec![
                Value::Tuple(vec![Value::Uint(U256::from(1), 8), Value::Bool(true)]),
                Value::Uint(U256::from(2), 8),
            ]
        );
    }

    #[test]
    fn misaligned() {
        let bs = [0u8; 33];

        assert_eq!(
            Value::decode_from_slice(&bs, &[Type::Uint(256)]),
            Err(CodecError::Misaligned { len: 33 })
        );
    }

    #[test]
    fn truncated_head() {
        let bs = [0u8; 32];

        assert_eq!(
            Value::decode_from_slice(&bs, &[Type::Uint(256), Type::Uint(256)]),
            Err(CodecError::Truncated {
                at: 32,
                needed: 32,
                len: 32
            })
        );
    }

    #[test]
    fn offset_out_of_range() {
        let bs = hex::decode(word(0x1000)).unwrap();

        assert_eq!(
            Value::decode_from_slice(&bs, &[Type::Bytes]),
            Err(CodecError::InvalidOffset {
                at: 0,
                offset: "4096".to_string(),
                len: 32
            })
        );

        let bs = [0xffu8; 32];

        assert!(matches!(
            Value::decode_from_slice(&bs, &[Type::String]),
            Err(CodecError::InvalidOffset { at: 0, .. })
        ));
    }

    #[test]
    fn huge_lengths() {
        // bytes whose declared length runs past the data
        let bs = hex::decode([word(0x20), word(0x40), word(0)].concat()).unwrap();

        assert_eq!(
            Value::decode_from_slice(&bs, &[Type::Bytes]),
            Err(CodecError::Truncated {
                at: 64,
                needed: 64,
                len: 96
            })
        );

        // array claiming more elements than could possibly fit
        let mut bs = hex::decode([word(0x20), word(0)].concat()).unwrap();
        bs[32..64].copy_from_slice(&[0xff; 32]);

        assert!(matches!(
            Value::decode_from_slice(&bs, &[Type::Array(Box::new(Type::Uint(256)))]),
            Err(CodecError::Truncated { at: 64, .. })
        ));
    }

    #[test]
    fn aliased_offsets() {
        let payload = "ab".repeat(64);

        // bytes[] with one element
        let input = [word(0x20), word(1), word(0x20), word(0x40), payload.clone()].concat();
        let bs = hex::decode(input).unwrap();

        assert_eq!(
            Value::decode_from_slice(&bs, &[Type::Array(Box::new(Type::Bytes))]),
            Ok(vec![Value::Array(vec![Value::Bytes(vec![0xab; 64])])])
        );

        // four elements sharing the same payload
        let input = [
            word(0x20),
            word(4),
            word(0x80),
            word(0x80),
            word(0x80),
            word(0x80),
            word(0x40),
            payload,
        ]
        .concat();
        let bs = hex::decode(input).unwrap();

        assert!(matches!(
            Value::decode_from_slice(&bs, &[Type::Array(Box::new(Type::Bytes))]),
            Err(CodecError::Truncated { len: 288, .. })
        ));
    }

    #[test]
    fn zero_sized_array_elements() {
        let bs = hex::decode([word(0x20), word(3)].concat()).unwrap();

        assert!(matches!(
            Value::decode_from_slice(&bs, &[Type::Array(Box::new(Type::Tuple(vec![])))]),
            Err(CodecError::InvalidValue { at: 32, .. })
        ));
    }

    #[test]
    fn dirty_padding_is_dropped() {
        // uint8 with high bits set, address with dirty upper bytes
        let bs = [0xffu8; 64];

        let v = Value::decode_from_slice(&bs, &[Type::Uint(8), Type::Address]).unwrap();

        assert_eq!(
            v,
            vec![
                Value::Uint(U256::from(0xff), 8),
                Value::Address(H160::repeat_byte(0xff))
            ]
        );

        let encoded = Value::encode(&v, &[Type::Uint(8), Type::Address]).unwrap();

        assert_ne!(encoded, bs.to_vec());
    }

    #[test]
    fn encode_hand_built_values() {
        let tys = vec![
            Type::Int(16),
            Type::FixedBytes(4),
            Type::Array(Box::new(Type::String)),
            Type::FixedArray(Box::new(Type::Bytes), 2),
            Type::Tuple(vec![
                ("who".to_string(), Type::Address),
                ("tags".to_string(), Type::Array(Box::new(Type::FixedBytes(2)))),
            ]),
        ];

        let values = vec![
            Value::Int(neg(300), 16),
            Value::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef]),
            Value::Array(vec![
                Value::String("one".to_string()),
                Value::String("a string longer than thirty two bytes".to_string()),
            ]),
            Value::Array(vec![Value::Bytes(vec![]), Value::Bytes(vec![1, 2, 3])]),
            Value::Tuple(vec![
                Value::Address(H160::repeat_byte(0x11)),
                Value::Array(vec![Value::FixedBytes(vec![0xab, 0xcd])]),
            ]),
        ];

        let encoded = Value::encode(&values, &tys).unwrap();

        assert_eq!(encoded.len() % 32, 0);
        assert_eq!(Value::decode_from_slice(&encoded, &tys), Ok(values));
    }

    #[test]
    fn encode_type_mismatch() {
        assert_eq!(
            Value::encode(&[Value::Bool(true)], &[Type::Address]),
            Err(CodecError::TypeMismatch {
                expected: "address".to_string(),
                found: "bool value".to_string()
            })
        );

        assert!(matches!(
            Value::encode(
                &[Value::Array(vec![Value::Bool(true)])],
                &[Type::FixedArray(Box::new(Type::Bool), 2)]
            ),
            Err(CodecError::TypeMismatch { .. })
        ));

        assert!(matches!(
            Value::encode(&[], &[Type::Bool]),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn encode_overflow() {
        assert_eq!(
            Value::encode(&[Value::Uint(U256::from(256), 8)], &[Type::Uint(8)]),
            Err(CodecError::Overflow {
                ty: "uint8".to_string(),
                value: "256".to_string()
            })
        );

        // 128 is not a valid int8
        assert!(matches!(
            Value::encode(&[Value::Int(U256::from(128), 8)], &[Type::Int(8)]),
            Err(CodecError::Overflow { .. })
        ));
    }

    fn random_type<R: Rng>(rng: &mut R, depth: usize) -> Type {
        let kinds = if depth == 0 { 7 } else { 10 };

        match rng.gen_range(0..kinds) {
            0 => Type::Uint(8 * rng.gen_range(1..=32)),
            1 => Type::Int(8 * rng.gen_range(1..=32)),
            2 => Type::Address,
            3 => Type::Bool,
            4 => Type::FixedBytes(rng.gen_range(1..=32)),
            5 => Type::Bytes,
            6 => Type::String,
            7 => {
                let size = rng.gen_range(1..4);
                Type::FixedArray(Box::new(random_type(rng, depth - 1)), size)
            }
            8 => Type::Array(Box::new(random_type(rng, depth - 1))),
            _ => {
                let len = rng.gen_range(1..4);
                Type::Tuple(
                    (0..len)
                        .map(|i| (format!("c{}", i), random_type(rng, depth - 1)))
                        .collect(),
                )
            }
        }
    }

    fn random_value<R: Rng>(rng: &mut R, ty: &Type) -> Value {
        match ty {
            Type::Uint(size) => {
                let uint = U256::from_big_endian(&rng.gen::<[u8; 32]>());
                Value::Uint(uint & Value::mask(*size), *size)
            }
            Type::Int(size) => {
                let uint = U256::from_big_endian(&rng.gen::<[u8; 32]>());
                Value::Int(Value::sign_extend(uint, *size), *size)
            }
            Type::Address => Value::Address(H160::from(rng.gen::<[u8; 20]>())),
            Type::Bool => Value::Bool(rng.gen()),
            Type::FixedBytes(size) => Value::FixedBytes((0..*size).map(|_| rng.gen()).collect()),
            Type::Bytes => {
                let len = rng.gen_range(0..70);
                Value::Bytes((0..len).map(|_| rng.gen()).collect())
            }
            Type::String => {
                let chars = ['a', 'Z', '0', ' ', 'é', '€'];
                let len = rng.gen_range(0..40);
                Value::String(
                    (0..len)
                        .map(|_| chars[rng.gen_range(0..chars.len())])
                        .collect(),
                )
            }
            Type::FixedArray(ty, size) => {
                Value::Array((0..*size).map(|_| random_value(rng, ty)).collect())
            }
            Type::Array(ty) => {
                let len = rng.gen_range(0..4);
                Value::Array((0..len).map(|_| random_value(rng, ty)).collect())
            }
            Type::Tuple(components) => Value::Tuple(
                components
                    .iter()
                    .map(|(_, ty)| random_value(rng, ty))
                    .collect(),
            ),
        }
    }

    #[test]
    fn random_round_trip() {
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let len = rng.gen_range(1..5);
            let tys: Vec<Type> = (0..len).map(|_| random_type(&mut rng, 2)).collect();
            let values: Vec<Value> = tys.iter().map(|ty| random_value(&mut rng, ty)).collect();

            let encoded = Value::encode(&values, &tys).unwrap();
            let decoded = Value::decode_from_slice(&encoded, &tys).unwrap();

            assert_eq!(decoded, values, "types: {:?}", tys);
            assert_eq!(Value::encode(&decoded, &tys), Ok(encoded));
        }
    }

    #[test]
    fn display_values() {
        assert_eq!(Value::Int(neg(42), 256).to_string(), "-42");
        assert_eq!(
            Value::Address(H160::repeat_byte(0xab)).to_string(),
            "0xabababababababababababababababababababab"
        );
        assert_eq!(Value::Bytes(vec![1, 2]).to_string(), "0x0102");
        assert_eq!(
            Value::Array(vec![Value::Bool(true), Value::Bool(false)]).to_string(),
            "[true, false]"
        );
    }
}

use std::{fmt, str::FromStr};

use crate::error::SchemaError;

/// An ABI type.
///
/// Tuple components keep their declared names so decoded values can be
/// rendered with them; names never take part in the canonical type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Uint(usize),
    Int(usize),
    Address,
    Bool,
    String,
    FixedBytes(usize),
    Bytes,
    FixedArray(Box<Type>, usize),
    Array(Box<Type>),
    Tuple(Vec<(String, Type)>),
}

impl Type {
    /// Builds a type from the `type` field of a JSON ABI parameter.
    ///
    /// `tuple`, `tuple[]`, `tuple[2][]` etc. take their component types from
    /// `components`, every other type is parsed from the string alone.
    /// Tuples need at least one component.
    pub fn from_abi_type(
        ty: &str,
        components: Option<Vec<(String, Type)>>,
    ) -> Result<Type, SchemaError> {
        // The parser does not ignore whitespaces so we remove them before
        // parsing the given string.
        let ty = ty.replace(' ', "");
        let unknown = || SchemaError::UnknownType { ty: ty.clone() };

        match (ty.strip_prefix("tuple"), components) {
            (Some(suffix), Some(components)) if !components.is_empty() => {
                let (_, sizes) = parsers::parse_exact_array_sizes(suffix).map_err(|_| unknown())?;

                Ok(parsers::wrap_arrays(Type::Tuple(components), sizes))
            }

            _ => parsers::parse_exact_type(&ty)
                .map(|(_, ty)| ty)
                .map_err(|_| unknown()),
        }
    }

    /// Whether values of this type are encoded out of line, behind an offset.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Type::String | Type::Bytes | Type::Array(_) => true,
            Type::FixedArray(ty, _) => ty.is_dynamic(),
            Type::Tuple(components) => components.iter().any(|(_, ty)| ty.is_dynamic()),
            _ => false,
        }
    }

    /// Number of bytes a value of this type occupies in the head region.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return 32;
        }

        match self {
            Type::FixedArray(ty, size) => ty.head_size() * size,
            Type::Tuple(components) => components.iter().map(|(_, ty)| ty.head_size()).sum(),
            _ => 32,
        }
    }
}

impl FromStr for Type {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Type::from_abi_type(s, None)
    }
}

/// Canonical type name, as used in signatures.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Uint(size) => write!(f, "uint{}", size),
            Type::Int(size) => write!(f, "int{}", size),
            Type::Address => write!(f, "address"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::FixedBytes(size) => write!(f, "bytes{}", size),
            Type::Bytes => write!(f, "bytes"),
            Type::FixedArray(ty, size) => write!(f, "{}[{}]", ty, size),
            Type::Array(ty) => write!(f, "{}[]", ty),
            Type::Tuple(components) => {
                write!(f, "(")?;
                for (i, (_, ty)) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ")")
            }
        }
    }
}

mod parsers {
    use nom::{
        branch::alt,
        bytes::complete::tag,
        character::complete::{char, digit1},
        combinator::{all_consuming, map, map_res, opt, verify},
        multi::{many0, separated_list1},
        sequence::delimited,
        IResult,
    };

    use super::Type;

    pub fn parse_exact_type(input: &str) -> IResult<&str, Type> {
        all_consuming(parse_type)(input)
    }

    pub fn parse_exact_array_sizes(input: &str) -> IResult<&str, Vec<Option<usize>>> {
        all_consuming(parse_array_sizes)(input)
    }

    /// Wraps `ty` in array types, innermost size first: `T[2][]` is a
    /// dynamic array of `T[2]`.
    pub fn wrap_arrays(ty: Type, sizes: Vec<Option<usize>>) -> Type {
        sizes.into_iter().fold(ty, |ty, size| match size {
            None => Type::Array(Box::new(ty)),
            Some(size) => Type::FixedArray(Box::new(ty), size),
        })
    }

    fn parse_type(input: &str) -> IResult<&str, Type> {
        let (i, ty) = alt((parse_tuple, parse_simple_type))(input)?;
        let (i, sizes) = parse_array_sizes(i)?;

        Ok((i, wrap_arrays(ty, sizes)))
    }

    fn parse_simple_type(input: &str) -> IResult<&str, Type> {
        alt((
            parse_uint,
            parse_int,
            parse_bytes,
            parse_string,
            parse_address,
            parse_bool,
        ))(input)
    }

    fn parse_uint(input: &str) -> IResult<&str, Type> {
        map(verify(parse_sized("uint"), check_int_size), Type::Uint)(input)
    }

    fn parse_int(input: &str) -> IResult<&str, Type> {
        map(verify(parse_sized("int"), check_int_size), Type::Int)(input)
    }

    fn parse_address(input: &str) -> IResult<&str, Type> {
        map(tag("address"), |_| Type::Address)(input)
    }

    fn parse_bool(input: &str) -> IResult<&str, Type> {
        map(tag("bool"), |_| Type::Bool)(input)
    }

    fn parse_string(input: &str) -> IResult<&str, Type> {
        map(tag("string"), |_| Type::String)(input)
    }

    fn parse_bytes(input: &str) -> IResult<&str, Type> {
        let (i, _) = tag("bytes")(input)?;
        let (i, size) = opt(verify(parse_integer, check_fixed_bytes_size))(i)?;

        let ty = size.map_or(Type::Bytes, Type::FixedBytes);

        Ok((i, ty))
    }

    fn parse_array_sizes(input: &str) -> IResult<&str, Vec<Option<usize>>> {
        many0(delimited(
            char('['),
            opt(verify(parse_integer, |size: &usize| *size > 0)),
            char(']'),
        ))(input)
    }

    fn parse_tuple(input: &str) -> IResult<&str, Type> {
        map(
            delimited(char('('), separated_list1(char(','), parse_type), char(')')),
            |tys| Type::Tuple(tys.into_iter().map(|ty| (String::new(), ty)).collect()),
        )(input)
    }

    // `uint` and `int` without a size are aliases for the 256 bit versions.
    fn parse_sized<'a>(t: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, usize> {
        move |input: &'a str| {
            let (i, _) = tag(t)(input)?;
            let (i, size) = opt(parse_integer)(i)?;

            Ok((i, size.unwrap_or(256)))
        }
    }

    fn parse_integer(input: &str) -> IResult<&str, usize> {
        map_res(digit1, str::parse)(input)
    }

    fn check_int_size(i: &usize) -> bool {
        let i = *i;

        i > 0 && i <= 256 && i % 8 == 0
    }

    fn check_fixed_bytes_size(i: &usize) -> bool {
        let i = *i;

        i > 0 && i <= 32
    }

}

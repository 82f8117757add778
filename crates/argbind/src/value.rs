//! Conversion of command-line tokens into typed values.
//!
//! The supported set is closed: `bool`, the integer family, `f32`/`f64`, `char`,
//! `String`, `PathBuf`, and named enumerations (see [`crate::enumeration`]).

use std::path::PathBuf;

use thiserror::Error;

/// Why a token could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Argument {token} could not be parsed as type {type_name}.")]
    Unparsable { token: String, type_name: String },
    #[error("You have chosen an invalid input value: {token}. Please use one of: [{}]", .names.join(", "))]
    InvalidName { token: String, names: Vec<String> },
}

impl ConversionError {
    pub fn unparsable<T: Value>(token: &str) -> Self {
        Self::Unparsable {
            token: token.to_string(),
            type_name: T::type_name(),
        }
    }
}

/// A type a command-line token can be bound to.
///
/// `to_arg` yields the canonical string form; for every value produced by `parse_arg`,
/// `parse_arg(&v.to_arg())` yields an equal value.
pub trait Value: Sized {
    fn parse_arg(token: &str) -> Result<Self, ConversionError>;

    fn to_arg(&self) -> String;

    /// Human-readable type name used in help pages and error messages.
    fn type_name() -> String;
}

impl Value for bool {
    fn parse_arg(token: &str) -> Result<Self, ConversionError> {
        match token {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ConversionError::unparsable::<Self>(token)),
        }
    }

    fn to_arg(&self) -> String {
        self.to_string()
    }

    fn type_name() -> String {
        "bool".to_string()
    }
}

macro_rules! impl_integer_value {
    ($($t:ty => $sign:literal),* $(,)?) => {
        $(
            impl Value for $t {
                fn parse_arg(token: &str) -> Result<Self, ConversionError> {
                    token
                        .parse::<$t>()
                        .map_err(|_| ConversionError::unparsable::<Self>(token))
                }

                fn to_arg(&self) -> String {
                    self.to_string()
                }

                fn type_name() -> String {
                    format!("{} {} bit integer", $sign, <$t>::BITS)
                }
            }
        )*
    };
}

impl_integer_value!(
    i8 => "signed",
    i16 => "signed",
    i32 => "signed",
    i64 => "signed",
    i128 => "signed",
    isize => "signed",
    u8 => "unsigned",
    u16 => "unsigned",
    u32 => "unsigned",
    u64 => "unsigned",
    u128 => "unsigned",
    usize => "unsigned",
);

macro_rules! impl_float_value {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl Value for $t {
                fn parse_arg(token: &str) -> Result<Self, ConversionError> {
                    token
                        .parse::<$t>()
                        .map_err(|_| ConversionError::unparsable::<Self>(token))
                }

                fn to_arg(&self) -> String {
                    self.to_string()
                }

                fn type_name() -> String {
                    $name.to_string()
                }
            }
        )*
    };
}

impl_float_value!(f32 => "float", f64 => "double");

impl Value for char {
    fn parse_arg(token: &str) -> Result<Self, ConversionError> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::unparsable::<Self>(token)),
        }
    }

    fn to_arg(&self) -> String {
        self.to_string()
    }

    fn type_name() -> String {
        "char".to_string()
    }
}

impl Value for String {
    fn parse_arg(token: &str) -> Result<Self, ConversionError> {
        Ok(token.to_string())
    }

    fn to_arg(&self) -> String {
        self.clone()
    }

    fn type_name() -> String {
        "string".to_string()
    }
}

impl Value for PathBuf {
    fn parse_arg(token: &str) -> Result<Self, ConversionError> {
        Ok(PathBuf::from(token))
    }

    fn to_arg(&self) -> String {
        self.to_string_lossy().into_owned()
    }

    fn type_name() -> String {
        "path".to_string()
    }
}

/// Canonical form of a list, as shown for defaults in help pages.
pub(crate) fn list_to_arg<T: Value>(values: &[T]) -> String {
    let items: Vec<String> = values.iter().map(Value::to_arg).collect();
    format!("[{}]", items.join(", "))
}

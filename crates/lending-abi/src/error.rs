use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::ContractKind;

/// Errors raised while loading a schema or encoding/decoding against it.
#[derive(Debug)]
pub enum SchemaError {
    /// The embedded schema could not be parsed
    Malformed { kind: ContractKind, reason: String },
    /// The schema has no function with the requested name
    UnknownMethod { kind: ContractKind, method: String },
    /// Constructor arguments were supplied for a contract without a constructor
    NoConstructor { kind: ContractKind },
    /// The arguments don't match the declared parameter types
    Encode {
        kind: ContractKind,
        method: String,
        reason: String,
    },
    /// The return data couldn't be decoded into the declared output types
    Decode { method: String, reason: String },
    /// The return data decoded, but isn't the canonical encoding of the
    /// decoded values, so the declared outputs don't describe it
    NonCanonical {
        method: String,
        expected_len: usize,
        actual_len: usize,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Malformed { kind, reason } => {
                write!(f, "malformed schema for {}: {}", kind, reason)
            }
            SchemaError::UnknownMethod { kind, method } => {
                write!(f, "{} has no method `{}`", kind, method)
            }
            SchemaError::NoConstructor { kind } => {
                write!(f, "{} takes no constructor arguments", kind)
            }
            SchemaError::Encode {
                kind,
                method,
                reason,
            } => write!(f, "error encoding {}.{}: {}", kind, method, reason),
            SchemaError::Decode { method, reason } => {
                write!(f, "error decoding result of `{}`: {}", method, reason)
            }
            SchemaError::NonCanonical {
                method,
                expected_len,
                actual_len,
            } => write!(
                f,
                "result of `{}` doesn't match its declared outputs ({} bytes expected, {} returned)",
                method, expected_len, actual_len
            ),
        }
    }
}

impl Error for SchemaError {}

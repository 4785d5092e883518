#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # objmap-ir
//!
//! Value model and declared type model for the object mapper.
//!
//! Every mapping endpoint is represented as a [`Value`]: a closed tagged
//! variant over simple scalars, ordered sequences, associative containers and
//! composite objects. Composite objects are shared handles ([`ObjectRef`]) so
//! that cyclic and shared object graphs can be expressed and mapped while
//! preserving reference identity.

/// Fixed-point decimal numbers.
pub mod decimal;
/// Indented, cycle-safe text dump of value graphs.
pub mod pretty;
/// Scalar values and the Rust type bridge used by typed converters.
pub mod scalar;
/// Declared field types, simple type tags and their text form.
pub mod types;
/// Values, sequences and shared composite objects.
pub mod value;

pub use decimal::Decimal;
pub use pretty::to_pretty_string;
pub use scalar::{EnumValue, FromValue, Scalar, SimpleValue};
pub use types::{FieldType, HandleKind, SequenceKind, SimpleType, TypeKey, ValueClass};
pub use value::{Object, ObjectId, ObjectRef, Sequence, Value};

use thiserror::Error;

/// Errors that can occur when working with the value model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid type expression '{expr}': {reason}")]
    InvalidType { expr: String, reason: String },

    #[error("Invalid decimal '{input}': {reason}")]
    InvalidDecimal { input: String, reason: String },
}

impl Error {
    /// Build an invalid-type error with the offending expression.
    pub fn invalid_type(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidType {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    /// Build an invalid-decimal error with the offending input.
    pub fn invalid_decimal(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDecimal {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for value model operations.
pub type Result<T> = std::result::Result<T, Error>;

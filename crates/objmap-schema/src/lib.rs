#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # objmap-schema
//!
//! Type descriptors for the object mapper.
//!
//! The mapping engine never inspects Rust types. It asks a [`TypeRegistry`]
//! for the mappable fields of a named type, for a fresh instance of it, and
//! for per-field converters. Descriptors are registered in code or loaded from
//! YAML/JSON type definitions with [`SchemaLoader`], and field lists are
//! memoized for the process lifetime in a [`DescriptorCache`].

pub mod cache;
pub mod loader;
pub mod model;
pub mod registry;

pub use cache::DescriptorCache;
pub use loader::SchemaLoader;
pub use model::{FieldDescriptor, FieldHint, TypeDescriptor, infer_type};
pub use registry::{ConvertError, FieldConverter, TypeRegistry};

use thiserror::Error;

/// Errors that can occur when working with type descriptors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Type not found: {0}")]
    NotFound(String),

    #[error("Type '{0}' is marked unmappable")]
    UnmappableType(String),

    #[error("Type '{0}' is already registered")]
    DuplicateType(String),

    #[error("Invalid type definition: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Invalid definition of one field of a type.
    pub fn invalid_field(type_name: &str, field: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidFormat(format!("{type_name}.{field}: {reason}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # objmap-core
//!
//! Fuzzy-matching recursive object mapping.
//!
//! A [`Mapper`] copies a source [`Value`](objmap_ir::Value) into a destination
//! type field by field. Destination fields are found by name similarity, nested
//! objects, sequences and associative containers are mapped recursively, and
//! shared or cyclic references in the source come out as shared or cyclic
//! references in the result.
//!
//! ```
//! use objmap_core::Mapper;
//! use objmap_ir::{Object, SimpleType, Value};
//! use objmap_schema::{TypeDescriptor, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! registry
//!     .register(
//!         TypeDescriptor::new("CustomerVm")
//!             .with_field("Id", SimpleType::I64)
//!             .with_field("FullName", SimpleType::String),
//!     )
//!     .unwrap();
//!
//! let source = Object::new("Customer").with("Id", 7i32).with("FulName", "Ada").into_ref();
//! let mapped = Mapper::new(&registry).map(&source.into(), "CustomerVm").unwrap();
//!
//! let vm = mapped.as_object().unwrap();
//! assert_eq!(vm.get("Id"), Some(Value::from(7i64)));
//! assert_eq!(vm.get("FullName"), Some(Value::from("Ada")));
//! ```

pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod engine;
pub mod json;
pub mod policies;
pub mod similarity;

pub use config::{MapConfig, MapProfile};
pub use diagnostics::{FieldSkipped, MapOutcome, SkipReason};
pub use engine::{Mapper, match_field};
pub use policies::NullHandling;
pub use similarity::{SimilarityScore, best_match, similarity};

use objmap_ir::HandleKind;
use thiserror::Error;

/// Fatal mapping errors; each aborts the whole call
#[derive(Error, Debug)]
pub enum Error {
    #[error("Source value is null")]
    NullSource,

    #[error("Null value at '{path}'")]
    NullValue { path: String },

    #[error("Disallowed type '{type_name}' ({kind}) at '{path}'")]
    DisallowedType {
        type_name: String,
        kind: HandleKind,
        path: String,
    },

    #[error("Recursion limit of {limit} exceeded at '{path}'")]
    RecursionLimit { limit: usize, path: String },

    #[error("Type '{0}' is marked unmappable")]
    UnmappableType(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Schema error: {0}")]
    Schema(objmap_schema::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a disallowed-type error for a denied category.
    pub fn disallowed(type_name: impl Into<String>, kind: HandleKind, path: impl Into<String>) -> Self {
        Self::DisallowedType {
            type_name: type_name.into(),
            kind,
            path: path.into(),
        }
    }
}

impl From<objmap_schema::Error> for Error {
    fn from(error: objmap_schema::Error) -> Self {
        match error {
            objmap_schema::Error::NotFound(name) => Self::UnknownType(name),
            objmap_schema::Error::UnmappableType(name) => Self::UnmappableType(name),
            other => Self::Schema(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Declared types for fields and mapping targets
//!
//! A [`FieldType`] is what a type descriptor declares for one of its fields.
//! It has a compact text form used by the schema loader and the CLI:
//!
//! ```
//! use objmap_ir::{FieldType, SequenceKind, SimpleType};
//!
//! let ty: FieldType = "list<map<string, Order>>".parse().unwrap();
//! assert_eq!(
//!     ty,
//!     FieldType::sequence(
//!         SequenceKind::List,
//!         FieldType::map_of(FieldType::Simple(SimpleType::String), FieldType::composite("Order")),
//!     )
//! );
//! ```

use crate::scalar::Scalar;
use crate::value::Value;
use crate::{Decimal, Error, Result};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tag for the simple (directly converted) value categories
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimpleType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    String,
    /// Date and time without offset
    DateTime,
    /// Date and time with a fixed UTC offset
    DateTimeOffset,
    Duration,
    Uuid,
    /// Enumeration, identified by its type name
    Enum(String),
}

/// Container kind of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Array,
    #[default]
    List,
    Set,
    Queue,
    /// Items are kept in pop order: the first item is the top
    Stack,
}

/// Categories that may never be mapped through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    /// Function pointers, closures, delegates
    Callable,
    /// Files, sockets, streams and other OS handles
    IoHandle,
    /// Runtime code-emission builders
    ReflectionEmit,
}

/// The four value classes the engine dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueClass {
    Simple,
    Sequence,
    Associative,
    Composite,
}

/// Identity used to look up registered converters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Simple(SimpleType),
    Composite(String),
}

/// Declared type of a field or of a mapping target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Simple(SimpleType),
    /// Nullable wrapper around a simple type
    Nullable(SimpleType),
    Sequence {
        kind: SequenceKind,
        element: Box<FieldType>,
    },
    Associative {
        key: Box<FieldType>,
        value: Box<FieldType>,
    },
    /// Registered (or ad-hoc) object type, mapped recursively
    Composite(String),
    /// Accepts any value unchanged
    Dynamic,
    Handle(HandleKind),
}

impl SimpleType {
    /// Zero value for value-like types. Reference-like types (`String`) and
    /// enums, whose variants are not known to the model, have none.
    pub fn zero_value(&self) -> Option<Scalar> {
        let zero = match self {
            SimpleType::Bool => Scalar::Bool(false),
            SimpleType::Char => Scalar::Char('\0'),
            SimpleType::I8 => Scalar::I8(0),
            SimpleType::I16 => Scalar::I16(0),
            SimpleType::I32 => Scalar::I32(0),
            SimpleType::I64 => Scalar::I64(0),
            SimpleType::U8 => Scalar::U8(0),
            SimpleType::U16 => Scalar::U16(0),
            SimpleType::U32 => Scalar::U32(0),
            SimpleType::U64 => Scalar::U64(0),
            SimpleType::F32 => Scalar::F32(0.0),
            SimpleType::F64 => Scalar::F64(0.0),
            SimpleType::Decimal => Scalar::Decimal(Decimal::ZERO),
            SimpleType::DateTime => Scalar::DateTime(NaiveDateTime::default()),
            SimpleType::DateTimeOffset => {
                Scalar::DateTimeOffset(DateTime::<Utc>::default().fixed_offset())
            }
            SimpleType::Duration => Scalar::Duration(TimeDelta::zero()),
            SimpleType::Uuid => Scalar::Uuid(Uuid::nil()),
            SimpleType::String | SimpleType::Enum(_) => return None,
        };
        Some(zero)
    }

    /// Whether the type is one of the integer widths.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            SimpleType::I8
                | SimpleType::I16
                | SimpleType::I32
                | SimpleType::I64
                | SimpleType::U8
                | SimpleType::U16
                | SimpleType::U32
                | SimpleType::U64
        )
    }

    fn from_name(name: &str) -> Option<Self> {
        if let Some(enum_name) = name.strip_prefix("enum:") {
            return Some(SimpleType::Enum(enum_name.to_string()));
        }
        let ty = match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => SimpleType::Bool,
            "char" => SimpleType::Char,
            "i8" | "sbyte" => SimpleType::I8,
            "i16" | "short" => SimpleType::I16,
            "i32" | "int" => SimpleType::I32,
            "i64" | "long" => SimpleType::I64,
            "u8" | "byte" => SimpleType::U8,
            "u16" | "ushort" => SimpleType::U16,
            "u32" | "uint" => SimpleType::U32,
            "u64" | "ulong" => SimpleType::U64,
            "f32" | "float" => SimpleType::F32,
            "f64" | "double" => SimpleType::F64,
            "decimal" => SimpleType::Decimal,
            "string" | "str" => SimpleType::String,
            "datetime" => SimpleType::DateTime,
            "datetimeoffset" => SimpleType::DateTimeOffset,
            "duration" | "timespan" => SimpleType::Duration,
            "uuid" | "guid" => SimpleType::Uuid,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimpleType::Bool => "bool",
            SimpleType::Char => "char",
            SimpleType::I8 => "i8",
            SimpleType::I16 => "i16",
            SimpleType::I32 => "i32",
            SimpleType::I64 => "i64",
            SimpleType::U8 => "u8",
            SimpleType::U16 => "u16",
            SimpleType::U32 => "u32",
            SimpleType::U64 => "u64",
            SimpleType::F32 => "f32",
            SimpleType::F64 => "f64",
            SimpleType::Decimal => "decimal",
            SimpleType::String => "string",
            SimpleType::DateTime => "datetime",
            SimpleType::DateTimeOffset => "datetimeoffset",
            SimpleType::Duration => "duration",
            SimpleType::Uuid => "uuid",
            SimpleType::Enum(name) => return write!(f, "enum:{name}"),
        };
        f.write_str(name)
    }
}

impl SequenceKind {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "array" => Some(SequenceKind::Array),
            "list" | "vec" => Some(SequenceKind::List),
            "set" => Some(SequenceKind::Set),
            "queue" => Some(SequenceKind::Queue),
            "stack" => Some(SequenceKind::Stack),
            _ => None,
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SequenceKind::Array => "array",
            SequenceKind::List => "list",
            SequenceKind::Set => "set",
            SequenceKind::Queue => "queue",
            SequenceKind::Stack => "stack",
        })
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandleKind::Callable => "fn",
            HandleKind::IoHandle => "io",
            HandleKind::ReflectionEmit => "emit",
        })
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Simple(ty) => fmt::Display::fmt(ty, f),
            TypeKey::Composite(name) => f.write_str(name),
        }
    }
}

impl FieldType {
    /// Composite type reference by name.
    pub fn composite(name: impl Into<String>) -> Self {
        FieldType::Composite(name.into())
    }

    /// Sequence of the given container kind.
    pub fn sequence(kind: SequenceKind, element: FieldType) -> Self {
        FieldType::Sequence {
            kind,
            element: Box::new(element),
        }
    }

    /// Shorthand for a `list<element>`.
    pub fn list_of(element: FieldType) -> Self {
        Self::sequence(SequenceKind::List, element)
    }

    /// Associative container with the given key and value types.
    pub fn map_of(key: FieldType, value: FieldType) -> Self {
        FieldType::Associative {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Wrap a simple type as nullable; other types are already nullable.
    #[must_use]
    pub fn nullable(self) -> Self {
        match self {
            FieldType::Simple(ty) => FieldType::Nullable(ty),
            other => other,
        }
    }

    /// Value class the engine uses to pick a copy strategy.
    pub fn classify(&self) -> ValueClass {
        match self {
            FieldType::Simple(_) | FieldType::Nullable(_) => ValueClass::Simple,
            FieldType::Sequence { .. } => ValueClass::Sequence,
            FieldType::Associative { .. } => ValueClass::Associative,
            FieldType::Composite(_) | FieldType::Dynamic | FieldType::Handle(_) => {
                ValueClass::Composite
            }
        }
    }

    /// The simple type behind `Simple` and `Nullable`.
    pub fn simple_type(&self) -> Option<&SimpleType> {
        match self {
            FieldType::Simple(ty) | FieldType::Nullable(ty) => Some(ty),
            _ => None,
        }
    }

    /// Value-like types have a zero value and are never left null.
    pub fn is_value_like(&self) -> bool {
        matches!(self, FieldType::Simple(ty) if ty.zero_value().is_some())
    }

    /// Zero value of a value-like type.
    pub fn zero_value(&self) -> Option<Value> {
        match self {
            FieldType::Simple(ty) => ty.zero_value().map(Value::Simple),
            _ => None,
        }
    }

    /// First denied handle category anywhere inside this type.
    pub fn handle_kind(&self) -> Option<HandleKind> {
        match self {
            FieldType::Handle(kind) => Some(*kind),
            FieldType::Sequence { element, .. } => element.handle_kind(),
            FieldType::Associative { key, value } => key.handle_kind().or_else(|| value.handle_kind()),
            _ => None,
        }
    }

    /// Names of all composite types referenced by this type.
    pub fn referenced_types(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_referenced(&mut names);
        names
    }

    fn collect_referenced<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            FieldType::Composite(name) => names.push(name),
            FieldType::Sequence { element, .. } => element.collect_referenced(names),
            FieldType::Associative { key, value } => {
                key.collect_referenced(names);
                value.collect_referenced(names);
            }
            _ => {}
        }
    }

    fn named(name: &str) -> Self {
        if let Some(ty) = SimpleType::from_name(name) {
            return FieldType::Simple(ty);
        }
        match name.to_ascii_lowercase().as_str() {
            "any" | "object" | "dynamic" => FieldType::Dynamic,
            "fn" | "callable" | "delegate" => FieldType::Handle(HandleKind::Callable),
            "io" | "stream" | "handle" => FieldType::Handle(HandleKind::IoHandle),
            "emit" => FieldType::Handle(HandleKind::ReflectionEmit),
            _ => FieldType::Composite(name.to_string()),
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        FieldType::composite(name)
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        FieldType::Composite(name)
    }
}

impl From<SimpleType> for FieldType {
    fn from(ty: SimpleType) -> Self {
        FieldType::Simple(ty)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Simple(ty) => fmt::Display::fmt(ty, f),
            FieldType::Nullable(ty) => write!(f, "{ty}?"),
            FieldType::Sequence { kind, element } => write!(f, "{kind}<{element}>"),
            FieldType::Associative { key, value } => write!(f, "map<{key}, {value}>"),
            FieldType::Composite(name) => f.write_str(name),
            FieldType::Dynamic => f.write_str("any"),
            FieldType::Handle(kind) => fmt::Display::fmt(kind, f),
        }
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(expr: &str) -> Result<Self> {
        let mut parser = TypeParser { input: expr, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != expr.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

/// Recursive-descent parser for the type text form
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> Error {
        Error::invalid_type(self.input, format!("{reason} at offset {}", self.pos))
    }

    fn ident(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || matches!(c, '_' | ':' | '.')) {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return Err(self.error("expected a type name"));
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_type(&mut self) -> Result<FieldType> {
        let name = self.ident()?;
        let ty = if self.eat('<') {
            let mut args = vec![self.parse_type()?];
            while self.eat(',') {
                args.push(self.parse_type()?);
            }
            if !self.eat('>') {
                return Err(self.error("expected '>'"));
            }
            self.generic(name, args)?
        } else {
            FieldType::named(name)
        };

        if self.eat('?') {
            Ok(ty.nullable())
        } else {
            Ok(ty)
        }
    }

    fn generic(&self, name: &str, mut args: Vec<FieldType>) -> Result<FieldType> {
        if let Some(kind) = SequenceKind::from_name(name) {
            if args.len() != 1 {
                return Err(self.error("sequence types take exactly one type argument"));
            }
            return Ok(FieldType::sequence(kind, args.remove(0)));
        }

        match name.to_ascii_lowercase().as_str() {
            "map" | "dict" | "dictionary" => {
                if args.len() != 2 {
                    return Err(self.error("map types take a key and a value type"));
                }
                let value = args.remove(1);
                let key = args.remove(0);
                Ok(FieldType::map_of(key, value))
            }
            _ => Err(self.error(&format!("unknown generic type '{name}'"))),
        }
    }
}

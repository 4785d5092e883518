//! Scalar values and the Rust type bridge

use crate::types::SimpleType;
use crate::value::{ObjectRef, Value};
use crate::Decimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta};
use std::fmt;
use uuid::Uuid;

/// A simple value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(String),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Uuid(Uuid),
    Enum(EnumValue),
}

/// Value of an enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub type_name: String,
    pub variant: String,
    pub discriminant: i64,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, variant: impl Into<String>, discriminant: i64) -> Self {
        Self {
            type_name: type_name.into(),
            variant: variant.into(),
            discriminant,
        }
    }
}

impl Scalar {
    /// Type tag of this value.
    pub fn simple_type(&self) -> SimpleType {
        match self {
            Scalar::Bool(_) => SimpleType::Bool,
            Scalar::Char(_) => SimpleType::Char,
            Scalar::I8(_) => SimpleType::I8,
            Scalar::I16(_) => SimpleType::I16,
            Scalar::I32(_) => SimpleType::I32,
            Scalar::I64(_) => SimpleType::I64,
            Scalar::U8(_) => SimpleType::U8,
            Scalar::U16(_) => SimpleType::U16,
            Scalar::U32(_) => SimpleType::U32,
            Scalar::U64(_) => SimpleType::U64,
            Scalar::F32(_) => SimpleType::F32,
            Scalar::F64(_) => SimpleType::F64,
            Scalar::Decimal(_) => SimpleType::Decimal,
            Scalar::String(_) => SimpleType::String,
            Scalar::DateTime(_) => SimpleType::DateTime,
            Scalar::DateTimeOffset(_) => SimpleType::DateTimeOffset,
            Scalar::Duration(_) => SimpleType::Duration,
            Scalar::Uuid(_) => SimpleType::Uuid,
            Scalar::Enum(e) => SimpleType::Enum(e.type_name.clone()),
        }
    }

    /// Integer payload widened to `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Scalar::I8(v) => Some(i128::from(*v)),
            Scalar::I16(v) => Some(i128::from(*v)),
            Scalar::I32(v) => Some(i128::from(*v)),
            Scalar::I64(v) => Some(i128::from(*v)),
            Scalar::U8(v) => Some(i128::from(*v)),
            Scalar::U16(v) => Some(i128::from(*v)),
            Scalar::U32(v) => Some(i128::from(*v)),
            Scalar::U64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// String payload, without conversion.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parse text as a value of the given simple type.
    ///
    /// Accepts the forms produced by `Display`, so display and parse round
    /// trip. Enumerations cannot be parsed because their variants are not
    /// part of the type model.
    pub fn parse(ty: &SimpleType, text: &str) -> Option<Scalar> {
        let trimmed = text.trim();
        let scalar = match ty {
            SimpleType::String => Scalar::String(text.to_string()),
            SimpleType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Scalar::Bool(true),
                "false" => Scalar::Bool(false),
                _ => return None,
            },
            SimpleType::Char => {
                let mut chars = text.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Scalar::Char(c)
            }
            SimpleType::I8 => Scalar::I8(trimmed.parse().ok()?),
            SimpleType::I16 => Scalar::I16(trimmed.parse().ok()?),
            SimpleType::I32 => Scalar::I32(trimmed.parse().ok()?),
            SimpleType::I64 => Scalar::I64(trimmed.parse().ok()?),
            SimpleType::U8 => Scalar::U8(trimmed.parse().ok()?),
            SimpleType::U16 => Scalar::U16(trimmed.parse().ok()?),
            SimpleType::U32 => Scalar::U32(trimmed.parse().ok()?),
            SimpleType::U64 => Scalar::U64(trimmed.parse().ok()?),
            SimpleType::F32 => Scalar::F32(trimmed.parse().ok()?),
            SimpleType::F64 => Scalar::F64(trimmed.parse().ok()?),
            SimpleType::Decimal => Scalar::Decimal(trimmed.parse().ok()?),
            SimpleType::DateTime => Scalar::DateTime(parse_datetime(trimmed)?),
            SimpleType::DateTimeOffset => {
                Scalar::DateTimeOffset(DateTime::parse_from_rfc3339(trimmed).ok()?)
            }
            SimpleType::Duration => Scalar::Duration(parse_duration(trimmed)?),
            SimpleType::Uuid => Scalar::Uuid(Uuid::parse_str(trimmed).ok()?),
            SimpleType::Enum(_) => return None,
        };
        Some(scalar)
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc())
}

/// Seconds, with an optional `s` suffix and fraction.
fn parse_duration(text: &str) -> Option<TimeDelta> {
    let seconds: Decimal = text.strip_suffix('s').unwrap_or(text).parse().ok()?;
    let nanos = if seconds.scale() <= 9 {
        seconds.units().checked_mul(10i128.pow(9 - seconds.scale()))?
    } else {
        seconds.units() / 10i128.pow(seconds.scale() - 9)
    };
    Some(TimeDelta::nanoseconds(i64::try_from(nanos).ok()?))
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => fmt::Display::fmt(v, f),
            Scalar::Char(v) => fmt::Display::fmt(v, f),
            Scalar::I8(v) => fmt::Display::fmt(v, f),
            Scalar::I16(v) => fmt::Display::fmt(v, f),
            Scalar::I32(v) => fmt::Display::fmt(v, f),
            Scalar::I64(v) => fmt::Display::fmt(v, f),
            Scalar::U8(v) => fmt::Display::fmt(v, f),
            Scalar::U16(v) => fmt::Display::fmt(v, f),
            Scalar::U32(v) => fmt::Display::fmt(v, f),
            Scalar::U64(v) => fmt::Display::fmt(v, f),
            Scalar::F32(v) => fmt::Display::fmt(v, f),
            Scalar::F64(v) => fmt::Display::fmt(v, f),
            Scalar::Decimal(v) => fmt::Display::fmt(v, f),
            Scalar::String(v) => f.write_str(v),
            Scalar::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Scalar::DateTimeOffset(v) => {
                f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
            Scalar::Duration(v) => fmt_duration(*v, f),
            Scalar::Uuid(v) => fmt::Display::fmt(v, f),
            Scalar::Enum(v) => f.write_str(&v.variant),
        }
    }
}

/// Seconds with an `s` suffix, e.g. `90s` or `-0.25s`.
fn fmt_duration(duration: TimeDelta, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let secs = duration.num_seconds();
    let nanos = duration.subsec_nanos().unsigned_abs();
    let sign = if duration < TimeDelta::zero() && secs == 0 {
        "-"
    } else {
        ""
    };
    if nanos == 0 {
        write!(f, "{sign}{secs}s")
    } else {
        let fraction = format!("{nanos:09}");
        write!(f, "{sign}{secs}.{}s", fraction.trim_end_matches('0'))
    }
}

/// Rust types that correspond to exactly one [`SimpleType`]
pub trait SimpleValue: Sized {
    /// Tag of the corresponding simple type.
    fn simple_type() -> SimpleType;

    /// Borrow the payload back out of a scalar of the same type.
    fn from_scalar(scalar: &Scalar) -> Option<Self>;

    /// Wrap into a scalar.
    fn into_scalar(self) -> Scalar;
}

macro_rules! simple_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl SimpleValue for $ty {
                fn simple_type() -> SimpleType {
                    SimpleType::$variant
                }

                fn from_scalar(scalar: &Scalar) -> Option<Self> {
                    match scalar {
                        Scalar::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }

                fn into_scalar(self) -> Scalar {
                    Scalar::$variant(self)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Simple(Scalar::$variant(value))
                }
            }
        )*
    };
}

simple_value! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => String,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    TimeDelta => Duration,
    Uuid => Uuid,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Simple(Scalar::String(value.to_string()))
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Simple(Scalar::Enum(value))
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Simple(value)
    }
}

/// Types that can be read back out of a [`Value`]
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl<T: SimpleValue> FromValue for T {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Simple(scalar) => T::from_scalar(scalar),
            _ => None,
        }
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

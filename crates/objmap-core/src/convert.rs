//! Direct conversions between simple values
//!
//! A conversion either preserves the value or does not happen: lossy or
//! unsupported pairs return `None` and the mapper skips the field.

use chrono::{TimeZone, Utc};
use objmap_ir::{Decimal, Scalar, SimpleType};

/// Convert a scalar to the given simple type, if a safe conversion exists
pub fn convert_scalar(value: &Scalar, target: &SimpleType) -> Option<Scalar> {
    if &value.simple_type() == target {
        return Some(value.clone());
    }
    if *target == SimpleType::String {
        return Some(Scalar::String(value.to_string()));
    }

    match value {
        Scalar::String(text) => Scalar::parse(target, text),
        Scalar::Bool(b) if target.is_integer() => from_integer(i128::from(*b), target),
        Scalar::F32(f) => from_float(f64::from(*f), &f.to_string(), target),
        Scalar::F64(f) => from_float(*f, &f.to_string(), target),
        Scalar::Decimal(d) => from_decimal(*d, target),
        Scalar::DateTime(naive) => match target {
            SimpleType::DateTimeOffset => {
                Some(Scalar::DateTimeOffset(Utc.from_utc_datetime(naive).fixed_offset()))
            }
            _ => None,
        },
        Scalar::DateTimeOffset(dt) => match target {
            SimpleType::DateTime => Some(Scalar::DateTime(dt.naive_utc())),
            _ => None,
        },
        Scalar::Enum(e) if target.is_integer() => from_integer(i128::from(e.discriminant), target),
        other => other.as_i128().and_then(|i| from_integer(i, target)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn from_integer(value: i128, target: &SimpleType) -> Option<Scalar> {
    let scalar = match target {
        SimpleType::I8 => Scalar::I8(i8::try_from(value).ok()?),
        SimpleType::I16 => Scalar::I16(i16::try_from(value).ok()?),
        SimpleType::I32 => Scalar::I32(i32::try_from(value).ok()?),
        SimpleType::I64 => Scalar::I64(i64::try_from(value).ok()?),
        SimpleType::U8 => Scalar::U8(u8::try_from(value).ok()?),
        SimpleType::U16 => Scalar::U16(u16::try_from(value).ok()?),
        SimpleType::U32 => Scalar::U32(u32::try_from(value).ok()?),
        SimpleType::U64 => Scalar::U64(u64::try_from(value).ok()?),
        SimpleType::F32 => {
            let float = value as f32;
            exact_integer(f64::from(float), value).then_some(Scalar::F32(float))?
        }
        SimpleType::F64 => {
            let float = value as f64;
            exact_integer(float, value).then_some(Scalar::F64(float))?
        }
        SimpleType::Decimal => Scalar::Decimal(Decimal::new(value, 0).ok()?),
        SimpleType::Bool => match value {
            0 => Scalar::Bool(false),
            1 => Scalar::Bool(true),
            _ => return None,
        },
        _ => return None,
    };
    Some(scalar)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn from_float(value: f64, text: &str, target: &SimpleType) -> Option<Scalar> {
    match target {
        SimpleType::F64 => Some(Scalar::F64(value)),
        SimpleType::F32 => {
            let narrowed = value as f32;
            (f64::from(narrowed) == value || !value.is_finite()).then_some(Scalar::F32(narrowed))
        }
        SimpleType::Decimal => text.parse().ok().map(Scalar::Decimal),
        _ if target.is_integer() => {
            if !value.is_finite() || value.fract() != 0.0 {
                return None;
            }
            if value < i128::MIN as f64 || value > i128::MAX as f64 {
                return None;
            }
            from_integer(value as i128, target)
        }
        _ => None,
    }
}

/// Whether `float` is exactly `value`; 2^127 and above saturate on the way back
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn exact_integer(float: f64, value: i128) -> bool {
    float.is_finite() && float < i128::MAX as f64 && float as i128 == value
}

fn from_decimal(value: Decimal, target: &SimpleType) -> Option<Scalar> {
    match target {
        #[allow(clippy::cast_possible_truncation)]
        SimpleType::F32 => {
            let float = value.to_f64() as f32;
            (float.to_string().parse::<Decimal>().ok() == Some(value)).then_some(Scalar::F32(float))
        }
        SimpleType::F64 => {
            let float = value.to_f64();
            (Decimal::from_f64(float) == Some(value)).then_some(Scalar::F64(float))
        }
        _ if target.is_integer() => value.to_i128().and_then(|i| from_integer(i, target)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use objmap_ir::EnumValue;
    use uuid::Uuid;

    fn dec(text: &str) -> Scalar {
        Scalar::Decimal(text.parse().unwrap())
    }

    #[test]
    fn test_same_type_copies() {
        let id = Scalar::Uuid(Uuid::from_u128(7));
        assert_eq!(convert_scalar(&id, &SimpleType::Uuid), Some(id.clone()));
    }

    #[test]
    fn test_integer_widening_and_narrowing() {
        assert_eq!(convert_scalar(&Scalar::I32(5), &SimpleType::I64), Some(Scalar::I64(5)));
        assert_eq!(convert_scalar(&Scalar::I64(300), &SimpleType::U8), None);
        assert_eq!(convert_scalar(&Scalar::I8(-1), &SimpleType::U32), None);
        assert_eq!(convert_scalar(&Scalar::U16(255), &SimpleType::U8), Some(Scalar::U8(255)));
        assert_eq!(convert_scalar(&Scalar::I32(3), &SimpleType::Decimal), Some(dec("3")));
        assert_eq!(convert_scalar(&Scalar::I32(3), &SimpleType::F64), Some(Scalar::F64(3.0)));
    }

    #[test]
    fn test_integer_to_float_must_be_exact() {
        assert_eq!(
            convert_scalar(&Scalar::I64(9_007_199_254_740_992), &SimpleType::F64),
            Some(Scalar::F64(9_007_199_254_740_992.0))
        );
        assert_eq!(convert_scalar(&Scalar::I64(9_007_199_254_740_993), &SimpleType::F64), None);
        assert_eq!(convert_scalar(&Scalar::I32(16_777_216), &SimpleType::F32), Some(Scalar::F32(16_777_216.0)));
        assert_eq!(convert_scalar(&Scalar::I32(16_777_217), &SimpleType::F32), None);
        assert_eq!(convert_scalar(&Scalar::U64(u64::MAX), &SimpleType::F64), None);
        assert_eq!(convert_scalar(&Scalar::I64(i64::MIN), &SimpleType::F64), Some(Scalar::F64(-9_223_372_036_854_775_808.0)));
    }

    #[test]
    fn test_decimal_to_float_must_be_exact() {
        assert_eq!(convert_scalar(&dec("19.99"), &SimpleType::F64), Some(Scalar::F64(19.99)));
        assert_eq!(convert_scalar(&dec("0.1"), &SimpleType::F32), Some(Scalar::F32(0.1)));
        assert_eq!(convert_scalar(&dec("9007199254740993"), &SimpleType::F64), None);
        assert_eq!(convert_scalar(&dec("0.12345678901234567890123"), &SimpleType::F64), None);
        assert_eq!(convert_scalar(&dec("16777217"), &SimpleType::F32), None);
    }

    #[test]
    fn test_float_to_integer_only_when_integral() {
        assert_eq!(convert_scalar(&Scalar::F64(4.0), &SimpleType::I16), Some(Scalar::I16(4)));
        assert_eq!(convert_scalar(&Scalar::F64(4.5), &SimpleType::I16), None);
        assert_eq!(convert_scalar(&Scalar::F64(f64::NAN), &SimpleType::I64), None);
        assert_eq!(convert_scalar(&Scalar::F64(1e40), &SimpleType::I64), None);
    }

    #[test]
    fn test_float_narrowing_preserves_value() {
        assert_eq!(convert_scalar(&Scalar::F64(0.5), &SimpleType::F32), Some(Scalar::F32(0.5)));
        assert_eq!(convert_scalar(&Scalar::F64(0.1), &SimpleType::F32), None);
        assert_eq!(convert_scalar(&Scalar::F32(0.1), &SimpleType::Decimal), Some(dec("0.1")));
    }

    #[test]
    fn test_decimal_conversions() {
        assert_eq!(convert_scalar(&dec("12.00"), &SimpleType::I32), Some(Scalar::I32(12)));
        assert_eq!(convert_scalar(&dec("12.5"), &SimpleType::I32), None);
        assert_eq!(convert_scalar(&dec("12.5"), &SimpleType::F64), Some(Scalar::F64(12.5)));
        assert_eq!(convert_scalar(&Scalar::F64(99.95), &SimpleType::Decimal), Some(dec("99.95")));
    }

    #[test]
    fn test_to_and_from_string() {
        assert_eq!(
            convert_scalar(&dec("123.45"), &SimpleType::String),
            Some(Scalar::String("123.45".into()))
        );
        assert_eq!(
            convert_scalar(&Scalar::Duration(TimeDelta::seconds(90)), &SimpleType::String),
            Some(Scalar::String("90s".into()))
        );
        assert_eq!(
            convert_scalar(&Scalar::String("42".into()), &SimpleType::U64),
            Some(Scalar::U64(42))
        );
        assert_eq!(convert_scalar(&Scalar::String("4x".into()), &SimpleType::I32), None);
        assert_eq!(
            convert_scalar(&Scalar::String("Z".into()), &SimpleType::Char),
            Some(Scalar::Char('Z'))
        );
        assert_eq!(
            convert_scalar(&Scalar::Char('Z'), &SimpleType::String),
            Some(Scalar::String("Z".into()))
        );
    }

    #[test]
    fn test_bool_and_integer() {
        assert_eq!(convert_scalar(&Scalar::Bool(true), &SimpleType::U8), Some(Scalar::U8(1)));
        assert_eq!(convert_scalar(&Scalar::I32(0), &SimpleType::Bool), Some(Scalar::Bool(false)));
        assert_eq!(convert_scalar(&Scalar::I32(2), &SimpleType::Bool), None);
    }

    #[test]
    fn test_datetime_offset_via_utc() {
        let naive = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let converted = convert_scalar(&Scalar::DateTime(naive), &SimpleType::DateTimeOffset).unwrap();
        assert_eq!(converted.to_string(), "2023-01-01T12:00:00+00:00");
        assert_eq!(
            convert_scalar(&converted, &SimpleType::DateTime),
            Some(Scalar::DateTime(naive))
        );
    }

    #[test]
    fn test_enum_conversions() {
        let day = Scalar::Enum(EnumValue::new("DayOfWeek", "Wednesday", 3));
        assert_eq!(
            convert_scalar(&day, &SimpleType::Enum("DayOfWeek".into())),
            Some(day.clone())
        );
        assert_eq!(convert_scalar(&day, &SimpleType::Enum("Color".into())), None);
        assert_eq!(convert_scalar(&day, &SimpleType::I32), Some(Scalar::I32(3)));
        assert_eq!(
            convert_scalar(&day, &SimpleType::String),
            Some(Scalar::String("Wednesday".into()))
        );
    }

    #[test]
    fn test_unsupported_pairs() {
        assert_eq!(convert_scalar(&Scalar::Uuid(Uuid::nil()), &SimpleType::I64), None);
        assert_eq!(
            convert_scalar(&Scalar::Duration(TimeDelta::zero()), &SimpleType::DateTime),
            None
        );
        assert_eq!(convert_scalar(&Scalar::I32(1), &SimpleType::Uuid), None);
    }
}

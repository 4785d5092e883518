//! JSON boundary
//!
//! Reads JSON documents into values shaped by a declared type and writes
//! value graphs back out as JSON. Object keys come out sorted.

use crate::convert::convert_scalar;
use crate::{Error, Result};
use objmap_ir::{FieldType, ObjectId, Scalar, SimpleType, Value};
use objmap_schema::TypeRegistry;
use serde_json::{Map, Number, Value as Json};
use std::collections::HashSet;
use tracing::debug;

/// Read a JSON document as a value of the declared type
///
/// Objects of registered types start from a fresh instance, so fields absent
/// from the document keep their defaults and unknown keys are ignored.
/// Objects of unregistered types keep every key with an inferred value.
///
/// # Errors
///
/// Returns [`Error::Json`] when a JSON value does not fit the declared type
/// and [`Error::UnmappableType`] or [`Error::DisallowedType`] for types that
/// cannot be constructed.
pub fn from_json(json: &Json, ty: &FieldType, registry: &TypeRegistry) -> Result<Value> {
    read(json, ty, registry, "")
}

fn read(json: &Json, ty: &FieldType, registry: &TypeRegistry, path: &str) -> Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    match ty {
        FieldType::Simple(simple) | FieldType::Nullable(simple) => {
            read_scalar(json, simple, path).map(Value::Simple)
        }
        FieldType::Sequence { kind, element } => {
            let items = expect_array(json, ty, path)?
                .iter()
                .enumerate()
                .map(|(index, item)| read(item, element, registry, &format!("{path}[{index}]")))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::sequence(*kind, items))
        }
        FieldType::Associative { key, value } => {
            let object = expect_object(json, ty, path)?;
            let mut entries = Vec::with_capacity(object.len());
            for (name, item) in object {
                let entry_path = format!("{path}[{name}]");
                let key = read(&Json::String(name.clone()), key, registry, &entry_path)?;
                entries.push((key, read(item, value, registry, &entry_path)?));
            }
            Ok(Value::Associative(entries))
        }
        FieldType::Composite(type_name) => read_object(json, type_name, registry, path),
        FieldType::Dynamic => Ok(read_untyped(json)),
        FieldType::Handle(kind) => Err(Error::disallowed(ty.to_string(), *kind, path)),
    }
}

fn read_object(json: &Json, type_name: &str, registry: &TypeRegistry, path: &str) -> Result<Value> {
    let object = expect_object(json, &FieldType::composite(type_name), path)?;

    if !registry.contains(type_name) {
        let mut inferred = objmap_ir::Object::new(type_name);
        for (name, item) in object {
            inferred.set(name.clone(), read_untyped(item));
        }
        return Ok(Value::Composite(inferred.into_ref()));
    }

    let descriptor = registry.descriptor(type_name)?;
    if let Some(kind) = descriptor.handle {
        return Err(Error::disallowed(type_name, kind, path));
    }
    let instance = registry.instantiate(type_name)?;
    for (name, item) in object {
        let Some(field) = descriptor.get(name) else {
            debug!("Ignoring unknown key {} of {}", name, type_name);
            continue;
        };
        let field_path = if path.is_empty() { name.clone() } else { format!("{path}.{name}") };
        instance.set(name.clone(), read(item, &field.field_type, registry, &field_path)?);
    }
    Ok(Value::Composite(instance))
}

fn read_scalar(json: &Json, ty: &SimpleType, path: &str) -> Result<Scalar> {
    let scalar = match (json, ty) {
        (_, SimpleType::Enum(name)) => {
            return Err(Error::Json(format!(
                "{}: enum {name} cannot be read from JSON",
                display_path(path)
            )));
        }
        (Json::String(text), _) => Scalar::parse(ty, text),
        (Json::Bool(b), _) => convert_scalar(&Scalar::Bool(*b), ty),
        (Json::Number(n), SimpleType::Decimal | SimpleType::String) => {
            Scalar::parse(ty, &n.to_string())
        }
        (Json::Number(n), _) => number_scalar(n).and_then(|s| convert_scalar(&s, ty)),
        _ => None,
    };
    scalar.ok_or_else(|| {
        Error::Json(format!("{}: cannot read {json} as {ty}", display_path(path)))
    })
}

fn number_scalar(n: &Number) -> Option<Scalar> {
    if let Some(i) = n.as_i64() {
        Some(Scalar::I64(i))
    } else if let Some(u) = n.as_u64() {
        Some(Scalar::U64(u))
    } else {
        n.as_f64().map(Scalar::F64)
    }
}

/// JSON read without a declared type
fn read_untyped(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::from(*b),
        Json::Number(n) => number_scalar(n).map_or(Value::Null, Value::Simple),
        Json::String(s) => Value::string(s.clone()),
        Json::Array(items) => Value::list(items.iter().map(read_untyped).collect()),
        Json::Object(object) => Value::map(
            object
                .iter()
                .map(|(k, v)| (Value::string(k.clone()), read_untyped(v)))
                .collect(),
        ),
    }
}

fn expect_array<'j>(json: &'j Json, ty: &FieldType, path: &str) -> Result<&'j Vec<Json>> {
    json.as_array()
        .ok_or_else(|| Error::Json(format!("{}: expected an array for {ty}", display_path(path))))
}

fn expect_object<'j>(json: &'j Json, ty: &FieldType, path: &str) -> Result<&'j Map<String, Json>> {
    json.as_object()
        .ok_or_else(|| Error::Json(format!("{}: expected an object for {ty}", display_path(path))))
}

/// Write a value graph as JSON
///
/// Shared objects are written once per reference. Decimals, dates, durations,
/// UUIDs and enums are written as their text form. Associative containers
/// become JSON objects keyed by the text of each key.
///
/// # Errors
///
/// Returns [`Error::Json`] for cyclic graphs, which JSON cannot express.
pub fn to_json(value: &Value) -> Result<Json> {
    write(value, &mut HashSet::new())
}

fn write(value: &Value, path: &mut HashSet<ObjectId>) -> Result<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Simple(scalar) => write_scalar(scalar),
        Value::Sequence(sequence) => Json::Array(
            sequence
                .items
                .iter()
                .map(|item| write(item, path))
                .collect::<Result<_>>()?,
        ),
        Value::Associative(entries) => {
            let mut object = Map::new();
            for (key, item) in entries {
                let key = match key {
                    Value::Simple(scalar) => scalar.to_string(),
                    _ => return Err(Error::Json("only simple keys can be written as JSON".to_string())),
                };
                object.insert(key, write(item, path)?);
            }
            Json::Object(object)
        }
        Value::Composite(object) => {
            let id = object.id();
            if !path.insert(id) {
                return Err(Error::Json(format!(
                    "cyclic reference through {} cannot be written as JSON",
                    object.type_name()
                )));
            }
            let mut out = Map::new();
            for (name, field) in object.snapshot() {
                out.insert(name, write(&field, path)?);
            }
            path.remove(&id);
            Json::Object(out)
        }
    })
}

fn write_scalar(scalar: &Scalar) -> Json {
    match scalar {
        Scalar::Bool(b) => Json::Bool(*b),
        Scalar::I8(v) => Json::from(*v),
        Scalar::I16(v) => Json::from(*v),
        Scalar::I32(v) => Json::from(*v),
        Scalar::I64(v) => Json::from(*v),
        Scalar::U8(v) => Json::from(*v),
        Scalar::U16(v) => Json::from(*v),
        Scalar::U32(v) => Json::from(*v),
        Scalar::U64(v) => Json::from(*v),
        Scalar::F32(v) => Number::from_f64(f64::from(*v)).map_or(Json::Null, Json::Number),
        Scalar::F64(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
        other => Json::String(other.to_string()),
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmap_ir::{Decimal, Object, SequenceKind};
    use objmap_schema::{FieldDescriptor, TypeDescriptor};
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let registry = TypeRegistry::new();
        registry
            .register(
                TypeDescriptor::new("Order")
                    .with_field("Id", SimpleType::I32)
                    .with_field("Total", SimpleType::Decimal)
                    .with_field("Tags", FieldType::sequence(SequenceKind::Set, SimpleType::String.into()))
                    .field(FieldDescriptor::new("Lines", SimpleType::U16).with_default(Scalar::U16(1))),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_read_registered_object() {
        let registry = registry();
        let json = json!({"Id": 7, "Total": 19.99, "Tags": ["a", "b"], "Extra": true});
        let value = from_json(&json, &"Order".into(), &registry).unwrap();
        let order = value.as_object().unwrap();

        assert_eq!(order.get("Id"), Some(Value::from(7i32)));
        assert_eq!(order.get("Total"), Some(Value::from("19.99".parse::<Decimal>().unwrap())));
        assert_eq!(order.get("Lines"), Some(Value::from(1u16)));
        assert_eq!(order.get("Extra"), None);
        assert_eq!(
            order.get("Tags").unwrap().as_sequence().unwrap().kind,
            SequenceKind::Set
        );
    }

    #[test]
    fn test_read_rejects_mismatch_with_path() {
        let registry = registry();
        let err = from_json(&json!({"Id": "seven"}), &"Order".into(), &registry).unwrap_err();
        match err {
            Error::Json(message) => assert!(message.contains("Id")),
            other => panic!("Expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_unregistered_object_keeps_keys() {
        let registry = TypeRegistry::new();
        let value = from_json(&json!({"a": 1, "b": [true]}), &"Loose".into(), &registry).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.get("a"), Some(Value::from(1i64)));
        assert_eq!(object.get("b"), Some(Value::list(vec![Value::from(true)])));
    }

    #[test]
    fn test_write_object() {
        let order = Object::new("Order")
            .with("Id", 7i32)
            .with("Total", "19.99".parse::<Decimal>().unwrap())
            .with("Tags", Value::list(vec!["x".into()]))
            .with("Missing", Value::Null)
            .into_ref();
        let json = to_json(&order.into()).unwrap();
        assert_eq!(
            json,
            json!({"Id": 7, "Total": "19.99", "Tags": ["x"], "Missing": null})
        );
    }

    #[test]
    fn test_write_map_uses_key_text() {
        let map = Value::map(vec![(Value::from(1i32), Value::from("one"))]);
        assert_eq!(to_json(&map).unwrap(), json!({"1": "one"}));
    }

    #[test]
    fn test_write_cycle_is_rejected() {
        let node = Object::new("Node").into_ref();
        node.set("Next", node.clone());
        assert!(matches!(to_json(&node.into()), Err(Error::Json(_))));
    }
}

//! Indented text dump of value graphs
//!
//! Objects already on the current path are printed as `<cycle Type>` so a
//! self-referencing graph renders in finite space.

use crate::value::{ObjectId, Value};
use std::collections::HashSet;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Render a value as indented text.
pub fn to_pretty_string(value: &Value) -> String {
    let mut out = String::new();
    let mut path = HashSet::new();
    write_value(&mut out, value, 0, &mut path);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize, path: &mut HashSet<ObjectId>) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Simple(scalar) => {
            if scalar.as_str().is_some() {
                let _ = write!(out, "{:?}", scalar.to_string());
            } else {
                let _ = write!(out, "{scalar}");
            }
        }
        Value::Sequence(sequence) => {
            let _ = write!(out, "{} [", sequence.kind);
            if sequence.items.is_empty() {
                out.push(']');
                return;
            }
            for item in &sequence.items {
                newline(out, depth + 1);
                write_value(out, item, depth + 1, path);
            }
            newline(out, depth);
            out.push(']');
        }
        Value::Associative(entries) => {
            out.push('{');
            if entries.is_empty() {
                out.push('}');
                return;
            }
            for (key, entry) in entries {
                newline(out, depth + 1);
                write_value(out, key, depth + 1, path);
                out.push_str(" => ");
                write_value(out, entry, depth + 1, path);
            }
            newline(out, depth);
            out.push('}');
        }
        Value::Composite(object) => {
            let id = object.id();
            let type_name = object.type_name();
            if !path.insert(id) {
                let _ = write!(out, "<cycle {type_name}>");
                return;
            }
            let _ = write!(out, "{type_name} {{");
            let fields = object.snapshot();
            for (name, field) in &fields {
                newline(out, depth + 1);
                let _ = write!(out, "{name}: ");
                write_value(out, field, depth + 1, path);
            }
            if !fields.is_empty() {
                newline(out, depth);
            }
            out.push('}');
            path.remove(&id);
        }
    }
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

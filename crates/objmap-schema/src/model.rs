//! Type and field descriptor definitions

use crate::{Error, Result};
use objmap_ir::{FieldType, HandleKind, Object, ObjectRef, Scalar, Value};

/// Per-field mapping metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldHint {
    /// Name of the counterpart field on the other side of a mapping
    Rename(String),

    /// Name of a converter registered with the type registry
    Converter(String),
}

/// One field of a type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub settable: bool,
    pub no_map: bool,
    pub hint: Option<FieldHint>,
    pub default: Option<Scalar>,
}

impl FieldDescriptor {
    /// Create a settable field without hints or default
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            settable: true,
            no_map: false,
            hint: None,
            default: None,
        }
    }

    /// Create a field from a type expression such as `list<Order>`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the type expression is malformed.
    pub fn parse(name: impl Into<String>, type_expr: &str) -> Result<Self> {
        let name = name.into();
        let field_type = type_expr
            .parse::<FieldType>()
            .map_err(|e| Error::Parse(format!("{name}: {e}")))?;
        Ok(Self::new(name, field_type))
    }

    /// Mark the field as having no public setter
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.settable = false;
        self
    }

    /// Mark the field as explicitly excluded from mapping
    #[must_use]
    pub fn no_map(mut self) -> Self {
        self.no_map = true;
        self
    }

    /// Map this field to a differently named counterpart
    #[must_use]
    pub fn renamed(mut self, counterpart: impl Into<String>) -> Self {
        self.hint = Some(FieldHint::Rename(counterpart.into()));
        self
    }

    /// Convert this field's value with a registered converter
    #[must_use]
    pub fn converted_by(mut self, converter: impl Into<String>) -> Self {
        self.hint = Some(FieldHint::Converter(converter.into()));
        self
    }

    /// Value a fresh instance starts with
    #[must_use]
    pub fn with_default(mut self, default: Scalar) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether the mapper may write this field
    pub fn is_mappable(&self) -> bool {
        self.settable && !self.no_map
    }

    pub fn rename_target(&self) -> Option<&str> {
        match &self.hint {
            Some(FieldHint::Rename(name)) => Some(name),
            _ => None,
        }
    }

    pub fn converter_name(&self) -> Option<&str> {
        match &self.hint {
            Some(FieldHint::Converter(name)) => Some(name),
            _ => None,
        }
    }

    /// Declared default, else the zero value of a value-like type, else null
    pub fn initial_value(&self) -> Value {
        match &self.default {
            Some(default) => Value::Simple(default.clone()),
            None => self.field_type.zero_value().unwrap_or(Value::Null),
        }
    }
}

/// Mapping-relevant description of a named type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    /// Type-level opt-out: never a mapping endpoint
    pub unmappable: bool,
    /// Set when the type itself is a denied handle category
    pub handle: Option<HandleKind>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            unmappable: false,
            handle: None,
        }
    }

    /// Append a field
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a plain settable field
    #[must_use]
    pub fn with_field(self, name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        self.field(FieldDescriptor::new(name, field_type))
    }

    #[must_use]
    pub fn mark_unmappable(mut self) -> Self {
        self.unmappable = true;
        self
    }

    #[must_use]
    pub fn as_handle(mut self, kind: HandleKind) -> Self {
        self.handle = Some(kind);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Settable fields not tagged "do not map", in declaration order
    pub fn mappable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_mappable())
    }

    /// Build a fresh instance with every field at its initial value
    pub fn instantiate(&self) -> ObjectRef {
        let mut object = Object::new(self.name.clone());
        for field in &self.fields {
            object.set(field.name.clone(), field.initial_value());
        }
        object.into_ref()
    }

    /// Describe an unregistered object from the values it carries
    pub fn infer(object: &Object) -> Self {
        let fields = object
            .fields
            .iter()
            .map(|(name, value)| FieldDescriptor::new(name.clone(), infer_type(value)))
            .collect();
        Self {
            name: object.type_name.clone(),
            fields,
            unmappable: false,
            handle: None,
        }
    }
}

/// Declared type that describes a runtime value
///
/// Nulls and empty containers fall back to `any` for the unknown parts.
pub fn infer_type(value: &Value) -> FieldType {
    match value {
        Value::Null => FieldType::Dynamic,
        Value::Simple(scalar) => FieldType::Simple(scalar.simple_type()),
        Value::Sequence(sequence) => {
            let element = sequence
                .items
                .iter()
                .find(|item| !item.is_null())
                .map_or(FieldType::Dynamic, infer_type);
            FieldType::sequence(sequence.kind, element)
        }
        Value::Associative(entries) => match entries.first() {
            Some((key, value)) => FieldType::map_of(infer_type(key), infer_type(value)),
            None => FieldType::map_of(FieldType::Dynamic, FieldType::Dynamic),
        },
        Value::Composite(object) => FieldType::Composite(object.type_name()),
    }
}

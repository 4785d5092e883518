//! Loading type definitions from YAML or JSON

use crate::model::{FieldDescriptor, FieldHint, TypeDescriptor};
use crate::registry::TypeRegistry;
use crate::{Error, Result};
use objmap_ir::{FieldType, HandleKind, Scalar};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, trace};

/// Serializable type-definition document
#[derive(Debug, Deserialize)]
struct TypesFile {
    #[serde(default)]
    types: Vec<TypeFile>,
}

#[derive(Debug, Deserialize)]
struct TypeFile {
    name: String,
    #[serde(default)]
    unmappable: bool,
    #[serde(default)]
    handle: Option<HandleKind>,
    #[serde(default)]
    fields: Vec<FieldFile>,
}

#[derive(Debug, Deserialize)]
struct FieldFile {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default = "default_settable")]
    settable: bool,
    #[serde(default)]
    no_map: bool,
    #[serde(default)]
    rename: Option<String>,
    #[serde(default)]
    converter: Option<String>,
    #[serde(default)]
    default: Option<DefaultFile>,
}

/// Default as written in the document, parsed against the field type later
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DefaultFile {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn default_settable() -> bool {
    true
}

impl DefaultFile {
    fn into_text(self) -> String {
        match self {
            DefaultFile::Bool(b) => b.to_string(),
            DefaultFile::Int(i) => i.to_string(),
            DefaultFile::Float(f) => f.to_string(),
            DefaultFile::Text(s) => s,
        }
    }
}

/// Loads type definitions into a registry
///
/// ```yaml
/// types:
///   - name: Customer
///     fields:
///       - { name: Id, type: i32 }
///       - { name: Orders, type: "list<Order>" }
///       - { name: FullName, type: string, rename: Name }
/// ```
pub struct SchemaLoader<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> SchemaLoader<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Load definitions from a file, YAML by extension, JSON otherwise
    ///
    /// Returns the names of the registered types.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or
    /// defines a type that is already registered.
    pub fn load_from_file(&self, path: &Path) -> Result<Vec<String>> {
        trace!("Loading type definitions from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            self.load_from_yaml(&content)
        } else {
            self.load_from_json(&content)
        }
    }

    /// Load definitions from a YAML string
    ///
    /// # Errors
    ///
    /// See [`SchemaLoader::load_from_file`].
    pub fn load_from_yaml(&self, yaml: &str) -> Result<Vec<String>> {
        self.register(Self::parse_yaml(yaml)?)
    }

    /// Load definitions from a JSON string
    ///
    /// # Errors
    ///
    /// See [`SchemaLoader::load_from_file`].
    pub fn load_from_json(&self, json: &str) -> Result<Vec<String>> {
        self.register(Self::parse_json(json)?)
    }

    /// Parse YAML definitions without registering them
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] or [`Error::Parse`] on malformed input.
    pub fn parse_yaml(yaml: &str) -> Result<Vec<TypeDescriptor>> {
        let file: TypesFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))?;
        convert_types_file(file)
    }

    /// Parse JSON definitions without registering them
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] or [`Error::Parse`] on malformed input.
    pub fn parse_json(json: &str) -> Result<Vec<TypeDescriptor>> {
        let file: TypesFile = serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))?;
        convert_types_file(file)
    }

    fn register(&self, descriptors: Vec<TypeDescriptor>) -> Result<Vec<String>> {
        let names = self.registry.register_all(descriptors)?;
        info!("Loaded type definitions: {}", names.join(", "));
        Ok(names)
    }
}

fn convert_types_file(file: TypesFile) -> Result<Vec<TypeDescriptor>> {
    file.types.into_iter().map(convert_type).collect()
}

fn convert_type(file: TypeFile) -> Result<TypeDescriptor> {
    let fields = file
        .fields
        .into_iter()
        .map(|field| convert_field(&file.name, field))
        .collect::<Result<Vec<_>>>()?;

    Ok(TypeDescriptor {
        name: file.name,
        fields,
        unmappable: file.unmappable,
        handle: file.handle,
    })
}

fn convert_field(type_name: &str, file: FieldFile) -> Result<FieldDescriptor> {
    let field_type: FieldType = file
        .field_type
        .parse()
        .map_err(|e| Error::Parse(format!("{type_name}.{}: {e}", file.name)))?;

    let hint = match (file.rename, file.converter) {
        (Some(_), Some(_)) => {
            return Err(Error::invalid_field(
                type_name,
                &file.name,
                "rename and converter are mutually exclusive",
            ));
        }
        (Some(rename), None) => Some(FieldHint::Rename(rename)),
        (None, Some(converter)) => Some(FieldHint::Converter(converter)),
        (None, None) => None,
    };

    let default = match file.default {
        None => None,
        Some(default) => {
            let Some(simple) = field_type.simple_type() else {
                return Err(Error::invalid_field(
                    type_name,
                    &file.name,
                    "defaults are only supported for simple types",
                ));
            };
            let text = default.into_text();
            let scalar = Scalar::parse(simple, &text).ok_or_else(|| {
                Error::invalid_field(
                    type_name,
                    &file.name,
                    format!("cannot read default '{text}' as {simple}"),
                )
            })?;
            Some(scalar)
        }
    };

    Ok(FieldDescriptor {
        name: file.name,
        field_type,
        settable: file.settable,
        no_map: file.no_map,
        hint,
        default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmap_ir::{SequenceKind, SimpleType, Value};

    #[test]
    fn test_load_from_yaml() {
        let registry = TypeRegistry::new();
        let loader = SchemaLoader::new(&registry);
        let yaml = r#"
types:
  - name: Order
    fields:
      - { name: Id, type: i32 }
      - { name: Lines, type: "queue<OrderLine>" }
      - { name: Total, type: decimal, default: "0.00" }
  - name: OrderLine
    fields:
      - { name: Sku, type: string, rename: ProductCode }
      - { name: Qty, type: u16, default: 1 }
      - { name: Audit, type: string, settable: false }
"#;
        let names = loader.load_from_yaml(yaml).unwrap();
        assert_eq!(names, vec!["Order", "OrderLine"]);

        let order = registry.descriptor("Order").unwrap();
        assert_eq!(
            order.get("Lines").unwrap().field_type,
            FieldType::sequence(SequenceKind::Queue, FieldType::composite("OrderLine"))
        );

        let line = registry.descriptor("OrderLine").unwrap();
        assert_eq!(line.get("Sku").unwrap().rename_target(), Some("ProductCode"));
        assert_eq!(line.get("Qty").unwrap().default, Some(Scalar::U16(1)));
        assert_eq!(registry.fields_of("OrderLine").unwrap().len(), 2);

        let instance = registry.instantiate("OrderLine").unwrap();
        assert_eq!(instance.get("Qty"), Some(Value::from(1u16)));
    }

    #[test]
    fn test_load_from_json() {
        let registry = TypeRegistry::new();
        let loader = SchemaLoader::new(&registry);
        let json = r#"{
            "types": [
                {"name": "Launcher", "handle": "callable"},
                {"name": "Vault", "unmappable": true, "fields": [{"name": "Key", "type": "string"}]}
            ]
        }"#;
        loader.load_from_json(json).unwrap();
        assert_eq!(
            registry.descriptor("Launcher").unwrap().handle,
            Some(HandleKind::Callable)
        );
        assert!(registry.descriptor("Vault").unwrap().unmappable);
    }

    #[test]
    fn test_bad_type_expression_names_field() {
        let yaml = "types:\n  - name: Broken\n    fields:\n      - { name: Items, type: 'list<' }\n";
        match SchemaLoader::parse_yaml(yaml) {
            Err(Error::Parse(message)) => assert!(message.contains("Broken.Items")),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_default_names_field() {
        let yaml = "types:\n  - name: T\n    fields:\n      - { name: Count, type: i8, default: 1000 }\n";
        match SchemaLoader::parse_yaml(yaml) {
            Err(Error::InvalidFormat(message)) => {
                assert!(message.contains("T.Count"));
                assert!(message.contains("i8"));
            }
            other => panic!("Expected InvalidFormat error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_on_composite_rejected() {
        let yaml = "types:\n  - name: T\n    fields:\n      - { name: C, type: Child, default: x }\n";
        assert!(matches!(SchemaLoader::parse_yaml(yaml), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_conflicting_hints_rejected() {
        let yaml = "types:\n  - name: T\n    fields:\n      - { name: A, type: string, rename: B, converter: c }\n";
        assert!(matches!(SchemaLoader::parse_yaml(yaml), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            SchemaLoader::parse_yaml("types: ["),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_nullable_default() {
        let yaml = "types:\n  - name: T\n    fields:\n      - { name: Score, type: 'f64?', default: 2.5 }\n";
        let types = SchemaLoader::parse_yaml(yaml).unwrap();
        let field = types[0].get("Score").unwrap();
        assert_eq!(field.field_type, FieldType::Nullable(SimpleType::F64));
        assert_eq!(field.default, Some(Scalar::F64(2.5)));
    }
}

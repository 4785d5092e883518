//! Type registry: descriptors, instance construction and field converters

use crate::cache::DescriptorCache;
use crate::model::{FieldDescriptor, TypeDescriptor};
use crate::{Error, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use objmap_ir::{ObjectRef, Value};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Failure reported by a field converter
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConvertError(pub String);

impl ConvertError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for ConvertError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for ConvertError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Single-field converter named by a field's converter hint
pub trait FieldConverter: Send + Sync {
    /// Convert the source field value into the destination field value.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be converted; the mapper then
    /// leaves the destination field unset.
    fn convert(&self, value: &Value) -> std::result::Result<Value, ConvertError>;
}

impl<F> FieldConverter for F
where
    F: Fn(&Value) -> std::result::Result<Value, ConvertError> + Send + Sync,
{
    fn convert(&self, value: &Value) -> std::result::Result<Value, ConvertError> {
        self(value)
    }
}

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Registry of type descriptors and named field converters
///
/// All operations take `&self`, so one registry can be shared by concurrent
/// mapping calls. Registered types are immutable; registering a name twice is
/// an error.
#[derive(Default)]
pub struct TypeRegistry {
    types: DashMap<String, Arc<TypeDescriptor>>,
    converters: DashMap<String, Arc<dyn FieldConverter>>,
    cache: DescriptorCache,
}

impl TypeRegistry {
    /// Create an empty, isolated registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static TypeRegistry {
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    /// Register a type descriptor
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateType`] if the name is taken and
    /// [`Error::InvalidFormat`] if two fields share a name.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &descriptor.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::invalid_field(
                    &descriptor.name,
                    &field.name,
                    "duplicate field name",
                ));
            }
        }

        match self.types.entry(descriptor.name.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateType(descriptor.name)),
            Entry::Vacant(entry) => {
                debug!(
                    "Registered type {} with {} fields",
                    descriptor.name,
                    descriptor.fields.len()
                );
                entry.insert(Arc::new(descriptor));
                Ok(())
            }
        }
    }

    /// Register several descriptors, returning their names
    ///
    /// # Errors
    ///
    /// Fails without registering anything if any name is taken or repeated.
    pub fn register_all(&self, descriptors: Vec<TypeDescriptor>) -> Result<Vec<String>> {
        let mut names = HashSet::new();
        for descriptor in &descriptors {
            if self.contains(&descriptor.name) || !names.insert(descriptor.name.as_str()) {
                return Err(Error::DuplicateType(descriptor.name.clone()));
            }
        }

        let mut registered = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            registered.push(descriptor.name.clone());
            self.register(descriptor)?;
        }
        info!("Registered {} types", registered.len());
        Ok(registered)
    }

    /// Register a named single-field converter, replacing any previous one
    pub fn register_converter(&self, name: impl Into<String>, converter: impl FieldConverter + 'static) {
        self.converters.insert(name.into(), Arc::new(converter));
    }

    pub fn converter(&self, name: &str) -> Option<Arc<dyn FieldConverter>> {
        self.converters.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up a descriptor by type name
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown names.
    pub fn descriptor(&self, type_name: &str) -> Result<Arc<TypeDescriptor>> {
        self.types
            .get(type_name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::NotFound(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Mappable fields of a type, memoized for the process lifetime
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown names and
    /// [`Error::UnmappableType`] for types marked unmappable. Failures are not
    /// cached.
    pub fn fields_of(&self, type_name: &str) -> Result<Arc<[FieldDescriptor]>> {
        if let Some(fields) = self.cache.get(type_name) {
            return Ok(fields);
        }
        let descriptor = self.mappable_descriptor(type_name)?;
        Ok(self.cache.get_or_insert_with(type_name, || {
            descriptor.mappable_fields().cloned().collect()
        }))
    }

    /// Construct a fresh instance of a registered type
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] or [`Error::UnmappableType`].
    pub fn instantiate(&self, type_name: &str) -> Result<ObjectRef> {
        Ok(self.mappable_descriptor(type_name)?.instantiate())
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    fn mappable_descriptor(&self, type_name: &str) -> Result<Arc<TypeDescriptor>> {
        let descriptor = self.descriptor(type_name)?;
        if descriptor.unmappable {
            return Err(Error::UnmappableType(type_name.to_string()));
        }
        Ok(descriptor)
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut converters: Vec<String> =
            self.converters.iter().map(|entry| entry.key().clone()).collect();
        converters.sort();
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .field("converters", &converters)
            .field("cached", &self.cache.len())
            .finish()
    }
}

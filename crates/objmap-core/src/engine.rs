//! Mapping engine
//!
//! Walks a source value graph and builds the destination graph. State that
//! must not leak between calls (visited objects, memoized field matches and
//! diagnostics) lives in a context created per call.

use crate::config::{MapConfig, ignores_field, path_matches, rules_below};
use crate::convert::convert_scalar;
use crate::diagnostics::{FieldSkipped, MapOutcome, SkipReason};
use crate::policies::{NullHandling, denied_descriptor, denied_field_type};
use crate::similarity::best_match;
use crate::{Error, Result};
use objmap_ir::{FieldType, ObjectId, ObjectRef, Scalar, Sequence, SequenceKind, SimpleType, Value};
use objmap_schema::{FieldDescriptor, TypeDescriptor, TypeRegistry, infer_type};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Maps values into registered destination types
///
/// A mapper only borrows a registry, so it is cheap to create and can be used
/// from any thread that can see the registry.
#[derive(Debug, Clone, Copy)]
pub struct Mapper<'r> {
    registry: &'r TypeRegistry,
}

impl Mapper<'static> {
    /// Mapper over the process-wide registry
    pub fn global() -> Self {
        Self::new(TypeRegistry::global())
    }
}

impl<'r> Mapper<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Map `source` into a fresh value of `target`, tolerating null fields
    ///
    /// # Errors
    ///
    /// Returns an error for unknown, unmappable or disallowed types, when the
    /// recursion limit is exceeded, or when the root cannot be mapped at all.
    pub fn map(&self, source: &Value, target: impl Into<FieldType>) -> Result<Value> {
        self.map_with_config(source, target, &MapConfig::permissive())
    }

    /// Map `source` into a fresh value of `target` under `config`
    ///
    /// # Errors
    ///
    /// See [`Mapper::map`]; additionally fails on null fields when the config
    /// uses [`NullHandling::ThrowOnNull`].
    pub fn map_with_config(&self, source: &Value, target: impl Into<FieldType>, config: &MapConfig) -> Result<Value> {
        Ok(self.map_with_diagnostics(source, target, config)?.value)
    }

    /// Map and report every field that was left unwritten
    ///
    /// # Errors
    ///
    /// See [`Mapper::map_with_config`].
    pub fn map_with_diagnostics(
        &self,
        source: &Value,
        target: impl Into<FieldType>,
        config: &MapConfig,
    ) -> Result<MapOutcome> {
        let target = target.into();
        let mut context = MappingContext::new(self.registry, config);
        let value = context.map_root(source, &target)?;
        Ok(context.finish(value))
    }

    /// Map into an existing destination
    ///
    /// An object destination is written in place and returned. A sequence
    /// destination is copied, the mapped source items are appended, and the
    /// extended sequence is returned. The element type is read from the
    /// existing items, so a sequence holding no non-null item is rejected;
    /// use [`Mapper::map_into_sequence`] to name the element type instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDestination`] for any other destination and the
    /// errors of [`Mapper::map`].
    pub fn map_into(&self, source: &Value, destination: &Value) -> Result<Value> {
        self.map_into_with_config(source, destination, &MapConfig::permissive())
    }

    /// [`Mapper::map_into`] under `config`
    ///
    /// # Errors
    ///
    /// See [`Mapper::map_into`].
    pub fn map_into_with_config(&self, source: &Value, destination: &Value, config: &MapConfig) -> Result<Value> {
        let mut context = MappingContext::new(self.registry, config);
        let value = context.map_root_into(source, destination)?;
        Ok(context.finish(value).value)
    }

    /// Map a source sequence and append the items to `destination`
    ///
    /// Returns the number of items appended. Set destinations keep their
    /// first occurrence of equal items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDestination`] when `source` is not a sequence.
    pub fn map_into_sequence(
        &self,
        source: &Value,
        destination: &mut Sequence,
        element: impl Into<FieldType>,
        config: &MapConfig,
    ) -> Result<usize> {
        let target = FieldType::sequence(destination.kind, element.into());
        let mut context = MappingContext::new(self.registry, config);
        let mapped = context.map_root(source, &target)?;
        let Value::Sequence(mapped) = mapped else {
            return Ok(0);
        };

        let before = destination.len();
        for item in mapped.items {
            push_item(&mut destination.items, destination.kind, item);
        }
        Ok(destination.len() - before)
    }

    /// Map into a fresh `target` value, excluding fields by name
    ///
    /// `exclude` is called once with a fresh instance of the destination type
    /// (the element type for sequence targets). Returned names are matched
    /// against both source and destination field names of that type.
    ///
    /// # Errors
    ///
    /// See [`Mapper::map`].
    pub fn map_excluding(
        &self,
        source: &Value,
        target: impl Into<FieldType>,
        exclude: impl FnOnce(&ObjectRef) -> Vec<String>,
    ) -> Result<Value> {
        let target = target.into();
        let config = MapConfig::permissive();
        let mut context = MappingContext::new(self.registry, &config);

        if let Some(type_name) = excluded_type(&target) {
            let instance = self.registry.instantiate(type_name)?;
            let names = exclude(&instance);
            debug!("Excluding from {}: {}", type_name, names.join(", "));
            context.exclusions = Some(Exclusions {
                type_name: type_name.to_string(),
                names,
            });
        }

        let value = context.map_root(source, &target)?;
        Ok(context.finish(value).value)
    }

    /// Map an object into a string-keyed associative container
    ///
    /// Nested values are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDestination`] when `source` is not an object.
    pub fn to_associative(&self, source: &Value) -> Result<Value> {
        self.map(
            source,
            FieldType::map_of(SimpleType::String.into(), FieldType::Dynamic),
        )
    }
}

/// Names excluded for one destination type
#[derive(Debug)]
struct Exclusions {
    type_name: String,
    names: Vec<String>,
}

/// Result of mapping one value
#[derive(Debug)]
enum Step {
    Write(Value),
    Skip(SkipReason),
}

/// Per-call mapping state
struct MappingContext<'a> {
    registry: &'a TypeRegistry,
    config: &'a MapConfig,
    exclusions: Option<Exclusions>,
    /// Source id to source and destination; holding the source keeps its id unique
    visited: HashMap<ObjectId, (ObjectRef, ObjectRef)>,
    /// Resolved destination index per source field, for registered type pairs
    matches: HashMap<(String, String), Rc<[Option<usize>]>>,
    /// Ignore rules carried down from the enclosing destination field
    nested_ignores: Vec<String>,
    diagnostics: Vec<FieldSkipped>,
}

impl<'a> MappingContext<'a> {
    fn new(registry: &'a TypeRegistry, config: &'a MapConfig) -> Self {
        Self {
            registry,
            config,
            exclusions: None,
            visited: HashMap::new(),
            matches: HashMap::new(),
            nested_ignores: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn finish(self, value: Value) -> MapOutcome {
        debug!(
            "Mapped {} objects, {} fields skipped",
            self.visited.len(),
            self.diagnostics.len()
        );
        MapOutcome {
            value,
            diagnostics: self.diagnostics,
        }
    }

    fn map_root(&mut self, source: &Value, target: &FieldType) -> Result<Value> {
        debug!("Mapping into {}", target);
        if source.is_null() {
            return self.null_root();
        }
        match self.map_value(source, target, "", 0)? {
            Step::Write(value) => Ok(value),
            Step::Skip(reason) => Err(Error::InvalidDestination(format!(
                "cannot map {} into {target}: {reason}",
                describe(source)
            ))),
        }
    }

    fn map_root_into(&mut self, source: &Value, destination: &Value) -> Result<Value> {
        if source.is_null() {
            return self.null_root();
        }
        match destination {
            Value::Composite(dest) => {
                if let Some(step) = self.apply_converters(source, Some(destination)) {
                    return match step {
                        Step::Write(value) => Ok(value),
                        Step::Skip(reason) => Err(Error::InvalidDestination(reason.to_string())),
                    };
                }
                let Value::Composite(src) = source else {
                    return Err(Error::InvalidDestination(format!(
                        "cannot map {} into an object of type {}",
                        describe(source),
                        dest.type_name()
                    )));
                };
                debug!("Mapping {} into existing {}", src.type_name(), dest.type_name());
                self.map_object_into(src, dest, "", 0)?;
                Ok(destination.clone())
            }
            Value::Sequence(existing) => {
                let target = infer_type(destination);
                if matches!(&target, FieldType::Sequence { element, .. } if **element == FieldType::Dynamic) {
                    return Err(Error::InvalidDestination(format!(
                        "cannot infer the element type of an empty {}; use map_into_sequence",
                        existing.kind
                    )));
                }
                debug!("Appending into existing {}", target);
                let mapped = match self.map_value(source, &target, "", 0)? {
                    Step::Write(Value::Sequence(mapped)) => mapped,
                    _ => {
                        return Err(Error::InvalidDestination(format!(
                            "cannot append {} to a {}",
                            describe(source),
                            existing.kind
                        )));
                    }
                };
                let mut out = existing.clone();
                for item in mapped.items {
                    push_item(&mut out.items, out.kind, item);
                }
                Ok(Value::Sequence(out))
            }
            other => Err(Error::InvalidDestination(format!(
                "{} is neither an object nor a sequence",
                describe(other)
            ))),
        }
    }

    fn null_root(&self) -> Result<Value> {
        match self.config.null_handling() {
            NullHandling::ThrowOnNull => Err(Error::NullSource),
            NullHandling::SubstituteDefault | NullHandling::PropagateNull => Ok(Value::Null),
        }
    }

    fn map_value(&mut self, source: &Value, target: &FieldType, path: &str, depth: usize) -> Result<Step> {
        self.check_depth(path, depth)?;
        if let Some(kind) = denied_field_type(target) {
            return Err(Error::disallowed(target.to_string(), kind, path));
        }
        if source.is_null() {
            return Ok(Step::Write(Value::Null));
        }
        if let Some(step) = self.converted(source, target, path)? {
            return Ok(step);
        }

        match (source, target) {
            (_, FieldType::Dynamic) => {
                if let Value::Composite(object) = source {
                    self.check_source_type(object, path)?;
                }
                Ok(Step::Write(source.clone()))
            }
            (Value::Simple(scalar), FieldType::Simple(ty) | FieldType::Nullable(ty)) => {
                Ok(match convert_scalar(scalar, ty) {
                    Some(converted) => Step::Write(Value::Simple(converted)),
                    None => Step::Skip(SkipReason::NoConversion),
                })
            }
            (Value::Sequence(sequence), FieldType::Sequence { kind, element }) => {
                self.map_sequence(&sequence.items, *kind, element, path, depth)
            }
            (Value::Associative(entries), FieldType::Associative { key, value }) => {
                self.map_entries(entries, key, value, path, depth)
            }
            (Value::Composite(object), FieldType::Associative { key, value }) => {
                let entries = self.object_entries(object, path)?;
                self.map_entries(&entries, key, value, path, depth)
            }
            (Value::Composite(object), FieldType::Composite(type_name)) => {
                let dest = self.map_object(object, type_name, path, depth)?;
                Ok(Step::Write(Value::Composite(dest)))
            }
            _ => Ok(Step::Skip(SkipReason::IncompatibleShape)),
        }
    }

    fn converted(&self, source: &Value, target: &FieldType, path: &str) -> Result<Option<Step>> {
        let Some(key) = source.type_key() else {
            return Ok(None);
        };
        let fresh = match self.config.context_converter(&key) {
            Some(_) => self.fresh_destination(target, path)?,
            None => None,
        };
        Ok(self.apply_converters(source, fresh.as_ref()))
    }

    /// Config converters for the source's runtime type
    ///
    /// The contextual converter wins when a fresh destination is available;
    /// a converter that declines its input falls through to the next one.
    fn apply_converters(&self, source: &Value, fresh: Option<&Value>) -> Option<Step> {
        let key = source.type_key()?;
        let contextual = self.config.context_converter(&key);
        let plain = self.config.value_converter(&key);
        if contextual.is_none() && plain.is_none() {
            return None;
        }

        if let (Some(convert), Some(fresh)) = (contextual, fresh) {
            if let Some(value) = convert(source, fresh) {
                trace!("Contextual converter applied for {}", key);
                return Some(Step::Write(value));
            }
        }
        if let Some(convert) = plain {
            if let Some(value) = convert(source) {
                trace!("Converter applied for {}", key);
                return Some(Step::Write(value));
            }
        }
        if plain.is_none() && fresh.is_none() {
            // Only a contextual converter exists and there is no instance for it
            return None;
        }
        warn!("Converter for {} declined its input", key);
        Some(Step::Skip(SkipReason::ConverterFailed(format!(
            "converter for {key} declined its input"
        ))))
    }

    /// Fresh destination a contextual converter can receive
    fn fresh_destination(&self, target: &FieldType, path: &str) -> Result<Option<Value>> {
        match target {
            FieldType::Simple(ty) => Ok(ty.zero_value().map(Value::Simple)),
            FieldType::Composite(type_name) if self.registry.contains(type_name) => {
                let descriptor = self.dest_descriptor(type_name, path)?;
                Ok(Some(Value::Composite(descriptor.instantiate())))
            }
            _ => Ok(None),
        }
    }

    fn map_sequence(
        &mut self,
        items: &[Value],
        kind: SequenceKind,
        element: &FieldType,
        path: &str,
        depth: usize,
    ) -> Result<Step> {
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{index}]");
            match self.map_value(item, element, &item_path, depth + 1)? {
                Step::Write(value) => push_item(&mut out, kind, value),
                Step::Skip(reason) => {
                    debug!("Dropping item {}: {}", item_path, reason);
                    self.skip(item_path, SkipReason::DroppedEntry);
                }
            }
        }
        Ok(Step::Write(Value::sequence(kind, out)))
    }

    fn map_entries(
        &mut self,
        entries: &[(Value, Value)],
        key_type: &FieldType,
        value_type: &FieldType,
        path: &str,
        depth: usize,
    ) -> Result<Step> {
        let mut out: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let entry_path = format!("{path}[{}]", key_label(key));

            let key = match self.map_value(key, key_type, &entry_path, depth + 1)? {
                Step::Write(key) if !key.is_null() => key,
                _ => {
                    debug!("Dropping entry {}: key not convertible", entry_path);
                    self.skip(entry_path, SkipReason::DroppedEntry);
                    continue;
                }
            };
            let value = match self.map_value(value, value_type, &entry_path, depth + 1)? {
                Step::Write(value) => value,
                Step::Skip(reason) => {
                    debug!("Dropping entry {}: {}", entry_path, reason);
                    self.skip(entry_path, SkipReason::DroppedEntry);
                    continue;
                }
            };

            match out.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        Ok(Step::Write(Value::Associative(out)))
    }

    /// Fields of an object as string-keyed entries
    fn object_entries(&self, object: &ObjectRef, path: &str) -> Result<Vec<(Value, Value)>> {
        self.check_source_type(object, path)?;
        let fields = self.fields_of_object(object)?;
        Ok(fields
            .iter()
            .map(|field| {
                let value = object.get(&field.name).unwrap_or_default();
                (Value::string(field.name.clone()), value)
            })
            .collect())
    }

    fn map_object(&mut self, source: &ObjectRef, type_name: &str, path: &str, depth: usize) -> Result<ObjectRef> {
        if let Some((_, existing)) = self.visited.get(&source.id()) {
            trace!("Reusing mapped {} at {}", source.type_name(), display_path(path));
            return Ok(existing.clone());
        }
        let descriptor = self.dest_descriptor(type_name, path)?;
        let dest = descriptor.instantiate();
        self.map_object_into(source, &dest, path, depth)?;
        Ok(dest)
    }

    fn map_object_into(&mut self, source: &ObjectRef, dest: &ObjectRef, path: &str, depth: usize) -> Result<()> {
        self.check_depth(path, depth)?;
        self.check_source_type(source, path)?;
        self.visited
            .insert(source.id(), (source.clone(), dest.clone()));

        let source_type = source.type_name();
        let dest_type = dest.type_name();
        let source_fields = self.fields_of_object(source)?;
        let dest_fields = self.fields_of_object(dest)?;
        let matches = self.resolve(&source_type, &source_fields, &dest_type, &dest_fields);
        trace!("Mapping {} into {}", source_type, dest_type);

        let inherited = std::mem::take(&mut self.nested_ignores);
        let mut ignores = self.config.ignored_paths(&dest_type, dest);
        ignores.extend(inherited.iter().cloned());

        for (field, matched) in source_fields.iter().zip(matches.iter()) {
            let field_path = join_path(path, &field.name);

            if self.is_excluded(&dest_type, &field.name) {
                self.skip(field_path, SkipReason::Excluded);
                continue;
            }
            let Some(dest_field) = matched.map(|index| &dest_fields[index]) else {
                self.skip(field_path, SkipReason::NoMatch);
                continue;
            };
            if self.is_excluded(&dest_type, &dest_field.name) {
                self.skip(field_path, SkipReason::Excluded);
                continue;
            }
            if ignores_field(&ignores, &dest_field.name) {
                self.skip(field_path, SkipReason::Ignored);
                continue;
            }
            if let Some(kind) = denied_field_type(&field.field_type) {
                return Err(Error::disallowed(field.field_type.to_string(), kind, field_path));
            }
            if let Some(kind) = denied_field_type(&dest_field.field_type) {
                return Err(Error::disallowed(dest_field.field_type.to_string(), kind, field_path));
            }

            let value = source.get(&field.name).unwrap_or_default();
            self.nested_ignores = rules_below(&ignores, &dest_field.name);
            let step = self.map_field(field, dest_field, &value, &field_path, depth)?;
            self.nested_ignores.clear();
            match step {
                Step::Write(mapped) => {
                    trace!("{} -> {}.{}", field_path, dest_type, dest_field.name);
                    dest.set(dest_field.name.clone(), mapped);
                }
                Step::Skip(reason) => self.skip(field_path, reason),
            }
        }
        self.nested_ignores = inherited;
        Ok(())
    }

    fn map_field(
        &mut self,
        field: &FieldDescriptor,
        dest_field: &FieldDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<Step> {
        if let Some(name) = field.converter_name() {
            let Some(converter) = self.registry.converter(name) else {
                warn!("No converter registered as '{}' for {}", name, path);
                return Ok(Step::Skip(SkipReason::ConverterFailed(format!(
                    "no converter registered as '{name}'"
                ))));
            };
            return Ok(match converter.convert(value) {
                Ok(converted) => Step::Write(converted),
                Err(e) => {
                    warn!("Converter '{}' failed for {}: {}", name, path, e);
                    Step::Skip(SkipReason::ConverterFailed(e.to_string()))
                }
            });
        }

        if value.is_null() {
            return match self.config.null_handling() {
                NullHandling::ThrowOnNull => Err(Error::NullValue {
                    path: path.to_string(),
                }),
                NullHandling::SubstituteDefault => Ok(dest_field
                    .field_type
                    .zero_value()
                    .map_or(Step::Skip(SkipReason::NullValue), Step::Write)),
                NullHandling::PropagateNull => Ok(Step::Skip(SkipReason::NullValue)),
            };
        }

        self.map_value(value, &dest_field.field_type, path, depth + 1)
    }

    /// Destination index for each source field
    ///
    /// A rename hint on the source names its counterpart; otherwise a
    /// destination field whose rename hint names the source field wins;
    /// otherwise the most similar destination name at or above the floor.
    fn resolve(
        &mut self,
        source_type: &str,
        source_fields: &[FieldDescriptor],
        dest_type: &str,
        dest_fields: &[FieldDescriptor],
    ) -> Rc<[Option<usize>]> {
        let cacheable = self.registry.contains(source_type) && self.registry.contains(dest_type);
        let key = (source_type.to_string(), dest_type.to_string());
        if cacheable {
            if let Some(hit) = self.matches.get(&key) {
                return Rc::clone(hit);
            }
        }

        let floor = self.config.similarity_floor();
        let resolved: Rc<[Option<usize>]> = source_fields
            .iter()
            .map(|field| match_field(field, dest_fields, floor))
            .collect();
        if cacheable {
            self.matches.insert(key, Rc::clone(&resolved));
        }
        resolved
    }

    /// Mappable fields of a live object, registered or inferred
    fn fields_of_object(&self, object: &ObjectRef) -> Result<Arc<[FieldDescriptor]>> {
        let type_name = object.type_name();
        if self.registry.contains(&type_name) {
            return Ok(self.registry.fields_of(&type_name)?);
        }
        let inferred = TypeDescriptor::infer(&object.borrow());
        Ok(inferred.mappable_fields().cloned().collect())
    }

    /// Registered destination descriptor, rejecting denied and unmappable types
    fn dest_descriptor(&self, type_name: &str, path: &str) -> Result<Arc<TypeDescriptor>> {
        let descriptor = self.registry.descriptor(type_name)?;
        if let Some(kind) = denied_descriptor(&descriptor) {
            return Err(Error::disallowed(type_name, kind, path));
        }
        if descriptor.unmappable {
            return Err(Error::UnmappableType(type_name.to_string()));
        }
        Ok(descriptor)
    }

    fn check_source_type(&self, object: &ObjectRef, path: &str) -> Result<()> {
        let type_name = object.type_name();
        let Ok(descriptor) = self.registry.descriptor(&type_name) else {
            return Ok(());
        };
        if let Some(kind) = denied_descriptor(&descriptor) {
            return Err(Error::disallowed(type_name, kind, path));
        }
        if descriptor.unmappable {
            return Err(Error::UnmappableType(type_name));
        }
        Ok(())
    }

    fn check_depth(&self, path: &str, depth: usize) -> Result<()> {
        let limit = self.config.max_depth();
        if depth > limit {
            return Err(Error::RecursionLimit {
                limit,
                path: display_path(path).to_string(),
            });
        }
        Ok(())
    }

    fn is_excluded(&self, type_name: &str, field: &str) -> bool {
        self.exclusions.as_ref().is_some_and(|exclusions| {
            exclusions.type_name == type_name
                && exclusions.names.iter().any(|rule| path_matches(field, rule))
        })
    }

    fn skip(&mut self, path: String, reason: SkipReason) {
        match reason {
            SkipReason::NoConversion | SkipReason::IncompatibleShape => {
                warn!("Skipping {}: {}", path, reason);
            }
            _ => debug!("Skipping {}: {}", path, reason),
        }
        self.diagnostics.push(FieldSkipped { path, reason });
    }
}

/// Index of the destination field a source field maps to
///
/// An exact name (or rename target) wins, then a destination field renamed
/// from the source field, then the most similar name at or above `floor`.
/// Ties go to the earliest destination field.
#[must_use]
pub fn match_field(field: &FieldDescriptor, dest_fields: &[FieldDescriptor], floor: f64) -> Option<usize> {
    let wanted = field.rename_target().unwrap_or(&field.name);
    if let Some(index) = dest_fields.iter().position(|dest| dest.name == wanted) {
        return Some(index);
    }
    if let Some(index) = dest_fields
        .iter()
        .position(|dest| dest.rename_target() == Some(field.name.as_str()))
    {
        return Some(index);
    }

    let best = best_match(wanted, dest_fields.iter().map(|dest| dest.name.as_str()));
    let winner = best.first().filter(|score| score.score >= floor)?;
    dest_fields.iter().position(|dest| dest.name == winner.dest)
}

/// Append honoring set semantics: sets keep the first equal item
fn push_item(items: &mut Vec<Value>, kind: SequenceKind, item: Value) {
    if kind == SequenceKind::Set && items.contains(&item) {
        return;
    }
    items.push(item);
}

/// Type whose fields `map_excluding` filters
fn excluded_type(target: &FieldType) -> Option<&str> {
    match target {
        FieldType::Composite(name) => Some(name),
        FieldType::Sequence { element, .. } => excluded_type(element),
        _ => None,
    }
}

fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::Simple(Scalar::String(s)) => s.clone(),
        Value::Simple(scalar) => scalar.to_string(),
        other => describe(other).to_string(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Simple(_) => "a simple value",
        Value::Sequence(_) => "a sequence",
        Value::Associative(_) => "an associative container",
        Value::Composite(_) => "an object",
    }
}

//! Mapping configuration
//!
//! [`MapConfig`] holds converters keyed by source type, ignore rules keyed by
//! destination type, the null handling policy and engine limits. Build it
//! completely before the first mapping call; the engine only reads it.
//!
//! The data-only part of a config can also be loaded from YAML as a
//! [`MapProfile`]:
//!
//! ```yaml
//! null_handling: substitute_default
//! similarity_floor: 0.5
//! max_depth: 16
//! ignore:
//!   CustomerVm: [PasswordHash, Address.Street]
//! ```

use crate::policies::NullHandling;
use crate::{Error, Result};
use objmap_ir::{ObjectRef, SimpleValue, TypeKey, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Minimum similarity for a fuzzy field match
pub const DEFAULT_SIMILARITY_FLOOR: f64 = 0.3;

/// Nesting depth at which a mapping call is aborted
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Value converter; `None` when the input is not of the registered type
pub type ValueConverterFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Contextual converter, receiving a fresh destination instance
pub type ContextConverterFn = Arc<dyn Fn(&Value, &Value) -> Option<Value> + Send + Sync>;

/// Dynamic ignore rule evaluated against the live destination instance
pub type IgnorePredicate = Arc<dyn Fn(&ObjectRef) -> Vec<String> + Send + Sync>;

/// Converters, ignore rules and policies for mapping calls
#[derive(Clone)]
pub struct MapConfig {
    value_converters: HashMap<TypeKey, ValueConverterFn>,
    context_converters: HashMap<TypeKey, ContextConverterFn>,
    static_ignores: HashMap<String, BTreeSet<String>>,
    conditional_ignores: HashMap<String, IgnorePredicate>,
    null_handling: NullHandling,
    similarity_floor: f64,
    max_depth: usize,
}

impl MapConfig {
    /// Empty config; null source fields abort the call
    pub fn new() -> Self {
        Self {
            value_converters: HashMap::new(),
            context_converters: HashMap::new(),
            static_ignores: HashMap::new(),
            conditional_ignores: HashMap::new(),
            null_handling: NullHandling::ThrowOnNull,
            similarity_floor: DEFAULT_SIMILARITY_FLOOR,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Empty config that tolerates null source fields
    pub fn permissive() -> Self {
        Self::new().with_null_handling(NullHandling::PropagateNull)
    }

    /// Config carrying the settings of a profile
    pub fn from_profile(profile: &MapProfile) -> Self {
        let mut config = Self::new();
        if let Some(null_handling) = profile.null_handling {
            config = config.with_null_handling(null_handling);
        }
        if let Some(floor) = profile.similarity_floor {
            config = config.with_similarity_floor(floor);
        }
        if let Some(depth) = profile.max_depth {
            config = config.with_max_depth(depth);
        }
        for (type_name, paths) in &profile.ignore {
            for path in paths {
                config = config.ignore(type_name.clone(), path.clone());
            }
        }
        config
    }

    /// Convert every simple source value of type `S` with `converter`
    #[must_use]
    pub fn map_as<S, D>(mut self, converter: impl Fn(S) -> D + Send + Sync + 'static) -> Self
    where
        S: SimpleValue + 'static,
        D: Into<Value> + 'static,
    {
        let convert: ValueConverterFn = Arc::new(move |value: &Value| {
            let source = value.as_scalar().and_then(S::from_scalar)?;
            Some(converter(source).into())
        });
        self.value_converters
            .insert(TypeKey::Simple(S::simple_type()), convert);
        self
    }

    /// Convert every simple source value of type `S` together with a fresh
    /// destination value of type `D`
    #[must_use]
    pub fn map_as_with<S, D>(mut self, converter: impl Fn(S, D) -> D + Send + Sync + 'static) -> Self
    where
        S: SimpleValue + 'static,
        D: SimpleValue + 'static,
    {
        let convert: ContextConverterFn = Arc::new(move |value: &Value, dest: &Value| {
            let source = value.as_scalar().and_then(S::from_scalar)?;
            let dest = dest.as_scalar().and_then(D::from_scalar)?;
            Some(Value::Simple(converter(source, dest).into_scalar()))
        });
        self.context_converters
            .insert(TypeKey::Simple(S::simple_type()), convert);
        self
    }

    /// Convert every object of the named source type
    #[must_use]
    pub fn map_type_as(
        mut self,
        type_name: impl Into<String>,
        converter: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        let convert: ValueConverterFn = Arc::new(move |value: &Value| Some(converter(value)));
        self.value_converters
            .insert(TypeKey::Composite(type_name.into()), convert);
        self
    }

    /// Convert every object of the named source type into a fresh
    /// destination instance
    #[must_use]
    pub fn map_type_as_with(
        mut self,
        type_name: impl Into<String>,
        converter: impl Fn(&Value, ObjectRef) -> ObjectRef + Send + Sync + 'static,
    ) -> Self {
        let convert: ContextConverterFn = Arc::new(move |value: &Value, dest: &Value| {
            let dest = dest.as_object()?.clone();
            Some(Value::Composite(converter(value, dest)))
        });
        self.context_converters
            .insert(TypeKey::Composite(type_name.into()), convert);
        self
    }

    /// Always skip a dot-separated field path when mapping into `type_name`
    #[must_use]
    pub fn ignore(mut self, type_name: impl Into<String>, path: impl Into<String>) -> Self {
        self.static_ignores
            .entry(type_name.into())
            .or_default()
            .insert(path.into());
        self
    }

    /// Skip the fields named by `predicate` when mapping into `type_name`
    ///
    /// Replaces any static ignores for the same type.
    #[must_use]
    pub fn ignore_when(
        mut self,
        type_name: impl Into<String>,
        predicate: impl Fn(&ObjectRef) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.conditional_ignores
            .insert(type_name.into(), Arc::new(predicate));
        self
    }

    #[must_use]
    pub fn with_null_handling(mut self, null_handling: NullHandling) -> Self {
        self.null_handling = null_handling;
        self
    }

    /// Minimum similarity for fuzzy field matches, clamped to `[0, 1]`
    #[must_use]
    pub fn with_similarity_floor(mut self, floor: f64) -> Self {
        self.similarity_floor = if floor.is_nan() { DEFAULT_SIMILARITY_FLOOR } else { floor.clamp(0.0, 1.0) };
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn null_handling(&self) -> NullHandling {
        self.null_handling
    }

    pub fn similarity_floor(&self) -> f64 {
        self.similarity_floor
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn value_converter(&self, key: &TypeKey) -> Option<&ValueConverterFn> {
        self.value_converters.get(key)
    }

    pub fn context_converter(&self, key: &TypeKey) -> Option<&ContextConverterFn> {
        self.context_converters.get(key)
    }

    /// Paths ignored for `type_name` given the live destination instance
    ///
    /// A dynamic rule, when registered, is used alone; static paths are only
    /// consulted for types without one. The engine calls this once per
    /// destination object, before any of its fields are written.
    pub fn ignored_paths(&self, type_name: &str, instance: &ObjectRef) -> Vec<String> {
        if let Some(predicate) = self.conditional_ignores.get(type_name) {
            return predicate(instance);
        }
        self.static_ignores
            .get(type_name)
            .map(|paths| paths.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapConfig")
            .field("value_converters", &self.value_converters.keys().collect::<Vec<_>>())
            .field("context_converters", &self.context_converters.keys().collect::<Vec<_>>())
            .field("static_ignores", &self.static_ignores)
            .field(
                "conditional_ignores",
                &self.conditional_ignores.keys().collect::<Vec<_>>(),
            )
            .field("null_handling", &self.null_handling)
            .field("similarity_floor", &self.similarity_floor)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Whether a rule relative to the destination object names `field` itself
pub fn ignores_field(rules: &[String], field: &str) -> bool {
    rules.iter().any(|rule| rule == field)
}

/// Remainders of the rules that reach below `field`, relative to its value
///
/// `Nested.Child` yields `Child` for the field `Nested`.
pub fn rules_below(rules: &[String], field: &str) -> Vec<String> {
    rules
        .iter()
        .filter_map(|rule| rule.strip_prefix(field)?.strip_prefix('.'))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `candidate` equals `rule`, lies below it, or lies above it
pub fn path_matches(candidate: &str, rule: &str) -> bool {
    fn below(path: &str, ancestor: &str) -> bool {
        path.strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('.'))
    }
    candidate == rule || below(candidate, rule) || below(rule, candidate)
}

/// Serializable, data-only part of a [`MapConfig`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapProfile {
    #[serde(default)]
    pub null_handling: Option<NullHandling>,
    #[serde(default)]
    pub similarity_floor: Option<f64>,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub ignore: BTreeMap<String, Vec<String>>,
}

impl MapProfile {
    /// Parse a profile from YAML
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfile`] if the document does not parse.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::InvalidProfile(format!("YAML parse error: {e}")))
    }

    /// Load a profile from a YAML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::InvalidProfile`] if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmap_ir::{Decimal, Object, SimpleType};

    fn instance() -> ObjectRef {
        Object::new("Dest").with("ShouldIgnore", true).into_ref()
    }

    #[test]
    fn test_path_matching_rule() {
        assert!(path_matches("Name", "Name"));
        assert!(path_matches("Address.Street", "Address"));
        assert!(path_matches("Address", "Address.Street"));
        assert!(!path_matches("AddressLine", "Address"));
        assert!(!path_matches("Address", "AddressLine.Street"));
    }

    #[test]
    fn test_static_ignores() {
        let config = MapConfig::new()
            .ignore("Dest", "Secret")
            .ignore("Dest", "Nested.Child");
        let dest = instance();

        let rules = config.ignored_paths("Dest", &dest);
        assert_eq!(rules, vec!["Nested.Child", "Secret"]);
        assert!(ignores_field(&rules, "Secret"));
        assert!(!ignores_field(&rules, "Nested"));
        assert!(!ignores_field(&rules, "Name"));
        assert!(config.ignored_paths("Other", &dest).is_empty());
    }

    #[test]
    fn test_rules_below_strip_the_field_segment() {
        let rules: Vec<String> = ["Nested.Child", "Nested.Deep.Leaf", "NestedOther.X", "Nested", "Top"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rules_below(&rules, "Nested"), vec!["Child", "Deep.Leaf"]);
        assert!(rules_below(&rules, "Top").is_empty());
        assert!(ignores_field(&rules, "Nested"));
        assert!(!ignores_field(&rules, "Child"));
    }

    #[test]
    fn test_dynamic_ignore_replaces_static() {
        let config = MapConfig::new()
            .ignore("Dest", "Secret")
            .ignore_when("Dest", |dest: &ObjectRef| {
                if dest.get("ShouldIgnore") == Some(Value::from(true)) {
                    vec!["Name".to_string()]
                } else {
                    Vec::new()
                }
            });
        let dest = instance();

        assert_eq!(config.ignored_paths("Dest", &dest), vec!["Name"]);

        dest.set("ShouldIgnore", false);
        assert!(config.ignored_paths("Dest", &dest).is_empty());
    }

    #[test]
    fn test_typed_value_converter() {
        let config = MapConfig::new().map_as(|b: bool| if b { "Yes" } else { "No" });
        let convert = config
            .value_converter(&TypeKey::Simple(SimpleType::Bool))
            .unwrap();
        assert_eq!(convert(&Value::from(true)), Some(Value::from("Yes")));
        assert_eq!(convert(&Value::from(1i32)), None);
    }

    #[test]
    fn test_typed_context_converter() {
        let config = MapConfig::new().map_as_with(|d: Decimal, base: f64| base + d.to_f64());
        let convert = config
            .context_converter(&TypeKey::Simple(SimpleType::Decimal))
            .unwrap();
        let source = Value::from("2.5".parse::<Decimal>().unwrap());
        assert_eq!(convert(&source, &Value::from(1.0f64)), Some(Value::from(3.5f64)));
        assert_eq!(convert(&source, &Value::from("x")), None);
    }

    #[test]
    fn test_defaults() {
        let config = MapConfig::new();
        assert_eq!(config.null_handling(), NullHandling::ThrowOnNull);
        assert!((config.similarity_floor() - DEFAULT_SIMILARITY_FLOOR).abs() < f64::EPSILON);
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(MapConfig::permissive().null_handling(), NullHandling::PropagateNull);
        assert!((MapConfig::new().with_similarity_floor(3.0).similarity_floor() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_profile_from_yaml() {
        let profile = MapProfile::from_yaml(
            "null_handling: substitute_default\nmax_depth: 8\nignore:\n  Dest: [Secret, Nested.Child]\n",
        )
        .unwrap();
        assert_eq!(profile.null_handling, Some(NullHandling::SubstituteDefault));
        assert_eq!(profile.similarity_floor, None);

        let config = MapConfig::from_profile(&profile);
        assert_eq!(config.null_handling(), NullHandling::SubstituteDefault);
        assert_eq!(config.max_depth(), 8);
        assert_eq!(config.ignored_paths("Dest", &instance()), vec!["Nested.Child", "Secret"]);
    }

    #[test]
    fn test_profile_rejects_unknown_policy() {
        assert!(matches!(
            MapProfile::from_yaml("null_handling: sometimes"),
            Err(Error::InvalidProfile(_))
        ));
    }
}

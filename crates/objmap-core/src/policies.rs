//! Null handling and denied type categories

use objmap_ir::{FieldType, HandleKind};
use objmap_schema::TypeDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy applied when a source field is null
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// Abort the whole mapping call
    #[default]
    ThrowOnNull,

    /// Write the destination type's zero value; reference-like fields stay unset
    SubstituteDefault,

    /// Leave the destination field at its constructed default
    PropagateNull,
}

impl FromStr for NullHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "throw_on_null" | "throw" => Ok(Self::ThrowOnNull),
            "substitute_default" | "default" => Ok(Self::SubstituteDefault),
            "propagate_null" | "propagate" | "null" => Ok(Self::PropagateNull),
            other => Err(format!("unknown null handling '{other}'")),
        }
    }
}

impl fmt::Display for NullHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ThrowOnNull => "throw_on_null",
            Self::SubstituteDefault => "substitute_default",
            Self::PropagateNull => "propagate_null",
        })
    }
}

/// Denied category of a declared type, looking through containers
pub fn denied_field_type(field_type: &FieldType) -> Option<HandleKind> {
    field_type.handle_kind()
}

/// Denied category of a registered type itself
pub fn denied_descriptor(descriptor: &TypeDescriptor) -> Option<HandleKind> {
    descriptor.handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmap_ir::SimpleType;

    #[test]
    fn test_default_is_throw_on_null() {
        assert_eq!(NullHandling::default(), NullHandling::ThrowOnNull);
    }

    #[test]
    fn test_parse_and_display() {
        for policy in [
            NullHandling::ThrowOnNull,
            NullHandling::SubstituteDefault,
            NullHandling::PropagateNull,
        ] {
            assert_eq!(policy.to_string().parse::<NullHandling>(), Ok(policy));
        }
        assert_eq!("Propagate-Null".parse(), Ok(NullHandling::PropagateNull));
        assert!("ignore".parse::<NullHandling>().is_err());
    }

    #[test]
    fn test_denied_types() {
        let nested: FieldType = "map<string, list<io>>".parse().unwrap();
        assert_eq!(denied_field_type(&nested), Some(HandleKind::IoHandle));
        assert_eq!(denied_field_type(&FieldType::Simple(SimpleType::I32)), None);

        let launcher = TypeDescriptor::new("Launcher").as_handle(HandleKind::ReflectionEmit);
        assert_eq!(denied_descriptor(&launcher), Some(HandleKind::ReflectionEmit));
    }
}

//! Per-call record of fields that were not written

use objmap_ir::Value;
use std::fmt;

/// Why a field or entry was not written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Named by the call's exclusion list
    Excluded,
    /// Matched a config ignore rule
    Ignored,
    /// No destination field matched at or above the similarity floor
    NoMatch,
    /// No safe conversion between the two simple types
    NoConversion,
    /// Source and destination are different kinds of value
    IncompatibleShape,
    ConverterFailed(String),
    /// Null source value left unwritten by the null policy
    NullValue,
    /// Sequence item or associative entry that could not be mapped
    DroppedEntry,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Excluded => f.write_str("excluded"),
            SkipReason::Ignored => f.write_str("ignored"),
            SkipReason::NoMatch => f.write_str("no matching destination field"),
            SkipReason::NoConversion => f.write_str("no safe conversion"),
            SkipReason::IncompatibleShape => f.write_str("incompatible shape"),
            SkipReason::ConverterFailed(message) => write!(f, "converter failed: {message}"),
            SkipReason::NullValue => f.write_str("null value"),
            SkipReason::DroppedEntry => f.write_str("entry dropped"),
        }
    }
}

/// One field that was left at its destination default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSkipped {
    /// Dot-separated source path, with `[i]` for sequence items and `[key]` for entries
    pub path: String,
    pub reason: SkipReason,
}

impl fmt::Display for FieldSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Mapped value together with the fields that were skipped
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub value: Value,
    pub diagnostics: Vec<FieldSkipped>,
}

impl MapOutcome {
    /// Whether every source field was written
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Reason the given path was skipped, if it was
    pub fn skipped(&self, path: &str) -> Option<&SkipReason> {
        self.diagnostics
            .iter()
            .find(|d| d.path == path)
            .map(|d| &d.reason)
    }
}

//! Process-wide memo of mappable field lists

use crate::model::FieldDescriptor;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::{debug, trace};

/// Mappable field lists keyed by type name
///
/// Population is atomic per key: concurrent first lookups of the same type
/// build the list once and every caller receives the same shared slice.
/// Entries are never invalidated.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: DashMap<String, Arc<[FieldDescriptor]>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<[FieldDescriptor]>> {
        self.entries.get(type_name).map(|entry| Arc::clone(entry.value()))
    }

    /// Cached list for `type_name`, building it with `build` on first use
    pub fn get_or_insert_with(
        &self,
        type_name: &str,
        build: impl FnOnce() -> Vec<FieldDescriptor>,
    ) -> Arc<[FieldDescriptor]> {
        if let Some(hit) = self.get(type_name) {
            trace!("Descriptor cache hit: {}", type_name);
            return hit;
        }

        match self.entries.entry(type_name.to_string()) {
            Entry::Occupied(entry) => {
                trace!("Descriptor cache hit after race: {}", type_name);
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                let fields: Arc<[FieldDescriptor]> = build().into();
                debug!(
                    "Descriptor cache miss: {} ({} mappable fields)",
                    type_name,
                    fields.len()
                );
                entry.insert(Arc::clone(&fields));
                fields
            }
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

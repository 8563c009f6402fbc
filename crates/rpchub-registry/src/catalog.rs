use indexmap::IndexMap;
use rpchub_core::RemoteCall;
use std::sync::Arc;

/// The current set of discovered procedures, keyed by name. A catalog is
/// rebuilt wholesale on each discovery cycle and swapped in as one immutable
/// snapshot; it is never mutated after publication.
#[derive(Default)]
pub struct Catalog {
    calls: IndexMap<String, Arc<dyn RemoteCall>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a call under its own name. A later call with the same name
    /// replaces the earlier one.
    pub fn insert(&mut self, call: Arc<dyn RemoteCall>) {
        self.calls.insert(call.name().to_string(), call);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RemoteCall>> {
        self.calls.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.calls.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RemoteCall>> {
        self.calls.values()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").field("names", &self.calls.keys().collect::<Vec<_>>()).finish()
    }
}

//! Named collections of predicates that the registry can be built from.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::predicate::Predicate;

/// A shared, type-erased predicate.
pub type SharedPredicate<S> = Arc<dyn Predicate<S>>;

/// A named set of predicates, addressed by a location string such as
/// `"world.magic.conditionals"`.
///
/// Exports keep insertion order; adding a name twice replaces the earlier
/// entry in place.
pub struct PredicateModule<S: ?Sized> {
    location: String,
    exports: Vec<(String, SharedPredicate<S>)>,
}

impl<S: ?Sized> fmt::Debug for PredicateModule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateModule")
            .field("location", &self.location)
            .field(
                "exports",
                &self.exports.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<S: ?Sized> PredicateModule<S> {
    /// Create an empty module at the given location.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            exports: Vec::new(),
        }
    }

    /// Export a predicate under `name`.
    #[must_use]
    pub fn with<P>(mut self, name: impl Into<String>, predicate: P) -> Self
    where
        P: Predicate<S> + 'static,
    {
        self.insert(name, Arc::new(predicate));
        self
    }

    /// Export an already shared predicate under `name`.
    pub fn insert(&mut self, name: impl Into<String>, predicate: SharedPredicate<S>) {
        let name = name.into();
        if let Some(slot) = self.exports.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = predicate;
        } else {
            self.exports.push((name, predicate));
        }
    }

    /// The location this module is addressed by.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Enumerate the module's predicates in export order.
    pub fn exports(&self) -> impl Iterator<Item = (&str, &SharedPredicate<S>)> {
        self.exports.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Number of exported predicates.
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// `true` when nothing is exported.
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

/// Every predicate module the process knows about, keyed by location.
pub struct ModuleCatalog<S: ?Sized> {
    modules: HashMap<String, PredicateModule<S>>,
}

impl<S: ?Sized> Default for ModuleCatalog<S> {
    fn default() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for ModuleCatalog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("locations", &self.locations())
            .finish()
    }
}

impl<S: ?Sized> ModuleCatalog<S> {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, replacing any module already at the same location.
    #[must_use]
    pub fn with_module(mut self, module: PredicateModule<S>) -> Self {
        self.register(module);
        self
    }

    /// Add a module, replacing any module already at the same location.
    pub fn register(&mut self, module: PredicateModule<S>) {
        self.modules.insert(module.location.clone(), module);
    }

    /// Look up a module by location.
    pub fn get(&self, location: &str) -> Option<&PredicateModule<S>> {
        self.modules.get(location)
    }

    /// Known locations, sorted.
    pub fn locations(&self) -> Vec<&str> {
        let mut locations: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        locations.sort_unstable();
        locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredicateError;
    use crate::predicate::PredicateArgs;
    use crate::value::Value;

    fn constant(v: bool) -> impl Fn(&(), &(), &PredicateArgs) -> Result<Value, PredicateError> {
        move |_, _, _| Ok(Value::Bool(v))
    }

    #[test]
    fn module_exports_in_insertion_order() {
        let module = PredicateModule::new("world.magic.conditionals")
            .with("has_mana", constant(true))
            .with("knows_spell", constant(false));

        let names: Vec<&str> = module.exports().map(|(n, _)| n).collect();
        assert_eq!(names, ["has_mana", "knows_spell"]);
        assert_eq!(module.location(), "world.magic.conditionals");
        assert_eq!(module.len(), 2);
    }

    #[test]
    fn re_exporting_a_name_replaces_in_place() {
        let module = PredicateModule::new("m")
            .with("a", constant(true))
            .with("b", constant(true))
            .with("a", constant(false));

        let names: Vec<&str> = module.exports().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
        let (_, a) = module.exports().next().unwrap();
        assert_eq!(a.call(&(), &(), &PredicateArgs::new()).unwrap(), Value::Bool(false));
    }

    #[test]
    fn catalog_lookup_and_locations() {
        let catalog = ModuleCatalog::new()
            .with_module(PredicateModule::<()>::new("z.mod"))
            .with_module(PredicateModule::new("a.mod").with("f", constant(true)));

        assert_eq!(catalog.locations(), ["a.mod", "z.mod"]);
        assert_eq!(catalog.get("a.mod").map(PredicateModule::len), Some(1));
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn debug_lists_export_names() {
        let module = PredicateModule::new("m").with("f", constant(true));
        let debug = format!("{module:?}");
        assert!(debug.contains("\"f\""));
    }
}

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::module::{ModuleCatalog, SharedPredicate};

/// Name → predicate lookup used when compiling rules.
///
/// The registry is built from an ordered list of module locations. Each
/// location's exports are inserted in turn, so a later location overrides an
/// earlier one when both export the same name.
///
/// The first [`resolve`](Self::resolve) builds the table if nothing has yet;
/// concurrent first callers serialize on the write lock and only one of them
/// builds. [`rebuild`](Self::rebuild) swaps in a fresh table and is meant for
/// maintenance, not for use while other threads depend on a stable view.
pub struct PredicateRegistry<S: ?Sized> {
    catalog: ModuleCatalog<S>,
    locations: RwLock<Vec<String>>,
    entries: RwLock<Option<HashMap<String, SharedPredicate<S>>>>,
    generation: AtomicUsize,
}

impl<S: ?Sized> fmt::Debug for PredicateRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("locations", &*self.locations.read())
            .field("generation", &self.generation())
            .field("predicate_count", &self.len())
            .finish_non_exhaustive()
    }
}

impl<S: ?Sized> PredicateRegistry<S> {
    /// Create an unbuilt registry over `catalog` that will load `locations`
    /// in order.
    pub fn new<I, L>(catalog: ModuleCatalog<S>, locations: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            catalog,
            locations: RwLock::new(locations.into_iter().map(Into::into).collect()),
            entries: RwLock::new(None),
            generation: AtomicUsize::new(0),
        }
    }

    /// Create an unbuilt registry using the module list from configuration.
    pub fn from_config(catalog: ModuleCatalog<S>, config: &RegistryConfig) -> Self {
        Self::new(catalog, config.modules.iter().cloned())
    }

    /// Rebuild the lookup table from the configured locations.
    ///
    /// Returns the number of distinct predicate names now resolvable.
    pub fn rebuild(&self) -> usize {
        let table = self.build_table(&self.locations.read());
        let count = table.len();
        *self.entries.write() = Some(table);
        self.generation.fetch_add(1, Ordering::Relaxed);
        count
    }

    /// Replace the configured locations and rebuild.
    pub fn rebuild_from<I, L>(&self, locations: I) -> usize
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        *self.locations.write() = locations.into_iter().map(Into::into).collect();
        self.rebuild()
    }

    /// Look up a predicate by name, building the table on first use.
    pub fn resolve(&self, name: &str) -> Option<SharedPredicate<S>> {
        {
            let entries = self.entries.read();
            if let Some(table) = entries.as_ref() {
                return table.get(name).cloned();
            }
        }
        self.ensure_built();
        self.entries
            .read()
            .as_ref()
            .and_then(|table| table.get(name).cloned())
    }

    /// `true` when `name` resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// `true` once the table has been built at least once.
    pub fn is_built(&self) -> bool {
        self.entries.read().is_some()
    }

    /// Resolvable predicate names, sorted. Builds the table if needed.
    pub fn names(&self) -> Vec<String> {
        self.ensure_built();
        let entries = self.entries.read();
        let mut names: Vec<String> = entries
            .as_ref()
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Number of resolvable names; zero while unbuilt.
    pub fn len(&self) -> usize {
        self.entries.read().as_ref().map_or(0, HashMap::len)
    }

    /// `true` when no name resolves (or the table is unbuilt).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times the table has been built, counting rebuilds.
    pub fn generation(&self) -> usize {
        self.generation.load(Ordering::Relaxed)
    }

    /// The configured module locations, in load order.
    pub fn locations(&self) -> Vec<String> {
        self.locations.read().clone()
    }

    fn ensure_built(&self) {
        let mut entries = self.entries.write();
        if entries.is_none() {
            *entries = Some(self.build_table(&self.locations.read()));
            self.generation.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn build_table(&self, locations: &[String]) -> HashMap<String, SharedPredicate<S>> {
        let mut table = HashMap::new();
        for location in locations {
            let Some(module) = self.catalog.get(location) else {
                warn!(location = %location, "predicate module location is not known; skipping");
                continue;
            };
            for (name, predicate) in module.exports() {
                if table.insert(name.to_owned(), predicate.clone()).is_some() {
                    debug!(
                        predicate = %name,
                        location = %location,
                        "predicate overridden by later module"
                    );
                }
            }
        }
        info!(
            modules = locations.len(),
            predicates = table.len(),
            "built predicate registry"
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use super::*;
    use crate::error::PredicateError;
    use crate::module::PredicateModule;
    use crate::predicate::PredicateArgs;
    use crate::value::Value;

    fn constant(
        v: &'static str,
    ) -> impl Fn(&(), &(), &PredicateArgs) -> Result<Value, PredicateError> {
        move |_, _, _| Ok(Value::from(v))
    }

    fn catalog() -> ModuleCatalog<()> {
        ModuleCatalog::new()
            .with_module(
                PredicateModule::new("base")
                    .with("has_mana", constant("base"))
                    .with("is_hidden", constant("base")),
            )
            .with_module(PredicateModule::new("override").with("has_mana", constant("override")))
    }

    fn call(registry: &PredicateRegistry<()>, name: &str) -> Value {
        registry
            .resolve(name)
            .unwrap()
            .call(&(), &(), &PredicateArgs::new())
            .unwrap()
    }

    #[test]
    fn starts_unbuilt_and_builds_on_first_resolve() {
        let registry = PredicateRegistry::new(catalog(), ["base"]);
        assert!(!registry.is_built());
        assert_eq!(registry.len(), 0);

        assert!(registry.resolve("has_mana").is_some());
        assert!(registry.is_built());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn later_locations_override_earlier() {
        let registry = PredicateRegistry::new(catalog(), ["base", "override"]);
        assert_eq!(call(&registry, "has_mana"), Value::from("override"));
        assert_eq!(call(&registry, "is_hidden"), Value::from("base"));

        let reversed = PredicateRegistry::new(catalog(), ["override", "base"]);
        assert_eq!(call(&reversed, "has_mana"), Value::from("base"));
    }

    #[test]
    fn unknown_locations_are_skipped() {
        let registry = PredicateRegistry::new(catalog(), ["nowhere", "base"]);
        assert_eq!(registry.rebuild(), 2);
        assert!(registry.contains("is_hidden"));
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let registry = PredicateRegistry::new(catalog(), ["base"]);
        assert!(registry.resolve("unknown_fn").is_none());
        assert!(!registry.contains("unknown_fn"));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let registry = PredicateRegistry::new(catalog(), ["base", "override"]);
        assert_eq!(registry.rebuild(), 2);
        assert_eq!(registry.rebuild(), 2);
        assert_eq!(registry.names(), ["has_mana", "is_hidden"]);
    }

    #[test]
    fn rebuild_from_replaces_locations() {
        let registry = PredicateRegistry::new(catalog(), ["base"]);
        assert_eq!(registry.rebuild_from(["override"]), 1);
        assert_eq!(registry.locations(), ["override"]);
        assert!(!registry.contains("is_hidden"));
        assert_eq!(call(&registry, "has_mana"), Value::from("override"));
    }

    #[test]
    fn empty_location_list_builds_empty_table() {
        let registry = PredicateRegistry::new(catalog(), Vec::<String>::new());
        assert!(registry.resolve("has_mana").is_none());
        assert!(registry.is_built());
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_first_resolve_builds_once() {
        let registry = Arc::new(PredicateRegistry::new(catalog(), ["base"]));
        let start = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let start = Arc::clone(&start);
                std::thread::spawn(move || {
                    start.wait();
                    registry.resolve("has_mana").is_some()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        assert_eq!(registry.generation(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn generation_counts_builds() {
        let registry = PredicateRegistry::new(catalog(), ["base"]);
        assert_eq!(registry.generation(), 0);
        registry.resolve("has_mana");
        registry.resolve("is_hidden");
        assert_eq!(registry.generation(), 1);
        registry.rebuild();
        registry.rebuild_from(["override"]);
        assert_eq!(registry.generation(), 3);
    }

    #[test]
    fn from_config_uses_module_list() {
        let config = RegistryConfig {
            modules: vec!["base".into(), "override".into()],
        };
        let registry = PredicateRegistry::from_config(catalog(), &config);
        assert_eq!(registry.locations(), ["base", "override"]);
        assert_eq!(call(&registry, "has_mana"), Value::from("override"));
    }
}

//! Stand-in predicates for linting and fixture runs.

use std::sync::Arc;

use serde::Deserialize;

use gatekeep_core::{
    ModuleCatalog, PredicateArgs, PredicateError, PredicateModule, PredicateRegistry, Value,
};

/// Subjects handed to stub predicates.
pub type Subject = serde_json::Value;

/// Module location the stubs are registered under.
pub const STUB_MODULE: &str = "gatekeep.stubs";

/// What a stub predicate returns.
///
/// `{ actor: "/json/pointer" }` and `{ target: "/json/pointer" }` read from
/// the subject; any other value is returned as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PredicateStub {
    Actor { actor: String },
    Target { target: String },
    Constant(serde_json::Value),
}

impl PredicateStub {
    /// A stub that always passes.
    pub fn pass() -> Self {
        Self::Constant(serde_json::Value::Bool(true))
    }

    fn respond(&self, actor: &Subject, target: &Subject) -> Value {
        let found = match self {
            Self::Actor { actor: pointer } => actor.pointer(pointer).cloned(),
            Self::Target { target: pointer } => target.pointer(pointer).cloned(),
            Self::Constant(value) => Some(value.clone()),
        };
        found.map_or(Value::Null, Value::from_json)
    }
}

/// Build a registry exporting one stub per name.
pub fn stub_registry<I, N>(stubs: I) -> PredicateRegistry<Subject>
where
    I: IntoIterator<Item = (N, PredicateStub)>,
    N: Into<String>,
{
    let mut module = PredicateModule::new(STUB_MODULE);
    for (name, stub) in stubs {
        let respond = move |actor: &Subject, target: &Subject, _: &PredicateArgs| {
            Ok::<_, PredicateError>(stub.respond(actor, target))
        };
        module.insert(name, Arc::new(respond));
    }
    PredicateRegistry::new(ModuleCatalog::new().with_module(module), [STUB_MODULE])
}

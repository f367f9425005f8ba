//! Shared building blocks for gatekeep rule evaluation.
//!
//! Rules reference predicates by name. This crate defines what a predicate
//! is, how predicates are grouped into modules, and the registry that turns a
//! configured list of module locations into a name lookup.

pub mod config;
pub mod error;
pub mod module;
pub mod predicate;
pub mod registry;
pub mod value;

pub use config::{GatekeepConfig, MissingColonPolicy, ParserSettings, RegistryConfig, WarningConfig};
pub use error::{ConfigError, PredicateError};
pub use module::{ModuleCatalog, PredicateModule, SharedPredicate};
pub use predicate::{Predicate, PredicateArgs};
pub use registry::PredicateRegistry;
pub use value::Value;

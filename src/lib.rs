//! javabind: generate type-safe Java interface bindings from Python static
//! type information.
//!
//! The heavy lifting lives in the workspace crates — `javabind-core` (symbol
//! and type models, registry, tracker, configuration) and `javabind-java`
//! (identifier derivation, type resolution, source synthesis). This crate
//! adds the run-level pieces: the oracle client, the multi-round pipeline,
//! export writers and the CLI.

// Core infrastructure - re-exported from the workspace crates
pub use javabind_core::config;
pub use javabind_core::error;
pub use javabind_core::properties;
pub use javabind_core::pytype;
pub use javabind_core::registry;
pub use javabind_core::symbols;
pub use javabind_core::tracker;
pub use javabind_java::synth;

// Run-level components
pub mod cli;
pub mod export;
pub mod oracle;
pub mod pipeline;

//! Core infrastructure for javabind: the Python symbol and type models, the
//! shared type registry, unresolved-type tracking, configuration, and
//! scoped property resolution.
//!
//! Everything here is language-target-agnostic; the Java side lives in
//! `javabind-java`. The registry and tracker are explicit context objects
//! owned by the pipeline for the duration of one generation run — there are
//! no process-wide singletons, and concurrent runs over one registry are
//! not supported.

pub mod config;
pub mod error;
pub mod properties;
pub mod pytype;
pub mod registry;
pub mod symbols;
pub mod tracker;

pub use config::{Config, ConfigError, ConfigResult, FileEntry, PropertyMap};
pub use error::{ExitStatus, JavabindError, JavabindResult};
pub use pytype::{ArgKind, CallableParam, LiteralValue, PyType, TypedDictField};
pub use registry::{JavaMapping, MappingOrigin, TypeRegistry};
pub use symbols::{
    ArgumentDef, ClassDef, DecoratedDef, Definition, FuncDef, OverloadedFuncDef, TypeAliasDef,
    TypeVarExprDef, TypedModule, VarDef,
};
pub use tracker::{EligibilityRoot, RecordOutcome, UnresolvedTracker};

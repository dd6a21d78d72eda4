//! Java language support for javabind: identifier derivation, Java type
//! descriptors, Python-to-Java type resolution, and source synthesis.
//!
//! The entry point is [`synth::Synthesizer`], which walks a typed module and
//! produces generated files plus per-declaration skip diagnostics. The
//! resolver and synthesizer borrow the shared [`TypeRegistry`] owned by the
//! pipeline; they never own cross-round state themselves.
//!
//! [`TypeRegistry`]: javabind_core::registry::TypeRegistry

pub mod builder;
pub mod context;
pub mod jtype;
pub mod names;
pub mod resolver;
pub mod synth;

pub use jtype::JavaType;
pub use resolver::{ResolveError, TypeResolver};
pub use synth::{GeneratedFile, Skipped, SynthError, SynthOutput, Synthesizer};

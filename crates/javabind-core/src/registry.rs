//! Python-to-Java type registry.
//!
//! The registry is the single shared mapping from Python fully-qualified
//! type names to their chosen Java fully-qualified names. One instance is
//! created per generation run and threaded explicitly through the pipeline —
//! it is deliberately not a process-wide singleton, so independent runs and
//! tests cannot bleed registrations into each other.
//!
//! Lifecycle:
//!
//! 1. Seeded with the builtin mappings at construction.
//! 2. Extended with configured type-mapping overrides.
//! 3. Extended as modules are processed: every generated interface registers
//!    itself, which is what lets a forward reference recorded in round N be
//!    resolved by a registration made in an earlier round.
//!
//! Lookups that miss are recorded on the side; the unresolved-type tracker
//! drains the miss list after each round to decide which additional files to
//! pull in. All internal maps are ordered so iteration — and therefore
//! generated output — is reproducible across runs.
//!
//! Not safe for concurrent synthesis runs without external synchronization;
//! the generator is single-threaded by design.

use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Mappings
// ============================================================================

/// Where a registry entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingOrigin {
    /// Seeded builtin (`builtins.int` and friends).
    Builtin,
    /// Supplied by configuration type-mapping overrides.
    Config,
    /// Registered by the generator for an emitted interface.
    Generated,
}

/// A single Python-FQN → Java-FQN mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaMapping {
    /// Target Java fully-qualified name, e.g. `java.lang.String`. Primitive
    /// targets are spelled as their keyword (`long`, `double`, `boolean`).
    pub java_fqn: String,
    pub origin: MappingOrigin,
}

// ============================================================================
// Registry
// ============================================================================

/// Shared Python-to-Java type mapping for one generation run.
#[derive(Debug)]
pub struct TypeRegistry {
    entries: BTreeMap<String, JavaMapping>,
    misses: BTreeSet<String>,
}

impl TypeRegistry {
    /// Create a registry seeded with the builtin mappings.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            entries: BTreeMap::new(),
            misses: BTreeSet::new(),
        };
        for (py, java) in BUILTIN_MAPPINGS {
            registry.entries.insert(
                (*py).to_string(),
                JavaMapping {
                    java_fqn: (*java).to_string(),
                    origin: MappingOrigin::Builtin,
                },
            );
        }
        registry
    }

    /// Register a mapping. Later registrations win; a resolved name is
    /// removed from the miss list.
    pub fn register(
        &mut self,
        python_fqn: impl Into<String>,
        java_fqn: impl Into<String>,
        origin: MappingOrigin,
    ) {
        let python_fqn = python_fqn.into();
        self.misses.remove(&python_fqn);
        self.entries.insert(
            python_fqn,
            JavaMapping {
                java_fqn: java_fqn.into(),
                origin,
            },
        );
    }

    /// Look up a mapping without recording a miss.
    pub fn lookup(&self, python_fqn: &str) -> Option<&JavaMapping> {
        self.entries.get(python_fqn)
    }

    /// Look up a mapping, recording the name as a miss when absent.
    pub fn lookup_or_miss(&mut self, python_fqn: &str) -> Option<JavaMapping> {
        match self.entries.get(python_fqn) {
            Some(mapping) => Some(mapping.clone()),
            None => {
                self.misses.insert(python_fqn.to_string());
                None
            }
        }
    }

    /// True when the name has a registered mapping.
    pub fn contains(&self, python_fqn: &str) -> bool {
        self.entries.contains_key(python_fqn)
    }

    /// Drain the accumulated misses, sorted by name.
    pub fn take_misses(&mut self) -> Vec<String> {
        std::mem::take(&mut self.misses).into_iter().collect()
    }

    /// Names currently recorded as misses, sorted.
    pub fn misses(&self) -> impl Iterator<Item = &str> {
        self.misses.iter().map(String::as_str)
    }

    /// All entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &JavaMapping)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries registered for generated interfaces, in name order.
    pub fn generated_entries(&self) -> impl Iterator<Item = (&str, &JavaMapping)> {
        self.entries()
            .filter(|(_, m)| m.origin == MappingOrigin::Generated)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new()
    }
}

/// Builtin seed mappings.
///
/// `builtins.complex` is intentionally absent: it is registry-configurable
/// and defaults to the opaque value type when no override is supplied.
const BUILTIN_MAPPINGS: &[(&str, &str)] = &[
    ("builtins.int", "int"),
    ("builtins.float", "double"),
    ("builtins.bool", "boolean"),
    ("builtins.str", "java.lang.String"),
    ("builtins.bytes", "byte[]"),
    ("builtins.object", "java.lang.Object"),
    ("builtins.list", "java.util.List"),
    ("builtins.dict", "java.util.Map"),
    ("builtins.set", "java.util.Set"),
    ("builtins.BaseException", "java.lang.RuntimeException"),
];

// ============================================================================
// Tests
// ============================================================================

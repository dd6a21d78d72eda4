//! Python-to-Java type resolution.
//!
//! [`TypeResolver::resolve`] maps a [`PyType`] to the [`JavaType`] the
//! synthesizer emits. Nominal types go through the shared registry; a miss
//! is recorded there and resolves to the opaque [`JavaType::Value`]
//! placeholder so synthesis can proceed — the owning file is regenerated on
//! a later round once the defining module has been processed, never patched
//! in place.
//!
//! Unions resolve either to `Optional<T>` (exactly `{T, None}`) or to a
//! discriminated-union value type collected in [`SynthesizedTypes`] — one
//! per distinct alternative set per generation scope, case accessors ordered
//! alphabetically by generated field name. Two alternatives lower-camel-casing
//! to the same field name is a hard per-declaration error; nothing is
//! silently overwritten.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use javabind_core::pytype::{ArgKind, PyType};
use javabind_core::registry::TypeRegistry;

use crate::jtype::JavaType;
use crate::names::{self, NameKind};

// ============================================================================
// Error Types
// ============================================================================

/// Per-declaration resolution failures. These become skip-with-diagnostic
/// entries, never a run-level abort.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The resolver has no Java representation for the construct.
    #[error("unsupported construct: {construct}")]
    Unsupported { construct: String },

    /// Two union alternatives produce the same generated field name.
    #[error("field name collision in union {union}: '{field}'")]
    FieldCollision { union: String, field: String },
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

// ============================================================================
// Resolution Notes
// ============================================================================

/// Names that missed the registry while resolving one declaration.
#[derive(Debug, Default)]
pub struct ResolutionNotes {
    /// Missing names; the placeholder descriptor was used for these.
    pub misses: BTreeSet<String>,
    /// Subset of `misses` that can no longer be resolved by pulling in
    /// files. A declaration touching one of these is skipped.
    pub dead: BTreeSet<String>,
}

impl ResolutionNotes {
    pub fn new() -> Self {
        ResolutionNotes::default()
    }

    /// True when every touched name either resolved or is still pending.
    pub fn is_terminal(&self) -> bool {
        !self.dead.is_empty()
    }
}

// ============================================================================
// Synthesized Union Shapes
// ============================================================================

/// One case of a discriminated-union value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionCase {
    /// Generated field name (lower camel case, keyword-escaped).
    pub field: String,
    /// Resolved payload type.
    pub ty: JavaType,
}

/// The shape of a discriminated-union value type to synthesize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionShape {
    /// Generated type name, derived from the alternative set.
    pub name: String,
    /// Cases sorted alphabetically by field name.
    pub cases: Vec<UnionCase>,
    /// True when `None` is among the alternatives.
    pub has_none: bool,
}

/// Union shapes collected while resolving one generation scope. Keyed by
/// generated name, which is itself derived from the alternative set, so a
/// shape is synthesized once and reused across call sites.
#[derive(Debug, Default)]
pub struct SynthesizedTypes {
    unions: BTreeMap<String, UnionShape>,
}

impl SynthesizedTypes {
    pub fn new() -> Self {
        SynthesizedTypes::default()
    }

    /// Shapes in name order.
    pub fn unions(&self) -> impl Iterator<Item = &UnionShape> {
        self.unions.values()
    }

    pub fn is_empty(&self) -> bool {
        self.unions.is_empty()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Maps Python types onto Java types against the shared registry.
pub struct TypeResolver<'a> {
    registry: &'a mut TypeRegistry,
    /// Names known to be unresolvable (snapshot from the tracker).
    dead_ends: &'a BTreeSet<String>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(registry: &'a mut TypeRegistry, dead_ends: &'a BTreeSet<String>) -> Self {
        TypeResolver {
            registry,
            dead_ends,
        }
    }

    /// Resolve a Python type.
    ///
    /// `owner_fqn` is the fully-qualified name of the generated type whose
    /// scope collects synthesized unions; union references render nested
    /// under it.
    pub fn resolve(
        &mut self,
        ty: &PyType,
        owner_fqn: &str,
        synthesized: &mut SynthesizedTypes,
        notes: &mut ResolutionNotes,
    ) -> ResolveResult<JavaType> {
        match ty.proper() {
            PyType::Any => Ok(JavaType::Value),
            PyType::None => Ok(JavaType::Void),
            PyType::Instance { fqn, args } => self.resolve_nominal(fqn, args, owner_fqn, synthesized, notes),
            PyType::Unknown { name } => self.resolve_nominal(name, &[], owner_fqn, synthesized, notes),
            PyType::Union { .. } => self.resolve_union(ty, owner_fqn, synthesized, notes),
            PyType::Literal { fallback, .. } => {
                self.resolve(fallback, owner_fqn, synthesized, notes)
            }
            PyType::Tuple { elements } => self.resolve_tuple(elements, owner_fqn, synthesized, notes),
            PyType::TypedDict { name, fields: _ } => match name {
                Some(fqn) => self.resolve_nominal(fqn, &[], owner_fqn, synthesized, notes),
                None => Ok(JavaType::generic(
                    "java.util.Map",
                    vec![JavaType::string(), JavaType::object()],
                )),
            },
            PyType::Callable { params, returns } => {
                self.resolve_callable(params, returns, owner_fqn, synthesized, notes)
            }
            PyType::Overloaded { .. } => Ok(JavaType::Value),
            PyType::TypeVar { bound, .. } => match bound {
                Some(bound) => self.resolve(bound, owner_fqn, synthesized, notes),
                None => Ok(JavaType::object()),
            },
            PyType::ParamSpec { name } => Err(ResolveError::Unsupported {
                construct: format!("ParamSpec '{name}' outside a callable"),
            }),
            PyType::Parameters { .. } => Err(ResolveError::Unsupported {
                construct: "bare parameter list".to_string(),
            }),
            // proper() collapsed the alias already.
            PyType::Alias { name, .. } => Err(ResolveError::Unsupported {
                construct: format!("unresolved alias '{name}'"),
            }),
        }
    }

    /// Resolve in argument position: `None`-typed arguments carry the
    /// opaque value wrapper rather than `void`.
    pub fn resolve_argument(
        &mut self,
        ty: &PyType,
        owner_fqn: &str,
        synthesized: &mut SynthesizedTypes,
        notes: &mut ResolutionNotes,
    ) -> ResolveResult<JavaType> {
        let resolved = self.resolve(ty, owner_fqn, synthesized, notes)?;
        Ok(if resolved.is_void() {
            JavaType::Value
        } else {
            resolved
        })
    }

    fn resolve_nominal(
        &mut self,
        fqn: &str,
        args: &[PyType],
        owner_fqn: &str,
        synthesized: &mut SynthesizedTypes,
        notes: &mut ResolutionNotes,
    ) -> ResolveResult<JavaType> {
        // Builtin numeric/textual/boolean fast path; complex stays
        // registry-configurable.
        match fqn {
            "builtins.int" => return Ok(JavaType::from_fqn("int")),
            "builtins.float" => return Ok(JavaType::from_fqn("double")),
            "builtins.bool" => return Ok(JavaType::from_fqn("boolean")),
            "builtins.str" => return Ok(JavaType::string()),
            _ => {}
        }

        match self.registry.lookup_or_miss(fqn) {
            Some(mapping) => {
                let base = JavaType::from_fqn(&mapping.java_fqn);
                if args.is_empty() {
                    return Ok(base);
                }
                match base {
                    JavaType::Declared { fqn: java_fqn, .. } => {
                        let mut resolved_args = Vec::with_capacity(args.len());
                        for arg in args {
                            resolved_args
                                .push(self.resolve(arg, owner_fqn, synthesized, notes)?.boxed());
                        }
                        Ok(JavaType::generic(java_fqn, resolved_args))
                    }
                    // Generic arguments on a primitive mapping are dropped.
                    other => Ok(other),
                }
            }
            None => {
                notes.misses.insert(fqn.to_string());
                if self.dead_ends.contains(fqn) {
                    notes.dead.insert(fqn.to_string());
                }
                Ok(JavaType::Value)
            }
        }
    }

    fn resolve_union(
        &mut self,
        ty: &PyType,
        owner_fqn: &str,
        synthesized: &mut SynthesizedTypes,
        notes: &mut ResolutionNotes,
    ) -> ResolveResult<JavaType> {
        if let Some(inner) = ty.as_optional() {
            let resolved = self.resolve(inner, owner_fqn, synthesized, notes)?;
            return Ok(JavaType::optional(resolved));
        }

        let members = match ty.proper() {
            PyType::Union { members } => members,
            _ => unreachable!("resolve_union called on non-union"),
        };

        let mut has_none = false;
        let mut cases = Vec::new();
        let mut simple_names = Vec::new();
        for member in members {
            let member = member.proper();
            if member.is_none_type() {
                has_none = true;
                continue;
            }
            let simple = union_case_source_name(member)?;
            let field = names::union_case_field(&simple);
            let resolved = self.resolve(member, owner_fqn, synthesized, notes)?;
            cases.push(UnionCase {
                field,
                ty: resolved,
            });
            simple_names.push(simple);
        }

        cases.sort_by(|a, b| a.field.cmp(&b.field));
        if let Some(duplicate) =
            names::find_duplicate(cases.iter().map(|c| c.field.as_str()))
        {
            return Err(ResolveError::FieldCollision {
                union: union_type_name(&simple_names, has_none),
                field: duplicate.to_string(),
            });
        }

        let name = union_type_name(&simple_names, has_none);
        let shape = UnionShape {
            name: name.clone(),
            cases,
            has_none,
        };
        synthesized.unions.entry(name.clone()).or_insert(shape);
        Ok(JavaType::declared(format!("{owner_fqn}.{name}")))
    }

    fn resolve_tuple(
        &mut self,
        elements: &[PyType],
        owner_fqn: &str,
        synthesized: &mut SynthesizedTypes,
        notes: &mut ResolutionNotes,
    ) -> ResolveResult<JavaType> {
        if elements.is_empty() {
            return Ok(JavaType::Array(Box::new(JavaType::object())));
        }
        let mut resolved = Vec::with_capacity(elements.len());
        for element in elements {
            resolved.push(self.resolve_argument(element, owner_fqn, synthesized, notes)?);
        }
        let homogeneous = resolved.windows(2).all(|pair| pair[0] == pair[1]);
        let element = if homogeneous {
            resolved.into_iter().next().expect("non-empty")
        } else {
            JavaType::object()
        };
        Ok(JavaType::Array(Box::new(element)))
    }

    fn resolve_callable(
        &mut self,
        params: &[javabind_core::pytype::CallableParam],
        returns: &PyType,
        owner_fqn: &str,
        synthesized: &mut SynthesizedTypes,
        notes: &mut ResolutionNotes,
    ) -> ResolveResult<JavaType> {
        // Variadic and keyword-carrying callables have no standard
        // functional-interface shape; pass the callable through opaquely.
        let plain = params.iter().all(|p| {
            matches!(p.kind, ArgKind::Positional | ArgKind::Optional | ArgKind::Named)
        });
        if !plain || params.len() > 2 {
            return Ok(JavaType::Value);
        }

        let mut arg_types = Vec::with_capacity(params.len());
        for param in params {
            arg_types.push(
                self.resolve_argument(&param.ty, owner_fqn, synthesized, notes)?
                    .boxed(),
            );
        }
        let ret = self.resolve(returns, owner_fqn, synthesized, notes)?;

        let ty = if ret.is_void() {
            match arg_types.len() {
                0 => JavaType::declared("java.lang.Runnable"),
                1 => JavaType::generic("java.util.function.Consumer", arg_types),
                _ => JavaType::generic("java.util.function.BiConsumer", arg_types),
            }
        } else {
            let ret = ret.boxed();
            match arg_types.len() {
                0 => JavaType::generic("java.util.function.Supplier", vec![ret]),
                1 => {
                    arg_types.push(ret);
                    JavaType::generic("java.util.function.Function", arg_types)
                }
                _ => {
                    arg_types.push(ret);
                    JavaType::generic("java.util.function.BiFunction", arg_types)
                }
            }
        };
        Ok(ty)
    }
}

// ============================================================================
// Union Naming
// ============================================================================

/// Source name a union case is derived from: the alternative's nominal
/// simple name (a literal contributes its fallback's name).
fn union_case_source_name(member: &PyType) -> ResolveResult<String> {
    match member.proper() {
        PyType::Instance { .. } | PyType::Unknown { .. } => Ok(member
            .simple_name()
            .expect("nominal types have a simple name")
            .to_string()),
        PyType::Literal { fallback, .. } => union_case_source_name(fallback),
        PyType::TypedDict {
            name: Some(fqn), ..
        } => Ok(fqn.rsplit('.').next().unwrap_or(fqn).to_string()),
        other => Err(ResolveError::Unsupported {
            construct: format!("union alternative without a nominal name: {other:?}"),
        }),
    }
}

/// Generated type name for a union shape, stable for a given alternative
/// set: pascal-cased simple names sorted by their generated field name,
/// joined with `Or`, with a trailing `OrNone` for optional alternatives.
fn union_type_name(simple_names: &[String], has_none: bool) -> String {
    let mut parts: Vec<(String, String)> = simple_names
        .iter()
        .map(|simple| {
            (
                names::union_case_field(simple),
                names::to_java(simple, NameKind::Type),
            )
        })
        .collect();
    parts.sort();
    let mut name = parts
        .into_iter()
        .map(|(_, pascal)| pascal)
        .collect::<Vec<_>>()
        .join("Or");
    if has_none {
        name.push_str("OrNone");
    }
    name
}

// ============================================================================
// Tests
// ============================================================================

//! Python type model.
//!
//! This module defines [`PyType`], the closed tagged representation of a
//! Python type expression as delivered by the type-analysis oracle. The
//! variants cover everything the generator resolves: nominal instances,
//! unions, literals, tuples, typed dicts, callables and overloads, type
//! variables, and parameter specifications.
//!
//! Two properties are load-bearing for the rest of the pipeline:
//!
//! - **Closed set**: there is no "throw on unknown type name" path. A type
//!   the oracle cannot classify arrives as [`PyType::Unknown`], which the
//!   resolver treats as a registry miss rather than a fatal error. This is
//!   what keeps the multi-round resolution loop non-fatal.
//! - **At most one alias hop**: a type reference is either a proper type or
//!   an [`PyType::Alias`] whose target is a proper type. [`PyType::proper`]
//!   collapses the indirection; nothing downstream needs to loop.
//!
//! The model is serializable so oracle output and analysis caches are plain
//! JSON documents.

use serde::{Deserialize, Serialize};

// ============================================================================
// Argument Kinds
// ============================================================================

/// Kind of a callable parameter.
///
/// Mirrors the argument-kind classification of the Python type checker.
/// The kind decides where an argument surfaces in generated Java: required
/// positional arguments stay in the primary method signature, everything
/// with a default or keyword-only calling convention moves into the
/// generated keyword-arguments aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    /// Required positional parameter.
    Positional,
    /// Positional parameter with a default value.
    Optional,
    /// Variadic positional parameter (`*args`).
    Star,
    /// Required keyword-only parameter.
    Named,
    /// Variadic keyword parameter (`**kwargs`).
    DoubleStar,
    /// Keyword-only parameter with a default value.
    NamedOptional,
}

impl ArgKind {
    /// True for kinds that appear in the primary generated method signature.
    pub fn in_primary_signature(&self) -> bool {
        matches!(self, ArgKind::Positional | ArgKind::Star)
    }

    /// True for kinds collected into the keyword-arguments aggregate.
    pub fn in_keyword_aggregate(&self) -> bool {
        matches!(
            self,
            ArgKind::Optional | ArgKind::Named | ArgKind::DoubleStar | ArgKind::NamedOptional
        )
    }
}

// ============================================================================
// Literal Values
// ============================================================================

/// Native value carried by a `Literal[...]` type.
///
/// Python restricts literal types to ints, strings, bools, bytes and enum
/// members; the oracle delivers the first three and falls back to the
/// nominal type for the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralValue {
    Int(i64),
    Str(String),
    Bool(bool),
}

// ============================================================================
// Supporting Structs
// ============================================================================

/// A single parameter of a callable type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableParam {
    /// Parameter name. Absent for positional-only parameters of bare
    /// callable types such as `Callable[[int], str]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Argument kind.
    pub kind: ArgKind,
    /// Annotated type.
    pub ty: PyType,
}

impl CallableParam {
    /// Create a named parameter.
    pub fn new(name: impl Into<String>, kind: ArgKind, ty: PyType) -> Self {
        CallableParam {
            name: Some(name.into()),
            kind,
            ty,
        }
    }

    /// Create an unnamed positional parameter.
    pub fn positional(ty: PyType) -> Self {
        CallableParam {
            name: None,
            kind: ArgKind::Positional,
            ty,
        }
    }
}

/// One key of a typed dict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDictField {
    pub name: String,
    pub ty: PyType,
    /// True when the key is in the dict's required-key subset.
    pub required: bool,
}

// ============================================================================
// PyType
// ============================================================================

/// A Python type expression.
///
/// # Examples
///
/// ```
/// use javabind_core::pytype::PyType;
///
/// // Optional[str] arrives as Union[str, None]
/// let opt = PyType::optional(PyType::instance("builtins.str"));
/// assert!(opt.as_optional().is_some());
///
/// // list[int]
/// let list_int = PyType::instance_with_args(
///     "builtins.list",
///     vec![PyType::instance("builtins.int")],
/// );
/// assert_eq!(list_int.proper(), &list_int);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PyType {
    /// `typing.Any`, or an unannotated slot.
    Any,
    /// The `None` type.
    None,
    /// A nominal type, possibly generic.
    Instance {
        /// Fully-qualified dotted name, e.g. `builtins.str`.
        fqn: String,
        /// Generic arguments, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<PyType>,
    },
    /// A union of alternatives, in declaration order.
    Union { members: Vec<PyType> },
    /// A literal type with its fallback nominal type.
    Literal {
        value: LiteralValue,
        fallback: Box<PyType>,
    },
    /// A fixed-length tuple.
    Tuple { elements: Vec<PyType> },
    /// A typed dict. Anonymous typed dicts have no name.
    TypedDict {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        fields: Vec<TypedDictField>,
    },
    /// A callable signature.
    Callable {
        params: Vec<CallableParam>,
        returns: Box<PyType>,
    },
    /// An overloaded callable; every item is a `Callable`.
    Overloaded { items: Vec<PyType> },
    /// A type variable.
    TypeVar {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bound: Option<Box<PyType>>,
    },
    /// A parameter specification variable.
    ParamSpec { name: String },
    /// A bare parameter list, used when a `ParamSpec` is expanded.
    Parameters { params: Vec<CallableParam> },
    /// A type alias; `target` is always a proper type.
    Alias { name: String, target: Box<PyType> },
    /// A type the oracle could not classify. Resolution treats this as a
    /// registry miss, never as a fatal error.
    Unknown { name: String },
}

impl PyType {
    /// Create an instance type without generic arguments.
    pub fn instance(fqn: impl Into<String>) -> Self {
        PyType::Instance {
            fqn: fqn.into(),
            args: vec![],
        }
    }

    /// Create an instance type with generic arguments.
    pub fn instance_with_args(fqn: impl Into<String>, args: Vec<PyType>) -> Self {
        PyType::Instance {
            fqn: fqn.into(),
            args,
        }
    }

    /// Create a union type.
    pub fn union(members: Vec<PyType>) -> Self {
        PyType::Union { members }
    }

    /// Create `Union[inner, None]`.
    pub fn optional(inner: PyType) -> Self {
        PyType::Union {
            members: vec![inner, PyType::None],
        }
    }

    /// Create a callable type.
    pub fn callable(params: Vec<CallableParam>, returns: PyType) -> Self {
        PyType::Callable {
            params,
            returns: Box::new(returns),
        }
    }

    /// Create a literal type.
    pub fn literal(value: LiteralValue, fallback: PyType) -> Self {
        PyType::Literal {
            value,
            fallback: Box::new(fallback),
        }
    }

    /// Create an unknown type reference.
    pub fn unknown(name: impl Into<String>) -> Self {
        PyType::Unknown { name: name.into() }
    }

    /// Collapse at most one alias indirection to the underlying proper type.
    pub fn proper(&self) -> &PyType {
        match self {
            PyType::Alias { target, .. } => target,
            other => other,
        }
    }

    /// True if this is the `None` type (after alias collapse).
    pub fn is_none_type(&self) -> bool {
        matches!(self.proper(), PyType::None)
    }

    /// If this is exactly `Union[T, None]`, return `T`.
    ///
    /// Three-or-more-alternative unions do not qualify even when `None` is
    /// among them; those synthesize a discriminated-union value type with a
    /// none case instead.
    pub fn as_optional(&self) -> Option<&PyType> {
        match self.proper() {
            PyType::Union { members } if members.len() == 2 => {
                match (members[0].is_none_type(), members[1].is_none_type()) {
                    (false, true) => Some(&members[0]),
                    (true, false) => Some(&members[1]),
                    _ => Option::None,
                }
            }
            _ => Option::None,
        }
    }

    /// The nominal fully-qualified name, when this type has one.
    pub fn nominal_fqn(&self) -> Option<&str> {
        match self.proper() {
            PyType::Instance { fqn, .. } => Some(fqn),
            PyType::Unknown { name } => Some(name),
            _ => Option::None,
        }
    }

    /// The simple (last dotted segment) nominal name, when present.
    pub fn simple_name(&self) -> Option<&str> {
        self.nominal_fqn()
            .map(|fqn| fqn.rsplit('.').next().unwrap_or(fqn))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod optional_detection {
        use super::*;

        #[test]
        fn two_member_union_with_none_is_optional() {
            let ty = PyType::optional(PyType::instance("builtins.str"));
            let inner = ty.as_optional().expect("should be optional");
            assert_eq!(inner.nominal_fqn(), Some("builtins.str"));
        }

        #[test]
        fn none_first_is_still_optional() {
            let ty = PyType::union(vec![PyType::None, PyType::instance("builtins.int")]);
            assert!(ty.as_optional().is_some());
        }

        #[test]
        fn three_member_union_with_none_is_not_optional() {
            let ty = PyType::union(vec![
                PyType::instance("builtins.int"),
                PyType::instance("builtins.str"),
                PyType::None,
            ]);
            assert!(ty.as_optional().is_none());
        }

        #[test]
        fn two_member_union_without_none_is_not_optional() {
            let ty = PyType::union(vec![
                PyType::instance("builtins.int"),
                PyType::instance("builtins.str"),
            ]);
            assert!(ty.as_optional().is_none());
        }

        #[test]
        fn union_of_none_and_none_is_not_optional() {
            let ty = PyType::union(vec![PyType::None, PyType::None]);
            assert!(ty.as_optional().is_none());
        }
    }

    mod alias_collapse {
        use super::*;

        #[test]
        fn proper_collapses_one_hop() {
            let ty = PyType::Alias {
                name: "mypkg.MyAlias".to_string(),
                target: Box::new(PyType::instance("builtins.int")),
            };
            assert_eq!(ty.proper(), &PyType::instance("builtins.int"));
        }

        #[test]
        fn optional_detection_sees_through_alias() {
            let ty = PyType::Alias {
                name: "mypkg.MaybeStr".to_string(),
                target: Box::new(PyType::optional(PyType::instance("builtins.str"))),
            };
            assert!(ty.as_optional().is_some());
        }
    }

    mod names {
        use super::*;

        #[test]
        fn simple_name_takes_last_segment() {
            let ty = PyType::instance("mypkg.sub.Thing");
            assert_eq!(ty.simple_name(), Some("Thing"));
        }

        #[test]
        fn unknown_has_nominal_name() {
            let ty = PyType::unknown("mypkg.Missing");
            assert_eq!(ty.nominal_fqn(), Some("mypkg.Missing"));
        }

        #[test]
        fn union_has_no_nominal_name() {
            let ty = PyType::union(vec![PyType::instance("a.A"), PyType::instance("b.B")]);
            assert_eq!(ty.nominal_fqn(), None);
        }
    }

    mod arg_kinds {
        use super::*;

        #[test]
        fn positional_and_star_stay_in_primary_signature() {
            assert!(ArgKind::Positional.in_primary_signature());
            assert!(ArgKind::Star.in_primary_signature());
            assert!(!ArgKind::Optional.in_primary_signature());
        }

        #[test]
        fn defaulted_and_keyword_kinds_move_to_aggregate() {
            assert!(ArgKind::Optional.in_keyword_aggregate());
            assert!(ArgKind::Named.in_keyword_aggregate());
            assert!(ArgKind::NamedOptional.in_keyword_aggregate());
            assert!(ArgKind::DoubleStar.in_keyword_aggregate());
            assert!(!ArgKind::Positional.in_keyword_aggregate());
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn instance_round_trips() {
            let ty = PyType::instance_with_args(
                "builtins.list",
                vec![PyType::instance("builtins.int")],
            );
            let json = serde_json::to_string(&ty).unwrap();
            assert!(json.contains("\"kind\":\"instance\""));
            let back: PyType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ty);
        }

        #[test]
        fn bare_instance_omits_empty_args() {
            let json = serde_json::to_string(&PyType::instance("builtins.str")).unwrap();
            assert!(!json.contains("args"));
        }

        #[test]
        fn callable_round_trips() {
            let ty = PyType::callable(
                vec![
                    CallableParam::new("text", ArgKind::Positional, PyType::instance("builtins.str")),
                    CallableParam::new(
                        "count",
                        ArgKind::NamedOptional,
                        PyType::instance("builtins.int"),
                    ),
                ],
                PyType::None,
            );
            let json = serde_json::to_string(&ty).unwrap();
            let back: PyType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ty);
        }

        #[test]
        fn literal_round_trips() {
            let ty = PyType::literal(
                LiteralValue::Str("utf-8".to_string()),
                PyType::instance("builtins.str"),
            );
            let json = serde_json::to_string(&ty).unwrap();
            let back: PyType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ty);
        }
    }
}

//! Typed symbol model over Python definitions.
//!
//! The oracle delivers one [`TypedModule`] per analyzed Python module: a
//! read-only, declaration-level view of the module's classes, functions,
//! overloads, decorated definitions and variables, each carrying its simple
//! name, fully-qualified dotted name and resolved type information.
//!
//! The model is built once per processing round and never mutated by the
//! generator; everything downstream only reads it. Statement- and
//! expression-level nodes of the original AST are not part of the contract —
//! code synthesis works entirely from declarations and their types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pytype::{ArgKind, PyType};

// ============================================================================
// Module
// ============================================================================

/// A fully analyzed Python module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedModule {
    /// Dotted module name, e.g. `mypkg.utils`.
    pub fullname: String,
    /// Source file the module was read from.
    pub path: PathBuf,
    /// Top-level definitions in source order.
    #[serde(default)]
    pub defs: Vec<Definition>,
}

impl TypedModule {
    /// Create an empty module (test construction).
    pub fn new(fullname: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        TypedModule {
            fullname: fullname.into(),
            path: path.into(),
            defs: vec![],
        }
    }

    /// Add a definition (test construction).
    pub fn with_def(mut self, def: Definition) -> Self {
        self.defs.push(def);
        self
    }

    /// The last dotted segment of the module name.
    pub fn simple_name(&self) -> &str {
        self.fullname.rsplit('.').next().unwrap_or(&self.fullname)
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// A declaration-level node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Definition {
    ClassDef(ClassDef),
    FuncDef(FuncDef),
    OverloadedFuncDef(OverloadedFuncDef),
    Decorator(DecoratedDef),
    Var(VarDef),
    TypeAlias(TypeAliasDef),
    TypeVarExpr(TypeVarExprDef),
}

impl Definition {
    /// Simple name of the declared symbol.
    pub fn name(&self) -> &str {
        match self {
            Definition::ClassDef(c) => &c.name,
            Definition::FuncDef(f) => &f.name,
            Definition::OverloadedFuncDef(o) => &o.name,
            Definition::Decorator(d) => &d.name,
            Definition::Var(v) => &v.name,
            Definition::TypeAlias(t) => &t.name,
            Definition::TypeVarExpr(t) => &t.name,
        }
    }

    /// Fully-qualified dotted name of the declared symbol.
    pub fn fullname(&self) -> &str {
        match self {
            Definition::ClassDef(c) => &c.fullname,
            Definition::FuncDef(f) => &f.fullname,
            Definition::OverloadedFuncDef(o) => &o.fullname,
            Definition::Decorator(d) => &d.fullname,
            Definition::Var(v) => &v.fullname,
            Definition::TypeAlias(t) => &t.fullname,
            Definition::TypeVarExpr(t) => &t.fullname,
        }
    }

    /// True for names the generator treats as private (single leading
    /// underscore, excluding dunders).
    pub fn is_private(&self) -> bool {
        let name = self.name();
        name.starts_with('_') && !(name.starts_with("__") && name.ends_with("__"))
    }
}

/// A Python class definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub fullname: String,
    /// Base classes as type references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<PyType>,
    /// Member definitions in source order.
    #[serde(default)]
    pub defs: Vec<Definition>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, fullname: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            fullname: fullname.into(),
            bases: vec![],
            defs: vec![],
        }
    }

    pub fn with_def(mut self, def: Definition) -> Self {
        self.defs.push(def);
        self
    }
}

/// A Python function or method definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDef {
    pub name: String,
    pub fullname: String,
    /// Formal arguments in declaration order. `self`/`cls` receivers are
    /// stripped by the oracle.
    #[serde(default)]
    pub args: Vec<ArgumentDef>,
    /// Annotated return type; `Any` when unannotated.
    #[serde(default = "default_any")]
    pub ret: PyType,
    /// True for `@staticmethod` definitions.
    #[serde(default)]
    pub is_static: bool,
}

fn default_any() -> PyType {
    PyType::Any
}

impl FuncDef {
    pub fn new(name: impl Into<String>, fullname: impl Into<String>) -> Self {
        FuncDef {
            name: name.into(),
            fullname: fullname.into(),
            args: vec![],
            ret: PyType::Any,
            is_static: false,
        }
    }

    pub fn with_arg(mut self, arg: ArgumentDef) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_ret(mut self, ret: PyType) -> Self {
        self.ret = ret;
        self
    }

    /// True when any argument moves into the keyword-arguments aggregate.
    pub fn has_keyword_aggregate(&self) -> bool {
        self.args.iter().any(|a| a.kind.in_keyword_aggregate())
    }
}

/// A formal argument of a function definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDef {
    pub name: String,
    pub kind: ArgKind,
    pub ty: PyType,
}

impl ArgumentDef {
    pub fn new(name: impl Into<String>, kind: ArgKind, ty: PyType) -> Self {
        ArgumentDef {
            name: name.into(),
            kind,
            ty,
        }
    }
}

/// An `@overload` set: two or more signatures for one name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverloadedFuncDef {
    pub name: String,
    pub fullname: String,
    pub items: Vec<FuncDef>,
}

/// A decorated definition. The generator has no template for arbitrary
/// decorators; the synthesizer skips these with a tagged diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratedDef {
    pub name: String,
    pub fullname: String,
    /// Dotted decorator names, innermost last.
    pub decorators: Vec<String>,
    /// The wrapped function.
    pub func: FuncDef,
}

/// An explicit type-alias statement. The synthesizer has no template for
/// these; they are skipped with a tagged diagnostic. Aliases used *inside*
/// type expressions arrive pre-collapsed as [`PyType::Alias`].
///
/// [`PyType::Alias`]: crate::pytype::PyType::Alias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDef {
    pub name: String,
    pub fullname: String,
    /// The aliased type.
    pub target: PyType,
}

/// A `TypeVar(...)` assignment. Skipped with a tagged diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeVarExprDef {
    pub name: String,
    pub fullname: String,
}

/// A module- or class-level variable with its annotated or inferred type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    pub name: String,
    pub fullname: String,
    pub ty: PyType,
}

impl VarDef {
    pub fn new(name: impl Into<String>, fullname: impl Into<String>, ty: PyType) -> Self {
        VarDef {
            name: name.into(),
            fullname: fullname.into(),
            ty,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_module() -> TypedModule {
        TypedModule::new("mypkg.shapes", "/proj/mypkg/shapes.py")
            .with_def(Definition::ClassDef(
                ClassDef::new("Circle", "mypkg.shapes.Circle").with_def(Definition::FuncDef(
                    FuncDef::new("area", "mypkg.shapes.Circle.area")
                        .with_ret(PyType::instance("builtins.float")),
                )),
            ))
            .with_def(Definition::FuncDef(
                FuncDef::new("make_circle", "mypkg.shapes.make_circle")
                    .with_arg(ArgumentDef::new(
                        "radius",
                        ArgKind::Positional,
                        PyType::instance("builtins.float"),
                    ))
                    .with_ret(PyType::instance("mypkg.shapes.Circle")),
            ))
    }

    #[test]
    fn module_simple_name_is_last_segment() {
        assert_eq!(sample_module().simple_name(), "shapes");
    }

    #[test]
    fn definition_accessors_cover_all_variants() {
        let module = sample_module();
        assert_eq!(module.defs[0].name(), "Circle");
        assert_eq!(module.defs[0].fullname(), "mypkg.shapes.Circle");
        assert_eq!(module.defs[1].name(), "make_circle");
    }

    #[test]
    fn private_names_are_detected() {
        let private = Definition::FuncDef(FuncDef::new("_helper", "m._helper"));
        let dunder = Definition::FuncDef(FuncDef::new("__init__", "m.C.__init__"));
        let public = Definition::FuncDef(FuncDef::new("run", "m.run"));
        assert!(private.is_private());
        assert!(!dunder.is_private());
        assert!(!public.is_private());
    }

    #[test]
    fn keyword_aggregate_detection() {
        let plain = FuncDef::new("f", "m.f").with_arg(ArgumentDef::new(
            "x",
            ArgKind::Positional,
            PyType::instance("builtins.int"),
        ));
        assert!(!plain.has_keyword_aggregate());

        let with_default = plain.clone().with_arg(ArgumentDef::new(
            "y",
            ArgKind::Optional,
            PyType::instance("builtins.int"),
        ));
        assert!(with_default.has_keyword_aggregate());
    }

    #[test]
    fn module_round_trips_through_json() {
        let module = sample_module();
        let json = serde_json::to_string(&module).unwrap();
        let back: TypedModule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, module);
    }

    #[test]
    fn definition_json_is_tagged_by_node() {
        let def = Definition::Var(VarDef::new(
            "VERSION",
            "mypkg.VERSION",
            PyType::instance("builtins.str"),
        ));
        let json = serde_json::to_string(&def).unwrap();
        assert!(json.contains("\"node\":\"var\""));
    }
}

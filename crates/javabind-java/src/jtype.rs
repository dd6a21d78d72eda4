//! Java type descriptors.
//!
//! [`JavaType`] is the resolver's output: a renderable description of the
//! Java type chosen for a Python type expression. Rendering produces simple
//! names plus an import set, so generated files carry minimal qualified
//! names.
//!
//! The opaque [`JavaType::Value`] descriptor stands in for types the
//! registry cannot resolve (yet); it renders as the runtime support layer's
//! generic value wrapper, and a later generation round replaces it once the
//! defining module has been processed.

use std::collections::BTreeSet;

// ============================================================================
// Runtime Support Types
// ============================================================================

/// Package of the runtime support library the generated code links against.
pub const RUNTIME_PACKAGE: &str = "org.javabind.runtime";
/// Opaque value wrapper for unresolved or dynamic Python objects.
pub const VALUE_FQN: &str = "org.javabind.runtime.Value";
/// Static binding-lookup entry point used by generated factories.
pub const BINDINGS_FQN: &str = "org.javabind.runtime.Bindings";
/// Execution context handle accepted by generated factories.
pub const CONTEXT_FQN: &str = "org.javabind.runtime.Context";

// ============================================================================
// Primitives
// ============================================================================

/// Java primitive types the generator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Long,
    Double,
    Boolean,
    Byte,
}

impl Primitive {
    /// The keyword spelling.
    pub fn keyword(&self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Double => "double",
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
        }
    }

    /// The boxed counterpart's fully-qualified name.
    pub fn boxed_fqn(&self) -> &'static str {
        match self {
            Primitive::Int => "java.lang.Integer",
            Primitive::Long => "java.lang.Long",
            Primitive::Double => "java.lang.Double",
            Primitive::Boolean => "java.lang.Boolean",
            Primitive::Byte => "java.lang.Byte",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Primitive> {
        match keyword {
            "int" => Some(Primitive::Int),
            "long" => Some(Primitive::Long),
            "double" => Some(Primitive::Double),
            "boolean" => Some(Primitive::Boolean),
            "byte" => Some(Primitive::Byte),
            _ => None,
        }
    }
}

// ============================================================================
// JavaType
// ============================================================================

/// A resolved Java type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    /// `void`, only meaningful in return position.
    Void,
    /// A primitive.
    Primitive(Primitive),
    /// A class or interface type, possibly generic. Nested types carry the
    /// outer type in their fully-qualified name.
    Declared { fqn: String, args: Vec<JavaType> },
    /// `java.util.Optional<inner>`.
    Optional(Box<JavaType>),
    /// `element[]`.
    Array(Box<JavaType>),
    /// The opaque runtime value wrapper (placeholder for unresolved types).
    Value,
}

impl JavaType {
    /// `java.lang.String`.
    pub fn string() -> JavaType {
        JavaType::declared("java.lang.String")
    }

    /// `java.lang.Object`.
    pub fn object() -> JavaType {
        JavaType::declared("java.lang.Object")
    }

    /// A declared type without generic arguments.
    pub fn declared(fqn: impl Into<String>) -> JavaType {
        JavaType::Declared {
            fqn: fqn.into(),
            args: vec![],
        }
    }

    /// A declared type with generic arguments (boxed by the caller).
    pub fn generic(fqn: impl Into<String>, args: Vec<JavaType>) -> JavaType {
        JavaType::Declared {
            fqn: fqn.into(),
            args,
        }
    }

    /// `java.util.Optional<self>` (self boxed).
    pub fn optional(inner: JavaType) -> JavaType {
        JavaType::Optional(Box::new(inner.boxed()))
    }

    /// Parse a registry target string: a primitive keyword, `void`, a
    /// fully-qualified name, or any of those with a trailing `[]`.
    pub fn from_fqn(java_fqn: &str) -> JavaType {
        if let Some(element) = java_fqn.strip_suffix("[]") {
            return JavaType::Array(Box::new(JavaType::from_fqn(element)));
        }
        if java_fqn == "void" {
            return JavaType::Void;
        }
        if let Some(primitive) = Primitive::from_keyword(java_fqn) {
            return JavaType::Primitive(primitive);
        }
        if java_fqn == VALUE_FQN {
            return JavaType::Value;
        }
        JavaType::declared(java_fqn)
    }

    /// The boxed form: primitives become their wrapper classes, `void`
    /// becomes `java.lang.Void`, everything else is unchanged.
    pub fn boxed(&self) -> JavaType {
        match self {
            JavaType::Primitive(p) => JavaType::declared(p.boxed_fqn()),
            JavaType::Void => JavaType::declared("java.lang.Void"),
            other => other.clone(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, JavaType::Void)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, JavaType::Primitive(_))
    }

    /// Render as Java source using simple names.
    pub fn render(&self) -> String {
        match self {
            JavaType::Void => "void".to_string(),
            JavaType::Primitive(p) => p.keyword().to_string(),
            JavaType::Declared { fqn, args } => {
                let simple = simple_name(fqn);
                if args.is_empty() {
                    simple.to_string()
                } else {
                    let rendered: Vec<String> =
                        args.iter().map(|a| a.boxed().render()).collect();
                    format!("{simple}<{}>", rendered.join(", "))
                }
            }
            JavaType::Optional(inner) => format!("Optional<{}>", inner.boxed().render()),
            JavaType::Array(element) => format!("{}[]", element.render()),
            JavaType::Value => "Value".to_string(),
        }
    }

    /// Collect the imports this type's rendering relies on.
    pub fn collect_imports(&self, imports: &mut BTreeSet<String>) {
        match self {
            JavaType::Void | JavaType::Primitive(_) => {}
            JavaType::Declared { fqn, args } => {
                if needs_import(fqn) {
                    imports.insert(fqn.clone());
                }
                for arg in args {
                    arg.boxed().collect_imports(imports);
                }
            }
            JavaType::Optional(inner) => {
                imports.insert("java.util.Optional".to_string());
                inner.boxed().collect_imports(imports);
            }
            JavaType::Array(element) => element.collect_imports(imports),
            JavaType::Value => {
                imports.insert(VALUE_FQN.to_string());
            }
        }
    }
}

/// Last dot-separated segment of a fully-qualified name.
pub fn simple_name(fqn: &str) -> &str {
    fqn.rsplit('.').next().unwrap_or(fqn)
}

/// Package part of a fully-qualified name (empty for unqualified names).
pub fn package_of(fqn: &str) -> &str {
    fqn.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

fn needs_import(fqn: &str) -> bool {
    let pkg = package_of(fqn);
    !pkg.is_empty() && pkg != "java.lang"
}

// ============================================================================
// Tests
// ============================================================================

//! Code synthesis.
//!
//! The synthesizer walks a [`TypedModule`] and produces one generated Java
//! file per top-level type: an interface per public Python class, a module
//! interface collecting module-level functions and variables, and optional
//! default-implementation stubs. Discriminated-union value types and
//! keyword-argument builder types are nested inside the interface whose
//! signatures need them.
//!
//! Synthesis is two-phase per class: declarations are first *planned*
//! (names derived, types resolved, collisions detected), then the plan is
//! rendered to text. Per-declaration failures — unsupported constructs,
//! terminal resolution failures, identifier collisions — skip that
//! declaration with a diagnostic and never abort the module, let alone the
//! run.
//!
//! Rendering the same plan twice yields byte-identical text; nothing here
//! consults the clock or unordered maps.

mod interface;
mod kwargs;
mod stubs;
mod union;

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use javabind_core::config::Config;
use javabind_core::properties::{self, KEY_GENERATE_IMPL, KEY_IMPL_SUFFIX, KEY_VISIBILITY};
use javabind_core::pytype::ArgKind;
use javabind_core::registry::{MappingOrigin, TypeRegistry};
use javabind_core::symbols::{ClassDef, Definition, FuncDef, TypedModule, VarDef};

use crate::context::GenContext;
use crate::jtype::JavaType;
use crate::names::{self, NameKind};
use crate::resolver::{ResolutionNotes, ResolveError, SynthesizedTypes, TypeResolver};

// ============================================================================
// Error Types
// ============================================================================

/// Per-declaration synthesis failures.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Type resolution failed for the declaration.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Two sibling declarations map to the same Java identifier.
    #[error("identifier collision in {owner}: '{identifier}' already generated from {existing}")]
    IdentifierCollision {
        owner: String,
        identifier: String,
        existing: String,
    },

    /// The synthesizer has no template for the construct.
    #[error("not yet supported: {construct}")]
    Unsupported { construct: String },

    /// Types referenced by the declaration remained unresolvable after the
    /// fixed point.
    #[error("unresolvable type reference(s): {names}")]
    Unresolvable { names: String },
}

// ============================================================================
// Output
// ============================================================================

/// One generated `.java` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the target folder, e.g. `com/example/api/Circle.java`.
    pub relative_path: PathBuf,
    /// Fully-qualified name of the file's top-level type.
    pub java_fqn: String,
    pub source: String,
}

/// A skipped declaration with its diagnostic.
#[derive(Debug)]
pub struct Skipped {
    /// Python fully-qualified name of the declaration.
    pub fullname: String,
    /// Source module path, for locating the offending Python code.
    pub module_path: PathBuf,
    pub reason: SynthError,
}

/// Result of synthesizing one module.
#[derive(Debug, Default)]
pub struct SynthOutput {
    pub files: Vec<GeneratedFile>,
    pub skipped: Vec<Skipped>,
}

// ============================================================================
// Plans
// ============================================================================

/// Visibility of a generated top-level type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Package,
}

impl Visibility {
    fn from_props(props: &javabind_core::config::PropertyMap) -> Visibility {
        match properties::get_str(props, KEY_VISIBILITY) {
            Some("package") => Visibility::Package,
            _ => Visibility::Public,
        }
    }

    /// Modifier prefix for a top-level type declaration.
    pub fn type_prefix(&self) -> &'static str {
        match self {
            Visibility::Public => "public ",
            Visibility::Package => "",
        }
    }
}

/// A planned method.
#[derive(Debug)]
pub struct MethodPlan {
    pub python_name: String,
    pub java_name: String,
    /// Required positional parameters: `(java name, type)`.
    pub required: Vec<(String, JavaType)>,
    /// `*args` parameter: `(java name, element type)`.
    pub star: Option<(String, JavaType)>,
    /// Keyword-arguments aggregate, when any parameter has a default or is
    /// keyword-only.
    pub kwargs: Option<KwargsShape>,
    pub ret: JavaType,
}

/// A planned keyword-arguments aggregate type.
#[derive(Debug, Clone)]
pub struct KwargsShape {
    pub type_name: String,
    /// Fields in parameter declaration order.
    pub fields: Vec<KwField>,
}

/// One field of a keyword-arguments aggregate.
#[derive(Debug, Clone)]
pub struct KwField {
    pub java_name: String,
    pub python_name: String,
    pub ty: JavaType,
}

/// A planned variable accessor pair.
#[derive(Debug)]
pub struct VarPlan {
    pub python_name: String,
    pub getter: String,
    pub setter: String,
    pub ty: JavaType,
}

/// Everything needed to render one interface (and its optional impl stub).
#[derive(Debug)]
pub struct ClassPlan {
    pub python_fqn: String,
    pub interface_name: String,
    pub java_fqn: String,
    pub package: String,
    pub visibility: Visibility,
    pub methods: Vec<MethodPlan>,
    pub vars: Vec<VarPlan>,
    pub unions: SynthesizedTypes,
    pub kwargs: Vec<KwargsShape>,
    pub nested: Vec<ClassPlan>,
    pub generate_impl: bool,
    pub impl_suffix: String,
}

// ============================================================================
// Synthesizer
// ============================================================================

/// Walks modules and emits Java source.
pub struct Synthesizer<'a> {
    config: &'a Config,
    registry: &'a mut TypeRegistry,
    /// Snapshot of names known unresolvable, from the tracker.
    dead_ends: BTreeSet<String>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        config: &'a Config,
        registry: &'a mut TypeRegistry,
        dead_ends: BTreeSet<String>,
    ) -> Self {
        Synthesizer {
            config,
            registry,
            dead_ends,
        }
    }

    /// Synthesize every generated file for one module.
    pub fn synthesize_module(&mut self, module: &TypedModule) -> SynthOutput {
        let mut output = SynthOutput::default();
        let package = java_package(
            &self.config.interface_package,
            self.config.python_prefix.as_deref(),
            &module.fullname,
        );
        let mut ctx = GenContext::for_module(self.config, module, package.clone());
        if ctx.is_ignored() {
            debug!(module = %module.fullname, "module ignored by configuration");
            return output;
        }

        // Pre-register every interface this module will generate, so sibling
        // references within the module resolve in the same round.
        self.register_module_types(module, &ctx);

        for def in &module.defs {
            if def.is_private() {
                continue;
            }
            match def {
                Definition::ClassDef(class) => {
                    ctx.push_class(&class.name);
                    if ctx.is_skipped() {
                        debug!(class = %class.fullname, "class skipped by whitelist/ignore");
                        ctx.pop();
                        continue;
                    }
                    match self.plan_class(class, &mut ctx, &package, &mut output.skipped) {
                        Ok(plan) => self.render_plan(&plan, &mut output),
                        Err(reason) => {
                            warn!(class = %class.fullname, %reason, "class skipped");
                            output.skipped.push(Skipped {
                                fullname: class.fullname.clone(),
                                module_path: module.path.clone(),
                                reason,
                            });
                        }
                    }
                    ctx.pop();
                }
                Definition::FuncDef(_) | Definition::Var(_) => {
                    // Collected into the module interface below.
                }
                Definition::OverloadedFuncDef(o) => {
                    output.skipped.push(Skipped {
                        fullname: o.fullname.clone(),
                        module_path: module.path.clone(),
                        reason: SynthError::Unsupported {
                            construct: format!("overloaded function '{}'", o.name),
                        },
                    });
                }
                Definition::Decorator(d) => {
                    output.skipped.push(Skipped {
                        fullname: d.fullname.clone(),
                        module_path: module.path.clone(),
                        reason: SynthError::Unsupported {
                            construct: format!(
                                "decorated definition '{}' (@{})",
                                d.name,
                                d.decorators.join(", @")
                            ),
                        },
                    });
                }
                Definition::TypeAlias(t) => {
                    output.skipped.push(Skipped {
                        fullname: t.fullname.clone(),
                        module_path: module.path.clone(),
                        reason: SynthError::Unsupported {
                            construct: format!("type alias '{}'", t.name),
                        },
                    });
                }
                Definition::TypeVarExpr(t) => {
                    output.skipped.push(Skipped {
                        fullname: t.fullname.clone(),
                        module_path: module.path.clone(),
                        reason: SynthError::Unsupported {
                            construct: format!("type variable declaration '{}'", t.name),
                        },
                    });
                }
            }
        }

        // Module-level functions and variables become the module interface.
        match self.plan_module_interface(module, &mut ctx, &package, &mut output.skipped) {
            Ok(Some(plan)) => self.render_plan(&plan, &mut output),
            Ok(None) => {}
            Err(reason) => {
                warn!(module = %module.fullname, %reason, "module interface skipped");
                output.skipped.push(Skipped {
                    fullname: module.fullname.clone(),
                    module_path: module.path.clone(),
                    reason,
                });
            }
        }

        output
    }

    /// Register the Java names of all interfaces this module generates.
    fn register_module_types(&mut self, module: &TypedModule, ctx: &GenContext<'_>) {
        let module_props = ctx.props().clone();
        for def in &module.defs {
            if let Definition::ClassDef(class) = def {
                if def.is_private() {
                    continue;
                }
                let class_props = properties::class_scope(&module_props, &class.name);
                if properties::is_skipped(&class_props) {
                    continue;
                }
                self.register_class_tree(class, &ctx.package, &class_props);
            }
        }
        let has_members = module.defs.iter().any(|def| {
            !def.is_private() && matches!(def, Definition::FuncDef(_) | Definition::Var(_))
        });
        if has_members {
            let module_iface = names::to_java(module.simple_name(), NameKind::Type);
            self.registry.register(
                module.fullname.clone(),
                format!("{}.{module_iface}", ctx.package),
                MappingOrigin::Generated,
            );
        }
    }

    fn register_class_tree(
        &mut self,
        class: &ClassDef,
        outer: &str,
        props: &javabind_core::config::PropertyMap,
    ) {
        let name = names::to_java(&class.name, NameKind::Type);
        let java_fqn = format!("{outer}.{name}");
        self.registry
            .register(class.fullname.clone(), java_fqn.clone(), MappingOrigin::Generated);
        for def in &class.defs {
            if let Definition::ClassDef(nested) = def {
                if def.is_private() {
                    continue;
                }
                let nested_props = properties::class_scope(props, &nested.name);
                if properties::is_skipped(&nested_props) {
                    continue;
                }
                self.register_class_tree(nested, &java_fqn, &nested_props);
            }
        }
    }

    /// Render a class plan into its interface file and optional impl stub.
    fn render_plan(&mut self, plan: &ClassPlan, output: &mut SynthOutput) {
        output.files.push(interface::render(plan));
        if plan.generate_impl {
            output.files.push(stubs::render(
                plan,
                self.config.implementation_package(),
                &self.config.interface_package,
            ));
        }
    }

    // ------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------

    fn plan_class(
        &mut self,
        class: &ClassDef,
        ctx: &mut GenContext<'_>,
        package: &str,
        skipped: &mut Vec<Skipped>,
    ) -> Result<ClassPlan, SynthError> {
        let interface_name = names::to_java(&class.name, NameKind::Type);
        let java_fqn = format!("{package}.{interface_name}");
        let mut plan = self.empty_plan(ctx, class.fullname.clone(), interface_name, java_fqn, package);

        let mut signatures: BTreeMap<String, String> = BTreeMap::new();
        for def in &class.defs {
            if def.is_private() || is_dunder(def.name()) {
                continue;
            }
            match def {
                Definition::FuncDef(func) => {
                    self.plan_member_func(func, ctx, &mut plan, &mut signatures, skipped)
                }
                Definition::Var(var) => {
                    self.plan_member_var(var, ctx, &mut plan, &mut signatures, skipped)
                }
                Definition::ClassDef(nested) => {
                    ctx.push_class(&nested.name);
                    if ctx.is_skipped() {
                        ctx.pop();
                        continue;
                    }
                    let owner_fqn = plan.java_fqn.clone();
                    match self.plan_class(nested, ctx, &owner_fqn, skipped) {
                        Ok(nested_plan) => plan.nested.push(nested_plan),
                        Err(reason) => skipped.push(Skipped {
                            fullname: nested.fullname.clone(),
                            module_path: ctx.module.path.clone(),
                            reason,
                        }),
                    }
                    ctx.pop();
                }
                Definition::OverloadedFuncDef(o) => skipped.push(Skipped {
                    fullname: o.fullname.clone(),
                    module_path: ctx.module.path.clone(),
                    reason: SynthError::Unsupported {
                        construct: format!("overloaded function '{}'", o.name),
                    },
                }),
                Definition::Decorator(d) => skipped.push(Skipped {
                    fullname: d.fullname.clone(),
                    module_path: ctx.module.path.clone(),
                    reason: SynthError::Unsupported {
                        construct: format!(
                            "decorated definition '{}' (@{})",
                            d.name,
                            d.decorators.join(", @")
                        ),
                    },
                }),
                Definition::TypeAlias(t) => skipped.push(Skipped {
                    fullname: t.fullname.clone(),
                    module_path: ctx.module.path.clone(),
                    reason: SynthError::Unsupported {
                        construct: format!("type alias '{}'", t.name),
                    },
                }),
                Definition::TypeVarExpr(t) => skipped.push(Skipped {
                    fullname: t.fullname.clone(),
                    module_path: ctx.module.path.clone(),
                    reason: SynthError::Unsupported {
                        construct: format!("type variable declaration '{}'", t.name),
                    },
                }),
            }
        }

        self.check_nested_type_names(&plan)?;
        Ok(plan)
    }

    /// Plan the interface holding module-level functions and variables.
    /// Returns `None` when the module has no public functions or variables.
    fn plan_module_interface(
        &mut self,
        module: &TypedModule,
        ctx: &mut GenContext<'_>,
        package: &str,
        skipped: &mut Vec<Skipped>,
    ) -> Result<Option<ClassPlan>, SynthError> {
        let has_members = module.defs.iter().any(|def| {
            !def.is_private()
                && matches!(def, Definition::FuncDef(_) | Definition::Var(_))
        });
        if !has_members {
            return Ok(None);
        }

        let interface_name = names::to_java(module.simple_name(), NameKind::Type);
        let java_fqn = format!("{package}.{interface_name}");
        let mut plan = self.empty_plan(
            ctx,
            module.fullname.clone(),
            interface_name,
            java_fqn,
            package,
        );

        let mut signatures: BTreeMap<String, String> = BTreeMap::new();
        for def in &module.defs {
            if def.is_private() || is_dunder(def.name()) {
                continue;
            }
            match def {
                Definition::FuncDef(func) => {
                    self.plan_member_func(func, ctx, &mut plan, &mut signatures, skipped)
                }
                Definition::Var(var) => {
                    self.plan_member_var(var, ctx, &mut plan, &mut signatures, skipped)
                }
                _ => {}
            }
        }

        self.check_nested_type_names(&plan)?;
        Ok(Some(plan))
    }

    fn empty_plan(
        &self,
        ctx: &GenContext<'_>,
        python_fqn: String,
        interface_name: String,
        java_fqn: String,
        package: &str,
    ) -> ClassPlan {
        let props = ctx.props();
        ClassPlan {
            python_fqn,
            interface_name,
            java_fqn,
            package: package.to_string(),
            visibility: Visibility::from_props(props),
            methods: vec![],
            vars: vec![],
            unions: SynthesizedTypes::new(),
            kwargs: vec![],
            nested: vec![],
            generate_impl: properties::get_bool(props, KEY_GENERATE_IMPL).unwrap_or(false),
            impl_suffix: properties::get_str(props, KEY_IMPL_SUFFIX)
                .unwrap_or("Impl")
                .to_string(),
        }
    }

    fn plan_member_func(
        &mut self,
        func: &FuncDef,
        ctx: &mut GenContext<'_>,
        plan: &mut ClassPlan,
        signatures: &mut BTreeMap<String, String>,
        skipped: &mut Vec<Skipped>,
    ) {
        ctx.push_function(&func.name);
        if ctx.is_ignored() {
            debug!(func = %func.fullname, "function ignored by configuration");
            ctx.pop();
            return;
        }
        let result = self.plan_method(func, plan, signatures);
        ctx.pop();
        match result {
            Ok(method) => plan.methods.push(method),
            Err(reason) => {
                warn!(func = %func.fullname, %reason, "method skipped");
                skipped.push(Skipped {
                    fullname: func.fullname.clone(),
                    module_path: ctx.module.path.clone(),
                    reason,
                });
            }
        }
    }

    fn plan_method(
        &mut self,
        func: &FuncDef,
        plan: &mut ClassPlan,
        signatures: &mut BTreeMap<String, String>,
    ) -> Result<MethodPlan, SynthError> {
        let java_name = names::to_java(&func.name, NameKind::Method);
        let mut notes = ResolutionNotes::new();
        let mut resolver = TypeResolver::new(self.registry, &self.dead_ends);

        let mut required = Vec::new();
        let mut star = None;
        let mut kw_fields = Vec::new();
        for arg in &func.args {
            let arg_name = names::to_java(&arg.name, NameKind::Field);
            match arg.kind {
                ArgKind::Positional => {
                    let ty = resolver.resolve_argument(
                        &arg.ty,
                        &plan.java_fqn,
                        &mut plan.unions,
                        &mut notes,
                    )?;
                    required.push((arg_name, ty));
                }
                ArgKind::Star => {
                    let element = resolver.resolve_argument(
                        &arg.ty,
                        &plan.java_fqn,
                        &mut plan.unions,
                        &mut notes,
                    )?;
                    star = Some((arg_name, element));
                }
                ArgKind::DoubleStar => {
                    kw_fields.push(KwField {
                        java_name: arg_name,
                        python_name: arg.name.clone(),
                        ty: JavaType::generic(
                            "java.util.Map",
                            vec![JavaType::string(), JavaType::object()],
                        ),
                    });
                }
                ArgKind::Optional | ArgKind::Named | ArgKind::NamedOptional => {
                    let ty = resolver.resolve_argument(
                        &arg.ty,
                        &plan.java_fqn,
                        &mut plan.unions,
                        &mut notes,
                    )?;
                    kw_fields.push(KwField {
                        java_name: arg_name,
                        python_name: arg.name.clone(),
                        ty,
                    });
                }
            }
        }

        let ret = resolver.resolve(&func.ret, &plan.java_fqn, &mut plan.unions, &mut notes)?;

        if notes.is_terminal() {
            return Err(SynthError::Unresolvable {
                names: notes.dead.iter().cloned().collect::<Vec<_>>().join(", "),
            });
        }

        let arity = required.len()
            + usize::from(star.is_some())
            + usize::from(!kw_fields.is_empty());
        let signature = format!("{java_name}/{arity}");
        if let Some(existing) = signatures.get(&signature) {
            return Err(SynthError::IdentifierCollision {
                owner: plan.python_fqn.clone(),
                identifier: java_name,
                existing: existing.clone(),
            });
        }
        signatures.insert(signature, func.fullname.clone());

        let kwargs = if kw_fields.is_empty() {
            None
        } else {
            let type_name = format!("{}Args", names::to_java(&func.name, NameKind::Type));
            if plan.kwargs.iter().any(|k| k.type_name == type_name) {
                return Err(SynthError::IdentifierCollision {
                    owner: plan.python_fqn.clone(),
                    identifier: type_name,
                    existing: func.fullname.clone(),
                });
            }
            let shape = KwargsShape {
                type_name,
                fields: kw_fields,
            };
            plan.kwargs.push(shape.clone());
            Some(shape)
        };

        Ok(MethodPlan {
            python_name: func.name.clone(),
            java_name,
            required,
            star,
            kwargs,
            ret,
        })
    }

    fn plan_member_var(
        &mut self,
        var: &VarDef,
        ctx: &mut GenContext<'_>,
        plan: &mut ClassPlan,
        signatures: &mut BTreeMap<String, String>,
        skipped: &mut Vec<Skipped>,
    ) {
        let mut notes = ResolutionNotes::new();
        let mut resolver = TypeResolver::new(self.registry, &self.dead_ends);
        let resolved = resolver.resolve_argument(
            &var.ty,
            &plan.java_fqn,
            &mut plan.unions,
            &mut notes,
        );
        let reason = match resolved {
            Ok(_) if notes.is_terminal() => Some(SynthError::Unresolvable {
                names: notes.dead.iter().cloned().collect::<Vec<_>>().join(", "),
            }),
            Ok(ty) => {
                let pascal = names::to_java(&var.name, NameKind::Type);
                let getter = format!("get{pascal}");
                let setter = format!("set{pascal}");
                if let Some(existing) = signatures.get(&format!("{getter}/0")) {
                    Some(SynthError::IdentifierCollision {
                        owner: plan.python_fqn.clone(),
                        identifier: getter,
                        existing: existing.clone(),
                    })
                } else {
                    signatures.insert(format!("{getter}/0"), var.fullname.clone());
                    signatures.insert(format!("{setter}/1"), var.fullname.clone());
                    plan.vars.push(VarPlan {
                        python_name: var.name.clone(),
                        getter,
                        setter,
                        ty,
                    });
                    None
                }
            }
            Err(err) => Some(err.into()),
        };
        if let Some(reason) = reason {
            warn!(var = %var.fullname, %reason, "variable skipped");
            skipped.push(Skipped {
                fullname: var.fullname.clone(),
                module_path: ctx.module.path.clone(),
                reason,
            });
        }
    }

    /// Nested generated type names (unions, kwargs aggregates, nested
    /// interfaces) must be distinct within one interface.
    fn check_nested_type_names(&self, plan: &ClassPlan) -> Result<(), SynthError> {
        let mut nested_names: Vec<&str> = plan
            .unions
            .unions()
            .map(|u| u.name.as_str())
            .chain(plan.kwargs.iter().map(|k| k.type_name.as_str()))
            .chain(plan.nested.iter().map(|n| n.interface_name.as_str()))
            .collect();
        nested_names.sort_unstable();
        if let Some(duplicate) = names::find_duplicate(nested_names) {
            return Err(SynthError::IdentifierCollision {
                owner: plan.python_fqn.clone(),
                identifier: duplicate.to_string(),
                existing: plan.python_fqn.clone(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Packages
// ============================================================================

/// Compute the Java package for a module: the configured interface package,
/// with the configured Python prefix stripped from the module name and the
/// remaining dotted path appended as keyword-escaped lowercase segments.
pub fn java_package(
    interface_package: &str,
    python_prefix: Option<&str>,
    module_fullname: &str,
) -> String {
    let sub = match python_prefix {
        Some(prefix) if module_fullname == prefix => "",
        Some(prefix) => module_fullname
            .strip_prefix(&format!("{prefix}."))
            .unwrap_or(module_fullname),
        None => module_fullname,
    };
    if sub.is_empty() {
        return interface_package.to_string();
    }
    let segments: Vec<String> = sub
        .split('.')
        .map(|segment| names::to_java(segment, NameKind::Package))
        .collect();
    format!("{interface_package}.{}", segments.join("."))
}

/// Relative file path for a generated top-level type.
pub fn relative_path(package: &str, type_name: &str) -> PathBuf {
    let mut path: PathBuf = package.split('.').collect();
    path.push(format!("{type_name}.java"));
    path
}

fn is_dunder(name: &str) -> bool {
    name.starts_with("__") && name.ends_with("__")
}

/// Uppercase the first character: field name → accessor suffix.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================

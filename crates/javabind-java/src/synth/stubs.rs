//! Default-implementation stub rendering.
//!
//! For an interface `Circle`, the stub `CircleImpl` wraps the runtime value
//! of the underlying Python object and implements every abstract method by
//! delegating through the binding layer's invoke helpers. Stub generation
//! is opt-in per scope via the `generate_impl` property.

use std::collections::BTreeSet;

use crate::builder::{CompilationUnit, SourceBuilder};
use crate::jtype::{simple_name, JavaType, BINDINGS_FQN, VALUE_FQN};
use crate::names;

use super::{relative_path, ClassPlan, GeneratedFile, MethodPlan};

/// Render the implementation stub for a top-level interface.
pub(super) fn render(
    plan: &ClassPlan,
    implementation_package: &str,
    interface_package: &str,
) -> GeneratedFile {
    let package = impl_package(&plan.package, interface_package, implementation_package);
    let class_name = names::impl_name(&plan.interface_name, &plan.impl_suffix);
    let class_fqn = format!("{package}.{class_name}");

    let mut unit = CompilationUnit::new(package.clone(), class_fqn.clone());
    unit.add_import(BINDINGS_FQN);
    unit.add_import(VALUE_FQN);
    unit.add_import(plan.java_fqn.clone());

    let mut b = SourceBuilder::new();
    b.open(&format!(
        "{}class {class_name} implements {}",
        plan.visibility.type_prefix(),
        plan.interface_name
    ));

    b.blank();
    b.line("private final Value delegate;");
    b.blank();
    b.open(&format!("public {class_name}(Value delegate)"));
    b.line("this.delegate = delegate;");
    b.close();

    for method in &plan.methods {
        render_method(method, plan, &mut b, &mut unit);
    }

    for var in &plan.vars {
        collect(&mut unit, &var.ty);
        let ty = var.ty.render();
        b.blank();
        b.line("@Override");
        b.open(&format!("public {ty} {}()", var.getter));
        b.line(&format!(
            "return {}Bindings.getMember(delegate, \"{}\", {});",
            cast_prefix(&var.ty),
            var.python_name,
            class_token(&var.ty)
        ));
        b.close();
        b.blank();
        b.line("@Override");
        b.open(&format!("public void {}({ty} value)", var.setter));
        b.line(&format!(
            "Bindings.setMember(delegate, \"{}\", value);",
            var.python_name
        ));
        b.close();
    }

    b.close();
    unit.set_body(b.finish());

    GeneratedFile {
        relative_path: relative_path(&package, &class_name),
        java_fqn: class_fqn,
        source: unit.to_source(),
    }
}

fn render_method(
    method: &MethodPlan,
    plan: &ClassPlan,
    b: &mut SourceBuilder,
    unit: &mut CompilationUnit,
) {
    collect(unit, &method.ret);

    let mut params: Vec<String> = Vec::new();
    let mut call_args: Vec<String> = Vec::new();
    for (name, ty) in &method.required {
        collect(unit, ty);
        params.push(format!("{} {name}", ty.render()));
        call_args.push(name.clone());
    }
    if let Some((name, element)) = &method.star {
        collect(unit, element);
        if method.kwargs.is_none() {
            params.push(format!("{}... {name}", element.render()));
        } else {
            params.push(format!("{}[] {name}", element.render()));
        }
        call_args.push(name.clone());
    }
    if let Some(shape) = &method.kwargs {
        unit.add_import(format!("{}.{}", plan.java_fqn, shape.type_name));
        params.push(format!("{} args", shape.type_name));
        call_args.push("args".to_string());
    }

    b.blank();
    b.line("@Override");
    b.open(&format!(
        "public {} {}({})",
        method.ret.render(),
        method.java_name,
        params.join(", ")
    ));
    let trailing = if call_args.is_empty() {
        String::new()
    } else {
        format!(", {}", call_args.join(", "))
    };
    if method.ret.is_void() {
        b.line(&format!(
            "Bindings.invokeVoid(delegate, \"{}\"{trailing});",
            method.python_name
        ));
    } else {
        b.line(&format!(
            "return {}Bindings.invoke(delegate, \"{}\", {}{trailing});",
            cast_prefix(&method.ret),
            method.python_name,
            class_token(&method.ret)
        ));
    }
    b.close();
}

/// Impl stubs mirror the interface's sub-package under the implementation
/// package root.
fn impl_package(
    interface_sub_package: &str,
    interface_package: &str,
    implementation_package: &str,
) -> String {
    match interface_sub_package.strip_prefix(interface_package) {
        Some("") => implementation_package.to_string(),
        Some(sub) => format!("{implementation_package}{sub}"),
        None => implementation_package.to_string(),
    }
}

/// The `Class<T>` token passed to the binding layer for a return type.
/// Generic types use their raw token; [`cast_prefix`] supplies the cast.
fn class_token(ty: &JavaType) -> String {
    match ty {
        JavaType::Void => "void.class".to_string(),
        JavaType::Primitive(p) => format!("{}.class", p.keyword()),
        JavaType::Declared { fqn, .. } => format!("{}.class", simple_name(fqn)),
        JavaType::Optional(_) => "Optional.class".to_string(),
        JavaType::Array(element) => format!("{}[].class", element.render()),
        JavaType::Value => "Value.class".to_string(),
    }
}

/// Cast needed when the raw class token loses generic information.
fn cast_prefix(ty: &JavaType) -> String {
    let rendered = ty.render();
    if rendered.contains('<') {
        format!("({rendered}) ")
    } else {
        String::new()
    }
}

fn collect(unit: &mut CompilationUnit, ty: &JavaType) {
    let mut imports = BTreeSet::new();
    ty.collect_imports(&mut imports);
    unit.add_imports(&imports);
}

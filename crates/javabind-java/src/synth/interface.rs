//! Interface rendering.
//!
//! Turns a [`ClassPlan`] into the text of one generated Java interface:
//! static `fromContext` factory, one abstract method per planned function
//! (plus the required-only default overload when a keyword-arguments
//! aggregate exists), accessor pairs for variables, and the nested
//! synthesized types.

use crate::builder::{CompilationUnit, SourceBuilder};
use crate::jtype::{JavaType, BINDINGS_FQN, CONTEXT_FQN};

use super::{kwargs, relative_path, union, ClassPlan, GeneratedFile, MethodPlan};

/// Render a top-level interface file.
pub(super) fn render(plan: &ClassPlan) -> GeneratedFile {
    let mut unit = CompilationUnit::new(plan.package.clone(), plan.java_fqn.clone());
    unit.add_import(BINDINGS_FQN);
    unit.add_import(CONTEXT_FQN);
    let body = render_type(plan, &mut unit, true);
    unit.set_body(body);
    GeneratedFile {
        relative_path: relative_path(&plan.package, &plan.interface_name),
        java_fqn: plan.java_fqn.clone(),
        source: unit.to_source(),
    }
}

/// Render the interface declaration. Nested interfaces recurse with
/// `top_level = false`; all imports funnel into the one compilation unit.
fn render_type(plan: &ClassPlan, unit: &mut CompilationUnit, top_level: bool) -> String {
    let mut b = SourceBuilder::new();
    let prefix = if top_level {
        plan.visibility.type_prefix().to_string()
    } else {
        "public ".to_string()
    };
    b.open(&format!("{prefix}interface {}", plan.interface_name));

    // Binding-lookup factory.
    b.blank();
    b.open(&format!(
        "public static {} fromContext(Context context)",
        plan.interface_name
    ));
    b.line(&format!(
        "return Bindings.lookup({}.class, context, \"{}\");",
        plan.interface_name, plan.python_fqn
    ));
    b.close();

    for method in &plan.methods {
        render_method(method, &mut b, unit);
    }

    for var in &plan.vars {
        collect(unit, &var.ty);
        b.blank();
        b.line(&format!("public {} {}();", var.ty.render(), var.getter));
        b.blank();
        b.line(&format!(
            "public void {}({} value);",
            var.setter,
            var.ty.render()
        ));
    }

    for shape in &plan.kwargs {
        // Aggregate getters are Optional-returning.
        unit.add_import("java.util.Optional");
        for field in &shape.fields {
            collect(unit, &field.ty);
        }
        b.blank();
        b.nested(&kwargs::render(shape));
    }

    for shape in plan.unions.unions() {
        if !shape.cases.is_empty() {
            unit.add_import("java.util.Optional");
        }
        for case in &shape.cases {
            collect(unit, &case.ty);
        }
        b.blank();
        b.nested(&union::render(shape));
    }

    for nested in &plan.nested {
        b.blank();
        b.nested(&render_type(nested, unit, false));
    }

    b.close();
    b.finish()
}

fn render_method(method: &MethodPlan, b: &mut SourceBuilder, unit: &mut CompilationUnit) {
    collect(unit, &method.ret);
    for (_, ty) in &method.required {
        collect(unit, ty);
    }
    if let Some((_, element)) = &method.star {
        collect(unit, element);
    }

    let mut params: Vec<String> = method
        .required
        .iter()
        .map(|(name, ty)| format!("{} {name}", ty.render()))
        .collect();
    if let Some((name, element)) = &method.star {
        // Varargs only when nothing follows; otherwise a plain array.
        if method.kwargs.is_none() {
            params.push(format!("{}... {name}", element.render()));
        } else {
            params.push(format!("{}[] {name}", element.render()));
        }
    }

    let ret = method.ret.render();
    match &method.kwargs {
        None => {
            b.blank();
            b.line(&format!(
                "public {ret} {}({});",
                method.java_name,
                params.join(", ")
            ));
        }
        Some(shape) => {
            let mut full = params.clone();
            full.push(format!("{} args", shape.type_name));
            b.blank();
            b.line(&format!(
                "public {ret} {}({});",
                method.java_name,
                full.join(", ")
            ));

            // Required-only overload, delegating with all-default arguments.
            let mut call_args: Vec<String> = method
                .required
                .iter()
                .map(|(name, _)| name.clone())
                .collect();
            if let Some((name, _)) = &method.star {
                call_args.push(name.clone());
            }
            call_args.push(format!("{}.builder().build()", shape.type_name));
            b.blank();
            b.open(&format!(
                "public default {ret} {}({})",
                method.java_name,
                params.join(", ")
            ));
            let invocation = format!("{}({})", method.java_name, call_args.join(", "));
            if method.ret.is_void() {
                b.line(&format!("{invocation};"));
            } else {
                b.line(&format!("return {invocation};"));
            }
            b.close();
        }
    }
}

fn collect(unit: &mut CompilationUnit, ty: &JavaType) {
    let mut imports = std::collections::BTreeSet::new();
    ty.collect_imports(&mut imports);
    unit.add_imports(&imports);
}

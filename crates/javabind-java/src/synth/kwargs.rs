//! Keyword-arguments aggregate rendering.
//!
//! A function whose Python signature carries defaulted or keyword-only
//! parameters gets a companion aggregate type: immutable fields in
//! declaration order, `Optional`-returning getters (an unset field means
//! "use the Python default"), and a fluent builder with one setter per
//! field and a `build()` terminal.

use crate::builder::SourceBuilder;

use super::{capitalize, KwargsShape};

/// Render the aggregate class for one keyword-arguments shape.
pub(super) fn render(shape: &KwargsShape) -> String {
    let mut b = SourceBuilder::new();
    let name = &shape.type_name;
    b.open(&format!("public static final class {name}"));

    b.blank();
    for field in &shape.fields {
        b.line(&format!(
            "private final {} {};",
            field.ty.boxed().render(),
            field.java_name
        ));
    }

    b.blank();
    b.open(&format!("private {name}(Builder builder)"));
    for field in &shape.fields {
        b.line(&format!("this.{0} = builder.{0};", field.java_name));
    }
    b.close();

    b.blank();
    b.open("public static Builder builder()");
    b.line("return new Builder();");
    b.close();

    for field in &shape.fields {
        b.blank();
        b.open(&format!(
            "public Optional<{}> get{}()",
            field.ty.boxed().render(),
            capitalize(&field.java_name)
        ));
        b.line(&format!("return Optional.ofNullable({});", field.java_name));
        b.close();
    }

    // Fluent builder.
    b.blank();
    b.open("public static final class Builder");
    b.blank();
    for field in &shape.fields {
        b.line(&format!(
            "private {} {};",
            field.ty.boxed().render(),
            field.java_name
        ));
    }
    b.blank();
    b.open("private Builder()");
    b.close();
    for field in &shape.fields {
        b.blank();
        b.open(&format!(
            "public Builder set{}({} value)",
            capitalize(&field.java_name),
            field.ty.render()
        ));
        b.line(&format!("this.{} = value;", field.java_name));
        b.line("return this;");
        b.close();
    }
    b.blank();
    b.open(&format!("public {name} build()"));
    b.line(&format!("return new {name}(this);"));
    b.close();
    b.close();

    b.close();
    b.finish()
}

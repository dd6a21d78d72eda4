//! Discriminated-union value type rendering.
//!
//! A union shape becomes a final value class nested in the owning
//! interface: one private payload slot per alternative (boxed, so absence
//! is representable), a private constructor, an `of…` factory per case, an
//! `is…` predicate and `Optional`-returning `get…` accessor per case, and a
//! `toString()` that delegates to the present case's value or yields the
//! `"None"` sentinel. Cases appear in alphabetical field order throughout.

use crate::builder::SourceBuilder;

use super::capitalize;
use crate::resolver::UnionShape;

/// Render the value class for one union shape.
pub(super) fn render(shape: &UnionShape) -> String {
    let mut b = SourceBuilder::new();
    let name = &shape.name;
    b.open(&format!("public static final class {name}"));

    // Payload slots, one per case, plus the none flag when present.
    b.blank();
    for case in &shape.cases {
        b.line(&format!(
            "private final {} {};",
            case.ty.boxed().render(),
            case.field
        ));
    }
    if shape.has_none {
        b.line("private final boolean none;");
    }

    // Private constructor; factories are the only entry points.
    let mut ctor_params: Vec<String> = shape
        .cases
        .iter()
        .map(|case| format!("{} {}", case.ty.boxed().render(), case.field))
        .collect();
    if shape.has_none {
        ctor_params.push("boolean none".to_string());
    }
    b.blank();
    b.open(&format!("private {name}({})", ctor_params.join(", ")));
    for case in &shape.cases {
        b.line(&format!("this.{0} = {0};", case.field));
    }
    if shape.has_none {
        b.line("this.none = none;");
    }
    b.close();

    // One factory per case.
    for (index, case) in shape.cases.iter().enumerate() {
        let mut args: Vec<String> = (0..shape.cases.len())
            .map(|i| if i == index { "value".to_string() } else { "null".to_string() })
            .collect();
        if shape.has_none {
            args.push("false".to_string());
        }
        b.blank();
        b.open(&format!(
            "public static {name} of{}({} value)",
            capitalize(&case.field),
            case.ty.render()
        ));
        b.line(&format!("return new {name}({});", args.join(", ")));
        b.close();
    }
    if shape.has_none {
        let mut args: Vec<String> = shape.cases.iter().map(|_| "null".to_string()).collect();
        args.push("true".to_string());
        b.blank();
        b.open(&format!("public static {name} ofNone()"));
        b.line(&format!("return new {name}({});", args.join(", ")));
        b.close();
    }

    // Predicates and accessors, per case in field order.
    for case in &shape.cases {
        let cap = capitalize(&case.field);
        b.blank();
        b.open(&format!("public boolean is{cap}()"));
        b.line(&format!("return {} != null;", case.field));
        b.close();
        b.blank();
        b.open(&format!(
            "public Optional<{}> get{cap}()",
            case.ty.boxed().render()
        ));
        b.line(&format!("return Optional.ofNullable({});", case.field));
        b.close();
    }
    if shape.has_none {
        b.blank();
        b.open("public boolean isNone()");
        b.line("return none;");
        b.close();
    }

    // toString delegates to the present case or the None sentinel.
    b.blank();
    b.line("@Override");
    b.open("public String toString()");
    for case in &shape.cases {
        b.open(&format!("if ({} != null)", case.field));
        b.line(&format!("return String.valueOf({});", case.field));
        b.close();
    }
    b.line("return \"None\";");
    b.close();

    b.close();
    b.finish()
}

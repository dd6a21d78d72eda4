//! Java identifier derivation.
//!
//! Converts Python names into valid Java identifiers: snake_case becomes
//! camelCase for methods and fields, PascalCase for types; package segments
//! stay lowercase. Results colliding with a Java reserved word are escaped —
//! fields and methods get a `Value` suffix (`int` → `intValue`), package
//! segments get a trailing underscore.

// ============================================================================
// Reserved Words
// ============================================================================

/// Java keywords and literal words that cannot be used as identifiers.
const RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null", "var", "record", "yield",
];

/// True when `name` is a Java reserved word.
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

// ============================================================================
// Name Kinds
// ============================================================================

/// What the derived identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Package,
    Type,
    Method,
    Field,
}

// ============================================================================
// Derivation
// ============================================================================

/// Derive a valid Java identifier from a Python name.
pub fn to_java(python_name: &str, kind: NameKind) -> String {
    let trimmed = python_name.trim_matches('_');
    let base = if trimmed.is_empty() { python_name } else { trimmed };
    let converted = match kind {
        NameKind::Package => base.to_ascii_lowercase(),
        NameKind::Type => pascal_case(base),
        NameKind::Method | NameKind::Field => camel_case(base),
    };
    escape(&converted, kind)
}

/// Name of the generated implementation class for an interface.
pub fn impl_name(interface_name: &str, suffix: &str) -> String {
    format!("{interface_name}{suffix}")
}

/// Discriminated-union case field name for an alternative's simple type name.
pub fn union_case_field(simple_name: &str) -> String {
    to_java(simple_name, NameKind::Field)
}

/// First duplicated name in `names`, if any. Input order is preserved so the
/// reported duplicate is deterministic.
pub fn find_duplicate<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Some(name);
        }
    }
    None
}

// ============================================================================
// Case Conversion
// ============================================================================

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, ch) in name.chars().enumerate() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else if i == 0 {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape(name: &str, kind: NameKind) -> String {
    if !is_reserved(name) {
        return name.to_string();
    }
    match kind {
        NameKind::Method | NameKind::Field => format!("{name}Value"),
        NameKind::Package => format!("{name}_"),
        // PascalCase never collides with the lowercase keywords, but keep
        // the escape total.
        NameKind::Type => format!("{name}Type"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod methods_and_fields {
        use super::*;

        #[test]
        fn snake_case_becomes_camel_case() {
            assert_eq!(to_java("make_circle", NameKind::Method), "makeCircle");
            assert_eq!(to_java("line_width", NameKind::Field), "lineWidth");
        }

        #[test]
        fn existing_camel_case_is_preserved() {
            assert_eq!(to_java("copyWith", NameKind::Method), "copyWith");
        }

        #[test]
        fn keywords_get_value_suffix() {
            assert_eq!(to_java("int", NameKind::Field), "intValue");
            assert_eq!(to_java("float", NameKind::Field), "floatValue");
            assert_eq!(to_java("new", NameKind::Method), "newValue");
        }

        #[test]
        fn non_keyword_builtin_names_pass_through() {
            assert_eq!(to_java("bool", NameKind::Field), "bool");
            assert_eq!(to_java("str", NameKind::Field), "str");
            assert_eq!(to_java("complex", NameKind::Field), "complex");
        }

        #[test]
        fn leading_underscores_are_stripped() {
            assert_eq!(to_java("_internal_name", NameKind::Method), "internalName");
        }
    }

    mod types {
        use super::*;

        #[test]
        fn lowercase_class_names_are_pascal_cased() {
            assert_eq!(to_java("class01", NameKind::Type), "Class01");
            assert_eq!(to_java("my_class", NameKind::Type), "MyClass");
        }

        #[test]
        fn pascal_case_is_preserved() {
            assert_eq!(to_java("Circle", NameKind::Type), "Circle");
        }

        #[test]
        fn impl_suffix_is_appended() {
            assert_eq!(impl_name("Circle", "Impl"), "CircleImpl");
        }
    }

    mod packages {
        use super::*;

        #[test]
        fn package_segments_stay_lowercase() {
            assert_eq!(to_java("MyPkg", NameKind::Package), "mypkg");
        }

        #[test]
        fn keyword_segments_get_underscore() {
            assert_eq!(to_java("import", NameKind::Package), "import_");
        }
    }

    mod collisions {
        use super::*;

        #[test]
        fn duplicate_detection_reports_first_repeat() {
            let names = ["circle", "square", "circle"];
            assert_eq!(find_duplicate(names), Some("circle"));
        }

        #[test]
        fn distinct_names_pass() {
            let names = ["bool", "complex", "floatValue", "intValue", "str"];
            assert_eq!(find_duplicate(names), None);
        }
    }
}

//! Java source assembly.
//!
//! [`SourceBuilder`] handles indentation-aware line emission;
//! [`CompilationUnit`] assembles a complete `.java` file from a package
//! declaration, a sorted import set and the rendered type body. Output is
//! fully deterministic: imports are kept in a sorted set, and nothing in the
//! rendering depends on iteration order of a hash map or on the clock —
//! synthesizing the same input twice yields byte-identical text.

use std::collections::BTreeSet;

const INDENT: &str = "    ";

// ============================================================================
// Source Builder
// ============================================================================

/// Incrementally builds indented Java source text.
#[derive(Debug, Default)]
pub struct SourceBuilder {
    content: String,
    level: usize,
}

impl SourceBuilder {
    pub fn new() -> Self {
        SourceBuilder::default()
    }

    /// Append a line at the current indentation.
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.level {
                self.content.push_str(INDENT);
            }
            self.content.push_str(text);
        }
        self.content.push('\n');
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.content.push('\n');
    }

    /// Open a brace-delimited block: emits `header {` and indents.
    pub fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.level += 1;
    }

    /// Close the current block: dedents and emits `}`.
    pub fn close(&mut self) {
        self.level = self.level.saturating_sub(1);
        self.line("}");
    }

    /// Append pre-rendered text verbatim, re-indenting each line.
    pub fn nested(&mut self, rendered: &str) {
        for line in rendered.lines() {
            if line.is_empty() {
                self.blank();
            } else {
                self.line(line);
            }
        }
    }

    pub fn finish(self) -> String {
        self.content
    }
}

// ============================================================================
// Compilation Unit
// ============================================================================

/// One generated `.java` file.
#[derive(Debug)]
pub struct CompilationUnit {
    /// Java package of the unit.
    pub package: String,
    /// Fully-qualified name of the unit's top-level type; imports of the
    /// type's own nested members are dropped at rendering time.
    pub type_fqn: String,
    imports: BTreeSet<String>,
    body: String,
}

impl CompilationUnit {
    pub fn new(package: impl Into<String>, type_fqn: impl Into<String>) -> Self {
        CompilationUnit {
            package: package.into(),
            type_fqn: type_fqn.into(),
            imports: BTreeSet::new(),
            body: String::new(),
        }
    }

    /// Register an import by fully-qualified name.
    pub fn add_import(&mut self, fqn: impl Into<String>) {
        self.imports.insert(fqn.into());
    }

    /// Register every import a set requires.
    pub fn add_imports(&mut self, fqns: &BTreeSet<String>) {
        self.imports.extend(fqns.iter().cloned());
    }

    /// Set the rendered type body.
    pub fn set_body(&mut self, body: String) {
        self.body = body;
    }

    /// Render the complete file.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&format!("package {};\n\n", self.package));
        }
        let own_prefix = format!("{}.", self.type_fqn);
        let retained: Vec<&String> = self
            .imports
            .iter()
            .filter(|fqn| {
                fqn.as_str() != self.type_fqn
                    && !fqn.starts_with(&own_prefix)
                    && crate::jtype::package_of(fqn) != self.package
            })
            .collect();
        if !retained.is_empty() {
            for fqn in &retained {
                out.push_str(&format!("import {fqn};\n"));
            }
            out.push('\n');
        }
        out.push_str(&self.body);
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

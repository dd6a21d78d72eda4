//! Generation context.
//!
//! A [`GenContext`] mirrors the module→class→function nesting being visited.
//! Effective properties are computed once when a scope is pushed and cached
//! on the stack entry; queries read the top of the stack instead of
//! re-walking a parent chain.

use std::path::Path;

use javabind_core::config::{Config, PropertyMap};
use javabind_core::properties;
use javabind_core::symbols::TypedModule;

// ============================================================================
// Scopes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    name: String,
    props: PropertyMap,
}

// ============================================================================
// Context
// ============================================================================

/// Visit-scoped state for one module's synthesis.
#[derive(Debug)]
pub struct GenContext<'a> {
    /// The module being synthesized.
    pub module: &'a TypedModule,
    /// Java package computed for the module.
    pub package: String,
    scopes: Vec<Scope>,
}

impl<'a> GenContext<'a> {
    /// Open a context at module scope.
    pub fn for_module(config: &Config, module: &'a TypedModule, package: String) -> Self {
        let props = properties::module_scope(config, &module.path);
        GenContext {
            module,
            package,
            scopes: vec![Scope {
                kind: ScopeKind::Module,
                name: module.fullname.clone(),
                props,
            }],
        }
    }

    /// Enter a class scope; properties are resolved against the current top.
    pub fn push_class(&mut self, class_name: &str) {
        let props = properties::class_scope(self.props(), class_name);
        self.scopes.push(Scope {
            kind: ScopeKind::Class,
            name: class_name.to_string(),
            props,
        });
    }

    /// Enter a function scope.
    pub fn push_function(&mut self, function_name: &str) {
        let props = properties::function_scope(self.props(), function_name);
        self.scopes.push(Scope {
            kind: ScopeKind::Function,
            name: function_name.to_string(),
            props,
        });
    }

    /// Leave the innermost scope. The module scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Effective properties of the innermost scope.
    pub fn props(&self) -> &PropertyMap {
        &self.scopes.last().expect("module scope always present").props
    }

    /// True when the innermost scope is marked skipped (unmatched whitelist
    /// or ignore marker). Meaningful at class scope.
    pub fn is_skipped(&self) -> bool {
        properties::is_skipped(self.props())
    }

    /// True when an `ignore` marker is in scope; used at module and
    /// function scope, where an unconsumed class whitelist does not gate.
    pub fn is_ignored(&self) -> bool {
        properties::is_ignored(self.props())
    }

    /// Kind of the innermost scope.
    pub fn kind(&self) -> ScopeKind {
        self.scopes.last().expect("module scope always present").kind
    }

    /// Dotted path of scope names from the module down, for diagnostics.
    pub fn location(&self) -> String {
        let names: Vec<&str> = self.scopes.iter().map(|s| s.name.as_str()).collect();
        names.join(".")
    }

    /// Source path of the module, for diagnostics.
    pub fn module_path(&self) -> &Path {
        &self.module.path
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Configuration-scoped property resolution.
//!
//! Effective generation options for a node are computed by merging property
//! maps along the scope chain: global defaults, then the per-file override
//! block matching the module, then class-level gating and overrides, then
//! per-function overrides. Deeper merges win on key conflicts.
//!
//! The class level carries the whitelist gate: when a `whitelist` key is in
//! scope, only listed classes proceed. A match removes the `whitelist` and
//! `ignore` markers and merges the entry's own overrides; no match leaves
//! the markers in place, and the synthesizer skips the class.
//!
//! Properties are computed once per scope during the top-down traversal and
//! cached on the generation context — there is no parent-chain re-walk per
//! query.

use std::path::Path;

use serde_json::Value;

use crate::config::{Config, PropertyMap};

// ============================================================================
// Well-Known Keys
// ============================================================================

/// Class whitelist: object of `class name → overrides`, or array of names.
pub const KEY_WHITELIST: &str = "whitelist";
/// Skip marker.
pub const KEY_IGNORE: &str = "ignore";
/// Per-class override blocks: object of `class name → property map`.
pub const KEY_CLASSES: &str = "classes";
/// Per-function override blocks: object of `function name → property map`.
pub const KEY_FUNCTIONS: &str = "functions";
/// Generated-type visibility: `"public"` (default) or `"package"`.
pub const KEY_VISIBILITY: &str = "visibility";
/// Toggle for default-implementation stub generation.
pub const KEY_GENERATE_IMPL: &str = "generate_impl";
/// Suffix for generated implementation classes.
pub const KEY_IMPL_SUFFIX: &str = "impl_suffix";

// ============================================================================
// Merging
// ============================================================================

/// Merge `overlay` into `base`; overlay keys win.
pub fn merge(base: &PropertyMap, overlay: &PropertyMap) -> PropertyMap {
    let mut result = base.clone();
    for (key, value) in overlay {
        result.insert(key.clone(), value.clone());
    }
    result
}

// ============================================================================
// Scope Resolution
// ============================================================================

/// Effective properties at module scope: global defaults plus the matching
/// per-file override block.
pub fn module_scope(config: &Config, module_path: &Path) -> PropertyMap {
    match config.file_overrides(module_path) {
        Some(overrides) => merge(&config.defaults, overrides),
        None => config.defaults.clone(),
    }
}

/// Effective properties at class scope.
///
/// Applies the whitelist gate first, then the per-class override block.
pub fn class_scope(parent: &PropertyMap, class_name: &str) -> PropertyMap {
    let mut props = parent.clone();

    if let Some(whitelist) = props.get(KEY_WHITELIST).cloned() {
        if let Some(entry_overrides) = whitelist_entry(&whitelist, class_name) {
            props.remove(KEY_WHITELIST);
            props.remove(KEY_IGNORE);
            props = merge(&props, &entry_overrides);
        }
        // No match: markers stay; the synthesizer skips this class.
    }

    if let Some(overrides) = named_block(&props, KEY_CLASSES, class_name) {
        props = merge(&props, &overrides);
    }
    props
}

/// Effective properties at function scope.
pub fn function_scope(parent: &PropertyMap, function_name: &str) -> PropertyMap {
    match named_block(parent, KEY_FUNCTIONS, function_name) {
        Some(overrides) => merge(parent, &overrides),
        None => parent.clone(),
    }
}

/// True when the effective properties mark a class scope as skipped: an
/// unmatched whitelist still in scope, or a truthy `ignore`.
pub fn is_skipped(props: &PropertyMap) -> bool {
    if props.contains_key(KEY_WHITELIST) {
        return true;
    }
    is_ignored(props)
}

/// True when a truthy `ignore` marker is in scope. The whitelist gate is a
/// class-level mechanism; module and function scopes consult only this.
pub fn is_ignored(props: &PropertyMap) -> bool {
    matches!(props.get(KEY_IGNORE), Some(Value::Bool(true)))
}

/// String-valued property accessor.
pub fn get_str<'a>(props: &'a PropertyMap, key: &str) -> Option<&'a str> {
    props.get(key).and_then(Value::as_str)
}

/// Bool-valued property accessor.
pub fn get_bool(props: &PropertyMap, key: &str) -> Option<bool> {
    props.get(key).and_then(Value::as_bool)
}

// ============================================================================
// Helpers
// ============================================================================

/// Look up a whitelist entry for `class_name`.
///
/// Returns the entry's own overrides on a match (empty for array-form
/// whitelists), `None` when the class is not listed.
fn whitelist_entry(whitelist: &Value, class_name: &str) -> Option<PropertyMap> {
    match whitelist {
        Value::Object(entries) => entries.get(class_name).map(|v| match v {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => PropertyMap::new(),
        }),
        Value::Array(names) => names
            .iter()
            .any(|n| n.as_str() == Some(class_name))
            .then(PropertyMap::new),
        _ => None,
    }
}

/// Look up `props[block][name]` as a property map.
fn named_block(props: &PropertyMap, block: &str, name: &str) -> Option<PropertyMap> {
    props
        .get(block)?
        .as_object()?
        .get(name)?
        .as_object()
        .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

// ============================================================================
// Tests
// ============================================================================

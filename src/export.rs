//! Export writers.
//!
//! Two optional artifacts accompany the generated sources:
//!
//! - a flat type-map listing, one `pythonFQN=javaFQN` line per mapping the
//!   run produced or was configured with (builtin seeds excluded), and
//! - a native-image proxy descriptor naming every generated interface that
//!   must be proxy-accessible at runtime.
//!
//! Both are written sorted, so reruns produce identical bytes.

use std::fs;
use std::path::Path;

use serde_json::json;
use tracing::info;

use javabind_core::error::{JavabindError, JavabindResult};
use javabind_core::registry::{MappingOrigin, TypeRegistry};

/// Write the `pythonFQN=javaFQN` listing.
pub fn write_type_map(registry: &TypeRegistry, path: &Path) -> JavabindResult<()> {
    let mut out = String::new();
    for (python_fqn, mapping) in registry.entries() {
        if mapping.origin == MappingOrigin::Builtin {
            continue;
        }
        out.push_str(python_fqn);
        out.push('=');
        out.push_str(&mapping.java_fqn);
        out.push('\n');
    }
    write(path, out.as_bytes())?;
    info!(path = %path.display(), "type map exported");
    Ok(())
}

/// Write the native-image proxy/reflection descriptor.
pub fn write_proxy_config(registry: &TypeRegistry, path: &Path) -> JavabindResult<()> {
    let entries: Vec<serde_json::Value> = registry
        .generated_entries()
        .map(|(_, mapping)| json!({ "interfaces": [mapping.java_fqn] }))
        .collect();
    let text = serde_json::to_string_pretty(&entries)
        .map_err(|err| JavabindError::internal(format!("proxy config serialization: {err}")))?;
    write(path, text.as_bytes())?;
    info!(path = %path.display(), interfaces = entries.len(), "proxy config exported");
    Ok(())
}

fn write(path: &Path, bytes: &[u8]) -> JavabindResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| JavabindError::Output {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).map_err(|source| JavabindError::Output {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================

//! Type-analysis oracle client.
//!
//! The generator does not type-check Python itself; it consumes the typed
//! symbol model produced by an external analyzer (a mypy-backed driver in
//! the reference setup). [`TypeOracle`] is the only contract the core
//! requires — any backend producing the same JSON shape is substitutable:
//!
//! ```json
//! { "mypkg.shapes": { "fullname": "mypkg.shapes", "path": "...", "defs": [...] } }
//! ```
//!
//! [`AnalyzerOracle`] shells out to the analyzer executable (discovered on
//! `PATH`), reads the mapping from its stdout, and caches results on disk
//! keyed by a content hash of the requested paths. Analysis calls are
//! synchronous and block until the analyzer finishes; there is no
//! cancellation. An analyzer that exits non-zero is a fatal run-level error
//! carrying the analyzer's own status code.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use javabind_core::error::JavabindError;
use javabind_core::symbols::TypedModule;

/// Analyzer executable searched on `PATH`.
pub const ANALYZER_COMMAND: &str = "javabind-analyzer";

// ============================================================================
// Error Types
// ============================================================================

/// Errors from the oracle layer.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The analyzer executable was not found.
    #[error("analyzer '{command}' not found on PATH: {source}")]
    AnalyzerNotFound {
        command: String,
        #[source]
        source: which::Error,
    },

    /// The analyzer exited with a failure status.
    #[error("analyzer exited with status {status:?}")]
    AnalyzerFailed { status: Option<i32>, stderr: String },

    /// Reading a cache file or the analyzer's output failed.
    #[error("oracle IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The analyzer's output was not a valid typed-module mapping.
    #[error("cannot parse analyzer output: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<OracleError> for JavabindError {
    fn from(err: OracleError) -> Self {
        let status = match &err {
            OracleError::AnalyzerFailed { status, .. } => *status,
            _ => None,
        };
        JavabindError::Oracle {
            message: err.to_string(),
            status,
        }
    }
}

/// Result type for oracle operations.
pub type OracleResult<T> = Result<T, OracleError>;

/// The typed symbol model for a set of analyzed modules, keyed by module
/// FQN. `BTreeMap` so processing order is stable.
pub type ModuleMap = BTreeMap<String, TypedModule>;

// ============================================================================
// Oracle Trait
// ============================================================================

/// Contract to the external type-analysis engine.
pub trait TypeOracle {
    /// Analyze the given files/directories and return the typed modules.
    fn analyze(&self, paths: &[PathBuf]) -> OracleResult<ModuleMap>;
}

/// Load a previously serialized analysis result.
pub fn deserialize(cache_file: &Path) -> OracleResult<ModuleMap> {
    let text = fs::read_to_string(cache_file)?;
    Ok(serde_json::from_str(&text)?)
}

// ============================================================================
// Analyzer Subprocess Oracle
// ============================================================================

/// Oracle backed by the analyzer executable.
#[derive(Debug)]
pub struct AnalyzerOracle {
    command: PathBuf,
    /// Directory for cached analysis results; `None` disables caching.
    cache_dir: Option<PathBuf>,
}

impl AnalyzerOracle {
    /// Locate the analyzer on `PATH`, caching under the user cache dir.
    pub fn discover() -> OracleResult<Self> {
        let command =
            which::which(ANALYZER_COMMAND).map_err(|source| OracleError::AnalyzerNotFound {
                command: ANALYZER_COMMAND.to_string(),
                source,
            })?;
        Ok(AnalyzerOracle {
            command,
            cache_dir: dirs::cache_dir().map(|dir| dir.join("javabind")),
        })
    }

    /// Use an explicit analyzer executable.
    pub fn with_command(command: impl Into<PathBuf>) -> Self {
        AnalyzerOracle {
            command: command.into(),
            cache_dir: None,
        }
    }

    /// Override the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    fn cache_file(&self, paths: &[PathBuf]) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        Some(dir.join(format!("{}.json", cache_key(paths))))
    }

    fn run_analyzer(&self, paths: &[PathBuf]) -> OracleResult<String> {
        let output = Command::new(&self.command).args(paths).output()?;
        if !output.status.success() {
            return Err(OracleError::AnalyzerFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TypeOracle for AnalyzerOracle {
    fn analyze(&self, paths: &[PathBuf]) -> OracleResult<ModuleMap> {
        if let Some(cache_file) = self.cache_file(paths) {
            if cache_file.is_file() {
                debug!(cache = %cache_file.display(), "using cached analysis");
                return deserialize(&cache_file);
            }
        }

        info!(command = %self.command.display(), files = paths.len(), "running type analysis");
        let stdout = self.run_analyzer(paths)?;
        let modules: ModuleMap = serde_json::from_str(&stdout)?;

        if let Some(cache_file) = self.cache_file(paths) {
            if let Some(parent) = cache_file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&cache_file, &stdout)?;
            debug!(cache = %cache_file.display(), "analysis cached");
        }
        Ok(modules)
    }
}

/// Cache key over the requested paths: stable for the same path set in any
/// order.
fn cache_key(paths: &[PathBuf]) -> String {
    let mut sorted: Vec<String> = paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    sorted.sort_unstable();
    let mut hasher = Sha256::new();
    for path in &sorted {
        hasher.update(path.as_bytes());
        hasher.update([0]);
    }
    hex::encode(&hasher.finalize()[..16])
}

// ============================================================================
// Static Oracle (tests, pre-serialized models)
// ============================================================================

/// Oracle over an in-memory module map; answers `analyze` by matching each
/// module's source path against the requested files and directories.
#[derive(Debug, Default)]
pub struct StaticOracle {
    modules: ModuleMap,
}

impl StaticOracle {
    pub fn new(modules: impl IntoIterator<Item = TypedModule>) -> Self {
        StaticOracle {
            modules: modules
                .into_iter()
                .map(|m| (m.fullname.clone(), m))
                .collect(),
        }
    }
}

impl TypeOracle for StaticOracle {
    fn analyze(&self, paths: &[PathBuf]) -> OracleResult<ModuleMap> {
        let selected = self
            .modules
            .iter()
            .filter(|(_, module)| {
                paths
                    .iter()
                    .any(|p| module.path == *p || module.path.starts_with(p))
            })
            .map(|(fqn, module)| (fqn.clone(), module.clone()))
            .collect();
        Ok(selected)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use javabind_core::symbols::TypedModule;

    #[test]
    fn cache_key_is_order_insensitive() {
        let a = cache_key(&[PathBuf::from("x.py"), PathBuf::from("y.py")]);
        let b = cache_key(&[PathBuf::from("y.py"), PathBuf::from("x.py")]);
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_distinguishes_path_sets() {
        let a = cache_key(&[PathBuf::from("x.py")]);
        let b = cache_key(&[PathBuf::from("z.py")]);
        assert_ne!(a, b);
    }

    #[test]
    fn deserialize_round_trips_module_map() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = tmp.path().join("analysis.json");
        let mut modules = ModuleMap::new();
        modules.insert(
            "mypkg.shapes".to_string(),
            TypedModule::new("mypkg.shapes", "/proj/mypkg/shapes.py"),
        );
        std::fs::write(&cache, serde_json::to_string(&modules).unwrap()).unwrap();

        let loaded = deserialize(&cache).unwrap();
        assert_eq!(loaded, modules);
    }

    #[test]
    fn static_oracle_selects_by_directory() {
        let oracle = StaticOracle::new([
            TypedModule::new("mypkg.shapes", "/proj/mypkg/shapes.py"),
            TypedModule::new("other.stuff", "/elsewhere/other/stuff.py"),
        ]);
        let result = oracle.analyze(&[PathBuf::from("/proj/mypkg")]).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result.contains_key("mypkg.shapes"));
    }

    #[test]
    fn static_oracle_selects_by_exact_file() {
        let oracle = StaticOracle::new([TypedModule::new("mypkg.shapes", "/proj/mypkg/shapes.py")]);
        let result = oracle
            .analyze(&[PathBuf::from("/proj/mypkg/shapes.py")])
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn analyzer_failure_propagates_status() {
        let err = OracleError::AnalyzerFailed {
            status: Some(42),
            stderr: "boom".to_string(),
        };
        let bridged = JavabindError::from(err);
        assert_eq!(bridged.exit_status().code(), 42);
    }
}

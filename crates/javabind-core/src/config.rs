//! Generator configuration.
//!
//! The configuration is a JSON document loaded once at startup and immutable
//! afterwards. It names the target folder and packages, the files and
//! directories to process (optionally with per-entry override maps), global
//! generation properties, type-mapping overrides, and the optional export
//! outputs.
//!
//! Validation happens before any synthesis starts; a missing target folder
//! or an empty file list aborts the run with a configuration error and no
//! partial output.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use thiserror::Error;

/// Free-form generation properties, merged along the module→class→function
/// scope chain by the property resolver.
pub type PropertyMap = BTreeMap<String, serde_json::Value>;

// ============================================================================
// Error Types
// ============================================================================

/// Errors loading or validating a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON or has the wrong shape.
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration is structurally valid but violates a constraint.
    #[error("invalid config: {message}")]
    Validation { message: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// ============================================================================
// Configuration
// ============================================================================

/// The loaded generator configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Folder all generated sources are written under.
    pub target_folder: PathBuf,
    /// Java package generated interfaces are rooted at.
    pub interface_package: String,
    /// Java package for generated implementation stubs. Defaults to the
    /// interface package.
    #[serde(default)]
    pub implementation_package: Option<String>,
    /// Python package-name prefix stripped from module names before they
    /// are appended to the interface package.
    #[serde(default)]
    pub python_prefix: Option<String>,
    /// Files and directories to process.
    pub files: Vec<FileEntry>,
    /// Global generation properties; overridable per file, class, function.
    #[serde(default)]
    pub defaults: PropertyMap,
    /// Python FQN → Java FQN overrides applied to the type registry.
    #[serde(default)]
    pub type_mappings: BTreeMap<String, String>,
    /// When set, write the flat `pythonFQN=javaFQN` listing to this path.
    #[serde(default)]
    pub export_types: Option<PathBuf>,
    /// When set, write the native-image proxy descriptor to this path.
    #[serde(default)]
    pub proxy_config: Option<PathBuf>,
}

impl Config {
    /// Load and validate a configuration document.
    pub fn load(path: &Path) -> ConfigResult<Config> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON string (test construction).
    pub fn from_json(text: &str) -> ConfigResult<Config> {
        let config: Config =
            serde_json::from_str(text).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.target_folder.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                message: "target_folder must not be empty".to_string(),
            });
        }
        if self.interface_package.is_empty() {
            return Err(ConfigError::Validation {
                message: "interface_package must not be empty".to_string(),
            });
        }
        if self.files.is_empty() {
            return Err(ConfigError::Validation {
                message: "files must list at least one file or directory".to_string(),
            });
        }
        for entry in &self.files {
            if entry.path().as_os_str().is_empty() {
                return Err(ConfigError::Validation {
                    message: "file entry with empty path".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The effective implementation package.
    pub fn implementation_package(&self) -> &str {
        self.implementation_package
            .as_deref()
            .unwrap_or(&self.interface_package)
    }

    /// Paths of all configured file entries.
    pub fn entry_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|e| e.path().to_path_buf()).collect()
    }

    /// The per-file override block matching a module's source path, if any.
    /// First matching entry wins, in configuration order.
    pub fn file_overrides(&self, module_path: &Path) -> Option<&PropertyMap> {
        self.files
            .iter()
            .find(|entry| entry.matches(module_path))
            .map(|entry| entry.properties())
            .filter(|props| !props.is_empty())
    }
}

// ============================================================================
// File Entries
// ============================================================================

/// One configured file or directory, optionally with an override map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    /// Bare path.
    Plain(PathBuf),
    /// Path plus generation-property overrides for everything in it.
    WithOverrides {
        path: PathBuf,
        #[serde(flatten)]
        properties: PropertyMap,
    },
}

impl FileEntry {
    /// The configured path or glob.
    pub fn path(&self) -> &Path {
        match self {
            FileEntry::Plain(path) => path,
            FileEntry::WithOverrides { path, .. } => path,
        }
    }

    /// Override properties for this entry (empty for bare paths).
    pub fn properties(&self) -> &PropertyMap {
        static EMPTY: PropertyMap = PropertyMap::new();
        match self {
            FileEntry::Plain(_) => &EMPTY,
            FileEntry::WithOverrides { properties, .. } => properties,
        }
    }

    /// True when this entry's path matches the module's source file.
    ///
    /// Package-init modules are matched by their directory: an entry naming
    /// `mypkg` matches `mypkg/__init__.py`. Entries containing glob
    /// metacharacters are matched with [`globset`]; everything else matches
    /// by trailing path components.
    pub fn matches(&self, module_path: &Path) -> bool {
        let configured = self.path();
        let effective = strip_package_init(module_path);

        if let Some(matcher) = self.glob_matcher() {
            return matcher.is_match(effective) || matcher.is_match(module_path);
        }
        effective.ends_with(configured)
            || module_path.ends_with(configured)
            || configured.ends_with(effective)
    }

    fn glob_matcher(&self) -> Option<GlobMatcher> {
        let text = self.path().to_string_lossy();
        if text.contains(['*', '?', '[']) {
            Glob::new(&text).ok().map(|g| g.compile_matcher())
        } else {
            None
        }
    }
}

/// For `pkg/__init__.py`, the matchable path is the package directory.
fn strip_package_init(path: &Path) -> &Path {
    if path.file_name().is_some_and(|name| name == "__init__.py") {
        path.parent().unwrap_or(path)
    } else {
        path
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "target_folder": "generated",
        "interface_package": "com.example.api",
        "files": ["src/mypkg"]
    }"#;

    mod loading {
        use super::*;

        #[test]
        fn minimal_config_parses() {
            let config = Config::from_json(MINIMAL).unwrap();
            assert_eq!(config.target_folder, PathBuf::from("generated"));
            assert_eq!(config.interface_package, "com.example.api");
            assert_eq!(config.implementation_package(), "com.example.api");
            assert_eq!(config.entry_paths(), vec![PathBuf::from("src/mypkg")]);
        }

        #[test]
        fn full_config_parses() {
            let config = Config::from_json(
                r#"{
                    "target_folder": "out",
                    "interface_package": "com.example.api",
                    "implementation_package": "com.example.impl",
                    "python_prefix": "mypkg",
                    "files": [
                        "src/mypkg",
                        {"path": "src/mypkg/special.py", "visibility": "package"}
                    ],
                    "defaults": {"generate_impl": true},
                    "type_mappings": {"builtins.complex": "org.example.Complex"},
                    "export_types": "out/types.txt",
                    "proxy_config": "out/proxy-config.json"
                }"#,
            )
            .unwrap();
            assert_eq!(config.implementation_package(), "com.example.impl");
            assert_eq!(config.files.len(), 2);
            assert_eq!(
                config.type_mappings.get("builtins.complex").unwrap(),
                "org.example.Complex"
            );
        }

        #[test]
        fn missing_target_folder_is_a_parse_error() {
            let err = Config::from_json(
                r#"{"interface_package": "com.example", "files": ["a"]}"#,
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::Parse { .. }));
        }

        #[test]
        fn empty_files_fails_validation() {
            let err = Config::from_json(
                r#"{"target_folder": "t", "interface_package": "p", "files": []}"#,
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::Validation { .. }));
        }

        #[test]
        fn unknown_top_level_keys_are_rejected() {
            let err = Config::from_json(
                r#"{"target_folder": "t", "interface_package": "p", "files": ["a"], "bogus": 1}"#,
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::Parse { .. }));
        }

        #[test]
        fn load_reports_missing_file() {
            let err = Config::load(Path::new("/nonexistent/config.json")).unwrap_err();
            assert!(matches!(err, ConfigError::Io { .. }));
        }
    }

    mod file_matching {
        use super::*;

        fn entry(json: &str) -> FileEntry {
            serde_json::from_str(json).unwrap()
        }

        #[test]
        fn plain_entry_matches_by_suffix() {
            let e = entry(r#""mypkg/shapes.py""#);
            assert!(e.matches(Path::new("/proj/src/mypkg/shapes.py")));
            assert!(!e.matches(Path::new("/proj/src/mypkg/colors.py")));
        }

        #[test]
        fn package_init_matches_directory_entry() {
            let e = entry(r#""src/mypkg""#);
            assert!(e.matches(Path::new("/proj/src/mypkg/__init__.py")));
        }

        #[test]
        fn glob_entry_matches() {
            let e = entry(r#"{"path": "**/shapes.py", "visibility": "package"}"#);
            assert!(e.matches(Path::new("/proj/src/mypkg/shapes.py")));
            assert!(!e.matches(Path::new("/proj/src/mypkg/colors.py")));
            assert_eq!(
                e.properties().get("visibility").unwrap().as_str(),
                Some("package")
            );
        }

        #[test]
        fn file_overrides_returns_first_matching_block() {
            let config = Config::from_json(
                r#"{
                    "target_folder": "t",
                    "interface_package": "p",
                    "files": [
                        {"path": "mypkg/shapes.py", "visibility": "package"},
                        "mypkg"
                    ]
                }"#,
            )
            .unwrap();
            let overrides = config
                .file_overrides(Path::new("/proj/mypkg/shapes.py"))
                .unwrap();
            assert_eq!(overrides.get("visibility").unwrap().as_str(), Some("package"));
            assert!(config
                .file_overrides(Path::new("/proj/mypkg/colors.py"))
                .is_none());
        }
    }
}

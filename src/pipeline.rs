//! Generation pipeline.
//!
//! Drives the multi-round fixed point over the project's source files:
//!
//! 1. **Seed** — round one analyzes exactly the configured files and
//!    directories.
//! 2. **Expand** — after each round, names that missed the registry are
//!    handed to the tracker, which locates their owning modules; eligible,
//!    not-yet-visited files form the next round's active set.
//! 3. **Fixed point** — a round that adds no new files ends discovery.
//!
//! During discovery, every visited module is re-synthesized each round so
//! placeholder resolutions are revisited as registrations accumulate;
//! nothing is written yet. Once the registry is complete, a final emission
//! pass renders every module and writes the files — a placeholder is thus
//! replaced by regenerating its file, never by patching written source.
//!
//! The registry and tracker live exactly as long as one [`Pipeline::run`]
//! call. Runs are single-threaded; concurrent runs over shared state are
//! not supported.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use javabind_core::config::Config;
use javabind_core::error::{JavabindError, JavabindResult};
use javabind_core::registry::{MappingOrigin, TypeRegistry};
use javabind_core::tracker::UnresolvedTracker;
use javabind_java::synth::Synthesizer;

use crate::export;
use crate::oracle::{ModuleMap, TypeOracle};

// ============================================================================
// Run Report
// ============================================================================

/// Summary of one generation run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Discovery rounds until the fixed point.
    pub rounds: usize,
    /// Absolute paths of all written files.
    pub files_written: Vec<PathBuf>,
    /// Declarations skipped with a diagnostic: `(python FQN, reason)`.
    pub skipped: Vec<(String, String)>,
    /// Type names that remained unresolvable after the fixed point.
    pub unresolved: Vec<String>,
}

// ============================================================================
// Pipeline
// ============================================================================

/// One generation run over a validated configuration.
pub struct Pipeline<'a> {
    config: &'a Config,
    oracle: &'a dyn TypeOracle,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, oracle: &'a dyn TypeOracle) -> Self {
        Pipeline { config, oracle }
    }

    pub fn run(&self) -> JavabindResult<RunReport> {
        let mut registry = TypeRegistry::new();
        for (python_fqn, java_fqn) in &self.config.type_mappings {
            registry.register(python_fqn.clone(), java_fqn.clone(), MappingOrigin::Config);
        }

        let roots = self.config.entry_paths();
        let mut tracker = UnresolvedTracker::new();
        tracker.seed(&roots);

        // Discovery rounds.
        let mut visited = ModuleMap::new();
        let mut active = roots;
        let mut rounds = 0;
        loop {
            rounds += 1;
            let new_modules = self.oracle.analyze(&active)?;
            debug!(round = rounds, new = new_modules.len(), "analysis complete");
            visited.extend(new_modules);
            // A requested file counts as processed even when the oracle
            // returned no module for it; re-requesting cannot help.
            for path in &active {
                tracker.mark_visited(path);
            }

            let dead: BTreeSet<String> = tracker.dead_ends().map(String::from).collect();
            for module in visited.values() {
                let mut synthesizer = Synthesizer::new(self.config, &mut registry, dead.clone());
                // Discovery only: registrations and misses matter, text is
                // discarded until the registry is complete.
                let _ = synthesizer.synthesize_module(module);
                tracker.mark_visited(&module.path);
            }

            for name in registry.take_misses() {
                tracker.record(&name);
            }
            let next = tracker.next_round();
            if next.is_empty() {
                break;
            }
            info!(round = rounds + 1, files = next.len(), "pulling in additional modules");
            active = next;
        }
        info!(rounds, modules = visited.len(), "fixed point reached");

        // Final emission with the complete registry.
        let dead: BTreeSet<String> = tracker.dead_ends().map(String::from).collect();
        let mut report = RunReport {
            rounds,
            ..RunReport::default()
        };
        for module in visited.values() {
            let mut synthesizer = Synthesizer::new(self.config, &mut registry, dead.clone());
            let output = synthesizer.synthesize_module(module);
            for skip in &output.skipped {
                warn!(
                    declaration = %skip.fullname,
                    module = %skip.module_path.display(),
                    reason = %skip.reason,
                    "declaration skipped"
                );
                report
                    .skipped
                    .push((skip.fullname.clone(), skip.reason.to_string()));
            }
            for file in output.files {
                let path = self.config.target_folder.join(&file.relative_path);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|source| JavabindError::Output {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                fs::write(&path, &file.source).map_err(|source| JavabindError::Output {
                    path: path.clone(),
                    source,
                })?;
                report.files_written.push(path);
            }
        }
        // Misses recorded during emission were already classified above.
        registry.take_misses();

        if let Some(path) = &self.config.export_types {
            export::write_type_map(&registry, path)?;
        }
        if let Some(path) = &self.config.proxy_config {
            export::write_proxy_config(&registry, path)?;
        }

        report.unresolved = tracker.dead_ends().map(String::from).collect();
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use javabind_core::pytype::PyType;
    use javabind_core::symbols::{ClassDef, Definition, FuncDef, TypedModule};

    use crate::oracle::StaticOracle;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    /// Three modules referencing each other in a cycle: a -> b -> c -> a.
    fn cyclic_project(root: &Path) -> StaticOracle {
        let class_with_ref = |module: &str, class: &str, target: &str| {
            TypedModule::new(
                format!("mypkg.{module}"),
                root.join(format!("mypkg/{module}.py")),
            )
            .with_def(Definition::ClassDef(
                ClassDef::new(class, format!("mypkg.{module}.{class}")).with_def(
                    Definition::FuncDef(
                        FuncDef::new("next", format!("mypkg.{module}.{class}.next"))
                            .with_ret(PyType::instance(target)),
                    ),
                ),
            ))
        };
        StaticOracle::new([
            class_with_ref("a", "A", "mypkg.b.B"),
            class_with_ref("b", "B", "mypkg.c.C"),
            class_with_ref("c", "C", "mypkg.a.A"),
        ])
    }

    fn test_config(root: &Path, entry: &str, extra: &str) -> Config {
        Config::from_json(&format!(
            r#"{{
                "target_folder": "{target}",
                "interface_package": "com.example.api",
                "python_prefix": "mypkg",
                "files": ["{entry}"]
                {extra}
            }}"#,
            target = root.join("generated").display(),
            entry = entry,
        ))
        .unwrap()
    }

    #[test]
    fn cyclic_references_reach_fixed_point_within_file_count() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        let entry = touch(root, "mypkg/a.py");
        touch(root, "mypkg/b.py");
        touch(root, "mypkg/c.py");

        let oracle = cyclic_project(root);
        let config = test_config(root, &entry.display().to_string(), "");
        let report = Pipeline::new(&config, &oracle).run().unwrap();

        assert!(report.rounds <= 3, "rounds = {}", report.rounds);
        assert!(report.unresolved.is_empty());
        assert!(report.skipped.is_empty());

        let a = fs::read_to_string(root.join("generated/com/example/api/a/A.java")).unwrap();
        assert!(a.contains("public B next();"));
        assert!(a.contains("import com.example.api.b.B;"));
        let c = fs::read_to_string(root.join("generated/com/example/api/c/C.java")).unwrap();
        assert!(c.contains("public A next();"));
    }

    #[test]
    fn rerun_produces_byte_identical_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        let entry = touch(root, "mypkg/a.py");
        touch(root, "mypkg/b.py");
        touch(root, "mypkg/c.py");

        let oracle = cyclic_project(root);
        let config = test_config(root, &entry.display().to_string(), "");

        let first = Pipeline::new(&config, &oracle).run().unwrap();
        let snapshot: Vec<(PathBuf, String)> = first
            .files_written
            .iter()
            .map(|p| (p.clone(), fs::read_to_string(p).unwrap()))
            .collect();

        let second = Pipeline::new(&config, &oracle).run().unwrap();
        assert_eq!(first.files_written, second.files_written);
        for (path, before) in snapshot {
            assert_eq!(fs::read_to_string(&path).unwrap(), before, "{}", path.display());
        }
    }

    #[test]
    fn reference_outside_roots_is_reported_unresolved() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        let entry = touch(root, "mypkg/a.py");

        let oracle = StaticOracle::new([TypedModule::new("mypkg.a", entry.clone()).with_def(
            Definition::FuncDef(
                FuncDef::new("load", "mypkg.a.load").with_ret(PyType::instance("numpy.ndarray")),
            ),
        )]);
        let config = test_config(root, &entry.display().to_string(), "");
        let report = Pipeline::new(&config, &oracle).run().unwrap();

        assert_eq!(report.unresolved, vec!["numpy.ndarray".to_string()]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "mypkg.a.load");

        let a = fs::read_to_string(root.join("generated/com/example/api/a/A.java")).unwrap();
        assert!(!a.contains("load"));
    }

    #[test]
    fn exports_are_written_when_configured() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        let entry = touch(root, "mypkg/a.py");

        let oracle = StaticOracle::new([TypedModule::new("mypkg.a", entry.clone())
            .with_def(Definition::ClassDef(ClassDef::new("Widget", "mypkg.a.Widget")))]);
        let extra = format!(
            r#", "export_types": "{types}", "proxy_config": "{proxy}""#,
            types = root.join("out/types.txt").display(),
            proxy = root.join("out/proxy-config.json").display(),
        );
        let config = test_config(root, &entry.display().to_string(), &extra);
        Pipeline::new(&config, &oracle).run().unwrap();

        let types = fs::read_to_string(root.join("out/types.txt")).unwrap();
        assert!(types.contains("mypkg.a.Widget=com.example.api.a.Widget"));

        let proxy = fs::read_to_string(root.join("out/proxy-config.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&proxy).unwrap();
        let interfaces: Vec<&str> = parsed
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|e| e["interfaces"].as_array().unwrap())
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(interfaces.contains(&"com.example.api.a.Widget"));
    }
}

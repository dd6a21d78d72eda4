//! Unresolved-type bookkeeping and multi-round expansion.
//!
//! During synthesis the resolver records every `Instance` name that has no
//! registry entry yet. The [`UnresolvedTracker`] groups those names by the
//! module file that defines them and decides which files the next processing
//! round pulls in, until a round adds nothing new (the fixed point).
//!
//! Eligibility is bounded to the project's own source tree: only files under
//! the top-level roots of the first round may be pulled in automatically.
//! A directory root admits every `.py` file beneath it, nested subpackages
//! included; a single-file root admits the files of its parent directory,
//! non-recursively. A module outside every root stays unresolved and its
//! dependents receive the terminal-failure treatment in the resolver.
//!
//! Iteration over names and files is sorted throughout, so round counts and
//! generated output are reproducible for identical input.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

// ============================================================================
// Eligibility Roots
// ============================================================================

/// One round-1 entry, as an eligibility boundary for later rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityRoot {
    /// A configured directory: everything under it is eligible.
    Tree(PathBuf),
    /// The parent directory of a configured single file: direct children
    /// are eligible, subdirectories are not.
    Siblings(PathBuf),
}

impl EligibilityRoot {
    fn admits(&self, path: &Path) -> bool {
        match self {
            EligibilityRoot::Tree(dir) => path.starts_with(dir),
            EligibilityRoot::Siblings(dir) => path.parent() == Some(dir.as_path()),
        }
    }

    fn scan_dir(&self) -> &Path {
        match self {
            EligibilityRoot::Tree(dir) => dir,
            EligibilityRoot::Siblings(dir) => dir,
        }
    }
}

// ============================================================================
// Record Outcome
// ============================================================================

/// What happened to a recorded unresolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The owning module was located and queued for a later round.
    Queued(PathBuf),
    /// The owning module was already processed; the name can no longer be
    /// resolved by pulling in files.
    Terminal,
    /// No owning module could be located under the eligibility roots.
    Orphaned,
}

// ============================================================================
// Tracker
// ============================================================================

/// Tracks unresolved type names and drives round expansion.
#[derive(Debug, Default)]
pub struct UnresolvedTracker {
    roots: Vec<EligibilityRoot>,
    /// Indexed `.py` files under the roots, sorted for deterministic matching.
    files: BTreeSet<PathBuf>,
    /// Unresolved names grouped by owning module file.
    pending: BTreeMap<PathBuf, BTreeSet<String>>,
    /// Names whose owning module cannot be pulled in (outside the roots or
    /// already processed without registering the name).
    dead_ends: BTreeSet<String>,
    /// Module files already processed in some round.
    visited: BTreeSet<PathBuf>,
}

impl UnresolvedTracker {
    pub fn new() -> Self {
        UnresolvedTracker::default()
    }

    /// Seed the eligibility roots from the first round's entries and index
    /// the `.py` files they admit.
    pub fn seed(&mut self, round_one: &[PathBuf]) {
        for entry in round_one {
            let root = if entry.is_dir() {
                EligibilityRoot::Tree(entry.clone())
            } else {
                match entry.parent() {
                    Some(parent) => EligibilityRoot::Siblings(parent.to_path_buf()),
                    None => continue,
                }
            };
            if !self.roots.contains(&root) {
                self.roots.push(root);
            }
        }
        self.reindex();
    }

    /// Rescan the roots for `.py` files.
    pub fn reindex(&mut self) {
        self.files.clear();
        for root in &self.roots {
            let recursive = matches!(root, EligibilityRoot::Tree(_));
            let walker = WalkDir::new(root.scan_dir()).max_depth(if recursive { usize::MAX } else { 1 });
            for entry in walker.into_iter().filter_map(Result::ok) {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "py") && root.admits(path) {
                    self.files.insert(path.to_path_buf());
                }
            }
        }
    }

    /// Mark a module file as processed. Its pending entry is removed — by
    /// now every type it defines has either been registered or has become a
    /// dead end.
    pub fn mark_visited(&mut self, path: &Path) {
        self.visited.insert(path.to_path_buf());
        self.pending.remove(path);
    }

    /// True when the file lies inside an eligibility root.
    pub fn is_eligible(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| root.admits(path))
    }

    /// Record an unresolved type name, locating its owning module.
    pub fn record(&mut self, python_fqn: &str) -> RecordOutcome {
        match self.locate_owning_module(python_fqn) {
            Some(module) if self.visited.contains(&module) => {
                debug!(name = python_fqn, module = %module.display(), "unresolved after module processed");
                self.dead_ends.insert(python_fqn.to_string());
                RecordOutcome::Terminal
            }
            Some(module) => {
                self.pending
                    .entry(module.clone())
                    .or_default()
                    .insert(python_fqn.to_string());
                RecordOutcome::Queued(module)
            }
            None => {
                debug!(name = python_fqn, "no owning module under eligibility roots");
                self.dead_ends.insert(python_fqn.to_string());
                RecordOutcome::Orphaned
            }
        }
    }

    /// Locate the module file defining `python_fqn`.
    ///
    /// Tries successively shorter dotted prefixes (a nested class drops more
    /// than one segment) and matches `<prefix>.py` and
    /// `<prefix>/__init__.py` against the indexed files by path suffix.
    /// Matching is over sorted files, so results are stable.
    pub fn locate_owning_module(&self, python_fqn: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = python_fqn.split('.').collect();
        if segments.len() < 2 {
            return None;
        }
        // Longest module prefix first: for a.b.C try a/b.py before a.py.
        for take in (1..segments.len()).rev() {
            let rel: PathBuf = segments[..take].iter().collect();
            let module_file = rel.with_extension("py");
            let package_init = rel.join("__init__.py");
            for file in &self.files {
                if file.ends_with(&module_file) || file.ends_with(&package_init) {
                    return Some(file.clone());
                }
            }
        }
        None
    }

    /// Files for the next round: pending owners not yet visited, sorted.
    /// Empty means the fixed point is reached.
    pub fn next_round(&self) -> Vec<PathBuf> {
        self.pending
            .keys()
            .filter(|path| !self.visited.contains(*path))
            .cloned()
            .collect()
    }

    /// Names that can no longer be resolved by pulling in files, sorted.
    pub fn dead_ends(&self) -> impl Iterator<Item = &str> {
        self.dead_ends.iter().map(String::as_str)
    }

    /// All names still pending, sorted, for diagnostics.
    pub fn pending_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .pending
            .values()
            .flat_map(|set| set.iter().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    fn project() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("proj");
        touch(&root, "mypkg/__init__.py");
        touch(&root, "mypkg/shapes.py");
        touch(&root, "mypkg/colors.py");
        touch(&root, "mypkg/nested/deep.py");
        touch(&root, "other/outside.py");
        (tmp, root)
    }

    mod eligibility {
        use super::*;

        #[test]
        fn directory_root_admits_nested_subpackages() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            assert!(tracker.is_eligible(&root.join("mypkg/shapes.py")));
            assert!(tracker.is_eligible(&root.join("mypkg/nested/deep.py")));
            assert!(!tracker.is_eligible(&root.join("other/outside.py")));
        }

        #[test]
        fn file_root_admits_siblings_but_not_subdirectories() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg/shapes.py")]);

            assert!(tracker.is_eligible(&root.join("mypkg/colors.py")));
            assert!(!tracker.is_eligible(&root.join("mypkg/nested/deep.py")));
        }
    }

    mod locating {
        use super::*;

        #[test]
        fn locates_module_file_for_class_fqn() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            let found = tracker.locate_owning_module("mypkg.shapes.Circle");
            assert_eq!(found, Some(root.join("mypkg/shapes.py")));
        }

        #[test]
        fn locates_package_init_for_package_level_name() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            let found = tracker.locate_owning_module("mypkg.TopLevel");
            assert_eq!(found, Some(root.join("mypkg/__init__.py")));
        }

        #[test]
        fn prefers_longest_module_prefix_for_nested_classes() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            let found = tracker.locate_owning_module("mypkg.nested.deep.Outer.Inner");
            assert_eq!(found, Some(root.join("mypkg/nested/deep.py")));
        }

        #[test]
        fn returns_none_outside_roots() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            assert_eq!(tracker.locate_owning_module("other.outside.Thing"), None);
        }
    }

    mod rounds {
        use super::*;

        #[test]
        fn recording_queues_owning_module() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            let outcome = tracker.record("mypkg.colors.Color");
            assert_eq!(outcome, RecordOutcome::Queued(root.join("mypkg/colors.py")));
            assert_eq!(tracker.next_round(), vec![root.join("mypkg/colors.py")]);
        }

        #[test]
        fn visited_module_is_not_requeued() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);
            tracker.mark_visited(&root.join("mypkg/colors.py"));

            let outcome = tracker.record("mypkg.colors.Color");
            assert_eq!(outcome, RecordOutcome::Terminal);
            assert!(tracker.next_round().is_empty());
            assert_eq!(tracker.dead_ends().collect::<Vec<_>>(), vec!["mypkg.colors.Color"]);
        }

        #[test]
        fn unlocatable_name_is_orphaned() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            assert_eq!(tracker.record("numpy.ndarray"), RecordOutcome::Orphaned);
            assert!(tracker.next_round().is_empty());
        }

        #[test]
        fn next_round_is_sorted_and_deduplicated() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            tracker.record("mypkg.shapes.Square");
            tracker.record("mypkg.colors.Color");
            tracker.record("mypkg.shapes.Circle");

            let round = tracker.next_round();
            assert_eq!(
                round,
                vec![root.join("mypkg/colors.py"), root.join("mypkg/shapes.py")]
            );
        }

        #[test]
        fn marking_visited_removes_pending_entry() {
            let (_tmp, root) = project();
            let mut tracker = UnresolvedTracker::new();
            tracker.seed(&[root.join("mypkg")]);

            tracker.record("mypkg.colors.Color");
            tracker.mark_visited(&root.join("mypkg/colors.py"));
            assert!(tracker.next_round().is_empty());
            assert!(tracker.pending_names().is_empty());
        }
    }
}

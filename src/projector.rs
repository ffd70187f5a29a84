//! Root projection: collapse the file-level graph into per-file root sets
//! by reverse reachability.
//!
//! Two passes. Pass 1 walks referencing files while skipping framework
//! module files, so intermediate modules do not absorb roots prematurely.
//! Pass 2 expands every pass-1 root through module files (per-root cache)
//! until it reaches a page module or an unreferenced entry file. Page
//! modules terminate the walk; a visited set cuts cycles; a file whose
//! traversal collapses entirely into a cycle becomes its own root.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::angular::{is_angular_module, FrameworkMap};
use crate::context::ACCEPTANCE_TEST_DIR;
use crate::error::Error;
use crate::graph::{DependencyGraph, FileId};

/// Final projection artifact: file path to its ordered root set.
pub type RootFilesMap = BTreeMap<String, Vec<String>>;

/// Frontend unit test files are excluded from reverse traversal. Spec
/// files under the acceptance-test directory are end-to-end suites and
/// do not count.
pub fn is_frontend_test_file(path: &str) -> bool {
    path.ends_with(".spec.ts") && !path.starts_with(ACCEPTANCE_TEST_DIR)
}

pub struct RootProjector<'a> {
    graph: &'a DependencyGraph,
    reverse: Vec<Vec<FileId>>,
    is_module: Vec<bool>,
    is_frontend_test: Vec<bool>,
    page_modules: HashSet<FileId>,
    /// Memoized `Refs` results, one slot per (file, ignore_modules).
    refs_cache: HashMap<(FileId, bool), Vec<FileId>>,
}

impl<'a> RootProjector<'a> {
    pub fn new(
        graph: &'a DependencyGraph,
        framework: &FrameworkMap,
        page_modules: &HashSet<String>,
    ) -> Self {
        let reverse = graph.reverse_adjacency();
        let is_module = graph
            .files
            .iter()
            .map(|f| is_angular_module(framework, &f.path))
            .collect();
        let is_frontend_test = graph
            .files
            .iter()
            .map(|f| is_frontend_test_file(&f.path))
            .collect();
        let page_modules = page_modules
            .iter()
            .filter_map(|p| graph.id_of(p))
            .collect();
        Self {
            graph,
            reverse,
            is_module,
            is_frontend_test,
            page_modules,
            refs_cache: HashMap::new(),
        }
    }

    /// Files that depend on `x`, excluding frontend test files and,
    /// when `ignore_modules` is set, framework module files.
    fn refs(&mut self, x: FileId, ignore_modules: bool) -> Vec<FileId> {
        if let Some(cached) = self.refs_cache.get(&(x, ignore_modules)) {
            return cached.clone();
        }
        let filtered: Vec<FileId> = self.reverse[x.0 as usize]
            .iter()
            .copied()
            .filter(|k| !self.is_frontend_test[k.0 as usize])
            .filter(|k| !(ignore_modules && self.is_module[k.0 as usize]))
            .collect();
        self.refs_cache.insert((x, ignore_modules), filtered.clone());
        filtered
    }

    /// Recursive reverse walk. Returns the roots reachable upward from
    /// `x` in first-seen order; an empty result means every path hit the
    /// cycle cut.
    fn roots_of(
        &mut self,
        x: FileId,
        ignore_modules: bool,
        visited: &mut HashSet<FileId>,
    ) -> Vec<FileId> {
        if !visited.insert(x) {
            return Vec::new();
        }
        let refs = self.refs(x, ignore_modules);
        if refs.is_empty() || self.page_modules.contains(&x) {
            return vec![x];
        }
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for r in refs {
            for root in self.roots_of(r, ignore_modules, visited) {
                if seen.insert(root) {
                    out.push(root);
                }
            }
        }
        out
    }

    /// Top-level query with the pure-cycle fallback applied.
    fn roots_with_fallback(&mut self, x: FileId, ignore_modules: bool) -> Vec<FileId> {
        let mut visited = HashSet::new();
        let roots = self.roots_of(x, ignore_modules, &mut visited);
        if roots.is_empty() {
            vec![x]
        } else {
            roots
        }
    }

    /// Run both projection passes over every file.
    pub fn project(&mut self) -> RootFilesMap {
        let n = self.graph.file_count();

        // Pass 1: module-filtered roots per file.
        let mut pass1: Vec<Vec<FileId>> = Vec::with_capacity(n);
        for i in 0..n {
            #[allow(clippy::cast_possible_truncation)]
            let id = FileId(i as u32);
            pass1.push(self.roots_with_fallback(id, true));
        }

        // Pass 2: expand each root through module files, caching per root.
        let mut pass2_cache: HashMap<FileId, Vec<FileId>> = HashMap::new();
        let mut result = RootFilesMap::new();
        for (i, roots) in pass1.iter().enumerate() {
            let mut out: Vec<FileId> = Vec::new();
            let mut seen = HashSet::new();
            for &root in roots {
                if !pass2_cache.contains_key(&root) {
                    let expanded = self.roots_with_fallback(root, false);
                    pass2_cache.insert(root, expanded);
                }
                for &r in &pass2_cache[&root] {
                    if seen.insert(r) {
                        out.push(r);
                    }
                }
            }
            #[allow(clippy::cast_possible_truncation)]
            let path = self.graph.path(FileId(i as u32)).to_string();
            result.insert(
                path,
                out.iter().map(|&id| self.graph.path(id).to_string()).collect(),
            );
        }
        result
    }
}

/// Every emitted root must be a page module, a top-level entry module
/// (`.import.ts`), a whitelisted anchor, or a frontend test file.
/// Anything else fails the run with the offenders.
pub fn validate_roots(
    root_map: &RootFilesMap,
    page_modules: &HashSet<String>,
    whitelist: &HashSet<String>,
) -> Result<(), Error> {
    let mut offenders: Vec<String> = Vec::new();
    for roots in root_map.values() {
        for root in roots {
            if page_modules.contains(root)
                || whitelist.contains(root)
                || root.ends_with(".import.ts")
                || is_frontend_test_file(root)
            {
                continue;
            }
            if !offenders.contains(root) {
                offenders.push(root.clone());
            }
        }
    }
    if offenders.is_empty() {
        Ok(())
    } else {
        offenders.sort();
        Err(Error::InvalidRootFiles(offenders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angular::FrameworkInfo;
    use crate::graph::DependencyGraph;

    fn module_info() -> Vec<FrameworkInfo> {
        vec![FrameworkInfo::Module {
            class_name: "M".to_string(),
        }]
    }

    /// Build a graph from (file, deps) pairs.
    fn graph_of(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (file, _) in edges {
            g.add_file(file);
        }
        for (file, deps) in edges {
            let from = g.add_file(file);
            for dep in *deps {
                let to = g.add_file(dep);
                g.add_dep(from, to);
            }
        }
        g
    }

    fn project(
        edges: &[(&str, &[&str])],
        framework: &FrameworkMap,
        page_modules: &[&str],
    ) -> RootFilesMap {
        let g = graph_of(edges);
        let pages: HashSet<String> = page_modules.iter().map(|s| (*s).to_string()).collect();
        RootProjector::new(&g, framework, &pages).project()
    }

    #[test]
    fn single_import_chain_projects_to_entry() {
        // a -> b -> c, a is a page module.
        let map = project(
            &[("a.ts", &["b.ts"]), ("b.ts", &["c.ts"]), ("c.ts", &[])],
            &FrameworkMap::new(),
            &["a.ts"],
        );
        assert_eq!(map["a.ts"], vec!["a.ts"]);
        assert_eq!(map["b.ts"], vec!["a.ts"]);
        assert_eq!(map["c.ts"], vec!["a.ts"]);
    }

    #[test]
    fn unreferenced_file_is_its_own_root() {
        let map = project(&[("lonely.ts", &[])], &FrameworkMap::new(), &[]);
        assert_eq!(map["lonely.ts"], vec!["lonely.ts"]);
    }

    #[test]
    fn two_file_cycle_files_are_their_own_roots() {
        let map = project(
            &[("a.ts", &["b.ts"]), ("b.ts", &["a.ts"])],
            &FrameworkMap::new(),
            &[],
        );
        assert_eq!(map["a.ts"], vec!["a.ts"]);
        assert_eq!(map["b.ts"], vec!["b.ts"]);
    }

    #[test]
    fn cycle_with_outside_reference_resolves_to_referencer() {
        // entry -> a <-> b; entry unreferenced.
        let map = project(
            &[
                ("entry.ts", &["a.ts"]),
                ("a.ts", &["b.ts"]),
                ("b.ts", &["a.ts"]),
            ],
            &FrameworkMap::new(),
            &[],
        );
        assert_eq!(map["a.ts"], vec!["entry.ts"]);
        assert_eq!(map["b.ts"], vec!["entry.ts"]);
        assert_eq!(map["entry.ts"], vec!["entry.ts"]);
    }

    #[test]
    fn page_module_terminates_the_walk() {
        // page -> shared; importer -> page. Roots of shared stop at page.
        let map = project(
            &[
                ("importer.ts", &["page.module.ts"]),
                ("page.module.ts", &["shared.ts"]),
                ("shared.ts", &[]),
            ],
            &FrameworkMap::new(),
            &["page.module.ts"],
        );
        assert_eq!(map["shared.ts"], vec!["page.module.ts"]);
    }

    #[test]
    fn frontend_test_files_do_not_absorb_roots() {
        let map = project(
            &[
                ("a.spec.ts", &["a.ts"]),
                ("a.ts", &[]),
                ("entry.ts", &["a.ts"]),
            ],
            &FrameworkMap::new(),
            &[],
        );
        // a.ts is referenced by both, but the spec file is excluded.
        assert_eq!(map["a.ts"], vec!["entry.ts"]);
        // The spec file itself has no (non-test) referencers.
        assert_eq!(map["a.spec.ts"], vec!["a.spec.ts"]);
    }

    #[test]
    fn acceptance_spec_files_participate_normally() {
        let accept = "core/tests/puppeteer-acceptance-tests/spec/login.spec.ts";
        let map = project(
            &[(accept, &["a.ts"]), ("a.ts", &[])],
            &FrameworkMap::new(),
            &[],
        );
        assert_eq!(map["a.ts"], vec![accept]);
    }

    #[test]
    fn pass_two_expands_through_module_files() {
        // shared <- feature.module <- page.module (page module in P).
        // Pass 1 ignores modules so shared's walk stops at shared itself;
        // pass 2 expands shared through the module chain to the page.
        let mut framework = FrameworkMap::new();
        framework.insert("feature.module.ts".to_string(), module_info());
        let map = project(
            &[
                ("page.module.ts", &["feature.module.ts"]),
                ("feature.module.ts", &["shared.ts"]),
                ("shared.ts", &[]),
            ],
            &framework,
            &["page.module.ts"],
        );
        assert_eq!(map["shared.ts"], vec!["page.module.ts"]);
        assert_eq!(map["feature.module.ts"], vec!["page.module.ts"]);
    }

    #[test]
    fn results_are_first_seen_order_deduplicated() {
        // shared referenced by two entries; both project in.
        let map = project(
            &[
                ("entry-a.ts", &["shared.ts"]),
                ("entry-b.ts", &["shared.ts"]),
                ("shared.ts", &[]),
            ],
            &FrameworkMap::new(),
            &[],
        );
        assert_eq!(map["shared.ts"], vec!["entry-a.ts", "entry-b.ts"]);
    }

    #[test]
    fn shared_cache_equals_fresh_cache() {
        let edges: &[(&str, &[&str])] = &[
            ("a.ts", &["b.ts", "c.ts"]),
            ("b.ts", &["c.ts"]),
            ("c.ts", &["d.ts"]),
            ("d.ts", &["b.ts"]),
        ];
        let first = project(edges, &FrameworkMap::new(), &["a.ts"]);
        let g = graph_of(edges);
        let pages: HashSet<String> = ["a.ts".to_string()].into_iter().collect();
        let mut projector = RootProjector::new(&g, &FrameworkMap::new(), &pages);
        // Re-projecting with a warm projector must not change anything.
        let warm_once = projector.project();
        let warm_twice = projector.project();
        assert_eq!(first, warm_once);
        assert_eq!(warm_once, warm_twice);
    }

    #[test]
    fn every_file_has_a_nonempty_root_set() {
        let map = project(
            &[
                ("a.ts", &["b.ts"]),
                ("b.ts", &["c.ts", "a.ts"]),
                ("c.ts", &["a.ts"]),
                ("d.ts", &[]),
            ],
            &FrameworkMap::new(),
            &[],
        );
        for (file, roots) in &map {
            assert!(!roots.is_empty(), "{file} has an empty root set");
        }
    }

    #[test]
    fn validation_rejects_unknown_roots() {
        let mut map = RootFilesMap::new();
        map.insert("x.ts".to_string(), vec!["stray.ts".to_string()]);
        let err = validate_roots(&map, &HashSet::new(), &HashSet::new()).unwrap_err();
        assert!(err.to_string().contains("stray.ts"));
    }

    #[test]
    fn validation_accepts_pages_whitelist_and_tests() {
        let mut map = RootFilesMap::new();
        map.insert(
            "x.ts".to_string(),
            vec![
                "page.module.ts".to_string(),
                "README.md".to_string(),
                "x.spec.ts".to_string(),
                "pages/about-page/about-page.import.ts".to_string(),
            ],
        );
        let pages: HashSet<String> = ["page.module.ts".to_string()].into_iter().collect();
        let whitelist: HashSet<String> = ["README.md".to_string()].into_iter().collect();
        assert!(validate_roots(&map, &pages, &whitelist).is_ok());
    }
}

//! Analyzer context: repo root, include/exclude configuration, and the
//! alias tables consulted by the resolver.
//!
//! The context is an explicit value passed to every component constructor.
//! There is no process-wide mutable state; two contexts over two repo
//! roots can coexist in one process (the integration tests rely on this).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Host-provided builtin modules, always treated as repo-external.
pub const HOST_BUILTINS: &[&str] = &["child_process", "console", "fs", "path"];

/// Bundler-defined virtual aliases. Frozen; mirrors the webpack config of
/// the analyzed codebase. Merged with the tsconfig aliases into one
/// longest-prefix-first table.
pub const VIRTUAL_ALIASES: &[(&str, &str)] = &[
    ("assets/constants", "assets/constants.ts"),
    (
        "assets/rich_text_component_definitions",
        "assets/rich_text_components_definitions.ts",
    ),
    ("assets", "assets"),
    ("core/templates", "core/templates"),
    ("extensions", "extensions"),
];

/// Directory holding vendored third-party libraries. A bare specifier
/// whose first segment names a directory here is repo-external.
pub const VENDOR_ROOT: &str = "node_modules";

/// Bare specifiers that survive the external check resolve against this
/// directory.
pub const DEFAULT_SPECIFIER_ROOT: &str = "core/templates";

/// Extensions enumerated by the workspace walk. Everything else is
/// opaque and enters the graph only when referenced.
pub const INCLUDE_EXTENSIONS: &[&str] = &["ts", "js", "html", "css"];

/// Paths the analyzer never descends into, regardless of .gitignore.
const INTERNAL_EXCLUSIONS: &[&str] = &[
    ".git",
    "node_modules",
    "third_party",
    "dependencies-mapping.json",
    "root-files-mapping.json",
];

/// Spec files under this directory are end-to-end acceptance tests, not
/// frontend unit tests, and participate in reverse traversal normally.
pub const ACCEPTANCE_TEST_DIR: &str = "core/tests/puppeteer-acceptance-tests";

/// Directory of CI suite configuration files ({ suites: [{ module }] }).
pub const CI_SUITE_CONFIG_DIR: &str = "core/tests/ci-test-suite-configs";

/// The two routing modules consulted by the route registry.
pub const MAIN_ROUTING_MODULE: &str =
    "core/templates/pages/oppia-root/routing/app.routing.module.ts";
pub const LIGHTWEIGHT_ROUTING_MODULE: &str =
    "core/templates/pages/lightweight-oppia-root/routing/app.routing.module.ts";

/// The constants module backing `AppConstants.*` route paths.
pub const CONSTANTS_MODULE: &str = "assets/constants.ts";

/// Always-valid root files: documentation anchors and the run-all-tests
/// entry that CI falls back to.
pub const VALID_ROOT_FILES: &[&str] = &[
    "README.md",
    "core/tests/run-all-tests.ts",
];

/// Files whose dependencies the analyzer cannot infer; their edges are
/// declared here and seed the extracted list.
pub const MANUAL_DEPENDENCIES: &[(&str, &[&str])] = &[
    (
        "core/templates/mathjax.config.ts",
        &["core/templates/services/math-interactions.service.ts"],
    ),
    (
        "core/templates/pages/oppia-root/index.ts",
        &["core/templates/pages/oppia-root/app.module.ts"],
    ),
];

/// Stylesheet `href` values must begin with this prefix...
pub const CSS_HREF_PREFIX: &str = "/templates/css";
/// ...and are re-rooted by prepending this directory.
pub const CSS_REROOT: &str = "core";

/// Immutable per-run analyzer configuration.
#[derive(Debug)]
pub struct Context {
    root: PathBuf,
    /// (prefix, target) pairs from tsconfig and the virtual-alias table,
    /// globally ordered longest prefix first. `/*` already stripped.
    aliases: Vec<(String, String)>,
    /// Exclusion patterns: internal set plus non-comment .gitignore lines.
    exclusions: Vec<String>,
}

impl Context {
    /// Load the context for a repository root. Reads `tsconfig.json`
    /// (required) and `.gitignore` (optional).
    pub fn load(root: &Path) -> Result<Self, Error> {
        let tsconfig_path = root.join("tsconfig.json");
        let raw = fs::read_to_string(&tsconfig_path)
            .map_err(|e| Error::ConfigRead(tsconfig_path.clone(), e))?;
        let tsconfig: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| Error::ConfigParse(tsconfig_path, e))?;

        let mut aliases = Vec::new();
        if let Some(paths) = tsconfig
            .get("compilerOptions")
            .and_then(|o| o.get("paths"))
            .and_then(|p| p.as_object())
        {
            for (pattern, targets) in paths {
                let Some(target) = targets.as_array().and_then(|a| a.first()).and_then(|t| t.as_str())
                else {
                    continue;
                };
                let prefix = pattern.strip_suffix("/*").unwrap_or(pattern);
                let target = target.strip_suffix("/*").unwrap_or(target);
                aliases.push((prefix.to_string(), target.to_string()));
            }
        }
        aliases.extend(
            VIRTUAL_ALIASES
                .iter()
                .map(|&(p, t)| (p.to_string(), t.to_string())),
        );
        // One global order, longest prefix first, so the most specific
        // pattern wins regardless of which table it came from
        // ("assets/constants" beats "assets").
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let mut exclusions: Vec<String> =
            INTERNAL_EXCLUSIONS.iter().map(|s| (*s).to_string()).collect();
        if let Ok(gitignore) = fs::read_to_string(root.join(".gitignore")) {
            for line in gitignore.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                exclusions.push(line.trim_matches('/').to_string());
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            aliases,
            exclusions,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    /// Whether a repo-relative path is excluded from enumeration.
    ///
    /// A pattern without '/' excludes any path containing a component of
    /// that name; a pattern with '/' excludes the subtree at that path.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        for pattern in &self.exclusions {
            if pattern.contains('/') {
                if rel_path == pattern || rel_path.starts_with(&format!("{pattern}/")) {
                    return true;
                }
            } else if rel_path.split('/').any(|component| component == pattern) {
                return true;
            }
        }
        false
    }

    /// Whether a repo-relative path names an existing regular file.
    pub fn file_exists(&self, rel_path: &str) -> bool {
        self.root.join(rel_path).is_file()
    }

    /// Whether a bare specifier's first segment names a vendored library.
    pub fn is_vendored(&self, first_segment: &str) -> bool {
        self.root.join(VENDOR_ROOT).join(first_segment).is_dir()
    }
}

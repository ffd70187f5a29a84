//! URL → page-module matching against the route table.
//!
//! The browser test harness reports every visited URL through
//! [`UrlModuleMatcher::register_url`]. Each URL is matched against all
//! routes (matches accumulate; there is no first-match-wins), and the
//! implicated page modules are collected. At the end of the run,
//! [`UrlModuleMatcher::compare_and_output_modules`] writes what was
//! observed next to the golden manifest and fails on any drift.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::routes::{Route, RouteRegistry};

/// URLs from the local test server carry this prefix; anything else is
/// ignored (external links, about:blank, devtools pages).
pub const URL_PREFIX: &str = "http://localhost:8181/";

/// Modules never collected for a given suite, keyed by the golden
/// manifest's file stem. Used where a suite incidentally brushes a page
/// it does not exercise.
const MODULE_EXCLUSIONS: &[(&str, &[&str])] = &[(
    "navigation",
    &["core/templates/pages/error-pages/error-page.module.ts"],
)];

pub struct UrlModuleMatcher {
    routes: Vec<(Route, String)>,
    golden_path: Option<PathBuf>,
    /// Collected page modules, duplicates coalesced.
    collected: Vec<String>,
    /// Deduplicated human-readable match failures.
    errors: Vec<String>,
}

/// Whether `url_path` (prefix-stripped, query/fragment removed) matches
/// a route.
fn matches(route: &Route, url_path: &str) -> bool {
    if route.path == url_path {
        return true;
    }
    if url_path.is_empty() {
        // No primary segment group; only the exact test above can match.
        return false;
    }
    let segments: Vec<&str> = url_path.split('/').collect();
    let parts: Vec<&str> = route.path.split('/').collect();
    if parts.len() > segments.len() {
        return false;
    }
    if route.path_match.as_deref() == Some("full") && parts.len() < segments.len() {
        return false;
    }
    parts
        .iter()
        .zip(&segments)
        .all(|(part, segment)| part.starts_with(':') || part == segment)
}

fn golden_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

/// The generated sibling of a golden manifest: `navigation.txt` →
/// `navigation-generated.txt`.
fn generated_path(golden: &Path) -> PathBuf {
    let stem = golden_stem(golden);
    golden.with_file_name(format!("{stem}-generated.txt"))
}

impl UrlModuleMatcher {
    pub fn new(registry: &RouteRegistry) -> Self {
        Self {
            routes: registry.routes().to_vec(),
            golden_path: None,
            collected: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Install the golden manifest path for this run.
    pub fn set_golden_file_path(&mut self, path: impl Into<PathBuf>) {
        self.golden_path = Some(path.into());
    }

    /// Record one visited URL. Idempotent for identical URLs; call order
    /// is irrelevant to the final diff.
    pub fn register_url(&mut self, url: &str) {
        let Some(rest) = url.strip_prefix(URL_PREFIX) else {
            return;
        };
        let path = rest
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .trim_end_matches('/');

        let excluded: &[&str] = self
            .golden_path
            .as_deref()
            .and_then(|g| {
                MODULE_EXCLUSIONS
                    .iter()
                    .find(|(stem, _)| *stem == golden_stem(g))
            })
            .map_or(&[], |(_, modules)| *modules);

        let mut matched = false;
        for (route, module) in &self.routes {
            if !matches(route, path) {
                continue;
            }
            matched = true;
            if excluded.contains(&module.as_str()) {
                continue;
            }
            if !self.collected.contains(module) {
                self.collected.push(module.clone());
            }
        }
        if !matched {
            let message = format!("no route found for url: {url}");
            if !self.errors.contains(&message) {
                self.errors.push(message);
            }
        }
    }

    pub fn collected_modules(&self) -> &[String] {
        &self.collected
    }

    /// Write the generated manifest next to the golden and diff the two.
    /// The generated file is always written; the pass/fail decision is
    /// independent of it.
    pub fn compare_and_output_modules(&self) -> Result<(), Error> {
        let golden = self.golden_path.as_deref().ok_or(Error::NoGoldenPath)?;

        let golden_modules: Vec<String> = match fs::read_to_string(golden) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            // A golden may be missing on a suite's first run.
            Err(_) => Vec::new(),
        };

        let mut generated: Vec<String> = self.collected.clone();
        generated.sort();
        let out_path = generated_path(golden);
        let mut content = generated.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&out_path, content).map_err(|e| Error::ArtifactWrite(out_path, e))?;

        let golden_set: HashSet<&str> = golden_modules.iter().map(String::as_str).collect();
        let collected_set: HashSet<&str> = self.collected.iter().map(String::as_str).collect();
        let mut extra: Vec<String> = self
            .collected
            .iter()
            .filter(|m| !golden_set.contains(m.as_str()))
            .cloned()
            .collect();
        extra.sort();
        let missing: Vec<String> = golden_modules
            .iter()
            .filter(|m| !collected_set.contains(m.as_str()))
            .cloned()
            .collect();

        if self.errors.is_empty() && extra.is_empty() && missing.is_empty() {
            Ok(())
        } else {
            Err(Error::GoldenMismatch {
                unmatched_urls: self.errors.clone(),
                extra,
                missing,
            })
        }
    }
}

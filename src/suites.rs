//! CI test-suite bookkeeping.
//!
//! Two consumers sit downstream of the root projection. The validator
//! needs the `suites[].module` entries from the CI suite configuration
//! directory (they extend the valid-root whitelist). The test-impact
//! selector maps a changed-file list through the root-files mapping to
//! the suites whose module manifests mention an affected root; a changed
//! file that is absent from the mapping selects every suite.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::context::{Context, CI_SUITE_CONFIG_DIR};
use crate::error::Error;
use crate::projector::RootFilesMap;
use crate::workspace::relative_posix;

#[derive(Deserialize)]
struct SuiteConfigFile {
    suites: Vec<SuiteConfigEntry>,
}

#[derive(Deserialize)]
struct SuiteConfigEntry {
    module: String,
}

/// Collect `suites[].module` from every JSON file under the CI suite
/// configuration directory. A missing directory contributes nothing.
pub fn load_suite_modules(ctx: &Context) -> Result<Vec<String>, Error> {
    let dir = ctx.root().join(CI_SUITE_CONFIG_DIR);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<_> = WalkDir::new(&dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut modules = Vec::new();
    for path in paths {
        let raw = fs::read_to_string(&path).map_err(|e| Error::ConfigRead(path.clone(), e))?;
        let config: SuiteConfigFile =
            serde_json::from_str(&raw).map_err(|e| Error::ConfigParse(path.clone(), e))?;
        for entry in config.suites {
            if !modules.contains(&entry.module) {
                modules.push(entry.module);
            }
        }
    }
    Ok(modules)
}

/// Per-suite module manifests: suite name (manifest path relative to the
/// mapping directory, extension stripped) → page modules it exercises.
pub type SuiteModulesMapping = BTreeMap<String, Vec<String>>;

/// Read every `.txt` manifest under a modules-mapping directory.
pub fn load_suite_mapping(dir: &Path) -> SuiteModulesMapping {
    let mut mapping = SuiteModulesMapping::new();
    if !dir.is_dir() {
        return mapping;
    }
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "txt") {
            continue;
        }
        let Some(rel) = relative_posix(path, dir) else {
            continue;
        };
        let name = rel.strip_suffix(".txt").unwrap_or(&rel).to_string();
        let modules = fs::read_to_string(path)
            .map(|content| {
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        mapping.insert(name, modules);
    }
    mapping
}

/// Suites affected by a set of modified files. Returns `None` when any
/// modified file is absent from the root mapping — the caller must run
/// everything. Suites without a manifest are always affected.
pub fn affected_suites(
    modified_files: &[String],
    root_map: &RootFilesMap,
    mapping: &SuiteModulesMapping,
    all_suites: &[String],
) -> Option<Vec<String>> {
    let mut modified_roots: Vec<&str> = Vec::new();
    for file in modified_files {
        let roots = root_map.get(file)?;
        for root in roots {
            if !modified_roots.contains(&root.as_str()) {
                modified_roots.push(root);
            }
        }
    }

    let mut affected = Vec::new();
    for suite in all_suites {
        let hit = match mapping.get(suite) {
            None => true,
            Some(modules) => modified_roots.iter().any(|r| modules.iter().any(|m| m == r)),
        };
        if hit && !affected.contains(suite) {
            affected.push(suite.clone());
        }
    }
    Some(affected)
}

//! Artifact serialization.
//!
//! All JSON artifacts are pretty-printed maps keyed by repo-relative
//! path. `BTreeMap` keys serialize sorted, and every value list is
//! already first-seen-order deduplicated upstream, so re-running the
//! analyzer on an unchanged tree produces byte-identical files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::graph::DependencyGraph;

/// The file → dependencies map, in artifact form.
pub fn dependency_map(graph: &DependencyGraph) -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    for node in &graph.files {
        let deps = graph
            .deps_of(node.id)
            .iter()
            .map(|&id| graph.path(id).to_string())
            .collect();
        map.insert(node.path.clone(), deps);
    }
    map
}

/// Write a path-keyed map artifact as pretty-printed JSON.
pub fn write_map(path: &Path, map: &BTreeMap<String, Vec<String>>) -> Result<(), Error> {
    let mut json = serde_json::to_string_pretty(map)
        .map_err(|e| Error::ConfigParse(path.to_path_buf(), e))?;
    json.push('\n');
    fs::write(path, json).map_err(|e| Error::ArtifactWrite(path.to_path_buf(), e))
}

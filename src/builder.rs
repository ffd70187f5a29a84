//! Edge-set builder: drives the extractors over the full file list.
//!
//! Two sweeps. The first builds the framework-info map from every
//! non-spec typed/untyped file (spec files never emit framework symbols).
//! The second builds the dependency multigraph, dispatching per file by
//! extension and seeding each file's list with the manual overrides.
//! Both sweeps parse in parallel; graph mutation stays serial and
//! follows the sorted file list, so the result is deterministic.

use rayon::prelude::*;

use crate::angular::{extract_framework_infos, FrameworkMap};
use crate::context::{Context, MANUAL_DEPENDENCIES};
use crate::error::Error;
use crate::graph::DependencyGraph;
use crate::html_edges::extract_html_edges;
use crate::resolve::ImportResolver;
use crate::ts_edges::extract_ts_edges;
use crate::workspace::Workspace;

#[derive(Debug)]
pub struct Analysis {
    pub framework: FrameworkMap,
    pub graph: DependencyGraph,
}

fn is_source_file(path: &str) -> bool {
    path.ends_with(".ts") || path.ends_with(".js")
}

fn is_spec_file(path: &str) -> bool {
    path.ends_with(".spec.ts")
}

/// Build the framework-info map and the dependency graph for a workspace.
pub fn build(ctx: &Context, ws: &Workspace) -> Result<Analysis, Error> {
    let resolver = ImportResolver::new(ctx);

    // Sweep 1: framework symbols.
    let framework_results: Vec<(String, Result<Vec<_>, Error>)> = ws
        .files()
        .par_iter()
        .filter(|f| is_source_file(f))
        .map(|file| {
            if is_spec_file(file) {
                return (file.clone(), Ok(Vec::new()));
            }
            let result = ws
                .source(file)
                .and_then(|src| extract_framework_infos(file, &src, &resolver));
            (file.clone(), result)
        })
        .collect();

    let mut framework = FrameworkMap::new();
    for (file, result) in framework_results {
        framework.insert(file, result?);
    }

    // Sweep 2: dependency edges.
    let edge_results: Vec<(String, Result<Vec<String>, Error>)> = ws
        .files()
        .par_iter()
        .map(|file| {
            let result = extract_edges_for(file, ctx, ws, &resolver, &framework);
            (file.clone(), result)
        })
        .collect();

    let mut graph = DependencyGraph::new();
    for file in ws.files() {
        graph.add_file(file);
    }
    for (file, result) in edge_results {
        let from = graph.add_file(&file);
        for target in result? {
            let to = graph.add_file(&target);
            graph.add_dep(from, to);
        }
    }

    Ok(Analysis { framework, graph })
}

fn extract_edges_for(
    file: &str,
    ctx: &Context,
    ws: &Workspace,
    resolver: &ImportResolver<'_>,
    framework: &FrameworkMap,
) -> Result<Vec<String>, Error> {
    // Manual overrides seed the list before anything is extracted.
    let mut edges: Vec<String> = Vec::new();
    for (overridden, targets) in MANUAL_DEPENDENCIES {
        if *overridden == file {
            for target in *targets {
                if ctx.file_exists(target) && !edges.iter().any(|e| e == target) {
                    edges.push((*target).to_string());
                }
            }
        }
    }

    let extracted = if is_source_file(file) {
        let source = ws.source(file)?;
        let infos = framework.get(file).map_or(&[][..], Vec::as_slice);
        extract_ts_edges(file, &source, ctx, resolver, infos)?
    } else if file.ends_with(".html") {
        let source = ws.source(file)?;
        extract_html_edges(file, &source, ctx, resolver, ws.files(), framework)?
    } else {
        Vec::new()
    };

    for target in extracted {
        if !edges.contains(&target) {
            edges.push(target);
        }
    }
    Ok(edges)
}

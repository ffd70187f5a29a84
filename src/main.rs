use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use rootmap::builder;
use rootmap::context::{Context, VALID_ROOT_FILES};
use rootmap::error::Error;
use rootmap::projector::{self, RootProjector};
use rootmap::report;
use rootmap::resolve::ImportResolver;
use rootmap::routes::RouteRegistry;
use rootmap::suites;
use rootmap::workspace::Workspace;

#[derive(Parser)]
#[command(
    name = "rootmap",
    version,
    about = "Static dependency-graph analyzer with root-file projection"
)]
struct Cli {
    /// Repository root to analyze
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

struct RunSummary {
    file_count: usize,
    route_count: usize,
    root_count: usize,
}

fn main() {
    let cli = Cli::parse();
    let start = Instant::now();

    match run(&cli.root) {
        Ok(summary) => {
            eprintln!(
                "Analyzed {} files, {} routes, {} root mappings in {:.1}ms",
                summary.file_count,
                summary.route_count,
                summary.root_count,
                start.elapsed().as_secs_f64() * 1000.0
            );
        }
        Err(e) => {
            // One error per line, each with its file context.
            match &e {
                Error::InvalidRootFiles(offenders) => {
                    for offender in offenders {
                        eprintln!("error: invalid root file: {offender}");
                    }
                }
                _ => eprintln!("error: {e}"),
            }
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            std::process::exit(1);
        }
    }
}

fn run(root: &Path) -> Result<RunSummary, Error> {
    let root = root
        .canonicalize()
        .map_err(|e| Error::ConfigRead(root.to_path_buf(), e))?;
    let ctx = Context::load(&root)?;
    let ws = Workspace::discover(&ctx);

    let analysis = builder::build(&ctx, &ws)?;
    report::write_map(
        &root.join("dependencies-mapping.json"),
        &report::dependency_map(&analysis.graph),
    )?;

    let resolver = ImportResolver::new(&ctx);
    let registry = RouteRegistry::build(&ctx, &ws, &resolver)?;
    let page_modules = registry.page_modules();

    let mut projector = RootProjector::new(&analysis.graph, &analysis.framework, &page_modules);
    let root_map = projector.project();
    report::write_map(&root.join("root-files-mapping.json"), &root_map)?;

    let mut whitelist: HashSet<String> =
        VALID_ROOT_FILES.iter().map(|s| (*s).to_string()).collect();
    whitelist.extend(suites::load_suite_modules(&ctx)?);
    projector::validate_roots(&root_map, &page_modules, &whitelist)?;

    Ok(RunSummary {
        file_count: analysis.graph.file_count(),
        route_count: registry.routes().len(),
        root_count: root_map.len(),
    })
}

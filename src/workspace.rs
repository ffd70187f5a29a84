//! Workspace enumeration and source access.
//!
//! Discovery walks the repo root once, keeps only the configured
//! extensions, applies the exclusion list, and sorts the result so
//! enumeration is stable across runs given the same filesystem snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use walkdir::WalkDir;

use crate::context::{Context, INCLUDE_EXTENSIONS};
use crate::error::Error;

pub struct Workspace {
    root: PathBuf,
    /// Repo-relative POSIX paths, sorted.
    files: Vec<String>,
    /// Lazily populated source cache shared across the parse sweeps.
    sources: Mutex<HashMap<String, Arc<str>>>,
}

/// Convert an absolute path under `root` to a repo-relative POSIX string.
pub fn relative_posix(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut out = String::new();
    for component in rel.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(component.as_os_str().to_str()?);
    }
    Some(out)
}

impl Workspace {
    /// Enumerate the tracked files under the context's repo root.
    pub fn discover(ctx: &Context) -> Self {
        let root = ctx.root().to_path_buf();
        let mut files = Vec::new();

        for entry in WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                // Prune excluded directories before descending.
                relative_posix(e.path(), &root)
                    .map_or(true, |rel| rel.is_empty() || !ctx.is_excluded(&rel))
            })
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = relative_posix(entry.path(), &root) else {
                continue;
            };
            if ctx.is_excluded(&rel) {
                continue;
            }
            let tracked = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| INCLUDE_EXTENSIONS.contains(&ext));
            if tracked {
                files.push(rel);
            }
        }

        files.sort();
        Self {
            root,
            files,
            sources: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Read a repo-relative file, caching the content. The handle is
    /// closed before this returns; only the content is retained.
    pub fn source(&self, rel_path: &str) -> Result<Arc<str>, Error> {
        if let Some(cached) = self.sources.lock().unwrap().get(rel_path) {
            return Ok(Arc::clone(cached));
        }
        let content =
            std::fs::read_to_string(self.root.join(rel_path)).map_err(|e| Error::SourceParse {
                file: rel_path.to_string(),
                message: e.to_string(),
            })?;
        let arc: Arc<str> = Arc::from(content.as_str());
        self.sources
            .lock()
            .unwrap()
            .insert(rel_path.to_string(), Arc::clone(&arc));
        Ok(arc)
    }
}

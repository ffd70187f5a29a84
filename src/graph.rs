//! Dependency graph data structures.
//!
//! A [`DependencyGraph`] is a directed graph of tracked files connected by
//! dependency edges. Nodes are dense `u32`-indexed [`FileId`]s; the public
//! artifacts always speak repo-relative POSIX path strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FileId(pub u32);

/// File classification by extension suffix. Only typed/untyped source and
/// markup files carry outgoing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FileKind {
    TypedSource,
    UntypedSource,
    Markup,
    Stylesheet,
    Opaque,
}

impl FileKind {
    pub fn classify(path: &str) -> Self {
        if path.ends_with(".ts") {
            Self::TypedSource
        } else if path.ends_with(".js") {
            Self::UntypedSource
        } else if path.ends_with(".html") {
            Self::Markup
        } else if path.ends_with(".css") {
            Self::Stylesheet
        } else {
            Self::Opaque
        }
    }

    pub fn carries_edges(self) -> bool {
        matches!(self, Self::TypedSource | Self::UntypedSource | Self::Markup)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub id: FileId,
    /// Repo-relative POSIX path.
    pub path: String,
    pub kind: FileKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub files: Vec<FileNode>,
    /// Outgoing dependencies per file (indexed by `FileId`), duplicates
    /// suppressed, first-seen order preserved.
    pub deps: Vec<Vec<FileId>>,
    pub path_to_id: HashMap<String, FileId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn add_file(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.path_to_id.get(path) {
            return id;
        }
        let id = FileId(self.files.len() as u32);
        self.files.push(FileNode {
            id,
            path: path.to_string(),
            kind: FileKind::classify(path),
        });
        self.deps.push(Vec::new());
        self.path_to_id.insert(path.to_string(), id);
        id
    }

    /// Push an edge, suppressing duplicates. Outgoing lists are short
    /// (typically <40 entries), so a linear scan beats a side table.
    pub fn add_dep(&mut self, from: FileId, to: FileId) {
        let list = &mut self.deps[from.0 as usize];
        if !list.contains(&to) {
            list.push(to);
        }
    }

    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.0 as usize]
    }

    pub fn path(&self, id: FileId) -> &str {
        &self.files[id.0 as usize].path
    }

    pub fn id_of(&self, path: &str) -> Option<FileId> {
        self.path_to_id.get(path).copied()
    }

    pub fn deps_of(&self, id: FileId) -> &[FileId] {
        &self.deps[id.0 as usize]
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Reverse adjacency: for each file, the files that depend on it, in
    /// referencing-file id order (discovery order).
    pub fn reverse_adjacency(&self) -> Vec<Vec<FileId>> {
        let mut reverse: Vec<Vec<FileId>> = vec![Vec::new(); self.files.len()];
        for node in &self.files {
            for &dep in &self.deps[node.id.0 as usize] {
                reverse[dep.0 as usize].push(node.id);
            }
        }
        reverse
    }
}

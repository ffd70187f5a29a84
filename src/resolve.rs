//! Path and alias resolution for import specifiers.
//!
//! Resolution never errors: repo-external specifiers yield `None`, which
//! callers treat as "no edge". The steps, in order: external short
//! circuit, alias-prefix rewrite (tsconfig paths plus the frozen virtual
//! aliases), relative join, templates-root fallback for surviving bare
//! specifiers, and extensionless completion against the filesystem.

use crate::context::{Context, DEFAULT_SPECIFIER_ROOT, HOST_BUILTINS};

pub struct ImportResolver<'a> {
    ctx: &'a Context,
}

/// Lexically normalize a POSIX-style path: collapse `.` and `..`
/// segments without touching the filesystem. `..` at the root is
/// dropped rather than escaping the repo.
pub fn normalize(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

/// Directory of a repo-relative file path ("" for files at the root).
fn parent_dir(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

impl<'a> ImportResolver<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Resolve an import specifier to a repo-relative path, or `None`
    /// for library-external specifiers.
    pub fn resolve(&self, specifier: &str, from_file: &str) -> Option<String> {
        if !specifier.starts_with('.') {
            let first = specifier.split('/').next().unwrap_or(specifier);
            if HOST_BUILTINS.contains(&first) || self.ctx.is_vendored(first) {
                return None;
            }
        }

        let path = if let Some(rewritten) = self.rewrite_alias(specifier) {
            rewritten
        } else if specifier.starts_with('.') {
            normalize(&format!("{}/{}", parent_dir(from_file), specifier))
        } else {
            normalize(&format!("{DEFAULT_SPECIFIER_ROOT}/{specifier}"))
        };

        Some(self.complete_extension(path))
    }

    /// Rewrite a specifier whose prefix matches a configured alias.
    /// Aliases are ordered longest prefix first, so the most specific
    /// pattern wins.
    fn rewrite_alias(&self, specifier: &str) -> Option<String> {
        for (prefix, target) in self.ctx.aliases() {
            if specifier == prefix {
                return Some(target.clone());
            }
            if let Some(rest) = specifier
                .strip_prefix(prefix.as_str())
                .and_then(|r| r.strip_prefix('/'))
            {
                return Some(normalize(&format!("{target}/{rest}")));
            }
        }
        None
    }

    /// Extensionless lookup: prefer `.ts`, then `.js`; leave the path
    /// unchanged when neither exists (recoverable — the caller emits no
    /// edge for a path it cannot find).
    ///
    /// "Has an extension" means a tracked extension: basenames like
    /// `app.constants` are dotted but still need completion.
    fn complete_extension(&self, path: String) -> String {
        let has_known_extension = [".ts", ".js", ".html", ".css"]
            .iter()
            .any(|ext| path.ends_with(ext));
        if has_known_extension {
            return path;
        }
        for ext in [".ts", ".js"] {
            let candidate = format!("{path}{ext}");
            if self.ctx.file_exists(&candidate) {
                return candidate;
            }
        }
        path
    }
}

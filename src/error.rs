//! Error types for the rootmap analyzer.

use std::path::PathBuf;

/// Errors from configuration loading, edge extraction, root projection,
/// and the golden-manifest diff.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Cannot read a required configuration file (tsconfig, routing
    /// module, constants module, CI suite config).
    ConfigRead(PathBuf, std::io::Error),
    /// A configuration file contains invalid JSON.
    ConfigParse(PathBuf, serde_json::Error),
    /// A source file failed to parse at all.
    SourceParse { file: String, message: String },
    /// An import specifier resolved to a path that does not exist.
    MissingModule {
        target: String,
        from: String,
        specifier: String,
    },
    /// A referenced stylesheet does not exist.
    MissingStylesheet { target: String, from: String },
    /// An expression expected to be a constant string was not.
    NotALiteral { text: String, file: String },
    /// A framework decorator was invoked with a non-object argument.
    NoObjectArgument { class_name: String, file: String },
    /// A route's `path` is neither a literal nor a constants access chain.
    UnparsableRoutePath { text: String, file: String },
    /// A routing module contains no recognizable route array.
    NoRouteTable(String),
    /// A constants access chain walked off the constants tree.
    UnknownConstant { chain: String, file: String },
    /// Emitted root files outside the permitted set.
    InvalidRootFiles(Vec<String>),
    /// Cannot write an output artifact.
    ArtifactWrite(PathBuf, std::io::Error),
    /// The golden-manifest diff failed.
    GoldenMismatch {
        unmatched_urls: Vec<String>,
        extra: Vec<String>,
        missing: Vec<String>,
    },
    /// `compare_and_output_modules` called before `set_golden_file_path`.
    NoGoldenPath,
}

impl Error {
    /// User-facing hint to accompany the error message.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::MissingModule { .. } => {
                Some("every import in the codebase must point at a file that exists")
            }
            Self::InvalidRootFiles(_) => Some(
                "a root must be a page module, a whitelisted anchor, or a frontend test file",
            ),
            Self::NoRouteTable(_) => {
                Some("expected a top-level `routes` constant or RouterModule.forRoot/forChild")
            }
            Self::NoGoldenPath => Some("call set_golden_file_path before comparing"),
            _ => None,
        }
    }
}

// Display: lowercase, no trailing punctuation, so it composes into
// larger error messages.
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigRead(path, source) => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
            Self::ConfigParse(path, source) => {
                write!(f, "invalid JSON in '{}': {source}", path.display())
            }
            Self::SourceParse { file, message } => {
                write!(f, "cannot parse '{file}': {message}")
            }
            Self::MissingModule {
                target,
                from,
                specifier,
            } => {
                write!(
                    f,
                    "'{from}' imports '{specifier}' which resolves to '{target}', but no such file exists"
                )
            }
            Self::MissingStylesheet { target, from } => {
                write!(f, "'{from}' links stylesheet '{target}' which does not exist")
            }
            Self::NotALiteral { text, file } => {
                write!(f, "expression '{text}' in '{file}' is not a constant string")
            }
            Self::NoObjectArgument { class_name, file } => {
                write!(f, "no object argument on class {class_name} in {file}")
            }
            Self::UnparsableRoutePath { text, file } => {
                write!(
                    f,
                    "route path '{text}' in '{file}' is neither a literal nor a constants access"
                )
            }
            Self::NoRouteTable(file) => {
                write!(f, "no route table found in '{file}'")
            }
            Self::UnknownConstant { chain, file } => {
                write!(f, "constants access '{chain}' in '{file}' names no known constant")
            }
            Self::InvalidRootFiles(offenders) => {
                write!(f, "invalid root files: {}", offenders.join(", "))
            }
            Self::ArtifactWrite(path, source) => {
                write!(f, "cannot write '{}': {source}", path.display())
            }
            Self::GoldenMismatch {
                unmatched_urls,
                extra,
                missing,
            } => {
                write!(
                    f,
                    "golden manifest mismatch: {} unmatched url(s), {} unexpected module(s), {} missing module(s)",
                    unmatched_urls.len(),
                    extra.len(),
                    missing.len()
                )
            }
            Self::NoGoldenPath => write!(f, "no golden manifest path installed"),
        }
    }
}

// Implement source() for error chain introspection.
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigRead(_, e) | Self::ArtifactWrite(_, e) => Some(e),
            Self::ConfigParse(_, e) => Some(e),
            _ => None,
        }
    }
}

#![warn(clippy::pedantic)]
// Binary crate with internal library — all callers are us.
// These doc lints are for public API documentation, not applicable here.
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod angular;
pub mod builder;
pub mod context;
pub mod error;
pub mod eval;
pub mod graph;
pub mod html_edges;
pub mod matcher;
pub mod projector;
pub mod report;
pub mod resolve;
pub mod routes;
pub mod suites;
pub mod ts_edges;
pub mod workspace;

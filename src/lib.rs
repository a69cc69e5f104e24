//! # CodeGraph
//!
//! A source-code indexing and hybrid search system: parses a workspace into
//! a canonical property graph, hierarchically summarizes and embeds it, and
//! answers natural-language queries by combining vector search, entity-name
//! search, and graph context expansion.
//!
//! ## Architecture
//!
//! The crate is organized following Domain-Driven Design principles:
//!
//! - `domain`: Core graph/search models and the shared error type
//! - `application`: Ports (`GraphStore`, `ParserRunner`, ...) and use cases
//! - `connector`: Adapters (DuckDB + VSS, subprocess parsers, ...) and the
//!   composition root / CLI router
//! - `cli`: The command-line surface

pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::*;
pub use connector::*;
pub use domain::*;

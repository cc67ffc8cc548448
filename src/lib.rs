//! nutqa - static QA for shell codebases
//!
//! Scans shell sources, extracts function records with a line-oriented
//! brace-counting heuristic, and runs two corpus-wide detectors:
//! near-duplicate function names (normalized edit distance with length-ratio
//! pruning) and trivial wrappers (multi-criterion rule chain).

pub mod cli;
pub mod config;
pub mod detectors;
pub mod extractor;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scanner;

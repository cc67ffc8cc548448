//! QA detectors
//!
//! Two corpus-wide detectors: duplicate function-name detection and
//! trivial-wrapper classification. Both require the complete extracted
//! corpus; the pipeline guarantees extraction has finished before either
//! runs.

pub mod base;
pub mod duplicate_names;
pub mod similarity;
pub mod trivial_wrapper;

pub use base::{DetectionSummary, DetectorResult};
pub use duplicate_names::{DuplicateNameDetector, DuplicateOutcome};
pub use trivial_wrapper::TrivialWrapperDetector;

//! Configuration module for nutqa
//!
//! This module handles:
//! - Project-level QA configuration (`[qa]` table of nut.toml)
//! - Detector threshold defaults and validation
//! - Exemption marker strings

mod project_config;

pub use project_config::{load_qa_config, ConfigError, NutConfig, QaConfig, Thresholds};

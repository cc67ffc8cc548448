//! Project-level configuration support
//!
//! Loads per-project QA configuration from the `[qa]` table of `nut.toml`
//! in the scan root.
//!
//! # Configuration Format
//!
//! ```toml
//! # nut.toml
//!
//! [qa]
//! include = ["*.sh", "*.bash"]
//! exclude = ["vendor/", "third_party/"]
//! markers = ["@public-api", "@wrapper-ok"]
//!
//! [qa.thresholds]
//! min_name_length = 4
//! similarity_threshold = 0.85
//! full_fail_threshold = 0.95
//! strip_warn_threshold = 0.90
//! max_lines = 2
//! local_usage_threshold = 4
//! global_usage_threshold = 6
//! min_vars_for_ergonomic = 2
//! token_complexity_warn = 3
//! token_complexity_pass = 4
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Top-level `nut.toml` contents. Only the `[qa]` table is read here; the
/// rest of the file belongs to the shell library itself.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NutConfig {
    #[serde(default)]
    pub qa: QaConfig,
}

/// QA checker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QaConfig {
    /// Include globs matched against file names (default: `*.sh`)
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Substring exclusion rules matched against the relative path
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Exemption marker strings, containment-matched in comment lines
    /// preceding a function (e.g. "@public-api", "@wrapper-ok")
    #[serde(default)]
    pub markers: Vec<String>,

    /// Numeric comparison cutoffs; read-only for the whole run
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: Vec::new(),
            markers: Vec::new(),
            thresholds: Thresholds::default(),
        }
    }
}

fn default_include() -> Vec<String> {
    vec!["*.sh".to_string()]
}

/// All numeric cutoffs used by the detectors
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Thresholds {
    /// Names shorter than this are excluded from similarity comparison
    #[serde(default = "default_min_name_length")]
    pub min_name_length: usize,

    /// Full-name pass: WARN at or above this similarity
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Full-name pass: FAIL at or above this similarity
    #[serde(default = "default_full_fail_threshold")]
    pub full_fail_threshold: f64,

    /// Stripped-name pass: WARN at or above this similarity (never FAIL)
    #[serde(default = "default_strip_warn_threshold")]
    pub strip_warn_threshold: f64,

    /// Functions with more meaningful lines than this are not wrappers
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Same-file uses that justify a short wrapper
    #[serde(default = "default_local_usage_threshold")]
    pub local_usage_threshold: usize,

    /// Corpus-wide uses that justify a short wrapper
    #[serde(default = "default_global_usage_threshold")]
    pub global_usage_threshold: usize,

    /// Distinct variables that make a short wrapper "ergonomic"
    #[serde(default = "default_min_vars_for_ergonomic")]
    pub min_vars_for_ergonomic: usize,

    /// Token count at or above which a trivial wrapper only warns
    #[serde(default = "default_token_complexity_warn")]
    pub token_complexity_warn: usize,

    /// Token count at or above which a short function passes outright
    #[serde(default = "default_token_complexity_pass")]
    pub token_complexity_pass: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_name_length: default_min_name_length(),
            similarity_threshold: default_similarity_threshold(),
            full_fail_threshold: default_full_fail_threshold(),
            strip_warn_threshold: default_strip_warn_threshold(),
            max_lines: default_max_lines(),
            local_usage_threshold: default_local_usage_threshold(),
            global_usage_threshold: default_global_usage_threshold(),
            min_vars_for_ergonomic: default_min_vars_for_ergonomic(),
            token_complexity_warn: default_token_complexity_warn(),
            token_complexity_pass: default_token_complexity_pass(),
        }
    }
}

fn default_min_name_length() -> usize {
    4
}
fn default_similarity_threshold() -> f64 {
    0.85
}
fn default_full_fail_threshold() -> f64 {
    0.95
}
fn default_strip_warn_threshold() -> f64 {
    0.90
}
fn default_max_lines() -> usize {
    2
}
fn default_local_usage_threshold() -> usize {
    4
}
fn default_global_usage_threshold() -> usize {
    6
}
fn default_min_vars_for_ergonomic() -> usize {
    2
}
fn default_token_complexity_warn() -> usize {
    3
}
fn default_token_complexity_pass() -> usize {
    4
}

/// Configuration errors that must abort the run before any file is scanned.
/// Results produced under contradictory thresholds are meaningless.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("threshold `{name}` must be within [0.0, 1.0], got {value}")]
    OutOfRange { name: &'static str, value: f64 },

    #[error(
        "similarity_threshold ({warn}) must not exceed full_fail_threshold ({fail})"
    )]
    InvertedThresholds { warn: f64, fail: f64 },

    #[error("token_complexity_warn ({warn}) must not exceed token_complexity_pass ({pass})")]
    InvertedTokenThresholds { warn: usize, pass: usize },
}

impl Thresholds {
    /// Validate threshold consistency. Called once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("full_fail_threshold", self.full_fail_threshold),
            ("strip_warn_threshold", self.strip_warn_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }

        if self.similarity_threshold > self.full_fail_threshold {
            return Err(ConfigError::InvertedThresholds {
                warn: self.similarity_threshold,
                fail: self.full_fail_threshold,
            });
        }

        if self.token_complexity_warn > self.token_complexity_pass {
            return Err(ConfigError::InvertedTokenThresholds {
                warn: self.token_complexity_warn,
                pass: self.token_complexity_pass,
            });
        }

        Ok(())
    }
}

/// Load QA configuration from `nut.toml` in the scan root.
///
/// Returns default configuration if no config file is found. A present but
/// unparseable file is logged and falls back to defaults; threshold
/// *validation* failures are surfaced separately via [`Thresholds::validate`].
pub fn load_qa_config(root: &Path) -> QaConfig {
    let toml_path = root.join("nut.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded QA config from {}", toml_path.display());
                return config.qa;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    debug!("No nut.toml found, using defaults");
    QaConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<NutConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: NutConfig = toml::from_str(&content)?;
    Ok(config)
}

//! Analysis configuration, loaded from YAML.

use crate::compare::{UnresolvedPolicy, DEFAULT_INF_DISPLAY, DEFAULT_TOP_N};
use crate::error::{Result, TaxaError};
use crate::levels;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Abundance unit handed to the ratio engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbundanceUnit {
    /// Reads per million, using the level table's full column sums.
    #[default]
    Rpm,
    /// Values as stored in the level files.
    Raw,
}

/// Connection settings for a local Ollama server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "gpt-oss:20b".to_string(),
            timeout_secs: 30,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

/// Inputs and options for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Full taxonomy abundance matrix (`ID` column plus samples).
    pub abundance: PathBuf,
    /// Sample metadata with `sample` and `group` columns.
    pub metadata: PathBuf,
    /// Base path of the `<base>_level_<d>.tsv` files.
    #[serde(default)]
    pub level_base: Option<PathBuf>,
    #[serde(default)]
    pub unit: AbundanceUnit,
    #[serde(default)]
    pub policy: UnresolvedPolicy,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_inf_display")]
    pub inf_display: f64,
    #[serde(default)]
    pub ollama: Option<OllamaConfig>,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_inf_display() -> f64 {
    DEFAULT_INF_DISPLAY
}

impl AnalysisConfig {
    /// Config with defaults for everything but the two input paths.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(abundance: P, metadata: Q) -> Self {
        Self {
            abundance: abundance.into(),
            metadata: metadata.into(),
            level_base: None,
            unit: AbundanceUnit::default(),
            policy: UnresolvedPolicy::default(),
            top_n: DEFAULT_TOP_N,
            inf_display: DEFAULT_INF_DISPLAY,
            ollama: None,
        }
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(TaxaError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Configuration written by `taxa example-config`.
    pub fn example() -> Self {
        Self {
            ollama: Some(OllamaConfig::default()),
            ..Self::new("all_child-UC_kraken2_250616.tsv", "metadata.tsv")
        }
    }

    /// Check option ranges.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(TaxaError::InvalidParameter("top_n must be positive".into()));
        }
        if !self.inf_display.is_finite() {
            return Err(TaxaError::InvalidParameter(
                "inf_display must be a finite number".into(),
            ));
        }
        Ok(())
    }

    /// Base path of the level files, derived from the abundance path if unset.
    pub fn level_base(&self) -> PathBuf {
        self.level_base
            .clone()
            .unwrap_or_else(|| levels::default_base(&self.abundance))
    }

    /// Level file for one depth.
    pub fn level_file(&self, depth: usize) -> PathBuf {
        levels::level_file_path(self.level_base(), depth)
    }
}

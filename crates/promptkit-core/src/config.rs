use crate::error::Result;
use crate::paths;
use crate::patterns::default_patterns;
use crate::types::Mode;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// OptimizerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Used when the CLI gets no `--mode`.
    #[serde(default)]
    pub default_mode: Mode,
}

// ---------------------------------------------------------------------------
// PatternsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Pattern ids removed from the library at construction.
    #[serde(default)]
    pub disabled: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            optimizer: OptimizerConfig::default(),
            patterns: PatternsConfig::default(),
        }
    }
}

impl Config {
    /// Load `.promptkit/config.yaml` under `root`. A missing file yields
    /// the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let known: Vec<&'static str> = default_patterns().iter().map(|p| p.id()).collect();

        if self.version != default_version() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("unsupported config version {}", self.version),
            });
        }

        for id in &self.patterns.disabled {
            if !known.contains(&id.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("unknown pattern '{id}' in patterns.disabled"),
                });
            }
        }

        let all_disabled = known
            .iter()
            .all(|id| self.patterns.disabled.iter().any(|d| d == id));
        if all_disabled {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "every pattern is disabled; optimize would return prompts unchanged"
                    .to_string(),
            });
        }

        warnings
    }

    pub fn has_errors(warnings: &[ConfigWarning]) -> bool {
        warnings.iter().any(|w| w.level == WarnLevel::Error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

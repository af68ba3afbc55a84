use crate::measures::MeasureKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cost: CostModel,
    #[serde(default)]
    pub loss: LossConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What a withheld (`NS`) rank is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithheldPolicy {
    /// Withheld ranks still pay the assessment cost.
    #[default]
    ChargeAssessment,
    /// Withheld ranks pay `withheld` instead of `assessment`.
    ChargeWithheld,
}

/// Unit costs for the cost-based measure
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CostModel {
    /// Cost of a withheld document (CN).
    #[serde(default = "default_withheld_cost")]
    pub withheld: f64,
    /// Cost of assessing one document (CA).
    #[serde(default = "default_assessment_cost")]
    pub assessment: f64,
    /// Extra cost of eliciting feedback (CF).
    #[serde(default = "default_feedback_cost")]
    pub feedback: f64,
    /// Penalty unit per unshown document (CP).
    #[serde(default = "default_penalty_cost")]
    pub penalty: f64,
    #[serde(default)]
    pub withheld_policy: WithheldPolicy,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            withheld: default_withheld_cost(),
            assessment: default_assessment_cost(),
            feedback: default_feedback_cost(),
            penalty: default_penalty_cost(),
            withheld_policy: WithheldPolicy::default(),
        }
    }
}

fn default_withheld_cost() -> f64 {
    0.0
}

fn default_assessment_cost() -> f64 {
    1.0
}

fn default_feedback_cost() -> f64 {
    2.0
}

fn default_penalty_cost() -> f64 {
    2.0
}

/// Loss-based measure configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LossConfig {
    /// Smoothing parameter `b` of the effort term.
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
        }
    }
}

fn default_smoothing() -> f64 {
    100.0
}

/// Reporting configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    /// Decimal places for float fields.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Measure kinds computed when the command line names none.
    #[serde(default = "default_measures")]
    pub measures: Vec<MeasureKind>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            measures: default_measures(),
        }
    }
}

fn default_precision() -> u32 {
    3
}

fn default_measures() -> Vec<MeasureKind> {
    MeasureKind::ALL.to_vec()
}

const MAX_PRECISION: u32 = 12;

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. `path`, when given
    /// 2. Path specified in IEVAL_CONFIG environment variable
    /// 3. ./ieval.toml in current directory, if it exists
    ///
    /// With none of these, built-in defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => match std::env::var("IEVAL_CONFIG") {
                Ok(p) => Some(PathBuf::from(p)),
                Err(_) => {
                    let local = PathBuf::from("ieval.toml");
                    local.is_file().then_some(local)
                }
            },
        };

        let config = match config_path {
            Some(config_path) => {
                let config_str = std::fs::read_to_string(&config_path).with_context(|| {
                    format!("Failed to read config file: {}", config_path.display())
                })?;
                let config = Self::from_toml(&config_str).with_context(|| {
                    format!("Failed to parse config file: {}", config_path.display())
                })?;
                log::info!("Loaded configuration from {}", config_path.display());
                config
            }
            None => {
                log::debug!("No config file found, using defaults");
                Config::default()
            }
        };

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let costs = [
            ("cost.withheld", self.cost.withheld),
            ("cost.assessment", self.cost.assessment),
            ("cost.feedback", self.cost.feedback),
            ("cost.penalty", self.cost.penalty),
        ];
        for (name, value) in costs {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a finite, non-negative number (got {})", name, value);
            }
        }

        if self.cost.assessment == 0.0 {
            anyhow::bail!("cost.assessment must be greater than 0");
        }

        if !self.loss.smoothing.is_finite() || self.loss.smoothing <= 0.0 {
            anyhow::bail!("loss.smoothing must be greater than 0");
        }

        if self.output.precision > MAX_PRECISION {
            anyhow::bail!("output.precision must be at most {}", MAX_PRECISION);
        }

        if self.output.measures.is_empty() {
            anyhow::bail!("output.measures must name at least one measure");
        }

        Ok(())
    }
}
